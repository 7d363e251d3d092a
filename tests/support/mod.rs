/*!
Test support helpers shared across integration tests.

- example_version_mapper(): the mapping used by the resolution scenarios
- serve_once(status, body): one-shot HTTP responder on 127.0.0.1 returning its URL
- closed_port_url(): a URL on 127.0.0.1 that refuses connections
- offline_sources(dir): loader sources with network disabled and the cache under `dir`
*/

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;
use std::time::Duration;

use quickstart_versioning::{QuickstartConfigSources, VersionMappingConfig};

pub const EXAMPLE_MAPPING_YAML: &str = r#"
quickstart_version_map:
  default:
    composefile_git_ref: master
    docker_tag: latest
  v0.9.6:
    # the git ref is rewritten by the legacy compose-file overrides
    composefile_git_ref: v0.9.6.1
    docker_tag: v0.9.6.1
  v2.0.0:
    composefile_git_ref: v2.0.1
    docker_tag: v2.0.0
  v1.0.0:
    composefile_git_ref: v1.0.0
    docker_tag: v1.0.0
  stable:
    composefile_git_ref: v1.0.1
    docker_tag: latest
"#;

pub fn example_version_mapper() -> VersionMappingConfig {
    quickstart_versioning::parse_quickstart_config(EXAMPLE_MAPPING_YAML)
        .expect("example mapping parses")
}

/// Serve a single HTTP response, then close. Returns the base URL.
pub fn serve_once(status: &str, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind 127.0.0.1:0");
    let port = listener.local_addr().expect("local addr").port();
    let status = status.to_string();
    let body = body.to_string();
    thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
        let mut reader = BufReader::new(stream);
        // Drain request headers until the blank line
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) if line == "\r\n" || line == "\n" => break,
                Ok(_) => {}
            }
        }
        let mut stream = reader.into_inner();
        let resp = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let _ = stream.write_all(resp.as_bytes());
        let _ = stream.flush();
    });
    format!("http://127.0.0.1:{port}")
}

/// A URL whose port was bound and released, so connections are refused.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind 127.0.0.1:0");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/mapping.yaml")
}

pub fn offline_sources(dir: &Path) -> QuickstartConfigSources {
    QuickstartConfigSources {
        forced_local_path: None,
        remote_url: None,
        cache_path: Some(dir.join("quickstart").join("quickstart_version_mapping.yaml")),
        latest_release_url: None,
        timeout: Duration::from_secs(2),
    }
}
