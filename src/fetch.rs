#![allow(clippy::module_name_repetitions)]
//! Loading, validating and caching the quickstart version mapping.
//!
//! Source precedence:
//! 1) FORCE_LOCAL_QUICKSTART_MAPPING (returned as-is, errors propagate)
//! 2) remote mapping document
//! 3) on-disk cache written by a previous successful fetch
//! 4) built-in mapping with only a "default" entry

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::instrument;

use crate::errors::QuickstartConfigError;
use crate::versioning::{
    ExecutionPlan, VersionMapDocument, VersionMappingConfig, DEFAULT_MYSQL_TAG, STABLE_KEY,
};

/// Env var naming a local mapping file that replaces every other source.
pub const FORCE_LOCAL_MAPPING_ENV: &str = "FORCE_LOCAL_QUICKSTART_MAPPING";
pub const DEFAULT_REMOTE_MAPPING_URL: &str = "https://raw.githubusercontent.com/datahub-project/datahub/master/docker/quickstart/quickstart_version_mapping.yaml";
pub const DEFAULT_LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/datahub-project/datahub/releases/latest";
/// Cache location relative to the home directory.
pub const DEFAULT_CACHE_RELATIVE_PATH: &str = ".datahub/quickstart/quickstart_version_mapping.yaml";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

const USER_AGENT: &str = concat!("quickstart-versioning/", env!("CARGO_PKG_VERSION"));

/// Where the mapping comes from. Unset fields disable that source.
#[derive(Debug, Clone)]
pub struct QuickstartConfigSources {
    pub forced_local_path: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub cache_path: Option<PathBuf>,
    pub latest_release_url: Option<String>,
    pub timeout: Duration,
}

impl Default for QuickstartConfigSources {
    fn default() -> Self {
        QuickstartConfigSources {
            forced_local_path: None,
            remote_url: Some(DEFAULT_REMOTE_MAPPING_URL.to_string()),
            cache_path: default_cache_path(),
            latest_release_url: Some(DEFAULT_LATEST_RELEASE_URL.to_string()),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl QuickstartConfigSources {
    /// Upstream defaults plus the forced local mapping from the environment.
    pub fn from_env() -> Self {
        let forced_local_path = env::var(FORCE_LOCAL_MAPPING_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(|s| expand_user(&s));
        QuickstartConfigSources {
            forced_local_path,
            ..Default::default()
        }
    }
}

/// `~/.datahub/quickstart/quickstart_version_mapping.yaml`, if a home directory is known.
pub fn default_cache_path() -> Option<PathBuf> {
    home::home_dir().map(|h| h.join(DEFAULT_CACHE_RELATIVE_PATH))
}

/// Expand a leading "~" or "~/" to the home directory; other paths are returned unchanged.
pub fn expand_user(p: &str) -> PathBuf {
    if p == "~" {
        if let Some(h) = home::home_dir() {
            return h;
        }
    } else if let Some(rest) = p.strip_prefix("~/") {
        if let Some(h) = home::home_dir() {
            return h.join(rest);
        }
    }
    PathBuf::from(p)
}

/// Decode a mapping document (YAML or JSON) and require a "default" entry.
pub fn parse_quickstart_config(text: &str) -> Result<VersionMappingConfig, QuickstartConfigError> {
    let doc: VersionMapDocument = serde_yaml::from_str(text)?;
    VersionMappingConfig::try_from(doc)
}

pub fn load_quickstart_config_file(path: &Path) -> Result<VersionMappingConfig, QuickstartConfigError> {
    let text = fs::read_to_string(path).map_err(|e| QuickstartConfigError::io_at(path, e))?;
    parse_quickstart_config(&text)
}

/// Write the mapping as YAML, creating parent directories as needed.
#[instrument(level = "debug", skip(config))]
pub fn save_quickstart_config(
    config: &VersionMappingConfig,
    path: &Path,
) -> Result<(), QuickstartConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| QuickstartConfigError::io_at(parent, e))?;
        }
    }
    let yaml = serde_yaml::to_string(config)?;
    fs::write(path, yaml).map_err(|e| QuickstartConfigError::io_at(path, e))?;
    tracing::info!("saved quickstart config to {}", path.display());
    Ok(())
}

fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build http client")
}

/// GET `url` and return the body; non-success statuses are errors.
fn fetch_text(url: &str, timeout: Duration) -> Result<String> {
    let resp = http_client(timeout)?
        .get(url)
        .send()
        .with_context(|| format!("GET {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("GET {url}: unexpected status {status}"));
    }
    resp.text().with_context(|| format!("reading body of {url}"))
}

#[derive(Deserialize)]
struct LatestRelease {
    tag_name: String,
}

/// Fetch the tag name of the latest published release from a GitHub-style releases API.
#[instrument(level = "debug", skip(timeout))]
pub fn fetch_latest_release_tag(url: &str, timeout: Duration) -> Result<String, QuickstartConfigError> {
    let body = fetch_text(url, timeout).map_err(|e| QuickstartConfigError::Http(format!("{e:#}")))?;
    let release: LatestRelease = serde_json::from_str(&body)
        .map_err(|e| QuickstartConfigError::Parse(format!("release response from {url}: {e}")))?;
    let tag = release.tag_name.trim();
    if tag.is_empty() {
        return Err(QuickstartConfigError::Parse(format!(
            "release response from {url} has an empty tag_name"
        )));
    }
    Ok(tag.to_string())
}

/// Remote document first, then the on-disk cache. None when both are unavailable.
fn fetch_raw_mapping(sources: &QuickstartConfigSources) -> Option<String> {
    if let Some(url) = sources.remote_url.as_deref() {
        match fetch_text(url, sources.timeout) {
            Ok(text) => return Some(text),
            Err(e) => tracing::debug!("couldn't fetch {url}: {e:#}, will try to read from local file"),
        }
    }
    if let Some(path) = sources.cache_path.as_deref() {
        match fs::read_to_string(path) {
            Ok(text) => return Some(text),
            Err(e) => tracing::debug!("couldn't read {} either: {e}", path.display()),
        }
    }
    None
}

/// Resolve the quickstart version mapping from the configured sources.
///
/// A forced local file is returned without further processing. Otherwise the
/// fetched document is validated, a missing "stable" entry is filled from the
/// latest release when reachable, and the result is written to the cache.
#[instrument(level = "debug", skip(sources), fields(forced = sources.forced_local_path.is_some()))]
pub fn fetch_quickstart_config(
    sources: &QuickstartConfigSources,
) -> Result<VersionMappingConfig, QuickstartConfigError> {
    if let Some(path) = sources.forced_local_path.as_deref() {
        tracing::info!(
            "{} is set, reading quickstart mapping from {}",
            FORCE_LOCAL_MAPPING_ENV,
            path.display()
        );
        return load_quickstart_config_file(path);
    }

    let Some(raw) = fetch_raw_mapping(sources) else {
        tracing::info!("unable to fetch quickstart mapping, using built-in default mapping");
        return Ok(VersionMappingConfig::builtin());
    };

    let mut config = parse_quickstart_config(&raw)?;

    if config.get(STABLE_KEY).is_none() {
        match sources.latest_release_url.as_deref() {
            Some(url) => match fetch_latest_release_tag(url, sources.timeout) {
                Ok(tag) => {
                    tracing::debug!("filling stable entry from latest release {tag}");
                    config.insert(
                        STABLE_KEY,
                        ExecutionPlan::new(tag.clone(), tag).with_mysql_tag(DEFAULT_MYSQL_TAG),
                    );
                }
                Err(e) => {
                    tracing::warn!("couldn't fetch latest release ({e}); --version stable will not work")
                }
            },
            None => tracing::warn!("no release source configured; --version stable will not work"),
        }
    }

    if let Some(path) = sources.cache_path.as_deref() {
        if let Err(e) = save_quickstart_config(&config, path) {
            tracing::warn!("couldn't cache quickstart mapping: {e}");
        }
    }

    Ok(config)
}
