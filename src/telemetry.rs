//! Logging setup: a fmt subscriber filtered by QUICKSTART_LOG (or RUST_LOG), default "warn".

use std::env;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;

static INIT: OnceCell<bool> = OnceCell::new();

/// Filter directive from QUICKSTART_LOG, then RUST_LOG, then "warn".
pub fn log_filter_from_env() -> String {
    ["QUICKSTART_LOG", "RUST_LOG"]
        .iter()
        .filter_map(|k| env::var(k).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| "warn".to_string())
}

/// Install the global tracing subscriber once. Returns false when another
/// subscriber was already installed by the embedding application.
pub fn init_logging() -> bool {
    *INIT.get_or_init(|| {
        let env_filter = tracing_subscriber::EnvFilter::try_new(log_filter_from_env())
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        let installed = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .is_ok();
        if !installed {
            eprintln!("quickstart-versioning: logging init skipped (global subscriber already set)");
        }
        installed
    })
}
