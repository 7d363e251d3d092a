/*!
quickstart-versioning: resolve a requested quickstart version into the compose-file git ref and
docker image tag used to bring up the quickstart environment.

Modules
- versioning: ExecutionPlan, VersionMappingConfig and plan resolution (with legacy compose-file overrides).
- fetch: loading the mapping from a forced local file, the remote document or the cache; saving the cache.
- errors: loader error type.
- telemetry: tracing subscriber setup.

Environment
- FORCE_LOCAL_QUICKSTART_MAPPING: read the mapping from this file only.
- QUICKSTART_LOG / RUST_LOG: log filter for init_logging (default "warn").
*/

mod errors;
mod fetch;
mod telemetry;
mod versioning;

pub use errors::QuickstartConfigError;
pub use fetch::{
    default_cache_path, expand_user, fetch_latest_release_tag, fetch_quickstart_config,
    load_quickstart_config_file, parse_quickstart_config, save_quickstart_config,
    QuickstartConfigSources, DEFAULT_CACHE_RELATIVE_PATH, DEFAULT_FETCH_TIMEOUT,
    DEFAULT_LATEST_RELEASE_URL, DEFAULT_REMOTE_MAPPING_URL, FORCE_LOCAL_MAPPING_ENV,
};
pub use telemetry::{init_logging, log_filter_from_env};
pub use versioning::{
    legacy_composefile_override, ExecutionPlan, LegacyComposefileOverride, VersionMappingConfig,
    DEFAULT_KEY, DEFAULT_MYSQL_TAG, LEGACY_COMPOSEFILE_OVERRIDES, STABLE_KEY,
};
