/*!
Quickstart version mapping and execution plan resolution.

- ExecutionPlan: compose-file git ref + docker tag (+ optional mysql tag)
- VersionMappingConfig: version identifier -> ExecutionPlan, always holding a "default" entry
- get_quickstart_execution_plan: resolve a requested version, then apply legacy compose-file overrides
*/
use crate::errors::QuickstartConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key used when no version is requested.
pub const DEFAULT_KEY: &str = "default";
/// Key tracking the latest published release.
pub const STABLE_KEY: &str = "stable";

/// Mysql tag attached to plans synthesized by this crate (built-in default, stable fill).
pub const DEFAULT_MYSQL_TAG: &str = "5.7";

/// Where to fetch compose definitions and which image tag to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub composefile_git_ref: String,
    pub docker_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mysql_tag: Option<String>,
}

impl ExecutionPlan {
    pub fn new(composefile_git_ref: impl Into<String>, docker_tag: impl Into<String>) -> Self {
        ExecutionPlan {
            composefile_git_ref: composefile_git_ref.into(),
            docker_tag: docker_tag.into(),
            mysql_tag: None,
        }
    }

    pub fn with_mysql_tag(mut self, tag: impl Into<String>) -> Self {
        self.mysql_tag = Some(tag.into());
        self
    }

    /// Plan used when no mapping document is reachable at all.
    pub fn builtin_default() -> Self {
        ExecutionPlan::new("master", "head").with_mysql_tag(DEFAULT_MYSQL_TAG)
    }
}

/// A fixed compose-file ref served for one legacy version identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyComposefileOverride {
    pub requested_version: &'static str,
    pub composefile_git_ref: &'static str,
}

/// Legacy compose-file overrides, consulted after the mapping lookup.
///
/// The compose files published for these versions lack the setup-job labels
/// current quickstart checks rely on, so they are served the compose file from
/// the merge commit that introduced the labels. Keyed by the requested version
/// and applied only when that version is mapped; only the git ref is rewritten,
/// the docker tag still comes from the mapping.
pub const LEGACY_COMPOSEFILE_OVERRIDES: &[LegacyComposefileOverride] =
    &[LegacyComposefileOverride {
        requested_version: "v0.9.6",
        composefile_git_ref: "1d3339276129a7cb8385c07a958fcc93acda3b4e",
    }];

/// Legacy compose-file ref for a requested version identifier, if listed.
pub fn legacy_composefile_override(requested_version: &str) -> Option<&'static str> {
    LEGACY_COMPOSEFILE_OVERRIDES
        .iter()
        .find(|o| o.requested_version == requested_version)
        .map(|o| o.composefile_git_ref)
}

/// On-disk shape of the mapping document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionMapDocument {
    pub quickstart_version_map: BTreeMap<String, ExecutionPlan>,
}

/// Version identifier -> plan. The "default" entry is held separately so it can
/// never be missing; documents without it are rejected on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VersionMapDocument", into = "VersionMapDocument")]
pub struct VersionMappingConfig {
    default: ExecutionPlan,
    versions: BTreeMap<String, ExecutionPlan>,
}

impl TryFrom<VersionMapDocument> for VersionMappingConfig {
    type Error = QuickstartConfigError;

    fn try_from(doc: VersionMapDocument) -> Result<Self, Self::Error> {
        VersionMappingConfig::new(doc.quickstart_version_map)
    }
}

impl From<VersionMappingConfig> for VersionMapDocument {
    fn from(cfg: VersionMappingConfig) -> Self {
        let mut quickstart_version_map = cfg.versions;
        quickstart_version_map.insert(DEFAULT_KEY.to_string(), cfg.default);
        VersionMapDocument {
            quickstart_version_map,
        }
    }
}

impl VersionMappingConfig {
    /// Build from a full mapping; fails with `MissingDefault` when "default" is absent.
    pub fn new(
        mut quickstart_version_map: BTreeMap<String, ExecutionPlan>,
    ) -> Result<Self, QuickstartConfigError> {
        let default = quickstart_version_map
            .remove(DEFAULT_KEY)
            .ok_or(QuickstartConfigError::MissingDefault)?;
        Ok(VersionMappingConfig {
            default,
            versions: quickstart_version_map,
        })
    }

    /// Mapping used when neither the remote document nor the cache is available.
    pub fn builtin() -> Self {
        VersionMappingConfig {
            default: ExecutionPlan::builtin_default(),
            versions: BTreeMap::new(),
        }
    }

    pub fn get(&self, version: &str) -> Option<&ExecutionPlan> {
        if version == DEFAULT_KEY {
            Some(&self.default)
        } else {
            self.versions.get(version)
        }
    }

    /// Add or replace an entry; inserting "default" replaces the default plan.
    pub fn insert(&mut self, version: impl Into<String>, plan: ExecutionPlan) -> Option<ExecutionPlan> {
        let version = version.into();
        if version == DEFAULT_KEY {
            Some(std::mem::replace(&mut self.default, plan))
        } else {
            self.versions.insert(version, plan)
        }
    }

    /// Replace the plan used when no version is requested.
    pub fn set_default(&mut self, plan: ExecutionPlan) {
        self.default = plan;
    }

    pub fn default_plan(&self) -> &ExecutionPlan {
        &self.default
    }

    /// Every version identifier in the mapping, "default" included.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        std::iter::once(DEFAULT_KEY).chain(self.versions.keys().map(String::as_str))
    }

    /// Resolve a requested quickstart version into an execution plan.
    ///
    /// Rules:
    /// - None reads the current "default" entry, unchanged.
    /// - A mapped version returns its stored plan, except that versions listed in
    ///   [`LEGACY_COMPOSEFILE_OVERRIDES`] get the listed compose-file git ref.
    /// - An unmapped version is used verbatim as both git ref and docker tag,
    ///   inheriting only the default entry's mysql tag.
    pub fn get_quickstart_execution_plan(&self, requested_version: Option<&str>) -> ExecutionPlan {
        let Some(requested) = requested_version else {
            return self.default.clone();
        };
        match self.get(requested) {
            Some(stored) => {
                let mut plan = stored.clone();
                if let Some(git_ref) = legacy_composefile_override(requested) {
                    tracing::debug!(
                        requested = requested,
                        mapped_ref = %plan.composefile_git_ref,
                        git_ref = git_ref,
                        "using legacy compose file ref"
                    );
                    plan.composefile_git_ref = git_ref.to_string();
                }
                plan
            }
            None => ExecutionPlan {
                composefile_git_ref: requested.to_string(),
                docker_tag: requested.to_string(),
                mysql_tag: self.default.mysql_tag.clone(),
            },
        }
    }
}
