//! Site configuration for the showcase pipelines.
//!
//! Config lives at `<site-root>/showcase.toml`. Every field has a default so
//! a site with no config file gets the conventional Jekyll-style layout.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShowcaseError};

/// Default configuration file name at the site root.
const CONFIG_FILE_NAME: &str = "showcase.toml";

// ---------------------------------------------------------------------------
// Config structs (matching showcase.toml schema)
// ---------------------------------------------------------------------------

/// Top-level site config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Record store locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Placeholder values used by the content scaffolder.
    #[serde(default)]
    pub scaffold: ScaffoldConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding per-year cohort pages (`<cohort_root>/<year>/...`).
    #[serde(default = "default_cohort_root")]
    pub cohort_root: String,

    /// Directory holding structured data files (`<data_root>/cohorts/<year>.yml`).
    #[serde(default = "default_data_root")]
    pub data_root: String,

    /// File name of the generated search corpus.
    #[serde(default = "default_search_index")]
    pub search_index: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cohort_root: default_cohort_root(),
            data_root: default_data_root(),
            search_index: default_search_index(),
        }
    }
}

fn default_cohort_root() -> String {
    "cohorts".into()
}
fn default_data_root() -> String {
    "_data".into()
}
fn default_search_index() -> String {
    "search.json".into()
}

/// `[scaffold]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldConfig {
    /// Placeholder used for empty member/method/tag lists.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Body text for a team record created without a project overview.
    #[serde(default = "default_team_body")]
    pub team_body: String,

    /// Body text for an event record created without details.
    #[serde(default = "default_event_body")]
    pub event_body: String,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            team_body: default_team_body(),
            event_body: default_event_body(),
        }
    }
}

fn default_placeholder() -> String {
    "TBD".into()
}
fn default_team_body() -> String {
    "Project narrative forthcoming.".into()
}
fn default_event_body() -> String {
    "Event details will be added here.".into()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Path of the config file under a site root.
pub fn config_file_path(site_root: &Path) -> PathBuf {
    site_root.join(CONFIG_FILE_NAME)
}

/// Load config from `<site_root>/showcase.toml`, falling back to defaults
/// when the file does not exist.
pub fn load_config(site_root: &Path) -> Result<SiteConfig> {
    let path = config_file_path(site_root);
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    let raw = std::fs::read_to_string(&path).map_err(|e| ShowcaseError::io(&path, e))?;
    toml::from_str(&raw)
        .map_err(|e| ShowcaseError::config(format!("invalid {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_site_layout() {
        let config = SiteConfig::default();
        assert_eq!(config.paths.cohort_root, "cohorts");
        assert_eq!(config.paths.data_root, "_data");
        assert_eq!(config.paths.search_index, "search.json");
        assert_eq!(config.scaffold.placeholder, "TBD");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: SiteConfig = toml::from_str(
            r#"
            [paths]
            cohort_root = "programs"
            "#,
        )
        .expect("parse config");
        assert_eq!(config.paths.cohort_root, "programs");
        assert_eq!(config.paths.data_root, "_data");
        assert_eq!(config.scaffold.team_body, "Project narrative forthcoming.");
    }
}
