//! Configuration management for the overview engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (overview.toml)
//! - Environment variables (OVERVIEW__*)
//!
//! ## Example config file (overview.toml):
//! ```toml
//! [layout]
//! artifact_roots = [".", "src/main/wso2mi/artifacts"]
//! connector_dirs = ["connectors"]
//! max_depth = 2
//!
//! [layout.directories]
//! sequences = "seqs"
//!
//! [output]
//! format = "pretty"
//!
//! [scan]
//! entrypoint_kinds = ["API", "TASK", "INBOUND_ENDPOINT"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::artifact::ArtifactKind;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverviewConfig {
    /// Project layout conventions
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Scan settings
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Where artifacts live inside a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Base directories (relative to the project root) holding the kind directories
    #[serde(default = "default_artifact_roots")]
    pub artifact_roots: Vec<PathBuf>,

    /// Overrides for kind directory names, keyed by the conventional name
    #[serde(default)]
    pub directories: BTreeMap<String, String>,

    /// Directories (relative to the project root) holding connector archives
    #[serde(default = "default_connector_dirs")]
    pub connector_dirs: Vec<PathBuf>,

    /// How deep to look below a kind directory
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Kinds the resource finder offers as entrypoint candidates
    #[serde(default = "default_entrypoint_kinds")]
    pub entrypoint_kinds: Vec<ArtifactKind>,
}

fn default_artifact_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("."), PathBuf::from("src/main/wso2mi/artifacts")]
}

fn default_connector_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("connectors"),
        PathBuf::from("src/main/wso2mi/resources/connectors"),
    ]
}

fn default_max_depth() -> usize {
    2
}

fn default_entrypoint_kinds() -> Vec<ArtifactKind> {
    vec![ArtifactKind::Api, ArtifactKind::Task, ArtifactKind::InboundEndpoint]
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            artifact_roots: default_artifact_roots(),
            directories: BTreeMap::new(),
            connector_dirs: default_connector_dirs(),
            max_depth: default_max_depth(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            entrypoint_kinds: default_entrypoint_kinds(),
        }
    }
}

impl LayoutConfig {
    /// Directory name used for a kind, after overrides
    pub fn dir_name(&self, kind: ArtifactKind) -> Option<&str> {
        let conventional = kind.dir_name()?;
        Some(
            self.directories
                .get(conventional)
                .map(String::as_str)
                .unwrap_or(conventional),
        )
    }

    /// Existing directories that may hold artifacts of `kind`
    pub fn kind_dirs(&self, project_root: &Path, kind: ArtifactKind) -> Vec<PathBuf> {
        let Some(dir_name) = self.dir_name(kind) else {
            return Vec::new();
        };
        let mut dirs: Vec<PathBuf> = Vec::new();
        for base in &self.artifact_roots {
            // Collecting components drops interior `.` segments
            let dir: PathBuf = project_root.join(base).join(dir_name).components().collect();
            if dir.is_dir() && !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        dirs
    }

    /// Existing connector directories
    pub fn connector_dirs(&self, project_root: &Path) -> Vec<PathBuf> {
        self.connector_dirs
            .iter()
            .map(|d| project_root.join(d).components().collect::<PathBuf>())
            .filter(|d| d.is_dir())
            .collect()
    }
}

impl OverviewConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["overview.toml", ".overview.toml", "config/overview.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "synapse-overview") {
            let xdg_config = config_dir.config_dir().join("overview.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // OVERVIEW__LAYOUT__MAX_DEPTH=3 etc.
        builder = builder.add_source(
            Environment::with_prefix("OVERVIEW")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
