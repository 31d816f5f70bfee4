//! Connectors registered in a workspace
//!
//! Connectors are not resolved through the per-kind directory convention.
//! They are registered by dropping an archive (`http-connector-0.1.8.zip`)
//! or an extracted connector directory (one holding `connector.xml`) into a
//! connectors directory, and invocations refer to them by name.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::ast::{AstProvider, XmlAstProvider};
use crate::config::LayoutConfig;

/// Connector name → definition path, scoped to one project
#[derive(Debug, Clone, Default)]
pub struct ConnectorRegistry {
    connectors: BTreeMap<String, PathBuf>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the project's connector directories
    pub fn discover(project_root: &Path, layout: &LayoutConfig) -> Self {
        let archive = archive_pattern();
        let mut registry = Self::new();

        for dir in layout.connector_dirs(project_root) {
            for entry in WalkDir::new(&dir).max_depth(2).into_iter().filter_map(|e| e.ok()) {
                let path = entry.path();
                let file_name = entry.file_name().to_string_lossy();

                if entry.file_type().is_file() && file_name.ends_with(".zip") {
                    if let Some(caps) = archive.captures(&file_name) {
                        registry.register(&caps["name"], path);
                    }
                } else if entry.file_type().is_file() && file_name == "connector.xml" {
                    if let Some(name) = connector_name(path) {
                        registry.register(&name, path.parent().unwrap_or(path));
                    }
                }
            }
        }

        if registry.is_empty() {
            debug!(root = %project_root.display(), "no connectors registered");
        } else {
            let names: Vec<&str> = registry.names().collect();
            debug!(count = registry.len(), ?names, "discovered connectors");
        }
        registry
    }

    /// Register a connector; the first registration of a name wins
    pub fn register(&mut self, name: &str, path: impl Into<PathBuf>) {
        self.connectors
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| path.into());
    }

    /// Definition path for a connector name (case-insensitive)
    pub fn lookup(&self, name: &str) -> Option<&Path> {
        self.connectors
            .get(&name.to_ascii_lowercase())
            .map(PathBuf::as_path)
    }

    /// Definition path for an invocation tag such as `http.get`
    pub fn lookup_invocation(&self, tag: &str) -> Option<&Path> {
        let name = tag.split('.').next().unwrap_or(tag);
        self.lookup(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.connectors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

fn archive_pattern() -> Regex {
    // mi-connector-http-0.1.8.zip, http-connector-0.1.8.zip, salesforce-connector.zip
    Regex::new(r"^(?:[a-z]+-connector-)?(?P<name>[A-Za-z0-9_]+?)(?:-connector)?(?:-\d[\w.\-]*)?\.zip$")
        .expect("connector archive pattern is valid")
}

/// `<connector><component name="http" .../></connector>`
fn connector_name(path: &Path) -> Option<String> {
    let root = XmlAstProvider.parse(path).ok()?;
    root.child("component")
        .and_then(|c| c.attr_value("name"))
        .or_else(|| root.attr_value("name"))
        .map(str::to_string)
}
