//! Overview aggregation
//!
//! Scans every entrypoint candidate of a project, keeps the ones that really
//! are entrypoints, and folds their connector usages into one de-duplicated
//! connection list. Connection ids and the dependency cache belong to a
//! single `generate` call.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{Connection, Entrypoint, OverviewModel};
use crate::artifact::ArtifactKind;
use crate::ast::{AstProvider, XmlAstProvider};
use crate::config::{LayoutConfig, OverviewConfig};
use crate::connectors::ConnectorRegistry;
use crate::dependency::DependencyTree;
use crate::error::{OverviewError, Result};
use crate::locator::ArtifactLocator;
use crate::scanner::ArtifactScanner;

/// A file the resource finder believes to be an entrypoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    /// Kind implied by where the file was found
    pub kind: ArtifactKind,
}

/// Lists candidate entrypoint files of a project
pub trait ResourceFinder {
    fn entrypoint_candidates(&self, project_root: &Path, kinds: &[ArtifactKind]) -> Vec<Candidate>;
}

/// Finds candidates in the conventional kind directories
#[derive(Debug, Clone, Default)]
pub struct DirectoryResourceFinder {
    locator: ArtifactLocator,
}

impl DirectoryResourceFinder {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            locator: ArtifactLocator::new(layout),
        }
    }
}

impl ResourceFinder for DirectoryResourceFinder {
    /// Kinds in the order given, files sorted by path within a kind
    fn entrypoint_candidates(&self, project_root: &Path, kinds: &[ArtifactKind]) -> Vec<Candidate> {
        kinds
            .iter()
            .flat_map(|&kind| {
                self.locator
                    .candidates(kind, project_root)
                    .into_iter()
                    .map(move |path| Candidate { path, kind })
            })
            .collect()
    }
}

/// Connector name → connection, in first-seen order
#[derive(Debug, Default)]
struct ConnectionIndex {
    ids: HashMap<String, u32>,
    connections: Vec<Connection>,
    next_id: u32,
}

impl ConnectionIndex {
    fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    fn id_for(&mut self, name: &str, path: Option<&Path>) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(name.to_string(), id);
        self.connections.push(Connection {
            id: id.to_string(),
            name: name.to_string(),
            path: path.map(|p| p.display().to_string()),
        });
        id
    }
}

/// Builds the project overview
pub struct OverviewAggregator<F = DirectoryResourceFinder, P = XmlAstProvider> {
    config: OverviewConfig,
    finder: F,
    provider: P,
}

impl OverviewAggregator {
    pub fn new(config: OverviewConfig) -> Self {
        let finder = DirectoryResourceFinder::new(config.layout.clone());
        Self {
            config,
            finder,
            provider: XmlAstProvider,
        }
    }
}

impl Default for OverviewAggregator {
    fn default() -> Self {
        Self::new(OverviewConfig::default())
    }
}

impl<F: ResourceFinder, P: AstProvider> OverviewAggregator<F, P> {
    pub fn with_collaborators(config: OverviewConfig, finder: F, provider: P) -> Self {
        Self { config, finder, provider }
    }

    pub fn config(&self) -> &OverviewConfig {
        &self.config
    }

    /// Fresh scanner (and cache) for one project
    pub fn scanner(&self, project_root: &Path) -> ArtifactScanner<'_> {
        ArtifactScanner::new(
            project_root,
            &self.provider,
            ArtifactLocator::new(self.config.layout.clone()),
            ConnectorRegistry::discover(project_root, &self.config.layout),
        )
    }

    /// Dependency tree of a single artifact
    pub fn tree(&self, project_root: &Path, path: &Path) -> DependencyTree {
        self.scanner(project_root).scan(path)
    }

    /// Generate the overview of the project at `project_root`
    pub fn generate(&self, project_root: &Path) -> Result<OverviewModel> {
        if !project_root.is_dir() {
            return Err(OverviewError::ProjectNotFound(project_root.to_path_buf()));
        }

        let mut scanner = self.scanner(project_root);
        let mut index = ConnectionIndex::new();
        let mut entrypoints = Vec::new();

        let candidates = self
            .finder
            .entrypoint_candidates(project_root, &self.config.scan.entrypoint_kinds);
        debug!(count = candidates.len(), "entrypoint candidates");

        for candidate in candidates {
            let tree = scanner.scan(&candidate.path);

            // An unreadable file keeps the kind its location implies
            let kind = if tree.is_unreadable() { candidate.kind } else { tree.kind };
            let Some(entrypoint_type) = kind.entrypoint_type() else {
                debug!(path = %candidate.path.display(), %kind, "not an entrypoint, skipped");
                continue;
            };

            let mut ids: BTreeSet<u32> = BTreeSet::new();
            scanner.cache().walk(&tree, |dep| {
                if dep.kind == ArtifactKind::Connector {
                    if let Some(name) = dep.name.as_deref() {
                        ids.insert(index.id_for(name, dep.path.as_deref()));
                    }
                }
            });

            let name = tree
                .name
                .clone()
                .or_else(|| {
                    candidate
                        .path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                })
                .unwrap_or_default();

            entrypoints.push(Entrypoint {
                id: (entrypoints.len() + 1).to_string(),
                name,
                entrypoint_type,
                path: candidate.path.display().to_string(),
                connection_ids: ids.into_iter().map(|id| id.to_string()).collect(),
            });
        }

        info!(
            entrypoints = entrypoints.len(),
            connections = index.connections.len(),
            cached = scanner.cache().resolved_count(),
            "overview generated"
        );

        Ok(OverviewModel {
            project_name: project_name(project_root),
            entrypoints,
            connections: index.connections,
        })
    }
}

/// Final path component, resolving `.`-style roots first
fn project_name(project_root: &Path) -> String {
    project_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            project_root
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_default()
}
