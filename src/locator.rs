//! Artifact lookup by symbolic key
//!
//! Artifacts of a kind live under that kind's directory (`sequences/`,
//! `endpoints/`, ...). The file whose root element declares the key as its
//! `name` (or `key`) attribute is the target. Lookups never fail loudly:
//! missing directories, unreadable files and ambiguous keys all come back as
//! `None`.

use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::artifact::ArtifactKind;
use crate::ast::read_root_element;
use crate::config::LayoutConfig;

/// Convention-based artifact locator
#[derive(Debug, Clone, Default)]
pub struct ArtifactLocator {
    layout: LayoutConfig,
}

impl ArtifactLocator {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Path of the artifact of `kind` declared as `key`
    pub fn locate(&self, key: &str, kind: ArtifactKind, project_root: &Path) -> Option<PathBuf> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }

        let mut matches: Vec<PathBuf> = Vec::new();
        for path in self.candidates(kind, project_root) {
            if declared_name(&path).as_deref() == Some(key) && !matches.contains(&path) {
                matches.push(path);
            }
        }

        match matches.len() {
            0 => {
                trace!(key, %kind, "no artifact declares key");
                None
            }
            1 => matches.pop(),
            n => {
                debug!(key, %kind, count = n, "ambiguous key, treating as unresolved");
                None
            }
        }
    }

    /// Every XML file that may hold an artifact of `kind`, sorted by path
    pub fn candidates(&self, kind: ArtifactKind, project_root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = Vec::new();
        for dir in self.layout.kind_dirs(project_root, kind) {
            files.extend(
                WalkDir::new(&dir)
                    .max_depth(self.layout.max_depth.max(1))
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.into_path())
                    .filter(|p| p.extension().map(|ext| ext == "xml").unwrap_or(false)),
            );
        }
        files.sort();
        files.dedup();
        files
    }

    /// Declared names closest to `query`, best first
    pub fn suggest(
        &self,
        query: &str,
        kind: ArtifactKind,
        project_root: &Path,
        limit: usize,
    ) -> Vec<String> {
        use fuzzy_matcher::skim::SkimMatcherV2;
        use fuzzy_matcher::FuzzyMatcher;

        let matcher = SkimMatcherV2::default();
        let mut results: Vec<(i64, String)> = self
            .candidates(kind, project_root)
            .iter()
            .filter_map(|path| declared_name(path))
            .filter_map(|name| matcher.fuzzy_match(&name, query).map(|score| (score, name)))
            .collect();

        // Sort by score descending, then name for stable output
        results.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        results.dedup_by(|a, b| a.1 == b.1);

        results.into_iter().take(limit).map(|(_, name)| name).collect()
    }
}

/// Name an artifact file declares on its root element
pub fn declared_name(path: &Path) -> Option<String> {
    let root = read_root_element(path).ok()?;
    root.attr_value("name")
        .or_else(|| root.attr_value("key"))
        .map(str::to_string)
}
