//! Path-keyed memo of resolved artifacts
//!
//! One cache lives for one scan lifetime. A path is first registered with a
//! childless placeholder while its file is being walked; any reference that
//! reaches the same path before the walk finishes gets that placeholder back,
//! which is what stops reference cycles from recursing forever.
//!
//! A placeholder stays embedded wherever the cycle was cut, so a finished
//! tree can stop short at one. [`DependencyCache::walk`] follows every
//! file-backed node to its finished entry, which makes the reachable set the
//! same no matter which end of a cycle was walked first.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::artifact::ArtifactKind;
use crate::dependency::{Dependency, DependencyTree};

#[derive(Debug, Clone)]
enum CacheEntry {
    InProgress(Rc<Dependency>),
    Resolved(Rc<Dependency>),
}

/// Memo of dependencies by absolute file path
#[derive(Debug, Default)]
pub struct DependencyCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved or in-progress node for `path`
    pub fn get(&self, path: &Path) -> Option<Rc<Dependency>> {
        self.entries.get(path).map(|entry| match entry {
            CacheEntry::InProgress(dep) | CacheEntry::Resolved(dep) => Rc::clone(dep),
        })
    }

    /// Store the finished node for `path`, replacing any placeholder
    pub fn put(&mut self, path: impl Into<PathBuf>, dependency: Rc<Dependency>) {
        self.entries.insert(path.into(), CacheEntry::Resolved(dependency));
    }

    /// Mark `path` as being walked
    ///
    /// Returns `false` (and leaves the cache untouched) when the path already
    /// has an entry.
    pub fn begin(&mut self, path: impl Into<PathBuf>, placeholder: Rc<Dependency>) -> bool {
        let path = path.into();
        if self.entries.contains_key(&path) {
            return false;
        }
        self.entries.insert(path, CacheEntry::InProgress(placeholder));
        true
    }

    pub fn is_in_progress(&self, path: &Path) -> bool {
        matches!(self.entries.get(path), Some(CacheEntry::InProgress(_)))
    }

    /// Number of resolved entries
    pub fn resolved_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, CacheEntry::Resolved(_)))
            .count()
    }

    /// Depth-first, pre-order walk over everything reachable from `tree`
    ///
    /// File-backed nodes are replaced by their cached entry and visited once
    /// per path. Connectors are leaves that share the registry path of their
    /// connector, so they are visited on every occurrence.
    pub fn walk<F>(&self, tree: &DependencyTree, mut visit: F)
    where
        F: FnMut(&Dependency),
    {
        let mut seen_paths: HashSet<PathBuf> = HashSet::new();
        let mut seen_inline: HashSet<*const Dependency> = HashSet::new();
        seen_paths.insert(tree.path.clone());

        let mut stack: Vec<Rc<Dependency>> = tree.children.iter().rev().cloned().collect();
        while let Some(dep) = stack.pop() {
            let node = if dep.kind == ArtifactKind::Connector {
                dep
            } else if let Some(path) = dep.path.clone() {
                if !seen_paths.insert(path.clone()) {
                    continue;
                }
                self.get(&path).unwrap_or(dep)
            } else {
                if !seen_inline.insert(Rc::as_ptr(&dep)) {
                    continue;
                }
                dep
            };
            visit(node.as_ref());
            stack.extend(node.children.iter().rev().cloned());
        }
    }
}
