//! Artifact Scanning
//!
//! Loads one artifact file, names it, picks the walker for its root element
//! and runs the reference extractor over its content. Keyed references found
//! along the way are located, walked and memoized through the same scanner,
//! so every file is walked at most once per cache lifetime.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, trace, warn};

use crate::artifact::ArtifactKind;
use crate::ast::{AstProvider, XmlNode};
use crate::cache::DependencyCache;
use crate::connectors::ConnectorRegistry;
use crate::dependency::{Dependency, DependencyTree};
use crate::extract::{ReferenceExtractor, Resolve};
use crate::locator::ArtifactLocator;

/// Message processor parameters that name a sequence
const PROCESSOR_SEQUENCE_PARAMS: &[&str] = &[
    "message.processor.reply.sequence",
    "message.processor.fault.sequence",
    "message.processor.deactivate.sequence",
];

/// Scanner for the artifacts of one project
///
/// Owns the dependency cache; build one scanner per scan lifetime.
pub struct ArtifactScanner<'a> {
    project_root: PathBuf,
    provider: &'a dyn AstProvider,
    locator: ArtifactLocator,
    connectors: ConnectorRegistry,
    extractor: ReferenceExtractor,
    cache: DependencyCache,
}

impl<'a> ArtifactScanner<'a> {
    pub fn new(
        project_root: impl Into<PathBuf>,
        provider: &'a dyn AstProvider,
        locator: ArtifactLocator,
        connectors: ConnectorRegistry,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            provider,
            locator,
            connectors,
            extractor: ReferenceExtractor::new(),
            cache: DependencyCache::new(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn cache(&self) -> &DependencyCache {
        &self.cache
    }

    /// Scan one root artifact
    ///
    /// Never fails: an unreadable or malformed file yields an empty tree of
    /// kind `Unknown`.
    pub fn scan(&mut self, path: &Path) -> DependencyTree {
        if !self.cache.is_in_progress(path) {
            if let Some(done) = self.cache.get(path) {
                trace!(path = %path.display(), "scan served from cache");
                return DependencyTree {
                    path: path.to_path_buf(),
                    name: done.name.clone(),
                    kind: done.kind,
                    children: done.children.clone(),
                    error: None,
                };
            }
        }

        let root = match self.provider.parse(path) {
            Ok(root) => root,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable artifact");
                return DependencyTree::unreadable(path.to_path_buf(), e.to_string());
            }
        };

        let kind = ArtifactKind::from_root_tag(&root.tag);
        let name = display_name(&root);
        debug!(path = %path.display(), %kind, name = name.as_deref().unwrap_or(""), "scanning artifact");

        let placeholder = Rc::new(Dependency::leaf(name.clone(), kind, Some(path.to_path_buf())));
        let registered = self.cache.begin(path, placeholder);

        let children = self.walk_root(&root, kind);

        if registered {
            self.cache.put(
                path,
                Rc::new(Dependency::new(
                    name.clone(),
                    kind,
                    Some(path.to_path_buf()),
                    children.clone(),
                )),
            );
        }

        DependencyTree {
            path: path.to_path_buf(),
            name,
            kind,
            children,
            error: None,
        }
    }

    /// Resolve a located file into its shared dependency node
    fn resolve_path(&mut self, path: PathBuf, key: &str, kind: ArtifactKind) -> Rc<Dependency> {
        if let Some(dep) = self.cache.get(&path) {
            trace!(key, path = %path.display(), "reusing cached dependency");
            return dep;
        }

        let placeholder = Rc::new(Dependency::leaf(Some(key.to_string()), kind, Some(path.clone())));
        self.cache.begin(path.clone(), placeholder);

        let children = match self.provider.parse(&path) {
            Ok(root) => {
                let root_kind = ArtifactKind::from_root_tag(&root.tag);
                self.walk_root(&root, root_kind)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable dependency");
                Vec::new()
            }
        };

        let dep = Rc::new(Dependency::new(Some(key.to_string()), kind, Some(path.clone()), children));
        self.cache.put(path, Rc::clone(&dep));
        dep
    }

    /// Dependencies of a root element, by artifact kind
    fn walk_root(&mut self, root: &XmlNode, kind: ArtifactKind) -> Vec<Rc<Dependency>> {
        let mut out = Vec::new();

        match kind {
            ArtifactKind::InboundEndpoint => {
                let keys = ["sequence", "onError"].iter().filter_map(|a| root.attr_value(a));
                self.push_keys(keys, ArtifactKind::Sequence, &mut out);
            }
            ArtifactKind::Sequence => {
                self.push_keys(root.attr_value("onError"), ArtifactKind::Sequence, &mut out);
            }
            ArtifactKind::Task => {
                let sequences: Vec<String> = task_properties(root, "sequenceName");
                let proxies: Vec<String> = task_properties(root, "proxyName");
                self.push_keys(sequences.iter().map(String::as_str), ArtifactKind::Sequence, &mut out);
                self.push_keys(proxies.iter().map(String::as_str), ArtifactKind::ProxyService, &mut out);
            }
            ArtifactKind::MessageProcessor => {
                self.push_keys(root.attr_value("messageStore"), ArtifactKind::MessageStore, &mut out);
                self.push_keys(root.attr_value("targetEndpoint"), ArtifactKind::Endpoint, &mut out);
                let sequences: Vec<String> = PROCESSOR_SEQUENCE_PARAMS
                    .iter()
                    .filter_map(|p| parameter(root, p))
                    .collect();
                self.push_keys(sequences.iter().map(String::as_str), ArtifactKind::Sequence, &mut out);
                let stores: Vec<String> = parameter(root, "message.processor.failMessagesStore")
                    .into_iter()
                    .collect();
                self.push_keys(stores.iter().map(String::as_str), ArtifactKind::MessageStore, &mut out);
            }
            ArtifactKind::MessageStore => {
                let stores: Vec<String> = parameter(root, "store.failover.message.store.name")
                    .into_iter()
                    .collect();
                self.push_keys(stores.iter().map(String::as_str), ArtifactKind::MessageStore, &mut out);
            }
            _ => {}
        }

        let extractor = self.extractor;
        out.extend(extractor.extract_all(&root.children, self));
        out
    }

    fn push_keys<'k>(
        &mut self,
        keys: impl IntoIterator<Item = &'k str>,
        kind: ArtifactKind,
        out: &mut Vec<Rc<Dependency>>,
    ) {
        for key in keys {
            if let Some(dep) = self.resolve(key, kind) {
                out.push(dep);
            }
        }
    }
}

impl Resolve for ArtifactScanner<'_> {
    fn resolve(&mut self, key: &str, kind: ArtifactKind) -> Option<Rc<Dependency>> {
        let key = key.trim();
        if key.is_empty() || key.starts_with('{') {
            return None;
        }
        let path = self.locator.locate(key, kind, &self.project_root)?;
        Some(self.resolve_path(path, key, kind))
    }

    fn connector_path(&self, invocation: &str) -> Option<PathBuf> {
        self.connectors
            .lookup_invocation(invocation)
            .map(Path::to_path_buf)
    }
}

/// `name` attribute, then `key` attribute, then a `<name>` child's text
pub fn display_name(root: &XmlNode) -> Option<String> {
    root.attr_value("name")
        .or_else(|| root.attr_value("key"))
        .map(str::to_string)
        .or_else(|| {
            root.child("name")
                .map(|n| n.text.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        })
}

/// `<parameter name="...">value</parameter>`
fn parameter(root: &XmlNode, name: &str) -> Option<String> {
    root.children_named("parameter")
        .find(|p| p.attr("name") == Some(name))
        .and_then(|p| {
            p.attr_value("value")
                .map(str::to_string)
                .or_else(|| Some(p.text.trim().to_string()).filter(|t| !t.is_empty()))
        })
}

/// `<task:property name="sequenceName" value="..."/>`
fn task_properties(root: &XmlNode, name: &str) -> Vec<String> {
    root.children_named("property")
        .filter(|p| p.attr("name") == Some(name))
        .filter_map(|p| {
            p.attr_value("value")
                .map(str::to_string)
                .or_else(|| Some(p.text.trim().to_string()).filter(|t| !t.is_empty()))
        })
        .collect()
}
