//! Dependency trees
//!
//! A [`DependencyTree`] is the result of scanning one artifact file. Its
//! children are [`Dependency`] nodes, each standing for one referenced
//! artifact and, recursively, everything that artifact references.
//!
//! Dependencies reached through a key are shared through `Rc`: the cache
//! hands out the same node every time the same file is referenced.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::rc::Rc;

use crate::artifact::ArtifactKind;

/// One referenced artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub name: Option<String>,
    pub kind: ArtifactKind,
    /// `None` for inline definitions that have no file of their own
    pub path: Option<PathBuf>,
    pub children: Vec<Rc<Dependency>>,
}

impl Dependency {
    pub fn new(
        name: Option<String>,
        kind: ArtifactKind,
        path: Option<PathBuf>,
        children: Vec<Rc<Dependency>>,
    ) -> Self {
        Self { name, kind, path, children }
    }

    /// Childless node, used for connectors and in-progress placeholders
    pub fn leaf(name: Option<String>, kind: ArtifactKind, path: Option<PathBuf>) -> Self {
        Self::new(name, kind, path, Vec::new())
    }

    pub fn is_inline(&self) -> bool {
        self.path.is_none()
    }
}

/// Result of scanning one root artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyTree {
    pub path: PathBuf,
    pub name: Option<String>,
    pub kind: ArtifactKind,
    pub children: Vec<Rc<Dependency>>,
    /// Why the file could not be read or parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DependencyTree {
    /// Tree for an artifact that could not be read or parsed
    pub fn unreadable(path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            path,
            name: None,
            kind: ArtifactKind::Unknown,
            children: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// `Unknown` because parsing failed, not because the root was unrecognized
    pub fn is_unreadable(&self) -> bool {
        self.error.is_some()
    }

    /// Every dependency of the given kind, in pre-order
    pub fn collect_kind(&self, kind: ArtifactKind) -> Vec<&Dependency> {
        let mut seen: HashSet<*const Dependency> = HashSet::new();
        let mut out = Vec::new();
        for child in &self.children {
            collect_into(child, kind, &mut seen, &mut out);
        }
        out
    }

    /// Indented text rendering, one dependency per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} [{}] {}",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.kind,
            self.path.display()
        );
        for child in &self.children {
            render_into(child, 1, &mut out);
        }
        out
    }
}

fn collect_into<'a>(
    dep: &'a Rc<Dependency>,
    kind: ArtifactKind,
    seen: &mut HashSet<*const Dependency>,
    out: &mut Vec<&'a Dependency>,
) {
    if !seen.insert(Rc::as_ptr(dep)) {
        return;
    }
    if dep.kind == kind {
        out.push(&**dep);
    }
    for child in &dep.children {
        collect_into(child, kind, seen, out);
    }
}

fn render_into(dep: &Dependency, depth: usize, out: &mut String) {
    let location = dep
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(inline)".to_string());
    let _ = writeln!(
        out,
        "{}{} [{}] {}",
        "  ".repeat(depth),
        dep.name.as_deref().unwrap_or("<anonymous>"),
        dep.kind,
        location
    );
    for child in &dep.children {
        render_into(child, depth + 1, out);
    }
}
