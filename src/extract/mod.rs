//! Reference Extraction
//!
//! Walks a mediator tree and turns every reference it finds into a
//! [`Dependency`]. Each element is classified by its canonical tag and looked
//! up in a fixed dispatch table (see [`handlers`]); elements without an entry
//! are opaque and the walk simply continues into their children.
//!
//! Keyed references (a sequence by key, a template call, ...) are resolved
//! through a [`Resolve`] implementation, normally the artifact scanner, which
//! owns the locator and the dependency cache.

pub mod handlers;

use std::borrow::Cow;
use std::path::PathBuf;
use std::rc::Rc;

use crate::artifact::ArtifactKind;
use crate::ast::XmlNode;
use crate::dependency::Dependency;

pub use handlers::{dispatch_table, Handler, MediatorCategory, MediatorEntry};

/// Resolution services the extractor borrows from its caller
pub trait Resolve {
    /// Resolve a keyed reference; `None` when no artifact declares the key
    fn resolve(&mut self, key: &str, kind: ArtifactKind) -> Option<Rc<Dependency>>;

    /// Definition path of the connector behind an invocation tag
    fn connector_path(&self, invocation: &str) -> Option<PathBuf>;
}

/// Canonical form of a mediator tag
///
/// - `call-template` → `callTemplate` (hyphenated names are camel-cased)
/// - `syn:log` → `log` (namespace prefixes are dropped)
/// - `http.get` → `connector` (dotted tags are connector invocations)
pub fn canonical_tag(tag: &str) -> Cow<'_, str> {
    if let Some((head, rest)) = tag.split_once('-') {
        let mut out = String::with_capacity(tag.len());
        out.push_str(head);
        for segment in rest.split('-') {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
        Cow::Owned(out)
    } else if let Some((_, local)) = tag.split_once(':') {
        Cow::Borrowed(local)
    } else if tag.contains('.') {
        Cow::Borrowed("connector")
    } else {
        Cow::Borrowed(tag)
    }
}

/// Tag-driven reference extractor
#[derive(Debug, Clone, Copy)]
pub struct ReferenceExtractor {
    table: &'static std::collections::HashMap<&'static str, MediatorEntry>,
}

impl Default for ReferenceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceExtractor {
    pub fn new() -> Self {
        Self {
            table: dispatch_table(),
        }
    }

    /// Table entry for a raw tag
    pub fn entry(&self, tag: &str) -> Option<&MediatorEntry> {
        self.table.get(canonical_tag(tag).as_ref())
    }

    /// Dependencies of one node and everything below it
    pub fn extract(&self, node: &XmlNode, resolver: &mut dyn Resolve) -> Vec<Rc<Dependency>> {
        let mut out = Vec::new();
        self.visit(node, resolver, &mut out);
        out
    }

    /// Dependencies of a mediator list, flattened in document order
    pub fn extract_all(&self, nodes: &[XmlNode], resolver: &mut dyn Resolve) -> Vec<Rc<Dependency>> {
        let mut out = Vec::new();
        self.visit_all(nodes, resolver, &mut out);
        out
    }

    pub(crate) fn visit(
        &self,
        node: &XmlNode,
        resolver: &mut dyn Resolve,
        out: &mut Vec<Rc<Dependency>>,
    ) {
        match self.entry(&node.tag) {
            Some(entry) => (entry.handler)(self, node, resolver, out),
            // Unknown tags are opaque
            None => self.visit_all(&node.children, resolver, out),
        }
    }

    pub(crate) fn visit_all(
        &self,
        nodes: &[XmlNode],
        resolver: &mut dyn Resolve,
        out: &mut Vec<Rc<Dependency>>,
    ) {
        for node in nodes {
            self.visit(node, resolver, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Resolver over a fixed key table that records every request
    #[derive(Default)]
    struct FakeResolver {
        known: HashMap<(String, ArtifactKind), Rc<Dependency>>,
        requests: Vec<(String, ArtifactKind)>,
    }

    impl FakeResolver {
        fn with(mut self, key: &str, kind: ArtifactKind) -> Self {
            let dep = Rc::new(Dependency::leaf(
                Some(key.to_string()),
                kind,
                Some(PathBuf::from(format!("/p/{}/{key}.xml", kind.dir_name().unwrap_or("x")))),
            ));
            self.known.insert((key.to_string(), kind), dep);
            self
        }
    }

    impl Resolve for FakeResolver {
        fn resolve(&mut self, key: &str, kind: ArtifactKind) -> Option<Rc<Dependency>> {
            self.requests.push((key.to_string(), kind));
            self.known.get(&(key.to_string(), kind)).cloned()
        }

        fn connector_path(&self, invocation: &str) -> Option<PathBuf> {
            invocation
                .starts_with("http.")
                .then(|| PathBuf::from("/p/connectors/http-connector-0.1.8.zip"))
        }
    }

    fn names(deps: &[Rc<Dependency>]) -> Vec<(String, ArtifactKind)> {
        deps.iter()
            .map(|d| (d.name.clone().unwrap_or_default(), d.kind))
            .collect()
    }

    #[test]
    fn test_canonical_tag() {
        assert_eq!(canonical_tag("call-template"), "callTemplate");
        assert_eq!(canonical_tag("on-complete"), "onComplete");
        assert_eq!(canonical_tag("scatter-gather"), "scatterGather");
        assert_eq!(canonical_tag("syn:log"), "log");
        assert_eq!(canonical_tag("http.get"), "connector");
        assert_eq!(canonical_tag("salesforce.query.all"), "connector");
        assert_eq!(canonical_tag("filter"), "filter");
        // hyphen wins over the other rules
        assert_eq!(canonical_tag("ns:call-template"), "ns:callTemplate");
    }

    #[test]
    fn test_table_is_comprehensive() {
        let table = dispatch_table();
        assert!(table.len() >= 50);
        let extractor = ReferenceExtractor::new();
        let category = |tag: &str| extractor.entry(tag).map(|e| e.category);
        assert_eq!(category("call-template"), Some(MediatorCategory::Core));
        assert_eq!(category("foreach"), Some(MediatorCategory::FlowControl));
        assert_eq!(category("email.send"), Some(MediatorCategory::Connector));
        assert!(extractor.entry("definitely-not-a-mediator").is_none());
    }

    #[test]
    fn test_keyed_references() {
        let seq = XmlNode::new("sequence")
            .with_child(XmlNode::new("sequence").with_attr("key", "Validate"))
            .with_child(XmlNode::new("call-template").with_attr("target", "Notify"))
            .with_child(XmlNode::new("store").with_attr("messageStore", "Orders"))
            .with_child(
                XmlNode::new("call").with_child(XmlNode::new("endpoint").with_attr("key", "Backend")),
            );

        let mut resolver = FakeResolver::default()
            .with("Validate", ArtifactKind::Sequence)
            .with("Notify", ArtifactKind::Template)
            .with("Orders", ArtifactKind::MessageStore)
            .with("Backend", ArtifactKind::Endpoint);

        let deps = ReferenceExtractor::new().extract_all(&seq.children, &mut resolver);
        assert_eq!(
            names(&deps),
            vec![
                ("Validate".to_string(), ArtifactKind::Sequence),
                ("Notify".to_string(), ArtifactKind::Template),
                ("Orders".to_string(), ArtifactKind::MessageStore),
                ("Backend".to_string(), ArtifactKind::Endpoint),
            ]
        );
    }

    #[test]
    fn test_unresolved_references_are_dropped() {
        let node = XmlNode::new("sequence").with_attr("key", "Missing");
        let mut resolver = FakeResolver::default();
        let deps = ReferenceExtractor::new().extract(&node, &mut resolver);
        assert!(deps.is_empty());
        assert_eq!(resolver.requests, vec![("Missing".to_string(), ArtifactKind::Sequence)]);
    }

    #[test]
    fn test_dynamic_keys_are_not_resolved() {
        let node = XmlNode::new("sequence").with_attr("key", "{get-property('next')}");
        let mut resolver = FakeResolver::default();
        assert!(ReferenceExtractor::new().extract(&node, &mut resolver).is_empty());
        assert!(resolver.requests.is_empty());
    }

    #[test]
    fn test_structural_mediators_flatten() {
        let filter = XmlNode::new("filter")
            .with_attr("xpath", "//order")
            .with_child(
                XmlNode::new("then")
                    .with_child(XmlNode::new("http.post"))
                    .with_child(XmlNode::new("sequence").with_child(XmlNode::new("email.send"))),
            )
            .with_child(XmlNode::new("else").with_attr("sequence", "Reject"));
        let aggregate = XmlNode::new("aggregate").with_child(
            XmlNode::new("onComplete")
                .with_attr("expression", "//x")
                .with_child(XmlNode::new("sequence").with_attr("key", "Reply")),
        );
        let foreach = XmlNode::new("foreach").with_attr("sequence", "PerItem");

        let mut resolver = FakeResolver::default()
            .with("Reject", ArtifactKind::Sequence)
            .with("Reply", ArtifactKind::Sequence)
            .with("PerItem", ArtifactKind::Sequence);

        let extractor = ReferenceExtractor::new();
        let deps = extractor.extract_all(&[filter, aggregate, foreach], &mut resolver);
        assert_eq!(
            names(&deps),
            vec![
                ("http.post".to_string(), ArtifactKind::Connector),
                ("email.send".to_string(), ArtifactKind::Connector),
                ("Reject".to_string(), ArtifactKind::Sequence),
                ("Reply".to_string(), ArtifactKind::Sequence),
                ("PerItem".to_string(), ArtifactKind::Sequence),
            ]
        );
    }

    #[test]
    fn test_connector_invocation() {
        let node = XmlNode::new("http.get")
            .with_attr("configKey", "Backend")
            .with_child(XmlNode::new("relativePath").with_text("/orders"));
        let mut resolver = FakeResolver::default();
        let deps = ReferenceExtractor::new().extract(&node, &mut resolver);

        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].kind, ArtifactKind::Connector);
        assert_eq!(deps[0].name.as_deref(), Some("http.get"));
        assert_eq!(
            deps[0].path,
            Some(PathBuf::from("/p/connectors/http-connector-0.1.8.zip"))
        );
        assert!(deps[0].children.is_empty());

        let unregistered = ReferenceExtractor::new().extract(&XmlNode::new("kafka.publish"), &mut resolver);
        assert_eq!(unregistered[0].path, None);
    }

    #[test]
    fn test_inline_endpoint() {
        let call = XmlNode::new("call").with_child(
            XmlNode::new("endpoint").with_attr("name", "Pool").with_child(
                XmlNode::new("loadbalance")
                    .with_child(XmlNode::new("endpoint").with_attr("key", "NodeA"))
                    .with_child(XmlNode::new("endpoint").with_child(XmlNode::new("http"))),
            ),
        );
        let mut resolver = FakeResolver::default().with("NodeA", ArtifactKind::Endpoint);
        let deps = ReferenceExtractor::new().extract(&call, &mut resolver);

        assert_eq!(deps.len(), 1);
        let pool = &deps[0];
        assert!(pool.is_inline());
        assert_eq!(pool.name.as_deref(), Some("Pool"));
        assert_eq!(pool.kind, ArtifactKind::Endpoint);
        assert_eq!(pool.children.len(), 2);
        assert_eq!(pool.children[0].name.as_deref(), Some("NodeA"));
        assert!(pool.children[1].is_inline());
    }

    #[test]
    fn test_unknown_tags_are_transparent() {
        let node = XmlNode::new("vendorWrapper")
            .with_child(XmlNode::new("innerThing").with_child(XmlNode::new("sequence").with_attr("key", "Deep")));
        let mut resolver = FakeResolver::default().with("Deep", ArtifactKind::Sequence);
        let deps = ReferenceExtractor::new().extract(&node, &mut resolver);
        assert_eq!(names(&deps), vec![("Deep".to_string(), ArtifactKind::Sequence)]);
    }

    #[test]
    fn test_send_callout_and_throttle_attributes() {
        let nodes = vec![
            XmlNode::new("send").with_attr("receive", "OnReply"),
            XmlNode::new("callout").with_attr("endpointKey", "Legacy"),
            XmlNode::new("throttle")
                .with_attr("onAccept", "Accepted")
                .with_attr("onReject", "Rejected"),
        ];
        let mut resolver = FakeResolver::default()
            .with("OnReply", ArtifactKind::Sequence)
            .with("Legacy", ArtifactKind::Endpoint)
            .with("Accepted", ArtifactKind::Sequence)
            .with("Rejected", ArtifactKind::Sequence);
        let deps = ReferenceExtractor::new().extract_all(&nodes, &mut resolver);
        assert_eq!(deps.len(), 4);
    }
}
