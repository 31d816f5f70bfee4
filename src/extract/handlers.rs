//! Mediator dispatch table
//!
//! One entry per known mediator, keyed by canonical tag. A handler receives
//! the element and appends whatever dependencies it contributes; handlers for
//! mediators that carry nested mediator lists recurse through the extractor.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::OnceLock;

use super::{ReferenceExtractor, Resolve};
use crate::artifact::ArtifactKind;
use crate::ast::XmlNode;
use crate::dependency::Dependency;

/// Handler signature shared by every table entry
pub type Handler = fn(&ReferenceExtractor, &XmlNode, &mut dyn Resolve, &mut Vec<Rc<Dependency>>);

/// Mediator families, mirroring the palette groups of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediatorCategory {
    Core,
    FlowControl,
    Filter,
    Transformation,
    Extension,
    Advanced,
    Connector,
    /// Named blocks nested inside other mediators (`then`, `onComplete`, ...)
    Block,
}

#[derive(Debug, Clone, Copy)]
pub struct MediatorEntry {
    pub category: MediatorCategory,
    pub handler: Handler,
}

const SEQUENCE_ATTRS: &[&str] = &["sequence", "inSequence", "outSequence", "faultSequence"];

/// The dispatch table, built on first use
pub fn dispatch_table() -> &'static HashMap<&'static str, MediatorEntry> {
    static TABLE: OnceLock<HashMap<&'static str, MediatorEntry>> = OnceLock::new();
    TABLE.get_or_init(build_table)
}

fn build_table() -> HashMap<&'static str, MediatorEntry> {
    use MediatorCategory::*;

    let entries: &[(&'static str, MediatorCategory, Handler)] = &[
        // Core
        ("call", Core, call),
        ("send", Core, send),
        ("callout", Core, callout),
        ("sequence", Core, sequence),
        ("callTemplate", Core, call_template),
        ("endpoint", Core, endpoint),
        ("store", Core, store),
        ("log", Core, leaf),
        ("property", Core, leaf),
        ("propertyGroup", Core, leaf),
        ("variable", Core, leaf),
        ("drop", Core, leaf),
        ("respond", Core, leaf),
        ("loopback", Core, leaf),
        ("throwError", Core, leaf),
        // Filter
        ("filter", Filter, structural),
        ("switch", Filter, structural),
        ("validate", Filter, structural),
        ("conditionalRouter", Filter, structural),
        ("router", Filter, structural),
        ("throttle", Filter, throttle),
        // Flow control
        ("foreach", FlowControl, foreach),
        ("iterate", FlowControl, structural),
        ("clone", FlowControl, structural),
        ("aggregate", FlowControl, structural),
        ("scatterGather", FlowControl, structural),
        ("cache", FlowControl, structural),
        ("transaction", FlowControl, leaf),
        ("enqueue", FlowControl, enqueue),
        ("target", FlowControl, target),
        ("route", FlowControl, structural),
        // Transformation
        ("payloadFactory", Transformation, leaf),
        ("enrich", Transformation, leaf),
        ("header", Transformation, leaf),
        ("makefault", Transformation, leaf),
        ("jsontransform", Transformation, leaf),
        ("datamapper", Transformation, leaf),
        ("smooks", Transformation, leaf),
        ("rewrite", Transformation, leaf),
        ("xslt", Transformation, resource_key),
        ("fastXSLT", Transformation, resource_key),
        ("xquery", Transformation, resource_key),
        ("schema", Transformation, resource_key),
        // Extension
        ("script", Extension, resource_key),
        ("class", Extension, leaf),
        ("bean", Extension, leaf),
        ("pojoCommand", Extension, leaf),
        ("spring", Extension, leaf),
        ("ejb", Extension, leaf),
        // Advanced
        ("dblookup", Advanced, leaf),
        ("dbreport", Advanced, leaf),
        ("dataServiceCall", Advanced, leaf),
        ("entitlementService", Advanced, structural),
        ("oauthService", Advanced, leaf),
        ("ntlm", Advanced, leaf),
        ("builder", Advanced, leaf),
        ("event", Advanced, leaf),
        ("publishEvent", Advanced, leaf),
        ("bam", Advanced, leaf),
        // Connector invocations (`name.method`)
        ("connector", Connector, connector),
        // Nested blocks
        ("then", Block, block),
        ("else", Block, block),
        ("case", Block, block),
        ("default", Block, block),
        ("onComplete", Block, block),
        ("onCacheHit", Block, block),
        ("onAccept", Block, block),
        ("onReject", Block, block),
        ("onFail", Block, block),
        ("obligations", Block, block),
        ("advice", Block, block),
        ("inSequence", Block, block),
        ("outSequence", Block, block),
        ("faultSequence", Block, block),
        ("resource", Block, block),
    ];

    entries
        .iter()
        .map(|&(tag, category, handler)| (tag, MediatorEntry { category, handler }))
        .collect()
}

/// Key usable for static lookup; expressions like `{get-property('x')}` are not
fn static_key(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.starts_with('{'))
}

fn push_keyed(
    key: Option<&str>,
    kind: ArtifactKind,
    resolver: &mut dyn Resolve,
    out: &mut Vec<Rc<Dependency>>,
) {
    if let Some(key) = static_key(key) {
        if let Some(dep) = resolver.resolve(key, kind) {
            out.push(dep);
        }
    }
}

fn push_sequence_attrs(node: &XmlNode, attrs: &[&str], resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    for attr in attrs {
        push_keyed(node.attr(attr), ArtifactKind::Sequence, resolver, out);
    }
}

/// Mediators that never reference another artifact
fn leaf(_: &ReferenceExtractor, _: &XmlNode, _: &mut dyn Resolve, _: &mut Vec<Rc<Dependency>>) {}

/// Containers whose nested lists are walked and flattened
fn structural(x: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    x.visit_all(&node.children, resolver, out);
}

/// Named block: an optional `sequence` attribute plus an inline list
fn block(x: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    push_sequence_attrs(node, SEQUENCE_ATTRS, resolver, out);
    x.visit_all(&node.children, resolver, out);
}

/// `<sequence key="..."/>` is a reference, `<sequence>...</sequence>` is anonymous
fn sequence(x: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    match node.attr_value("key") {
        Some(key) => push_keyed(Some(key), ArtifactKind::Sequence, resolver, out),
        None => x.visit_all(&node.children, resolver, out),
    }
}

fn call(x: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    x.visit_all(&node.children, resolver, out);
}

fn send(x: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    push_keyed(node.attr("receive"), ArtifactKind::Sequence, resolver, out);
    x.visit_all(&node.children, resolver, out);
}

fn callout(x: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    push_keyed(node.attr("endpointKey"), ArtifactKind::Endpoint, resolver, out);
    x.visit_all(&node.children, resolver, out);
}

/// Keyed endpoint, or an inline definition that becomes a path-less node
fn endpoint(x: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    if let Some(key) = node.attr_value("key") {
        push_keyed(Some(key), ArtifactKind::Endpoint, resolver, out);
        return;
    }
    if node.attr_value("key-expression").is_some() {
        return;
    }

    let mut children = Vec::new();
    push_keyed(node.attr("template"), ArtifactKind::Template, resolver, &mut children);
    x.visit_all(&node.children, resolver, &mut children);

    out.push(Rc::new(Dependency::new(
        node.attr_value("name").map(str::to_string),
        ArtifactKind::Endpoint,
        None,
        children,
    )));
}

fn call_template(_: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    push_keyed(node.attr("target"), ArtifactKind::Template, resolver, out);
}

fn store(_: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    push_keyed(node.attr("messageStore"), ArtifactKind::MessageStore, resolver, out);
    push_keyed(node.attr("sequence"), ArtifactKind::Sequence, resolver, out);
}

fn foreach(x: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    push_keyed(node.attr("sequence"), ArtifactKind::Sequence, resolver, out);
    x.visit_all(&node.children, resolver, out);
}

fn throttle(x: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    push_sequence_attrs(node, &["onAccept", "onReject"], resolver, out);
    x.visit_all(&node.children, resolver, out);
}

fn enqueue(_: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    push_keyed(node.attr("sequence"), ArtifactKind::Sequence, resolver, out);
}

/// `<target sequence=".." endpoint="..">` of iterate, clone, routers and proxies
fn target(x: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    push_sequence_attrs(node, SEQUENCE_ATTRS, resolver, out);
    push_keyed(node.attr("endpoint"), ArtifactKind::Endpoint, resolver, out);
    x.visit_all(&node.children, resolver, out);
}

/// Stylesheets, scripts and schemas kept as local entries
fn resource_key(_: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    push_keyed(node.attr("key"), ArtifactKind::LocalEntry, resolver, out);
}

fn connector(_: &ReferenceExtractor, node: &XmlNode, resolver: &mut dyn Resolve, out: &mut Vec<Rc<Dependency>>) {
    let name = node.local_name();
    let path = resolver.connector_path(name);
    out.push(Rc::new(Dependency::leaf(
        Some(name.to_string()),
        ArtifactKind::Connector,
        path,
    )));
}
