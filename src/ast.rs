//! Artifact AST
//!
//! A deliberately thin element tree: tag, attributes, ordered children and
//! concatenated text. The engine only needs to see tags and a handful of
//! attributes, so nothing here is typed per mediator.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

use crate::error::{OverviewError, Result};

/// One element of an artifact document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Raw tag as written, including any namespace prefix
    pub tag: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order
    pub children: Vec<XmlNode>,
    /// Concatenated, trimmed text content
    pub text: String,
}

impl XmlNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Tag without its namespace prefix
    pub fn local_name(&self) -> &str {
        local_part(&self.tag)
    }

    /// Attribute value by name; prefixed attributes match on their local part
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .or_else(|| {
                self.attributes
                    .iter()
                    .find(|(key, _)| !key.starts_with("xmlns") && local_part(key) == name)
            })
            .map(|(_, value)| value.as_str())
    }

    /// Non-empty attribute value
    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// First child whose local name matches
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.local_name() == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.local_name() == name)
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Turns an artifact file into its element tree
pub trait AstProvider {
    fn parse(&self, path: &Path) -> Result<XmlNode>;
}

/// Default provider backed by quick-xml
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlAstProvider;

impl AstProvider for XmlAstProvider {
    fn parse(&self, path: &Path) -> Result<XmlNode> {
        let content = fs::read_to_string(path)?;
        parse_document(&content, path)
    }
}

/// Parse a whole document into its root element
pub fn parse_document(content: &str, path: &Path) -> Result<XmlNode> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(element(e, path)?);
            }
            Ok(Event::Empty(ref e)) => {
                // Self-closing element - start and end in one
                let node = element(e, path)?;
                attach(node, &mut stack, &mut root);
            }
            Ok(Event::End(_)) => {
                if let Some(node) = stack.pop() {
                    attach(node, &mut stack, &mut root);
                }
            }
            Ok(Event::Text(ref t)) => {
                if let Some(top) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| OverviewError::xml(path, format!("Text error: {e}")))?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref c)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(c));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(OverviewError::xml(
                    path,
                    format!("parse error at position {}: {e}", reader.error_position()),
                ));
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(OverviewError::xml(path, format!("unclosed element <{}>", open.tag)));
    }

    root.ok_or_else(|| OverviewError::EmptyDocument(path.to_path_buf()))
}

/// Read only the root element (attributes, no children)
///
/// Used when scanning a directory for a declared name, where parsing the
/// whole file would be wasted work.
pub fn read_root_element(path: &Path) -> Result<XmlNode> {
    let content = fs::read_to_string(path)?;
    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => return element(e, path),
            Ok(Event::Eof) => return Err(OverviewError::EmptyDocument(path.to_path_buf())),
            Err(e) => {
                return Err(OverviewError::xml(
                    path,
                    format!("parse error at position {}: {e}", reader.error_position()),
                ));
            }
            _ => {}
        }
    }
}

fn element(e: &BytesStart<'_>, path: &Path) -> Result<XmlNode> {
    let tag = std::str::from_utf8(e.name().as_ref())
        .map_err(|err| OverviewError::xml(path, format!("Invalid tag name: {err}")))?
        .to_string();

    let mut node = XmlNode::new(tag);
    for attr_result in e.attributes() {
        let attr = attr_result
            .map_err(|err| OverviewError::xml(path, format!("Attribute error: {err}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| OverviewError::xml(path, format!("Attribute key error: {err}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| OverviewError::xml(path, format!("Attribute value error: {err}")))?
            .to_string();
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn attach(node: XmlNode, stack: &mut [XmlNode], root: &mut Option<XmlNode>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}
