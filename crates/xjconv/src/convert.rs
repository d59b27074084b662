//! XML <-> JSON conversion through the document tree

use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::error::{Error, ErrorKind, Result, Span};
use crate::json::{self, Config as JsonConfig, Parser as JsonParser};
use crate::tree::{Node, Object};
use crate::xml::model::{Content as XmlContent, Element as XmlElement};
use crate::xml::parser::{is_valid_name, is_xml_char, Config as XmlConfig, Parser as XmlParser};
use crate::xml::writer::write_elements;

/// Synthetic element wrapped around XML input so rootless fragments parse
pub const FRAGMENT_ROOT: &str = "xjconv-fragment";

/// Synthetic element holding the converted JSON root; never written out
pub const DOCUMENT_ROOT: &str = "xjconv-document";

/// Object key holding an element's attributes
pub const ATTRIBUTES_KEY: &str = "@attributes";

/// Object key holding the text of an element that also has attributes or children
pub const TEXT_KEY: &str = "#text";

/// Conversion direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    XmlToJson,
    JsonToXml,
}

impl Direction {
    /// Pick the direction from the input file name.
    ///
    /// Only a literal `.xml` suffix selects XML input; everything else is
    /// treated as JSON. The file content is never inspected.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        if path.as_ref().as_os_str().to_string_lossy().ends_with(".xml") {
            Self::XmlToJson
        } else {
            Self::JsonToXml
        }
    }
}

/// Parser limits used by a conversion
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub json: JsonConfig,
    pub xml: XmlConfig,
}

/// Convert `input` in the given direction with default limits
pub fn convert(input: &str, direction: Direction) -> Result<String> {
    convert_with_options(input, direction, &ConvertOptions::default())
}

/// Convert `input` in the given direction
#[instrument(skip_all, fields(direction = ?direction, len = input.len()))]
pub fn convert_with_options(
    input: &str,
    direction: Direction,
    options: &ConvertOptions,
) -> Result<String> {
    match direction {
        Direction::XmlToJson => xml_to_json_with_options(input, options),
        Direction::JsonToXml => json_to_xml_with_options(input, options),
    }
}

/// Convert XML text to compact JSON
pub fn xml_to_json(xml: &str) -> Result<String> {
    xml_to_json_with_options(xml, &ConvertOptions::default())
}

/// Convert JSON text to indented XML
pub fn json_to_xml(json: &str) -> Result<String> {
    json_to_xml_with_options(json, &ConvertOptions::default())
}

fn xml_to_json_with_options(xml: &str, options: &ConvertOptions) -> Result<String> {
    let wrapped = format!("<{FRAGMENT_ROOT}>{xml}</{FRAGMENT_ROOT}>");
    let doc = XmlParser::with_config(wrapped.as_bytes(), options.xml).parse()?;
    debug!(children = doc.root.children.len(), "parsed xml fragment");

    // the wrapper contributes its content only, never its name
    let node = element_to_node(&doc.root);
    Ok(json::to_string(&node))
}

fn json_to_xml_with_options(json: &str, options: &ConvertOptions) -> Result<String> {
    let node = JsonParser::with_config(json.as_bytes(), options.json).parse()?;
    debug!(kind = node_kind(&node), "parsed json document");

    let root = document_root(&node)?;
    Ok(write_elements(&root.children))
}

fn node_kind(node: &Node) -> &'static str {
    match node {
        Node::Null => "null",
        Node::Text(_) => "text",
        Node::Array(_) => "array",
        Node::Object(_) => "object",
    }
}

/// Build the tree node for one XML element
pub fn element_to_node(element: &XmlElement) -> Node {
    if element.attributes.is_empty() && !element.has_child_elements() {
        return Node::Text(element.text());
    }

    let mut obj = Object::new();

    if !element.attributes.is_empty() {
        let attrs: Object = element
            .attributes
            .iter()
            .map(|(key, value)| (key.clone(), Node::Text(value.clone())))
            .collect();
        obj.insert(ATTRIBUTES_KEY, attrs);
    }

    let text = element.text();
    let text = text.trim();
    if !text.is_empty() {
        obj.insert(TEXT_KEY, text);
    }

    for child in element.child_elements() {
        obj.append(child.name.clone(), element_to_node(child));
    }

    Node::Object(obj)
}

/// Wrap the JSON root value in the synthetic document element
fn document_root(node: &Node) -> Result<XmlElement> {
    match node {
        Node::Object(fields) => {
            let root = object_to_element(DOCUMENT_ROOT, fields)?;
            if !root.attributes.is_empty() {
                warn!(
                    count = root.attributes.len(),
                    "dropping attributes given for the document root"
                );
            }
            Ok(root)
        }
        _ => {
            let mut root = XmlElement::new(DOCUMENT_ROOT);
            root.children = node_to_children(node)?;
            Ok(root)
        }
    }
}

fn node_to_children(node: &Node) -> Result<Vec<XmlContent>> {
    match node {
        Node::Null => Ok(Vec::new()),
        Node::Text(text) if text.is_empty() => Ok(Vec::new()),
        Node::Text(text) => Ok(vec![XmlContent::Text(checked_text(text)?)]),
        Node::Object(fields) => Ok(object_to_element(DOCUMENT_ROOT, fields)?.children),
        Node::Array(items) => {
            let mut children = Vec::new();
            for item in items {
                children.extend(node_to_children(item)?);
            }
            Ok(children)
        }
    }
}

fn node_to_elements(name: &str, node: &Node) -> Result<Vec<XmlElement>> {
    check_name(name)?;
    match node {
        Node::Array(items) => {
            let mut elements = Vec::new();
            for item in items {
                elements.extend(node_to_elements(name, item)?);
            }
            Ok(elements)
        }
        Node::Object(fields) => Ok(vec![object_to_element(name, fields)?]),
        Node::Text(_) | Node::Null => {
            let mut element = XmlElement::new(name);
            element.children = node_to_children(node)?;
            Ok(vec![element])
        }
    }
}

fn object_to_element(name: &str, fields: &Object) -> Result<XmlElement> {
    let mut element = XmlElement::new(name);

    for (key, value) in fields {
        match (key.as_str(), value) {
            (ATTRIBUTES_KEY, Node::Object(attrs)) => {
                for (attr, attr_value) in attrs {
                    check_name(attr)?;
                    let value = checked_text(&scalar_text(attr_value))?;
                    element.attributes.insert(attr.clone(), value);
                }
            }
            (TEXT_KEY, Node::Text(text)) => {
                if !text.is_empty() {
                    element.children.push(XmlContent::Text(checked_text(text)?));
                }
            }
            _ => {
                let children = node_to_elements(key, value)?;
                element
                    .children
                    .extend(children.into_iter().map(XmlContent::Element));
            }
        }
    }

    Ok(element)
}

fn scalar_text(node: &Node) -> String {
    match node {
        Node::Null => String::new(),
        Node::Text(text) => text.clone(),
        Node::Array(_) | Node::Object(_) => json::to_string(node),
    }
}

/// Text that can be written as XML character data
fn checked_text(text: &str) -> Result<String> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(ch) => Err(Error::new(ErrorKind::InvalidChar { ch }, Span::empty())),
        None => Ok(text.to_string()),
    }
}

fn check_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::InvalidElementName {
                name: name.to_string(),
            },
            Span::empty(),
        ))
    }
}
