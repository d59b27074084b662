//! Indented XML serialization

use crate::xml::model::{Content, Element};

const INDENT: &str = "  ";

/// Serialize a sequence of top-level nodes, one per line
pub fn write_elements(nodes: &[Content]) -> String {
    let mut output = String::new();
    for node in nodes {
        write_content(node, 0, &mut output);
    }
    output
}

fn write_content(node: &Content, depth: usize, output: &mut String) {
    match node {
        Content::Element(element) => write_element(element, depth, output),
        Content::Text(text) => {
            pad(depth, output);
            output.push_str(&escape_text(text));
            output.push('\n');
        }
    }
}

fn write_element(element: &Element, depth: usize, output: &mut String) {
    pad(depth, output);
    output.push('<');
    output.push_str(&element.name);

    for (key, value) in &element.attributes {
        output.push(' ');
        output.push_str(key);
        output.push_str("=\"");
        output.push_str(&escape_attribute(value));
        output.push('"');
    }

    if element.children.is_empty() {
        output.push_str("/>\n");
        return;
    }

    output.push('>');
    if element.has_child_elements() {
        output.push('\n');
        for child in &element.children {
            write_content(child, depth + 1, output);
        }
        pad(depth, output);
    } else {
        output.push_str(&escape_text(&element.text()));
    }
    output.push_str("</");
    output.push_str(&element.name);
    output.push_str(">\n");
}

fn pad(depth: usize, output: &mut String) {
    for _ in 0..depth {
        output.push_str(INDENT);
    }
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(input: &str) -> String {
    escape_text(input)
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
