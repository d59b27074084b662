//! Compact JSON serialization

use std::fmt::Write;

use crate::tree::Node;

/// Serialize a node as compact JSON, keeping key order
pub fn to_string(node: &Node) -> String {
    let mut output = String::new();
    write_node(node, &mut output);
    output
}

fn write_node(node: &Node, output: &mut String) {
    match node {
        Node::Null => output.push_str("null"),
        Node::Text(text) => write_string(text, output),
        Node::Array(items) => {
            output.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    output.push(',');
                }
                write_node(item, output);
            }
            output.push(']');
        }
        Node::Object(fields) => {
            output.push('{');
            for (i, (key, value)) in fields.iter().enumerate() {
                if i > 0 {
                    output.push(',');
                }
                write_string(key, output);
                output.push(':');
                write_node(value, output);
            }
            output.push('}');
        }
    }
}

fn write_string(input: &str, output: &mut String) {
    output.push('"');
    for ch in input.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            '\x08' => output.push_str("\\b"),
            '\x0C' => output.push_str("\\f"),
            c if c.is_control() => {
                let _ = write!(output, "\\u{:04x}", u32::from(c));
            }
            c => output.push(c),
        }
    }
    output.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Array, Object};

    #[test]
    fn test_compact_object_in_insertion_order() {
        let mut inner = Object::new();
        inner.insert("c", "2");
        let mut root = Object::new();
        root.insert("b", Node::Object(inner));
        root.insert("a", "1");

        assert_eq!(to_string(&Node::Object(root)), r#"{"b":{"c":"2"},"a":"1"}"#);
    }

    #[test]
    fn test_arrays_and_null() {
        let node: Node = vec![Node::from("x"), Node::Null, Node::Array(Array::new())].into();
        assert_eq!(to_string(&node), r#"["x",null,[]]"#);
    }

    #[test]
    fn test_string_escapes() {
        let node = Node::from("q\"b\\n\nr\rt\t\u{1}é");
        assert_eq!(to_string(&node), r#""q\"b\\n\nr\rt\t\u0001é""#);
    }
}
