//! xjconv - XML <-> JSON conversion with AddressBook schema validation
//!
//! # Quick Start
//!
//! ```
//! use xjconv::{json_to_xml, validate, xml_to_json};
//! # fn main() -> Result<(), xjconv::Error> {
//! let xml = "<AddressBook><Contact><City>Oslo</City></Contact></AddressBook>";
//! assert_eq!(xml_to_json(xml)?, r#"{"AddressBook":{"Contact":{"City":"Oslo"}}}"#);
//! assert!(!validate(xml).is_valid());
//!
//! let back = json_to_xml(r#"{"a":"1","b":{"c":"2"}}"#)?;
//! assert_eq!(back, "<a>1</a>\n<b>\n  <c>2</c>\n</b>\n");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod lexer;
pub use lexer::{Token, TokenKind};

pub mod tree;
pub use tree::{Array, Node, Object};

pub mod convert;
pub use convert::{
    convert, convert_with_options, json_to_xml, xml_to_json, ConvertOptions, Direction,
};

pub mod json;
pub mod xml;
pub use json::{Config as JsonConfig, Parser as JsonParser};
pub use xml::{
    Config as XmlConfig, Content as XmlContent, Document as XmlDocument, Element as XmlElement,
    Parser as XmlParser,
};

pub mod schema;
pub use schema::{validate, Schema, Validation};

/// Parse JSON text into a document tree
pub fn from_json_str(s: &str) -> Result<Node> {
    JsonParser::new(s.as_bytes()).parse()
}

/// Parse an XML document
pub fn from_xml_str(s: &str) -> Result<XmlDocument> {
    XmlParser::new(s.as_bytes()).parse()
}
