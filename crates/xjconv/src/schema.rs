//! Structural validation against XML Schema documents
//!
//! Only the XSD subset needed by the embedded AddressBook schema is
//! supported. See [`Schema::compile`].

pub mod compile;
pub mod model;
pub mod validate;

use std::sync::OnceLock;

use crate::error::Result;

pub use compile::XSD_NAMESPACE;
pub use model::{Compositor, ContentModel, ElementDecl, Group, MaxOccurs, Schema, SimpleType};
pub use validate::{Validation, XSI_NAMESPACE};

/// The AddressBook schema XML input must conform to
pub const ADDRESS_BOOK_XSD: &str = include_str!("schema/address_book.xsd");

static ADDRESS_BOOK: OnceLock<Result<Schema>> = OnceLock::new();

impl Schema {
    /// The compiled AddressBook schema, compiled on first use
    pub fn address_book() -> Result<&'static Self> {
        ADDRESS_BOOK
            .get_or_init(|| Self::compile(ADDRESS_BOOK_XSD))
            .as_ref()
            .map_err(Clone::clone)
    }
}

/// Validate an XML document against the AddressBook schema
pub fn validate(xml: &str) -> Validation {
    match Schema::address_book() {
        Ok(schema) => schema.validate(xml),
        Err(err) => Validation::rejected(format!("schema could not be compiled: {err}")),
    }
}
