//! XML parser, writer and data model

pub mod model;
pub mod parser;
pub mod writer;

pub use model::{Content, Document, Element};
pub use parser::{Config, Parser};
pub use writer::write_elements;
