//! XML element trees exchanged with the package reader and writer.

mod escape;
pub mod node;
pub mod reader;
pub mod writer;

pub use escape::{escape_attr, escape_text};
pub use node::{XmlAttrs, XmlNode};
