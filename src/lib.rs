//! Longan - bidirectional translation between WordprocessingML parts and an
//! editor document tree
//!
//! Import turns the parsed XML parts of a word-processing document into a
//! typed internal tree (paragraphs, runs, tables, fields, bookmarks, marks for
//! formatting and tracked changes). Export turns that tree back into XML.
//! Content the tree does not model is carried through so that importing and
//! exporting an unedited document reproduces its parts.
//!
//! # Features
//!
//! - **Declarative translators**: attribute handlers and property containers
//!   composed from static tables
//! - **List numbering**: template fallback, level overrides, label rendering
//!   and layered indentation
//! - **Table grids**: merged cells and grid gaps reconciled into a uniform grid
//! - **Wrapper unwrapping**: tracked changes, content controls, hyperlinks and
//!   alternate content mapped to marks and attributes, then rebuilt on export
//!
//! # Example
//!
//! ```rust
//! use longan::convert::{DOCUMENT_PART, DocumentParts};
//! use longan::{EngineConfig, ExportContext};
//!
//! # fn main() -> Result<(), longan::ConvertError> {
//! let parts = DocumentParts::from_xml_strings([(
//!     DOCUMENT_PART,
//!     r#"<w:document><w:body><w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Hello</w:t></w:r></w:p></w:body></w:document>"#,
//! )])?;
//!
//! let config = EngineConfig::default();
//! let imported = longan::import(&parts, &config)?;
//! assert_eq!(imported.document.text_content(), "Hello");
//!
//! let mut ctx = ExportContext::new(&config);
//! let exported = longan::export(&imported, &mut ctx)?;
//! assert_eq!(exported.get(DOCUMENT_PART), parts.get(DOCUMENT_PART));
//! # Ok(())
//! # }
//! ```

/// Shared infrastructure: errors, configuration, colours and the XML tree
pub mod common;

/// Part-level import and export
pub mod convert;

/// Dispatch layer: wrapper unwrapping on import, re-wrapping on export
pub mod dispatch;

/// WordprocessingML element and property translators
pub mod docx;

/// Internal document tree
pub mod model;

/// Numbering part model and list resolution
pub mod numbering;

/// Paragraph style sheet
pub mod styles;

/// Generic translator framework
pub mod translator;

// Re-export commonly used types for convenience
pub use common::{ConvertError, EngineConfig, Limits, Result, XmlAttrs, XmlNode};
pub use convert::{DocumentParts, Imported, export, import};
pub use model::{Attrs, Content, InternalNode, Mark, MarkKind, NodeKind, TextRun};
pub use translator::{ExportContext, ImportSession};
