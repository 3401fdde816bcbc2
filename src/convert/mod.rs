//! Part-level conversion: a set of parsed XML parts in, one internal document
//! tree out, and back.

pub mod export;
pub mod import;
pub mod parts;

pub use export::export;
pub use import::{Imported, import};
pub use parts::{DOCUMENT_PART, DOCUMENT_ROOT, DocumentParts, NUMBERING_PART, STYLES_PART};
