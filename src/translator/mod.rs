//! Generic translation framework: attribute handlers, node translators, the
//! nested-properties combinator, per-conversion sessions and the registry.

pub mod attr;
pub mod context;
pub mod nested;
pub mod node;
pub mod registry;

pub use attr::AttrConfig;
pub use context::{ExportContext, FontSet, ImportSession};
pub use node::{Decodable, Decoded, Encoded, NodeTranslator, TranslatorKind, single};
pub use registry::{ElementKind, ensure_valid, translator_for};
