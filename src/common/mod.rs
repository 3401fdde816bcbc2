//! Common types and utilities shared by the translators.

// Submodule declarations
pub mod color;
pub mod config;
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use color::RGBColor;
pub use config::{EngineConfig, Limits};
pub use error::{ConvertError, Result};
pub use xml::{XmlAttrs, XmlNode};
