/// Error types for translation operations.
///
/// Only structurally unreadable input surfaces as an error. Unknown elements,
/// unresolvable references and malformed metadata degrade locally and are
/// reported through the `log` facade instead.
use thiserror::Error;

/// Result type for translation operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Error types for translation operations.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// A part's root element is not the one its part name requires
    #[error("Unexpected root element in {part}: expected {expected}, got {got}")]
    UnexpectedRoot {
        part: String,
        expected: String,
        got: String,
    },

    /// JSON (de)serialization of typed values failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two translators were registered under the same key
    #[error("Translator registered twice under key '{key}'")]
    DuplicateTranslator { key: String },

    /// Engine configuration could not be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<quick_xml::Error> for ConvertError {
    fn from(err: quick_xml::Error) -> Self {
        ConvertError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ConvertError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ConvertError::Xml(err.to_string())
    }
}
