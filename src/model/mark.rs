/// Inline marks carried by internal nodes.
///
/// Marks hold character formatting and wrapper metadata (tracked changes,
/// hyperlinks) that the editor applies across a range instead of as a tree level.
use super::node::Attrs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of an inline mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkKind {
    Bold,
    Italic,
    Underline,
    Strike,
    /// Colour, size and font family collected into one mark
    TextStyle,
    Highlight,
    Link,
    TrackInsert,
    TrackDelete,
    TrackMoveFrom,
    TrackMoveTo,
}

impl MarkKind {
    /// Name of the mark in the editor schema.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Strike => "strike",
            Self::TextStyle => "textStyle",
            Self::Highlight => "highlight",
            Self::Link => "link",
            Self::TrackInsert => "trackInsert",
            Self::TrackDelete => "trackDelete",
            Self::TrackMoveFrom => "trackMoveFrom",
            Self::TrackMoveTo => "trackMoveTo",
        }
    }

    /// Whether the mark records a tracked change.
    #[inline]
    pub const fn is_tracked_change(self) -> bool {
        matches!(
            self,
            Self::TrackInsert | Self::TrackDelete | Self::TrackMoveFrom | Self::TrackMoveTo
        )
    }

    /// Whether text under this mark has been removed from the document.
    #[inline]
    pub const fn is_removal(self) -> bool {
        matches!(self, Self::TrackDelete | Self::TrackMoveFrom)
    }
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mark with its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: MarkKind,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attrs: Attrs,
}

impl Mark {
    /// Create a mark without attributes.
    #[inline]
    pub fn new(kind: MarkKind) -> Self {
        Self {
            kind,
            attrs: Attrs::new(),
        }
    }

    /// Create a mark with attributes.
    #[inline]
    pub fn with_attrs(kind: MarkKind, attrs: Attrs) -> Self {
        Self { kind, attrs }
    }

    /// Get an attribute value.
    #[inline]
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Get a string attribute value.
    #[inline]
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(Value::as_str)
    }
}
