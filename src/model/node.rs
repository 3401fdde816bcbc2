/// The internal structured document tree consumed by the editing surface.
///
/// Unlike [`XmlNode`](crate::XmlNode), attribute values are typed JSON values.
/// A missing key means "absent"; `Value::Null` means "explicitly cleared".
use super::mark::{Mark, MarkKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Typed attribute bag of an internal node.
pub type Attrs = Map<String, Value>;

/// Kind of an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// Document root; content is the body's blocks
    Doc,
    Paragraph,
    Run,
    Tab,
    LineBreak,
    Table,
    TableRow,
    TableCell,
    BookmarkStart,
    BookmarkEnd,
    /// Complex or simple field; content is the field result
    Field,
    /// Block-level XML the engine does not understand, kept verbatim
    PassthroughBlock,
    /// Inline XML the engine does not understand, kept verbatim
    PassthroughInline,
}

impl NodeKind {
    /// Name of the node in the editor schema.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doc => "doc",
            Self::Paragraph => "paragraph",
            Self::Run => "run",
            Self::Tab => "tab",
            Self::LineBreak => "lineBreak",
            Self::Table => "table",
            Self::TableRow => "tableRow",
            Self::TableCell => "tableCell",
            Self::BookmarkStart => "bookmarkStart",
            Self::BookmarkEnd => "bookmarkEnd",
            Self::Field => "field",
            Self::PassthroughBlock => "passthroughBlock",
            Self::PassthroughInline => "passthroughInline",
        }
    }

    /// Whether nodes of this kind sit at block level.
    #[inline]
    pub const fn is_block(self) -> bool {
        matches!(
            self,
            Self::Doc | Self::Paragraph | Self::Table | Self::TableRow | Self::TableCell
                | Self::PassthroughBlock
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text carried inside an inline node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
}

impl TextRun {
    #[inline]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One entry of a node's ordered content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Node(InternalNode),
    Text(TextRun),
}

impl Content {
    /// The node, if this entry is one.
    #[inline]
    pub fn as_node(&self) -> Option<&InternalNode> {
        match self {
            Content::Node(node) => Some(node),
            Content::Text(_) => None,
        }
    }

    /// Mutable access to the node, if this entry is one.
    #[inline]
    pub fn as_node_mut(&mut self) -> Option<&mut InternalNode> {
        match self {
            Content::Node(node) => Some(node),
            Content::Text(_) => None,
        }
    }
}

impl From<InternalNode> for Content {
    fn from(node: InternalNode) -> Self {
        Content::Node(node)
    }
}

impl From<TextRun> for Content {
    fn from(text: TextRun) -> Self {
        Content::Text(text)
    }
}

/// A node of the internal document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Content>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl InternalNode {
    /// Create an empty node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: Attrs::new(),
            content: Vec::new(),
            marks: Vec::new(),
        }
    }

    /// Builder: set an attribute.
    pub fn with_attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    /// Builder: append a content entry.
    pub fn with_content(mut self, content: impl Into<Content>) -> Self {
        self.content.push(content.into());
        self
    }

    /// Builder: append a mark.
    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    /// Copy of this node's kind, attributes and marks without its content.
    pub fn shallow_clone(&self) -> Self {
        Self {
            kind: self.kind,
            attrs: self.attrs.clone(),
            content: Vec::new(),
            marks: self.marks.clone(),
        }
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

    /// Get an integer attribute value.
    #[inline]
    pub fn attr_i64(&self, name: &str) -> Option<i64> {
        self.attrs.get(name).and_then(Value::as_i64)
    }

    /// Get an object attribute value.
    #[inline]
    pub fn attr_object(&self, name: &str) -> Option<&Attrs> {
        self.attrs.get(name).and_then(Value::as_object)
    }

    /// Iterate over the child nodes, skipping text.
    pub fn child_nodes(&self) -> impl Iterator<Item = &InternalNode> {
        self.content.iter().filter_map(Content::as_node)
    }

    /// First mark of the given kind.
    #[inline]
    pub fn mark(&self, kind: MarkKind) -> Option<&Mark> {
        self.marks.iter().find(|m| m.kind == kind)
    }

    /// Whether the node carries a mark of the given kind.
    #[inline]
    pub fn has_mark(&self, kind: MarkKind) -> bool {
        self.mark(kind).is_some()
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        let mut stack: Vec<&Content> = self.content.iter().rev().collect();
        while let Some(entry) = stack.pop() {
            match entry {
                Content::Text(run) => text.push_str(&run.text),
                Content::Node(node) => stack.extend(node.content.iter().rev()),
            }
        }
        text
    }
}
