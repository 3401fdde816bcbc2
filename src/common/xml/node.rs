/// Parsed XML element tree.
///
/// This is the shape exchanged with the package reader and writer: every attribute
/// value is a string, attribute insertion order is kept, and child order is
/// significant.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Raw attribute map of one XML element.
pub type XmlAttrs = IndexMap<String, String>;

/// One XML element with its attributes, child elements and text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlNode {
    /// Qualified element name, e.g. `w:p`
    pub name: String,
    /// Attributes in document order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: XmlAttrs,
    /// Child elements in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<XmlNode>,
    /// Character data directly inside this element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl XmlNode {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder: append a child element.
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.elements.push(child);
        self
    }

    /// Builder: append several child elements.
    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlNode>) -> Self {
        self.elements.extend(children);
        self
    }

    /// Builder: set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Get an attribute value by qualified name.
    #[inline]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// First child element with the given name.
    #[inline]
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// All child elements with the given name, in order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.elements.iter().filter(move |e| e.name == name)
    }

    /// The `w:val` attribute of the named child, the most common property shape.
    pub fn child_val(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.attr("w:val"))
    }

    /// Local part of the element name (`p` for `w:p`).
    #[inline]
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Text content, or an empty string.
    #[inline]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Whether the element has neither attributes, children nor text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.elements.is_empty() && self.text.is_none()
    }

    /// Longest attribute value carried by this element alone (not its children).
    pub fn longest_attribute(&self) -> usize {
        self.attributes.values().map(String::len).max().unwrap_or(0)
    }

    /// Nesting depth of the subtree rooted here (a leaf has depth 1).
    ///
    /// Computed iteratively so that hostile input cannot exhaust the stack.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.elements.iter().map(|c| (c, depth + 1)));
        }
        max
    }
}
