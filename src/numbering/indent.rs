/// Paragraph indentation and its layered resolution.
use crate::common::xml::XmlNode;
use crate::translator::attr::{format_int, parse_int};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Indentation in twentieths of a point. Every field is optional so that
/// layers can override each other field by field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hanging: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_line: Option<i64>,
}

impl Indent {
    /// Read a `w:ind` element. `w:start`/`w:end` are accepted for left/right.
    pub fn from_xml(node: &XmlNode) -> Self {
        let int = |a: &str, b: &str| node.attr(a).or_else(|| node.attr(b)).and_then(parse_int);
        Self {
            left: int("w:left", "w:start"),
            right: int("w:right", "w:end"),
            hanging: node.attr("w:hanging").and_then(parse_int),
            first_line: node.attr("w:firstLine").and_then(parse_int),
        }
    }

    /// Write a `w:ind` element with attributes in schema order.
    pub fn to_xml(&self) -> XmlNode {
        let mut node = XmlNode::new("w:ind");
        for (name, value) in [
            ("w:left", self.left),
            ("w:right", self.right),
            ("w:hanging", self.hanging),
            ("w:firstLine", self.first_line),
        ] {
            if let Some(v) = value {
                node.attributes.insert(name.to_string(), format_int(v));
            }
        }
        node
    }

    /// Read the internal object form; anything that is not an object is `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay `other` onto `self`; fields set in `other` win.
    pub fn merge(&mut self, other: &Indent) {
        self.left = other.left.or(self.left);
        self.right = other.right.or(self.right);
        self.hanging = other.hanging.or(self.hanging);
        self.first_line = other.first_line.or(self.first_line);
    }
}

/// Effective indentation of a paragraph: style, then numbering level, then
/// direct formatting, merged field by field. `None` when no layer sets anything.
pub fn resolve_indent(
    style: Option<&Indent>,
    numbering: Option<&Indent>,
    direct: Option<&Indent>,
) -> Option<Indent> {
    let mut effective = Indent::default();
    for layer in [style, numbering, direct].into_iter().flatten() {
        effective.merge(layer);
    }
    (!effective.is_empty()).then_some(effective)
}
