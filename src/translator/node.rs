/// Node translators.
///
/// A [`NodeTranslator`] converts one XML element type to one internal value or
/// node and back. Translators are immutable statics; everything that varies per
/// conversion lives in the session passed to the encode/decode functions.
use super::attr::{AttrConfig, decode_all, encode_all, parse_on_off};
use super::context::{ExportContext, ImportSession};
use super::nested;
use crate::common::xml::XmlNode;
use crate::model::{Attrs, Content, InternalNode};
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;

/// What a translator produces on the internal side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatorKind {
    /// A property value stored in the parent's attribute bag
    Attribute,
    /// A node of the internal tree
    Element,
}

/// Result of encoding one element.
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    /// Plain property value, keyed by the translator's internal name
    Value(Value),
    /// Property value tagged with its key, used when a container mixes
    /// properties with element children
    Attr { name: &'static str, value: Value },
    /// One internal node
    Node(InternalNode),
    /// Several content entries (text runs, unwrapped children)
    Nodes(Vec<Content>),
}

impl Encoded {
    /// Flatten node-shaped results into content entries.
    pub fn into_content(self) -> Vec<Content> {
        match self {
            Encoded::Node(node) => vec![Content::Node(node)],
            Encoded::Nodes(items) => items,
            Encoded::Value(_) | Encoded::Attr { .. } => Vec::new(),
        }
    }
}

/// Internal input handed to a decode function.
#[derive(Debug, Clone, Copy)]
pub enum Decodable<'a> {
    Value(&'a Value),
    Node(&'a InternalNode),
}

impl<'a> Decodable<'a> {
    /// The value, when decoding a property.
    #[inline]
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Decodable::Value(value) => Some(value),
            Decodable::Node(_) => None,
        }
    }

    /// The node, when decoding an element.
    #[inline]
    pub fn node(self) -> Option<&'a InternalNode> {
        match self {
            Decodable::Node(node) => Some(node),
            Decodable::Value(_) => None,
        }
    }
}

/// XML produced by a decode function. Empty means "absent".
pub type Decoded = SmallVec<[XmlNode; 1]>;

/// Encode function of a translator.
pub type EncodeFn = fn(&NodeTranslator, &mut ImportSession<'_>, &XmlNode) -> Option<Encoded>;

/// Decode function of a translator.
pub type DecodeFn = fn(&NodeTranslator, &mut ExportContext<'_>, Decodable<'_>) -> Decoded;

/// Immutable description of how one XML element maps to the internal tree.
///
/// Concrete translators are declared as statics, usually by starting from one of
/// the `const` constructors and overriding `attributes`/`children` with struct
/// update syntax:
///
/// ```rust
/// use longan::translator::{AttrConfig, NodeTranslator};
///
/// static SPACING: NodeTranslator = NodeTranslator {
///     attributes: &[
///         AttrConfig::integer("w:before", "before"),
///         AttrConfig::integer("w:after", "after"),
///     ],
///     ..NodeTranslator::object("w:spacing", "spacing")
/// };
/// assert_eq!(SPACING.attributes.len(), 2);
/// ```
#[derive(Clone, Copy)]
pub struct NodeTranslator {
    /// Qualified XML element name
    pub xml_name: &'static str,
    /// Key of the encoded value, or the internal node name
    pub internal_name: &'static str,
    pub kind: TranslatorKind,
    /// Attribute handlers applied to the element's own attributes
    pub attributes: &'static [AttrConfig],
    /// Child translators of a property container, in schema order
    pub children: &'static [&'static NodeTranslator],
    pub encode_fn: EncodeFn,
    pub decode_fn: DecodeFn,
}

impl fmt::Debug for NodeTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeTranslator")
            .field("xml_name", &self.xml_name)
            .field("internal_name", &self.internal_name)
            .field("kind", &self.kind)
            .field("children", &self.children.len())
            .finish()
    }
}

const VAL_STRING: &[AttrConfig] = &[AttrConfig::string("w:val", "val")];
const VAL_ON_OFF: &[AttrConfig] = &[AttrConfig::on_off("w:val", "val")];

impl NodeTranslator {
    /// Translator with custom encode/decode logic.
    pub const fn custom(
        xml_name: &'static str,
        internal_name: &'static str,
        kind: TranslatorKind,
        encode_fn: EncodeFn,
        decode_fn: DecodeFn,
    ) -> Self {
        Self {
            xml_name,
            internal_name,
            kind,
            attributes: &[],
            children: &[],
            encode_fn,
            decode_fn,
        }
    }

    /// Toggle property such as `w:b`.
    ///
    /// A bare element means `true`; `w:val="0"` (or `false`/`off`) means `false`.
    /// `true` decodes to a bare element, `false` to `w:val="0"`.
    pub const fn on_off(xml_name: &'static str, internal_name: &'static str) -> Self {
        Self {
            attributes: VAL_ON_OFF,
            ..Self::custom(xml_name, internal_name, TranslatorKind::Attribute, encode_toggle, decode_toggle)
        }
    }

    /// Property carried by a single `w:val` attribute. The codec defaults to
    /// string and can be replaced through `attributes`.
    pub const fn val(xml_name: &'static str, internal_name: &'static str) -> Self {
        Self {
            attributes: VAL_STRING,
            ..Self::custom(xml_name, internal_name, TranslatorKind::Attribute, encode_val, decode_val)
        }
    }

    /// Property whose attributes collect into one object.
    pub const fn object(xml_name: &'static str, internal_name: &'static str) -> Self {
        Self::custom(xml_name, internal_name, TranslatorKind::Attribute, encode_object, decode_object)
    }

    /// Child kept verbatim at its schema position without interpreting it.
    pub const fn raw(xml_name: &'static str, internal_name: &'static str) -> Self {
        Self::custom(xml_name, internal_name, TranslatorKind::Attribute, encode_raw, decode_raw)
    }

    /// Property container composed from `children`.
    pub const fn nested(xml_name: &'static str, internal_name: &'static str) -> Self {
        Self::custom(
            xml_name,
            internal_name,
            TranslatorKind::Attribute,
            nested::encode_nested,
            nested::decode_nested,
        )
    }

    /// Encode one element.
    #[inline]
    pub fn encode(&self, session: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
        (self.encode_fn)(self, session, node)
    }

    /// Encode one element on behalf of a container that also holds element
    /// children; plain values come back tagged with their key.
    pub fn encode_tagged(&self, session: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
        match self.encode(session, node)? {
            Encoded::Value(value) => Some(Encoded::Attr {
                name: self.internal_name,
                value,
            }),
            other => Some(other),
        }
    }

    /// Encode an element to a plain value, dropping node results.
    pub fn encode_value(&self, session: &mut ImportSession<'_>, node: &XmlNode) -> Option<Value> {
        match self.encode(session, node)? {
            Encoded::Value(value) | Encoded::Attr { value, .. } => Some(value),
            Encoded::Node(_) | Encoded::Nodes(_) => None,
        }
    }

    /// Decode one value or node.
    #[inline]
    pub fn decode(&self, ctx: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
        (self.decode_fn)(self, ctx, input)
    }

    /// Decode a property value to at most one element.
    pub fn decode_value(&self, ctx: &mut ExportContext<'_>, value: &Value) -> Option<XmlNode> {
        self.decode(ctx, Decodable::Value(value)).into_iter().next()
    }

    /// Run this translator's attribute handlers over an element.
    #[inline]
    pub fn encode_attributes(&self, node: &XmlNode) -> Attrs {
        encode_all(self.attributes, &node.attributes)
    }

    /// Create the bare XML element with attributes decoded from `attrs`.
    #[inline]
    pub fn element_with(&self, attrs: &Attrs) -> XmlNode {
        XmlNode {
            name: self.xml_name.to_string(),
            attributes: decode_all(self.attributes, attrs),
            ..XmlNode::default()
        }
    }
}

/// Wrap a single element as a decode result.
#[inline]
pub fn single(node: XmlNode) -> Decoded {
    let mut out = Decoded::new();
    out.push(node);
    out
}

fn encode_toggle(_: &NodeTranslator, _: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    let value = match node.attr("w:val") {
        None => true,
        Some(raw) => parse_on_off(raw)?,
    };
    Some(Encoded::Value(Value::Bool(value)))
}

fn decode_toggle(t: &NodeTranslator, _: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    match input.value() {
        Some(Value::Bool(true)) => single(XmlNode::new(t.xml_name)),
        Some(Value::Bool(false)) => single(XmlNode::new(t.xml_name).with_attr("w:val", "0")),
        _ => Decoded::new(),
    }
}

fn encode_val(t: &NodeTranslator, _: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    t.attributes
        .first()?
        .encode(&node.attributes)
        .map(Encoded::Value)
}

fn decode_val(t: &NodeTranslator, _: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    let (Some(codec), Some(value)) = (t.attributes.first(), input.value()) else {
        return Decoded::new();
    };
    let mut attrs = Attrs::new();
    attrs.insert(codec.internal_name.to_string(), value.clone());
    match codec.decode(&attrs) {
        Some(raw) => single(XmlNode::new(t.xml_name).with_attr(codec.xml_name, raw)),
        None => Decoded::new(),
    }
}

fn encode_object(t: &NodeTranslator, _: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    let attrs = t.encode_attributes(node);
    if attrs.is_empty() {
        None
    } else {
        Some(Encoded::Value(Value::Object(attrs)))
    }
}

fn decode_object(t: &NodeTranslator, _: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    let Some(attrs) = input.value().and_then(Value::as_object) else {
        return Decoded::new();
    };
    let element = t.element_with(attrs);
    if element.attributes.is_empty() {
        Decoded::new()
    } else {
        single(element)
    }
}

fn encode_raw(_: &NodeTranslator, _: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    serde_json::to_value(node).ok().map(Encoded::Value)
}

fn decode_raw(t: &NodeTranslator, _: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    let Some(value) = input.value().filter(|v| !v.is_null()) else {
        return Decoded::new();
    };
    match serde_json::from_value::<XmlNode>(value.clone()) {
        Ok(node) => single(node),
        Err(err) => {
            log::warn!("dropping undecodable {}: {err}", t.xml_name);
            Decoded::new()
        },
    }
}
