/// Attribute handlers.
///
/// An [`AttrConfig`] maps one XML attribute to one typed internal value and back.
/// Handlers are plain data built in `const` context, so whole translator tables
/// live in statics.
use crate::common::color;
use crate::common::xml::XmlAttrs;
use crate::model::Attrs;
use serde_json::Value;

/// Encode half of an attribute handler: raw XML attributes → typed value.
pub type AttrEncodeFn = fn(&AttrConfig, &XmlAttrs) -> Option<Value>;

/// Decode half of an attribute handler: internal attributes → XML string.
pub type AttrDecodeFn = fn(&AttrConfig, &Attrs) -> Option<String>;

/// One attribute mapping.
#[derive(Clone, Copy)]
pub struct AttrConfig {
    /// Qualified XML attribute name, e.g. `w:val`
    pub xml_name: &'static str,
    /// Key in the internal attribute bag
    pub internal_name: &'static str,
    encode_fn: AttrEncodeFn,
    decode_fn: AttrDecodeFn,
}

impl std::fmt::Debug for AttrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttrConfig")
            .field("xml_name", &self.xml_name)
            .field("internal_name", &self.internal_name)
            .finish()
    }
}

impl AttrConfig {
    /// Attribute with custom encode/decode functions.
    pub const fn custom(
        xml_name: &'static str,
        internal_name: &'static str,
        encode_fn: AttrEncodeFn,
        decode_fn: AttrDecodeFn,
    ) -> Self {
        Self {
            xml_name,
            internal_name,
            encode_fn,
            decode_fn,
        }
    }

    /// String attribute kept verbatim.
    pub const fn string(xml_name: &'static str, internal_name: &'static str) -> Self {
        Self::custom(xml_name, internal_name, encode_string, decode_string)
    }

    /// Integer attribute; unparsable values are treated as absent.
    pub const fn integer(xml_name: &'static str, internal_name: &'static str) -> Self {
        Self::custom(xml_name, internal_name, encode_integer, decode_integer)
    }

    /// ST_OnOff attribute. `true`/`on`/`1` encode to `true`, `false`/`off`/`0` to `false`.
    ///
    /// Decoding normalises to `1`/`0`.
    pub const fn on_off(xml_name: &'static str, internal_name: &'static str) -> Self {
        Self::custom(xml_name, internal_name, encode_on_off, decode_on_off)
    }

    /// Hex colour attribute, normalised to `#rrggbb` internally and `RRGGBB` in XML.
    pub const fn color(xml_name: &'static str, internal_name: &'static str) -> Self {
        Self::custom(xml_name, internal_name, encode_color, decode_color)
    }

    /// Encode this attribute from the element's full raw attribute map.
    #[inline]
    pub fn encode(&self, attrs: &XmlAttrs) -> Option<Value> {
        (self.encode_fn)(self, attrs)
    }

    /// Decode this attribute from the internal attribute bag.
    #[inline]
    pub fn decode(&self, attrs: &Attrs) -> Option<String> {
        (self.decode_fn)(self, attrs)
    }
}

/// Run every handler over an element's attributes; unknown attributes are ignored.
pub fn encode_all(configs: &[AttrConfig], attrs: &XmlAttrs) -> Attrs {
    let mut encoded = Attrs::new();
    for config in configs {
        if let Some(value) = config.encode(attrs) {
            encoded.insert(config.internal_name.to_string(), value);
        }
    }
    encoded
}

/// Run every handler over an internal attribute bag, in declared order.
pub fn decode_all(configs: &[AttrConfig], attrs: &Attrs) -> XmlAttrs {
    let mut decoded = XmlAttrs::new();
    for config in configs {
        if let Some(value) = config.decode(attrs) {
            decoded.insert(config.xml_name.to_string(), value);
        }
    }
    decoded
}

/// Parse a decimal integer the way WordprocessingML writes them.
#[inline]
pub fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    atoi_simd::parse::<i64, false, false>(raw.as_bytes()).ok()
}

/// Format an integer for XML without going through `fmt`.
#[inline]
pub fn format_int(value: i64) -> String {
    itoa::Buffer::new().format(value).to_string()
}

/// Interpret an ST_OnOff value.
#[inline]
pub fn parse_on_off(raw: &str) -> Option<bool> {
    match raw {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        _ => None,
    }
}

fn encode_string(config: &AttrConfig, attrs: &XmlAttrs) -> Option<Value> {
    attrs
        .get(config.xml_name)
        .map(|raw| Value::String(raw.clone()))
}

fn decode_string(config: &AttrConfig, attrs: &Attrs) -> Option<String> {
    match attrs.get(config.internal_name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn encode_integer(config: &AttrConfig, attrs: &XmlAttrs) -> Option<Value> {
    attrs
        .get(config.xml_name)
        .and_then(|raw| parse_int(raw))
        .map(Value::from)
}

fn decode_integer(config: &AttrConfig, attrs: &Attrs) -> Option<String> {
    match attrs.get(config.internal_name)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .map(format_int),
        Value::String(s) => parse_int(s).map(format_int),
        _ => None,
    }
}

fn encode_on_off(config: &AttrConfig, attrs: &XmlAttrs) -> Option<Value> {
    attrs
        .get(config.xml_name)
        .and_then(|raw| parse_on_off(raw))
        .map(Value::Bool)
}

fn decode_on_off(config: &AttrConfig, attrs: &Attrs) -> Option<String> {
    match attrs.get(config.internal_name)? {
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some("0".to_string()),
        _ => None,
    }
}

fn encode_color(config: &AttrConfig, attrs: &XmlAttrs) -> Option<Value> {
    attrs
        .get(config.xml_name)
        .map(|raw| Value::String(color::xml_to_internal(raw)))
}

fn decode_color(config: &AttrConfig, attrs: &Attrs) -> Option<String> {
    attrs
        .get(config.internal_name)
        .and_then(Value::as_str)
        .map(color::internal_to_xml)
}
