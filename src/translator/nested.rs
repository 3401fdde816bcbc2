/// Nested-properties combinator.
///
/// Builds the encode/decode pair of a property container (`w:pPr`, `w:rPr`,
/// `w:tcPr`, ...) from its ordered list of child translators. Encoding merges
/// each child's value into one object keyed by the child's internal name;
/// decoding walks the same list so exported children always come out in
/// schema order. Children no translator claims survive under
/// [`EXTRA_ELEMENTS`] and are written back after the declared ones.
use super::context::{ExportContext, ImportSession};
use super::node::{Decodable, Decoded, Encoded, NodeTranslator, single};
use crate::common::xml::XmlNode;
use crate::model::Attrs;
use serde_json::Value;

/// Key under which unclaimed container children are kept.
pub const EXTRA_ELEMENTS: &str = "extraElements";

/// Encode a property container element.
pub fn encode_nested(
    t: &NodeTranslator,
    session: &mut ImportSession<'_>,
    node: &XmlNode,
) -> Option<Encoded> {
    let props = encode_properties(t, session, node);
    if props.is_empty() {
        None
    } else {
        Some(Encoded::Value(Value::Object(props)))
    }
}

/// Encode a container to its property object, which may be empty.
pub fn encode_properties(
    t: &NodeTranslator,
    session: &mut ImportSession<'_>,
    node: &XmlNode,
) -> Attrs {
    let mut props = t.encode_attributes(node);

    for child in t.children {
        let Some(element) = node.child(child.xml_name) else {
            continue;
        };
        match child.encode(session, element) {
            Some(Encoded::Value(value)) => {
                props.insert(child.internal_name.to_string(), value);
            },
            Some(Encoded::Attr { name, value }) => {
                props.insert(name.to_string(), value);
            },
            Some(Encoded::Node(_)) | Some(Encoded::Nodes(_)) | None => {},
        }
    }

    let extras: Vec<&XmlNode> = node
        .elements
        .iter()
        .filter(|e| !t.children.iter().any(|c| c.xml_name == e.name))
        .collect();
    if !extras.is_empty() {
        match serde_json::to_value(&extras) {
            Ok(value) => {
                props.insert(EXTRA_ELEMENTS.to_string(), value);
            },
            Err(err) => log::warn!("dropping unknown children of {}: {err}", t.xml_name),
        }
    }

    props
}

/// Decode a property object back into its container element.
pub fn decode_nested(
    t: &NodeTranslator,
    ctx: &mut ExportContext<'_>,
    input: Decodable<'_>,
) -> Decoded {
    let Some(props) = input.value().and_then(Value::as_object) else {
        return Decoded::new();
    };
    match decode_properties(t, ctx, props) {
        Some(element) => single(element),
        None => Decoded::new(),
    }
}

/// Decode a property object; `None` when nothing would be written.
pub fn decode_properties(
    t: &NodeTranslator,
    ctx: &mut ExportContext<'_>,
    props: &Attrs,
) -> Option<XmlNode> {
    let mut element = t.element_with(props);

    for child in t.children {
        if let Some(value) = props.get(child.internal_name) {
            element.elements.extend(child.decode(ctx, Decodable::Value(value)));
        }
    }
    element.elements.extend(extra_elements(props));

    if element.elements.is_empty() && element.attributes.is_empty() {
        None
    } else {
        Some(element)
    }
}

/// Unclaimed children stored by [`encode_properties`].
pub fn extra_elements(props: &Attrs) -> Vec<XmlNode> {
    match props.get(EXTRA_ELEMENTS) {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(elements) => elements,
            Err(err) => {
                log::warn!("ignoring malformed {EXTRA_ELEMENTS}: {err}");
                Vec::new()
            },
        },
    }
}
