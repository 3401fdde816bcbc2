//! WordprocessingML element translators.
//!
//! Property containers live in [`properties`]; the modules beside it translate
//! the body, block and inline elements and are looked up through the
//! [registry](crate::translator::registry).

pub mod body;
pub mod bookmark;
pub mod field;
pub mod paragraph;
pub mod properties;
pub mod run;
pub mod table;

use crate::common::xml::{XmlAttrs, XmlNode};
use crate::model::InternalNode;
use serde_json::Value;

/// Attribute holding an element's own XML attributes (rsids, paraIds, ...).
pub const XML_ATTRIBUTES: &str = "xmlAttributes";

/// Keep the raw attributes of `xml` on `node`.
pub fn keep_xml_attributes(node: &mut InternalNode, xml: &XmlNode) {
    if xml.attributes.is_empty() {
        return;
    }
    if let Ok(value) = serde_json::to_value(&xml.attributes) {
        node.attrs.insert(XML_ATTRIBUTES.to_string(), value);
    }
}

/// Raw attributes kept by [`keep_xml_attributes`].
pub fn xml_attributes(node: &InternalNode) -> XmlAttrs {
    match node.attr(XML_ATTRIBUTES) {
        None | Some(Value::Null) => XmlAttrs::new(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|err| {
            log::warn!("ignoring malformed {XML_ATTRIBUTES} on {}: {err}", node.kind);
            XmlAttrs::new()
        }),
    }
}

/// Store uninterpreted elements under `key`; nothing is stored for an empty list.
pub fn store_elements(node: &mut InternalNode, key: &str, elements: &[&XmlNode]) {
    if elements.is_empty() {
        return;
    }
    match serde_json::to_value(elements) {
        Ok(value) => {
            node.attrs.insert(key.to_string(), value);
        },
        Err(err) => log::warn!("dropping {key} of {}: {err}", node.kind),
    }
}

/// Elements stored by [`store_elements`].
pub fn stored_elements(node: &InternalNode, key: &str) -> Vec<XmlNode> {
    match node.attr(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|err| {
            log::warn!("ignoring malformed {key} on {}: {err}", node.kind);
            Vec::new()
        }),
    }
}

/// Store one uninterpreted element under `key`.
pub fn store_element(node: &mut InternalNode, key: &str, element: &XmlNode) {
    store_elements(node, key, &[element]);
}

/// Element stored by [`store_element`].
pub fn stored_element(node: &InternalNode, key: &str) -> Option<XmlNode> {
    stored_elements(node, key).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    #[test]
    fn test_xml_attributes_round_trip_in_order() {
        let xml = XmlNode::new("w:p")
            .with_attr("w:rsidR", "00A1")
            .with_attr("w14:paraId", "1F2E");
        let mut node = InternalNode::new(NodeKind::Paragraph);
        keep_xml_attributes(&mut node, &xml);
        assert_eq!(xml_attributes(&node), xml.attributes);
    }

    #[test]
    fn test_stored_element() {
        let sect = XmlNode::new("w:sectPr").with_child(XmlNode::new("w:pgSz").with_attr("w:w", "12240"));
        let mut node = InternalNode::new(NodeKind::Doc);
        store_element(&mut node, "sectionProperties", &sect);
        assert_eq!(stored_element(&node, "sectionProperties"), Some(sect));
        assert_eq!(stored_element(&node, "missing"), None);
    }
}
