/// Opaque passthrough nodes.
///
/// Elements no translator claims are kept as a single internal node holding
/// the serialized XML subtree, and written back unchanged on export.
use crate::common::xml::XmlNode;
use crate::model::{InternalNode, NodeKind};
use crate::translator::context::{ExportContext, ImportSession};
use crate::translator::{Decodable, Decoded, Encoded, NodeTranslator, TranslatorKind, single};

/// Attribute holding the preserved subtree.
pub const ORIGINAL_XML: &str = "originalXml";

pub static PASSTHROUGH_BLOCK: NodeTranslator = NodeTranslator::custom(
    "",
    "passthroughBlock",
    TranslatorKind::Element,
    encode_block,
    decode_passthrough,
);

pub static PASSTHROUGH_INLINE: NodeTranslator = NodeTranslator::custom(
    "",
    "passthroughInline",
    TranslatorKind::Element,
    encode_inline,
    decode_passthrough,
);

/// Wrap `node` verbatim in a passthrough node of `kind`.
pub fn preserve(node: &XmlNode, kind: NodeKind) -> InternalNode {
    log::trace!("preserving unknown element {} as {kind}", node.name);
    let mut preserved = InternalNode::new(kind);
    match serde_json::to_value(node) {
        Ok(value) => {
            preserved.attrs.insert(ORIGINAL_XML.to_string(), value);
        },
        Err(err) => log::warn!("could not preserve {}: {err}", node.name),
    }
    preserved
}

/// The subtree kept by [`preserve`].
pub fn original_xml(node: &InternalNode) -> Option<XmlNode> {
    let value = node.attr(ORIGINAL_XML)?;
    match serde_json::from_value(value.clone()) {
        Ok(xml) => Some(xml),
        Err(err) => {
            log::warn!("dropping {} with unreadable {ORIGINAL_XML}: {err}", node.kind);
            None
        },
    }
}

fn encode_block(_: &NodeTranslator, _: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    Some(Encoded::Node(preserve(node, NodeKind::PassthroughBlock)))
}

fn encode_inline(_: &NodeTranslator, _: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    Some(Encoded::Node(preserve(node, NodeKind::PassthroughInline)))
}

fn decode_passthrough(_: &NodeTranslator, _: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    match input.node().and_then(original_xml) {
        Some(xml) => single(xml),
        None => Decoded::new(),
    }
}
