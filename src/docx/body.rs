/// The document body (`w:body`), translated to the `doc` root node.
///
/// The body's closing `w:sectPr` describes the last section's page setup and
/// is kept verbatim so export can put it back after the blocks.
use super::{keep_xml_attributes, store_element, stored_element, xml_attributes};
use crate::common::xml::XmlNode;
use crate::dispatch;
use crate::model::{InternalNode, NodeKind};
use crate::translator::context::{ExportContext, ImportSession};
use crate::translator::{Decodable, Decoded, Encoded, NodeTranslator, TranslatorKind, single};

pub const SECTION_PROPERTIES_KEY: &str = "sectionProperties";

pub static BODY: NodeTranslator =
    NodeTranslator::custom("w:body", "doc", TranslatorKind::Element, encode_body, decode_body);

fn encode_body(_: &NodeTranslator, session: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    let mut doc = InternalNode::new(NodeKind::Doc);
    keep_xml_attributes(&mut doc, node);

    let blocks = match node.elements.split_last() {
        Some((last, rest)) if last.name == "w:sectPr" => {
            store_element(&mut doc, SECTION_PROPERTIES_KEY, last);
            rest
        },
        _ => node.elements.as_slice(),
    };
    doc.content = dispatch::encode_blocks(session, blocks);
    Some(Encoded::Node(doc))
}

fn decode_body(_: &NodeTranslator, ctx: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    let Some(doc) = input.node() else {
        return Decoded::new();
    };
    let mut body = XmlNode::new("w:body");
    body.attributes = xml_attributes(doc);
    body.elements = dispatch::decode_blocks(ctx, &doc.content);
    body.elements.extend(stored_element(doc, SECTION_PROPERTIES_KEY));
    single(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EngineConfig;

    #[test]
    fn test_section_properties_stay_last() {
        let source = r#"<w:body><w:p><w:r><w:t>a</w:t></w:r></w:p><w:tbl><w:tblGrid><w:gridCol w:w="100"/></w:tblGrid><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl><w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body>"#;
        let xml = XmlNode::parse(source).unwrap();
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let doc = match BODY.encode(&mut session, &xml) {
            Some(Encoded::Node(doc)) => doc,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(doc.kind, NodeKind::Doc);
        assert_eq!(doc.content.len(), 2);
        assert!(doc.attr(SECTION_PROPERTIES_KEY).is_some());

        let mut ctx = ExportContext::new(&config);
        assert_eq!(BODY.decode(&mut ctx, Decodable::Node(&doc)).into_vec(), vec![xml]);
    }

    #[test]
    fn test_empty_body() {
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let doc = match BODY.encode(&mut session, &XmlNode::new("w:body")) {
            Some(Encoded::Node(doc)) => doc,
            other => panic!("unexpected {other:?}"),
        };
        assert!(doc.content.is_empty());
        let mut ctx = ExportContext::new(&config);
        assert_eq!(
            BODY.decode(&mut ctx, Decodable::Node(&doc)).into_vec(),
            vec![XmlNode::new("w:body")]
        );
    }
}
