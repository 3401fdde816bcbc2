/// Bookmark markers (`w:bookmarkStart`, `w:bookmarkEnd`) and the name lookup
/// built from them.
use crate::common::xml::XmlNode;
use crate::model::{Content, InternalNode, NodeKind};
use crate::translator::context::{ExportContext, ImportSession};
use crate::translator::{AttrConfig, Decodable, Decoded, Encoded, NodeTranslator, TranslatorKind, single};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub static BOOKMARK_START: NodeTranslator = NodeTranslator {
    attributes: &[
        AttrConfig::string("w:id", "id"),
        AttrConfig::string("w:name", "name"),
        AttrConfig::integer("w:colFirst", "colFirst"),
        AttrConfig::integer("w:colLast", "colLast"),
        AttrConfig::string("w:displacedByCustomXml", "displacedByCustomXml"),
    ],
    ..NodeTranslator::custom(
        "w:bookmarkStart",
        "bookmarkStart",
        TranslatorKind::Element,
        encode_marker,
        decode_marker,
    )
};

pub static BOOKMARK_END: NodeTranslator = NodeTranslator {
    attributes: &[
        AttrConfig::string("w:id", "id"),
        AttrConfig::string("w:displacedByCustomXml", "displacedByCustomXml"),
    ],
    ..NodeTranslator::custom(
        "w:bookmarkEnd",
        "bookmarkEnd",
        TranslatorKind::Element,
        encode_marker,
        decode_marker,
    )
};

fn encode_marker(t: &NodeTranslator, _: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    let kind = if t.xml_name == BOOKMARK_START.xml_name {
        NodeKind::BookmarkStart
    } else {
        NodeKind::BookmarkEnd
    };
    let mut marker = InternalNode::new(kind);
    marker.attrs = t.encode_attributes(node);
    Some(Encoded::Node(marker))
}

fn decode_marker(t: &NodeTranslator, _: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    match input.node() {
        Some(node) => single(t.element_with(&node.attrs)),
        None => Decoded::new(),
    }
}

/// Where a bookmark starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkPosition {
    pub id: Option<String>,
    /// Index of the top-level block holding the start marker
    pub block: usize,
    /// Inline offset of the marker inside that block
    pub offset: usize,
}

/// Map bookmark names to their start positions in `doc`.
///
/// Offsets count characters of text, with tabs and line breaks counting one
/// each. When a name repeats, the first occurrence wins.
pub fn collect_bookmarks(doc: &InternalNode) -> IndexMap<String, BookmarkPosition> {
    let mut bookmarks = IndexMap::new();
    for (block, entry) in doc.content.iter().enumerate() {
        let mut offset = 0usize;
        let mut stack = vec![entry];
        while let Some(item) = stack.pop() {
            let node = match item {
                Content::Text(text) => {
                    offset += text.text.chars().count();
                    continue;
                },
                Content::Node(node) => node,
            };
            match node.kind {
                NodeKind::Tab | NodeKind::LineBreak => offset += 1,
                NodeKind::BookmarkStart => {
                    if let Some(name) = node.attr_str("name") {
                        if bookmarks.contains_key(name) {
                            log::debug!("duplicate bookmark {name}; keeping the first");
                        } else {
                            bookmarks.insert(
                                name.to_string(),
                                BookmarkPosition {
                                    id: node.attr_str("id").map(str::to_string),
                                    block,
                                    offset,
                                },
                            );
                        }
                    }
                },
                _ => stack.extend(node.content.iter().rev()),
            }
        }
    }
    bookmarks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EngineConfig;
    use crate::dispatch;

    #[test]
    fn test_markers_round_trip() {
        let source = r#"<w:p><w:bookmarkStart w:id="0" w:name="_Toc1" w:colFirst="1"/><w:bookmarkEnd w:id="0"/></w:p>"#;
        let p = XmlNode::parse(source).unwrap();
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let items = dispatch::encode_inline(&mut session, &p.elements);
        let start = items[0].as_node().unwrap();
        assert_eq!(start.attr_str("name"), Some("_Toc1"));
        assert_eq!(start.attr_i64("colFirst"), Some(1));

        let mut ctx = ExportContext::new(&config);
        assert_eq!(dispatch::decode_inline(&mut ctx, &items), p.elements);
    }

    #[test]
    fn test_bookmark_positions() {
        let body = XmlNode::parse(
            r#"<w:body>
            <w:p><w:r><w:t>skip</w:t></w:r></w:p>
            <w:p><w:r><w:t>ab</w:t><w:tab/></w:r><w:bookmarkStart w:id="4" w:name="here"/><w:r><w:t>c</w:t></w:r></w:p>
            <w:p><w:bookmarkStart w:id="5" w:name="here"/></w:p>
            <w:bookmarkStart w:id="6" w:name="top"/>
        </w:body>"#,
        )
        .unwrap();
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let mut doc = InternalNode::new(NodeKind::Doc);
        doc.content = dispatch::encode_blocks(&mut session, &body.elements);

        let bookmarks = collect_bookmarks(&doc);
        assert_eq!(
            bookmarks["here"],
            BookmarkPosition {
                id: Some("4".to_string()),
                block: 1,
                offset: 3
            }
        );
        assert_eq!(bookmarks["top"].block, 3);
        assert_eq!(bookmarks["top"].offset, 0);
        assert_eq!(bookmarks.len(), 2);
    }
}
