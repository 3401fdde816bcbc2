/// Import: document parts to the internal tree.
use super::parts::{DOCUMENT_PART, DOCUMENT_ROOT, DocumentParts, NUMBERING_PART, STYLES_PART};
use crate::common::EngineConfig;
use crate::common::error::{ConvertError, Result};
use crate::common::xml::XmlNode;
use crate::docx::body::BODY;
use crate::docx::bookmark::{BookmarkPosition, collect_bookmarks};
use crate::model::{InternalNode, NodeKind};
use crate::numbering::NumberingDefinitions;
use crate::styles::StyleSheet;
use crate::translator::{Encoded, ImportSession, ensure_valid};
use indexmap::IndexMap;
use serde_json::Value;

/// Result of importing one document.
#[derive(Debug, Clone)]
pub struct Imported {
    /// The `doc` node built from `w:body`
    pub document: InternalNode,
    /// Numbering definitions, when the document has a numbering part
    pub numbering: Option<NumberingDefinitions>,
    /// The styles part, kept for export as is
    pub styles: Option<XmlNode>,
    /// Bookmark name to start position
    pub bookmarks: IndexMap<String, BookmarkPosition>,
    /// Fonts referenced by run properties, in first-seen order
    pub fonts: Vec<String>,
    /// The document root without its body content
    pub shell: XmlNode,
    /// Parts the engine does not translate, returned by export unchanged
    pub other_parts: DocumentParts,
}

impl Imported {
    /// The document tree as JSON, for handing to an editor.
    pub fn document_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.document)?)
    }
}

/// Import a document.
///
/// Missing parts count as empty. A part whose root element is not the one its
/// name requires is an error; every other problem is logged and degrades
/// locally.
pub fn import(parts: &DocumentParts, config: &EngineConfig) -> Result<Imported> {
    ensure_valid()?;

    let numbering = parts
        .get(NUMBERING_PART)
        .map(NumberingDefinitions::from_xml)
        .transpose()?;
    let styles = parts.get(STYLES_PART);
    let sheet = styles.map(StyleSheet::from_xml).transpose()?.unwrap_or_default();

    let empty_root = XmlNode::new(DOCUMENT_ROOT);
    let root = match parts.get(DOCUMENT_PART) {
        Some(root) => root,
        None => {
            log::debug!("no {DOCUMENT_PART}; importing an empty document");
            &empty_root
        },
    };
    if root.name != DOCUMENT_ROOT {
        return Err(ConvertError::UnexpectedRoot {
            part: DOCUMENT_PART.to_string(),
            expected: DOCUMENT_ROOT.to_string(),
            got: root.name.clone(),
        });
    }

    let mut session = ImportSession::new(config)
        .with_numbering(numbering.clone().unwrap_or_default())
        .with_styles(sheet);
    let document = match root.child("w:body").and_then(|body| BODY.encode(&mut session, body)) {
        Some(Encoded::Node(doc)) => doc,
        _ => InternalNode::new(NodeKind::Doc),
    };

    let bookmarks = collect_bookmarks(&document);
    let fonts = std::mem::take(&mut session.fonts).into_vec();
    log::debug!(
        "imported {} blocks, {} bookmarks, {} fonts",
        document.content.len(),
        bookmarks.len(),
        fonts.len()
    );

    Ok(Imported {
        document,
        numbering,
        styles: styles.cloned(),
        bookmarks,
        fonts,
        shell: shell_of(root),
        other_parts: parts
            .iter()
            .filter(|(name, _)| ![DOCUMENT_PART, NUMBERING_PART, STYLES_PART].contains(name))
            .map(|(name, root)| (name.to_string(), root.clone()))
            .collect(),
    })
}

/// Copy of the document root with an empty `w:body` marking the body's place.
fn shell_of(root: &XmlNode) -> XmlNode {
    let mut shell = XmlNode::new(root.name.clone());
    shell.attributes = root.attributes.clone();
    shell.elements = root
        .elements
        .iter()
        .map(|e| {
            if e.name == BODY.xml_name {
                XmlNode::new(BODY.xml_name)
            } else {
                e.clone()
            }
        })
        .collect();
    shell
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::paragraph::NUMBERING_KEY;

    const DOCUMENT: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
        <w:background w:color="FFFFFF"/>
        <w:body>
            <w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>one</w:t></w:r></w:p>
            <w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:bookmarkStart w:id="0" w:name="second"/><w:r><w:rPr><w:rFonts w:ascii="Cambria" w:hAnsi="Cambria"/></w:rPr><w:t>two</w:t></w:r><w:bookmarkEnd w:id="0"/></w:p>
            <w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr>
        </w:body>
    </w:document>"#;

    const NUMBERING: &str = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
        <w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:start w:val="3"/><w:numFmt w:val="upperRoman"/><w:lvlText w:val="%1."/></w:lvl></w:abstractNum>
        <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
    </w:numbering>"#;

    fn parts() -> DocumentParts {
        DocumentParts::from_xml_strings([
            (DOCUMENT_PART, DOCUMENT),
            (NUMBERING_PART, NUMBERING),
            (STYLES_PART, "<w:styles/>"),
            ("word/settings.xml", "<w:settings/>"),
        ])
        .unwrap()
    }

    #[test]
    fn test_import_document() {
        let imported = import(&parts(), &EngineConfig::default()).unwrap();
        assert_eq!(imported.document.kind, NodeKind::Doc);
        assert_eq!(imported.document.content.len(), 2);

        let labels: Vec<_> = imported
            .document
            .child_nodes()
            .map(|p| p.attr_object(NUMBERING_KEY).unwrap()["label"].clone())
            .collect();
        assert_eq!(labels, vec!["III.", "IV."]);

        assert_eq!(imported.bookmarks["second"].block, 1);
        assert_eq!(imported.bookmarks["second"].offset, 0);
        assert_eq!(imported.fonts, vec!["Cambria"]);
        assert!(imported.other_parts.contains("word/settings.xml"));

        let shell_body = imported.shell.child("w:body").unwrap();
        assert!(shell_body.elements.is_empty());
        assert!(imported.shell.child("w:background").is_some());
    }

    #[test]
    fn test_missing_parts_import_empty() {
        let imported = import(&DocumentParts::new(), &EngineConfig::default()).unwrap();
        assert!(imported.document.content.is_empty());
        assert!(imported.numbering.is_none());
        assert!(imported.styles.is_none());
    }

    #[test]
    fn test_wrong_roots_are_errors() {
        let config = EngineConfig::default();
        let document = DocumentParts::from_xml_strings([(DOCUMENT_PART, "<w:body/>")]).unwrap();
        assert!(matches!(
            import(&document, &config),
            Err(ConvertError::UnexpectedRoot { .. })
        ));
        let numbering = DocumentParts::from_xml_strings([(NUMBERING_PART, "<w:styles/>")]).unwrap();
        assert!(matches!(
            import(&numbering, &config),
            Err(ConvertError::UnexpectedRoot { .. })
        ));
    }

    #[test]
    fn test_document_json() {
        let imported = import(&parts(), &EngineConfig::default()).unwrap();
        let json = imported.document_json().unwrap();
        assert_eq!(json["type"], "doc");
        assert_eq!(json["content"].as_array().map(Vec::len), Some(2));
    }
}
