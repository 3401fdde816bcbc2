/// Export: the internal tree back to document parts.
use super::import::Imported;
use super::parts::{DOCUMENT_PART, DocumentParts, NUMBERING_PART, STYLES_PART};
use crate::common::error::{ConvertError, Result};
use crate::common::xml::XmlNode;
use crate::docx::body::BODY;
use crate::model::NodeKind;
use crate::translator::{Decodable, ExportContext, ensure_valid};

/// Export an imported (and possibly edited) document.
///
/// The document part is the imported shell with the body rebuilt in place;
/// numbering and styles are written only when the import had them, followed
/// by the untranslated parts.
pub fn export(imported: &Imported, ctx: &mut ExportContext<'_>) -> Result<DocumentParts> {
    ensure_valid()?;
    if imported.document.kind != NodeKind::Doc {
        return Err(ConvertError::UnexpectedRoot {
            part: DOCUMENT_PART.to_string(),
            expected: NodeKind::Doc.as_str().to_string(),
            got: imported.document.kind.as_str().to_string(),
        });
    }

    let body = BODY
        .decode(ctx, Decodable::Node(&imported.document))
        .into_iter()
        .next()
        .unwrap_or_else(|| XmlNode::new(BODY.xml_name));
    let mut root = imported.shell.clone();
    match root.elements.iter_mut().find(|e| e.name == BODY.xml_name) {
        Some(slot) => *slot = body,
        None => root.elements.push(body),
    }

    let mut parts = DocumentParts::new();
    parts.insert(DOCUMENT_PART, root);
    if let Some(numbering) = &imported.numbering {
        parts.insert(NUMBERING_PART, numbering.to_xml());
    }
    if let Some(styles) = &imported.styles {
        parts.insert(STYLES_PART, styles.clone());
    }
    parts.extend(
        imported
            .other_parts
            .iter()
            .map(|(name, root)| (name.to_string(), root.clone())),
    );
    log::debug!("exported {} parts, {} fonts referenced", parts.len(), ctx.fonts.len());
    Ok(parts)
}
