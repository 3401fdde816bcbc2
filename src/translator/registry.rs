/// Static translator registry.
///
/// XML element names resolve to a closed [`ElementKind`] through a perfect-hash
/// table; element kinds and internal node kinds resolve to their translators
/// through exhaustive matches. The registry is checked once per process for
/// keys registered twice.
use super::node::NodeTranslator;
use crate::common::error::{ConvertError, Result};
use crate::dispatch::passthrough::{PASSTHROUGH_BLOCK, PASSTHROUGH_INLINE};
use crate::docx::properties::{
    CELL_PROPERTIES, PARAGRAPH_PROPERTIES, ROW_PROPERTIES, RUN_PROPERTIES, TABLE_PROPERTIES,
};
use crate::docx::{bookmark, body, field, paragraph, run, table};
use crate::model::NodeKind;
use once_cell::sync::Lazy;
use phf::phf_map;
use std::collections::HashSet;

/// Element types the dispatch layer recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Body,
    Paragraph,
    Run,
    Tab,
    Break,
    Table,
    BookmarkStart,
    BookmarkEnd,
    SimpleField,
    // Wrappers, unwrapped instead of translated
    Insert,
    Delete,
    MoveFrom,
    MoveTo,
    StructuredContent,
    Hyperlink,
    AlternateContent,
}

static ELEMENTS: phf::Map<&'static str, ElementKind> = phf_map! {
    "w:body" => ElementKind::Body,
    "w:p" => ElementKind::Paragraph,
    "w:r" => ElementKind::Run,
    "w:tab" => ElementKind::Tab,
    "w:br" => ElementKind::Break,
    "w:tbl" => ElementKind::Table,
    "w:bookmarkStart" => ElementKind::BookmarkStart,
    "w:bookmarkEnd" => ElementKind::BookmarkEnd,
    "w:fldSimple" => ElementKind::SimpleField,
    "w:ins" => ElementKind::Insert,
    "w:del" => ElementKind::Delete,
    "w:moveFrom" => ElementKind::MoveFrom,
    "w:moveTo" => ElementKind::MoveTo,
    "w:sdt" => ElementKind::StructuredContent,
    "w:hyperlink" => ElementKind::Hyperlink,
    "mc:AlternateContent" => ElementKind::AlternateContent,
};

/// Every node kind, for exhaustive registry checks.
const NODE_KINDS: [NodeKind; 13] = [
    NodeKind::Doc,
    NodeKind::Paragraph,
    NodeKind::Run,
    NodeKind::Tab,
    NodeKind::LineBreak,
    NodeKind::Table,
    NodeKind::TableRow,
    NodeKind::TableCell,
    NodeKind::BookmarkStart,
    NodeKind::BookmarkEnd,
    NodeKind::Field,
    NodeKind::PassthroughBlock,
    NodeKind::PassthroughInline,
];

/// Property containers whose child lists are checked for duplicates.
const CONTAINERS: [&NodeTranslator; 5] = [
    &PARAGRAPH_PROPERTIES,
    &RUN_PROPERTIES,
    &TABLE_PROPERTIES,
    &ROW_PROPERTIES,
    &CELL_PROPERTIES,
];

impl ElementKind {
    /// Look up a qualified element name.
    #[inline]
    pub fn from_xml_name(name: &str) -> Option<Self> {
        ELEMENTS.get(name).copied()
    }

    /// Whether the element wraps content instead of being content.
    #[inline]
    pub const fn is_wrapper(self) -> bool {
        matches!(
            self,
            Self::Insert
                | Self::Delete
                | Self::MoveFrom
                | Self::MoveTo
                | Self::StructuredContent
                | Self::Hyperlink
                | Self::AlternateContent
        )
    }

    /// Translator of a concrete element; wrappers have none.
    pub fn translator(self) -> Option<&'static NodeTranslator> {
        match self {
            Self::Body => Some(&body::BODY),
            Self::Paragraph => Some(&paragraph::PARAGRAPH),
            Self::Run => Some(&run::RUN),
            Self::Tab => Some(&run::TAB),
            Self::Break => Some(&run::LINE_BREAK),
            Self::Table => Some(&table::TABLE),
            Self::BookmarkStart => Some(&bookmark::BOOKMARK_START),
            Self::BookmarkEnd => Some(&bookmark::BOOKMARK_END),
            Self::SimpleField => Some(&field::FIELD),
            Self::Insert
            | Self::Delete
            | Self::MoveFrom
            | Self::MoveTo
            | Self::StructuredContent
            | Self::Hyperlink
            | Self::AlternateContent => None,
        }
    }
}

/// Translator that exports nodes of `kind`.
pub fn translator_for(kind: NodeKind) -> &'static NodeTranslator {
    match kind {
        NodeKind::Doc => &body::BODY,
        NodeKind::Paragraph => &paragraph::PARAGRAPH,
        NodeKind::Run => &run::RUN,
        NodeKind::Tab => &run::TAB,
        NodeKind::LineBreak => &run::LINE_BREAK,
        NodeKind::Table => &table::TABLE,
        NodeKind::TableRow => &table::TABLE_ROW,
        NodeKind::TableCell => &table::TABLE_CELL,
        NodeKind::BookmarkStart => &bookmark::BOOKMARK_START,
        NodeKind::BookmarkEnd => &bookmark::BOOKMARK_END,
        NodeKind::Field => &field::FIELD,
        NodeKind::PassthroughBlock => &PASSTHROUGH_BLOCK,
        NodeKind::PassthroughInline => &PASSTHROUGH_INLINE,
    }
}

/// Outcome of the one-time check, holding the offending key on failure.
static CHECKED: Lazy<std::result::Result<(), String>> = Lazy::new(check);

/// Fail with [`ConvertError::DuplicateTranslator`] if any key is registered twice.
pub fn ensure_valid() -> Result<()> {
    match &*CHECKED {
        Ok(()) => Ok(()),
        Err(key) => Err(ConvertError::DuplicateTranslator { key: key.clone() }),
    }
}

fn check() -> std::result::Result<(), String> {
    for (name, kind) in ELEMENTS.entries() {
        if let Some(t) = kind.translator()
            && t.xml_name != *name
        {
            return Err((*name).to_string());
        }
    }

    let mut internal = HashSet::new();
    let mut xml = HashSet::new();
    for kind in NODE_KINDS {
        let t = translator_for(kind);
        if t.internal_name != kind.as_str() || !internal.insert(t.internal_name) {
            return Err(kind.as_str().to_string());
        }
        if !t.xml_name.is_empty() && !xml.insert(t.xml_name) {
            return Err(t.xml_name.to_string());
        }
    }

    let mut pending: Vec<&NodeTranslator> = CONTAINERS.to_vec();
    let mut seen = HashSet::new();
    while let Some(container) = pending.pop() {
        if !seen.insert(container as *const NodeTranslator) {
            continue;
        }
        check_container(container)?;
        pending.extend(container.children.iter().copied());
    }
    Ok(())
}

/// Child elements and attributes of one translator must not share keys.
fn check_container(t: &NodeTranslator) -> std::result::Result<(), String> {
    let mut xml = HashSet::new();
    let mut internal = HashSet::new();
    for child in t.children {
        if !xml.insert(child.xml_name) {
            return Err(format!("{}/{}", t.xml_name, child.xml_name));
        }
        if !internal.insert(child.internal_name) {
            return Err(format!("{}/{}", t.xml_name, child.internal_name));
        }
    }
    let mut attrs = HashSet::new();
    for attr in t.attributes {
        if !attrs.insert(attr.internal_name) {
            return Err(format!("{}@{}", t.xml_name, attr.internal_name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_no_duplicate_keys() {
        assert!(ensure_valid().is_ok());
    }

    #[test]
    fn test_lookup() {
        assert_eq!(ElementKind::from_xml_name("w:p"), Some(ElementKind::Paragraph));
        assert_eq!(ElementKind::from_xml_name("w:customXml"), None);
        assert!(ElementKind::Insert.is_wrapper());
        assert!(ElementKind::Insert.translator().is_none());
        assert_eq!(ElementKind::Table.translator().map(|t| t.xml_name), Some("w:tbl"));
    }

    #[test]
    fn test_every_node_kind_round_trips_its_name() {
        for kind in NODE_KINDS {
            assert_eq!(translator_for(kind).internal_name, kind.as_str());
        }
    }

    #[test]
    fn test_container_check_catches_duplicates() {
        static A: NodeTranslator = NodeTranslator::on_off("w:b", "bold");
        static B: NodeTranslator = NodeTranslator::on_off("w:bCs", "bold");
        static BROKEN: NodeTranslator = NodeTranslator {
            children: &[&A, &B],
            ..NodeTranslator::nested("w:rPr", "runProperties")
        };
        assert_eq!(check_container(&BROKEN), Err("w:rPr/bold".to_string()));
    }
}
