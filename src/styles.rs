/// Paragraph style sheet.
///
/// Only the parts of `w:styles` that feed paragraph resolution are modelled:
/// the `basedOn` chain, style indentation and style-level numbering. The part
/// itself is exported unchanged, so nothing else needs to survive here.
use crate::common::error::{ConvertError, Result};
use crate::common::xml::XmlNode;
use crate::numbering::Indent;
use crate::translator::attr::{parse_int, parse_on_off};
use std::collections::HashMap;

/// Root element of the styles part.
pub const STYLES_ROOT: &str = "w:styles";

/// Longest `basedOn` chain followed before giving up.
const MAX_CHAIN: usize = 32;

/// Numbering a paragraph style applies to its paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleNumbering {
    pub num_id: Option<i64>,
    pub level: Option<u8>,
}

/// One paragraph style.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParagraphStyle {
    pub style_id: String,
    pub name: Option<String>,
    pub based_on: Option<String>,
    pub is_default: bool,
    pub indent: Option<Indent>,
    pub numbering: Option<StyleNumbering>,
}

/// Paragraph styles of a document.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: HashMap<String, ParagraphStyle>,
    default_style: Option<String>,
    default_indent: Option<Indent>,
}

impl StyleSheet {
    /// Read a `w:styles` root element.
    pub fn from_xml(root: &XmlNode) -> Result<Self> {
        if root.name != STYLES_ROOT {
            return Err(ConvertError::UnexpectedRoot {
                part: "styles".to_string(),
                expected: STYLES_ROOT.to_string(),
                got: root.name.clone(),
            });
        }

        let mut sheet = Self {
            default_indent: root
                .child("w:docDefaults")
                .and_then(|d| d.child("w:pPrDefault"))
                .and_then(|d| d.child("w:pPr"))
                .and_then(|p| p.child("w:ind"))
                .map(Indent::from_xml),
            ..Self::default()
        };

        for style in root.children_named("w:style") {
            if style.attr("w:type").unwrap_or("paragraph") != "paragraph" {
                continue;
            }
            let Some(style_id) = style.attr("w:styleId") else {
                continue;
            };
            let ppr = style.child("w:pPr");
            let parsed = ParagraphStyle {
                style_id: style_id.to_string(),
                name: style.child_val("w:name").map(str::to_string),
                based_on: style.child_val("w:basedOn").map(str::to_string),
                is_default: style
                    .attr("w:default")
                    .and_then(parse_on_off)
                    .unwrap_or(false),
                indent: ppr.and_then(|p| p.child("w:ind")).map(Indent::from_xml),
                numbering: ppr.and_then(|p| p.child("w:numPr")).map(|num| StyleNumbering {
                    num_id: num.child_val("w:numId").and_then(parse_int),
                    level: num
                        .child_val("w:ilvl")
                        .and_then(parse_int)
                        .and_then(|l| u8::try_from(l).ok()),
                }),
            };
            if parsed.is_default && sheet.default_style.is_none() {
                sheet.default_style = Some(parsed.style_id.clone());
            }
            sheet.styles.insert(parsed.style_id.clone(), parsed);
        }
        log::debug!("styles part: {} paragraph styles", sheet.styles.len());
        Ok(sheet)
    }

    #[inline]
    pub fn get(&self, style_id: &str) -> Option<&ParagraphStyle> {
        self.styles.get(style_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Style applied to a paragraph: its `w:pStyle`, else the default style.
    pub fn effective_style_id<'a>(&'a self, style_id: Option<&'a str>) -> Option<&'a str> {
        style_id.or(self.default_style.as_deref())
    }

    /// The `basedOn` chain of `style_id`, leaf first.
    ///
    /// An unknown id yields an empty chain; a cycle ends the chain where it closes.
    pub fn chain(&self, style_id: &str) -> Vec<&ParagraphStyle> {
        let mut chain: Vec<&ParagraphStyle> = Vec::new();
        let mut next = Some(style_id);
        while let Some(id) = next {
            if chain.len() >= MAX_CHAIN || chain.iter().any(|s| s.style_id == id) {
                log::warn!("style chain of {style_id} loops or is too deep; truncated at {id}");
                break;
            }
            let Some(style) = self.styles.get(id) else {
                if chain.is_empty() {
                    log::warn!("paragraph references unknown style {id}");
                } else {
                    log::warn!("style {style_id} is based on unknown style {id}");
                }
                break;
            };
            chain.push(style);
            next = style.based_on.as_deref();
        }
        chain
    }

    /// Indentation contributed by a style: document defaults, then the chain
    /// from its root down to the style itself.
    pub fn resolve_indent(&self, style_id: Option<&str>) -> Option<Indent> {
        let mut indent = self.default_indent.unwrap_or_default();
        if let Some(id) = self.effective_style_id(style_id) {
            for style in self.chain(id).iter().rev() {
                if let Some(own) = &style.indent {
                    indent.merge(own);
                }
            }
        }
        (!indent.is_empty()).then_some(indent)
    }

    /// Numbering inherited from a style, as `(numId, level)`.
    pub fn resolve_numbering(&self, style_id: Option<&str>) -> Option<(i64, u8)> {
        let id = self.effective_style_id(style_id)?;
        let chain = self.chain(id);
        let num_id = chain
            .iter()
            .find_map(|s| s.numbering.and_then(|n| n.num_id))?;
        let level = chain
            .iter()
            .find_map(|s| s.numbering.and_then(|n| n.level))
            .unwrap_or(0);
        Some((num_id, level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<w:styles>
        <w:docDefaults><w:pPrDefault><w:pPr><w:ind w:right="10"/></w:pPr></w:pPrDefault></w:docDefaults>
        <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
        <w:style w:type="paragraph" w:styleId="ListBase">
            <w:basedOn w:val="Normal"/>
            <w:pPr><w:numPr><w:numId w:val="3"/></w:numPr><w:ind w:left="400" w:hanging="200"/></w:pPr>
        </w:style>
        <w:style w:type="paragraph" w:styleId="ListNested">
            <w:basedOn w:val="ListBase"/>
            <w:pPr><w:numPr><w:ilvl w:val="1"/></w:numPr><w:ind w:left="800"/></w:pPr>
        </w:style>
        <w:style w:type="paragraph" w:styleId="LoopA"><w:basedOn w:val="LoopB"/></w:style>
        <w:style w:type="paragraph" w:styleId="LoopB"><w:basedOn w:val="LoopA"/></w:style>
        <w:style w:type="character" w:styleId="Strong"/>
    </w:styles>"#;

    fn sheet() -> StyleSheet {
        StyleSheet::from_xml(&XmlNode::parse(STYLES).unwrap()).unwrap()
    }

    #[test]
    fn test_only_paragraph_styles_are_read() {
        let sheet = sheet();
        assert_eq!(sheet.len(), 5);
        assert!(sheet.get("Strong").is_none());
        assert_eq!(sheet.effective_style_id(None), Some("Normal"));
    }

    #[test]
    fn test_indent_walks_from_root() {
        let indent = sheet().resolve_indent(Some("ListNested")).unwrap();
        assert_eq!(indent.left, Some(800));
        assert_eq!(indent.hanging, Some(200));
        assert_eq!(indent.right, Some(10));
    }

    #[test]
    fn test_numbering_inherited_through_chain() {
        let sheet = sheet();
        assert_eq!(sheet.resolve_numbering(Some("ListNested")), Some((3, 1)));
        assert_eq!(sheet.resolve_numbering(Some("ListBase")), Some((3, 0)));
        assert_eq!(sheet.resolve_numbering(None), None);
    }

    #[test]
    fn test_cycles_and_unknown_ids_terminate() {
        let sheet = sheet();
        assert_eq!(sheet.chain("LoopA").len(), 2);
        assert!(sheet.chain("Missing").is_empty());
        assert_eq!(sheet.resolve_indent(Some("Missing")).unwrap().right, Some(10));
    }
}
