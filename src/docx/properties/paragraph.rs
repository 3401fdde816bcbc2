/// Paragraph properties (`w:pPr`) and numbering references (`w:numPr`).
use super::run::RUN_PROPERTIES;
use crate::common::xml::XmlAttrs;
use crate::model::Attrs;
use crate::translator::attr::{format_int, parse_int};
use crate::translator::{AttrConfig, NodeTranslator};
use serde_json::Value;

/// Internal keys of the paragraph property object.
pub mod keys {
    pub const STYLE_ID: &str = "styleId";
    pub const NUMBERING: &str = "numberingProperties";
    pub const INDENT: &str = "indent";
    pub const RUN_PROPERTIES: &str = "runProperties";
    pub const NUM_ID: &str = "numId";
    pub const LEVEL: &str = "level";
}

pub static PARAGRAPH_STYLE: NodeTranslator = NodeTranslator::val("w:pStyle", keys::STYLE_ID);
pub static KEEP_NEXT: NodeTranslator = NodeTranslator::on_off("w:keepNext", "keepNext");
pub static KEEP_LINES: NodeTranslator = NodeTranslator::on_off("w:keepLines", "keepLines");
pub static PAGE_BREAK_BEFORE: NodeTranslator =
    NodeTranslator::on_off("w:pageBreakBefore", "pageBreakBefore");
pub static FRAME: NodeTranslator = NodeTranslator::raw("w:framePr", "frame");
pub static WIDOW_CONTROL: NodeTranslator = NodeTranslator::on_off("w:widowControl", "widowControl");

pub static NUMBERING_LEVEL: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::integer("w:val", "val")],
    ..NodeTranslator::val("w:ilvl", keys::LEVEL)
};

pub static NUMBERING_ID: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::integer("w:val", "val")],
    ..NodeTranslator::val("w:numId", keys::NUM_ID)
};

/// `w:numPr`: `{ level, numId }`.
pub static NUMBERING_PROPERTIES: NodeTranslator = NodeTranslator {
    children: &[&NUMBERING_LEVEL, &NUMBERING_ID],
    ..NodeTranslator::nested("w:numPr", keys::NUMBERING)
};

pub static BORDERS: NodeTranslator = NodeTranslator::raw("w:pBdr", "borders");
pub static SHADING: NodeTranslator = NodeTranslator::raw("w:shd", "shading");
pub static TABS: NodeTranslator = NodeTranslator::raw("w:tabs", "tabs");
pub static SUPPRESS_AUTO_HYPHENS: NodeTranslator =
    NodeTranslator::on_off("w:suppressAutoHyphens", "suppressAutoHyphens");
pub static BIDI: NodeTranslator = NodeTranslator::on_off("w:bidi", "bidi");

pub static SPACING: NodeTranslator = NodeTranslator {
    attributes: &[
        AttrConfig::integer("w:before", "before"),
        AttrConfig::on_off("w:beforeAutospacing", "beforeAutospacing"),
        AttrConfig::integer("w:after", "after"),
        AttrConfig::on_off("w:afterAutospacing", "afterAutospacing"),
        AttrConfig::integer("w:line", "line"),
        AttrConfig::string("w:lineRule", "lineRule"),
    ],
    ..NodeTranslator::object("w:spacing", "spacing")
};

/// `w:ind`; `w:start`/`w:end` are read as left/right and written as `w:left`/`w:right`.
pub static INDENT: NodeTranslator = NodeTranslator {
    attributes: &[
        AttrConfig::custom("w:left", "left", encode_aliased_int, decode_int),
        AttrConfig::custom("w:right", "right", encode_aliased_int, decode_int),
        AttrConfig::integer("w:hanging", "hanging"),
        AttrConfig::integer("w:firstLine", "firstLine"),
    ],
    ..NodeTranslator::object("w:ind", keys::INDENT)
};

pub static CONTEXTUAL_SPACING: NodeTranslator =
    NodeTranslator::on_off("w:contextualSpacing", "contextualSpacing");
pub static JUSTIFICATION: NodeTranslator = NodeTranslator::val("w:jc", "justification");
pub static TEXT_ALIGNMENT: NodeTranslator = NodeTranslator::val("w:textAlignment", "textAlignment");

pub static OUTLINE_LEVEL: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::integer("w:val", "val")],
    ..NodeTranslator::val("w:outlineLvl", "outlineLevel")
};

pub static CONDITIONAL_STYLE: NodeTranslator = NodeTranslator::raw("w:cnfStyle", "conditionalStyle");
pub static SECTION: NodeTranslator = NodeTranslator::raw("w:sectPr", "sectionProperties");
pub static PARAGRAPH_PROPERTIES_CHANGE: NodeTranslator = NodeTranslator::raw("w:pPrChange", "change");

/// `w:pPr`, children in schema order.
pub static PARAGRAPH_PROPERTIES: NodeTranslator = NodeTranslator {
    children: &[
        &PARAGRAPH_STYLE,
        &KEEP_NEXT,
        &KEEP_LINES,
        &PAGE_BREAK_BEFORE,
        &FRAME,
        &WIDOW_CONTROL,
        &NUMBERING_PROPERTIES,
        &BORDERS,
        &SHADING,
        &TABS,
        &SUPPRESS_AUTO_HYPHENS,
        &BIDI,
        &SPACING,
        &INDENT,
        &CONTEXTUAL_SPACING,
        &JUSTIFICATION,
        &TEXT_ALIGNMENT,
        &OUTLINE_LEVEL,
        &CONDITIONAL_STYLE,
        &RUN_PROPERTIES,
        &SECTION,
        &PARAGRAPH_PROPERTIES_CHANGE,
    ],
    ..NodeTranslator::nested("w:pPr", "paragraphProperties")
};

/// `(numId, level)` named directly by a paragraph property object. The level
/// is returned as written, range checking is up to the caller.
pub fn direct_numbering(props: &Attrs) -> Option<(i64, Option<i64>)> {
    let num = props.get(keys::NUMBERING)?.as_object()?;
    let num_id = num.get(keys::NUM_ID)?.as_i64()?;
    Some((num_id, direct_level(props)))
}

/// `w:ilvl` of the paragraph's own `w:numPr`, with or without a `w:numId`.
pub fn direct_level(props: &Attrs) -> Option<i64> {
    props.get(keys::NUMBERING)?.get(keys::LEVEL)?.as_i64()
}

/// Left and right accept their bidi-aware aliases.
fn encode_aliased_int(config: &AttrConfig, attrs: &XmlAttrs) -> Option<Value> {
    let alias = match config.xml_name {
        "w:left" => "w:start",
        "w:right" => "w:end",
        _ => config.xml_name,
    };
    attrs
        .get(config.xml_name)
        .or_else(|| attrs.get(alias))
        .and_then(|raw| parse_int(raw))
        .map(Value::from)
}

fn decode_int(config: &AttrConfig, attrs: &Attrs) -> Option<String> {
    attrs
        .get(config.internal_name)
        .and_then(Value::as_i64)
        .map(format_int)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EngineConfig;
    use crate::common::xml::XmlNode;
    use crate::translator::context::{ExportContext, ImportSession};
    use serde_json::json;

    #[test]
    fn test_encode_paragraph_properties() {
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let ppr = XmlNode::parse(
            r#"<w:pPr>
                <w:pStyle w:val="ListParagraph"/>
                <w:numPr><w:ilvl w:val="1"/><w:numId w:val="4"/></w:numPr>
                <w:spacing w:after="0" w:line="240" w:lineRule="auto"/>
                <w:ind w:start="720" w:hanging="360"/>
                <w:jc w:val="both"/>
                <w:rPr><w:b/></w:rPr>
            </w:pPr>"#,
        )
        .unwrap();
        let props = PARAGRAPH_PROPERTIES.encode_value(&mut session, &ppr).unwrap();
        assert_eq!(
            props,
            json!({
                "styleId": "ListParagraph",
                "numberingProperties": {"level": 1, "numId": 4},
                "spacing": {"after": 0, "line": 240, "lineRule": "auto"},
                "indent": {"left": 720, "hanging": 360},
                "justification": "both",
                "runProperties": {"bold": true}
            })
        );
        assert_eq!(direct_numbering(props.as_object().unwrap()), Some((4, Some(1))));
    }

    #[test]
    fn test_section_break_keeps_schema_position() {
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let ppr = XmlNode::parse(
            r#"<w:pPr><w:tabs><w:tab w:val="left" w:pos="1440"/></w:tabs><w:rPr><w:i/></w:rPr><w:sectPr><w:pgSz w:w="12240"/></w:sectPr></w:pPr>"#,
        )
        .unwrap();
        let props = PARAGRAPH_PROPERTIES.encode_value(&mut session, &ppr).unwrap();
        let mut ctx = ExportContext::new(&config);
        assert_eq!(PARAGRAPH_PROPERTIES.decode_value(&mut ctx, &props), Some(ppr));
    }
}
