/// Run properties (`w:rPr`).
use crate::common::xml::XmlNode;
use crate::translator::context::{ExportContext, ImportSession};
use crate::translator::{AttrConfig, Decodable, Decoded, Encoded, NodeTranslator, single};
use serde_json::Value;

/// Internal keys of the run property object.
pub mod keys {
    pub const STYLE_ID: &str = "styleId";
    pub const FONTS: &str = "fonts";
    pub const BOLD: &str = "bold";
    pub const ITALIC: &str = "italic";
    pub const STRIKE: &str = "strike";
    pub const COLOR: &str = "color";
    pub const FONT_SIZE: &str = "fontSize";
    pub const HIGHLIGHT: &str = "highlight";
    pub const UNDERLINE: &str = "underline";
}

/// Font slots whose names feed the font accumulator.
const FONT_NAME_SLOTS: [&str; 4] = ["ascii", "hAnsi", "eastAsia", "cs"];

pub static RUN_STYLE: NodeTranslator = NodeTranslator::val("w:rStyle", keys::STYLE_ID);

pub static FONTS: NodeTranslator = NodeTranslator {
    attributes: &[
        AttrConfig::string("w:ascii", "ascii"),
        AttrConfig::string("w:hAnsi", "hAnsi"),
        AttrConfig::string("w:eastAsia", "eastAsia"),
        AttrConfig::string("w:cs", "cs"),
        AttrConfig::string("w:asciiTheme", "asciiTheme"),
        AttrConfig::string("w:hAnsiTheme", "hAnsiTheme"),
        AttrConfig::string("w:eastAsiaTheme", "eastAsiaTheme"),
        AttrConfig::string("w:cstheme", "csTheme"),
        AttrConfig::string("w:hint", "hint"),
    ],
    encode_fn: encode_fonts,
    decode_fn: decode_fonts,
    ..NodeTranslator::object("w:rFonts", keys::FONTS)
};

pub static BOLD: NodeTranslator = NodeTranslator::on_off("w:b", keys::BOLD);
pub static BOLD_CS: NodeTranslator = NodeTranslator::on_off("w:bCs", "boldCs");
pub static ITALIC: NodeTranslator = NodeTranslator::on_off("w:i", keys::ITALIC);
pub static ITALIC_CS: NodeTranslator = NodeTranslator::on_off("w:iCs", "italicCs");
pub static CAPS: NodeTranslator = NodeTranslator::on_off("w:caps", "caps");
pub static SMALL_CAPS: NodeTranslator = NodeTranslator::on_off("w:smallCaps", "smallCaps");
pub static STRIKE: NodeTranslator = NodeTranslator::on_off("w:strike", keys::STRIKE);
pub static DOUBLE_STRIKE: NodeTranslator = NodeTranslator::on_off("w:dstrike", "doubleStrike");
pub static NO_PROOF: NodeTranslator = NodeTranslator::on_off("w:noProof", "noProof");
pub static HIDDEN: NodeTranslator = NodeTranslator::on_off("w:vanish", "hidden");

pub static COLOR: NodeTranslator = NodeTranslator {
    attributes: &[
        AttrConfig::color("w:val", "val"),
        AttrConfig::string("w:themeColor", "themeColor"),
        AttrConfig::string("w:themeShade", "themeShade"),
        AttrConfig::string("w:themeTint", "themeTint"),
    ],
    ..NodeTranslator::object("w:color", keys::COLOR)
};

pub static CHARACTER_SPACING: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::integer("w:val", "val")],
    ..NodeTranslator::val("w:spacing", "characterSpacing")
};

pub static KERNING: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::integer("w:val", "val")],
    ..NodeTranslator::val("w:kern", "kerning")
};

pub static POSITION: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::integer("w:val", "val")],
    ..NodeTranslator::val("w:position", "position")
};

/// Size in half-points.
pub static FONT_SIZE: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::integer("w:val", "val")],
    ..NodeTranslator::val("w:sz", keys::FONT_SIZE)
};

pub static FONT_SIZE_CS: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::integer("w:val", "val")],
    ..NodeTranslator::val("w:szCs", "fontSizeCs")
};

pub static HIGHLIGHT: NodeTranslator = NodeTranslator::val("w:highlight", keys::HIGHLIGHT);

pub static UNDERLINE: NodeTranslator = NodeTranslator {
    attributes: &[
        AttrConfig::string("w:val", "val"),
        AttrConfig::color("w:color", "color"),
        AttrConfig::string("w:themeColor", "themeColor"),
    ],
    ..NodeTranslator::object("w:u", keys::UNDERLINE)
};

pub static BORDER: NodeTranslator = NodeTranslator::raw("w:bdr", "border");
pub static SHADING: NodeTranslator = NodeTranslator::raw("w:shd", "shading");
pub static VERTICAL_ALIGN: NodeTranslator = NodeTranslator::val("w:vertAlign", "vertAlign");
pub static RIGHT_TO_LEFT: NodeTranslator = NodeTranslator::on_off("w:rtl", "rtl");
pub static COMPLEX_SCRIPT: NodeTranslator = NodeTranslator::on_off("w:cs", "complexScript");

pub static LANGUAGE: NodeTranslator = NodeTranslator {
    attributes: &[
        AttrConfig::string("w:val", "val"),
        AttrConfig::string("w:eastAsia", "eastAsia"),
        AttrConfig::string("w:bidi", "bidi"),
    ],
    ..NodeTranslator::object("w:lang", "lang")
};

pub static RUN_PROPERTIES_CHANGE: NodeTranslator = NodeTranslator::raw("w:rPrChange", "change");

/// `w:rPr`, children in schema order.
pub static RUN_PROPERTIES: NodeTranslator = NodeTranslator {
    children: &[
        &RUN_STYLE,
        &FONTS,
        &BOLD,
        &BOLD_CS,
        &ITALIC,
        &ITALIC_CS,
        &CAPS,
        &SMALL_CAPS,
        &STRIKE,
        &DOUBLE_STRIKE,
        &NO_PROOF,
        &HIDDEN,
        &COLOR,
        &CHARACTER_SPACING,
        &KERNING,
        &POSITION,
        &FONT_SIZE,
        &FONT_SIZE_CS,
        &HIGHLIGHT,
        &UNDERLINE,
        &BORDER,
        &SHADING,
        &VERTICAL_ALIGN,
        &RIGHT_TO_LEFT,
        &COMPLEX_SCRIPT,
        &LANGUAGE,
        &RUN_PROPERTIES_CHANGE,
    ],
    ..NodeTranslator::nested("w:rPr", "runProperties")
};

fn encode_fonts(t: &NodeTranslator, session: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    let attrs = t.encode_attributes(node);
    for slot in FONT_NAME_SLOTS {
        if let Some(name) = attrs.get(slot).and_then(Value::as_str) {
            session.fonts.record(name);
        }
    }
    (!attrs.is_empty()).then(|| Encoded::Value(Value::Object(attrs)))
}

fn decode_fonts(t: &NodeTranslator, ctx: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    let Some(attrs) = input.value().and_then(Value::as_object) else {
        return Decoded::new();
    };
    for slot in FONT_NAME_SLOTS {
        if let Some(name) = attrs.get(slot).and_then(Value::as_str) {
            ctx.fonts.record(name);
        }
    }
    let element = t.element_with(attrs);
    if element.attributes.is_empty() {
        Decoded::new()
    } else {
        single(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EngineConfig;
    use serde_json::json;

    #[test]
    fn test_encode_run_properties() {
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let rpr = XmlNode::parse(
            r#"<w:rPr>
                <w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="MS Mincho"/>
                <w:b/><w:i w:val="0"/>
                <w:color w:val="FF0000"/>
                <w:sz w:val="28"/>
                <w:u w:val="double"/>
            </w:rPr>"#,
        )
        .unwrap();
        let props = RUN_PROPERTIES.encode_value(&mut session, &rpr).unwrap();
        assert_eq!(
            props,
            json!({
                "fonts": {"ascii": "Calibri", "hAnsi": "Calibri", "eastAsia": "MS Mincho"},
                "bold": true,
                "italic": false,
                "color": {"val": "#ff0000"},
                "fontSize": 28,
                "underline": {"val": "double"}
            })
        );
        assert_eq!(session.fonts.into_vec(), vec!["Calibri", "MS Mincho"]);
    }

    #[test]
    fn test_decode_records_fonts_and_orders_children() {
        let config = EngineConfig::default();
        let mut ctx = ExportContext::new(&config);
        let props = json!({"fontSize": 20, "bold": true, "fonts": {"ascii": "Arial"}, "styleId": "Strong"});
        let rpr = RUN_PROPERTIES.decode_value(&mut ctx, &props).unwrap();
        let names: Vec<_> = rpr.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:rStyle", "w:rFonts", "w:b", "w:sz"]);
        assert!(ctx.fonts.contains("Arial"));
    }

    #[test]
    fn test_change_tracking_kept_verbatim() {
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let rpr = XmlNode::parse(
            r#"<w:rPr><w:b/><w:rPrChange w:id="3" w:author="A"><w:rPr/></w:rPrChange></w:rPr>"#,
        )
        .unwrap();
        let props = RUN_PROPERTIES.encode_value(&mut session, &rpr).unwrap();
        let mut ctx = ExportContext::new(&config);
        assert_eq!(RUN_PROPERTIES.decode_value(&mut ctx, &props), Some(rpr));
    }
}
