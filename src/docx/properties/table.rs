/// Table, row and cell properties (`w:tblPr`, `w:trPr`, `w:tcPr`) and borders.
use crate::common::xml::XmlNode;
use crate::model::Attrs;
use crate::translator::context::{ExportContext, ImportSession};
use crate::translator::{AttrConfig, Decodable, Decoded, Encoded, NodeTranslator, single};
use serde_json::{Value, json};

/// Internal keys shared by the grid reconciler and the table translators.
pub mod keys {
    pub const GRID_BEFORE: &str = "gridBefore";
    pub const GRID_AFTER: &str = "gridAfter";
    pub const GRID_SPAN: &str = "gridSpan";
    pub const VERTICAL_MERGE: &str = "vMerge";
    pub const BORDERS: &str = "borders";
    pub const WIDTH: &str = "width";
}

const BORDER_ATTRS: &[AttrConfig] = &[
    AttrConfig::string("w:val", "val"),
    AttrConfig::color("w:color", "color"),
    AttrConfig::string("w:themeColor", "themeColor"),
    AttrConfig::integer("w:sz", "size"),
    AttrConfig::integer("w:space", "space"),
    AttrConfig::on_off("w:shadow", "shadow"),
    AttrConfig::on_off("w:frame", "frame"),
];

const WIDTH_ATTRS: &[AttrConfig] = &[
    AttrConfig::integer("w:w", "width"),
    AttrConfig::string("w:type", "type"),
];

macro_rules! border_side {
    ($name:ident, $xml:literal, $key:literal) => {
        pub static $name: NodeTranslator = NodeTranslator {
            attributes: BORDER_ATTRS,
            ..NodeTranslator::object($xml, $key)
        };
    };
}

macro_rules! width_side {
    ($name:ident, $xml:literal, $key:literal) => {
        pub static $name: NodeTranslator = NodeTranslator {
            attributes: WIDTH_ATTRS,
            ..NodeTranslator::object($xml, $key)
        };
    };
}

border_side!(BORDER_TOP, "w:top", "top");
border_side!(BORDER_LEFT, "w:left", "left");
border_side!(BORDER_START, "w:start", "start");
border_side!(BORDER_BOTTOM, "w:bottom", "bottom");
border_side!(BORDER_RIGHT, "w:right", "right");
border_side!(BORDER_END, "w:end", "end");
border_side!(BORDER_INSIDE_H, "w:insideH", "insideH");
border_side!(BORDER_INSIDE_V, "w:insideV", "insideV");
border_side!(BORDER_TL2BR, "w:tl2br", "tl2br");
border_side!(BORDER_TR2BL, "w:tr2bl", "tr2bl");

width_side!(MARGIN_TOP, "w:top", "top");
width_side!(MARGIN_LEFT, "w:left", "left");
width_side!(MARGIN_START, "w:start", "start");
width_side!(MARGIN_BOTTOM, "w:bottom", "bottom");
width_side!(MARGIN_RIGHT, "w:right", "right");
width_side!(MARGIN_END, "w:end", "end");

pub static TABLE_BORDERS: NodeTranslator = NodeTranslator {
    children: &[
        &BORDER_TOP,
        &BORDER_LEFT,
        &BORDER_START,
        &BORDER_BOTTOM,
        &BORDER_RIGHT,
        &BORDER_END,
        &BORDER_INSIDE_H,
        &BORDER_INSIDE_V,
    ],
    ..NodeTranslator::nested("w:tblBorders", keys::BORDERS)
};

pub static CELL_BORDERS: NodeTranslator = NodeTranslator {
    children: &[
        &BORDER_TOP,
        &BORDER_LEFT,
        &BORDER_START,
        &BORDER_BOTTOM,
        &BORDER_RIGHT,
        &BORDER_END,
        &BORDER_INSIDE_H,
        &BORDER_INSIDE_V,
        &BORDER_TL2BR,
        &BORDER_TR2BL,
    ],
    ..NodeTranslator::nested("w:tcBorders", keys::BORDERS)
};

pub static TABLE_CELL_MARGINS: NodeTranslator = NodeTranslator {
    children: &[
        &MARGIN_TOP,
        &MARGIN_LEFT,
        &MARGIN_START,
        &MARGIN_BOTTOM,
        &MARGIN_RIGHT,
        &MARGIN_END,
    ],
    ..NodeTranslator::nested("w:tblCellMar", "cellMargins")
};

pub static CELL_MARGINS: NodeTranslator = NodeTranslator {
    children: &[
        &MARGIN_TOP,
        &MARGIN_LEFT,
        &MARGIN_START,
        &MARGIN_BOTTOM,
        &MARGIN_RIGHT,
        &MARGIN_END,
    ],
    ..NodeTranslator::nested("w:tcMar", "margins")
};

pub static SHADING: NodeTranslator = NodeTranslator {
    attributes: &[
        AttrConfig::string("w:val", "val"),
        AttrConfig::color("w:color", "color"),
        AttrConfig::color("w:fill", "fill"),
        AttrConfig::string("w:themeFill", "themeFill"),
    ],
    ..NodeTranslator::object("w:shd", "shading")
};

pub static CONDITIONAL_STYLE: NodeTranslator = NodeTranslator::raw("w:cnfStyle", "conditionalStyle");

// Table level.

pub static TABLE_STYLE: NodeTranslator = NodeTranslator::val("w:tblStyle", "styleId");
pub static TABLE_POSITION: NodeTranslator = NodeTranslator::raw("w:tblpPr", "floating");
pub static TABLE_OVERLAP: NodeTranslator = NodeTranslator::val("w:tblOverlap", "overlap");
pub static BIDI_VISUAL: NodeTranslator = NodeTranslator::on_off("w:bidiVisual", "rightToLeft");

pub static ROW_BAND_SIZE: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::integer("w:val", "val")],
    ..NodeTranslator::val("w:tblStyleRowBandSize", "rowBandSize")
};

pub static COLUMN_BAND_SIZE: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::integer("w:val", "val")],
    ..NodeTranslator::val("w:tblStyleColBandSize", "columnBandSize")
};

pub static TABLE_WIDTH: NodeTranslator = NodeTranslator {
    attributes: WIDTH_ATTRS,
    ..NodeTranslator::object("w:tblW", keys::WIDTH)
};

pub static JUSTIFICATION: NodeTranslator = NodeTranslator::val("w:jc", "justification");

pub static CELL_SPACING: NodeTranslator = NodeTranslator {
    attributes: WIDTH_ATTRS,
    ..NodeTranslator::object("w:tblCellSpacing", "cellSpacing")
};

pub static TABLE_INDENT: NodeTranslator = NodeTranslator {
    attributes: WIDTH_ATTRS,
    ..NodeTranslator::object("w:tblInd", "indent")
};

pub static TABLE_LAYOUT: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::string("w:type", "val")],
    ..NodeTranslator::val("w:tblLayout", "layout")
};

pub static TABLE_LOOK: NodeTranslator = NodeTranslator {
    attributes: &[
        AttrConfig::string("w:val", "val"),
        AttrConfig::on_off("w:firstRow", "firstRow"),
        AttrConfig::on_off("w:lastRow", "lastRow"),
        AttrConfig::on_off("w:firstColumn", "firstColumn"),
        AttrConfig::on_off("w:lastColumn", "lastColumn"),
        AttrConfig::on_off("w:noHBand", "noHBand"),
        AttrConfig::on_off("w:noVBand", "noVBand"),
    ],
    ..NodeTranslator::object("w:tblLook", "look")
};

pub static TABLE_CAPTION: NodeTranslator = NodeTranslator::val("w:tblCaption", "caption");
pub static TABLE_DESCRIPTION: NodeTranslator = NodeTranslator::val("w:tblDescription", "description");

/// `w:tblPr`, children in schema order.
pub static TABLE_PROPERTIES: NodeTranslator = NodeTranslator {
    children: &[
        &TABLE_STYLE,
        &TABLE_POSITION,
        &TABLE_OVERLAP,
        &BIDI_VISUAL,
        &ROW_BAND_SIZE,
        &COLUMN_BAND_SIZE,
        &TABLE_WIDTH,
        &JUSTIFICATION,
        &CELL_SPACING,
        &TABLE_INDENT,
        &TABLE_BORDERS,
        &SHADING,
        &TABLE_LAYOUT,
        &TABLE_CELL_MARGINS,
        &TABLE_LOOK,
        &TABLE_CAPTION,
        &TABLE_DESCRIPTION,
    ],
    ..NodeTranslator::nested("w:tblPr", "tableProperties")
};

// Row level.

pub static GRID_BEFORE: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::integer("w:val", "val")],
    ..NodeTranslator::val("w:gridBefore", keys::GRID_BEFORE)
};

pub static GRID_AFTER: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::integer("w:val", "val")],
    ..NodeTranslator::val("w:gridAfter", keys::GRID_AFTER)
};

pub static WIDTH_BEFORE: NodeTranslator = NodeTranslator {
    attributes: WIDTH_ATTRS,
    ..NodeTranslator::object("w:wBefore", "widthBefore")
};

pub static WIDTH_AFTER: NodeTranslator = NodeTranslator {
    attributes: WIDTH_ATTRS,
    ..NodeTranslator::object("w:wAfter", "widthAfter")
};

pub static CANT_SPLIT: NodeTranslator = NodeTranslator::on_off("w:cantSplit", "cantSplit");

pub static ROW_HEIGHT: NodeTranslator = NodeTranslator {
    attributes: &[
        AttrConfig::integer("w:val", "height"),
        AttrConfig::string("w:hRule", "rule"),
    ],
    ..NodeTranslator::object("w:trHeight", "height")
};

pub static REPEAT_HEADER: NodeTranslator = NodeTranslator::on_off("w:tblHeader", "repeatHeader");
pub static ROW_HIDDEN: NodeTranslator = NodeTranslator::on_off("w:hidden", "hidden");

/// `w:trPr`.
pub static ROW_PROPERTIES: NodeTranslator = NodeTranslator {
    children: &[
        &CONDITIONAL_STYLE,
        &GRID_BEFORE,
        &GRID_AFTER,
        &WIDTH_BEFORE,
        &WIDTH_AFTER,
        &CANT_SPLIT,
        &ROW_HEIGHT,
        &REPEAT_HEADER,
        &CELL_SPACING,
        &JUSTIFICATION,
        &ROW_HIDDEN,
    ],
    ..NodeTranslator::nested("w:trPr", "rowProperties")
};

// Cell level.

pub static CELL_WIDTH: NodeTranslator = NodeTranslator {
    attributes: WIDTH_ATTRS,
    ..NodeTranslator::object("w:tcW", keys::WIDTH)
};

pub static GRID_SPAN: NodeTranslator = NodeTranslator {
    attributes: &[AttrConfig::integer("w:val", "val")],
    ..NodeTranslator::val("w:gridSpan", keys::GRID_SPAN)
};

pub static HORIZONTAL_MERGE: NodeTranslator = NodeTranslator::raw("w:hMerge", "hMerge");

/// `w:vMerge`; a bare element continues the merge.
pub static VERTICAL_MERGE: NodeTranslator = NodeTranslator::custom(
    "w:vMerge",
    keys::VERTICAL_MERGE,
    crate::translator::TranslatorKind::Attribute,
    encode_vertical_merge,
    decode_vertical_merge,
);

pub static NO_WRAP: NodeTranslator = NodeTranslator::on_off("w:noWrap", "noWrap");
pub static TEXT_DIRECTION: NodeTranslator = NodeTranslator::val("w:textDirection", "textDirection");
pub static FIT_TEXT: NodeTranslator = NodeTranslator::on_off("w:tcFitText", "fitText");
pub static VERTICAL_ALIGN: NodeTranslator = NodeTranslator::val("w:vAlign", "verticalAlign");
pub static HIDE_MARK: NodeTranslator = NodeTranslator::on_off("w:hideMark", "hideMark");

/// `w:tcPr`, children in schema order.
pub static CELL_PROPERTIES: NodeTranslator = NodeTranslator {
    children: &[
        &CONDITIONAL_STYLE,
        &CELL_WIDTH,
        &GRID_SPAN,
        &HORIZONTAL_MERGE,
        &VERTICAL_MERGE,
        &CELL_BORDERS,
        &SHADING,
        &NO_WRAP,
        &CELL_MARGINS,
        &TEXT_DIRECTION,
        &FIT_TEXT,
        &VERTICAL_ALIGN,
        &HIDE_MARK,
    ],
    ..NodeTranslator::nested("w:tcPr", "cellProperties")
};

/// Cell properties of a grid placeholder: invisible zero-width borders.
pub fn invisible_borders() -> Attrs {
    let none = json!({"val": "none", "size": 0});
    let mut borders = Attrs::new();
    for side in ["top", "bottom", "left", "right"] {
        borders.insert(side.to_string(), none.clone());
    }
    let mut props = Attrs::new();
    props.insert(keys::BORDERS.to_string(), Value::Object(borders));
    props
}

fn encode_vertical_merge(_: &NodeTranslator, _: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    let val = node.attr("w:val").unwrap_or("continue");
    Some(Encoded::Value(Value::String(val.to_string())))
}

fn decode_vertical_merge(t: &NodeTranslator, _: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    match input.value().and_then(Value::as_str) {
        Some("restart") => single(XmlNode::new(t.xml_name).with_attr("w:val", "restart")),
        Some("continue") => single(XmlNode::new(t.xml_name)),
        _ => Decoded::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EngineConfig;

    #[test]
    fn test_cell_properties_round_trip() {
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let tcpr = XmlNode::parse(
            r#"<w:tcPr>
                <w:tcW w:w="2000" w:type="dxa"/>
                <w:gridSpan w:val="2"/>
                <w:vMerge/>
                <w:tcBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tcBorders>
                <w:shd w:val="clear" w:color="auto" w:fill="D9E2F3"/>
                <w:vAlign w:val="center"/>
            </w:tcPr>"#,
        )
        .unwrap();
        let props = CELL_PROPERTIES.encode_value(&mut session, &tcpr).unwrap();
        assert_eq!(props["gridSpan"], json!(2));
        assert_eq!(props["vMerge"], json!("continue"));
        assert_eq!(props["shading"]["fill"], json!("#d9e2f3"));
        assert_eq!(props["borders"]["top"]["size"], json!(4));

        let mut ctx = ExportContext::new(&config);
        let back = CELL_PROPERTIES.decode_value(&mut ctx, &props).unwrap();
        assert_eq!(back, tcpr);
    }

    #[test]
    fn test_placeholder_borders_decode_to_none() {
        let config = EngineConfig::default();
        let mut ctx = ExportContext::new(&config);
        let props = Value::Object(invisible_borders());
        let tcpr = CELL_PROPERTIES.decode_value(&mut ctx, &props).unwrap();
        let borders = tcpr.child("w:tcBorders").unwrap();
        let names: Vec<_> = borders.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:top", "w:left", "w:bottom", "w:right"]);
        assert!(borders.elements.iter().all(|b| b.attr("w:val") == Some("none") && b.attr("w:sz") == Some("0")));
    }

    #[test]
    fn test_row_properties() {
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let trpr = XmlNode::parse(
            r#"<w:trPr><w:gridBefore w:val="1"/><w:trHeight w:val="400" w:hRule="exact"/><w:tblHeader/></w:trPr>"#,
        )
        .unwrap();
        let props = ROW_PROPERTIES.encode_value(&mut session, &trpr).unwrap();
        assert_eq!(
            props,
            json!({"gridBefore": 1, "height": {"height": 400, "rule": "exact"}, "repeatHeader": true})
        );
    }
}
