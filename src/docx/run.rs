/// Runs (`w:r`) and their inline content.
///
/// Run formatting is kept whole under `runProperties`. The subset the editor
/// shows as marks (bold, italic, strike, underline, highlight and the
/// colour/size/font `textStyle`) is derived from it on import; on export the
/// marks win for those keys, so removing a mark removes the property.
use super::properties::run::{RUN_PROPERTIES, keys};
use super::{keep_xml_attributes, xml_attributes};
use crate::common::xml::XmlNode;
use crate::dispatch::{self, Level};
use crate::model::{Attrs, Content, InternalNode, Mark, MarkKind, NodeKind, TextRun};
use crate::translator::attr::parse_int;
use crate::translator::context::{ExportContext, ImportSession};
use crate::translator::{AttrConfig, Decodable, Decoded, Encoded, NodeTranslator, TranslatorKind, single};
use serde_json::{Value, json};

/// Attribute holding the encoded `w:rPr`.
pub const RUN_PROPERTIES_KEY: &str = "runProperties";

/// Marks a line break written as `w:cr`.
const CARRIAGE_RETURN: &str = "carriageReturn";

pub static RUN: NodeTranslator =
    NodeTranslator::custom("w:r", "run", TranslatorKind::Element, encode_run, decode_run);

pub static TAB: NodeTranslator =
    NodeTranslator::custom("w:tab", "tab", TranslatorKind::Element, encode_tab, decode_tab);

pub static LINE_BREAK: NodeTranslator = NodeTranslator {
    attributes: &[
        AttrConfig::string("w:type", "breakType"),
        AttrConfig::string("w:clear", "clear"),
    ],
    ..NodeTranslator::custom("w:br", "lineBreak", TranslatorKind::Element, encode_break, decode_break)
};

/// `w:t` (or `w:delText` under a removal) holding `text`.
pub fn text_element(text: &str, removed: bool) -> XmlNode {
    let mut element = XmlNode::new(if removed { "w:delText" } else { "w:t" });
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        element.attributes.insert("xml:space".to_string(), "preserve".to_string());
    }
    if !text.is_empty() {
        element.text = Some(text.to_string());
    }
    element
}

fn encode_run(_: &NodeTranslator, session: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    let mut run = InternalNode::new(NodeKind::Run);
    keep_xml_attributes(&mut run, node);

    let mut index = 0;
    while index < node.elements.len() {
        let child = &node.elements[index];
        match child.name.as_str() {
            "w:rPr" => {
                if let Some(props) = RUN_PROPERTIES.encode_value(session, child) {
                    run.attrs.insert(RUN_PROPERTIES_KEY.to_string(), props);
                }
            },
            "w:t" | "w:delText" => run.content.push(Content::Text(TextRun::new(child.text()))),
            "w:cr" => run
                .content
                .push(Content::Node(InternalNode::new(NodeKind::LineBreak).with_attr(CARRIAGE_RETURN, true))),
            _ => {
                let dispatched = dispatch::unwrap_at(session, &node.elements, index, Level::Inline);
                run.content.extend(dispatched.items);
                index += dispatched.consumed.max(1);
                continue;
            },
        }
        index += 1;
    }

    run.marks = marks_from_properties(run.attr_object(RUN_PROPERTIES_KEY));
    Some(Encoded::Node(run))
}

fn decode_run(_: &NodeTranslator, ctx: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    let Some(node) = input.node() else {
        return Decoded::new();
    };
    let mut props = node.attr_object(RUN_PROPERTIES_KEY).cloned().unwrap_or_default();
    apply_marks(&mut props, &node.marks);
    let removed = ctx.in_removal() || node.marks.iter().any(|m| m.kind.is_removal());

    let mut element = XmlNode::new("w:r");
    element.attributes = xml_attributes(node);
    element.elements.extend(RUN_PROPERTIES.decode_value(ctx, &Value::Object(props)));
    for chunk in node.content.chunk_by(|a, b| a.as_node().is_none() == b.as_node().is_none()) {
        if chunk[0].as_node().is_some() {
            element.elements.extend(dispatch::decode_inline(ctx, chunk));
            continue;
        }
        for item in chunk {
            if let Content::Text(text) = item {
                element.elements.push(text_element(&text.text, removed));
            }
        }
    }
    single(element)
}

fn encode_tab(_: &NodeTranslator, _: &mut ImportSession<'_>, _: &XmlNode) -> Option<Encoded> {
    Some(Encoded::Node(InternalNode::new(NodeKind::Tab)))
}

fn decode_tab(t: &NodeTranslator, _: &mut ExportContext<'_>, _: Decodable<'_>) -> Decoded {
    single(XmlNode::new(t.xml_name))
}

fn encode_break(t: &NodeTranslator, _: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    let mut line_break = InternalNode::new(NodeKind::LineBreak);
    line_break.attrs = t.encode_attributes(node);
    Some(Encoded::Node(line_break))
}

fn decode_break(t: &NodeTranslator, _: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    let Some(node) = input.node() else {
        return Decoded::new();
    };
    if node.attr(CARRIAGE_RETURN).and_then(Value::as_bool) == Some(true) {
        return single(XmlNode::new("w:cr"));
    }
    single(t.element_with(&node.attrs))
}

/// Font size mark value for a size in half-points.
pub fn half_points_to_size(half_points: i64) -> String {
    if half_points % 2 == 0 {
        format!("{}pt", half_points / 2)
    } else {
        format!("{}.5pt", half_points / 2)
    }
}

/// Inverse of [`half_points_to_size`]; fractional sizes round to the nearest half-point.
pub fn size_to_half_points(size: &str) -> Option<i64> {
    let number = size.trim().trim_end_matches("pt").trim();
    if let Some(whole) = parse_int(number) {
        return Some(whole * 2);
    }
    number.parse::<f64>().ok().map(|pt| (pt * 2.0).round() as i64)
}

fn is_on(props: &Attrs, key: &str) -> bool {
    props.get(key).and_then(Value::as_bool) == Some(true)
}

/// Marks shown for a run property object.
pub fn marks_from_properties(props: Option<&Attrs>) -> Vec<Mark> {
    let Some(props) = props else {
        return Vec::new();
    };
    let mut marks = Vec::new();
    for (key, kind) in [
        (keys::BOLD, MarkKind::Bold),
        (keys::ITALIC, MarkKind::Italic),
        (keys::STRIKE, MarkKind::Strike),
    ] {
        if is_on(props, key) {
            marks.push(Mark::new(kind));
        }
    }

    if let Some(underline) = props.get(keys::UNDERLINE).and_then(Value::as_object) {
        let kind = underline.get("val").and_then(Value::as_str).unwrap_or("single");
        if kind != "none" {
            let mut attrs = Attrs::new();
            attrs.insert("underlineType".to_string(), json!(kind));
            if let Some(color) = underline.get("color") {
                attrs.insert("color".to_string(), color.clone());
            }
            marks.push(Mark::with_attrs(MarkKind::Underline, attrs));
        }
    }

    if let Some(color) = props.get(keys::HIGHLIGHT).and_then(Value::as_str)
        && color != "none"
    {
        let mut attrs = Attrs::new();
        attrs.insert("color".to_string(), json!(color));
        marks.push(Mark::with_attrs(MarkKind::Highlight, attrs));
    }

    let mut style = Attrs::new();
    if let Some(color) = props
        .get(keys::COLOR)
        .and_then(|c| c.get("val"))
        .and_then(Value::as_str)
    {
        style.insert("color".to_string(), json!(color));
    }
    if let Some(size) = props.get(keys::FONT_SIZE).and_then(Value::as_i64) {
        style.insert("fontSize".to_string(), json!(half_points_to_size(size)));
    }
    if let Some(family) = props
        .get(keys::FONTS)
        .and_then(|f| f.get("ascii"))
        .and_then(Value::as_str)
    {
        style.insert("fontFamily".to_string(), json!(family));
    }
    if !style.is_empty() {
        marks.push(Mark::with_attrs(MarkKind::TextStyle, style));
    }
    marks
}

/// Overlay the mark-mapped keys of `marks` onto a run property object.
pub fn apply_marks(props: &mut Attrs, marks: &[Mark]) {
    let find = |kind: MarkKind| marks.iter().find(|m| m.kind == kind);

    for (key, kind) in [
        (keys::BOLD, MarkKind::Bold),
        (keys::ITALIC, MarkKind::Italic),
        (keys::STRIKE, MarkKind::Strike),
    ] {
        if find(kind).is_some() {
            props.insert(key.to_string(), Value::Bool(true));
        } else if is_on(props, key) {
            props.remove(key);
        }
    }

    match find(MarkKind::Underline) {
        Some(mark) => {
            let mut underline = props
                .get(keys::UNDERLINE)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            let kind = mark
                .attr_str("underlineType")
                .or_else(|| underline.get("val").and_then(Value::as_str).filter(|v| *v != "none"))
                .unwrap_or("single")
                .to_string();
            underline.insert("val".to_string(), json!(kind));
            match mark.attr("color") {
                Some(color) => underline.insert("color".to_string(), color.clone()),
                None => underline.remove("color"),
            };
            props.insert(keys::UNDERLINE.to_string(), Value::Object(underline));
        },
        None => {
            let shown = props
                .get(keys::UNDERLINE)
                .and_then(|u| u.get("val"))
                .and_then(Value::as_str)
                .is_some_and(|v| v != "none");
            if shown {
                props.remove(keys::UNDERLINE);
            }
        },
    }

    match find(MarkKind::Highlight) {
        Some(mark) => {
            let color = mark.attr_str("color").unwrap_or("yellow");
            props.insert(keys::HIGHLIGHT.to_string(), json!(color));
        },
        None => {
            if props
                .get(keys::HIGHLIGHT)
                .and_then(Value::as_str)
                .is_some_and(|v| v != "none")
            {
                props.remove(keys::HIGHLIGHT);
            }
        },
    }

    let style = find(MarkKind::TextStyle);
    let style_attr = |name: &str| style.and_then(|m| m.attr_str(name));

    match style_attr("color") {
        Some(color) => {
            let mut value = props
                .get(keys::COLOR)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            if value.get("val").and_then(Value::as_str) != Some(color) {
                // A new colour replaces any theme reference.
                value.clear();
                value.insert("val".to_string(), json!(color));
            }
            props.insert(keys::COLOR.to_string(), Value::Object(value));
        },
        None => {
            props.remove(keys::COLOR);
        },
    }

    match style_attr("fontSize").and_then(size_to_half_points) {
        Some(size) => {
            props.insert(keys::FONT_SIZE.to_string(), json!(size));
        },
        None => {
            props.remove(keys::FONT_SIZE);
        },
    }

    let family = style_attr("fontFamily");
    let mut fonts = props
        .get(keys::FONTS)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    match family {
        Some(family) if fonts.get("ascii").and_then(Value::as_str) != Some(family) => {
            fonts.insert("ascii".to_string(), json!(family));
            fonts.insert("hAnsi".to_string(), json!(family));
        },
        Some(_) => {},
        None => {
            fonts.remove("ascii");
            fonts.remove("hAnsi");
        },
    }
    if fonts.is_empty() {
        props.remove(keys::FONTS);
    } else {
        props.insert(keys::FONTS.to_string(), Value::Object(fonts));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EngineConfig;

    fn import(xml: &str) -> InternalNode {
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let node = XmlNode::parse(xml).unwrap();
        match RUN.encode(&mut session, &node) {
            Some(Encoded::Node(run)) => run,
            other => panic!("unexpected {other:?}"),
        }
    }

    fn export(run: &InternalNode) -> XmlNode {
        let config = EngineConfig::default();
        let mut ctx = ExportContext::new(&config);
        RUN.decode(&mut ctx, Decodable::Node(run)).into_iter().next().unwrap()
    }

    #[test]
    fn test_marks_from_run_properties() {
        let run = import(
            r#"<w:r><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial"/><w:b/><w:color w:val="C00000"/><w:sz w:val="21"/><w:u w:val="wave"/></w:rPr><w:t>Hi</w:t></w:r>"#,
        );
        let kinds: Vec<_> = run.marks.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MarkKind::Bold, MarkKind::Underline, MarkKind::TextStyle]);
        let style = run.mark(MarkKind::TextStyle).unwrap();
        assert_eq!(style.attr_str("color"), Some("#c00000"));
        assert_eq!(style.attr_str("fontSize"), Some("10.5pt"));
        assert_eq!(style.attr_str("fontFamily"), Some("Arial"));
        assert_eq!(run.text_content(), "Hi");
    }

    #[test]
    fn test_round_trip_unchanged() {
        let source = r#"<w:r w:rsidR="00B2"><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial" w:cs="Arial"/><w:b/><w:i w:val="0"/><w:color w:val="C00000"/><w:sz w:val="24"/><w:highlight w:val="yellow"/></w:rPr><w:t xml:space="preserve">Hello </w:t><w:tab/><w:t>world</w:t><w:br w:type="page"/></w:r>"#;
        let run = import(source);
        assert_eq!(export(&run), XmlNode::parse(source).unwrap());
    }

    #[test]
    fn test_removed_mark_removes_property() {
        let mut run = import(r#"<w:r><w:rPr><w:b/><w:bCs/><w:sz w:val="24"/></w:rPr><w:t>x</w:t></w:r>"#);
        run.marks.retain(|m| m.kind != MarkKind::Bold);
        run.marks.push(Mark::new(MarkKind::Italic));
        let xml = export(&run);
        let rpr = xml.child("w:rPr").unwrap();
        let names: Vec<_> = rpr.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:bCs", "w:i", "w:sz"]);
    }

    #[test]
    fn test_deleted_run_writes_del_text() {
        let mut run = import(r#"<w:r><w:t>gone</w:t></w:r>"#);
        run.marks.push(Mark::new(MarkKind::TrackDelete));
        let xml = export(&run);
        assert_eq!(xml.child("w:delText").map(XmlNode::text), Some("gone"));
    }

    #[test]
    fn test_carriage_return_and_unknown_content() {
        let source = r#"<w:r><w:t>a</w:t><w:cr/><w:sym w:font="Symbol" w:char="F0B7"/></w:r>"#;
        let run = import(source);
        let kinds: Vec<_> = run.child_nodes().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NodeKind::LineBreak, NodeKind::PassthroughInline]);
        assert_eq!(export(&run), XmlNode::parse(source).unwrap());
    }

    #[test]
    fn test_font_sizes() {
        assert_eq!(half_points_to_size(24), "12pt");
        assert_eq!(half_points_to_size(21), "10.5pt");
        assert_eq!(size_to_half_points("12pt"), Some(24));
        assert_eq!(size_to_half_points("10.5pt"), Some(21));
        assert_eq!(size_to_half_points("big"), None);
    }
}
