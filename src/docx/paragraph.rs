/// Paragraphs (`w:p`).
///
/// Besides the stored `paragraphProperties`, an imported paragraph carries two
/// derived attributes: `numbering` (the resolved list level, when the
/// paragraph is a list item) and `indent` (style, numbering level and direct
/// indentation merged field by field). Both are recomputed on every import;
/// export writes only what the stored properties say, plus a `w:numPr` for
/// numbering the editor attached directly.
use super::properties::paragraph::{PARAGRAPH_PROPERTIES, direct_level, direct_numbering, keys};
use super::{keep_xml_attributes, xml_attributes};
use crate::common::xml::XmlNode;
use crate::dispatch::{self, Level};
use crate::model::{Attrs, InternalNode, NodeKind};
use crate::numbering::{Indent, ResolvedLevel, render_level_label, resolve_indent};
use crate::translator::context::{ExportContext, ImportSession};
use crate::translator::{Decodable, Decoded, Encoded, NodeTranslator, TranslatorKind, single};
use serde_json::{Value, json};

pub const PARAGRAPH_PROPERTIES_KEY: &str = "paragraphProperties";
pub const NUMBERING_KEY: &str = "numbering";
pub const INDENT_KEY: &str = "indent";

/// Where a paragraph's list reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingSource {
    /// `w:numPr` in the paragraph's own properties
    Direct,
    /// Inherited through the paragraph style chain
    Style,
}

impl NumberingSource {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Style => "style",
        }
    }
}

pub static PARAGRAPH: NodeTranslator = NodeTranslator::custom(
    "w:p",
    "paragraph",
    TranslatorKind::Element,
    encode_paragraph,
    decode_paragraph,
);

/// Paragraph with no properties and no content.
#[inline]
pub fn empty_paragraph() -> InternalNode {
    InternalNode::new(NodeKind::Paragraph)
}

/// `<w:p/>`.
#[inline]
pub fn empty_paragraph_xml() -> XmlNode {
    XmlNode::new("w:p")
}

fn encode_paragraph(_: &NodeTranslator, session: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    let mut paragraph = InternalNode::new(NodeKind::Paragraph);
    keep_xml_attributes(&mut paragraph, node);

    let props = node
        .child("w:pPr")
        .and_then(|ppr| PARAGRAPH_PROPERTIES.encode_value(session, ppr))
        .and_then(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default();

    let style_id = props.get(keys::STYLE_ID).and_then(Value::as_str);
    let list = list_reference(session, &props, style_id);
    let resolved = list.and_then(|(num_id, level, source)| {
        let resolved = session.resolve_numbering(num_id, level).into_level()?;
        Some((resolved, source))
    });

    let direct_indent = props.get(keys::INDENT).and_then(Indent::from_value);
    let style_indent = session.styles.resolve_indent(style_id);
    let level_indent = resolved.as_ref().and_then(|(r, _)| r.definition.indent);
    if let Some(indent) = resolve_indent(style_indent.as_ref(), level_indent.as_ref(), direct_indent.as_ref()) {
        paragraph.attrs.insert(INDENT_KEY.to_string(), indent.to_value());
    }

    if let Some((resolved, source)) = resolved {
        let numbering = numbering_attr(session, &resolved, source);
        paragraph.attrs.insert(NUMBERING_KEY.to_string(), numbering);
    }
    if !props.is_empty() {
        paragraph
            .attrs
            .insert(PARAGRAPH_PROPERTIES_KEY.to_string(), Value::Object(props));
    }

    paragraph.content = dispatch::encode_children(session, node, Level::Inline, "w:pPr");
    Some(Encoded::Node(paragraph))
}

/// The `(numId, level)` a paragraph refers to, direct formatting first.
///
/// A direct `w:numPr` with only `w:ilvl` keeps the style's list at the direct level.
fn list_reference(
    session: &ImportSession<'_>,
    props: &Attrs,
    style_id: Option<&str>,
) -> Option<(i64, u8, NumberingSource)> {
    let level = match direct_level(props) {
        Some(raw) => Some(list_level(raw)?),
        None => None,
    };
    if let Some((num_id, _)) = direct_numbering(props) {
        return Some((num_id, level.unwrap_or(0), NumberingSource::Direct));
    }
    let (num_id, style_level) = session.styles.resolve_numbering(style_id)?;
    Some((num_id, level.unwrap_or(style_level), NumberingSource::Style))
}

/// A written list level, or `None` when it cannot name one.
fn list_level(raw: i64) -> Option<u8> {
    let level = u8::try_from(raw).ok();
    if level.is_none() {
        log::warn!("list level {raw} is out of range; paragraph is not a list");
    }
    level
}

fn numbering_attr(session: &mut ImportSession<'_>, resolved: &ResolvedLevel, source: NumberingSource) -> Value {
    let mut numbering = json!({
        "numId": resolved.num_id(),
        "level": resolved.level(),
        "abstractId": resolved.abstract_id(),
        "format": resolved.definition.effective_format().as_str(),
        "source": source.as_str(),
    });
    if session.config.compute_list_labels {
        let levels = &resolved.table.levels;
        let indices = session.counters.advance(resolved.num_id(), resolved.level(), levels);
        if let Some(label) = render_level_label(levels, resolved.level(), &indices) {
            numbering["label"] = Value::String(label);
        }
    }
    numbering
}

fn decode_paragraph(_: &NodeTranslator, ctx: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    let Some(node) = input.node() else {
        return Decoded::new();
    };
    let mut props = node
        .attr_object(PARAGRAPH_PROPERTIES_KEY)
        .cloned()
        .unwrap_or_default();
    if !props.contains_key(keys::NUMBERING)
        && let Some(numbering) = node.attr_object(NUMBERING_KEY)
        && numbering.get("source").and_then(Value::as_str) != Some(NumberingSource::Style.as_str())
        && let Some(num_id) = numbering.get(keys::NUM_ID).and_then(Value::as_i64)
    {
        let level = numbering.get(keys::LEVEL).and_then(Value::as_i64).unwrap_or(0);
        props.insert(keys::NUMBERING.to_string(), json!({"level": level, "numId": num_id}));
    }

    let mut element = XmlNode::new("w:p");
    element.attributes = xml_attributes(node);
    if !props.is_empty() {
        element
            .elements
            .extend(PARAGRAPH_PROPERTIES.decode_value(ctx, &Value::Object(props)));
    }
    element.elements.extend(dispatch::decode_inline(ctx, &node.content));
    single(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EngineConfig;
    use crate::numbering::NumberingDefinitions;
    use crate::styles::StyleSheet;

    const NUMBERING: &str = r#"<w:numbering>
        <w:abstractNum w:abstractNumId="0">
            <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/>
                <w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl>
            <w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="lowerLetter"/><w:lvlText w:val="%1.%2)"/>
                <w:pPr><w:ind w:left="1440" w:hanging="360"/></w:pPr></w:lvl>
        </w:abstractNum>
        <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
    </w:numbering>"#;

    const STYLES: &str = r#"<w:styles>
        <w:style w:type="paragraph" w:styleId="Steps">
            <w:pPr><w:numPr><w:numId w:val="1"/></w:numPr><w:ind w:right="100"/></w:pPr>
        </w:style>
    </w:styles>"#;

    fn session(config: &EngineConfig) -> ImportSession<'_> {
        let numbering = NumberingDefinitions::from_xml(&XmlNode::parse(NUMBERING).unwrap()).unwrap();
        let styles = StyleSheet::from_xml(&XmlNode::parse(STYLES).unwrap()).unwrap();
        ImportSession::new(config).with_numbering(numbering).with_styles(styles)
    }

    fn import(session: &mut ImportSession<'_>, xml: &str) -> InternalNode {
        match PARAGRAPH.encode(session, &XmlNode::parse(xml).unwrap()) {
            Some(Encoded::Node(node)) => node,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_direct_numbering_with_labels() {
        let config = EngineConfig::default().with_list_labels(true);
        let mut session = session(&config);
        let item = r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>a</w:t></w:r></w:p>"#;
        let nested = r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="1"/><w:numId w:val="1"/></w:numPr></w:pPr></w:p>"#;

        import(&mut session, item);
        let second = import(&mut session, item);
        let child = import(&mut session, nested);

        let numbering = second.attr_object(NUMBERING_KEY).unwrap();
        assert_eq!(numbering["label"], "2.");
        assert_eq!(numbering["format"], "decimal");
        assert_eq!(numbering["source"], "direct");
        assert_eq!(child.attr_object(NUMBERING_KEY).unwrap()["label"], "2.a)");
        assert_eq!(second.attr(INDENT_KEY), Some(&json!({"left": 720, "hanging": 360})));
    }

    #[test]
    fn test_style_numbering_and_indent_layers() {
        let config = EngineConfig::default().with_list_labels(false);
        let mut session = session(&config);
        let para = import(
            &mut session,
            r#"<w:p><w:pPr><w:pStyle w:val="Steps"/><w:ind w:hanging="200"/></w:pPr></w:p>"#,
        );
        let numbering = para.attr_object(NUMBERING_KEY).unwrap();
        assert_eq!(numbering["numId"], 1);
        assert_eq!(numbering["source"], "style");
        assert!(numbering.get("label").is_none());
        assert_eq!(
            para.attr(INDENT_KEY),
            Some(&json!({"left": 720, "right": 100, "hanging": 200}))
        );
    }

    #[test]
    fn test_unknown_list_is_plain_paragraph() {
        let config = EngineConfig::default();
        let mut session = session(&config);
        let para = import(
            &mut session,
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="7"/></w:numPr></w:pPr></w:p>"#,
        );
        assert!(para.attr(NUMBERING_KEY).is_none());
        assert!(para.attr(PARAGRAPH_PROPERTIES_KEY).is_some());
    }

    #[test]
    fn test_out_of_range_level_is_plain_paragraph() {
        let config = EngineConfig::default();
        let mut session = session(&config);
        let direct = import(
            &mut session,
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="300"/><w:numId w:val="1"/></w:numPr></w:pPr></w:p>"#,
        );
        assert!(direct.attr(NUMBERING_KEY).is_none());

        let styled = import(
            &mut session,
            r#"<w:p><w:pPr><w:pStyle w:val="Steps"/><w:numPr><w:ilvl w:val="-1"/></w:numPr></w:pPr></w:p>"#,
        );
        assert!(styled.attr(NUMBERING_KEY).is_none());

        let next = import(
            &mut session,
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr></w:p>"#,
        );
        assert_eq!(next.attr_object(NUMBERING_KEY).unwrap()["label"], "1.");
    }

    #[test]
    fn test_round_trip_keeps_properties_only() {
        let config = EngineConfig::default();
        let mut session = session(&config);
        let source = r#"<w:p w14:paraId="3A" w:rsidR="00AB"><w:pPr><w:pStyle w:val="Steps"/><w:jc w:val="center"/></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#;
        let para = import(&mut session, source);
        let mut ctx = ExportContext::new(&config);
        let out = PARAGRAPH.decode(&mut ctx, Decodable::Node(&para));
        assert_eq!(out.into_vec(), vec![XmlNode::parse(source).unwrap()]);
    }

    #[test]
    fn test_editor_numbering_writes_num_pr() {
        let config = EngineConfig::default();
        let mut ctx = ExportContext::new(&config);
        let para = empty_paragraph().with_attr(NUMBERING_KEY, json!({"numId": 3, "level": 1}));
        let out = PARAGRAPH.decode(&mut ctx, Decodable::Node(&para)).into_vec();
        let num_pr = out[0].child("w:pPr").and_then(|p| p.child("w:numPr")).unwrap();
        assert_eq!(num_pr.child_val("w:ilvl"), Some("1"));
        assert_eq!(num_pr.child_val("w:numId"), Some("3"));
    }
}
