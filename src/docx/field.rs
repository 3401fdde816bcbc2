/// Fields: `w:fldSimple` and complex fields spread over sibling runs.
///
/// A complex field is a begin marker run, instruction runs, an optional
/// separate marker, the result content, and an end marker. The whole span is
/// consumed as one `field` node whose content is the translated result.
use super::properties::run::RUN_PROPERTIES;
use super::run::RUN_PROPERTIES_KEY;
use crate::common::xml::{XmlAttrs, XmlNode};
use crate::dispatch::{self, Dispatched, Level};
use crate::model::{InternalNode, NodeKind};
use crate::translator::context::{ExportContext, ImportSession};
use crate::translator::{Decodable, Decoded, Encoded, NodeTranslator, TranslatorKind, single};
use serde_json::Value;

pub const INSTRUCTION: &str = "instruction";
pub const FIELD_TYPE: &str = "fieldType";
pub const SIMPLE: &str = "simple";
pub const SEPARATED: &str = "separated";
/// Attributes of `w:fldSimple` or of the begin `w:fldChar` (lock, dirty)
pub const FIELD_ATTRIBUTES: &str = "fieldAttributes";

pub static FIELD: NodeTranslator = NodeTranslator::custom(
    "w:fldSimple",
    "field",
    TranslatorKind::Element,
    encode_simple,
    decode_field,
);

/// Children a field marker run may hold.
const MARKER_CHILDREN: &[&str] = &["w:rPr", "w:fldChar", "w:instrText", "w:delInstrText"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldChar {
    Begin,
    Separate,
    End,
}

impl FieldChar {
    fn of(node: &XmlNode) -> Option<Self> {
        if node.name != "w:fldChar" {
            return None;
        }
        match node.attr("w:fldCharType")? {
            "begin" => Some(Self::Begin),
            "separate" => Some(Self::Separate),
            "end" => Some(Self::End),
            _ => None,
        }
    }
}

fn is_marker_run(node: &XmlNode) -> bool {
    node.name == "w:r" && node.elements.iter().all(|c| MARKER_CHILDREN.contains(&c.name.as_str()))
}

/// First token of an instruction, upper-cased (`HYPERLINK`, `PAGE`, ...).
pub fn field_type(instruction: &str) -> Option<String> {
    instruction.split_whitespace().next().map(str::to_uppercase)
}

/// Group the complex field starting at `siblings[index]`.
///
/// `None` means the run does not start a well-formed field and is translated
/// as an ordinary run: a missing end marker, a nested begin inside the
/// instruction, or non-marker content before the separator.
pub fn group_complex(session: &mut ImportSession<'_>, siblings: &[XmlNode], index: usize) -> Option<Dispatched> {
    let begin_run = siblings.get(index)?;
    if !is_marker_run(begin_run) {
        return None;
    }
    let begin = begin_run.elements.iter().find(|c| c.name == "w:fldChar")?;
    if FieldChar::of(begin) != Some(FieldChar::Begin) {
        return None;
    }

    let mut instruction = String::new();
    let mut separator = None;
    let mut end = None;
    let mut seen_begin = false;

    // Instruction phase: marker runs only, scanned child by child.
    'instruction: for (at, sibling) in siblings.iter().enumerate().skip(index) {
        if !is_marker_run(sibling) {
            log::debug!("field at sibling {index}: {} inside the instruction", sibling.name);
            return None;
        }
        for (offset, child) in sibling.elements.iter().enumerate() {
            match (child.name.as_str(), FieldChar::of(child)) {
                ("w:instrText" | "w:delInstrText", _) => instruction.push_str(child.text()),
                (_, Some(FieldChar::Begin)) if seen_begin => {
                    log::debug!("field at sibling {index}: nested field in instruction; not grouped");
                    return None;
                },
                (_, Some(FieldChar::Begin)) => seen_begin = true,
                (_, Some(FieldChar::Separate)) => {
                    separator = Some((at, offset));
                    break 'instruction;
                },
                (_, Some(FieldChar::End)) => {
                    end = Some(at);
                    break 'instruction;
                },
                _ => {},
            }
        }
    }

    // Result phase: depth counting over direct runs, starting with whatever
    // follows the separator inside its own run.
    if let Some((sep, offset)) = separator {
        let rest_of_separator = siblings[sep].elements[offset + 1..].iter().map(|c| (sep, c));
        let later = siblings
            .iter()
            .enumerate()
            .skip(sep + 1)
            .filter(|(_, sibling)| sibling.name == "w:r")
            .flat_map(|(at, sibling)| sibling.elements.iter().map(move |c| (at, c)));
        let mut depth = 0usize;
        for (at, kind) in rest_of_separator
            .chain(later)
            .filter_map(|(at, c)| FieldChar::of(c).map(|kind| (at, kind)))
        {
            match kind {
                FieldChar::Begin => depth += 1,
                FieldChar::End if depth == 0 => {
                    end = Some(at);
                    break;
                },
                FieldChar::End => depth -= 1,
                FieldChar::Separate => {},
            }
        }
    }

    let Some(end) = end else {
        log::debug!("field at sibling {index} has no end marker; not grouped");
        return None;
    };
    let separator = separator.map(|(sep, _)| sep);
    let result_start = separator.map_or(end, |sep| (sep + 1).min(end));

    let mut field = InternalNode::new(NodeKind::Field);
    let instruction = instruction.trim().to_string();
    if let Some(kind) = field_type(&instruction) {
        field.attrs.insert(FIELD_TYPE.to_string(), Value::String(kind));
    }
    field.attrs.insert(INSTRUCTION.to_string(), Value::String(instruction));
    field.attrs.insert(SEPARATED.to_string(), Value::Bool(separator.is_some()));
    store_attributes(&mut field, begin, &["w:fldCharType"]);
    if let Some(props) = begin_run
        .child("w:rPr")
        .and_then(|rpr| RUN_PROPERTIES.encode_value(session, rpr))
    {
        field.attrs.insert(RUN_PROPERTIES_KEY.to_string(), props);
    }
    field.content = dispatch::encode_sequence(session, &siblings[result_start..end], Level::Inline);

    log::debug!(
        "grouped complex field {:?} over siblings {index}..={end}",
        field.attr_str(FIELD_TYPE)
    );
    Some(Dispatched {
        items: vec![field.into()],
        consumed: end - index + 1,
    })
}

fn store_attributes(field: &mut InternalNode, element: &XmlNode, skip: &[&str]) {
    let attrs: XmlAttrs = element
        .attributes
        .iter()
        .filter(|(name, _)| !skip.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    if !attrs.is_empty()
        && let Ok(value) = serde_json::to_value(&attrs)
    {
        field.attrs.insert(FIELD_ATTRIBUTES.to_string(), value);
    }
}

fn stored_attributes(field: &InternalNode) -> XmlAttrs {
    field
        .attr(FIELD_ATTRIBUTES)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

fn encode_simple(_: &NodeTranslator, session: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    let mut field = InternalNode::new(NodeKind::Field);
    let instruction = node.attr("w:instr").unwrap_or_default().trim().to_string();
    if let Some(kind) = field_type(&instruction) {
        field.attrs.insert(FIELD_TYPE.to_string(), Value::String(kind));
    }
    field.attrs.insert(INSTRUCTION.to_string(), Value::String(instruction));
    field.attrs.insert(SIMPLE.to_string(), Value::Bool(true));
    store_attributes(&mut field, node, &["w:instr"]);
    field.content = dispatch::encode_inline(session, &node.elements);
    Some(Encoded::Node(field))
}

fn decode_field(_: &NodeTranslator, ctx: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    let Some(field) = input.node() else {
        return Decoded::new();
    };
    let instruction = field.attr_str(INSTRUCTION).unwrap_or_default();
    let attrs = stored_attributes(field);

    if field.attr(SIMPLE).and_then(Value::as_bool) == Some(true) {
        let mut element = XmlNode::new("w:fldSimple").with_attr("w:instr", format!(" {instruction} "));
        element.attributes.extend(attrs);
        element.elements = dispatch::decode_inline(ctx, &field.content);
        return single(element);
    }

    let removed = ctx.in_removal() || field.marks.iter().any(|m| m.kind.is_removal());
    let props = field
        .attr(RUN_PROPERTIES_KEY)
        .and_then(|p| RUN_PROPERTIES.decode_value(ctx, p));
    let marker = |child: XmlNode| {
        let mut run = XmlNode::new("w:r");
        run.elements.extend(props.clone());
        run.with_child(child)
    };
    let field_char = |kind: &str| XmlNode::new("w:fldChar").with_attr("w:fldCharType", kind);

    let mut begin = field_char("begin");
    begin.attributes.extend(attrs);
    let mut out = Decoded::new();
    out.push(marker(begin));
    let instr = XmlNode::new(if removed { "w:delInstrText" } else { "w:instrText" })
        .with_attr("xml:space", "preserve")
        .with_text(format!(" {instruction} "));
    out.push(marker(instr));
    let separated = field.attr(SEPARATED).and_then(Value::as_bool).unwrap_or(true);
    if separated || !field.content.is_empty() {
        out.push(marker(field_char("separate")));
        out.extend(dispatch::decode_inline(ctx, &field.content));
    }
    out.push(marker(field_char("end")));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EngineConfig;
    use crate::model::Content;

    fn paragraph(xml: &str) -> XmlNode {
        XmlNode::parse(xml).unwrap()
    }

    fn nodes(items: &[Content]) -> Vec<&InternalNode> {
        items.iter().filter_map(Content::as_node).collect()
    }

    const PAGE_FIELD: &str = r#"<w:p>
        <w:r><w:t xml:space="preserve">Page </w:t></w:r>
        <w:r><w:rPr><w:b/></w:rPr><w:fldChar w:fldCharType="begin"/></w:r>
        <w:r><w:rPr><w:b/></w:rPr><w:instrText xml:space="preserve"> PAGE </w:instrText></w:r>
        <w:r><w:rPr><w:b/></w:rPr><w:fldChar w:fldCharType="separate"/></w:r>
        <w:r><w:rPr><w:b/></w:rPr><w:t>4</w:t></w:r>
        <w:r><w:rPr><w:b/></w:rPr><w:fldChar w:fldCharType="end"/></w:r>
        <w:r><w:t xml:space="preserve"> of 9</w:t></w:r>
    </w:p>"#;

    #[test]
    fn test_complex_field_is_grouped() {
        let p = paragraph(PAGE_FIELD);
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let items = dispatch::encode_inline(&mut session, &p.elements);
        let nodes = nodes(&items);
        let kinds: Vec<_> = nodes.iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NodeKind::Run, NodeKind::Field, NodeKind::Run]);

        let field = nodes[1];
        assert_eq!(field.attr_str(INSTRUCTION), Some("PAGE"));
        assert_eq!(field.attr_str(FIELD_TYPE), Some("PAGE"));
        assert_eq!(field.text_content(), "4");
        assert_eq!(field.attr(RUN_PROPERTIES_KEY), Some(&serde_json::json!({"bold": true})));
    }

    #[test]
    fn test_complex_field_round_trip() {
        let p = paragraph(PAGE_FIELD);
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let items = dispatch::encode_inline(&mut session, &p.elements);
        let mut ctx = ExportContext::new(&config);
        let out = dispatch::decode_inline(&mut ctx, &items);
        assert_eq!(out, p.elements);
    }

    #[test]
    fn test_nested_field_in_result() {
        let p = paragraph(
            r#"<w:p>
            <w:r><w:fldChar w:fldCharType="begin"/></w:r>
            <w:r><w:instrText>IF 1 = 1</w:instrText></w:r>
            <w:r><w:fldChar w:fldCharType="separate"/></w:r>
            <w:r><w:fldChar w:fldCharType="begin"/></w:r>
            <w:r><w:instrText>DATE</w:instrText></w:r>
            <w:r><w:fldChar w:fldCharType="separate"/></w:r>
            <w:r><w:t>today</w:t></w:r>
            <w:r><w:fldChar w:fldCharType="end"/></w:r>
            <w:r><w:fldChar w:fldCharType="end"/></w:r>
        </w:p>"#,
        );
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let items = dispatch::encode_inline(&mut session, &p.elements);
        let outer = nodes(&items);
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].attr_str(FIELD_TYPE), Some("IF"));
        let inner: Vec<_> = outer[0].child_nodes().collect();
        assert_eq!(inner[0].kind, NodeKind::Field);
        assert_eq!(inner[0].attr_str(INSTRUCTION), Some("DATE"));
    }

    #[test]
    fn test_end_sharing_the_separator_run() {
        let p = paragraph(
            r#"<w:p>
            <w:r><w:fldChar w:fldCharType="begin"/></w:r>
            <w:r><w:instrText>PAGE</w:instrText></w:r>
            <w:r><w:fldChar w:fldCharType="separate"/><w:fldChar w:fldCharType="end"/></w:r>
            <w:r><w:t>between</w:t></w:r>
            <w:r><w:fldChar w:fldCharType="begin"/></w:r>
            <w:r><w:instrText>DATE</w:instrText></w:r>
            <w:r><w:fldChar w:fldCharType="separate"/></w:r>
            <w:r><w:t>today</w:t></w:r>
            <w:r><w:fldChar w:fldCharType="end"/></w:r>
        </w:p>"#,
        );
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let first = group_complex(&mut session, &p.elements, 0).unwrap();
        assert_eq!(first.consumed, 3);

        let items = dispatch::encode_inline(&mut session, &p.elements);
        let nodes = nodes(&items);
        let kinds: Vec<_> = nodes.iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NodeKind::Field, NodeKind::Run, NodeKind::Field]);
        assert_eq!(nodes[0].attr_str(INSTRUCTION), Some("PAGE"));
        assert_eq!(nodes[0].attr(SEPARATED), Some(&Value::Bool(true)));
        assert_eq!(nodes[0].text_content(), "");
        assert_eq!(nodes[1].text_content(), "between");
        assert_eq!(nodes[2].attr_str(INSTRUCTION), Some("DATE"));
        assert_eq!(nodes[2].text_content(), "today");
    }

    #[test]
    fn test_unterminated_field_stays_runs() {
        let p = paragraph(
            r#"<w:p><w:r><w:fldChar w:fldCharType="begin"/></w:r><w:r><w:instrText>PAGE</w:instrText></w:r></w:p>"#,
        );
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let items = dispatch::encode_inline(&mut session, &p.elements);
        assert!(nodes(&items).iter().all(|n| n.kind == NodeKind::Run));
    }

    #[test]
    fn test_nested_begin_in_instruction_disables_grouping() {
        let p = paragraph(
            r#"<w:p><w:r><w:fldChar w:fldCharType="begin"/></w:r><w:r><w:fldChar w:fldCharType="begin"/></w:r><w:r><w:fldChar w:fldCharType="end"/></w:r></w:p>"#,
        );
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        assert!(group_complex(&mut session, &p.elements, 0).is_none());
    }

    #[test]
    fn test_simple_field() {
        let source = r#"<w:fldSimple w:instr=" NUMPAGES " w:dirty="true"><w:r><w:t>9</w:t></w:r></w:fldSimple>"#;
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let xml = paragraph(source);
        let Some(Encoded::Node(field)) = FIELD.encode(&mut session, &xml) else {
            panic!("simple field not encoded");
        };
        assert_eq!(field.attr_str(FIELD_TYPE), Some("NUMPAGES"));
        assert_eq!(field.attr(SIMPLE), Some(&Value::Bool(true)));

        let mut ctx = ExportContext::new(&config);
        assert_eq!(FIELD.decode(&mut ctx, Decodable::Node(&field)).into_vec(), vec![xml]);
    }
}
