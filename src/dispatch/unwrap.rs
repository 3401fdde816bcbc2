/// Import-side dispatch over sibling elements.
///
/// [`unwrap_at`] looks at one element of a sibling list. Concrete elements go
/// to their translator. Wrappers (tracked changes, hyperlinks, structured
/// content tags, alternate content) are unwrapped: their content is translated
/// in place and the wrapper survives as a mark or attribute on every resulting
/// node. Anything unknown becomes a passthrough node. The result reports how
/// many siblings were consumed, which is more than one for complex fields.
use super::passthrough::preserve;
use crate::common::EngineConfig;
use crate::common::xml::XmlNode;
use crate::docx::{field, paragraph};
use crate::model::{Attrs, Content, Mark, MarkKind, NodeKind};
use crate::translator::attr::{AttrConfig, encode_all};
use crate::translator::context::ImportSession;
use crate::translator::{ElementKind, Encoded};
use serde_json::{Value, json};

/// Attribute carrying structured-content tag metadata, one entry per nested
/// `w:sdt`, outermost first.
pub const SDT: &str = "sdt";
/// Attribute carrying the unselected alternatives of `mc:AlternateContent`,
/// stacked like [`SDT`].
pub const ALTERNATE_CONTENT: &str = "alternateContent";

/// Tracked-change metadata shared by `w:ins`, `w:del`, `w:moveFrom` and `w:moveTo`.
pub const TRACK_ATTRS: &[AttrConfig] = &[
    AttrConfig::string("w:id", "id"),
    AttrConfig::string("w:author", "author"),
    AttrConfig::string("w:date", "date"),
];

/// `w:hyperlink` attributes carried by the link mark.
pub const LINK_ATTRS: &[AttrConfig] = &[
    AttrConfig::string("r:id", "rId"),
    AttrConfig::string("w:anchor", "anchor"),
    AttrConfig::string("w:tooltip", "tooltip"),
    AttrConfig::on_off("w:history", "history"),
    AttrConfig::string("w:tgtFrame", "targetFrame"),
    AttrConfig::string("w:docLocation", "docLocation"),
];

/// Where a sibling list sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Body, table cell or block structured content
    Block,
    /// Paragraph or run content
    Inline,
}

impl Level {
    #[inline]
    pub const fn passthrough_kind(self) -> NodeKind {
        match self {
            Level::Block => NodeKind::PassthroughBlock,
            Level::Inline => NodeKind::PassthroughInline,
        }
    }

    /// Minimal stand-in for an element rejected by a resource guard.
    fn fallback(self) -> Vec<Content> {
        match self {
            Level::Block => vec![Content::Node(paragraph::empty_paragraph())],
            Level::Inline => Vec::new(),
        }
    }
}

/// Content produced from one position of a sibling list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatched {
    pub items: Vec<Content>,
    /// Siblings consumed, starting at the dispatched index
    pub consumed: usize,
}

impl Dispatched {
    #[inline]
    pub fn single(items: Vec<Content>) -> Self {
        Self { items, consumed: 1 }
    }
}

/// Translate a whole sibling list in document order.
pub fn encode_sequence(session: &mut ImportSession<'_>, siblings: &[XmlNode], level: Level) -> Vec<Content> {
    let mut items = Vec::with_capacity(siblings.len());
    let mut index = 0;
    while index < siblings.len() {
        let dispatched = unwrap_at(session, siblings, index, level);
        items.extend(dispatched.items);
        index += dispatched.consumed.max(1);
    }
    items
}

/// Translate the children of `parent`, skipping its property container.
pub fn encode_children(
    session: &mut ImportSession<'_>,
    parent: &XmlNode,
    level: Level,
    properties: &str,
) -> Vec<Content> {
    match parent.elements.iter().position(|e| e.name == properties) {
        Some(0) => encode_sequence(session, &parent.elements[1..], level),
        Some(at) => {
            let mut items = encode_sequence(session, &parent.elements[..at], level);
            items.extend(encode_sequence(session, &parent.elements[at + 1..], level));
            items
        },
        None => encode_sequence(session, &parent.elements, level),
    }
}

#[inline]
pub fn encode_blocks(session: &mut ImportSession<'_>, siblings: &[XmlNode]) -> Vec<Content> {
    encode_sequence(session, siblings, Level::Block)
}

#[inline]
pub fn encode_inline(session: &mut ImportSession<'_>, siblings: &[XmlNode]) -> Vec<Content> {
    encode_sequence(session, siblings, Level::Inline)
}

/// Dispatch the sibling at `index`.
pub fn unwrap_at(
    session: &mut ImportSession<'_>,
    siblings: &[XmlNode],
    index: usize,
    level: Level,
) -> Dispatched {
    let Some(node) = siblings.get(index) else {
        return Dispatched::default();
    };
    let limits = &session.config.limits;
    if node.longest_attribute() > limits.max_attribute_len {
        log::warn!(
            "{} carries an attribute longer than {} bytes; replaced by a fallback",
            node.name,
            limits.max_attribute_len
        );
        return Dispatched::single(level.fallback());
    }
    match session.descend(|s| dispatch(s, siblings, index, level)) {
        Some(dispatched) => dispatched,
        None => {
            log::warn!("{} nests deeper than {}; replaced by a fallback", node.name, limits.max_depth);
            Dispatched::single(level.fallback())
        },
    }
}

fn dispatch(session: &mut ImportSession<'_>, siblings: &[XmlNode], index: usize, level: Level) -> Dispatched {
    let node = &siblings[index];
    let Some(kind) = ElementKind::from_xml_name(&node.name) else {
        return Dispatched::single(vec![preserve(node, level.passthrough_kind()).into()]);
    };
    log::trace!("dispatching {} as {kind:?}", node.name);

    match kind {
        ElementKind::Insert => marked(session, node, level, MarkKind::TrackInsert, TRACK_ATTRS),
        ElementKind::Delete => marked(session, node, level, MarkKind::TrackDelete, TRACK_ATTRS),
        ElementKind::MoveFrom => marked(session, node, level, MarkKind::TrackMoveFrom, TRACK_ATTRS),
        ElementKind::MoveTo => marked(session, node, level, MarkKind::TrackMoveTo, TRACK_ATTRS),
        ElementKind::Hyperlink => marked(session, node, level, MarkKind::Link, LINK_ATTRS),
        ElementKind::StructuredContent => structured_content(session, node, level),
        ElementKind::AlternateContent => alternate_content(session, node, level),
        ElementKind::Run if level == Level::Inline => {
            field::group_complex(session, siblings, index).unwrap_or_else(|| translate(session, node, kind, level))
        },
        _ => translate(session, node, kind, level),
    }
}

fn translate(session: &mut ImportSession<'_>, node: &XmlNode, kind: ElementKind, level: Level) -> Dispatched {
    match kind.translator().and_then(|t| t.encode(session, node)) {
        Some(encoded @ (Encoded::Node(_) | Encoded::Nodes(_))) => Dispatched::single(encoded.into_content()),
        _ => Dispatched::single(vec![preserve(node, level.passthrough_kind()).into()]),
    }
}

/// Unwrap a wrapper whose metadata becomes a mark on each wrapped node.
fn marked(
    session: &mut ImportSession<'_>,
    node: &XmlNode,
    level: Level,
    kind: MarkKind,
    attrs: &[AttrConfig],
) -> Dispatched {
    let mut items = encode_sequence(session, &node.elements, level);
    if items.is_empty() {
        return Dispatched::single(vec![preserve(node, level.passthrough_kind()).into()]);
    }
    let mark = Mark::with_attrs(kind, encode_all(attrs, &node.attributes));
    for item in &mut items {
        if let Some(inner) = item.as_node_mut()
            && !inner.marks.contains(&mark)
        {
            inner.marks.push(mark.clone());
        }
    }
    Dispatched::single(items)
}

/// Push `value` onto the wrapper stack under `key` on each wrapped node.
///
/// Inner wrappers are tagged first, so prepending leaves the stack ordered
/// outermost first. A lone object left by an editor counts as a one-entry stack.
fn tag_all(items: &mut [Content], key: &str, value: &Value) {
    for item in items {
        let Some(inner) = item.as_node_mut() else {
            continue;
        };
        let slot = inner.attrs.entry(key.to_string()).or_insert(Value::Null);
        let mut stack = match slot.take() {
            Value::Array(stack) => stack,
            single if single.is_object() => vec![single],
            _ => Vec::new(),
        };
        stack.insert(0, value.clone());
        *slot = Value::Array(stack);
    }
}

/// Entry `depth` of a wrapper stack, outermost first.
pub fn stacked(value: Option<&Value>, depth: usize) -> Option<&Value> {
    match value? {
        Value::Array(stack) => stack.get(depth),
        single if depth == 0 => Some(single),
        _ => None,
    }
    .filter(|entry| entry.is_object())
}

fn structured_content(session: &mut ImportSession<'_>, node: &XmlNode, level: Level) -> Dispatched {
    let mut items = node
        .child("w:sdtContent")
        .map(|content| encode_sequence(session, &content.elements, level))
        .unwrap_or_default();
    if items.is_empty() {
        return Dispatched::single(vec![preserve(node, level.passthrough_kind()).into()]);
    }

    let mut sdt = Attrs::new();
    if let Some(props) = node.child("w:sdtPr") {
        for (key, name) in [("id", "w:id"), ("tag", "w:tag"), ("alias", "w:alias")] {
            if let Some(val) = props.child_val(name) {
                sdt.insert(key.to_string(), Value::String(val.to_string()));
            }
        }
        if let Some(payload) = props
            .child_val("w:tag")
            .and_then(|tag| parse_payload(tag, session.config.limits.max_tag_payload_len))
        {
            sdt.insert("payload".to_string(), payload);
        }
        if let Ok(value) = serde_json::to_value(props) {
            sdt.insert("properties".to_string(), value);
        }
    }
    if let Some(end) = node.child("w:sdtEndPr")
        && let Ok(value) = serde_json::to_value(end)
    {
        sdt.insert("endProperties".to_string(), value);
    }

    tag_all(&mut items, SDT, &Value::Object(sdt));
    Dispatched::single(items)
}

/// Parse a JSON tag payload.
///
/// Tags that do not look like JSON carry no payload. Oversized or malformed
/// JSON yields an empty object.
pub fn parse_payload(raw: &str, max_len: usize) -> Option<Value> {
    let trimmed = raw.trim_start();
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return None;
    }
    if raw.len() > max_len {
        log::warn!("structured content payload of {} bytes exceeds {max_len}; ignored", raw.len());
        return Some(json!({}));
    }
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("malformed structured content payload: {err}");
            Some(json!({}))
        },
    }
}

/// Index of the alternative to translate: the first `mc:Choice` whose
/// requirements are all supported, else `mc:Fallback`.
pub fn choose_alternative(config: &EngineConfig, node: &XmlNode) -> Option<usize> {
    node.elements
        .iter()
        .position(|e| {
            e.name == "mc:Choice"
                && e.attr("Requires").is_some_and(|requires| {
                    let mut prefixes = requires.split_whitespace().peekable();
                    prefixes.peek().is_some() && prefixes.all(|p| config.supports_choice(p))
                })
        })
        .or_else(|| node.elements.iter().position(|e| e.name == "mc:Fallback"))
}

fn alternate_content(session: &mut ImportSession<'_>, node: &XmlNode, level: Level) -> Dispatched {
    let Some(index) = choose_alternative(session.config, node) else {
        return Dispatched::single(vec![preserve(node, level.passthrough_kind()).into()]);
    };
    let chosen = &node.elements[index];
    let mut items = encode_sequence(session, &chosen.elements, level);
    if items.is_empty() {
        return Dispatched::single(vec![preserve(node, level.passthrough_kind()).into()]);
    }
    log::debug!("alternate content: using {} {:?}", chosen.name, chosen.attr("Requires"));

    let alternatives: Vec<&XmlNode> = node
        .elements
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, e)| e)
        .collect();
    let meta = json!({
        "requires": chosen.attr("Requires"),
        "index": index,
        "element": chosen.name,
        "choiceAttributes": chosen.attributes,
        "attributes": node.attributes,
        "alternatives": alternatives,
    });
    tag_all(&mut items, ALTERNATE_CONTENT, &meta);
    Dispatched::single(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Limits;
    use crate::model::InternalNode;

    fn nodes(items: &[Content]) -> Vec<&InternalNode> {
        items.iter().filter_map(Content::as_node).collect()
    }

    fn parse(xml: &str) -> XmlNode {
        XmlNode::parse(xml).unwrap()
    }

    #[test]
    fn test_insert_wrapper_becomes_mark() {
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let p = parse(
            r#"<w:p><w:r><w:t>a</w:t></w:r><w:ins w:id="7" w:author="Ann" w:date="2024-01-01T00:00:00Z"><w:r><w:t>b</w:t></w:r><w:r><w:t>c</w:t></w:r></w:ins></w:p>"#,
        );
        let first = unwrap_at(&mut session, &p.elements, 0, Level::Inline);
        assert!(nodes(&first.items)[0].marks.is_empty());

        let wrapped = unwrap_at(&mut session, &p.elements, 1, Level::Inline);
        assert_eq!(wrapped.consumed, 1);
        let runs = nodes(&wrapped.items);
        assert_eq!(runs.len(), 2);
        for run in runs {
            let mark = run.mark(MarkKind::TrackInsert).unwrap();
            assert_eq!(mark.attr_str("author"), Some("Ann"));
            assert_eq!(mark.attr_str("id"), Some("7"));
        }
    }

    #[test]
    fn test_unknown_element_is_preserved() {
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let body = parse(r#"<w:body><w:customXml w:element="x"><w:p/></w:customXml></w:body>"#);
        let items = encode_blocks(&mut session, &body.elements);
        let node = nodes(&items)[0];
        assert_eq!(node.kind, NodeKind::PassthroughBlock);
        assert!(node.attr(super::super::passthrough::ORIGINAL_XML).is_some());
    }

    #[test]
    fn test_structured_content_payload() {
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let sdt = parse(
            r#"<w:sdt><w:sdtPr><w:id w:val="42"/><w:tag w:val="{&quot;kind&quot;:&quot;field&quot;}"/></w:sdtPr><w:sdtContent><w:r><w:t>x</w:t></w:r></w:sdtContent></w:sdt>"#,
        );
        let dispatched = unwrap_at(&mut session, std::slice::from_ref(&sdt), 0, Level::Inline);
        let run = nodes(&dispatched.items)[0];
        let meta = stacked(run.attr(SDT), 0).unwrap();
        assert_eq!(meta["id"], json!("42"));
        assert_eq!(meta["payload"], json!({"kind": "field"}));
    }

    #[test]
    fn test_nested_structured_content_stacks_outermost_first() {
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        let sdt = parse(
            r#"<w:sdt><w:sdtPr><w:id w:val="1"/></w:sdtPr><w:sdtContent><w:sdt><w:sdtPr><w:id w:val="2"/></w:sdtPr><w:sdtContent><w:p/></w:sdtContent></w:sdt></w:sdtContent></w:sdt>"#,
        );
        let dispatched = unwrap_at(&mut session, std::slice::from_ref(&sdt), 0, Level::Block);
        let paragraph = nodes(&dispatched.items)[0];
        let stack = paragraph.attr(SDT).and_then(Value::as_array).unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack[0]["id"], json!("1"));
        assert_eq!(stack[1]["id"], json!("2"));
        assert_eq!(stacked(paragraph.attr(SDT), 2), None);
    }

    #[test]
    fn test_editor_object_joins_stack_as_innermost() {
        let mut items = vec![Content::Node(InternalNode::new(NodeKind::Run).with_attr(SDT, json!({"id": "in"})))];
        tag_all(&mut items, SDT, &json!({"id": "out"}));
        let run = nodes(&items)[0];
        assert_eq!(run.attr(SDT), Some(&json!([{"id": "out"}, {"id": "in"}])));
        assert_eq!(stacked(Some(&json!({"id": "x"})), 0), Some(&json!({"id": "x"})));
        assert_eq!(stacked(Some(&json!({"id": "x"})), 1), None);
    }

    #[test]
    fn test_malformed_or_oversized_payload_is_empty_object() {
        assert_eq!(parse_payload("{not json", 100), Some(json!({})));
        assert_eq!(parse_payload(r#"{"a":1}"#, 3), Some(json!({})));
        assert_eq!(parse_payload("plain tag", 100), None);
    }

    #[test]
    fn test_alternate_content_picks_supported_choice() {
        let config = EngineConfig::default();
        let ac = parse(
            r#"<mc:AlternateContent><mc:Choice Requires="w16"><w:r><w:t>new</w:t></w:r></mc:Choice><mc:Choice Requires="wps"><w:r><w:t>shape</w:t></w:r></mc:Choice><mc:Fallback><w:r><w:t>old</w:t></w:r></mc:Fallback></mc:AlternateContent>"#,
        );
        assert_eq!(choose_alternative(&config, &ac), Some(1));
        assert_eq!(choose_alternative(&EngineConfig { supported_choice_requires: vec![], ..config.clone() }, &ac), Some(2));

        let mut session = ImportSession::new(&config);
        let dispatched = unwrap_at(&mut session, std::slice::from_ref(&ac), 0, Level::Inline);
        let run = nodes(&dispatched.items)[0];
        assert_eq!(run.text_content(), "shape");
        let meta = stacked(run.attr(ALTERNATE_CONTENT), 0).unwrap();
        assert_eq!(meta["requires"], json!("wps"));
        assert_eq!(meta["alternatives"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_oversized_attribute_yields_fallback() {
        let config = EngineConfig::new().with_limits(Limits {
            max_attribute_len: 8,
            ..Limits::default()
        });
        let mut session = ImportSession::new(&config);
        let body = parse(r#"<w:body><w:p w:rsidR="0123456789ABCDEF"><w:r><w:t>x</w:t></w:r></w:p><w:p><w:r><w:t>y</w:t></w:r></w:p></w:body>"#);
        let items = encode_blocks(&mut session, &body.elements);
        let paragraphs = nodes(&items);
        assert_eq!(paragraphs.len(), 2);
        assert!(paragraphs[0].content.is_empty());
        assert_eq!(paragraphs[1].text_content(), "y");

        let inline = unwrap_at(&mut session, &body.elements[0].elements, 0, Level::Inline);
        assert_eq!(inline.consumed, 1);
    }

    #[test]
    fn test_depth_guard_keeps_siblings() {
        let config = EngineConfig::new().with_limits(Limits {
            max_depth: 3,
            ..Limits::default()
        });
        let mut session = ImportSession::new(&config);
        let body = parse(
            r#"<w:body><w:p><w:ins><w:ins><w:ins><w:r><w:t>deep</w:t></w:r></w:ins></w:ins></w:ins></w:p><w:p><w:r><w:t>ok</w:t></w:r></w:p></w:body>"#,
        );
        let items = encode_blocks(&mut session, &body.elements);
        let paragraphs = nodes(&items);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].text_content(), "");
        assert_eq!(paragraphs[1].text_content(), "ok");
        assert_eq!(session.depth(), 0);
    }
}
