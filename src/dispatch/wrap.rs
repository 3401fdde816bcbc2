/// Export-side regrouping of wrapper metadata.
///
/// The inverse of [`unwrap`](super::unwrap): consecutive siblings that share a
/// wrapper mark or attribute are written inside one wrapper element. Layers
/// nest outermost first: structured content, hyperlink, insertion, removal,
/// alternate content. Structured content and alternate content carry a stack
/// of entries and are rebuilt one wrapper per entry.
use super::unwrap::{ALTERNATE_CONTENT, LINK_ATTRS, Level, SDT, TRACK_ATTRS, stacked};
use crate::common::xml::{XmlAttrs, XmlNode};
use crate::docx::{paragraph, run};
use crate::model::{Content, InternalNode, Mark, MarkKind};
use crate::translator::attr::decode_all;
use crate::translator::context::ExportContext;
use crate::translator::{Decodable, translator_for};
use serde_json::Value;

/// Wrapper layers, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    StructuredContent,
    Link,
    Insertion,
    Removal,
    AlternateContent,
}

const LAYERS: [Layer; 5] = [
    Layer::StructuredContent,
    Layer::Link,
    Layer::Insertion,
    Layer::Removal,
    Layer::AlternateContent,
];

/// What groups siblings under one wrapper.
#[derive(Debug, Clone, Copy, PartialEq)]
enum WrapKey<'a> {
    Mark(&'a Mark),
    Meta(&'a Value),
}

impl Layer {
    fn stacks(self) -> bool {
        matches!(self, Layer::StructuredContent | Layer::AlternateContent)
    }

    /// Grouping key of `item` at stack position `nesting`.
    fn key(self, item: &Content, nesting: usize) -> Option<WrapKey<'_>> {
        let node = item.as_node()?;
        let mark = |kinds: &[MarkKind]| {
            (nesting == 0)
                .then(|| node.marks.iter().find(|m| kinds.contains(&m.kind)))
                .flatten()
                .map(WrapKey::Mark)
        };
        match self {
            Layer::StructuredContent => stacked(node.attr(SDT), nesting).map(WrapKey::Meta),
            Layer::Link => mark(&[MarkKind::Link]),
            Layer::Insertion => mark(&[MarkKind::TrackInsert, MarkKind::TrackMoveTo]),
            Layer::Removal => mark(&[MarkKind::TrackDelete, MarkKind::TrackMoveFrom]),
            Layer::AlternateContent => stacked(node.attr(ALTERNATE_CONTENT), nesting).map(WrapKey::Meta),
        }
    }

    fn wrap(self, key: WrapKey<'_>, inner: Vec<XmlNode>) -> XmlNode {
        match (self, key) {
            (Layer::StructuredContent, WrapKey::Meta(meta)) => structured_content(meta, inner),
            (Layer::AlternateContent, WrapKey::Meta(meta)) => alternate_content(meta, inner),
            (Layer::Link, WrapKey::Mark(mark)) => XmlNode {
                name: "w:hyperlink".to_string(),
                attributes: decode_all(LINK_ATTRS, &mark.attrs),
                elements: inner,
                text: None,
            },
            (_, WrapKey::Mark(mark)) => XmlNode {
                name: track_element(mark.kind).to_string(),
                attributes: decode_all(TRACK_ATTRS, &mark.attrs),
                elements: inner,
                text: None,
            },
            (_, WrapKey::Meta(_)) => XmlNode::new("w:sdt").with_children(inner),
        }
    }
}

fn track_element(kind: MarkKind) -> &'static str {
    match kind {
        MarkKind::TrackDelete => "w:del",
        MarkKind::TrackMoveFrom => "w:moveFrom",
        MarkKind::TrackMoveTo => "w:moveTo",
        _ => "w:ins",
    }
}

/// Decode a content list into XML siblings.
pub fn decode_sequence(ctx: &mut ExportContext<'_>, content: &[Content], level: Level) -> Vec<XmlNode> {
    decode_layer(ctx, content, 0, 0, level)
}

#[inline]
pub fn decode_blocks(ctx: &mut ExportContext<'_>, content: &[Content]) -> Vec<XmlNode> {
    decode_sequence(ctx, content, Level::Block)
}

#[inline]
pub fn decode_inline(ctx: &mut ExportContext<'_>, content: &[Content]) -> Vec<XmlNode> {
    decode_sequence(ctx, content, Level::Inline)
}

/// Decode `content` from layer `depth` inward. `nesting` is the stack
/// position reached within a stacking layer.
fn decode_layer(
    ctx: &mut ExportContext<'_>,
    content: &[Content],
    depth: usize,
    nesting: usize,
    level: Level,
) -> Vec<XmlNode> {
    let Some(&layer) = LAYERS.get(depth) else {
        return content.iter().flat_map(|item| decode_item(ctx, item, level)).collect();
    };
    let mut out = Vec::with_capacity(content.len());
    for group in content.chunk_by(|a, b| layer.key(a, nesting) == layer.key(b, nesting)) {
        let key = group.first().and_then(|first| layer.key(first, nesting));
        let inner = match key {
            Some(_) if layer.stacks() => decode_layer(ctx, group, depth, nesting + 1, level),
            Some(_) if layer == Layer::Removal => ctx.removing(|ctx| decode_layer(ctx, group, depth + 1, 0, level)),
            _ => decode_layer(ctx, group, depth + 1, 0, level),
        };
        match key {
            Some(key) if !inner.is_empty() => out.push(layer.wrap(key, inner)),
            _ => out.extend(inner),
        }
    }
    out
}

fn decode_item(ctx: &mut ExportContext<'_>, item: &Content, level: Level) -> Vec<XmlNode> {
    match item {
        Content::Text(text) => {
            let removed = ctx.in_removal();
            let synthesized = XmlNode::new("w:r").with_child(run::text_element(&text.text, removed));
            match level {
                Level::Inline => vec![synthesized],
                Level::Block => vec![XmlNode::new("w:p").with_child(synthesized)],
            }
        },
        Content::Node(node) => decode_node(ctx, node),
    }
}

/// Decode one node with its registered translator.
pub fn decode_node(ctx: &mut ExportContext<'_>, node: &InternalNode) -> Vec<XmlNode> {
    let translator = translator_for(node.kind);
    match ctx.descend(|ctx| translator.decode(ctx, Decodable::Node(node))) {
        Some(decoded) => decoded.into_vec(),
        None => {
            log::warn!("{} nests deeper than {}; dropped on export", node.kind, ctx.config.limits.max_depth);
            Vec::new()
        },
    }
}

fn structured_content(meta: &Value, inner: Vec<XmlNode>) -> XmlNode {
    let field = |key: &str| meta.get(key).and_then(Value::as_str);
    let props = meta
        .get("properties")
        .and_then(|v| serde_json::from_value::<XmlNode>(v.clone()).ok())
        .unwrap_or_else(|| {
            let mut props = XmlNode::new("w:sdtPr");
            if let Some(alias) = field("alias") {
                props.elements.push(XmlNode::new("w:alias").with_attr("w:val", alias));
            }
            let tag = field("tag")
                .map(str::to_string)
                .or_else(|| meta.get("payload").map(Value::to_string));
            if let Some(tag) = tag {
                props.elements.push(XmlNode::new("w:tag").with_attr("w:val", tag));
            }
            if let Some(id) = field("id") {
                props.elements.push(XmlNode::new("w:id").with_attr("w:val", id));
            }
            props
        });

    let mut sdt = XmlNode::new("w:sdt").with_child(props);
    if let Some(end) = meta
        .get("endProperties")
        .and_then(|v| serde_json::from_value::<XmlNode>(v.clone()).ok())
    {
        sdt.elements.push(end);
    }
    sdt.with_child(XmlNode::new("w:sdtContent").with_children(inner))
}

fn alternate_content(meta: &Value, inner: Vec<XmlNode>) -> XmlNode {
    let attrs = |key: &str| -> XmlAttrs {
        meta.get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    };
    let mut alternatives: Vec<XmlNode> = meta
        .get("alternatives")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();
    let chosen = XmlNode {
        name: meta
            .get("element")
            .and_then(Value::as_str)
            .unwrap_or("mc:Choice")
            .to_string(),
        attributes: attrs("choiceAttributes"),
        elements: inner,
        text: None,
    };
    let index = meta
        .get("index")
        .and_then(Value::as_u64)
        .map_or(0, |i| i as usize)
        .min(alternatives.len());
    alternatives.insert(index, chosen);

    XmlNode {
        name: "mc:AlternateContent".to_string(),
        attributes: attrs("attributes"),
        elements: alternatives,
        text: None,
    }
}

/// Blocks of a cell or body, never empty: a lone empty paragraph stands in.
pub fn decode_blocks_or_empty(ctx: &mut ExportContext<'_>, content: &[Content]) -> Vec<XmlNode> {
    let mut blocks = decode_blocks(ctx, content);
    if blocks.is_empty() {
        blocks.push(paragraph::empty_paragraph_xml());
    }
    blocks
}
