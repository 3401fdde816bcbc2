/// Tables (`w:tbl`, `w:tr`, `w:tc`).
///
/// Import places every row on a uniform column grid (see [`grid`]): cells get
/// `colspan`, `rowspan` and `colwidth`, vertically merged continuation cells
/// are folded into the cell that starts the merge, and gaps declared with
/// `w:gridBefore`/`w:gridAfter` become placeholder cells. Export reverses all
/// three.
pub mod grid;

use self::grid::{GridCell, GridRow, PlaceholderReason, PlacedCell, TableGridState};
use super::properties::table::{CELL_PROPERTIES, ROW_PROPERTIES, TABLE_PROPERTIES, invisible_borders, keys};
use super::{keep_xml_attributes, store_element, store_elements, stored_element, stored_elements, xml_attributes};
use crate::common::xml::XmlNode;
use crate::dispatch::{self, Level};
use crate::docx::paragraph::empty_paragraph;
use crate::model::{Attrs, Content, InternalNode, NodeKind};
use crate::translator::attr::{format_int, parse_int};
use crate::translator::context::{ExportContext, ImportSession};
use crate::translator::nested::EXTRA_ELEMENTS;
use crate::translator::{Decodable, Decoded, Encoded, NodeTranslator, TranslatorKind, single};
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub const TABLE_PROPERTIES_KEY: &str = "tableProperties";
pub const ROW_PROPERTIES_KEY: &str = "rowProperties";
pub const CELL_PROPERTIES_KEY: &str = "cellProperties";
/// Declared grid column widths, in twentieths of a point
pub const GRID: &str = "grid";
pub const COLSPAN: &str = "colspan";
pub const ROWSPAN: &str = "rowspan";
pub const COLWIDTH: &str = "colwidth";
/// Reason a cell was synthesized for a grid gap
pub const PLACEHOLDER: &str = "placeholder";
pub const TABLE_PROPERTY_EXCEPTIONS: &str = "tablePropertyExceptions";
/// Continuation cells absorbed by a vertical merge, kept verbatim
pub const MERGED_CELLS: &str = "mergedCells";

pub static TABLE: NodeTranslator =
    NodeTranslator::custom("w:tbl", "table", TranslatorKind::Element, encode_table, decode_table);

pub static TABLE_ROW: NodeTranslator =
    NodeTranslator::custom("w:tr", "tableRow", TranslatorKind::Element, encode_row, decode_row);

pub static TABLE_CELL: NodeTranslator =
    NodeTranslator::custom("w:tc", "tableCell", TranslatorKind::Element, encode_cell, decode_cell);

fn object(value: Option<Value>) -> Attrs {
    match value {
        Some(Value::Object(map)) => map,
        _ => Attrs::new(),
    }
}

fn count(value: Option<&Value>) -> usize {
    value
        .and_then(Value::as_i64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(0)
}

/// Vertical merge state of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Merge {
    None,
    Restart,
    Continue,
}

/// One `w:tc` seen by the import pre-pass.
struct CellInfo<'a> {
    xml: &'a XmlNode,
    column: usize,
    span: usize,
    merge: Merge,
    row_span: usize,
    absorbed: bool,
    /// Continuation cells folded into this one, top to bottom
    merged: Vec<&'a XmlNode>,
}

/// One `w:tr` with its lifted row properties.
struct RowInfo<'a> {
    node: InternalNode,
    grid_before: usize,
    grid_after: usize,
    cells: Vec<CellInfo<'a>>,
}

fn cell_info(xml: &XmlNode, column: usize) -> CellInfo<'_> {
    let tc_pr = xml.child("w:tcPr");
    let span = tc_pr
        .and_then(|p| p.child_val("w:gridSpan"))
        .and_then(parse_int)
        .and_then(|s| usize::try_from(s).ok())
        .unwrap_or(1)
        .max(1);
    let merge = match tc_pr.and_then(|p| p.child("w:vMerge")) {
        None => Merge::None,
        Some(v) if v.attr("w:val") == Some("restart") => Merge::Restart,
        Some(_) => Merge::Continue,
    };
    CellInfo {
        xml,
        column,
        span,
        merge,
        row_span: 1,
        absorbed: false,
        merged: Vec::new(),
    }
}

/// Row node without cells, plus the row's grid gaps.
fn row_shell<'a>(session: &mut ImportSession<'_>, tr: &'a XmlNode) -> RowInfo<'a> {
    let mut row = InternalNode::new(NodeKind::TableRow);
    keep_xml_attributes(&mut row, tr);

    let mut props = object(tr.child("w:trPr").and_then(|p| ROW_PROPERTIES.encode_value(session, p)));
    let grid_before = count(props.remove(keys::GRID_BEFORE).as_ref());
    let grid_after = count(props.remove(keys::GRID_AFTER).as_ref());
    if !props.is_empty() {
        row.attrs.insert(ROW_PROPERTIES_KEY.to_string(), Value::Object(props));
    }
    if let Some(exceptions) = tr.child("w:tblPrEx") {
        store_element(&mut row, TABLE_PROPERTY_EXCEPTIONS, exceptions);
    }
    let extras: Vec<&XmlNode> = tr
        .elements
        .iter()
        .filter(|e| !matches!(e.name.as_str(), "w:trPr" | "w:tblPrEx" | "w:tc"))
        .collect();
    store_elements(&mut row, EXTRA_ELEMENTS, &extras);

    let mut column = grid_before;
    let cells = tr
        .children_named("w:tc")
        .map(|tc| {
            let info = cell_info(tc, column);
            column += info.span;
            info
        })
        .collect();
    RowInfo {
        node: row,
        grid_before,
        grid_after,
        cells,
    }
}

/// Fold every `continue` cell into the `restart` cell above it.
fn absorb_continuations(rows: &mut [RowInfo<'_>]) {
    for r in 0..rows.len() {
        for c in 0..rows[r].cells.len() {
            if rows[r].cells[c].merge != Merge::Restart {
                continue;
            }
            let column = rows[r].cells[c].column;
            let mut merged = Vec::new();
            for row in rows.iter_mut().skip(r + 1) {
                let Some(cell) = row
                    .cells
                    .iter_mut()
                    .find(|cell| cell.column == column && cell.merge == Merge::Continue && !cell.absorbed)
                else {
                    break;
                };
                cell.absorbed = true;
                merged.push(cell.xml);
            }
            let start = &mut rows[r].cells[c];
            start.row_span = merged.len() + 1;
            start.merged = merged;
        }
    }
    for (r, row) in rows.iter().enumerate() {
        for cell in row.cells.iter().filter(|c| c.merge == Merge::Continue && !c.absorbed) {
            log::debug!("row {r}: continuation cell at column {} has no start; kept as is", cell.column);
        }
    }
}

fn grid_widths(tbl: &XmlNode) -> Vec<i64> {
    tbl.child("w:tblGrid")
        .map(|grid| {
            grid.children_named("w:gridCol")
                .map(|col| col.attr("w:w").and_then(parse_int).unwrap_or(0))
                .collect()
        })
        .unwrap_or_default()
}

fn placeholder_cell(width: i64, reason: PlaceholderReason) -> InternalNode {
    let mut props = invisible_borders();
    props.insert(keys::WIDTH.to_string(), json!({"width": width, "type": "dxa"}));
    InternalNode::new(NodeKind::TableCell)
        .with_attr(PLACEHOLDER, reason.as_str())
        .with_attr(COLSPAN, 1)
        .with_attr(ROWSPAN, 1)
        .with_attr(COLWIDTH, json!([width]))
        .with_attr(CELL_PROPERTIES_KEY, Value::Object(props))
        .with_content(empty_paragraph())
}

/// Encode a cell one level deeper, or an empty cell past the depth guard.
fn nested_cell(session: &mut ImportSession<'_>, tc: &XmlNode) -> InternalNode {
    match session.descend(|s| TABLE_CELL.encode(s, tc)).flatten() {
        Some(Encoded::Node(cell)) => cell,
        _ => {
            log::warn!("table cell nests too deep; replaced by an empty cell");
            InternalNode::new(NodeKind::TableCell).with_content(empty_paragraph())
        },
    }
}

fn encode_table(_: &NodeTranslator, session: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    let mut table = InternalNode::new(NodeKind::Table);
    keep_xml_attributes(&mut table, node);
    if let Some(props) = node
        .child("w:tblPr")
        .and_then(|p| TABLE_PROPERTIES.encode_value(session, p))
    {
        table.attrs.insert(TABLE_PROPERTIES_KEY.to_string(), props);
    }
    let widths = grid_widths(node);
    if node.child("w:tblGrid").is_some() {
        table.attrs.insert(GRID.to_string(), json!(widths));
    }
    let extras: Vec<&XmlNode> = node
        .elements
        .iter()
        .filter(|e| !matches!(e.name.as_str(), "w:tblPr" | "w:tblGrid" | "w:tr"))
        .collect();
    store_elements(&mut table, EXTRA_ELEMENTS, &extras);

    let mut rows: Vec<RowInfo<'_>> = node
        .children_named("w:tr")
        .map(|tr| row_shell(session, tr))
        .collect();
    absorb_continuations(&mut rows);

    let extent = rows
        .iter()
        .map(|row| row.grid_before + row.cells.iter().map(|c| c.span).sum::<usize>() + row.grid_after)
        .max()
        .unwrap_or(0);
    let mut state = TableGridState::new(widths.len().max(extent), widths);

    for info in rows {
        let real: Vec<&CellInfo<'_>> = info.cells.iter().filter(|c| !c.absorbed).collect();
        let grid_row = GridRow {
            grid_before: info.grid_before,
            grid_after: info.grid_after,
            cells: real.iter().map(|c| GridCell::new(c.span, c.row_span)).collect(),
        };
        let mut row = info.node;
        for placed in state.place_row(&grid_row) {
            let cell = match placed {
                PlacedCell::Real {
                    index,
                    column,
                    col_span,
                    row_span,
                } => {
                    let source = real[index];
                    let mut cell = nested_cell(session, source.xml);
                    cell.attrs.insert(ROWSPAN.to_string(), json!(row_span));
                    cell.attrs.insert(COLWIDTH.to_string(), json!(state.widths(column, col_span)));
                    if row_span > 1 {
                        let emptied = cell
                            .attrs
                            .get_mut(CELL_PROPERTIES_KEY)
                            .and_then(Value::as_object_mut)
                            .is_some_and(|props| {
                                props.remove(keys::VERTICAL_MERGE);
                                props.is_empty()
                            });
                        if emptied {
                            cell.attrs.remove(CELL_PROPERTIES_KEY);
                        }
                        store_elements(&mut cell, MERGED_CELLS, &source.merged);
                    }
                    cell
                },
                PlacedCell::Placeholder { width, reason, .. } => {
                    log::debug!("placeholder cell ({reason}) of width {width}");
                    placeholder_cell(width, reason)
                },
            };
            row.content.push(Content::Node(cell));
        }
        table.content.push(Content::Node(row));
    }
    Some(Encoded::Node(table))
}

fn encode_row(_: &NodeTranslator, session: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    let info = row_shell(session, node);
    let mut row = info.node;
    for cell in &info.cells {
        let encoded = nested_cell(session, cell.xml);
        row.content.push(Content::Node(encoded));
    }
    Some(Encoded::Node(row))
}

fn encode_cell(_: &NodeTranslator, session: &mut ImportSession<'_>, node: &XmlNode) -> Option<Encoded> {
    let mut cell = InternalNode::new(NodeKind::TableCell);
    keep_xml_attributes(&mut cell, node);
    let mut props = object(node.child("w:tcPr").and_then(|p| CELL_PROPERTIES.encode_value(session, p)));
    let span = count(props.remove(keys::GRID_SPAN).as_ref()).max(1);
    cell.attrs.insert(COLSPAN.to_string(), json!(span));
    if !props.is_empty() {
        cell.attrs.insert(CELL_PROPERTIES_KEY.to_string(), Value::Object(props));
    }
    cell.content = dispatch::encode_children(session, node, Level::Block, "w:tcPr");
    Some(Encoded::Node(cell))
}

/// A vertical merge still open on export.
struct OpenMerge {
    remaining: usize,
    span: usize,
    width: Option<Value>,
    stored: std::vec::IntoIter<XmlNode>,
}

/// Columns covered by cells merged down from earlier rows, keyed by the
/// first covered column.
#[derive(Default)]
struct Continuations {
    open: BTreeMap<usize, OpenMerge>,
}

impl Continuations {
    /// Register a cell starting at `column` that spans `row_span` rows.
    fn open(&mut self, column: usize, cell: &InternalNode) {
        let row_span = count(cell.attr(ROWSPAN));
        if row_span < 2 {
            return;
        }
        let width = cell
            .attr_object(CELL_PROPERTIES_KEY)
            .and_then(|p| p.get(keys::WIDTH))
            .cloned();
        self.open.insert(
            column,
            OpenMerge {
                remaining: row_span - 1,
                span: span_of(cell),
                width,
                stored: stored_elements(cell, MERGED_CELLS).into_iter(),
            },
        );
    }

    /// Emit continuation cells at `column` and every column they lead into.
    fn emit_at(&mut self, ctx: &mut ExportContext<'_>, mut column: usize, out: &mut Vec<XmlNode>) -> usize {
        while let Some(merge) = self.open.get_mut(&column) {
            out.push(merge.next_cell(ctx));
            let span = merge.span;
            merge.remaining -= 1;
            if merge.remaining == 0 {
                self.open.remove(&column);
            }
            column += span;
        }
        column
    }

    /// Emit every continuation at or after `column`, in column order.
    fn emit_rest(&mut self, ctx: &mut ExportContext<'_>, column: usize, out: &mut Vec<XmlNode>) {
        let columns: Vec<usize> = self.open.range(column..).map(|(&c, _)| c).collect();
        for c in columns {
            self.emit_at(ctx, c, out);
        }
    }
}

impl OpenMerge {
    fn next_cell(&mut self, ctx: &mut ExportContext<'_>) -> XmlNode {
        if let Some(stored) = self.stored.next() {
            return stored;
        }
        let mut props = Attrs::new();
        if let Some(width) = &self.width {
            props.insert(keys::WIDTH.to_string(), width.clone());
        }
        if self.span > 1 {
            props.insert(keys::GRID_SPAN.to_string(), json!(self.span));
        }
        props.insert(keys::VERTICAL_MERGE.to_string(), json!("continue"));
        let mut tc = XmlNode::new("w:tc");
        tc.elements.extend(CELL_PROPERTIES.decode_value(ctx, &Value::Object(props)));
        tc.with_child(XmlNode::new("w:p"))
    }
}

fn span_of(cell: &InternalNode) -> usize {
    count(cell.attr(COLSPAN)).max(1)
}

fn placeholder_reason(cell: &InternalNode) -> Option<PlaceholderReason> {
    cell.attr_str(PLACEHOLDER).and_then(PlaceholderReason::from_str)
}

fn decode_table(_: &NodeTranslator, ctx: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    let Some(table) = input.node() else {
        return Decoded::new();
    };
    let mut element = XmlNode::new("w:tbl");
    element.attributes = xml_attributes(table);
    if let Some(props) = table
        .attr(TABLE_PROPERTIES_KEY)
        .and_then(|p| TABLE_PROPERTIES.decode_value(ctx, p))
    {
        element.elements.push(props);
    }
    element.elements.push(table_grid(table));

    let mut continuations = Continuations::default();
    for row in table.child_nodes() {
        element.elements.push(row_element(ctx, row, &mut continuations));
    }
    element.elements.extend(stored_elements(table, EXTRA_ELEMENTS));
    single(element)
}

/// `w:tblGrid` from the declared widths, else from the widest row's cell widths.
fn table_grid(table: &InternalNode) -> XmlNode {
    let declared: Option<Vec<i64>> = table
        .attr(GRID)
        .and_then(|g| serde_json::from_value(g.clone()).ok());
    let widths = declared.unwrap_or_else(|| {
        table
            .child_nodes()
            .map(|row| {
                row.child_nodes()
                    .flat_map(|cell| {
                        cell.attr(COLWIDTH)
                            .and_then(|w| serde_json::from_value::<Vec<i64>>(w.clone()).ok())
                            .unwrap_or_else(|| vec![0; span_of(cell)])
                    })
                    .collect::<Vec<_>>()
            })
            .max_by_key(Vec::len)
            .unwrap_or_default()
    });
    XmlNode::new("w:tblGrid").with_children(
        widths
            .into_iter()
            .map(|w| XmlNode::new("w:gridCol").with_attr("w:w", format_int(w))),
    )
}

fn row_element(ctx: &mut ExportContext<'_>, row: &InternalNode, continuations: &mut Continuations) -> XmlNode {
    let mut grid_before = 0usize;
    let mut grid_after = 0usize;
    let mut cells = Vec::new();
    let mut column = 0usize;

    for cell in row.child_nodes() {
        column = continuations.emit_at(ctx, column, &mut cells);
        match placeholder_reason(cell) {
            Some(PlaceholderReason::GridBefore) => grid_before += 1,
            Some(PlaceholderReason::GridAfter) => grid_after += 1,
            None => {
                continuations.open(column, cell);
                cells.extend(TABLE_CELL.decode(ctx, Decodable::Node(cell)));
                column += span_of(cell);
                continue;
            },
        }
        column += 1;
    }
    continuations.emit_rest(ctx, column, &mut cells);

    let mut props = row.attr_object(ROW_PROPERTIES_KEY).cloned().unwrap_or_default();
    if grid_before > 0 {
        props.insert(keys::GRID_BEFORE.to_string(), json!(grid_before));
    }
    if grid_after > 0 {
        props.insert(keys::GRID_AFTER.to_string(), json!(grid_after));
    }

    let mut element = XmlNode::new("w:tr");
    element.attributes = xml_attributes(row);
    element.elements.extend(stored_element(row, TABLE_PROPERTY_EXCEPTIONS));
    if !props.is_empty() {
        element
            .elements
            .extend(ROW_PROPERTIES.decode_value(ctx, &Value::Object(props)));
    }
    element.elements.extend(cells);
    element.elements.extend(stored_elements(row, EXTRA_ELEMENTS));
    element
}

fn decode_row(_: &NodeTranslator, ctx: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    match input.node() {
        Some(row) => single(row_element(ctx, row, &mut Continuations::default())),
        None => Decoded::new(),
    }
}

fn decode_cell(_: &NodeTranslator, ctx: &mut ExportContext<'_>, input: Decodable<'_>) -> Decoded {
    let Some(cell) = input.node() else {
        return Decoded::new();
    };
    let mut props = cell.attr_object(CELL_PROPERTIES_KEY).cloned().unwrap_or_default();
    let span = span_of(cell);
    if span > 1 {
        props.insert(keys::GRID_SPAN.to_string(), json!(span));
    }
    if count(cell.attr(ROWSPAN)) > 1 {
        props.insert(keys::VERTICAL_MERGE.to_string(), json!("restart"));
    }

    let mut element = XmlNode::new("w:tc");
    element.attributes = xml_attributes(cell);
    if !props.is_empty() {
        element
            .elements
            .extend(CELL_PROPERTIES.decode_value(ctx, &Value::Object(props)));
    }
    element
        .elements
        .extend(dispatch::decode_blocks_or_empty(ctx, &cell.content));
    single(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EngineConfig;

    const MERGED: &str = r#"<w:tbl>
        <w:tblPr><w:tblStyle w:val="Grid"/></w:tblPr>
        <w:tblGrid><w:gridCol w:w="1000"/><w:gridCol w:w="2000"/><w:gridCol w:w="3000"/></w:tblGrid>
        <w:tr>
            <w:tc><w:tcPr><w:tcW w:w="1000" w:type="dxa"/><w:vMerge w:val="restart"/></w:tcPr><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc>
            <w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p/></w:tc>
        </w:tr>
        <w:tr>
            <w:trPr><w:gridAfter w:val="1"/></w:trPr>
            <w:tc><w:tcPr><w:tcW w:w="1000" w:type="dxa"/><w:shd w:val="clear" w:fill="EEEEEE"/><w:vMerge/></w:tcPr><w:p/></w:tc>
            <w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc>
        </w:tr>
        <w:tr>
            <w:trPr><w:gridBefore w:val="1"/></w:trPr>
            <w:tc><w:p/></w:tc>
            <w:tc><w:p/></w:tc>
        </w:tr>
    </w:tbl>"#;

    fn import(xml: &str) -> InternalNode {
        let config = EngineConfig::default();
        let mut session = ImportSession::new(&config);
        match TABLE.encode(&mut session, &XmlNode::parse(xml).unwrap()) {
            Some(Encoded::Node(table)) => table,
            other => panic!("unexpected {other:?}"),
        }
    }

    fn rows(table: &InternalNode) -> Vec<Vec<&InternalNode>> {
        table.child_nodes().map(|row| row.child_nodes().collect()).collect()
    }

    #[test]
    fn test_import_places_cells_on_grid() {
        let table = import(MERGED);
        let rows = rows(&table);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0][0].attr_i64(ROWSPAN), Some(2));
        assert_eq!(rows[0][1].attr_i64(COLSPAN), Some(2));
        assert_eq!(rows[0][1].attr(COLWIDTH), Some(&json!([2000, 3000])));

        // The continuation cell is folded into the cell above.
        assert_eq!(rows[1].len(), 2);
        assert_eq!(rows[1][0].text_content(), "B");
        assert_eq!(rows[1][1].attr_str(PLACEHOLDER), Some("gridAfter"));
        assert_eq!(rows[1][1].attr(COLWIDTH), Some(&json!([3000])));

        assert_eq!(rows[2][0].attr_str(PLACEHOLDER), Some("gridBefore"));
        assert!(table.child_nodes().all(|row| row.attr(ROW_PROPERTIES_KEY).is_none()));
    }

    #[test]
    fn test_round_trip_restores_merges_and_gaps() {
        let source = XmlNode::parse(MERGED).unwrap();
        let table = import(MERGED);
        let config = EngineConfig::default();
        let mut ctx = ExportContext::new(&config);
        let out = TABLE.decode(&mut ctx, Decodable::Node(&table)).into_vec();
        assert_eq!(out, vec![source]);
    }

    #[test]
    fn test_synthesized_continuation_cells() {
        let mut table = import(MERGED);
        // Drop the stored continuation so export has to build one.
        let first = table.content[0].as_node_mut().unwrap().content[0].as_node_mut().unwrap();
        first.attrs.remove(MERGED_CELLS);

        let config = EngineConfig::default();
        let mut ctx = ExportContext::new(&config);
        let out = TABLE.decode(&mut ctx, Decodable::Node(&table)).into_vec();
        let second_row = out[0].children_named("w:tr").nth(1).unwrap();
        let continuation = second_row.child("w:tc").unwrap();
        let tc_pr = continuation.child("w:tcPr").unwrap();
        assert_eq!(tc_pr.child("w:tcW").and_then(|w| w.attr("w:w")), Some("1000"));
        assert!(tc_pr.child("w:vMerge").is_some_and(|v| v.attr("w:val").is_none()));
        assert_eq!(continuation.child("w:p"), Some(&XmlNode::new("w:p")));
    }

    #[test]
    fn test_ragged_rows_grow_the_grid() {
        let table = import(
            r#"<w:tbl><w:tblGrid><w:gridCol w:w="500"/></w:tblGrid>
            <w:tr><w:tc><w:p/></w:tc><w:tc><w:p/></w:tc></w:tr>
            <w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>"#,
        );
        let rows = rows(&table);
        assert_eq!(rows[0][1].attr(COLWIDTH), Some(&json!([0])));
        assert_eq!(rows[1].len(), 2);
        assert_eq!(rows[1][1].attr_str(PLACEHOLDER), Some("gridAfter"));
    }

    #[test]
    fn test_orphan_continuation_is_kept() {
        let source = r#"<w:tbl><w:tblGrid><w:gridCol w:w="900"/></w:tblGrid><w:tr><w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc></w:tr></w:tbl>"#;
        let table = import(source);
        let cell = rows(&table)[0][0];
        assert_eq!(cell.attr_i64(ROWSPAN), Some(1));
        assert_eq!(
            cell.attr_object(CELL_PROPERTIES_KEY).and_then(|p| p.get(keys::VERTICAL_MERGE)),
            Some(&json!("continue"))
        );

        let config = EngineConfig::default();
        let mut ctx = ExportContext::new(&config);
        let out = TABLE.decode(&mut ctx, Decodable::Node(&table)).into_vec();
        assert_eq!(out, vec![XmlNode::parse(source).unwrap()]);
    }
}
