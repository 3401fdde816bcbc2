/// Table grid reconciliation.
///
/// Rows in WordprocessingML may start late (`w:gridBefore`), end early
/// (`w:gridAfter`) or be partly covered by cells merged down from earlier rows.
/// [`TableGridState`] walks the rows of one table in order and places every
/// cell on a uniform column grid, filling the gaps with placeholder cells so
/// that each row accounts for exactly `total_columns` columns.
use std::fmt;

/// Why a placeholder cell exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderReason {
    /// Column skipped before the first real cell
    GridBefore,
    /// Column left empty after the last real cell
    GridAfter,
}

impl PlaceholderReason {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GridBefore => "gridBefore",
            Self::GridAfter => "gridAfter",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "gridBefore" => Some(Self::GridBefore),
            "gridAfter" => Some(Self::GridAfter),
            _ => None,
        }
    }
}

impl fmt::Display for PlaceholderReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Span declaration of one real cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub col_span: usize,
    pub row_span: usize,
}

impl GridCell {
    #[inline]
    pub fn new(col_span: usize, row_span: usize) -> Self {
        Self {
            col_span: col_span.max(1),
            row_span: row_span.max(1),
        }
    }
}

/// Gaps and real cells of one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridRow {
    pub grid_before: usize,
    pub grid_after: usize,
    pub cells: Vec<GridCell>,
}

/// One emitted cell of a reconciled row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacedCell {
    Real {
        /// Index into [`GridRow::cells`]
        index: usize,
        column: usize,
        col_span: usize,
        row_span: usize,
    },
    Placeholder {
        column: usize,
        width: i64,
        reason: PlaceholderReason,
    },
}

/// Reconciliation state of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableGridState {
    pub total_columns: usize,
    pub column_widths: Vec<i64>,
    /// Rows still covered per column by a cell merged down from above
    pub pending_row_spans: Vec<usize>,
}

impl TableGridState {
    /// Start a table with `total_columns` columns; missing widths count as 0.
    pub fn new(total_columns: usize, mut column_widths: Vec<i64>) -> Self {
        let total_columns = total_columns.max(column_widths.len());
        column_widths.resize(total_columns, 0);
        Self {
            total_columns,
            column_widths,
            pending_row_spans: vec![0; total_columns],
        }
    }

    /// Width of a grid column, 0 past the declared grid.
    #[inline]
    pub fn width(&self, column: usize) -> i64 {
        self.column_widths.get(column).copied().unwrap_or(0)
    }

    /// Widths of `span` columns starting at `column`.
    pub fn widths(&self, column: usize, span: usize) -> Vec<i64> {
        (column..column + span).map(|c| self.width(c)).collect()
    }

    fn grow(&mut self, columns: usize) {
        if columns > self.total_columns {
            log::debug!("table grid grows from {} to {columns} columns", self.total_columns);
            self.total_columns = columns;
            self.column_widths.resize(columns, 0);
            self.pending_row_spans.resize(columns, 0);
        }
    }

    /// Place one row on the grid.
    ///
    /// Columns still covered by a vertical merge are skipped; gaps before the
    /// first real cell and every uncovered column after the last one become
    /// placeholders.
    pub fn place_row(&mut self, row: &GridRow) -> Vec<PlacedCell> {
        let mut covered: Vec<bool> = self.pending_row_spans.iter().map(|&p| p > 0).collect();
        for pending in &mut self.pending_row_spans {
            *pending = pending.saturating_sub(1);
        }
        let is_covered = |covered: &[bool], column: usize| covered.get(column).copied().unwrap_or(false);

        let mut placed = Vec::with_capacity(row.cells.len() + row.grid_before + row.grid_after);
        let mut column = 0;

        for _ in 0..row.grid_before {
            while is_covered(&covered, column) {
                column += 1;
            }
            self.grow(column + 1);
            placed.push(PlacedCell::Placeholder {
                column,
                width: self.width(column),
                reason: PlaceholderReason::GridBefore,
            });
            column += 1;
        }

        for (index, cell) in row.cells.iter().enumerate() {
            while is_covered(&covered, column) {
                column += 1;
            }
            self.grow(column + cell.col_span);
            for c in column..column + cell.col_span {
                self.pending_row_spans[c] = cell.row_span - 1;
            }
            placed.push(PlacedCell::Real {
                index,
                column,
                col_span: cell.col_span,
                row_span: cell.row_span,
            });
            column += cell.col_span;
        }

        covered.resize(self.total_columns, false);
        let mut trailing = 0;
        for c in column..self.total_columns {
            if !covered[c] {
                placed.push(PlacedCell::Placeholder {
                    column: c,
                    width: self.width(c),
                    reason: PlaceholderReason::GridAfter,
                });
                trailing += 1;
            }
        }
        if trailing != row.grid_after {
            log::debug!(
                "row declares gridAfter {} but {trailing} trailing columns are empty",
                row.grid_after
            );
        }
        placed
    }
}
