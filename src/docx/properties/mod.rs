//! Property-container translators built with the nested-properties combinator.

pub mod paragraph;
pub mod run;
pub mod table;

pub use paragraph::PARAGRAPH_PROPERTIES;
pub use run::RUN_PROPERTIES;
pub use table::{CELL_PROPERTIES, ROW_PROPERTIES, TABLE_PROPERTIES};
