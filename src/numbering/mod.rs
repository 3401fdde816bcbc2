//! List numbering: the numbering part model, resolution of `(numId, ilvl)`
//! references, label rendering and paragraph indent layering.

pub mod definitions;
pub mod indent;
pub mod label;
pub mod resolver;

pub use definitions::{
    AbstractNumberingDefinition, LevelDefinition, LevelFormat, LevelOverride, NUMBERING_ROOT,
    NumberingDefinitions, NumberingInstance,
};
pub use indent::{Indent, resolve_indent};
pub use label::{ListCounters, format_label, format_level_number, format_number, render_level_label};
pub use resolver::{LevelTable, NotAList, NumberingCache, Resolution, ResolvedLevel, choose_abstract};
