//! Internal document tree used by the editing surface.

pub mod mark;
pub mod node;

pub use mark::{Mark, MarkKind};
pub use node::{Attrs, Content, InternalNode, NodeKind, TextRun};
