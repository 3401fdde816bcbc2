//! Dispatch/unwrap layer.
//!
//! Import walks sibling lists and unwraps wrapper constructs onto the nodes
//! they contain; export regroups those nodes under rebuilt wrappers.

pub mod passthrough;
pub mod unwrap;
pub mod wrap;

pub use passthrough::{ORIGINAL_XML, PASSTHROUGH_BLOCK, PASSTHROUGH_INLINE};
pub use unwrap::{
    ALTERNATE_CONTENT, Dispatched, Level, SDT, encode_blocks, encode_children, encode_inline,
    encode_sequence, unwrap_at,
};
pub use wrap::{decode_blocks, decode_blocks_or_empty, decode_inline, decode_node, decode_sequence};
