//! B-Tree node/cell manipulation and the logical find/insert/split
//! algorithms that preserve ordering and balance.
//!
//! Organization, leaves-first:
//! * `cell` -- the four on-disk cell layouts and their encode/decode.
//! * `node` -- a parsed, mutable view over a page (`Node`) plus
//!   `get_cell`/`insert_cell`.
//! * `find` -- key-ordered descent to locate a table-tree entry.
//! * `split` -- the split primitive, exposed standalone for tests.
//! * `insert` -- descend + split-and-propagate + root promotion.
//! * `cursor` -- ordered traversal over a root-to-leaf path stack.

pub mod cell;
pub mod cursor;
pub mod find;
pub mod header;
pub mod insert;
pub mod node;
pub mod split;

/// Keys throughout the engine are 32-bit.
pub type Key = u32;
