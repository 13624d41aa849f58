//! A paged B-Tree storage engine for a didactic, SQLite-compatible
//! database file.
//!
//! The forest of B-Trees lives on top of a `Pager`, which is the only
//! component that touches the file. `btree::node` parses and mutates
//! pages; `btree::find`/`btree::insert`/`btree::split` are the logical
//! tree algorithms; `btree::cursor` is the ordered-traversal layer the
//! `Engine` hands out. Record serialization, SQL, and the bytecode VM
//! that would drive this engine through opcodes are external
//! collaborators this crate does not implement.

pub mod btree;
pub mod codec;
pub mod dbheader;
pub mod engine;
pub mod error;
pub mod pager;
