//! The engine API a bytecode-style virtual machine (opcode layer) drives
//! the storage core through. Owns the `Pager` and dispatches to
//! `find`/`insert`/`Cursor`, none of which know anything about the VM,
//! records, or SQL.

use crate::btree::cell::Cell;
use crate::btree::cursor::Cursor;
use crate::btree::node::{Node, NodeType};
use crate::btree::{find, insert, Key};
use crate::error::Result;
use crate::pager::{PageNum, Pager, PagerConfig};

/// An open database file, exposing the operations a virtual machine
/// needs to drive the storage core: open/close, point lookup and
/// insertion, and cursor construction.
pub struct Engine {
    pager: Pager,
}

impl Engine {
    /// Opens `path`, creating it with a fresh header and an empty
    /// table-leaf root at page 1 if it doesn't already exist.
    pub fn open(path: &str, config: PagerConfig) -> Result<Engine> {
        Ok(Engine {
            pager: Pager::open(path, config)?,
        })
    }

    /// Flushes and releases the underlying file handle.
    pub fn close(mut self) -> Result<()> {
        self.pager.close()?;
        Ok(())
    }

    /// Looks up `key` in the table tree rooted at `nroot`.
    pub fn find(&mut self, nroot: PageNum, key: Key) -> Result<Vec<u8>> {
        find::find(&mut self.pager, nroot, key)
    }

    /// Looks up `key_idx` in the index tree rooted at `nroot`, returning
    /// the matching `key_pk`.
    pub fn find_in_index(&mut self, nroot: PageNum, key_idx: u32) -> Result<u32> {
        find::find_index(&mut self.pager, nroot, key_idx)
    }

    /// Inserts a `(key, data)` row into the table tree rooted at `nroot`.
    pub fn insert_in_table(&mut self, nroot: PageNum, key: Key, data: Vec<u8>) -> Result<()> {
        insert::insert(&mut self.pager, nroot, Cell::TableLeaf { key, data })
    }

    /// Inserts an index entry `(key_idx, key_pk)` into the index tree
    /// rooted at `nroot`.
    pub fn insert_in_index(&mut self, nroot: PageNum, key_idx: u32, key_pk: u32) -> Result<()> {
        insert::insert(&mut self.pager, nroot, Cell::IndexLeaf { key_idx, key_pk })
    }

    /// Allocates and initializes a fresh, empty tree, returning its root
    /// page number. Tracking that root in a schema table is a
    /// higher-level concern this crate leaves to its caller; this is
    /// just the `Pager::allocate_page` + `Node::create_empty` plumbing
    /// exposed as a convenience.
    pub fn create_tree(&mut self, node_type: NodeType) -> Result<PageNum> {
        let page = self.pager.allocate_page()?;
        let mut node = Node::create_empty(page, node_type);
        node.write(&mut self.pager)?;
        Ok(node.npage)
    }

    /// A fresh cursor over the tree rooted at `nroot`. Call `rewind` or
    /// `seek`/`seek_cmp` to position it before reading.
    pub fn new_cursor(&self, nroot: PageNum) -> Cursor {
        Cursor::new(nroot)
    }

    pub fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }
}
