//! Key-ordered descent to locate an entry: `find` for table trees (the
//! engine-API operation named in spec §6, whose contract is ENOTFOUND on
//! an index root -- spec §4.3 specifies `find` only for table trees), and
//! `find_index` for index trees (the supplemented symmetric lookup from
//! SPEC_FULL.md §B, exposed as its own operation rather than folded into
//! `find`'s data-returning contract, since index cells carry no payload).

use crate::btree::cell::CellRef;
use crate::btree::node::{Node, NodeType};
use crate::btree::Key;
use crate::error::{Error, Result};
use crate::pager::{PageNum, Pager};

/// Looks up `key` in the table tree rooted at `nroot`, returning the
/// cell's payload bytes. `ENOTFOUND` if absent, or if `nroot` roots an
/// index tree rather than a table tree.
pub fn find(pager: &mut Pager, nroot: PageNum, key: Key) -> Result<Vec<u8>> {
    let mut npage = nroot;
    loop {
        let node = Node::load(pager, npage)?;
        match node.node_type {
            NodeType::TableInternal => {
                npage = descend(&node, key)?;
            }
            NodeType::TableLeaf => {
                for i in 0..node.n_cells {
                    let cell = node.get_cell(i)?;
                    if cell.key() == key {
                        return match cell {
                            CellRef::TableLeaf { data, .. } => Ok(data.to_vec()),
                            _ => unreachable!("table leaf only yields TableLeaf cells"),
                        };
                    }
                }
                return Err(Error::NotFound);
            }
            NodeType::IndexInternal | NodeType::IndexLeaf => {
                return Err(Error::NotFound);
            }
        }
    }
}

/// Picks the child to descend into on a table-internal node: the first
/// cell whose key is `>= key`, or `right_page` if none qualifies.
pub(crate) fn descend(node: &Node, key: Key) -> Result<PageNum> {
    for i in 0..node.n_cells {
        let cell = node.get_cell(i)?;
        if key <= cell.key() {
            return Ok(cell
                .child_page()
                .expect("table-internal cell always carries a child page"));
        }
    }
    Ok(node.right_page)
}

/// Looks up the first entry with `key_idx == key_idx` in the index tree
/// rooted at `nroot`, returning its `key_pk`. `ENOTFOUND` if absent, or if
/// `nroot` roots a table tree rather than an index tree. Entries are
/// ordered `(key_idx, key_pk)`, so a non-unique `key_idx` resolves to the
/// entry with the smallest `key_pk`.
pub fn find_index(pager: &mut Pager, nroot: PageNum, key_idx: Key) -> Result<u32> {
    let mut npage = nroot;
    loop {
        let node = Node::load(pager, npage)?;
        match node.node_type {
            NodeType::IndexInternal => {
                npage = descend_index(&node, key_idx)?;
            }
            NodeType::IndexLeaf => {
                for i in 0..node.n_cells {
                    let cell = node.get_cell(i)?;
                    if cell.index_order_key().0 == key_idx {
                        return match cell {
                            CellRef::IndexLeaf { key_pk, .. } => Ok(key_pk),
                            _ => unreachable!("index leaf only yields IndexLeaf cells"),
                        };
                    }
                }
                return Err(Error::NotFound);
            }
            NodeType::TableInternal | NodeType::TableLeaf => {
                return Err(Error::NotFound);
            }
        }
    }
}

/// Picks the child to descend into on an index-internal node: the first
/// cell whose `(key_idx, key_pk)` is `>= (key_idx, 0)`, or `right_page` if
/// none qualifies. Comparing against `key_pk == 0` routes to the subtree
/// holding the smallest-`key_pk` entry for a repeated `key_idx`.
pub(crate) fn descend_index(node: &Node, key_idx: Key) -> Result<PageNum> {
    let target = (key_idx, 0);
    for i in 0..node.n_cells {
        let cell = node.get_cell(i)?;
        if target <= cell.order_key() {
            return Ok(cell
                .child_page()
                .expect("index-internal cell always carries a child page"));
        }
    }
    Ok(node.right_page)
}
