//! Ordered traversal over a tree's root-to-leaf path.
//!
//! A `Cursor` holds a stack of `(Node, index)` frames, root first, leaf
//! last. Internal frames record which child was most recently descended
//! into (`index < n_cells` for a cell's child, `index == n_cells` for
//! `right_page`); the leaf frame's index is the current cell. No
//! back-pointers are stored anywhere -- popping frames off the stack is
//! the whole of "returning to the parent".

use crate::btree::cell::CellRef;
use crate::btree::node::Node;
use crate::btree::Key;
use crate::error::{Error, Result};
use crate::pager::{PageNum, Pager};

struct Frame {
    node: Node,
    index: u16,
}

pub struct Cursor {
    root: PageNum,
    path: Vec<Frame>,
}

/// Range-predicate variants for `seek_cmp`, backing `SeekGt`/`SeekGe`/
/// `SeekLt`/`SeekLe`-style range positioning alongside exact-match `seek`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Gt,
    Ge,
    Lt,
    Le,
}

impl Cursor {
    pub fn new(root: PageNum) -> Cursor {
        Cursor {
            root,
            path: Vec::new(),
        }
    }

    /// Descends leftmost from `npage`, pushing a frame at every level.
    fn descend_leftmost(&mut self, pager: &mut Pager, mut npage: PageNum) -> Result<()> {
        loop {
            let node = Node::load(pager, npage)?;
            if node.node_type.is_internal() {
                let child = if node.n_cells > 0 {
                    node.get_cell(0)?
                        .child_page()
                        .expect("internal cell carries a child page")
                } else {
                    node.right_page
                };
                self.path.push(Frame { node, index: 0 });
                npage = child;
            } else {
                self.path.push(Frame { node, index: 0 });
                return Ok(());
            }
        }
    }

    /// Descends rightmost from `npage` (via `right_page` at every
    /// internal level), positioning the leaf frame on its last cell.
    fn descend_rightmost(&mut self, pager: &mut Pager, mut npage: PageNum) -> Result<()> {
        loop {
            let node = Node::load(pager, npage)?;
            if node.node_type.is_internal() {
                let child = node.right_page;
                let index = node.n_cells;
                self.path.push(Frame { node, index });
                npage = child;
            } else {
                let index = node.n_cells.saturating_sub(1);
                self.path.push(Frame { node, index });
                return Ok(());
            }
        }
    }

    /// Descends leftmost from the root. `false` if the root is an empty
    /// leaf (empty tree).
    pub fn rewind(&mut self, pager: &mut Pager) -> Result<bool> {
        self.path.clear();
        self.descend_leftmost(pager, self.root)?;
        Ok(self.path.last().map(|f| f.node.n_cells > 0).unwrap_or(false))
    }

    fn seed_last(&mut self, pager: &mut Pager) -> Result<bool> {
        self.path.clear();
        self.descend_rightmost(pager, self.root)?;
        Ok(self.path.last().map(|f| f.node.n_cells > 0).unwrap_or(false))
    }

    /// Pops the exhausted leaf frame and climbs until an ancestor has a
    /// further child to descend into, then descends leftmost into it.
    /// `false` once popping reaches the root with nothing left.
    fn climb_and_descend_next(&mut self, pager: &mut Pager) -> Result<bool> {
        self.path.pop();
        while let Some(top) = self.path.last_mut() {
            if top.index < top.node.n_cells {
                top.index += 1;
                let npage = if top.index < top.node.n_cells {
                    top.node
                        .get_cell(top.index)?
                        .child_page()
                        .expect("internal cell carries a child page")
                } else {
                    top.node.right_page
                };
                self.descend_leftmost(pager, npage)?;
                return Ok(true);
            }
            self.path.pop();
        }
        Ok(false)
    }

    /// Symmetric to [`Self::climb_and_descend_next`].
    fn climb_and_descend_prev(&mut self, pager: &mut Pager) -> Result<bool> {
        self.path.pop();
        while let Some(top) = self.path.last_mut() {
            if top.index > 0 {
                top.index -= 1;
                let npage = top
                    .node
                    .get_cell(top.index)?
                    .child_page()
                    .expect("internal cell carries a child page");
                self.descend_rightmost(pager, npage)?;
                return Ok(true);
            }
            self.path.pop();
        }
        Ok(false)
    }

    /// Advances to the next cell in key order. `false` once the
    /// traversal is exhausted.
    pub fn next(&mut self, pager: &mut Pager) -> Result<bool> {
        if self.path.is_empty() {
            return self.rewind(pager);
        }
        {
            let top = self.path.last_mut().expect("checked non-empty above");
            if top.index + 1 < top.node.n_cells {
                top.index += 1;
                return Ok(true);
            }
        }
        self.climb_and_descend_next(pager)
    }

    /// Retreats to the previous cell in key order.
    pub fn prev(&mut self, pager: &mut Pager) -> Result<bool> {
        if self.path.is_empty() {
            return self.seed_last(pager);
        }
        {
            let top = self.path.last_mut().expect("checked non-empty above");
            if top.index > 0 {
                top.index -= 1;
                return Ok(true);
            }
        }
        self.climb_and_descend_prev(pager)
    }

    /// Key-ordered descent identical to `find`, positioning the leaf
    /// frame's index at the first cell with `order_key >= target`.
    fn descend_for_seek(&mut self, pager: &mut Pager, target: (u32, u32)) -> Result<()> {
        self.path.clear();
        let mut npage = self.root;
        loop {
            let node = Node::load(pager, npage)?;
            if node.node_type.is_internal() {
                let mut chosen = node.n_cells;
                for i in 0..node.n_cells {
                    if target <= node.get_cell(i)?.order_key() {
                        chosen = i;
                        break;
                    }
                }
                let child = if chosen < node.n_cells {
                    node.get_cell(chosen)?
                        .child_page()
                        .expect("internal cell carries a child page")
                } else {
                    node.right_page
                };
                self.path.push(Frame {
                    node,
                    index: chosen,
                });
                npage = child;
            } else {
                let mut idx = node.n_cells;
                for i in 0..node.n_cells {
                    if node.get_cell(i)?.order_key() >= target {
                        idx = i;
                        break;
                    }
                }
                self.path.push(Frame { node, index: idx });
                return Ok(());
            }
        }
    }

    /// Positions the cursor at the first cell with key `== target`.
    /// Returns `true` if found; the cursor is left at the insertion
    /// point either way.
    pub fn seek(&mut self, pager: &mut Pager, target: Key) -> Result<bool> {
        self.descend_for_seek(pager, (target, 0))?;
        let top = self.path.last().expect("descend always pushes a leaf frame");
        Ok(top.index < top.node.n_cells && top.node.get_cell(top.index)?.key() == target)
    }

    /// Positions the cursor at the first cell with `key_idx == target`
    /// on an index tree: same exact-match contract as `seek`, ordered by
    /// `(key_idx, key_pk)`.
    pub fn seek_index(&mut self, pager: &mut Pager, key_idx: u32, key_pk: u32) -> Result<bool> {
        self.descend_for_seek(pager, (key_idx, key_pk))?;
        let top = self.path.last().expect("descend always pushes a leaf frame");
        Ok(top.index < top.node.n_cells
            && top.node.get_cell(top.index)?.index_order_key() == (key_idx, key_pk))
    }

    fn scan_forward(&mut self, pager: &mut Pager, pred: impl Fn(u32) -> bool) -> Result<bool> {
        loop {
            let (n, start) = {
                let top = self.path.last().expect("cursor always has a leaf frame here");
                (top.node.n_cells, top.index)
            };
            let mut idx = start;
            while idx < n {
                let k = self
                    .path
                    .last()
                    .expect("cursor always has a leaf frame here")
                    .node
                    .get_cell(idx)?
                    .key();
                if pred(k) {
                    self.path.last_mut().expect("just read it above").index = idx;
                    return Ok(true);
                }
                idx += 1;
            }
            if !self.climb_and_descend_next(pager)? {
                return Ok(false);
            }
        }
    }

    fn scan_backward(&mut self, pager: &mut Pager, pred: impl Fn(u32) -> bool) -> Result<bool> {
        loop {
            let n = self
                .path
                .last()
                .expect("cursor always has a leaf frame here")
                .node
                .n_cells;
            if n > 0 {
                let start = self
                    .path
                    .last()
                    .expect("checked above")
                    .index
                    .min(n - 1);
                let mut idx = start;
                loop {
                    let k = self
                        .path
                        .last()
                        .expect("cursor always has a leaf frame here")
                        .node
                        .get_cell(idx)?
                        .key();
                    if pred(k) {
                        self.path.last_mut().expect("just read it above").index = idx;
                        return Ok(true);
                    }
                    if idx == 0 {
                        break;
                    }
                    idx -= 1;
                }
            }
            if !self.climb_and_descend_prev(pager)? {
                return Ok(false);
            }
        }
    }

    /// Positions the cursor at the first cell satisfying `key <cmp>
    /// target`.
    pub fn seek_cmp(&mut self, pager: &mut Pager, target: Key, cmp: Comparison) -> Result<bool> {
        self.descend_for_seek(pager, (target, 0))?;
        match cmp {
            Comparison::Ge => self.scan_forward(pager, |k| k >= target),
            Comparison::Gt => self.scan_forward(pager, |k| k > target),
            Comparison::Le => self.scan_backward(pager, |k| k <= target),
            Comparison::Lt => self.scan_backward(pager, |k| k < target),
        }
    }

    /// The cell at the cursor's current position. `ECellNo` if the
    /// cursor has never been positioned or sits past the end of a leaf.
    pub fn current(&self) -> Result<CellRef<'_>> {
        let top = self.path.last().ok_or(Error::CellNo(0))?;
        top.node.get_cell(top.index)
    }
}
