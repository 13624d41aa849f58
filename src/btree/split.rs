//! The split primitive: partitions an overfull cell sequence across a
//! reused page and a freshly allocated one, and computes the separator
//! cell to promote into the parent.

use crate::btree::cell::Cell;
use crate::btree::node::{Node, NodeType};
use crate::error::Result;
use crate::pager::{Page, PageNum, Pager};

/// Builds the promoted cell for a split: `child_page` always points at
/// the left half, and the key fields come from whichever ordering the
/// node type uses.
fn promote(median: &Cell, left_npage: PageNum) -> Cell {
    let (a, b) = median.order_key();
    match median {
        Cell::TableInternal { .. } | Cell::TableLeaf { .. } => Cell::TableInternal {
            child_page: left_npage,
            key: a,
        },
        Cell::IndexInternal { .. } | Cell::IndexLeaf { .. } => Cell::IndexInternal {
            child_page: left_npage,
            key_idx: a,
            key_pk: b,
        },
    }
}

/// Partitions `all_cells` (already merged with any pending insert, not
/// yet sorted) across `left_page` and `right_page`. `original_right_page`
/// is the pre-split node's right-pointer, inherited by the right half
/// when the node being split is internal. `original_n_cells` is the
/// overfull node's cell count *before* the pending insert was merged in
/// (i.e. `all_cells.len()` minus one pending cell, or `all_cells.len()`
/// itself when there is no pending cell, as in [`split`]'s standalone
/// use). The median index is derived from this pre-insertion count, not
/// from the merged total -- matching chidb's `median_index = btn->n_cells
/// / 2` (`examples/original_source/db/src/libchidb/btree.c`), which is
/// computed before the node's own cell is accounted for. Deriving it from
/// the merged total instead would let an even `original_n_cells` plus one
/// pending cell split into halves differing by 2, not 1.
///
/// Returns the initialized left node, right node (both already
/// written), and the cell to propagate to the parent.
pub fn build_split(
    pager: &mut Pager,
    node_type: NodeType,
    left_page: Page,
    right_page: Page,
    mut all_cells: Vec<Cell>,
    original_n_cells: usize,
    original_right_page: PageNum,
) -> Result<(Node, Node, Cell)> {
    all_cells.sort_by_key(|c| c.order_key());
    let m = original_n_cells / 2;

    let mut left = Node::create_empty(left_page, node_type);
    let mut right = Node::create_empty(right_page, node_type);

    let promoted;
    if node_type.is_internal() {
        // left: [0..m), right: [m+1..end), median promoted without retention.
        let mut rest = all_cells.split_off(m);
        let median = rest.remove(0);
        let left_cells = all_cells;
        let median_child = median
            .child_page()
            .expect("internal cell carries a child page");
        for c in &left_cells {
            left.insert_cell(left.n_cells, c)?;
        }
        left.right_page = median_child;
        for c in &rest {
            right.insert_cell(right.n_cells, c)?;
        }
        right.right_page = original_right_page;
        promoted = promote(&median, left.npage);
    } else {
        // leaf: left: [0..=m] (median's payload stays in left), right: [m+1..end).
        let right_cells = all_cells.split_off(m + 1);
        let left_cells = all_cells;
        let median = left_cells.last().expect("overfull sequence is non-empty").clone();
        for c in &left_cells {
            left.insert_cell(left.n_cells, c)?;
        }
        for c in &right_cells {
            right.insert_cell(right.n_cells, c)?;
        }
        promoted = promote(&median, left.npage);
    }

    left.write(pager)?;
    right.write(pager)?;
    Ok((left, right, promoted))
}

/// Loads `child_npage`'s cells, splits it in place (left reuses
/// `child_npage`, right is freshly allocated), and inserts the
/// resulting separator into `parent_npage` at `parent_ncell`. Exposed
/// standalone for tests that want to force a split without going
/// through the full `insert` descent.
pub fn split(
    pager: &mut Pager,
    parent_npage: PageNum,
    child_npage: PageNum,
    parent_ncell: u16,
) -> Result<PageNum> {
    let child = Node::load(pager, child_npage)?;
    let node_type = child.node_type;
    let original_right_page = child.right_page;
    let original_n_cells = child.n_cells as usize;
    let existing: Vec<Cell> = (0..child.n_cells)
        .map(|i| child.get_cell(i).map(|c| c.to_owned()))
        .collect::<Result<_>>()?;

    let left_page = pager.read_page(child_npage)?;
    let right_page = pager.allocate_page()?;
    let (left, right, promoted) = build_split(
        pager,
        node_type,
        left_page,
        right_page,
        existing,
        original_n_cells,
        original_right_page,
    )?;

    let mut parent = Node::load(pager, parent_npage)?;
    parent.insert_cell(parent_ncell, &promoted)?;
    let next = parent_ncell + 1;
    if next < parent.n_cells {
        parent.set_cell_child_page(next, right.npage)?;
    } else {
        parent.right_page = right.npage;
    }
    parent.write(pager)?;

    let _ = &left;
    Ok(right.npage)
}
