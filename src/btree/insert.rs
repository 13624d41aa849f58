//! `insert` -- descend, try a leaf insert, and on overflow split and
//! propagate a separator upward, promoting the root if the split climbs
//! past it.

use crate::btree::cell::Cell;
use crate::btree::node::Node;
use crate::btree::split;
use crate::error::{Error, Result};
use crate::pager::{PageNum, Pager};

/// Picks the child to descend into for a pending insertion: the first
/// cell whose ordering key is `>= pending`'s, else `right_page`. Shares
/// the choice rule with `find::descend`, generalized to the `(key,
/// key_pk)` ordering pair so index trees route the same way.
fn descend_for_insert(node: &Node, pending: &Cell) -> Result<PageNum> {
    let target = pending.order_key();
    for i in 0..node.n_cells {
        let c = node.get_cell(i)?;
        if target <= c.order_key() {
            return Ok(c
                .child_page()
                .expect("internal cell always carries a child page"));
        }
    }
    Ok(node.right_page)
}

/// The position at which `pending` belongs among `node`'s existing
/// cells, keeping the offset array in ascending order.
fn insertion_index(node: &Node, pending: &Cell) -> Result<u16> {
    let target = pending.order_key();
    for i in 0..node.n_cells {
        if node.get_cell(i)?.order_key() > target {
            return Ok(i);
        }
    }
    Ok(node.n_cells)
}

/// Inserts `cell` into the tree rooted at `nroot`, maintaining ordering
/// and balance across splits. `EDUPLICATE` if the key already exists at
/// the destination leaf, with the tree left unchanged.
pub fn insert(pager: &mut Pager, nroot: PageNum, cell: Cell) -> Result<()> {
    // Descend, recording the root-to-leaf path of ancestor page numbers.
    let mut ancestors: Vec<PageNum> = Vec::new();
    let mut npage = nroot;
    let leaf = loop {
        let node = Node::load(pager, npage)?;
        if node.node_type.is_internal() {
            let child = descend_for_insert(&node, &cell)?;
            ancestors.push(npage);
            npage = child;
        } else {
            break node;
        }
    };

    for i in 0..leaf.n_cells {
        if leaf.get_cell(i)?.order_key() == cell.order_key() {
            return Err(Error::Duplicate);
        }
    }

    let mut current = leaf;
    let mut pending = cell;
    // Set once a split below propagates a separator upward: the new
    // right-sibling page number that must replace whatever child pointer
    // used to cover the range now split between `pending` and its
    // successor.
    let mut fixup_right_child: Option<PageNum> = None;

    loop {
        let i = insertion_index(&current, &pending)?;
        if let Some(new_right_child) = fixup_right_child.take() {
            if i < current.n_cells {
                current.set_cell_child_page(i, new_right_child)?;
            } else {
                current.right_page = new_right_child;
            }
        }

        if current.is_insertable(&pending) {
            current.insert_cell(i, &pending)?;
            current.write(pager)?;
            log::debug!("inserted key into page {}", current.npage);
            return Ok(());
        }

        log::debug!("page {} is full, splitting", current.npage);
        let node_type = current.node_type;
        let original_right_page = current.right_page;
        let is_root = ancestors.is_empty();

        let original_n_cells = current.n_cells as usize;
        let mut all_cells: Vec<Cell> = (0..current.n_cells)
            .map(|i| current.get_cell(i).map(|c| c.to_owned()))
            .collect::<Result<_>>()?;
        all_cells.push(pending.clone());

        let (left_page, right_page) = if is_root {
            // The root's page number must remain `nroot` after promotion,
            // so neither split half may reuse it: both get fresh pages,
            // and the new interior root is written directly into `nroot`.
            (pager.allocate_page()?, pager.allocate_page()?)
        } else {
            (pager.read_page(current.npage)?, pager.allocate_page()?)
        };
        let (_left, right, promoted) = split::build_split(
            pager,
            node_type,
            left_page,
            right_page,
            all_cells,
            original_n_cells,
            original_right_page,
        )?;

        if is_root {
            log::debug!("root promotion: growing tree height at page {nroot}");
            let root_page = pager.read_page(nroot)?;
            let mut new_root = Node::create_empty(root_page, node_type.internal_counterpart());
            new_root.insert_cell(0, &promoted)?;
            new_root.right_page = right.npage;
            new_root.write(pager)?;
            return Ok(());
        }

        current = Node::load(pager, ancestors.pop().expect("ancestors non-empty"))?;
        pending = promoted;
        fixup_right_child = Some(right.npage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree::node::NodeType;
    use crate::pager::PagerConfig;

    fn temp_pager(name: &str, page_size: u32) -> Pager {
        let mut p = std::env::temp_dir();
        p.push(format!("chipager-insert-test-{name}-{}", std::process::id()));
        let _ = std::fs::remove_file(&p);
        Pager::open(p.to_str().unwrap(), PagerConfig { page_size }).unwrap()
    }

    #[test]
    fn single_insert_then_find() {
        let mut pager = temp_pager("single", 4096);
        insert(
            &mut pager,
            1,
            Cell::TableLeaf {
                key: 42,
                data: vec![0xAA, 0xBB, 0xCC],
            },
        )
        .unwrap();
        let data = crate::btree::find::find(&mut pager, 1, 42).unwrap();
        assert_eq!(data, vec![0xAA, 0xBB, 0xCC]);
        assert!(matches!(
            crate::btree::find::find(&mut pager, 1, 41),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn duplicate_insert_is_rejected_and_leaves_tree_unchanged() {
        let mut pager = temp_pager("dup", 4096);
        insert(
            &mut pager,
            1,
            Cell::TableLeaf {
                key: 42,
                data: vec![0xAA],
            },
        )
        .unwrap();
        let before = pager.read_page(1).unwrap();
        let err = insert(
            &mut pager,
            1,
            Cell::TableLeaf {
                key: 42,
                data: vec![0x00],
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::Duplicate));
        let after = pager.read_page(1).unwrap();
        assert_eq!(before.as_slice(), after.as_slice());
    }

    #[test]
    fn leaf_split_promotes_median_and_keeps_root_page_number() {
        let mut pager = temp_pager("leaf-split", 1024);
        // 200-byte payloads: roomy enough that a handful of keys overflow
        // an otherwise-empty 1024-byte leaf.
        for key in 1..20u32 {
            insert(
                &mut pager,
                1,
                Cell::TableLeaf {
                    key,
                    data: vec![0u8; 200],
                },
            )
            .unwrap();
        }
        let root = Node::load(&mut pager, 1).unwrap();
        assert_eq!(root.node_type, NodeType::TableInternal);
        assert!(root.n_cells >= 1);
        for key in 1..20u32 {
            let data = crate::btree::find::find(&mut pager, 1, key).unwrap();
            assert_eq!(data, vec![0u8; 200]);
        }
    }

    #[test]
    fn root_promotion_grows_height_while_preserving_root_page_number() {
        let mut pager = temp_pager("root-promote", 1024);
        for key in 1..200u32 {
            insert(
                &mut pager,
                1,
                Cell::TableLeaf {
                    key,
                    data: vec![0u8; 200],
                },
            )
            .unwrap();
        }
        let root = Node::load(&mut pager, 1).unwrap();
        assert_eq!(root.node_type, NodeType::TableInternal);
        // Every child of the root must itself be an internal node by now
        // (height >= 3), since 200 entries at 200 bytes each vastly
        // exceeds what two levels of 1024-byte pages hold.
        let mut saw_internal_child = false;
        for i in 0..root.n_cells {
            let child_page = root.get_cell(i).unwrap().child_page().unwrap();
            let child = Node::load(&mut pager, child_page).unwrap();
            saw_internal_child |= child.node_type.is_internal();
        }
        assert!(saw_internal_child);
        for key in 1..200u32 {
            let data = crate::btree::find::find(&mut pager, 1, key).unwrap();
            assert_eq!(data, vec![0u8; 200]);
        }
    }

    #[test]
    fn index_tree_insert_and_ordering() {
        let mut pager = temp_pager("index", 4096);
        let root_page = pager.allocate_page().unwrap();
        let root_npage = root_page.npage;
        let mut root_node = Node::create_empty(root_page, NodeType::IndexLeaf);
        root_node.write(&mut pager).unwrap();
        for (key_idx, key_pk) in [(5u32, 1u32), (3, 2), (5, 0), (1, 1)] {
            insert(
                &mut pager,
                root_npage,
                Cell::IndexLeaf { key_idx, key_pk },
            )
            .unwrap();
        }
        let err = insert(
            &mut pager,
            root_npage,
            Cell::IndexLeaf { key_idx: 5, key_pk: 1 },
        )
        .unwrap_err();
        assert!(matches!(err, Error::Duplicate));

        let node = Node::load(&mut pager, root_npage).unwrap();
        let keys: Vec<(u32, u32)> = (0..node.n_cells)
            .map(|i| node.get_cell(i).unwrap().index_order_key())
            .collect();
        assert_eq!(keys, vec![(1, 1), (3, 2), (5, 0), (5, 1)]);
    }
}
