//! The four on-disk cell layouts and their
//! encode/decode. `Cell` owns its payload; `CellRef` borrows from a
//! page buffer, matching `get_cell`'s no-copy contract for leaf data.

use crate::btree::node::NodeType;
use crate::codec;

/// Marks an index cell, distinguishing it from a differently-shaped
/// internal layout at the same offset.
pub const INDEX_CELL_TYPE_TAG: [u8; 4] = [0x0B, 0x03, 0x04, 0x04];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    TableInternal { child_page: u32, key: u32 },
    TableLeaf { key: u32, data: Vec<u8> },
    IndexInternal { child_page: u32, key_idx: u32, key_pk: u32 },
    IndexLeaf { key_idx: u32, key_pk: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellRef<'a> {
    TableInternal { child_page: u32, key: u32 },
    TableLeaf { key: u32, data: &'a [u8] },
    IndexInternal { child_page: u32, key_idx: u32, key_pk: u32 },
    IndexLeaf { key_idx: u32, key_pk: u32 },
}

impl Cell {
    /// Table-tree ordering key. Panics on index cells, which order by
    /// `(key_idx, key_pk)` instead -- see `index_order_key`.
    pub fn key(&self) -> u32 {
        match self {
            Cell::TableInternal { key, .. } => *key,
            Cell::TableLeaf { key, .. } => *key,
            _ => panic!("Cell::key called on an index cell"),
        }
    }

    pub fn index_order_key(&self) -> (u32, u32) {
        match self {
            Cell::IndexInternal { key_idx, key_pk, .. } => (*key_idx, *key_pk),
            Cell::IndexLeaf { key_idx, key_pk } => (*key_idx, *key_pk),
            _ => panic!("Cell::index_order_key called on a table cell"),
        }
    }

    pub fn child_page(&self) -> Option<u32> {
        match self {
            Cell::TableInternal { child_page, .. } => Some(*child_page),
            Cell::IndexInternal { child_page, .. } => Some(*child_page),
            _ => None,
        }
    }

    /// Ordering key usable across table and index cells alike: table
    /// cells order by `(key, 0)`, index cells by `(key_idx, key_pk)`.
    pub fn order_key(&self) -> (u32, u32) {
        match self {
            Cell::TableInternal { key, .. } | Cell::TableLeaf { key, .. } => (*key, 0),
            Cell::IndexInternal { key_idx, key_pk, .. } | Cell::IndexLeaf { key_idx, key_pk } => {
                (*key_idx, *key_pk)
            }
        }
    }

    /// Returns an equivalent cell with its `child_page` replaced. A
    /// no-op on leaf cells, which carry none.
    pub fn with_child_page(self, new_child_page: u32) -> Cell {
        match self {
            Cell::TableInternal { key, .. } => Cell::TableInternal {
                child_page: new_child_page,
                key,
            },
            Cell::IndexInternal { key_idx, key_pk, .. } => Cell::IndexInternal {
                child_page: new_child_page,
                key_idx,
                key_pk,
            },
            other => other,
        }
    }

    /// On-disk size in bytes.
    pub fn byte_size(&self) -> usize {
        match self {
            Cell::TableInternal { .. } => 8,
            Cell::TableLeaf { data, .. } => 8 + data.len(),
            Cell::IndexInternal { .. } => 16,
            Cell::IndexLeaf { .. } => 12,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Cell::TableInternal { .. } => NodeType::TableInternal,
            Cell::TableLeaf { .. } => NodeType::TableLeaf,
            Cell::IndexInternal { .. } => NodeType::IndexInternal,
            Cell::IndexLeaf { .. } => NodeType::IndexLeaf,
        }
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Cell::TableInternal { child_page, key } => {
                let mut buf = [0u8; 8];
                codec::put4byte(&mut buf, 0, *child_page);
                codec::put4byte(&mut buf, 4, *key);
                out.extend_from_slice(&buf);
            }
            Cell::TableLeaf { key, data } => {
                codec::put_varint32_padded(out, data.len() as u32)
                    .expect("data size fits a padded varint32");
                codec::put_varint32_padded(out, *key).expect("key fits a padded varint32");
                out.extend_from_slice(data);
            }
            Cell::IndexInternal { child_page, key_idx, key_pk } => {
                let mut buf = [0u8; 16];
                codec::put4byte(&mut buf, 0, *child_page);
                buf[4..8].copy_from_slice(&INDEX_CELL_TYPE_TAG);
                codec::put4byte(&mut buf, 8, *key_idx);
                codec::put4byte(&mut buf, 12, *key_pk);
                out.extend_from_slice(&buf);
            }
            Cell::IndexLeaf { key_idx, key_pk } => {
                let mut buf = [0u8; 12];
                buf[0..4].copy_from_slice(&INDEX_CELL_TYPE_TAG);
                codec::put4byte(&mut buf, 4, *key_idx);
                codec::put4byte(&mut buf, 8, *key_pk);
                out.extend_from_slice(&buf);
            }
        }
    }

    pub fn to_ref(&self) -> CellRef<'_> {
        match self {
            Cell::TableInternal { child_page, key } => CellRef::TableInternal {
                child_page: *child_page,
                key: *key,
            },
            Cell::TableLeaf { key, data } => CellRef::TableLeaf { key: *key, data },
            Cell::IndexInternal { child_page, key_idx, key_pk } => CellRef::IndexInternal {
                child_page: *child_page,
                key_idx: *key_idx,
                key_pk: *key_pk,
            },
            Cell::IndexLeaf { key_idx, key_pk } => CellRef::IndexLeaf {
                key_idx: *key_idx,
                key_pk: *key_pk,
            },
        }
    }
}

impl<'a> CellRef<'a> {
    pub fn key(&self) -> u32 {
        match self {
            CellRef::TableInternal { key, .. } => *key,
            CellRef::TableLeaf { key, .. } => *key,
            _ => panic!("CellRef::key called on an index cell"),
        }
    }

    pub fn index_order_key(&self) -> (u32, u32) {
        match self {
            CellRef::IndexInternal { key_idx, key_pk, .. } => (*key_idx, *key_pk),
            CellRef::IndexLeaf { key_idx, key_pk } => (*key_idx, *key_pk),
            _ => panic!("CellRef::index_order_key called on a table cell"),
        }
    }

    pub fn order_key(&self) -> (u32, u32) {
        match self {
            CellRef::TableInternal { key, .. } | CellRef::TableLeaf { key, .. } => (*key, 0),
            CellRef::IndexInternal { key_idx, key_pk, .. } | CellRef::IndexLeaf { key_idx, key_pk } => {
                (*key_idx, *key_pk)
            }
        }
    }

    pub fn child_page(&self) -> Option<u32> {
        match self {
            CellRef::TableInternal { child_page, .. } => Some(*child_page),
            CellRef::IndexInternal { child_page, .. } => Some(*child_page),
            _ => None,
        }
    }

    pub fn to_owned(&self) -> Cell {
        match self {
            CellRef::TableInternal { child_page, key } => Cell::TableInternal {
                child_page: *child_page,
                key: *key,
            },
            CellRef::TableLeaf { key, data } => Cell::TableLeaf {
                key: *key,
                data: data.to_vec(),
            },
            CellRef::IndexInternal { child_page, key_idx, key_pk } => Cell::IndexInternal {
                child_page: *child_page,
                key_idx: *key_idx,
                key_pk: *key_pk,
            },
            CellRef::IndexLeaf { key_idx, key_pk } => Cell::IndexLeaf {
                key_idx: *key_idx,
                key_pk: *key_pk,
            },
        }
    }
}

/// Parses a cell of `node_type` starting at `buf[0..]`, borrowing leaf
/// data from `buf` rather than copying it.
pub fn decode_ref(node_type: NodeType, buf: &[u8]) -> CellRef<'_> {
    match node_type {
        NodeType::TableInternal => CellRef::TableInternal {
            child_page: codec::get4byte(buf, 0),
            key: codec::get4byte(buf, 4),
        },
        NodeType::TableLeaf => {
            let data_size = codec::get_varint32_padded(&buf[0..4]) as usize;
            let key = codec::get_varint32_padded(&buf[4..8]);
            CellRef::TableLeaf {
                key,
                data: &buf[8..8 + data_size],
            }
        }
        NodeType::IndexInternal => CellRef::IndexInternal {
            child_page: codec::get4byte(buf, 0),
            key_idx: codec::get4byte(buf, 8),
            key_pk: codec::get4byte(buf, 12),
        },
        NodeType::IndexLeaf => CellRef::IndexLeaf {
            key_idx: codec::get4byte(buf, 4),
            key_pk: codec::get4byte(buf, 8),
        },
    }
}
