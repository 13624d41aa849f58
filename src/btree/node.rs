//! A parsed, mutable view over a page: the node kind, header fields,
//! and the cell-offset array built on top of it.

use crate::btree::cell::{decode_ref, Cell, CellRef};
use crate::btree::header as hdr;
use crate::codec;
use crate::error::{Error, Result};
use crate::pager::{Page, PageNum, Pager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    TableInternal = 0x05,
    TableLeaf = 0x0D,
    IndexInternal = 0x02,
    IndexLeaf = 0x0A,
}

impl NodeType {
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0x05 => Ok(NodeType::TableInternal),
            0x0D => Ok(NodeType::TableLeaf),
            0x02 => Ok(NodeType::IndexInternal),
            0x0A => Ok(NodeType::IndexLeaf),
            other => Err(Error::Invariant(format!(
                "unrecognized node type byte {other:#x}"
            ))),
        }
    }

    pub fn is_internal(self) -> bool {
        matches!(self, NodeType::TableInternal | NodeType::IndexInternal)
    }

    pub fn is_table(self) -> bool {
        matches!(self, NodeType::TableInternal | NodeType::TableLeaf)
    }

    pub fn header_size(self) -> usize {
        if self.is_internal() {
            hdr::INTERNAL_HEADER_SIZE
        } else {
            hdr::LEAF_HEADER_SIZE
        }
    }

    /// The internal node kind that this node's split promotes a
    /// separator into (table trees promote into table-internal nodes,
    /// index trees into index-internal nodes).
    pub fn internal_counterpart(self) -> NodeType {
        if self.is_table() {
            NodeType::TableInternal
        } else {
            NodeType::IndexInternal
        }
    }
}

/// A parsed handle over a page. `header_offset` is 100 on page 1 to
/// skip the file header prefix, 0 elsewhere.
pub struct Node {
    pub npage: PageNum,
    pub node_type: NodeType,
    pub header_offset: usize,
    pub free_offset: u16,
    pub n_cells: u16,
    pub cells_offset: u16,
    pub right_page: u32,
    page: Page,
}

impl Node {
    /// Writes an empty node's header directly into a page buffer. Used
    /// both by `create_empty` and by the pager when materializing a
    /// brand-new file's page 1, before any `Node` exists to call.
    pub fn create_empty_in(buf: &mut [u8], header_offset: usize, node_type: NodeType, page_size: u32) {
        let free_offset = (header_offset + node_type.header_size()) as u16;
        let cells_offset = page_size as u16;
        buf[header_offset + hdr::OFF_TYPE] = node_type as u8;
        codec::put2byte(buf, header_offset + hdr::OFF_FREE_OFFSET, free_offset);
        codec::put2byte(buf, header_offset + hdr::OFF_N_CELLS, 0);
        codec::put2byte(buf, header_offset + hdr::OFF_CELLS_OFFSET, cells_offset);
        buf[header_offset + hdr::OFF_RESERVED] = 0;
        if node_type.is_internal() {
            codec::put4byte(buf, header_offset + hdr::OFF_RIGHT_PAGE, 0);
        }
    }

    /// Initializes a freshly allocated page as an empty node of `node_type`.
    pub fn create_empty(mut page: Page, node_type: NodeType) -> Node {
        let npage = page.npage;
        let header_offset = hdr::header_offset(npage);
        let page_size = page.len() as u32;
        Node::create_empty_in(page.as_mut_slice(), header_offset, node_type, page_size);
        Node::parse(page).expect("freshly created node header is well-formed")
    }

    pub fn load(pager: &mut Pager, npage: PageNum) -> Result<Node> {
        let page = pager.read_page(npage)?;
        Node::parse(page)
    }

    fn parse(page: Page) -> Result<Node> {
        let npage = page.npage;
        let header_offset = hdr::header_offset(npage);
        let buf = page.as_slice();
        let node_type = NodeType::from_byte(buf[header_offset + hdr::OFF_TYPE])?;
        let free_offset = codec::get2byte(buf, header_offset + hdr::OFF_FREE_OFFSET);
        let n_cells = codec::get2byte(buf, header_offset + hdr::OFF_N_CELLS);
        let cells_offset = codec::get2byte(buf, header_offset + hdr::OFF_CELLS_OFFSET);
        let right_page = if node_type.is_internal() {
            codec::get4byte(buf, header_offset + hdr::OFF_RIGHT_PAGE)
        } else {
            0
        };
        Ok(Node {
            npage,
            node_type,
            header_offset,
            free_offset,
            n_cells,
            cells_offset,
            right_page,
            page,
        })
    }

    /// Writes header fields back into the page bytes without persisting.
    pub fn sync(&mut self) {
        let ho = self.header_offset;
        let buf = self.page.as_mut_slice();
        buf[ho + hdr::OFF_TYPE] = self.node_type as u8;
        codec::put2byte(buf, ho + hdr::OFF_FREE_OFFSET, self.free_offset);
        codec::put2byte(buf, ho + hdr::OFF_N_CELLS, self.n_cells);
        codec::put2byte(buf, ho + hdr::OFF_CELLS_OFFSET, self.cells_offset);
        buf[ho + hdr::OFF_RESERVED] = 0;
        if self.node_type.is_internal() {
            codec::put4byte(buf, ho + hdr::OFF_RIGHT_PAGE, self.right_page);
        }
    }

    /// `sync()` followed by a pager write.
    pub fn write(&mut self, pager: &mut Pager) -> Result<()> {
        self.sync();
        pager.write_page(&self.page)?;
        Ok(())
    }

    pub fn page_size(&self) -> u32 {
        self.page.len() as u32
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    fn cell_offset_array_base(&self) -> usize {
        self.header_offset + self.node_type.header_size()
    }

    fn cell_offset(&self, i: u16) -> usize {
        let slot = self.cell_offset_array_base() + i as usize * 2;
        codec::get2byte(self.page.as_slice(), slot) as usize
    }

    /// Bytes free between the end of the offset array and the start of
    /// the cell area.
    pub fn free_space(&self) -> usize {
        self.cells_offset as usize - self.free_offset as usize
    }

    pub fn is_insertable(&self, cell: &Cell) -> bool {
        self.free_space() >= 2 + cell.byte_size()
    }

    /// Fails `ECellNo` if `i >= n_cells`. Returns a view borrowing leaf
    /// data straight from the page.
    pub fn get_cell(&self, i: u16) -> Result<CellRef<'_>> {
        if i >= self.n_cells {
            return Err(Error::CellNo(i as usize));
        }
        let off = self.cell_offset(i);
        Ok(decode_ref(self.node_type, &self.page.as_slice()[off..]))
    }

    /// Inserts `cell` at logical position `i`: encodes it into the cell
    /// area, then shifts the offset-array tail to open a slot at `i`.
    /// Fails `ECellNo` if `i > n_cells`, `ENoMem` if the cell does not
    /// fit in the node's free space.
    pub fn insert_cell(&mut self, i: u16, cell: &Cell) -> Result<()> {
        if i > self.n_cells {
            return Err(Error::CellNo(i as usize));
        }
        if !self.is_insertable(cell) {
            return Err(Error::NoMem);
        }
        let mut encoded = Vec::with_capacity(cell.byte_size());
        cell.encode(&mut encoded);

        let new_cells_offset = self.cells_offset as usize - encoded.len();
        let buf = self.page.as_mut_slice();
        buf[new_cells_offset..new_cells_offset + encoded.len()].copy_from_slice(&encoded);
        self.cells_offset = new_cells_offset as u16;

        let base = self.cell_offset_array_base();
        let n = self.n_cells as usize;
        let idx = i as usize;
        for j in (idx..n).rev() {
            let v = codec::get2byte(buf, base + j * 2);
            codec::put2byte(buf, base + (j + 1) * 2, v);
        }
        codec::put2byte(buf, base + idx * 2, new_cells_offset as u16);

        self.n_cells += 1;
        self.free_offset += 2;
        Ok(())
    }

    /// Rewrites the child-page pointer of cell `i` in place. Both
    /// internal cell layouts carry `child_page` as their first four
    /// bytes, so this needs no node-type branch. Used when split
    /// propagation updates a separator's child after the fact: the
    /// on-page bytes, not a local copy, must change.
    pub fn set_cell_child_page(&mut self, i: u16, child_page: u32) -> Result<()> {
        if i >= self.n_cells {
            return Err(Error::CellNo(i as usize));
        }
        let off = self.cell_offset(i);
        codec::put4byte(self.page.as_mut_slice(), off, child_page);
        Ok(())
    }
}
