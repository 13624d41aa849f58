//! Page-header byte layout shared by all four node kinds. Offsets here
//! are relative to `header_offset`, the
//! start of the node's own header within the page (100 on page 1, to
//! skip the file header prefix; 0 everywhere else).

pub const OFF_TYPE: usize = 0;
pub const OFF_FREE_OFFSET: usize = 1;
pub const OFF_N_CELLS: usize = 3;
pub const OFF_CELLS_OFFSET: usize = 5;
pub const OFF_RESERVED: usize = 7;
pub const OFF_RIGHT_PAGE: usize = 8;

/// Header size for a node with a right-page pointer (internal nodes).
pub const INTERNAL_HEADER_SIZE: usize = 12;
/// Header size for a node without one (leaf nodes).
pub const LEAF_HEADER_SIZE: usize = 8;

/// Byte offset, within the page, at which a node's own header begins.
pub fn header_offset(npage: crate::pager::PageNum) -> usize {
    if npage == 1 {
        crate::dbheader::HEADER_SIZE
    } else {
        0
    }
}
