//! Crate-wide error type and codes, matching the taxonomy in the file
//! format and engine API (format errors, addressing errors, logical
//! errors, resource errors).

use crate::{dbheader, pager};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// File header failed validation on open. Fatal to the handle.
    #[error("corrupt or unrecognized database header: {0}")]
    CorruptHeader(#[from] dbheader::Error),

    /// Caller supplied a page number outside [1, n_pages].
    #[error("page number {0} is out of range")]
    PageNo(pager::PageNum),

    /// Caller supplied a cell index outside [0, n_cells).
    #[error("cell index {0} is out of range")]
    CellNo(usize),

    /// `find`/`seek` found no matching key. Not a warning-worthy event.
    #[error("key not found")]
    NotFound,

    /// `insert` found the key already present at the destination leaf.
    #[error("key already exists")]
    Duplicate,

    /// Allocation failure (page table exhaustion, oversized cell, etc).
    #[error("out of memory")]
    NoMem,

    /// Propagated I/O failure. Source kept for diagnostics.
    #[error("I/O error")]
    Io(#[source] std::io::Error),

    /// An internal invariant was violated (e.g. split attempted on a node
    /// that is not full). These are programmer errors in this crate, not
    /// recoverable conditions, so callers should treat them as fatal.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<pager::Error> for Error {
    fn from(e: pager::Error) -> Self {
        match e {
            pager::Error::PageNumberBeyondLimits(n) => Error::PageNo(n),
            pager::Error::ReadFailed(io) => Error::Io(io),
            pager::Error::WriteFailed(io) => Error::Io(io),
            pager::Error::Header(h) => Error::CorruptHeader(h),
            pager::Error::Closed => Error::Invariant("pager used after close".to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
