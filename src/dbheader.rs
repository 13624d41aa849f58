//! Reads, validates, and creates the 100-byte chidb file header that lives
//! at the start of page 1.
//!
//! Only magic, page size, change counter, schema version, page cache
//! size, and user cookie are checked; everything else in the 100 bytes
//! is written zero on create and ignored on read.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, SeekFrom, Write};

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("file header magic bytes do not match \"SQLite format 3\\0\"")]
    WrongMagic,
    #[error("file change counter must be 0 in a valid chidb file")]
    NonzeroChangeCounter,
    #[error("schema version must be 0 in a valid chidb file")]
    NonzeroSchemaVersion,
    #[error("page cache size must be 20000")]
    WrongPageCacheSize,
    #[error("user cookie must be 0 in a valid chidb file")]
    NonzeroUserCookie,
    #[error("page size {0} is not a supported chidb page size")]
    UnsupportedPageSize(u32),
    #[error("failed to read file header")]
    ReadFailed(#[source] std::io::Error),
}

pub const HEADER_SIZE: usize = 100;
pub const MAGIC: &[u8; 16] = b"SQLite format 3\0";
pub const REQUIRED_PAGE_CACHE_SIZE: u32 = 20000;

const OFF_MAGIC: usize = 0;
const OFF_PAGE_SIZE: usize = 16;
const OFF_CHANGE_COUNTER: usize = 24;
const OFF_SCHEMA_VERSION: usize = 40;
const OFF_PAGE_CACHE_SIZE: usize = 48;
const OFF_USER_COOKIE: usize = 60;

#[derive(Debug, Clone, Copy)]
pub struct Header {
    pub page_size: u32,
}

/// The legal chidb page sizes: powers of two from 512 to 32768. Shared
/// by header validation on open (`parse_header`) and by `Pager::open`'s
/// validation of a caller-supplied `PagerConfig::page_size` before it is
/// used to create a new file.
pub(crate) fn is_legal_page_size(n: u32) -> bool {
    matches!(n, 512 | 1024 | 2048 | 4096 | 8192 | 16384 | 32768)
}

/// Validates a page size intended for a freshly created file, returning
/// `Error::UnsupportedPageSize` rather than silently accepting a value
/// that would only be rejected later, on reopen.
pub(crate) fn validate_page_size(n: u32) -> Result<(), Error> {
    if is_legal_page_size(n) {
        Ok(())
    } else {
        Err(Error::UnsupportedPageSize(n))
    }
}

/// Reads and validates the header from the start of `f`: magic must
/// match, change counter, schema version, and user cookie must be zero,
/// and page cache size must equal 20000.
pub fn read_header<R: Read + Seek>(f: &mut R) -> Result<Header, Error> {
    f.seek(SeekFrom::Start(0)).map_err(Error::ReadFailed)?;
    let mut buf = [0u8; HEADER_SIZE];
    f.read_exact(&mut buf).map_err(Error::ReadFailed)?;
    f.seek(SeekFrom::Start(0)).map_err(Error::ReadFailed)?;
    parse_header(&buf)
}

pub fn parse_header(buf: &[u8; HEADER_SIZE]) -> Result<Header, Error> {
    if &buf[OFF_MAGIC..OFF_MAGIC + 16] != MAGIC {
        return Err(Error::WrongMagic);
    }
    let page_size = (&buf[OFF_PAGE_SIZE..OFF_PAGE_SIZE + 2])
        .read_u16::<BigEndian>()
        .map_err(Error::ReadFailed)?;
    if !is_legal_page_size(page_size as u32) {
        return Err(Error::UnsupportedPageSize(page_size as u32));
    }
    let change_counter = (&buf[OFF_CHANGE_COUNTER..OFF_CHANGE_COUNTER + 4])
        .read_u32::<BigEndian>()
        .map_err(Error::ReadFailed)?;
    if change_counter != 0 {
        return Err(Error::NonzeroChangeCounter);
    }
    let schema_version = (&buf[OFF_SCHEMA_VERSION..OFF_SCHEMA_VERSION + 4])
        .read_u32::<BigEndian>()
        .map_err(Error::ReadFailed)?;
    if schema_version != 0 {
        return Err(Error::NonzeroSchemaVersion);
    }
    let page_cache_size = (&buf[OFF_PAGE_CACHE_SIZE..OFF_PAGE_CACHE_SIZE + 4])
        .read_u32::<BigEndian>()
        .map_err(Error::ReadFailed)?;
    if page_cache_size != REQUIRED_PAGE_CACHE_SIZE {
        return Err(Error::WrongPageCacheSize);
    }
    let user_cookie = (&buf[OFF_USER_COOKIE..OFF_USER_COOKIE + 4])
        .read_u32::<BigEndian>()
        .map_err(Error::ReadFailed)?;
    if user_cookie != 0 {
        return Err(Error::NonzeroUserCookie);
    }
    Ok(Header {
        page_size: page_size as u32,
    })
}

/// Writes a fresh file header into the first [`HEADER_SIZE`] bytes of
/// `page1`: magic, configured page size, page cache size 20000,
/// everything else zero.
pub fn write_header(page1: &mut [u8], page_size: u32) {
    debug_assert!(page1.len() >= HEADER_SIZE);
    for b in page1[..HEADER_SIZE].iter_mut() {
        *b = 0;
    }
    page1[OFF_MAGIC..OFF_MAGIC + 16].copy_from_slice(MAGIC);
    (&mut page1[OFF_PAGE_SIZE..OFF_PAGE_SIZE + 2])
        .write_u16::<BigEndian>(page_size as u16)
        .expect("slice of length 2");
    (&mut page1[OFF_PAGE_CACHE_SIZE..OFF_PAGE_CACHE_SIZE + 4])
        .write_u32::<BigEndian>(REQUIRED_PAGE_CACHE_SIZE)
        .expect("slice of length 4");
    // change counter, schema version, and user cookie stay zero.
}
