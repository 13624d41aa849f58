//! Manages pages of a chidb-format database file.
//!
//! The pager owns the file handle and the page size, and hands out owned
//! page buffers to callers. It does not keep a shared cache across reads:
//! every `read_page` copies bytes out of the file, and every `write_page`
//! writes a caller-owned buffer back. This keeps a `Node` view (built on
//! top of a `Page`) free of any lifetime tie to the pager, at the cost of
//! a copy per page touch -- acceptable for a didactic engine operating on
//! a handful of kilobyte-sized pages per operation.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};

use crate::dbheader;

pub type PageNum = u32;

/// Configuration recognized by `Pager::open`. Everything else about an
/// existing file is derived from its header.
#[derive(Debug, Clone, Copy)]
pub struct PagerConfig {
    /// Page size used when creating a new file. Must be a legal chidb
    /// page size: a power of two from 512 to 32768 inclusive.
    pub page_size: u32,
}

impl Default for PagerConfig {
    fn default() -> Self {
        PagerConfig { page_size: 4096 }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("page number {0} is outside the range this file contains")]
    PageNumberBeyondLimits(PageNum),
    #[error("failed to read page from file")]
    ReadFailed(#[source] std::io::Error),
    #[error("failed to write page to file")]
    WriteFailed(#[source] std::io::Error),
    #[error("file header is invalid")]
    Header(#[from] dbheader::Error),
    #[error("pager used after close")]
    Closed,
}

pub type Result<T> = std::result::Result<T, Error>;

/// An owned, fixed-size page buffer, checked out from the pager.
#[derive(Debug, Clone)]
pub struct Page {
    pub npage: PageNum,
    data: Vec<u8>,
}

impl Page {
    fn zeroed(npage: PageNum, page_size: u32) -> Self {
        Page {
            npage,
            data: vec![0u8; page_size as usize],
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub struct Pager {
    f: File,
    page_size: u32,
    n_pages: PageNum,
    closed: bool,
}

impl Pager {
    /// Opens `path`, creating it (with a fresh header and an empty
    /// TABLE_LEAF root at page 1) if it doesn't exist or is empty.
    pub fn open(path: &str, config: PagerConfig) -> Result<Self> {
        let existed_nonempty = std::fs::metadata(path)
            .map(|m| m.len() >= dbheader::HEADER_SIZE as u64)
            .unwrap_or(false);

        let mut f = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .map_err(Error::ReadFailed)?;

        let page_size = if existed_nonempty {
            let header = dbheader::read_header(&mut f)?;
            header.page_size
        } else {
            dbheader::validate_page_size(config.page_size)?;
            config.page_size
        };

        let file_len = f.metadata().map_err(Error::ReadFailed)?.len();
        let n_pages = (file_len / page_size as u64) as PageNum;

        let mut pager = Pager {
            f,
            page_size,
            n_pages,
            closed: false,
        };

        if !existed_nonempty {
            log::debug!("initializing new database file at {path}");
            pager.init_empty_file(config.page_size)?;
        }

        Ok(pager)
    }

    fn init_empty_file(&mut self, page_size: u32) -> Result<()> {
        self.page_size = page_size;
        self.n_pages = 1;
        let mut page1 = Page::zeroed(1, page_size);
        dbheader::write_header(&mut page1.data, page_size);
        crate::btree::node::Node::create_empty_in(
            &mut page1.data,
            dbheader::HEADER_SIZE,
            crate::btree::node::NodeType::TableLeaf,
            page_size,
        );
        self.write_page(&page1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn n_pages(&self) -> PageNum {
        self.n_pages
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        Ok(())
    }

    /// Reads page `npage` (1-based) into a fresh owned buffer.
    pub fn read_page(&mut self, npage: PageNum) -> Result<Page> {
        self.check_open()?;
        if npage < 1 || npage > self.n_pages {
            return Err(Error::PageNumberBeyondLimits(npage));
        }
        let mut data = vec![0u8; self.page_size as usize];
        self.f
            .seek(SeekFrom::Start((npage - 1) as u64 * self.page_size as u64))
            .map_err(Error::ReadFailed)?;
        self.f.read_exact(&mut data).map_err(Error::ReadFailed)?;
        log::trace!("read page {npage}");
        Ok(Page { npage, data })
    }

    /// Reserves a new page number and returns an empty buffer for it. The
    /// page is not persisted until a subsequent `write_page`.
    pub fn allocate_page(&mut self) -> Result<Page> {
        self.check_open()?;
        self.n_pages += 1;
        let npage = self.n_pages;
        log::debug!("allocated page {npage}");
        Ok(Page::zeroed(npage, self.page_size))
    }

    /// Writes `page` back to its slot in the file.
    pub fn write_page(&mut self, page: &Page) -> Result<()> {
        self.check_open()?;
        if page.npage < 1 {
            return Err(Error::PageNumberBeyondLimits(page.npage));
        }
        self.f
            .seek(SeekFrom::Start(
                (page.npage - 1) as u64 * self.page_size as u64,
            ))
            .map_err(Error::WriteFailed)?;
        self.f.write_all(&page.data).map_err(Error::WriteFailed)?;
        if page.npage > self.n_pages {
            self.n_pages = page.npage;
        }
        log::trace!("wrote page {}", page.npage);
        Ok(())
    }

    /// Releases in-memory state associated with a checked-out page. Since
    /// the pager holds no cache, this simply drops the buffer.
    pub fn release_page(&mut self, _page: Page) {}

    /// Flushes and closes. Subsequent operations fail with `Error::Closed`.
    pub fn close(&mut self) -> Result<()> {
        self.check_open()?;
        self.f.flush().map_err(Error::WriteFailed)?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "chipager-test-{}-{}",
            name,
            std::process::id()
        ));
        p.to_string_lossy().into_owned()
    }

    #[test]
    fn create_and_open_materializes_header_and_empty_root() {
        let path = temp_path("create-open");
        let _ = std::fs::remove_file(&path);
        let mut pager = Pager::open(&path, PagerConfig::default()).unwrap();
        assert_eq!(pager.n_pages(), 1);
        let page1 = pager.read_page(1).unwrap();
        assert_eq!(&page1.as_slice()[0..16], dbheader::MAGIC);
        assert_eq!(crate::codec::get2byte(page1.as_slice(), 16), 4096u16);
        assert_eq!(crate::codec::get4byte(page1.as_slice(), 48), 20000);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn allocate_then_write_extends_file() {
        let path = temp_path("alloc-write");
        let _ = std::fs::remove_file(&path);
        let mut pager = Pager::open(&path, PagerConfig::default()).unwrap();
        let mut p2 = pager.allocate_page().unwrap();
        assert_eq!(p2.npage, 2);
        p2.as_mut_slice()[0] = 0xAB;
        pager.write_page(&p2).unwrap();
        assert_eq!(pager.n_pages(), 2);
        let reread = pager.read_page(2).unwrap();
        assert_eq!(reread.as_slice()[0], 0xAB);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn read_out_of_range_page_fails() {
        let path = temp_path("oor");
        let _ = std::fs::remove_file(&path);
        let mut pager = Pager::open(&path, PagerConfig::default()).unwrap();
        assert!(matches!(
            pager.read_page(5),
            Err(Error::PageNumberBeyondLimits(5))
        ));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn opening_with_an_illegal_page_size_is_rejected_not_panicked() {
        let path = temp_path("bad-page-size");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            Pager::open(&path, PagerConfig { page_size: 999 }),
            Err(Error::Header(dbheader::Error::UnsupportedPageSize(999)))
        ));
        // A zero page size must also be rejected rather than reaching the
        // file-length-by-page-size division.
        assert!(matches!(
            Pager::open(&path, PagerConfig { page_size: 0 }),
            Err(Error::Header(dbheader::Error::UnsupportedPageSize(0)))
        ));
        std::fs::remove_file(&path).ok();
    }
}
