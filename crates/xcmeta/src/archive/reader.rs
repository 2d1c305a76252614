//! Zip-backed archive reader.
//!
//! Opens a zipped archive, memory-maps it, and decompresses individual entries
//! on demand. Nothing is written to disk.

use super::{unique_entry, ArchiveReader, MAX_ENTRY_SIZE};
use crate::{Error, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Reader over a zipped `.xcarchive`.
///
/// Holds the memory-mapped archive until [`ArchiveReader::close`] is called
/// or the reader is dropped.
pub struct ZipArchiveReader {
    path: PathBuf,
    archive: Option<ZipArchive<Cursor<Mmap>>>,
    names: Vec<String>,
}

impl ZipArchiveReader {
    /// Open the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file is missing or unreadable, and
    /// [`Error::Zip`] if it is not a valid zip container.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Archive not found: {}", path.display()),
            )));
        }

        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and never outlives `archive`.
        let mmap = unsafe { Mmap::map(&file)? };
        let archive = ZipArchive::new(Cursor::new(mmap)).map_err(Error::Zip)?;

        let names = archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect();

        log::debug!("Opened archive {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            archive: Some(archive),
            names,
        })
    }

    /// Path the reader was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` until the reader is closed.
    pub fn is_open(&self) -> bool {
        self.archive.is_some()
    }
}

impl ArchiveReader for ZipArchiveReader {
    fn entry_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn read_entry(&mut self, logical_path: &str) -> Result<Vec<u8>> {
        let name = unique_entry(&self.names, logical_path)?;

        let archive = self.archive.as_mut().ok_or_else(|| {
            Error::Io(io::Error::other(format!(
                "Archive already closed: {}",
                self.path.display()
            )))
        })?;

        let mut entry = archive.by_name(&name).map_err(Error::Zip)?;
        // The declared size comes from the central directory and is untrusted.
        let size = entry.size();
        if size > MAX_ENTRY_SIZE {
            return Err(Error::EntryTooLarge { name, size });
        }

        let mut buffer = Vec::with_capacity(size as usize);
        (&mut entry).take(MAX_ENTRY_SIZE + 1).read_to_end(&mut buffer)?;
        if buffer.len() as u64 > MAX_ENTRY_SIZE {
            return Err(Error::EntryTooLarge {
                name,
                size: buffer.len() as u64,
            });
        }

        Ok(buffer)
    }

    fn close(&mut self) -> Result<()> {
        if self.archive.take().is_some() {
            log::debug!("Closed archive {}", self.path.display());
        }
        Ok(())
    }
}
