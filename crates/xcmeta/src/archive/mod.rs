//! Archive access for zipped Xcode archives.
//!
//! An `.xcarchive` is a directory tree; build systems ship it zipped. This
//! module provides random access to entries of such a zip by logical path
//! without extracting it to disk.
//!
//! # Logical paths
//!
//! Entries are addressed by glob patterns where `*` never crosses a `/`,
//! so `*.xcarchive/Info.plist` matches `MyApp.xcarchive/Info.plist` but not
//! `MyApp.xcarchive/Products/Applications/MyApp.app/Info.plist`.
//!
//! # Examples
//!
//! ```no_run
//! use xcmeta::archive::{ArchiveReader, ZipArchiveReader};
//!
//! let mut reader = ZipArchiveReader::open("MyApp.xcarchive.zip")?;
//! let info = reader.read_entry("*.xcarchive/Info.plist")?;
//! reader.close()?;
//! # Ok::<(), xcmeta::Error>(())
//! ```

pub mod reader;

pub use reader::ZipArchiveReader;

use crate::{Error, Result};
use glob::{MatchOptions, Pattern};
use std::ops::{Deref, DerefMut};
use std::path::Path;

/// Largest entry size, in bytes, [`ZipArchiveReader`] will decompress.
pub const MAX_ENTRY_SIZE: u64 = 64 * 1024 * 1024;

/// Random access to the entries of an opened archive.
pub trait ArchiveReader {
    /// Names of all file entries, in archive order. Directory entries are skipped.
    fn entry_names(&self) -> Vec<String>;

    /// Reads the single entry matching `logical_path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`] when nothing matches and
    /// [`Error::AmbiguousEntry`] when more than one entry matches.
    fn read_entry(&mut self, logical_path: &str) -> Result<Vec<u8>>;

    /// Releases the underlying file handle. Calling it twice is a no-op.
    fn close(&mut self) -> Result<()>;

    /// Returns `true` if at least one entry matches `logical_path`.
    fn has_entry(&self, logical_path: &str) -> bool {
        match_entries(&self.entry_names(), logical_path)
            .map(|matches| !matches.is_empty())
            .unwrap_or(false)
    }
}

/// Opens archives for the metadata extractor.
pub trait ArchiveOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveReader>>;
}

/// Opens zip archives from the filesystem with [`ZipArchiveReader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipOpener;

impl ArchiveOpener for ZipOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveReader>> {
        Ok(Box::new(ZipArchiveReader::open(path)?))
    }
}

/// Owns an opened reader and closes it when dropped.
///
/// Close runs exactly once, whether the owning scope returns normally,
/// returns early through `?`, or unwinds. Close failures are logged.
pub struct ReaderGuard {
    reader: Box<dyn ArchiveReader>,
}

impl ReaderGuard {
    pub fn new(reader: Box<dyn ArchiveReader>) -> Self {
        Self { reader }
    }
}

impl Deref for ReaderGuard {
    type Target = dyn ArchiveReader;

    fn deref(&self) -> &Self::Target {
        self.reader.as_ref()
    }
}

impl DerefMut for ReaderGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.reader.as_mut()
    }
}

impl Drop for ReaderGuard {
    fn drop(&mut self) {
        if let Err(e) = self.reader.close() {
            log::warn!("{}", e);
        }
    }
}

/// Returns the names in `names` matched by the glob `logical_path`.
pub fn match_entries(names: &[String], logical_path: &str) -> Result<Vec<String>> {
    let pattern = Pattern::new(logical_path)?;
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    Ok(names
        .iter()
        .filter(|name| pattern.matches_with(name, options))
        .cloned()
        .collect())
}

/// Picks the single match for `logical_path`, failing on zero or several.
pub(crate) fn unique_entry(names: &[String], logical_path: &str) -> Result<String> {
    let mut matches = match_entries(names, logical_path)?;
    match matches.len() {
        0 => Err(Error::EntryNotFound(logical_path.to_string())),
        1 => Ok(matches.remove(0)),
        count => Err(Error::AmbiguousEntry {
            pattern: logical_path.to_string(),
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingReader {
        closes: Arc<AtomicUsize>,
    }

    impl ArchiveReader for CountingReader {
        fn entry_names(&self) -> Vec<String> {
            vec!["A.xcarchive/Info.plist".to_string()]
        }

        fn read_entry(&mut self, logical_path: &str) -> Result<Vec<u8>> {
            Err(Error::EntryNotFound(logical_path.to_string()))
        }

        fn close(&mut self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Err(Error::Manifest("close failed".into()))
        }
    }

    fn names() -> Vec<String> {
        vec![
            "App.xcarchive/Info.plist".to_string(),
            "App.xcarchive/Products/Applications/App.app/Info.plist".to_string(),
            "App.xcarchive/Products/Applications/App.app/App".to_string(),
        ]
    }

    #[test]
    fn test_star_does_not_cross_separator() {
        let matches = match_entries(&names(), "*.xcarchive/Info.plist").unwrap();
        assert_eq!(matches, vec!["App.xcarchive/Info.plist".to_string()]);
    }

    #[test]
    fn test_nested_pattern() {
        let matches =
            match_entries(&names(), "*.xcarchive/Products/Applications/*.app/Info.plist").unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_unique_entry_not_found() {
        let result = unique_entry(&names(), "*.xcarchive/dSYMs/*");
        assert!(matches!(result, Err(Error::EntryNotFound(_))));
    }

    #[test]
    fn test_unique_entry_ambiguous() {
        let result = unique_entry(&names(), "*.xcarchive/Products/Applications/App.app/*");
        assert!(matches!(result, Err(Error::AmbiguousEntry { count: 2, .. })));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = match_entries(&names(), "[");
        assert!(matches!(result, Err(Error::Pattern(_))));
    }

    #[test]
    fn test_guard_closes_once_even_when_close_fails() {
        let closes = Arc::new(AtomicUsize::new(0));
        {
            let guard = ReaderGuard::new(Box::new(CountingReader {
                closes: Arc::clone(&closes),
            }));
            assert!(guard.has_entry("*.xcarchive/Info.plist"));
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zip_opener_missing_file() {
        let result = ZipOpener.open(Path::new("/nonexistent/App.xcarchive.zip"));
        assert!(result.is_err());
    }
}
