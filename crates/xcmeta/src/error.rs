//! Error types for xcmeta operations.
//!
//! This module defines the [`enum@Error`] enum covering all failure cases
//! when opening archives, reading manifests and querying signing details.
//!
//! # See Also
//!
//! - [`crate::Result`] - Convenience type alias using this error
//! - [`crate::metadata::ParseError`] - Extraction failure carrying the partial record

use std::path::PathBuf;
use thiserror::Error;

/// Error type for xcmeta operations.
///
/// Match on variants to handle specific failure cases. The three fatal
/// extraction outcomes are [`Error::OpenFailed`], [`Error::UnsupportedPlatform`]
/// and [`Error::ManifestUnreadable`].
///
/// # Examples
///
/// ```no_run
/// use xcmeta::{Error, MetadataParser};
///
/// match MetadataParser::new().parse_xcarchive_data("MyApp.xcarchive.zip") {
///     Ok(meta) => println!("{}", meta.app_info().bundle_id),
///     Err(e) if matches!(e.source_error(), Error::UnsupportedPlatform) => {
///         eprintln!("skipping macOS archive")
///     }
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// The archive could not be opened.
    ///
    /// Covers missing files, unreadable files and corrupt zip framing.
    #[error("failed to open archive {}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// The archive contains a macOS application.
    #[error("macOS project is not supported")]
    UnsupportedPlatform,

    /// A required manifest is missing or malformed.
    #[error("failed to unwrap {manifest} from xcarchive")]
    ManifestUnreadable {
        manifest: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// No archive entry matched the requested logical path.
    #[error("no file found with pattern: {0}")]
    EntryNotFound(String),

    /// An entry declares a size larger than [`crate::archive::MAX_ENTRY_SIZE`].
    #[error("entry {name} is too large ({size} bytes)")]
    EntryTooLarge { name: String, size: u64 },

    /// More than one archive entry matched the requested logical path.
    #[error("{count} files found with pattern: {pattern}")]
    AmbiguousEntry { pattern: String, count: usize },

    /// The logical path is not a valid glob pattern.
    #[error("invalid entry pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A property list parsed but does not have the expected shape.
    #[error("Invalid manifest: {0}")]
    Manifest(String),

    /// A signing detail could not be determined.
    #[error("Signing details unavailable: {0}")]
    Signing(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Property list parsing failed.
    #[error("Plist error: {0}")]
    Plist(#[from] plist::Error),

    /// ZIP archive operation failed.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    /// Returns `true` for [`Error::UnsupportedPlatform`].
    pub fn is_unsupported_platform(&self) -> bool {
        matches!(self, Error::UnsupportedPlatform)
    }
}
