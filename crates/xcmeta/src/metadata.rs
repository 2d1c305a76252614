//! Metadata extraction from zipped Xcode archives.
//!
//! [`MetadataParser`] opens an archive, rejects macOS archives, reads the
//! archive-level and application-level `Info.plist` manifests and merges the
//! fields it finds into one [`ArchiveMetadata`] record.
//!
//! # Pipeline
//!
//! 1. Open the archive ([`Error::OpenFailed`] on failure)
//! 2. Classify it ([`Error::UnsupportedPlatform`] for macOS)
//! 3. Read `*.xcarchive/Info.plist`
//! 4. Read `*.xcarchive/Products/Applications/*.app/Info.plist`
//! 5. Assemble fields; missing ones stay empty
//! 6. Measure the archive size, logging a warning on failure
//!
//! Manifest failures in steps 3 and 4 surface as [`Error::ManifestUnreadable`].
//! The archive is closed on every path once step 1 succeeds.
//!
//! # Examples
//!
//! ```no_run
//! use xcmeta::MetadataParser;
//!
//! let meta = MetadataParser::new().parse_xcarchive_data("MyApp.xcarchive.zip")?;
//! println!("{} {} ({})", meta.app_info().bundle_id, meta.app_info().version, meta.scheme());
//! # Ok::<(), xcmeta::metadata::ParseError>(())
//! ```

use crate::archive::{ArchiveOpener, ArchiveReader, ReaderGuard, ZipOpener};
use crate::file_manager::{measure_file_size, FileManager, OsFileManager};
use crate::platform::{classify, ArchivePlatform, ARCHIVE_INFO_PLIST, IOS_APP_INFO_PLIST};
use crate::plist_data::{PlistAccessor, PlistData};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Application identity read from the bundle's `Info.plist`.
///
/// Every field is optional in the manifest; absent fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppInfo {
    pub app_title: String,
    pub bundle_id: String,
    pub version: String,
    pub build_number: String,
    pub min_os_version: String,
    pub device_family_list: Vec<u64>,
}

impl AppInfo {
    /// Read the identity fields from an application manifest.
    pub fn from_manifest(manifest: &impl PlistAccessor) -> Self {
        Self {
            app_title: manifest.get_string("CFBundleName").unwrap_or_default(),
            bundle_id: manifest.get_string("CFBundleIdentifier").unwrap_or_default(),
            version: manifest
                .get_string("CFBundleShortVersionString")
                .unwrap_or_default(),
            build_number: manifest.get_string("CFBundleVersion").unwrap_or_default(),
            min_os_version: manifest.get_string("MinimumOSVersion").unwrap_or_default(),
            device_family_list: manifest.get_u64_array("UIDeviceFamily").unwrap_or_default(),
        }
    }

    /// Known device families, in manifest order. Unknown codes are skipped.
    pub fn device_families(&self) -> Vec<DeviceFamily> {
        self.device_family_list
            .iter()
            .filter_map(|code| DeviceFamily::from_code(*code))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == AppInfo::default()
    }
}

/// Hardware class named by a `UIDeviceFamily` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFamily {
    IPhone,
    IPad,
    AppleTv,
    AppleWatch,
    MacCatalyst,
    AppleVision,
}

impl DeviceFamily {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(DeviceFamily::IPhone),
            2 => Some(DeviceFamily::IPad),
            3 => Some(DeviceFamily::AppleTv),
            4 => Some(DeviceFamily::AppleWatch),
            6 => Some(DeviceFamily::MacCatalyst),
            7 => Some(DeviceFamily::AppleVision),
            _ => None,
        }
    }

}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceFamily::IPhone => "iPhone",
            DeviceFamily::IPad => "iPad",
            DeviceFamily::AppleTv => "Apple TV",
            DeviceFamily::AppleWatch => "Apple Watch",
            DeviceFamily::MacCatalyst => "Mac Catalyst",
            DeviceFamily::AppleVision => "Apple Vision",
        };
        f.write_str(name)
    }
}

/// Metadata extracted from one archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveMetadata {
    app_info: AppInfo,
    file_size_bytes: u64,
    scheme: String,
}

impl ArchiveMetadata {
    pub fn new(app_info: AppInfo, file_size_bytes: u64, scheme: impl Into<String>) -> Self {
        Self {
            app_info,
            file_size_bytes,
            scheme: scheme.into(),
        }
    }

    pub fn app_info(&self) -> &AppInfo {
        &self.app_info
    }

    /// Archive size on disk, 0 if it could not be measured.
    pub fn file_size_bytes(&self) -> u64 {
        self.file_size_bytes
    }

    /// Name of the scheme that produced the archive.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}

/// Extraction failure.
///
/// Carries the record assembled before the failure. For the fatal cases
/// (open, unsupported platform, unreadable manifest) its [`AppInfo`] is empty.
#[derive(Debug, thiserror::Error)]
#[error("failed to parse deployment info for {}", .path.display())]
pub struct ParseError {
    path: PathBuf,
    metadata: ArchiveMetadata,
    #[source]
    source: Error,
}

impl ParseError {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &ArchiveMetadata {
        &self.metadata
    }

    /// The underlying failure.
    pub fn source_error(&self) -> &Error {
        &self.source
    }

    pub fn is_unsupported_platform(&self) -> bool {
        self.source.is_unsupported_platform()
    }

    pub fn into_parts(self) -> (ArchiveMetadata, Error) {
        (self.metadata, self.source)
    }
}

/// Extracts [`ArchiveMetadata`] from zipped `.xcarchive` files.
///
/// Collaborators are configurable for tests and alternative storage:
///
/// ```no_run
/// use xcmeta::archive::ZipOpener;
/// use xcmeta::file_manager::OsFileManager;
/// use xcmeta::MetadataParser;
///
/// let parser = MetadataParser::new()
///     .opener(ZipOpener)
///     .file_manager(OsFileManager);
/// let meta = parser.parse_xcarchive_data("MyApp.xcarchive.zip")?;
/// # Ok::<(), xcmeta::metadata::ParseError>(())
/// ```
pub struct MetadataParser {
    opener: Box<dyn ArchiveOpener>,
    file_manager: Box<dyn FileManager>,
}

impl MetadataParser {
    /// Parser reading zip archives from the local filesystem.
    pub fn new() -> Self {
        Self {
            opener: Box::new(ZipOpener),
            file_manager: Box::new(OsFileManager),
        }
    }

    /// Set how archives are opened.
    pub fn opener(mut self, opener: impl ArchiveOpener + 'static) -> Self {
        self.opener = Box::new(opener);
        self
    }

    /// Set the filesystem used for size measurement.
    pub fn file_manager(mut self, file_manager: impl FileManager + 'static) -> Self {
        self.file_manager = Box::new(file_manager);
        self
    }

    /// Extract metadata from the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] wrapping [`Error::OpenFailed`],
    /// [`Error::UnsupportedPlatform`] or [`Error::ManifestUnreadable`].
    /// A failed size measurement is not an error.
    pub fn parse_xcarchive_data(
        &self,
        path: impl AsRef<Path>,
    ) -> std::result::Result<ArchiveMetadata, ParseError> {
        let path = path.as_ref();

        let (app_info, scheme) = self.read_deployment_meta(path).map_err(|source| ParseError {
            path: path.to_path_buf(),
            metadata: ArchiveMetadata::default(),
            source,
        })?;

        let size = measure_file_size(self.file_manager.as_ref(), path);
        if let Some(ref warning) = size.warning {
            log::warn!("{}", warning);
        }

        Ok(ArchiveMetadata {
            app_info,
            file_size_bytes: size.bytes_or_zero(),
            scheme,
        })
    }

    fn read_deployment_meta(&self, path: &Path) -> Result<(AppInfo, String)> {
        let reader = self.opener.open(path).map_err(|e| Error::OpenFailed {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        let mut reader = ReaderGuard::new(reader);

        match classify(&*reader) {
            ArchivePlatform::Desktop => return Err(Error::UnsupportedPlatform),
            ArchivePlatform::Unknown => log::warn!(
                "No application bundle layout recognized in {}, treating it as iOS",
                path.display()
            ),
            ArchivePlatform::Mobile => {}
        }

        let archive_info = read_manifest(&mut *reader, ARCHIVE_INFO_PLIST, "Info.plist")?;
        let app_info_plist =
            read_manifest(&mut *reader, IOS_APP_INFO_PLIST, "application Info.plist")?;

        let app_info = AppInfo::from_manifest(&app_info_plist);
        let scheme = archive_info.get_string("SchemeName").unwrap_or_default();
        log::debug!(
            "Read {} ({}) from {}",
            app_info.bundle_id,
            scheme,
            path.display()
        );

        Ok((app_info, scheme))
    }
}

impl Default for MetadataParser {
    fn default() -> Self {
        Self::new()
    }
}

fn read_manifest(
    reader: &mut dyn ArchiveReader,
    logical_path: &str,
    manifest: &'static str,
) -> Result<PlistData> {
    reader
        .read_entry(logical_path)
        .and_then(|data| PlistData::from_bytes(&data))
        .map_err(|e| Error::ManifestUnreadable {
            manifest,
            source: Box::new(e),
        })
}
