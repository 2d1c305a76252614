//! Structural platform classification of Xcode archives.
//!
//! The platform is decided from the archive layout, not from a manifest
//! field. A macOS application bundle keeps its manifest under
//! `Contents/Info.plist`; an iOS bundle keeps it at the bundle root.

use crate::archive::ArchiveReader;

/// Logical path of the archive-level manifest.
pub const ARCHIVE_INFO_PLIST: &str = "*.xcarchive/Info.plist";

/// Logical path of the manifest inside an iOS application bundle.
pub const IOS_APP_INFO_PLIST: &str = "*.xcarchive/Products/Applications/*.app/Info.plist";

/// Logical path of the manifest inside a macOS application bundle.
pub const MACOS_APP_INFO_PLIST: &str =
    "*.xcarchive/Products/Applications/*.app/Contents/Info.plist";

/// Platform an archive targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchivePlatform {
    /// Contains a macOS application bundle.
    Desktop,
    /// Contains an iOS application bundle.
    Mobile,
    /// Neither bundle layout was found.
    Unknown,
}

impl ArchivePlatform {
    pub fn is_desktop(&self) -> bool {
        matches!(self, ArchivePlatform::Desktop)
    }
}

/// Classify an opened archive by probing for the bundle manifests.
pub fn classify(reader: &dyn ArchiveReader) -> ArchivePlatform {
    if reader.has_entry(MACOS_APP_INFO_PLIST) {
        ArchivePlatform::Desktop
    } else if reader.has_entry(IOS_APP_INFO_PLIST) {
        ArchivePlatform::Mobile
    } else {
        ArchivePlatform::Unknown
    }
}

/// Returns `true` only for archives holding a macOS application.
///
/// Unclassifiable archives are reported as non-desktop.
pub fn is_desktop_target(reader: &dyn ArchiveReader) -> bool {
    classify(reader).is_desktop()
}
