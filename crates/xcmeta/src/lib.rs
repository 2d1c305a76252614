pub mod archive;
pub mod error;
pub mod file_manager;
pub mod metadata;
pub mod platform;
pub mod plist_data;
pub mod signing;

#[cfg(test)]
pub(crate) mod test_support;

pub use archive::{ArchiveReader, ZipArchiveReader};
pub use error::Error;
pub use metadata::{AppInfo, ArchiveMetadata, DeviceFamily, MetadataParser, ParseError};
pub use platform::ArchivePlatform;
pub use plist_data::{PlistAccessor, PlistData};
pub use signing::{collect_signing_details, AppLayout, DetailsProvider, Platform};

pub type Result<T> = std::result::Result<T, Error>;
