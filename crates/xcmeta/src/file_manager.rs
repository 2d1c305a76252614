//! Filesystem queries used by the metadata extractor.

use std::fs;
use std::io;
use std::path::Path;

/// Filesystem operations the extractor depends on.
pub trait FileManager: Send + Sync {
    fn file_size_in_bytes(&self, path: &Path) -> io::Result<u64>;
}

/// [`FileManager`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileManager;

impl FileManager for OsFileManager {
    fn file_size_in_bytes(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }
}

/// Outcome of a best-effort size query.
///
/// Either `bytes` is set, or `warning` explains why it is not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeMeasurement {
    pub bytes: Option<u64>,
    pub warning: Option<String>,
}

impl SizeMeasurement {
    /// The measured size, or 0 when unmeasured.
    pub fn bytes_or_zero(&self) -> u64 {
        self.bytes.unwrap_or(0)
    }
}

/// Query the size of `path`, turning failure into a diagnostic.
pub fn measure_file_size(file_manager: &dyn FileManager, path: &Path) -> SizeMeasurement {
    match file_manager.file_size_in_bytes(path) {
        Ok(bytes) => SizeMeasurement {
            bytes: Some(bytes),
            warning: None,
        },
        Err(e) => SizeMeasurement {
            bytes: None,
            warning: Some(format!(
                "Failed to get archive size for {}, error: {}",
                path.display(),
                e
            )),
        },
    }
}
