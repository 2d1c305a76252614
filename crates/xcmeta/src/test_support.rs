//! Fixtures shared by unit tests.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const PLIST_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
"#;

const PLIST_FOOTER: &str = "</dict>\n</plist>\n";

/// Archive-level Info.plist naming `scheme`.
pub fn archive_info_plist(scheme: &str) -> String {
    format!(
        "{PLIST_HEADER}    <key>ArchiveVersion</key>\n    <integer>2</integer>\n    <key>Name</key>\n    <string>{scheme}</string>\n    <key>SchemeName</key>\n    <string>{scheme}</string>\n{PLIST_FOOTER}"
    )
}

/// Application Info.plist with the given string keys and device families.
pub fn app_info_plist(strings: &[(&str, &str)], device_families: Option<&[u64]>) -> String {
    let mut body = String::from(PLIST_HEADER);
    for (key, value) in strings {
        body.push_str(&format!("    <key>{key}</key>\n    <string>{value}</string>\n"));
    }
    if let Some(families) = device_families {
        body.push_str("    <key>UIDeviceFamily</key>\n    <array>\n");
        for family in families {
            body.push_str(&format!("        <integer>{family}</integer>\n"));
        }
        body.push_str("    </array>\n");
    }
    body.push_str(PLIST_FOOTER);
    body
}

/// Write a zip holding `entries` (name, contents) into `dir`.
pub fn write_zip(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    let options = SimpleFileOptions::default();

    for (entry_name, contents) in entries {
        zip.start_file(*entry_name, options).unwrap();
        zip.write_all(contents).unwrap();
    }

    zip.finish().unwrap();
    path
}

/// Overwrite the uncompressed size the central directory records for `entry`.
///
/// The entry data is untouched, so the archive still opens but lies about
/// how large `entry` is.
pub fn declare_entry_size(path: &Path, entry: &str, size: u32) {
    let mut bytes = fs::read(path).unwrap();
    let read_u16 = |b: &[u8], at: usize| u16::from_le_bytes([b[at], b[at + 1]]) as usize;
    let read_u32 =
        |b: &[u8], at: usize| u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]]) as usize;

    let eocd = bytes
        .windows(4)
        .rposition(|w| w == b"PK\x05\x06")
        .unwrap();
    let mut offset = read_u32(&bytes, eocd + 16);

    while bytes[offset..offset + 4] == *b"PK\x01\x02" {
        let name_len = read_u16(&bytes, offset + 28);
        let extra_len = read_u16(&bytes, offset + 30);
        let comment_len = read_u16(&bytes, offset + 32);
        let name = &bytes[offset + 46..offset + 46 + name_len];

        if name == entry.as_bytes() {
            bytes[offset + 24..offset + 28].copy_from_slice(&size.to_le_bytes());
            fs::write(path, bytes).unwrap();
            return;
        }
        offset += 46 + name_len + extra_len + comment_len;
    }
    panic!("no central directory entry named {entry}");
}

/// Zipped iOS archive for `com.example.app` 2.3.0 (41), scheme `Release`.
pub fn ios_archive(dir: &Path) -> PathBuf {
    let archive_plist = archive_info_plist("Release");
    let app_plist = app_info_plist(
        &[
            ("CFBundleName", "Example"),
            ("CFBundleIdentifier", "com.example.app"),
            ("CFBundleShortVersionString", "2.3.0"),
            ("CFBundleVersion", "41"),
            ("MinimumOSVersion", "15.0"),
        ],
        Some(&[1, 2]),
    );

    let path = dir.join("Example.xcarchive.zip");
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    let options = SimpleFileOptions::default();

    zip.add_directory("Example.xcarchive/", options).unwrap();
    zip.add_directory("Example.xcarchive/Products/Applications/Example.app/", options)
        .unwrap();
    zip.start_file("Example.xcarchive/Info.plist", options).unwrap();
    zip.write_all(archive_plist.as_bytes()).unwrap();
    zip.start_file(
        "Example.xcarchive/Products/Applications/Example.app/Info.plist",
        options,
    )
    .unwrap();
    zip.write_all(app_plist.as_bytes()).unwrap();
    zip.start_file("Example.xcarchive/Products/Applications/Example.app/Example", options)
        .unwrap();
    zip.write_all(b"MACHO_PLACEHOLDER").unwrap();

    zip.finish().unwrap();
    path
}

/// Zipped macOS archive.
pub fn macos_archive(dir: &Path) -> PathBuf {
    let archive_plist = archive_info_plist("Release");
    let app_plist = app_info_plist(&[("CFBundleIdentifier", "com.example.mac")], None);

    write_zip(
        dir,
        "Mac.xcarchive.zip",
        &[
            ("Mac.xcarchive/Info.plist", archive_plist.as_bytes()),
            (
                "Mac.xcarchive/Products/Applications/Mac.app/Contents/Info.plist",
                app_plist.as_bytes(),
            ),
            (
                "Mac.xcarchive/Products/Applications/Mac.app/Contents/MacOS/Mac",
                b"MACHO_PLACEHOLDER".as_slice(),
            ),
        ],
    )
}

static LOGS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
static LOGGER: CaptureLogger = CaptureLogger;

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut logs) = LOGS.lock() {
            logs.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

/// Route `log` records into memory for the rest of the test run.
pub fn init_capture_logger() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
}

pub fn captured_logs() -> Vec<(Level, String)> {
    LOGS.lock().unwrap().clone()
}
