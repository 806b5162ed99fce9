//! Line access to an X-Plane data file, past its two-line header.
//!
//! Every supported file starts with:
//!
//! ```text
//! I
//! 1100 Version - data cycle 2401, build 20231206, metadata NavXP1100.
//! ```
//!
//! The first line is the origin marker (`I` for PC line endings, `A` for
//! Mac). The second begins with the format version number.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::FileFormat;
use crate::error::ReaderError;

/// Version line pattern: `<digits> Version ...`.
fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // (\d+)       - version number
        // \s+version  - literal keyword, any case
        Regex::new(r"(?i)^(\d+)\s+version\b").expect("version pattern is valid")
    })
}

/// Parse the version number out of a header line.
pub(crate) fn parse_version_line(line: &str) -> Option<u32> {
    let captures = version_pattern().captures(line.trim())?;
    captures.get(1)?.as_str().parse().ok()
}

/// Buffered line reader positioned after a validated header.
pub(crate) struct LineSource {
    path: PathBuf,
    reader: BufReader<File>,
    raw: Vec<u8>,
    line: String,
    line_number: usize,
    version: u32,
}

impl LineSource {
    /// Open `path` and validate its header against `format`.
    pub(crate) fn open(path: &Path, format: FileFormat) -> Result<Self, ReaderError> {
        let file = File::open(path).map_err(|e| ReaderError::io(path, e))?;
        let mut source = Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            raw: Vec::new(),
            line: String::new(),
            line_number: 0,
            version: 0,
        };

        let origin = source
            .read_raw_line()?
            .ok_or_else(|| ReaderError::MissingHeader {
                path: path.to_path_buf(),
            })?
            .to_string();
        if !origin.eq_ignore_ascii_case("I") && !origin.eq_ignore_ascii_case("A") {
            return Err(ReaderError::BadOrigin {
                path: path.to_path_buf(),
                line: origin,
            });
        }

        let version_line = source
            .read_raw_line()?
            .ok_or_else(|| ReaderError::MissingHeader {
                path: path.to_path_buf(),
            })?
            .to_string();
        let version =
            parse_version_line(&version_line).ok_or_else(|| ReaderError::MalformedVersion {
                path: path.to_path_buf(),
                line: version_line.clone(),
            })?;
        if !format.supported_versions().contains(&version) {
            return Err(ReaderError::UnsupportedVersion {
                path: path.to_path_buf(),
                format,
                version,
            });
        }

        source.version = version;
        Ok(source)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn version(&self) -> u32 {
        self.version
    }

    /// Next line with its 1-based line number, trimmed. `None` at EOF.
    pub(crate) fn next_line(&mut self) -> Result<Option<(usize, &str)>, ReaderError> {
        if self.read_raw_line()?.is_none() {
            return Ok(None);
        }
        Ok(Some((self.line_number, self.line.as_str())))
    }

    fn read_raw_line(&mut self) -> Result<Option<&str>, ReaderError> {
        self.raw.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.raw)
            .map_err(|e| ReaderError::io(&self.path, e))?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        // Airport names are not always valid UTF-8.
        self.line = String::from_utf8_lossy(&self.raw).trim().to_string();
        Ok(Some(self.line.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[test]
    fn test_parse_version_line() {
        assert_eq!(parse_version_line("810 Version - DAFIF data"), Some(810));
        assert_eq!(parse_version_line("1100 version"), Some(1100));
        assert_eq!(parse_version_line("  640 Version"), Some(640));
        assert_eq!(parse_version_line("Version 810"), None);
        assert_eq!(parse_version_line("810Version"), None);
        assert_eq!(parse_version_line(""), None);
    }

    #[test]
    fn test_open_valid_header_and_read_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "fix.dat",
            b"I\n600 Version - data cycle\n\n 37.5 -122.0 ABBOT \n99\n",
        );

        let mut source = LineSource::open(&path, FileFormat::Fix).unwrap();
        assert_eq!(source.version(), 600);
        assert_eq!(source.next_line().unwrap(), Some((3, "")));
        assert_eq!(source.next_line().unwrap(), Some((4, "37.5 -122.0 ABBOT")));
        assert_eq!(source.next_line().unwrap(), Some((5, "99")));
        assert_eq!(source.next_line().unwrap(), None);
    }

    #[test]
    fn test_mac_origin_accepted() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(&dir, "fix.dat", b"A\r\n600 Version\r\n");
        assert!(LineSource::open(&path, FileFormat::Fix).is_ok());
    }

    #[test]
    fn test_empty_file_is_missing_header() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(&dir, "fix.dat", b"");
        let err = LineSource::open(&path, FileFormat::Fix).err().unwrap();
        assert!(matches!(err, ReaderError::MissingHeader { .. }));
    }

    #[test]
    fn test_truncated_header_is_missing_header() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(&dir, "apt.dat", b"I\n");
        let err = LineSource::open(&path, FileFormat::Apt).err().unwrap();
        assert!(matches!(err, ReaderError::MissingHeader { .. }));
    }

    #[test]
    fn test_bad_origin_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(&dir, "nav.dat", b"X\n810 Version\n");
        let err = LineSource::open(&path, FileFormat::Nav).err().unwrap();
        assert!(matches!(err, ReaderError::BadOrigin { .. }));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(&dir, "awy.dat", b"I\n1100 Version\n");
        let err = LineSource::open(&path, FileFormat::Awy).err().unwrap();
        assert!(matches!(
            err,
            ReaderError::UnsupportedVersion { version: 1100, .. }
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = LineSource::open(&dir.path().join("nav.dat"), FileFormat::Nav)
            .err()
            .unwrap();
        assert!(matches!(err, ReaderError::Io { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(&dir, "apt.dat", b"I\n1100 Version\n1 0 0 0 LFXX Caf\xe9\n");
        let mut source = LineSource::open(&path, FileFormat::Apt).unwrap();
        let (_, line) = source.next_line().unwrap().unwrap();
        assert!(line.starts_with("1 0 0 0 LFXX Caf"));
    }
}
