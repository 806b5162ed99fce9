//! Error types for X-Plane data file reading.
//!
//! Two levels of failure exist:
//!
//! - [`ReaderError`] - the file as a whole cannot be read (I/O failure or a
//!   header the reader does not understand). Returned by
//!   [`XPlaneReader::start_parsing`](crate::reader::XPlaneReader::start_parsing)
//!   and [`XPlaneReader::read_whole_file`](crate::reader::XPlaneReader::read_whole_file).
//! - [`RecordError`] - a single record line is malformed. Readers log these
//!   and skip the line; they never abort a read.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::reader::FileFormat;

/// Errors that prevent a reader from parsing a file.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The file could not be opened or read.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file ended before the two header lines were read.
    #[error("{}: missing file header", path.display())]
    MissingHeader { path: PathBuf },

    /// The first line is not the `I` or `A` origin marker.
    #[error("{}: unexpected origin line '{line}', expected 'I' or 'A'", path.display())]
    BadOrigin { path: PathBuf, line: String },

    /// The second line does not start with `<number> Version`.
    #[error("{}: malformed version line '{line}'", path.display())]
    MalformedVersion { path: PathBuf, line: String },

    /// The version is not one this reader can decode.
    #[error("{}: unsupported {format} file version {version}", path.display())]
    UnsupportedVersion {
        path: PathBuf,
        format: FileFormat,
        version: u32,
    },

    /// The reader was asked to read before it knew which file to read.
    #[error("reader has no file path; start_parsing was never called")]
    NoPath,
}

impl ReaderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReaderError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors for a single malformed record line.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    /// The line has fewer whitespace-separated tokens than the record needs.
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    /// A token could not be converted to the field's type.
    #[error("invalid {field} value '{value}'")]
    InvalidValue { field: &'static str, value: String },

    /// Latitude or longitude outside [-90, 90] / [-180, 180].
    #[error("coordinate out of range: ({lat}, {lon})")]
    CoordinateOutOfRange { lat: f64, lon: f64 },

    /// An airport sub-record (runway, frequency, ...) before any airport header.
    #[error("row code {0} appears outside of an airport definition")]
    OutsideAirport(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_error_display_includes_path() {
        let err = ReaderError::BadOrigin {
            path: PathBuf::from("/data/nav.dat"),
            line: "X".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "/data/nav.dat: unexpected origin line 'X', expected 'I' or 'A'"
        );
    }

    #[test]
    fn test_unsupported_version_display() {
        let err = ReaderError::UnsupportedVersion {
            path: PathBuf::from("apt.dat"),
            format: FileFormat::Apt,
            version: 715,
        };
        assert_eq!(err.to_string(), "apt.dat: unsupported apt file version 715");
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error;

        let err = ReaderError::io(
            "fix.dat",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().contains("fix.dat"));
    }

    #[test]
    fn test_record_error_display() {
        let err = RecordError::TooFewFields {
            expected: 9,
            found: 4,
        };
        assert_eq!(err.to_string(), "expected at least 9 fields, found 4");

        let err = RecordError::InvalidValue {
            field: "latitude",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "invalid latitude value 'abc'");
    }
}
