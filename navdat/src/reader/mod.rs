//! Format-specific readers for X-Plane data files.
//!
//! One reader exists per file format. The data source picks the format from
//! the filename alone, so every reader is reachable through
//! [`FileFormat::create_reader`]:
//!
//! | Filenames                    | Format            | Layers                              |
//! |------------------------------|-------------------|-------------------------------------|
//! | `nav.dat`, `earth_nav.dat`   | [`FileFormat::Nav`] | ILS, VOR, NDB, GS, Marker, DME, DMEILS |
//! | `apt.dat`                    | [`FileFormat::Apt`] | APT, runways, helipads, ATC, ...    |
//! | `fix.dat`, `earth_fix.dat`   | [`FileFormat::Fix`] | FIX                                 |
//! | `awy.dat`, `earth_awy.dat`   | [`FileFormat::Awy`] | AirwaySegment, AirwayIntersection   |
//!
//! # Reader lifecycle
//!
//! ```text
//! create_reader() ──► start_parsing(path, ds) ──► read_whole_file(layers)
//!                            │
//!                            └──► clone_for_layer(layer) ──► read_whole_file(layer)
//! ```
//!
//! `start_parsing` validates the header and registers the format's layers.
//! A clone is scoped to one layer kind and re-opens the file on its first
//! read.

mod apt;
mod awy;
mod fields;
mod fix;
mod lines;
mod nav;

use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::datasource::XPlaneDataSource;
use crate::error::{ReaderError, RecordError};
use crate::layer::{Layer, LayerKind, RecordSink};
use crate::record::Record;

use fields::Fields;
use lines::LineSource;

/// X-Plane data file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Nav,
    Apt,
    Fix,
    Awy,
}

impl FileFormat {
    /// Every supported format.
    pub const ALL: [FileFormat; 4] = [
        FileFormat::Nav,
        FileFormat::Apt,
        FileFormat::Fix,
        FileFormat::Awy,
    ];

    /// Classify a bare filename, ignoring ASCII case.
    pub fn from_filename(filename: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| {
            format
                .filenames()
                .iter()
                .any(|name| name.eq_ignore_ascii_case(filename))
        })
    }

    /// Classify a path by its final component.
    pub fn from_path(path: &Path) -> Option<Self> {
        let filename = path.file_name()?.to_str()?;
        Self::from_filename(filename)
    }

    /// Filenames recognised for this format.
    pub fn filenames(&self) -> &'static [&'static str] {
        match self {
            FileFormat::Nav => &["nav.dat", "earth_nav.dat"],
            FileFormat::Apt => &["apt.dat"],
            FileFormat::Fix => &["fix.dat", "earth_fix.dat"],
            FileFormat::Awy => &["awy.dat", "earth_awy.dat"],
        }
    }

    /// Layers this format registers, in registration order.
    pub fn layer_kinds(&self) -> &'static [LayerKind] {
        match self {
            FileFormat::Nav => &[
                LayerKind::Ils,
                LayerKind::Vor,
                LayerKind::Ndb,
                LayerKind::Glideslope,
                LayerKind::Marker,
                LayerKind::Dme,
                LayerKind::DmeIls,
            ],
            FileFormat::Apt => &[
                LayerKind::Airport,
                LayerKind::RunwayThreshold,
                LayerKind::WaterRunwayThreshold,
                LayerKind::Helipad,
                LayerKind::StartupLocation,
                LayerKind::LightBeacon,
                LayerKind::Windsock,
                LayerKind::AtcFreq,
            ],
            FileFormat::Fix => &[LayerKind::Fix],
            FileFormat::Awy => &[LayerKind::AirwaySegment, LayerKind::AirwayIntersection],
        }
    }

    /// Header version numbers the reader can decode.
    pub fn supported_versions(&self) -> &'static [u32] {
        match self {
            FileFormat::Nav => &[740, 810, 1100, 1150, 1200],
            FileFormat::Apt => &[850, 1000, 1050, 1100, 1130, 1200],
            FileFormat::Fix => &[600, 1100, 1101, 1200],
            FileFormat::Awy => &[640],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Nav => "nav",
            FileFormat::Apt => "apt",
            FileFormat::Fix => "fix",
            FileFormat::Awy => "awy",
        }
    }

    /// Construct a fresh, unstarted reader for this format.
    pub fn create_reader(&self) -> Box<dyn XPlaneReader> {
        match self {
            FileFormat::Nav => create_nav_reader(),
            FileFormat::Apt => create_apt_reader(),
            FileFormat::Fix => create_fix_reader(),
            FileFormat::Awy => create_awy_reader(),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parser for one X-Plane data file format.
///
/// # Contract
///
/// - `start_parsing` either succeeds and leaves the reader ready for
///   `read_whole_file`, or fails without registering anything it cannot
///   back with data.
/// - `read_whole_file` emits only records inside [`scope`](Self::scope).
/// - `clone_for_layer` returns an independent reader; the original is not
///   consumed.
pub trait XPlaneReader: fmt::Debug + Send {
    /// File format this reader decodes.
    fn format(&self) -> FileFormat;

    /// Layer kind this reader is restricted to, or `None` for every layer.
    fn scope(&self) -> Option<LayerKind>;

    /// File this reader is bound to, once known.
    fn path(&self) -> Option<&Path>;

    /// Open `path`, validate its header and register layers into `data_source`.
    fn start_parsing(
        &mut self,
        path: &Path,
        data_source: &mut XPlaneDataSource,
    ) -> Result<(), ReaderError>;

    /// Parse every remaining record into `sink`.
    fn read_whole_file(&mut self, sink: &mut dyn RecordSink) -> Result<(), ReaderError>;

    /// Independent reader of the same file, scoped to `layer`'s kind.
    fn clone_for_layer(&self, layer: &Layer) -> Box<dyn XPlaneReader>;
}

/// Create an unstarted `nav.dat` reader.
pub fn create_nav_reader() -> Box<dyn XPlaneReader> {
    Box::new(TextReader::<nav::NavParser>::new())
}

/// Create an unstarted `apt.dat` reader.
pub fn create_apt_reader() -> Box<dyn XPlaneReader> {
    Box::new(TextReader::<apt::AptParser>::new())
}

/// Create an unstarted `fix.dat` reader.
pub fn create_fix_reader() -> Box<dyn XPlaneReader> {
    Box::new(TextReader::<fix::FixParser>::new())
}

/// Create an unstarted `awy.dat` reader.
pub fn create_awy_reader() -> Box<dyn XPlaneReader> {
    Box::new(TextReader::<awy::AwyParser>::new())
}

// ============================================================================
// Line-oriented reader shared by all formats
// ============================================================================

/// Record decoder for one format's line grammar.
///
/// A parser instance lives for one pass over a file; cross-line state (the
/// current airport, seen airway intersections) is kept on it.
pub(crate) trait LineParser: Send + 'static {
    const FORMAT: FileFormat;

    fn new(version: u32) -> Self;

    /// Decode one non-empty line (other than the `99` terminator).
    fn parse_line(&mut self, fields: &Fields<'_>, out: &mut Emitter<'_>) -> Result<(), RecordError>;

    /// Flush state at end of data.
    fn finish(&mut self, _out: &mut Emitter<'_>) {}
}

/// Scope-filtering record output.
pub(crate) struct Emitter<'a> {
    sink: &'a mut dyn RecordSink,
    scope: Option<LayerKind>,
    emitted: usize,
}

impl<'a> Emitter<'a> {
    fn new(sink: &'a mut dyn RecordSink, scope: Option<LayerKind>) -> Self {
        Self {
            sink,
            scope,
            emitted: 0,
        }
    }

    /// Whether records of `kind` would be kept.
    pub(crate) fn wants(&self, kind: LayerKind) -> bool {
        self.scope.map_or(true, |scope| scope == kind)
    }

    pub(crate) fn emit(&mut self, record: Record) {
        if self.wants(record.kind()) {
            self.sink.accept(record);
            self.emitted += 1;
        }
    }
}

/// Reader for the line-based X-Plane formats.
pub(crate) struct TextReader<P: LineParser> {
    path: Option<PathBuf>,
    scope: Option<LayerKind>,
    source: Option<LineSource>,
    _parser: PhantomData<fn() -> P>,
}

impl<P: LineParser> TextReader<P> {
    pub(crate) fn new() -> Self {
        Self {
            path: None,
            scope: None,
            source: None,
            _parser: PhantomData,
        }
    }

    /// Parse records up to the `99` terminator or end of file.
    ///
    /// Blank lines are ignored. Malformed lines are logged, counted and
    /// skipped.
    fn read_records(&mut self, sink: &mut dyn RecordSink) -> Result<ReadSummary, ReaderError> {
        let mut source = match self.source.take() {
            Some(source) => source,
            None => {
                let path = self.path.as_deref().ok_or(ReaderError::NoPath)?;
                LineSource::open(path, P::FORMAT)?
            }
        };
        let path = source.path().to_path_buf();

        let mut parser = P::new(source.version());
        let mut out = Emitter::new(sink, self.scope);
        let mut skipped = 0usize;

        while let Some((line_number, line)) = source.next_line()? {
            let fields = Fields::new(line);
            if fields.is_empty() {
                continue;
            }
            if fields.str(0) == "99" {
                break;
            }
            if let Err(e) = parser.parse_line(&fields, &mut out) {
                skipped += 1;
                warn!(
                    path = %path.display(),
                    line = line_number,
                    error = %e,
                    "Skipping malformed record"
                );
            }
        }
        parser.finish(&mut out);

        Ok(ReadSummary {
            records: out.emitted,
            skipped,
        })
    }
}

/// Counts from one pass over a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReadSummary {
    records: usize,
    skipped: usize,
}

impl<P: LineParser> fmt::Debug for TextReader<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextReader")
            .field("format", &P::FORMAT)
            .field("path", &self.path)
            .field("scope", &self.scope)
            .field("started", &self.source.is_some())
            .finish()
    }
}

impl<P: LineParser> XPlaneReader for TextReader<P> {
    fn format(&self) -> FileFormat {
        P::FORMAT
    }

    fn scope(&self) -> Option<LayerKind> {
        self.scope
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn start_parsing(
        &mut self,
        path: &Path,
        data_source: &mut XPlaneDataSource,
    ) -> Result<(), ReaderError> {
        let source = LineSource::open(path, P::FORMAT)?;
        debug!(
            path = %path.display(),
            format = %P::FORMAT,
            version = source.version(),
            "Header accepted"
        );

        for kind in P::FORMAT.layer_kinds() {
            data_source.register_layer(Layer::new(*kind));
        }

        self.path = Some(path.to_path_buf());
        self.source = Some(source);
        Ok(())
    }

    fn read_whole_file(&mut self, sink: &mut dyn RecordSink) -> Result<(), ReaderError> {
        let summary = self.read_records(sink)?;
        info!(
            path = ?self.path,
            scope = ?self.scope,
            records = summary.records,
            skipped = summary.skipped,
            "Read complete"
        );
        Ok(())
    }

    fn clone_for_layer(&self, layer: &Layer) -> Box<dyn XPlaneReader> {
        Box::new(Self {
            path: self.path.clone(),
            scope: Some(layer.kind()),
            source: None,
            _parser: PhantomData,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Helpers for driving a parser over inline text.

    use super::*;

    /// Run parser `P` over `body` (record lines only, no header) through the
    /// same read loop as a real file. Returns the records kept by `scope`
    /// and the number of skipped lines.
    pub(crate) fn parse_body<P: LineParser>(
        version: u32,
        body: &str,
        scope: Option<LayerKind>,
    ) -> (Vec<Record>, usize) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(P::FORMAT.filenames()[0]);
        std::fs::write(&path, format!("I\n{} Version\n{}", version, body)).unwrap();

        let mut reader = TextReader::<P> {
            path: Some(path),
            scope,
            source: None,
            _parser: PhantomData,
        };
        let mut records: Vec<Record> = Vec::new();
        let summary = reader.read_records(&mut CollectSink(&mut records)).unwrap();
        assert_eq!(summary.records, records.len());
        (records, summary.skipped)
    }

    struct CollectSink<'a>(&'a mut Vec<Record>);

    impl RecordSink for CollectSink<'_> {
        fn accept(&mut self, record: Record) {
            self.0.push(record);
        }
    }
}
