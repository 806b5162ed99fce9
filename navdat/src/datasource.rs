//! The X-Plane data source: one opened file and the layers parsed from it.
//!
//! # Lifecycle
//!
//! ```text
//!            open(path)                    read_whole_file_if_necessary()
//! [empty] ─────────────► [open: layers] ─────────────────────────────► [open: layers filled]
//!    ▲                        │                                               │
//!    └──────── reset() ◄──────┴───────────────────────────────────────────────┘
//! ```
//!
//! `open` always starts with a [`reset`](XPlaneDataSource::reset), so a data
//! source can be reused for any number of files. Dropping it resets it too.
//!
//! # Parsing modes
//!
//! - **Whole file** (`read_whole_file = true`): the data source keeps one
//!   reader and fills every layer in a single pass the first time
//!   [`read_whole_file_if_necessary`](XPlaneDataSource::read_whole_file_if_necessary)
//!   runs.
//! - **Deferred** (`read_whole_file = false`): each layer receives its own
//!   reader, scoped to that layer, and parses on first access.
//!
//! [`load_layer`](XPlaneDataSource::load_layer) works in both modes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use crate::config::NavdatConfig;
use crate::layer::Layer;
use crate::reader::{FileFormat, XPlaneReader};

static NEXT_DATA_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a data source.
///
/// Layers hold this instead of a reference to the data source that owns
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataSourceId(u64);

impl DataSourceId {
    fn next() -> Self {
        DataSourceId(NEXT_DATA_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Aeronautical data source backed by one X-Plane `.dat` file.
#[derive(Debug)]
pub struct XPlaneDataSource {
    id: DataSourceId,
    name: Option<PathBuf>,
    layers: Vec<Layer>,
    reader: Option<Box<dyn XPlaneReader>>,
    read_whole_file: bool,
    whole_file_read_done: bool,
}

impl XPlaneDataSource {
    /// Create an empty data source.
    pub fn new() -> Self {
        Self {
            id: DataSourceId::next(),
            name: None,
            layers: Vec::new(),
            reader: None,
            read_whole_file: false,
            whole_file_read_done: false,
        }
    }

    /// Open `path`, choosing the reader from the filename.
    ///
    /// Returns `false` when the filename is not one of the recognised X-Plane
    /// data files or when the reader rejects the file. Either way the data
    /// source is left empty.
    pub fn open(&mut self, path: impl AsRef<Path>, read_whole_file: bool) -> bool {
        let path = path.as_ref();
        self.reset();

        let Some(format) = FileFormat::from_path(path) else {
            debug!(path = %path.display(), "Not an X-Plane data file name");
            return false;
        };
        debug!(path = %path.display(), format = %format, "Selected reader");

        self.attach(path, read_whole_file, format.create_reader())
    }

    /// Open `path` with a caller-supplied reader, skipping filename dispatch.
    pub fn open_with_reader(
        &mut self,
        path: impl AsRef<Path>,
        read_whole_file: bool,
        reader: Box<dyn XPlaneReader>,
    ) -> bool {
        self.reset();
        self.attach(path.as_ref(), read_whole_file, reader)
    }

    /// Open `path` using the parsing mode from `config`.
    pub fn open_with_config(&mut self, path: impl AsRef<Path>, config: &NavdatConfig) -> bool {
        self.open(path, config.reader.read_whole_file)
    }

    fn attach(
        &mut self,
        path: &Path,
        read_whole_file: bool,
        mut reader: Box<dyn XPlaneReader>,
    ) -> bool {
        self.read_whole_file = read_whole_file;

        if let Err(e) = reader.start_parsing(path, self) {
            warn!(path = %path.display(), error = %e, "Failed to open data file");
            self.reset();
            return false;
        }

        self.name = Some(path.to_path_buf());
        if !read_whole_file {
            for layer in &mut self.layers {
                let layer_reader = reader.clone_for_layer(layer);
                layer.set_reader(layer_reader);
            }
        }

        info!(
            path = %path.display(),
            format = %reader.format(),
            layers = self.layers.len(),
            read_whole_file,
            "Opened data file"
        );
        self.reader = Some(reader);
        true
    }

    /// Append `layer`, binding it to this data source. Called by readers.
    pub fn register_layer(&mut self, mut layer: Layer) {
        layer.set_data_source(self.id);
        self.layers.push(layer);
    }

    pub fn id(&self) -> DataSourceId {
        self.id
    }

    /// Path of the opened file; `None` when nothing is open.
    pub fn name(&self) -> Option<&Path> {
        self.name.as_deref()
    }

    /// The data source's own reader, present only while a file is open.
    pub fn reader(&self) -> Option<&dyn XPlaneReader> {
        self.reader.as_deref()
    }

    /// Parsing mode of the current open cycle.
    pub fn reads_whole_file(&self) -> bool {
        self.read_whole_file
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Layer at `index` in registration order.
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Mutable layer at `index`, for iteration.
    ///
    /// In whole-file mode the file is parsed first, so the layer is never
    /// seen half-empty. Deferred layers load themselves on first
    /// [`Layer::next_feature`].
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        if index >= self.layers.len() {
            return None;
        }
        self.read_whole_file_if_necessary();
        self.layers.get_mut(index)
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.iter()
    }

    /// First layer whose name matches `name`, ignoring ASCII case.
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|layer| layer.name().eq_ignore_ascii_case(name))
    }

    /// In whole-file mode, parse the file into every layer the first time
    /// this is called. Later calls, and calls in deferred mode, do nothing.
    ///
    /// A read that fails part-way keeps the records parsed so far and is not
    /// retried.
    pub fn read_whole_file_if_necessary(&mut self) {
        if !self.read_whole_file || self.whole_file_read_done {
            return;
        }
        let Some(reader) = self.reader.as_mut() else {
            return;
        };

        if let Err(e) = reader.read_whole_file(&mut self.layers) {
            warn!(error = %e, "Whole-file read stopped early");
        }
        for layer in &mut self.layers {
            layer.auto_adjust_columns_width();
            layer.mark_complete();
        }
        self.whole_file_read_done = true;
    }

    /// Layer at `index`, fully populated in either parsing mode.
    pub fn load_layer(&mut self, index: usize) -> Option<&mut Layer> {
        if index >= self.layers.len() {
            return None;
        }
        self.read_whole_file_if_necessary();

        let layer = self.layers.get_mut(index)?;
        layer.load();
        Some(layer)
    }

    /// Release the reader and every layer and forget the opened file.
    pub fn reset(&mut self) {
        self.reader = None;
        self.name = None;
        self.layers.clear();
        self.read_whole_file = false;
        self.whole_file_read_done = false;
    }

    /// No optional capabilities are supported.
    pub fn test_capability(&self, _capability: &str) -> bool {
        false
    }
}

impl Default for XPlaneDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for XPlaneDataSource {
    fn drop(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReaderError;
    use crate::layer::{LayerKind, RecordSink};
    use crate::record::{FixRecord, Record};
    use proptest::prelude::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    /// Reader that registers a fixed set of layers and emits one fix per read.
    #[derive(Debug)]
    struct CountingReader {
        kinds: Vec<LayerKind>,
        fail_start: bool,
        reads: Arc<AtomicUsize>,
        scope: Option<LayerKind>,
        path: Option<PathBuf>,
    }

    impl CountingReader {
        fn boxed(kinds: &[LayerKind], reads: &Arc<AtomicUsize>) -> Box<dyn XPlaneReader> {
            Box::new(Self {
                kinds: kinds.to_vec(),
                fail_start: false,
                reads: Arc::clone(reads),
                scope: None,
                path: None,
            })
        }

        fn failing(kinds: &[LayerKind]) -> Box<dyn XPlaneReader> {
            Box::new(Self {
                kinds: kinds.to_vec(),
                fail_start: true,
                reads: Arc::new(AtomicUsize::new(0)),
                scope: None,
                path: None,
            })
        }
    }

    impl XPlaneReader for CountingReader {
        fn format(&self) -> FileFormat {
            FileFormat::Fix
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
            // Registers before failing so the data source has to clean up.
            for kind in &self.kinds {
                data_source.register_layer(Layer::new(*kind));
            }
            if self.fail_start {
                return Err(ReaderError::MissingHeader {
                    path: path.to_path_buf(),
                });
            }
            self.path = Some(path.to_path_buf());
            Ok(())
        }

        fn read_whole_file(&mut self, sink: &mut dyn RecordSink) -> Result<(), ReaderError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            sink.accept(Record::Fix(FixRecord {
                fix_name: "ABBOT".to_string(),
                lat: 51.0,
                lon: -0.5,
            }));
            Ok(())
        }

        fn clone_for_layer(&self, layer: &Layer) -> Box<dyn XPlaneReader> {
            Box::new(Self {
                kinds: Vec::new(),
                fail_start: false,
                reads: Arc::clone(&self.reads),
                scope: Some(layer.kind()),
                path: self.path.clone(),
            })
        }
    }

    fn reader_addr(reader: &dyn XPlaneReader) -> *const () {
        reader as *const dyn XPlaneReader as *const ()
    }

    #[test]
    fn test_new_data_source_is_empty() {
        let ds = XPlaneDataSource::new();
        assert_eq!(ds.layer_count(), 0);
        assert!(ds.name().is_none());
        assert!(ds.reader().is_none());
        assert!(ds.layer(0).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = XPlaneDataSource::new();
        let b = XPlaneDataSource::default();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_whole_file_read_runs_once() {
        let reads = Arc::new(AtomicUsize::new(0));
        let mut ds = XPlaneDataSource::new();
        assert!(ds.open_with_reader(
            "/data/fix.dat",
            true,
            CountingReader::boxed(&[LayerKind::Fix], &reads)
        ));

        ds.read_whole_file_if_necessary();
        ds.read_whole_file_if_necessary();
        assert_eq!(reads.load(Ordering::SeqCst), 1);

        let layer = ds.layer(0).unwrap();
        assert_eq!(layer.feature_count(), 1);
        assert!(layer.is_complete());
        assert_eq!(layer.fields()[0].width, 5);

        // load_layer does not trigger another pass.
        assert!(ds.load_layer(0).is_some());
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_layer_mut_reads_whole_file_first() {
        let reads = Arc::new(AtomicUsize::new(0));
        let mut ds = XPlaneDataSource::new();
        assert!(ds.open_with_reader(
            "/data/fix.dat",
            true,
            CountingReader::boxed(&[LayerKind::Fix], &reads)
        ));

        let layer = ds.layer_mut(0).unwrap();
        assert!(layer.is_complete());
        assert!(layer.next_feature().is_some());
        assert!(layer.next_feature().is_none());

        assert!(ds.layer_mut(0).is_some());
        assert!(ds.layer_mut(1).is_none());
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_start_leaves_data_source_empty() {
        let mut ds = XPlaneDataSource::new();
        let opened = ds.open_with_reader(
            "/data/fix.dat",
            true,
            CountingReader::failing(&[LayerKind::Fix, LayerKind::AirwaySegment]),
        );
        assert!(!opened);
        assert_eq!(ds.layer_count(), 0);
        assert!(ds.name().is_none());
        assert!(ds.reader().is_none());
        assert!(!ds.reads_whole_file());
    }

    #[test]
    fn test_layers_keep_registration_order_and_binding() {
        let reads = Arc::new(AtomicUsize::new(0));
        let kinds = [LayerKind::Vor, LayerKind::Fix, LayerKind::Ils];
        let mut ds = XPlaneDataSource::new();
        assert!(ds.open_with_reader("/data/x.dat", true, CountingReader::boxed(&kinds, &reads)));

        let names: Vec<&str> = ds.layers().map(|layer| layer.name()).collect();
        assert_eq!(names, vec!["VOR", "FIX", "ILS"]);
        assert!(ds.layers().all(|layer| layer.data_source() == Some(ds.id())));
        assert_eq!(ds.name(), Some(Path::new("/data/x.dat")));

        assert_eq!(ds.layer_by_name("fix").map(|l| l.kind()), Some(LayerKind::Fix));
        assert!(ds.layer_by_name("NDB").is_none());
    }

    #[test]
    fn test_unrecognised_filename_is_rejected() {
        let mut ds = XPlaneDataSource::new();
        assert!(!ds.open("/data/random.dat", true));
        assert_eq!(ds.layer_count(), 0);
        assert!(ds.reader().is_none());
    }

    #[test]
    fn test_reset_is_repeatable() {
        let mut ds = XPlaneDataSource::new();
        ds.reset();
        ds.reset();
        assert_eq!(ds.layer_count(), 0);

        let reads = Arc::new(AtomicUsize::new(0));
        ds.open_with_reader("/data/fix.dat", true, CountingReader::boxed(&[LayerKind::Fix], &reads));
        ds.reset();
        ds.reset();
        assert_eq!(ds.layer_count(), 0);
        assert!(ds.name().is_none());
        assert!(ds.reader().is_none());
    }

    #[test]
    fn test_reopen_leaves_no_residue() {
        let reads = Arc::new(AtomicUsize::new(0));
        let mut ds = XPlaneDataSource::new();
        ds.open_with_reader(
            "/data/nav.dat",
            true,
            CountingReader::boxed(&[LayerKind::Vor, LayerKind::Ndb], &reads),
        );
        ds.read_whole_file_if_necessary();

        ds.open_with_reader(
            "/data/fix.dat",
            true,
            CountingReader::boxed(&[LayerKind::Fix], &reads),
        );
        assert_eq!(ds.layer_count(), 1);
        assert_eq!(ds.layer(0).unwrap().feature_count(), 0);
        assert_eq!(ds.name(), Some(Path::new("/data/fix.dat")));

        // The done flag was cleared by the reopen.
        ds.read_whole_file_if_necessary();
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_deferred_mode_gives_each_layer_its_own_reader() {
        let reads = Arc::new(AtomicUsize::new(0));
        let mut ds = XPlaneDataSource::new();
        assert!(ds.open_with_reader(
            "/data/fix.dat",
            false,
            CountingReader::boxed(&[LayerKind::Vor, LayerKind::Fix], &reads),
        ));

        let own = reader_addr(ds.reader().unwrap());
        let first = ds.layer(0).unwrap().reader().unwrap();
        let second = ds.layer(1).unwrap().reader().unwrap();
        assert_eq!(first.scope(), Some(LayerKind::Vor));
        assert_eq!(second.scope(), Some(LayerKind::Fix));
        assert_ne!(reader_addr(first), reader_addr(second));
        assert_ne!(reader_addr(first), own);
        assert_ne!(reader_addr(second), own);

        // The data-source level read is a no-op in deferred mode.
        ds.read_whole_file_if_necessary();
        assert_eq!(reads.load(Ordering::SeqCst), 0);

        let fix = ds.load_layer(1).unwrap();
        assert_eq!(fix.feature_count(), 1);
        assert!(fix.is_complete());
        assert_eq!(reads.load(Ordering::SeqCst), 1);

        ds.load_layer(1);
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(ds.layer(0).unwrap().feature_count(), 0);
    }

    #[test]
    fn test_no_capabilities() {
        let ds = XPlaneDataSource::new();
        assert!(!ds.test_capability("CreateLayer"));
        assert!(!ds.test_capability(""));
    }

    proptest! {
        #[test]
        fn prop_out_of_range_lookup_is_none(count in 0usize..4, extra in 0usize..1000) {
            let all = [LayerKind::Vor, LayerKind::Ndb, LayerKind::Dme, LayerKind::Fix];
            let reads = Arc::new(AtomicUsize::new(0));
            let mut ds = XPlaneDataSource::new();
            ds.open_with_reader("/data/x.dat", true, CountingReader::boxed(&all[..count], &reads));

            prop_assert_eq!(ds.layer_count(), count);
            prop_assert!(ds.layer(count + extra).is_none());
            prop_assert!(ds.load_layer(count + extra).is_none());
        }
    }
}
