//! Layers: homogeneous collections of parsed records.
//!
//! A [`Layer`] holds every record of one [`LayerKind`] found in a data file.
//! Layers are created by readers and owned by an
//! [`XPlaneDataSource`](crate::datasource::XPlaneDataSource).
//!
//! # Population
//!
//! In whole-file mode the data source fills every layer in one pass and then
//! marks them complete. In deferred mode each layer owns a private reader
//! scoped to its kind and parses on first [`Layer::load`] or
//! [`Layer::next_feature`].

use std::fmt;

use tracing::{info, warn};

use crate::datasource::DataSourceId;
use crate::reader::XPlaneReader;
use crate::record::{
    AirportRecord, AirwayIntersectionRecord, AirwaySegmentRecord, AtcFreqRecord, DmeIlsRecord,
    DmeRecord, FieldSpec, FieldType, FixRecord, GlideslopeRecord, HelipadRecord, IlsRecord,
    LightBeaconRecord, MarkerRecord, NdbRecord, Record, RunwayThresholdRecord,
    StartupLocationRecord, VorRecord, WaterRunwayThresholdRecord, WindsockRecord,
};

/// Record category of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Ils,
    Vor,
    Ndb,
    Glideslope,
    Marker,
    Dme,
    DmeIls,
    Airport,
    RunwayThreshold,
    WaterRunwayThreshold,
    Helipad,
    StartupLocation,
    LightBeacon,
    Windsock,
    AtcFreq,
    Fix,
    AirwaySegment,
    AirwayIntersection,
}

impl LayerKind {
    /// Layer name as exposed to callers.
    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Ils => "ILS",
            LayerKind::Vor => "VOR",
            LayerKind::Ndb => "NDB",
            LayerKind::Glideslope => "GS",
            LayerKind::Marker => "Marker",
            LayerKind::Dme => "DME",
            LayerKind::DmeIls => "DMEILS",
            LayerKind::Airport => "APT",
            LayerKind::RunwayThreshold => "RunwayThreshold",
            LayerKind::WaterRunwayThreshold => "WaterRunwayThreshold",
            LayerKind::Helipad => "Helipad",
            LayerKind::StartupLocation => "StartupLocation",
            LayerKind::LightBeacon => "APTLightBeacon",
            LayerKind::Windsock => "APTWindsock",
            LayerKind::AtcFreq => "ATCFreq",
            LayerKind::Fix => "FIX",
            LayerKind::AirwaySegment => "AirwaySegment",
            LayerKind::AirwayIntersection => "AirwayIntersection",
        }
    }

    /// Attribute schema of records in this layer.
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            LayerKind::Ils => IlsRecord::FIELDS,
            LayerKind::Vor => VorRecord::FIELDS,
            LayerKind::Ndb => NdbRecord::FIELDS,
            LayerKind::Glideslope => GlideslopeRecord::FIELDS,
            LayerKind::Marker => MarkerRecord::FIELDS,
            LayerKind::Dme => DmeRecord::FIELDS,
            LayerKind::DmeIls => DmeIlsRecord::FIELDS,
            LayerKind::Airport => AirportRecord::FIELDS,
            LayerKind::RunwayThreshold => RunwayThresholdRecord::FIELDS,
            LayerKind::WaterRunwayThreshold => WaterRunwayThresholdRecord::FIELDS,
            LayerKind::Helipad => HelipadRecord::FIELDS,
            LayerKind::StartupLocation => StartupLocationRecord::FIELDS,
            LayerKind::LightBeacon => LightBeaconRecord::FIELDS,
            LayerKind::Windsock => WindsockRecord::FIELDS,
            LayerKind::AtcFreq => AtcFreqRecord::FIELDS,
            LayerKind::Fix => FixRecord::FIELDS,
            LayerKind::AirwaySegment => AirwaySegmentRecord::FIELDS,
            LayerKind::AirwayIntersection => AirwayIntersectionRecord::FIELDS,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Runtime field definition, including the display width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefn {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Display width in characters; 0 until auto-adjusted.
    pub width: usize,
}

impl From<&FieldSpec> for FieldDefn {
    fn from(spec: &FieldSpec) -> Self {
        Self {
            name: spec.name,
            field_type: spec.field_type,
            width: 0,
        }
    }
}

/// Destination for records produced by a reader.
pub trait RecordSink {
    /// Accept one record. Sinks may drop records they have no place for.
    fn accept(&mut self, record: Record);
}

/// Collection of records for one record category.
pub struct Layer {
    kind: LayerKind,
    fields: Vec<FieldDefn>,
    records: Vec<Record>,
    cursor: usize,
    complete: bool,
    data_source: Option<DataSourceId>,
    reader: Option<Box<dyn XPlaneReader>>,
}

impl Layer {
    /// Create an empty layer of the given kind.
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            fields: kind.fields().iter().map(FieldDefn::from).collect(),
            records: Vec::new(),
            cursor: 0,
            complete: false,
            data_source: None,
            reader: None,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn fields(&self) -> &[FieldDefn] {
        &self.fields
    }

    /// Data source this layer was registered with.
    pub fn data_source(&self) -> Option<DataSourceId> {
        self.data_source
    }

    pub(crate) fn set_data_source(&mut self, id: DataSourceId) {
        self.data_source = Some(id);
    }

    /// Install a private reader used to populate this layer on first access.
    pub fn set_reader(&mut self, reader: Box<dyn XPlaneReader>) {
        self.reader = Some(reader);
    }

    /// The private deferred-mode reader, if any.
    pub fn reader(&self) -> Option<&dyn XPlaneReader> {
        self.reader.as_deref()
    }

    pub fn has_reader(&self) -> bool {
        self.reader.is_some()
    }

    /// Whether the layer holds every record it will ever hold.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub(crate) fn mark_complete(&mut self) {
        self.complete = true;
    }

    /// Parse this layer's records with its private reader, once.
    ///
    /// Does nothing for a layer without a private reader; in whole-file mode
    /// population goes through
    /// [`XPlaneDataSource::load_layer`](crate::datasource::XPlaneDataSource::load_layer).
    pub fn load(&mut self) {
        if self.complete {
            return;
        }
        let Some(mut reader) = self.reader.take() else {
            return;
        };

        if let Err(e) = reader.read_whole_file(self) {
            warn!(layer = self.name(), error = %e, "Layer read stopped early");
        }
        self.reader = Some(reader);

        self.auto_adjust_columns_width();
        self.complete = true;
        info!(
            layer = self.name(),
            records = self.records.len(),
            "Layer loaded"
        );
    }

    /// Set each string field's width to its longest value in this layer.
    pub fn auto_adjust_columns_width(&mut self) {
        let mut widths = vec![1usize; self.fields.len()];
        for record in &self.records {
            for (width, value) in widths.iter_mut().zip(record.values()) {
                *width = (*width).max(value.width());
            }
        }

        for (field, width) in self.fields.iter_mut().zip(widths) {
            if field.field_type == FieldType::String {
                field.width = width;
            }
        }
    }

    /// Records currently held, in parse order.
    pub fn features(&self) -> &[Record] {
        &self.records
    }

    pub fn feature_count(&self) -> usize {
        self.records.len()
    }

    /// Record by zero-based feature id.
    pub fn feature(&self, fid: usize) -> Option<&Record> {
        self.records.get(fid)
    }

    /// Next record in sequence, loading the layer first in deferred mode.
    pub fn next_feature(&mut self) -> Option<&Record> {
        self.load();
        let record = self.records.get(self.cursor)?;
        self.cursor += 1;
        Some(record)
    }

    /// Restart [`next_feature`](Self::next_feature) from the first record.
    pub fn reset_reading(&mut self) {
        self.cursor = 0;
    }
}

impl RecordSink for Layer {
    fn accept(&mut self, record: Record) {
        if record.kind() == self.kind {
            self.records.push(record);
        }
    }
}

impl RecordSink for Vec<Layer> {
    fn accept(&mut self, record: Record) {
        let kind = record.kind();
        if let Some(layer) = self.iter_mut().find(|layer| layer.kind == kind) {
            layer.records.push(record);
        }
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("kind", &self.kind)
            .field("records", &self.records.len())
            .field("complete", &self.complete)
            .field("data_source", &self.data_source)
            .field("has_reader", &self.reader.is_some())
            .finish()
    }
}
