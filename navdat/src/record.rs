//! Typed records for every layer kind.
//!
//! Each record struct declares its attribute schema (`FIELDS`) next to the
//! `values()` method that produces attributes in the same order, so the two
//! cannot drift apart. Units are metric: elevations and lengths in metres,
//! ranges in kilometres, frequencies in MHz (kHz for NDBs).

use std::fmt;

use crate::layer::LayerKind;

/// Attribute type of a layer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Real,
}

/// Static description of one layer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
}

const fn string(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        field_type: FieldType::String,
    }
}

const fn integer(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        field_type: FieldType::Integer,
    }
}

const fn real(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        field_type: FieldType::Real,
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Real(f64),
    Null,
}

impl FieldValue {
    /// Display width in characters when rendered as text.
    pub fn width(&self) -> usize {
        match self {
            FieldValue::String(s) => s.chars().count(),
            FieldValue::Integer(i) => i.to_string().len(),
            FieldValue::Real(r) => r.to_string().len(),
            FieldValue::Null => 0,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Real(r) => write!(f, "{}", r),
            FieldValue::Null => Ok(()),
        }
    }
}

fn s(value: &str) -> FieldValue {
    FieldValue::String(value.to_string())
}

fn flag(value: bool) -> FieldValue {
    FieldValue::Integer(i64::from(value))
}

fn opt_real(value: Option<f64>) -> FieldValue {
    value.map(FieldValue::Real).unwrap_or(FieldValue::Null)
}

// ============================================================================
// nav.dat
// ============================================================================

/// ILS localizer or stand-alone localizer (row codes 4 and 5).
#[derive(Debug, Clone, PartialEq)]
pub struct IlsRecord {
    pub navaid_id: String,
    pub apt_icao: String,
    pub rwy_num: String,
    pub subtype: String,
    pub lat: f64,
    pub lon: f64,
    pub elevation_m: f64,
    pub freq_mhz: f64,
    pub range_km: f64,
    pub true_heading_deg: f64,
}

impl IlsRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("navaid_id"),
        string("apt_icao"),
        string("rwy_num"),
        string("subtype"),
        real("lat"),
        real("lon"),
        real("elevation_m"),
        real("freq_mhz"),
        real("range_km"),
        real("true_heading_deg"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.navaid_id),
            s(&self.apt_icao),
            s(&self.rwy_num),
            s(&self.subtype),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
            FieldValue::Real(self.elevation_m),
            FieldValue::Real(self.freq_mhz),
            FieldValue::Real(self.range_km),
            FieldValue::Real(self.true_heading_deg),
        ]
    }
}

/// VOR, VORTAC or VOR-DME (row code 3).
#[derive(Debug, Clone, PartialEq)]
pub struct VorRecord {
    pub navaid_id: String,
    pub navaid_name: String,
    pub subtype: String,
    pub lat: f64,
    pub lon: f64,
    pub elevation_m: f64,
    pub freq_mhz: f64,
    pub range_km: f64,
    pub slaved_variation_deg: f64,
}

impl VorRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("navaid_id"),
        string("navaid_name"),
        string("subtype"),
        real("lat"),
        real("lon"),
        real("elevation_m"),
        real("freq_mhz"),
        real("range_km"),
        real("slaved_variation_deg"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.navaid_id),
            s(&self.navaid_name),
            s(&self.subtype),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
            FieldValue::Real(self.elevation_m),
            FieldValue::Real(self.freq_mhz),
            FieldValue::Real(self.range_km),
            FieldValue::Real(self.slaved_variation_deg),
        ]
    }
}

/// Non-directional beacon (row code 2).
#[derive(Debug, Clone, PartialEq)]
pub struct NdbRecord {
    pub navaid_id: String,
    pub navaid_name: String,
    pub subtype: String,
    pub lat: f64,
    pub lon: f64,
    pub elevation_m: f64,
    pub freq_khz: f64,
    pub range_km: f64,
}

impl NdbRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("navaid_id"),
        string("navaid_name"),
        string("subtype"),
        real("lat"),
        real("lon"),
        real("elevation_m"),
        real("freq_khz"),
        real("range_km"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.navaid_id),
            s(&self.navaid_name),
            s(&self.subtype),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
            FieldValue::Real(self.elevation_m),
            FieldValue::Real(self.freq_khz),
            FieldValue::Real(self.range_km),
        ]
    }
}

/// ILS glideslope (row code 6).
#[derive(Debug, Clone, PartialEq)]
pub struct GlideslopeRecord {
    pub navaid_id: String,
    pub apt_icao: String,
    pub rwy_num: String,
    pub lat: f64,
    pub lon: f64,
    pub elevation_m: f64,
    pub freq_mhz: f64,
    pub range_km: f64,
    pub true_heading_deg: f64,
    pub glide_slope_deg: f64,
}

impl GlideslopeRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("navaid_id"),
        string("apt_icao"),
        string("rwy_num"),
        real("lat"),
        real("lon"),
        real("elevation_m"),
        real("freq_mhz"),
        real("range_km"),
        real("true_heading_deg"),
        real("glide_slope_deg"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.navaid_id),
            s(&self.apt_icao),
            s(&self.rwy_num),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
            FieldValue::Real(self.elevation_m),
            FieldValue::Real(self.freq_mhz),
            FieldValue::Real(self.range_km),
            FieldValue::Real(self.true_heading_deg),
            FieldValue::Real(self.glide_slope_deg),
        ]
    }
}

/// Outer, middle or inner marker (row codes 7, 8, 9).
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRecord {
    pub apt_icao: String,
    pub rwy_num: String,
    pub subtype: String,
    pub lat: f64,
    pub lon: f64,
    pub elevation_m: f64,
    pub true_heading_deg: f64,
}

impl MarkerRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("apt_icao"),
        string("rwy_num"),
        string("subtype"),
        real("lat"),
        real("lon"),
        real("elevation_m"),
        real("true_heading_deg"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.apt_icao),
            s(&self.rwy_num),
            s(&self.subtype),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
            FieldValue::Real(self.elevation_m),
            FieldValue::Real(self.true_heading_deg),
        ]
    }
}

/// DME, stand-alone or paired with a VOR/NDB (row codes 12 and 13).
#[derive(Debug, Clone, PartialEq)]
pub struct DmeRecord {
    pub navaid_id: String,
    pub navaid_name: String,
    pub subtype: String,
    pub lat: f64,
    pub lon: f64,
    pub elevation_m: f64,
    pub freq_mhz: f64,
    pub range_km: f64,
    pub bias_km: f64,
}

impl DmeRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("navaid_id"),
        string("navaid_name"),
        string("subtype"),
        real("lat"),
        real("lon"),
        real("elevation_m"),
        real("freq_mhz"),
        real("range_km"),
        real("bias_km"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.navaid_id),
            s(&self.navaid_name),
            s(&self.subtype),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
            FieldValue::Real(self.elevation_m),
            FieldValue::Real(self.freq_mhz),
            FieldValue::Real(self.range_km),
            FieldValue::Real(self.bias_km),
        ]
    }
}

/// DME component of an ILS (row codes 12/13 with type `DME-ILS`).
#[derive(Debug, Clone, PartialEq)]
pub struct DmeIlsRecord {
    pub navaid_id: String,
    pub apt_icao: String,
    pub rwy_num: String,
    pub lat: f64,
    pub lon: f64,
    pub elevation_m: f64,
    pub freq_mhz: f64,
    pub range_km: f64,
    pub bias_km: f64,
}

impl DmeIlsRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("navaid_id"),
        string("apt_icao"),
        string("rwy_num"),
        real("lat"),
        real("lon"),
        real("elevation_m"),
        real("freq_mhz"),
        real("range_km"),
        real("bias_km"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.navaid_id),
            s(&self.apt_icao),
            s(&self.rwy_num),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
            FieldValue::Real(self.elevation_m),
            FieldValue::Real(self.freq_mhz),
            FieldValue::Real(self.range_km),
            FieldValue::Real(self.bias_km),
        ]
    }
}

// ============================================================================
// apt.dat
// ============================================================================

/// Kind of airport header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirportType {
    /// Row code 1.
    Airport,
    /// Row code 16.
    SeaplaneBase,
    /// Row code 17.
    Heliport,
}

impl AirportType {
    pub fn from_row_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(AirportType::Airport),
            16 => Some(AirportType::SeaplaneBase),
            17 => Some(AirportType::Heliport),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AirportType::Airport => "Airport",
            AirportType::SeaplaneBase => "Seaplane base",
            AirportType::Heliport => "Heliport",
        }
    }
}

/// Airport, seaplane base or heliport.
///
/// Position is the `datum_lat`/`datum_lon` metadata when present, otherwise
/// the first runway or helipad position. Airports with neither have no
/// position.
#[derive(Debug, Clone, PartialEq)]
pub struct AirportRecord {
    pub apt_icao: String,
    pub apt_name: String,
    pub apt_type: AirportType,
    pub elevation_m: f64,
    pub has_tower: bool,
    pub hgt_tower_m: Option<f64>,
    pub tower_name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl AirportRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("apt_icao"),
        string("apt_name"),
        string("apt_type"),
        real("elevation_m"),
        integer("has_tower"),
        real("hgt_tower_m"),
        string("tower_name"),
        real("lat"),
        real("lon"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.apt_icao),
            s(&self.apt_name),
            s(self.apt_type.as_str()),
            FieldValue::Real(self.elevation_m),
            flag(self.has_tower),
            opt_real(self.hgt_tower_m),
            s(&self.tower_name),
            opt_real(self.lat),
            opt_real(self.lon),
        ]
    }
}

/// One end of a land runway (row code 100 yields two).
#[derive(Debug, Clone, PartialEq)]
pub struct RunwayThresholdRecord {
    pub apt_icao: String,
    pub rwy_num: String,
    pub lat: f64,
    pub lon: f64,
    pub width_m: f64,
    pub surface: String,
    pub shoulder: String,
    pub smoothness: f64,
    pub centerline_lights: bool,
    pub edge_lighting: String,
    pub distance_remaining_signs: bool,
    pub displaced_threshold_m: f64,
    pub stopway_length_m: f64,
    pub markings: String,
    pub approach_lighting: String,
    pub touchdown_lights: bool,
    pub reil: String,
    pub length_m: f64,
    pub true_heading_deg: f64,
}

impl RunwayThresholdRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("apt_icao"),
        string("rwy_num"),
        real("lat"),
        real("lon"),
        real("width_m"),
        string("surface"),
        string("shoulder"),
        real("smoothness"),
        integer("centerline_lights"),
        string("edge_lighting"),
        integer("distance_remaining_signs"),
        real("displaced_threshold_m"),
        real("stopway_length_m"),
        string("markings"),
        string("approach_lighting"),
        integer("touchdown_lights"),
        string("reil"),
        real("length_m"),
        real("true_heading_deg"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.apt_icao),
            s(&self.rwy_num),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
            FieldValue::Real(self.width_m),
            s(&self.surface),
            s(&self.shoulder),
            FieldValue::Real(self.smoothness),
            flag(self.centerline_lights),
            s(&self.edge_lighting),
            flag(self.distance_remaining_signs),
            FieldValue::Real(self.displaced_threshold_m),
            FieldValue::Real(self.stopway_length_m),
            s(&self.markings),
            s(&self.approach_lighting),
            flag(self.touchdown_lights),
            s(&self.reil),
            FieldValue::Real(self.length_m),
            FieldValue::Real(self.true_heading_deg),
        ]
    }
}

/// One end of a water runway (row code 101 yields two).
#[derive(Debug, Clone, PartialEq)]
pub struct WaterRunwayThresholdRecord {
    pub apt_icao: String,
    pub rwy_num: String,
    pub lat: f64,
    pub lon: f64,
    pub width_m: f64,
    pub has_buoys: bool,
    pub length_m: f64,
    pub true_heading_deg: f64,
}

impl WaterRunwayThresholdRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("apt_icao"),
        string("rwy_num"),
        real("lat"),
        real("lon"),
        real("width_m"),
        integer("has_buoys"),
        real("length_m"),
        real("true_heading_deg"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.apt_icao),
            s(&self.rwy_num),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
            FieldValue::Real(self.width_m),
            flag(self.has_buoys),
            FieldValue::Real(self.length_m),
            FieldValue::Real(self.true_heading_deg),
        ]
    }
}

/// Helipad (row code 102).
#[derive(Debug, Clone, PartialEq)]
pub struct HelipadRecord {
    pub apt_icao: String,
    pub helipad_name: String,
    pub lat: f64,
    pub lon: f64,
    pub true_heading_deg: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub surface: String,
    pub edge_lighting: String,
}

impl HelipadRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("apt_icao"),
        string("helipad_name"),
        real("lat"),
        real("lon"),
        real("true_heading_deg"),
        real("length_m"),
        real("width_m"),
        string("surface"),
        string("edge_lighting"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.apt_icao),
            s(&self.helipad_name),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
            FieldValue::Real(self.true_heading_deg),
            FieldValue::Real(self.length_m),
            FieldValue::Real(self.width_m),
            s(&self.surface),
            s(&self.edge_lighting),
        ]
    }
}

/// Aircraft startup location (row code 15).
#[derive(Debug, Clone, PartialEq)]
pub struct StartupLocationRecord {
    pub apt_icao: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub true_heading_deg: f64,
}

impl StartupLocationRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("apt_icao"),
        string("name"),
        real("lat"),
        real("lon"),
        real("true_heading_deg"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.apt_icao),
            s(&self.name),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
            FieldValue::Real(self.true_heading_deg),
        ]
    }
}

/// Airport light beacon (row code 18).
#[derive(Debug, Clone, PartialEq)]
pub struct LightBeaconRecord {
    pub apt_icao: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub color: String,
}

impl LightBeaconRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("apt_icao"),
        string("name"),
        real("lat"),
        real("lon"),
        string("color"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.apt_icao),
            s(&self.name),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
            s(&self.color),
        ]
    }
}

/// Windsock (row code 19).
#[derive(Debug, Clone, PartialEq)]
pub struct WindsockRecord {
    pub apt_icao: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub is_illuminated: bool,
}

impl WindsockRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("apt_icao"),
        string("name"),
        real("lat"),
        real("lon"),
        integer("is_illuminated"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.apt_icao),
            s(&self.name),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
            flag(self.is_illuminated),
        ]
    }
}

/// ATC frequency (row codes 50 to 56).
#[derive(Debug, Clone, PartialEq)]
pub struct AtcFreqRecord {
    pub apt_icao: String,
    pub atc_type: String,
    pub freq_name: String,
    pub freq_mhz: f64,
}

impl AtcFreqRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("apt_icao"),
        string("atc_type"),
        string("freq_name"),
        real("freq_mhz"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.apt_icao),
            s(&self.atc_type),
            s(&self.freq_name),
            FieldValue::Real(self.freq_mhz),
        ]
    }
}

// ============================================================================
// fix.dat / awy.dat
// ============================================================================

/// Named intersection.
#[derive(Debug, Clone, PartialEq)]
pub struct FixRecord {
    pub fix_name: String,
    pub lat: f64,
    pub lon: f64,
}

impl FixRecord {
    pub const FIELDS: &'static [FieldSpec] = &[string("fix_name"), real("lat"), real("lon")];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.fix_name),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
        ]
    }
}

/// One airway between two named points.
#[derive(Debug, Clone, PartialEq)]
pub struct AirwaySegmentRecord {
    pub segment_name: String,
    pub point1_name: String,
    pub point1_lat: f64,
    pub point1_lon: f64,
    pub point2_name: String,
    pub point2_lat: f64,
    pub point2_lon: f64,
    pub is_high: bool,
    pub base_fl: i64,
    pub top_fl: i64,
}

impl AirwaySegmentRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        string("segment_name"),
        string("point1_name"),
        real("point1_lat"),
        real("point1_lon"),
        string("point2_name"),
        real("point2_lat"),
        real("point2_lon"),
        integer("is_high"),
        integer("base_fl"),
        integer("top_fl"),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.segment_name),
            s(&self.point1_name),
            FieldValue::Real(self.point1_lat),
            FieldValue::Real(self.point1_lon),
            s(&self.point2_name),
            FieldValue::Real(self.point2_lat),
            FieldValue::Real(self.point2_lon),
            flag(self.is_high),
            FieldValue::Integer(self.base_fl),
            FieldValue::Integer(self.top_fl),
        ]
    }
}

/// Distinct airway endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct AirwayIntersectionRecord {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl AirwayIntersectionRecord {
    pub const FIELDS: &'static [FieldSpec] = &[string("name"), real("lat"), real("lon")];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            s(&self.name),
            FieldValue::Real(self.lat),
            FieldValue::Real(self.lon),
        ]
    }
}

// ============================================================================
// Record
// ============================================================================

/// A parsed record of any layer kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Ils(IlsRecord),
    Vor(VorRecord),
    Ndb(NdbRecord),
    Glideslope(GlideslopeRecord),
    Marker(MarkerRecord),
    Dme(DmeRecord),
    DmeIls(DmeIlsRecord),
    Airport(AirportRecord),
    RunwayThreshold(RunwayThresholdRecord),
    WaterRunwayThreshold(WaterRunwayThresholdRecord),
    Helipad(HelipadRecord),
    StartupLocation(StartupLocationRecord),
    LightBeacon(LightBeaconRecord),
    Windsock(WindsockRecord),
    AtcFreq(AtcFreqRecord),
    Fix(FixRecord),
    AirwaySegment(AirwaySegmentRecord),
    AirwayIntersection(AirwayIntersectionRecord),
}

impl Record {
    /// The layer this record belongs to.
    pub fn kind(&self) -> LayerKind {
        match self {
            Record::Ils(_) => LayerKind::Ils,
            Record::Vor(_) => LayerKind::Vor,
            Record::Ndb(_) => LayerKind::Ndb,
            Record::Glideslope(_) => LayerKind::Glideslope,
            Record::Marker(_) => LayerKind::Marker,
            Record::Dme(_) => LayerKind::Dme,
            Record::DmeIls(_) => LayerKind::DmeIls,
            Record::Airport(_) => LayerKind::Airport,
            Record::RunwayThreshold(_) => LayerKind::RunwayThreshold,
            Record::WaterRunwayThreshold(_) => LayerKind::WaterRunwayThreshold,
            Record::Helipad(_) => LayerKind::Helipad,
            Record::StartupLocation(_) => LayerKind::StartupLocation,
            Record::LightBeacon(_) => LayerKind::LightBeacon,
            Record::Windsock(_) => LayerKind::Windsock,
            Record::AtcFreq(_) => LayerKind::AtcFreq,
            Record::Fix(_) => LayerKind::Fix,
            Record::AirwaySegment(_) => LayerKind::AirwaySegment,
            Record::AirwayIntersection(_) => LayerKind::AirwayIntersection,
        }
    }

    /// Attribute values in the order of [`LayerKind::fields`].
    pub fn values(&self) -> Vec<FieldValue> {
        match self {
            Record::Ils(r) => r.values(),
            Record::Vor(r) => r.values(),
            Record::Ndb(r) => r.values(),
            Record::Glideslope(r) => r.values(),
            Record::Marker(r) => r.values(),
            Record::Dme(r) => r.values(),
            Record::DmeIls(r) => r.values(),
            Record::Airport(r) => r.values(),
            Record::RunwayThreshold(r) => r.values(),
            Record::WaterRunwayThreshold(r) => r.values(),
            Record::Helipad(r) => r.values(),
            Record::StartupLocation(r) => r.values(),
            Record::LightBeacon(r) => r.values(),
            Record::Windsock(r) => r.values(),
            Record::AtcFreq(r) => r.values(),
            Record::Fix(r) => r.values(),
            Record::AirwaySegment(r) => r.values(),
            Record::AirwayIntersection(r) => r.values(),
        }
    }

    /// Look up a single attribute by field name.
    pub fn value(&self, field: &str) -> Option<FieldValue> {
        let index = self
            .kind()
            .fields()
            .iter()
            .position(|spec| spec.name == field)?;
        self.values().into_iter().nth(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix() -> Record {
        Record::Fix(FixRecord {
            fix_name: "ABBOT".to_string(),
            lat: 51.5,
            lon: -0.5,
        })
    }

    #[test]
    fn test_every_kind_has_matching_value_count() {
        let airport = Record::Airport(AirportRecord {
            apt_icao: "LFBO".to_string(),
            apt_name: "Toulouse Blagnac".to_string(),
            apt_type: AirportType::Airport,
            elevation_m: 152.0,
            has_tower: false,
            hgt_tower_m: None,
            tower_name: String::new(),
            lat: None,
            lon: None,
        });
        let segment = Record::AirwaySegment(AirwaySegmentRecord {
            segment_name: "J1".to_string(),
            point1_name: "A".to_string(),
            point1_lat: 0.0,
            point1_lon: 0.0,
            point2_name: "B".to_string(),
            point2_lat: 1.0,
            point2_lon: 1.0,
            is_high: true,
            base_fl: 180,
            top_fl: 450,
        });

        for record in [fix(), airport, segment] {
            assert_eq!(
                record.values().len(),
                record.kind().fields().len(),
                "{:?}",
                record.kind()
            );
        }
    }

    #[test]
    fn test_value_by_name() {
        let record = fix();
        assert_eq!(
            record.value("fix_name"),
            Some(FieldValue::String("ABBOT".to_string()))
        );
        assert_eq!(record.value("lat"), Some(FieldValue::Real(51.5)));
        assert_eq!(record.value("nope"), None);
    }

    #[test]
    fn test_missing_position_is_null() {
        let airport = AirportRecord {
            apt_icao: "XXXX".to_string(),
            apt_name: "Nowhere".to_string(),
            apt_type: AirportType::Heliport,
            elevation_m: 0.0,
            has_tower: false,
            hgt_tower_m: None,
            tower_name: String::new(),
            lat: None,
            lon: None,
        };
        let record = Record::Airport(airport);
        assert_eq!(record.value("lat"), Some(FieldValue::Null));
        assert_eq!(
            record.value("apt_type"),
            Some(FieldValue::String("Heliport".to_string()))
        );
    }

    #[test]
    fn test_field_value_width() {
        assert_eq!(FieldValue::String("Blagnac".to_string()).width(), 7);
        assert_eq!(FieldValue::String("Zürich".to_string()).width(), 6);
        assert_eq!(FieldValue::Integer(-12).width(), 3);
        assert_eq!(FieldValue::Null.width(), 0);
    }
}
