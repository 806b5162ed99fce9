//! Parser for awy.dat / earth_awy.dat (version 640).
//!
//! Each line is one leg between two named points:
//!
//! ```text
//! ABCDE  32.283733 -106.898669 FGHIJ  33.282503 -107.280542 2 180 450 J13-J15
//! ```
//!
//! Columns: point 1 name/lat/lon, point 2 name/lat/lon, `1` low or `2` high
//! airway, base and top flight levels, then one or more airway names joined
//! by `-`. A leg shared by several airways yields one segment per airway.

use std::collections::HashSet;

use super::fields::Fields;
use super::{Emitter, FileFormat, LineParser};
use crate::error::RecordError;
use crate::layer::LayerKind;
use crate::record::{AirwayIntersectionRecord, AirwaySegmentRecord, Record};

const HIGH_AIRWAY: i64 = 2;

pub(crate) struct AwyParser {
    /// Intersections already emitted, keyed by name and exact position.
    seen: HashSet<(String, u64, u64)>,
}

impl AwyParser {
    fn emit_intersection(&mut self, name: &str, lat: f64, lon: f64, out: &mut Emitter<'_>) {
        if self
            .seen
            .insert((name.to_string(), lat.to_bits(), lon.to_bits()))
        {
            out.emit(Record::AirwayIntersection(AirwayIntersectionRecord {
                name: name.to_string(),
                lat,
                lon,
            }));
        }
    }
}

impl LineParser for AwyParser {
    const FORMAT: FileFormat = FileFormat::Awy;

    fn new(_version: u32) -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    fn parse_line(&mut self, fields: &Fields<'_>, out: &mut Emitter<'_>) -> Result<(), RecordError> {
        fields.require(10)?;
        let point1_name = fields.str(0);
        let (point1_lat, point1_lon) = fields.position(1, 2)?;
        let point2_name = fields.str(3);
        let (point2_lat, point2_lon) = fields.position(4, 5)?;
        let is_high = fields.i64(6, "airway level")? == HIGH_AIRWAY;
        let base_fl = fields.i64(7, "base flight level")?;
        let top_fl = fields.i64(8, "top flight level")?;

        if out.wants(LayerKind::AirwaySegment) {
            for segment_name in fields.str(9).split('-').filter(|name| !name.is_empty()) {
                out.emit(Record::AirwaySegment(AirwaySegmentRecord {
                    segment_name: segment_name.to_string(),
                    point1_name: point1_name.to_string(),
                    point1_lat,
                    point1_lon,
                    point2_name: point2_name.to_string(),
                    point2_lat,
                    point2_lon,
                    is_high,
                    base_fl,
                    top_fl,
                }));
            }
        }

        if out.wants(LayerKind::AirwayIntersection) {
            self.emit_intersection(point1_name, point1_lat, point1_lon, out);
            self.emit_intersection(point2_name, point2_lat, point2_lon, out);
        }
        Ok(())
    }
}
