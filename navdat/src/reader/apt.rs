//! Parser for X-Plane's apt.dat airport database (versions 850 and later).
//!
//! The file is a sequence of airport blocks. A header row starts a block:
//!
//! - `1` land airport, `16` seaplane base, `17` heliport:
//!   `<code> <elevation_ft> <has_tower> <deprecated> <ICAO> <name...>`
//!
//! Rows that follow belong to the current airport until the next header:
//!
//! | Code    | Row                          | Layer                  |
//! |---------|------------------------------|------------------------|
//! | 14      | Tower viewpoint              | (airport attributes)   |
//! | 15      | Startup location             | StartupLocation        |
//! | 18      | Light beacon                 | APTLightBeacon         |
//! | 19      | Windsock                     | APTWindsock            |
//! | 50..=56 | ATC frequency (10 kHz units) | ATCFreq                |
//! | 1050..=1056 | ATC frequency (kHz)      | ATCFreq                |
//! | 100     | Land runway (two ends)       | RunwayThreshold        |
//! | 101     | Water runway (two ends)      | WaterRunwayThreshold   |
//! | 102     | Helipad                      | Helipad                |
//! | 1302    | Metadata (`datum_lat/lon`)   | (airport attributes)   |
//!
//! Taxiways, pavement, signs and the rest are skipped. The airport record is
//! emitted when its block ends, because its position may come from any row.

use super::fields::Fields;
use super::{Emitter, FileFormat, LineParser};
use crate::error::RecordError;
use crate::geo::{self, FEET_TO_METER};
use crate::layer::LayerKind;
use crate::record::{
    AirportRecord, AirportType, AtcFreqRecord, HelipadRecord, LightBeaconRecord, Record,
    RunwayThresholdRecord, StartupLocationRecord, WaterRunwayThresholdRecord, WindsockRecord,
};

const TOWER: u32 = 14;
const STARTUP_LOCATION: u32 = 15;
const LIGHT_BEACON: u32 = 18;
const WINDSOCK: u32 = 19;
const LAND_RUNWAY: u32 = 100;
const WATER_RUNWAY: u32 = 101;
const HELIPAD: u32 = 102;
const METADATA: u32 = 1302;

/// Offset of the 8.33 kHz ATC rows (1050..=1056) from the legacy 50..=56.
const ATC_833_OFFSET: u32 = 1000;

/// Airport block being assembled.
struct AirportBuilder {
    icao: String,
    name: String,
    apt_type: AirportType,
    elevation_m: f64,
    has_tower: bool,
    hgt_tower_m: Option<f64>,
    tower_name: String,
    datum_lat: Option<f64>,
    datum_lon: Option<f64>,
    first_position: Option<(f64, f64)>,
}

impl AirportBuilder {
    fn note_position(&mut self, lat: f64, lon: f64) {
        if self.first_position.is_none() {
            self.first_position = Some((lat, lon));
        }
    }

    fn build(self) -> AirportRecord {
        let (lat, lon) = match (self.datum_lat, self.datum_lon, self.first_position) {
            (Some(lat), Some(lon), _) => (Some(lat), Some(lon)),
            (_, _, Some((lat, lon))) => (Some(lat), Some(lon)),
            _ => (None, None),
        };
        AirportRecord {
            apt_icao: self.icao,
            apt_name: self.name,
            apt_type: self.apt_type,
            elevation_m: self.elevation_m,
            has_tower: self.has_tower,
            hgt_tower_m: self.hgt_tower_m,
            tower_name: self.tower_name,
            lat,
            lon,
        }
    }
}

pub(crate) struct AptParser {
    current: Option<AirportBuilder>,
    /// Set after a malformed header: rows of that block are dropped quietly.
    skipping_block: bool,
}

impl AptParser {
    fn finish_airport(&mut self, out: &mut Emitter<'_>) {
        if let Some(airport) = self.current.take() {
            out.emit(Record::Airport(airport.build()));
        }
    }

    fn parse_header(&mut self, apt_type: AirportType, fields: &Fields<'_>) -> Result<(), RecordError> {
        self.skipping_block = true;
        fields.require(5)?;
        let elevation_ft = fields.f64(1, "elevation")?;

        self.current = Some(AirportBuilder {
            icao: fields.str(4).to_string(),
            name: fields.join_from(5),
            apt_type,
            elevation_m: elevation_ft * FEET_TO_METER,
            has_tower: fields.flag(2, "has tower")?,
            hgt_tower_m: None,
            tower_name: String::new(),
            datum_lat: None,
            datum_lon: None,
            first_position: None,
        });
        self.skipping_block = false;
        Ok(())
    }

    fn parse_tower(airport: &mut AirportBuilder, fields: &Fields<'_>) -> Result<(), RecordError> {
        fields.require(4)?;
        fields.position(1, 2)?;
        airport.has_tower = true;
        airport.hgt_tower_m = Some(fields.f64(3, "tower height")? * FEET_TO_METER);
        airport.tower_name = fields.join_from(5);
        Ok(())
    }

    fn parse_metadata(airport: &mut AirportBuilder, fields: &Fields<'_>) -> Result<(), RecordError> {
        fields.require(3)?;
        match fields.str(1) {
            "datum_lat" => {
                let lat = fields.f64(2, "datum_lat")?;
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(RecordError::CoordinateOutOfRange { lat, lon: 0.0 });
                }
                airport.datum_lat = Some(lat);
            }
            "datum_lon" => {
                let lon = fields.f64(2, "datum_lon")?;
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(RecordError::CoordinateOutOfRange { lat: 0.0, lon });
                }
                airport.datum_lon = Some(lon);
            }
            _ => {}
        }
        Ok(())
    }

    fn parse_land_runway(
        airport: &mut AirportBuilder,
        fields: &Fields<'_>,
        out: &mut Emitter<'_>,
    ) -> Result<(), RecordError> {
        // 8 shared columns, then 9 per runway end.
        const END_COLUMNS: usize = 9;
        fields.require(8 + 2 * END_COLUMNS)?;

        let width_m = fields.f64(1, "runway width")?;
        let surface = surface_name(fields.u32(2, "surface")?);
        let shoulder = shoulder_name(fields.u32(3, "shoulder")?);
        let smoothness = fields.f64(4, "smoothness")?;
        let centerline_lights = fields.flag(5, "centerline lights")?;
        let edge_lighting = edge_lighting_name(fields.u32(6, "edge lighting")?);
        let distance_remaining_signs = fields.flag(7, "distance remaining signs")?;

        let (lat1, lon1) = fields.position(9, 10)?;
        let (lat2, lon2) = fields.position(9 + END_COLUMNS, 10 + END_COLUMNS)?;
        airport.note_position(lat1, lon1);

        if !out.wants(LayerKind::RunwayThreshold) {
            return Ok(());
        }

        let length_m = geo::distance_m(lat1, lon1, lat2, lon2);
        let ends = [
            (8, geo::initial_bearing_deg(lat1, lon1, lat2, lon2)),
            (8 + END_COLUMNS, geo::initial_bearing_deg(lat2, lon2, lat1, lon1)),
        ];

        let mut records = Vec::with_capacity(2);
        for (base, true_heading_deg) in ends {
            let (lat, lon) = fields.position(base + 1, base + 2)?;
            records.push(RunwayThresholdRecord {
                apt_icao: airport.icao.clone(),
                rwy_num: fields.str(base).to_string(),
                lat,
                lon,
                width_m,
                surface: surface.to_string(),
                shoulder: shoulder.to_string(),
                smoothness,
                centerline_lights,
                edge_lighting: edge_lighting.to_string(),
                distance_remaining_signs,
                displaced_threshold_m: fields.f64(base + 3, "displaced threshold")?,
                stopway_length_m: fields.f64(base + 4, "blast pad length")?,
                markings: markings_name(fields.u32(base + 5, "markings")?).to_string(),
                approach_lighting: approach_lighting_name(fields.u32(base + 6, "approach lighting")?)
                    .to_string(),
                touchdown_lights: fields.flag(base + 7, "touchdown lights")?,
                reil: reil_name(fields.u32(base + 8, "REIL")?).to_string(),
                length_m,
                true_heading_deg,
            });
        }
        for record in records {
            out.emit(Record::RunwayThreshold(record));
        }
        Ok(())
    }

    fn parse_water_runway(
        airport: &mut AirportBuilder,
        fields: &Fields<'_>,
        out: &mut Emitter<'_>,
    ) -> Result<(), RecordError> {
        fields.require(9)?;
        let width_m = fields.f64(1, "runway width")?;
        let has_buoys = fields.flag(2, "buoys")?;
        let (lat1, lon1) = fields.position(4, 5)?;
        let (lat2, lon2) = fields.position(7, 8)?;
        airport.note_position(lat1, lon1);

        let length_m = geo::distance_m(lat1, lon1, lat2, lon2);
        let ends = [
            (fields.str(3), lat1, lon1, geo::initial_bearing_deg(lat1, lon1, lat2, lon2)),
            (fields.str(6), lat2, lon2, geo::initial_bearing_deg(lat2, lon2, lat1, lon1)),
        ];
        for (rwy_num, lat, lon, true_heading_deg) in ends {
            out.emit(Record::WaterRunwayThreshold(WaterRunwayThresholdRecord {
                apt_icao: airport.icao.clone(),
                rwy_num: rwy_num.to_string(),
                lat,
                lon,
                width_m,
                has_buoys,
                length_m,
                true_heading_deg,
            }));
        }
        Ok(())
    }

    fn parse_helipad(
        airport: &mut AirportBuilder,
        fields: &Fields<'_>,
        out: &mut Emitter<'_>,
    ) -> Result<(), RecordError> {
        fields.require(12)?;
        let (lat, lon) = fields.position(2, 3)?;
        airport.note_position(lat, lon);

        let edge_lighting = if fields.u32(11, "edge lighting")? == 0 {
            "None"
        } else {
            "Yes"
        };
        out.emit(Record::Helipad(HelipadRecord {
            apt_icao: airport.icao.clone(),
            helipad_name: fields.str(1).to_string(),
            lat,
            lon,
            true_heading_deg: fields.f64(4, "heading")?,
            length_m: fields.f64(5, "length")?,
            width_m: fields.f64(6, "width")?,
            surface: surface_name(fields.u32(7, "surface")?).to_string(),
            edge_lighting: edge_lighting.to_string(),
        }));
        Ok(())
    }

    fn parse_airport_row(
        &mut self,
        code: u32,
        fields: &Fields<'_>,
        out: &mut Emitter<'_>,
    ) -> Result<(), RecordError> {
        let Some(airport) = self.current.as_mut() else {
            if self.skipping_block {
                return Ok(());
            }
            return Err(RecordError::OutsideAirport(code));
        };

        match code {
            TOWER => Self::parse_tower(airport, fields),
            METADATA => Self::parse_metadata(airport, fields),
            LAND_RUNWAY => Self::parse_land_runway(airport, fields, out),
            WATER_RUNWAY => Self::parse_water_runway(airport, fields, out),
            HELIPAD => Self::parse_helipad(airport, fields, out),
            STARTUP_LOCATION if out.wants(LayerKind::StartupLocation) => {
                fields.require(4)?;
                let (lat, lon) = fields.position(1, 2)?;
                out.emit(Record::StartupLocation(StartupLocationRecord {
                    apt_icao: airport.icao.clone(),
                    name: fields.join_from(4),
                    lat,
                    lon,
                    true_heading_deg: fields.f64(3, "heading")?,
                }));
                Ok(())
            }
            LIGHT_BEACON if out.wants(LayerKind::LightBeacon) => {
                fields.require(4)?;
                let (lat, lon) = fields.position(1, 2)?;
                out.emit(Record::LightBeacon(LightBeaconRecord {
                    apt_icao: airport.icao.clone(),
                    name: fields.join_from(4),
                    lat,
                    lon,
                    color: beacon_color_name(fields.u32(3, "beacon color")?).to_string(),
                }));
                Ok(())
            }
            WINDSOCK if out.wants(LayerKind::Windsock) => {
                fields.require(4)?;
                let (lat, lon) = fields.position(1, 2)?;
                out.emit(Record::Windsock(WindsockRecord {
                    apt_icao: airport.icao.clone(),
                    name: fields.join_from(4),
                    lat,
                    lon,
                    is_illuminated: fields.flag(3, "illuminated")?,
                }));
                Ok(())
            }
            50..=56 | 1050..=1056 if out.wants(LayerKind::AtcFreq) => {
                fields.require(2)?;
                let freq = fields.f64(1, "frequency")?;
                // Legacy rows are in 10 kHz units, 8.33 kHz rows in kHz.
                let (atc_code, freq_mhz) = if code > ATC_833_OFFSET {
                    (code - ATC_833_OFFSET, freq / 1000.0)
                } else {
                    (code, freq / 100.0)
                };
                out.emit(Record::AtcFreq(AtcFreqRecord {
                    apt_icao: airport.icao.clone(),
                    atc_type: atc_type_name(atc_code).to_string(),
                    freq_name: fields.join_from(2),
                    freq_mhz,
                }));
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl LineParser for AptParser {
    const FORMAT: FileFormat = FileFormat::Apt;

    fn new(_version: u32) -> Self {
        Self {
            current: None,
            skipping_block: false,
        }
    }

    fn parse_line(&mut self, fields: &Fields<'_>, out: &mut Emitter<'_>) -> Result<(), RecordError> {
        let code = fields.u32(0, "row code")?;

        if let Some(apt_type) = AirportType::from_row_code(code) {
            self.finish_airport(out);
            return self.parse_header(apt_type, fields);
        }

        match code {
            TOWER | STARTUP_LOCATION | LIGHT_BEACON | WINDSOCK | 50..=56 | 1050..=1056
            | LAND_RUNWAY | WATER_RUNWAY | HELIPAD | METADATA => self.parse_airport_row(code, fields, out),
            _ => Ok(()),
        }
    }

    fn finish(&mut self, out: &mut Emitter<'_>) {
        self.finish_airport(out);
    }
}

fn surface_name(code: u32) -> &'static str {
    match code {
        1 => "Asphalt",
        2 => "Concrete",
        3 => "Turf/grass",
        4 => "Dirt",
        5 => "Gravel",
        12 => "Dry lakebed",
        13 => "Water",
        14 => "Snow/ice",
        15 => "Transparent",
        20..=38 => "Asphalt",
        50..=57 => "Concrete",
        _ => "Unknown",
    }
}

fn shoulder_name(code: u32) -> &'static str {
    match code {
        0 => "None",
        1 => "Asphalt",
        2 => "Concrete",
        _ => "Unknown",
    }
}

fn edge_lighting_name(code: u32) -> &'static str {
    match code {
        0 => "None",
        1 => "LIRL",
        2 => "MIRL",
        3 => "HIRL",
        _ => "Unknown",
    }
}

fn markings_name(code: u32) -> &'static str {
    match code {
        0 => "None",
        1 => "Visual",
        2 => "Non-precision approach",
        3 => "Precision approach",
        4 => "UK-style non-precision",
        5 => "UK-style precision",
        _ => "Unknown",
    }
}

fn approach_lighting_name(code: u32) -> &'static str {
    match code {
        0 => "None",
        1 => "ALSF-I",
        2 => "ALSF-II",
        3 => "Calvert",
        4 => "Calvert ISL Cat II and III",
        5 => "SSALR",
        6 => "SSALF",
        7 => "SALS",
        8 => "MALSR",
        9 => "MALSF",
        10 => "MALS",
        11 => "ODALS",
        12 => "RAIL",
        _ => "Unknown",
    }
}

fn reil_name(code: u32) -> &'static str {
    match code {
        0 => "None",
        1 => "Omni-directional",
        2 => "Unidirectional",
        _ => "Unknown",
    }
}

fn beacon_color_name(code: u32) -> &'static str {
    match code {
        0 => "None",
        1 => "White-green",
        2 => "White-yellow",
        3 => "Green-yellow-white",
        4 => "White-white-green",
        _ => "Unknown",
    }
}

fn atc_type_name(code: u32) -> &'static str {
    match code {
        50 => "ATIS",
        51 => "CTAF",
        52 => "CLD",
        53 => "GND",
        54 => "TWR",
        55 => "APP",
        56 => "DEP",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::test_support::parse_body;

    const APT: &str = "\
1    499 1 0 KSEA Seattle Tacoma Intl
14   47.44 -122.30 233 0 Tower
15   47.44 -122.31 90.00 Gate A1
18   47.44 -122.29 1 BCN
19   47.45 -122.30 1 WS
50 12380 ATIS
54 11990 TWR
100 45.72 1 0 0.25 1 3 1 16L 47.46384 -122.30782 0 0 3 2 1 0 34R 47.43773 -122.30757 0 0 3 8 1 0
1302 datum_lat 47.449888
1302 datum_lon -122.311777

16   0 0 0 W55 Kenmore Air Harbor
101 49.00 1 04 47.75500 -122.25900 22 47.76600 -122.24500

17   20 0 0 HELI Test Heliport
102 H1 40.7128 -74.0060 90.00 20.0 20.0 1 0 0 0.25 1
99
";

    fn parse(scope: Option<LayerKind>) -> Vec<Record> {
        let (records, errors) = parse_body::<AptParser>(1100, APT, scope);
        assert_eq!(errors, 0);
        records
    }

    fn airports() -> Vec<AirportRecord> {
        parse(Some(LayerKind::Airport))
            .into_iter()
            .map(|r| match r {
                Record::Airport(a) => a,
                other => panic!("unexpected {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_airport_blocks() {
        let airports = airports();
        assert_eq!(airports.len(), 3);

        let ksea = &airports[0];
        assert_eq!(ksea.apt_icao, "KSEA");
        assert_eq!(ksea.apt_name, "Seattle Tacoma Intl");
        assert_eq!(ksea.apt_type, AirportType::Airport);
        assert!((ksea.elevation_m - 499.0 * FEET_TO_METER).abs() < 1e-9);
        assert!(ksea.has_tower);
        assert_eq!(ksea.tower_name, "Tower");
        assert!((ksea.hgt_tower_m.unwrap() - 233.0 * FEET_TO_METER).abs() < 1e-9);
        // Datum wins over the runway position.
        assert_eq!(ksea.lat, Some(47.449888));
        assert_eq!(ksea.lon, Some(-122.311777));

        let seaplane = &airports[1];
        assert_eq!(seaplane.apt_type, AirportType::SeaplaneBase);
        assert_eq!(seaplane.lat, Some(47.755));

        let heli = &airports[2];
        assert_eq!(heli.apt_type, AirportType::Heliport);
        assert_eq!(heli.lon, Some(-74.006));
    }

    #[test]
    fn test_runway_thresholds() {
        let records = parse(Some(LayerKind::RunwayThreshold));
        assert_eq!(records.len(), 2);
        let Record::RunwayThreshold(rwy16) = &records[0] else {
            panic!("expected runway threshold");
        };
        let Record::RunwayThreshold(rwy34) = &records[1] else {
            panic!("expected runway threshold");
        };

        assert_eq!(rwy16.apt_icao, "KSEA");
        assert_eq!(rwy16.rwy_num, "16L");
        assert_eq!(rwy34.rwy_num, "34R");
        assert_eq!(rwy16.surface, "Asphalt");
        assert_eq!(rwy16.edge_lighting, "HIRL");
        assert_eq!(rwy16.markings, "Precision approach");
        assert_eq!(rwy16.approach_lighting, "ALSF-II");
        assert_eq!(rwy34.approach_lighting, "MALSR");
        assert!(rwy16.touchdown_lights);
        assert_eq!(rwy16.reil, "None");

        assert!((rwy16.length_m - 2903.0).abs() < 10.0, "{}", rwy16.length_m);
        assert_eq!(rwy16.length_m, rwy34.length_m);
        // 16L points south, slightly west of due south.
        assert!((rwy16.true_heading_deg - 179.6).abs() < 0.3);
        assert!((rwy34.true_heading_deg - 359.6).abs() < 0.3);
    }

    #[test]
    fn test_other_airport_layers() {
        let water = parse(Some(LayerKind::WaterRunwayThreshold));
        assert_eq!(water.len(), 2);
        let Record::WaterRunwayThreshold(w) = &water[0] else {
            panic!("expected water runway");
        };
        assert_eq!(w.apt_icao, "W55");
        assert!(w.has_buoys);

        let helipads = parse(Some(LayerKind::Helipad));
        let Record::Helipad(h) = &helipads[0] else {
            panic!("expected helipad");
        };
        assert_eq!(h.helipad_name, "H1");
        assert_eq!(h.surface, "Asphalt");
        assert_eq!(h.edge_lighting, "Yes");

        let freqs = parse(Some(LayerKind::AtcFreq));
        assert_eq!(freqs.len(), 2);
        let Record::AtcFreq(atis) = &freqs[0] else {
            panic!("expected frequency");
        };
        assert_eq!(atis.atc_type, "ATIS");
        assert!((atis.freq_mhz - 123.8).abs() < 1e-9);

        assert_eq!(parse(Some(LayerKind::StartupLocation)).len(), 1);
        assert_eq!(parse(Some(LayerKind::LightBeacon)).len(), 1);
        assert_eq!(parse(Some(LayerKind::Windsock)).len(), 1);
    }

    #[test]
    fn test_833_khz_frequencies() {
        let body = "\
1    433 1 0 KSEA Seattle Tacoma Intl
1050 128275 ATIS
1054 119900 TWR
50 12380 OLD ATIS
";
        let (records, errors) = parse_body::<AptParser>(1200, body, Some(LayerKind::AtcFreq));
        assert_eq!(errors, 0);
        let freqs: Vec<(String, f64)> = records
            .iter()
            .map(|r| match r {
                Record::AtcFreq(f) => (f.atc_type.clone(), f.freq_mhz),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(freqs.len(), 3);
        assert_eq!(freqs[0].0, "ATIS");
        assert!((freqs[0].1 - 128.275).abs() < 1e-9);
        assert_eq!(freqs[1].0, "TWR");
        assert!((freqs[1].1 - 119.9).abs() < 1e-9);
        assert_eq!(freqs[2].0, "ATIS");
        assert!((freqs[2].1 - 123.8).abs() < 1e-9);
    }

    #[test]
    fn test_airport_without_position() {
        let body = "1 100 0 0 NOPOS Nowhere\n1302 city Somewhere\n";
        let (records, errors) = parse_body::<AptParser>(1100, body, None);
        assert_eq!(errors, 0);
        let Record::Airport(a) = &records[0] else {
            panic!("expected airport");
        };
        assert_eq!(a.lat, None);
        assert_eq!(a.lon, None);
    }

    #[test]
    fn test_rows_outside_airport_are_errors() {
        let body = "50 12380 ATIS\n1 100 0 0 LFBO Toulouse\n";
        let (records, errors) = parse_body::<AptParser>(1100, body, None);
        assert_eq!(errors, 1);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_rows_after_bad_header_are_dropped_quietly() {
        let body = "\
1 xx 0 0 BAD Broken
50 12380 ATIS
1 100 0 0 GOOD Good Field
50 12380 ATIS
";
        let (records, errors) = parse_body::<AptParser>(1100, body, None);
        assert_eq!(errors, 1);
        let kinds: Vec<LayerKind> = records.iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec![LayerKind::AtcFreq, LayerKind::Airport]);
    }

    #[test]
    fn test_short_runway_line_rejected() {
        let body = "1 100 0 0 LFBO Toulouse\n100 45 1 0 0.25 1 3 1 14R 43.6\n";
        let (records, errors) = parse_body::<AptParser>(1100, body, None);
        assert_eq!(errors, 1);
        assert_eq!(records.len(), 1);
    }
}
