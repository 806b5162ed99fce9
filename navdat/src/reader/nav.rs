//! Parser for X-Plane's nav.dat / earth_nav.dat navaid database.
//!
//! Every navaid line shares a common prefix:
//!
//! ```text
//! <code> <lat> <lon> <elev_ft> <freq> <range_nm> <extra> <ident> ...
//! ```
//!
//! `extra` is the slaved variation for VORs, the true heading for
//! localizers and markers, the encoded angle and heading for glideslopes and
//! the bias for DMEs.
//!
//! From version 1150 two region columns follow `ident`, which shifts the
//! remaining columns right by two for named navaids and by one for runway
//! navaids (airport ICAO, region, runway).

use super::fields::Fields;
use super::{Emitter, FileFormat, LineParser};
use crate::error::RecordError;
use crate::geo::{FEET_TO_METER, NM_TO_KM};
use crate::layer::LayerKind;
use crate::record::{
    DmeIlsRecord, DmeRecord, GlideslopeRecord, IlsRecord, MarkerRecord, NdbRecord, Record,
    VorRecord,
};

const NDB: u32 = 2;
const VOR: u32 = 3;
const ILS_LOC: u32 = 4;
const LOC: u32 = 5;
const GLIDESLOPE: u32 = 6;
const OUTER_MARKER: u32 = 7;
const MIDDLE_MARKER: u32 = 8;
const INNER_MARKER: u32 = 9;
const DME_COMPONENT: u32 = 12;
const DME_STANDALONE: u32 = 13;

/// First version using the extended column layout.
const EXTENDED_LAYOUT_VERSION: u32 = 1150;

/// Columns shared by every navaid row.
struct Common {
    lat: f64,
    lon: f64,
    elevation_m: f64,
    freq: f64,
    range_km: f64,
    extra: f64,
    ident: String,
}

pub(crate) struct NavParser {
    extended: bool,
}

impl NavParser {
    /// Index of the first name token for VOR/NDB/DME rows.
    fn name_start(&self) -> usize {
        if self.extended {
            10
        } else {
            8
        }
    }

    /// Index of the runway token for ILS/GS/marker/DME-ILS rows.
    fn runway_index(&self) -> usize {
        if self.extended {
            10
        } else {
            9
        }
    }

    fn common(fields: &Fields<'_>, min_fields: usize) -> Result<Common, RecordError> {
        fields.require(min_fields)?;
        let (lat, lon) = fields.position(1, 2)?;
        Ok(Common {
            lat,
            lon,
            elevation_m: fields.f64(3, "elevation")? * FEET_TO_METER,
            freq: fields.f64(4, "frequency")?,
            range_km: fields.f64(5, "range")? * NM_TO_KM,
            extra: fields.f64(6, "heading/variation")?,
            ident: fields.str(7).to_string(),
        })
    }

    /// Name and type tokens of a named navaid: everything after the prefix,
    /// the last token being the type (`VOR-DME`, `NDB`, ...).
    fn name_and_subtype(&self, fields: &Fields<'_>) -> (String, String) {
        let start = self.name_start();
        let last = fields.len() - 1;
        (fields.join_range(start, last), fields.str(last).to_string())
    }

    fn parse_ndb(&self, fields: &Fields<'_>, out: &mut Emitter<'_>) -> Result<(), RecordError> {
        let c = Self::common(fields, self.name_start() + 1)?;
        let (navaid_name, subtype) = self.name_and_subtype(fields);
        out.emit(Record::Ndb(NdbRecord {
            navaid_id: c.ident,
            navaid_name,
            subtype,
            lat: c.lat,
            lon: c.lon,
            elevation_m: c.elevation_m,
            freq_khz: c.freq,
            range_km: c.range_km,
        }));
        Ok(())
    }

    fn parse_vor(&self, fields: &Fields<'_>, out: &mut Emitter<'_>) -> Result<(), RecordError> {
        let c = Self::common(fields, self.name_start() + 1)?;
        let (navaid_name, subtype) = self.name_and_subtype(fields);
        out.emit(Record::Vor(VorRecord {
            navaid_id: c.ident,
            navaid_name,
            subtype,
            lat: c.lat,
            lon: c.lon,
            elevation_m: c.elevation_m,
            freq_mhz: c.freq / 100.0,
            range_km: c.range_km,
            slaved_variation_deg: c.extra,
        }));
        Ok(())
    }

    fn parse_ils(&self, fields: &Fields<'_>, out: &mut Emitter<'_>) -> Result<(), RecordError> {
        let rwy = self.runway_index();
        let c = Self::common(fields, rwy + 2)?;
        out.emit(Record::Ils(IlsRecord {
            navaid_id: c.ident,
            apt_icao: fields.str(8).to_string(),
            rwy_num: fields.str(rwy).to_string(),
            subtype: fields.join_from(rwy + 1),
            lat: c.lat,
            lon: c.lon,
            elevation_m: c.elevation_m,
            freq_mhz: c.freq / 100.0,
            range_km: c.range_km,
            true_heading_deg: c.extra,
        }));
        Ok(())
    }

    fn parse_glideslope(
        &self,
        fields: &Fields<'_>,
        out: &mut Emitter<'_>,
    ) -> Result<(), RecordError> {
        let rwy = self.runway_index();
        let c = Self::common(fields, rwy + 1)?;

        // Encoded as `angle * 100000 + heading`, angle in hundredths of a degree.
        let angle_hundredths = (c.extra / 1000.0).trunc();
        let true_heading_deg = c.extra - angle_hundredths * 1000.0;

        out.emit(Record::Glideslope(GlideslopeRecord {
            navaid_id: c.ident,
            apt_icao: fields.str(8).to_string(),
            rwy_num: fields.str(rwy).to_string(),
            lat: c.lat,
            lon: c.lon,
            elevation_m: c.elevation_m,
            freq_mhz: c.freq / 100.0,
            range_km: c.range_km,
            true_heading_deg,
            glide_slope_deg: angle_hundredths / 100.0,
        }));
        Ok(())
    }

    fn parse_marker(
        &self,
        code: u32,
        fields: &Fields<'_>,
        out: &mut Emitter<'_>,
    ) -> Result<(), RecordError> {
        let rwy = self.runway_index();
        let c = Self::common(fields, rwy + 1)?;
        let mut subtype = fields.join_from(rwy + 1);
        if subtype.is_empty() {
            let default = match code {
                OUTER_MARKER => "OM",
                MIDDLE_MARKER => "MM",
                _ => "IM",
            };
            subtype = default.to_string();
        }
        out.emit(Record::Marker(MarkerRecord {
            apt_icao: fields.str(8).to_string(),
            rwy_num: fields.str(rwy).to_string(),
            subtype,
            lat: c.lat,
            lon: c.lon,
            elevation_m: c.elevation_m,
            true_heading_deg: c.extra,
        }));
        Ok(())
    }

    fn parse_dme(&self, fields: &Fields<'_>, out: &mut Emitter<'_>) -> Result<(), RecordError> {
        let is_ils = fields.str(fields.len().saturating_sub(1)).eq_ignore_ascii_case("DME-ILS");

        if is_ils {
            if !out.wants(LayerKind::DmeIls) {
                return Ok(());
            }
            let rwy = self.runway_index();
            let c = Self::common(fields, rwy + 2)?;
            out.emit(Record::DmeIls(DmeIlsRecord {
                navaid_id: c.ident,
                apt_icao: fields.str(8).to_string(),
                rwy_num: fields.str(rwy).to_string(),
                lat: c.lat,
                lon: c.lon,
                elevation_m: c.elevation_m,
                freq_mhz: c.freq / 100.0,
                range_km: c.range_km,
                bias_km: c.extra * NM_TO_KM,
            }));
            return Ok(());
        }

        if !out.wants(LayerKind::Dme) {
            return Ok(());
        }
        let c = Self::common(fields, self.name_start() + 1)?;
        let (navaid_name, subtype) = self.name_and_subtype(fields);
        out.emit(Record::Dme(DmeRecord {
            navaid_id: c.ident,
            navaid_name,
            subtype,
            lat: c.lat,
            lon: c.lon,
            elevation_m: c.elevation_m,
            freq_mhz: c.freq / 100.0,
            range_km: c.range_km,
            bias_km: c.extra * NM_TO_KM,
        }));
        Ok(())
    }
}

impl LineParser for NavParser {
    const FORMAT: FileFormat = FileFormat::Nav;

    fn new(version: u32) -> Self {
        Self {
            extended: version >= EXTENDED_LAYOUT_VERSION,
        }
    }

    fn parse_line(&mut self, fields: &Fields<'_>, out: &mut Emitter<'_>) -> Result<(), RecordError> {
        let code = fields.u32(0, "row code")?;
        match code {
            NDB if out.wants(LayerKind::Ndb) => self.parse_ndb(fields, out),
            VOR if out.wants(LayerKind::Vor) => self.parse_vor(fields, out),
            ILS_LOC | LOC if out.wants(LayerKind::Ils) => self.parse_ils(fields, out),
            GLIDESLOPE if out.wants(LayerKind::Glideslope) => self.parse_glideslope(fields, out),
            OUTER_MARKER | MIDDLE_MARKER | INNER_MARKER if out.wants(LayerKind::Marker) => {
                self.parse_marker(code, fields, out)
            }
            DME_COMPONENT | DME_STANDALONE => self.parse_dme(fields, out),
            // Out of scope, or codes without a layer (FPAP, GLS, thresholds).
            _ => Ok(()),
        }
    }
}
