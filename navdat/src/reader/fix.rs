//! Parser for fix.dat / earth_fix.dat.
//!
//! Format: `<lat> <lon> <name> [terminal area] [region] [type]`. Only the
//! first three columns are shared by every version.

use super::fields::Fields;
use super::{Emitter, FileFormat, LineParser};
use crate::error::RecordError;
use crate::record::{FixRecord, Record};

pub(crate) struct FixParser;

impl LineParser for FixParser {
    const FORMAT: FileFormat = FileFormat::Fix;

    fn new(_version: u32) -> Self {
        FixParser
    }

    fn parse_line(&mut self, fields: &Fields<'_>, out: &mut Emitter<'_>) -> Result<(), RecordError> {
        fields.require(3)?;
        let (lat, lon) = fields.position(0, 1)?;
        out.emit(Record::Fix(FixRecord {
            fix_name: fields.str(2).to_string(),
            lat,
            lon,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::test_support::parse_body;

    #[test]
    fn test_parse_fixes() {
        let body = "\
 37.428522 -122.104592 AAAME
-33.908056  151.188333 ABBEY
 51.000000   -0.500000 ABBOT ENRT EG 2105430
99
 10.0 10.0 AFTER
";
        let (records, errors) = parse_body::<FixParser>(600, body, None);
        assert_eq!(errors, 0);
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[1],
            Record::Fix(FixRecord {
                fix_name: "ABBEY".to_string(),
                lat: -33.908056,
                lon: 151.188333,
            })
        );
        let Record::Fix(abbot) = &records[2] else {
            panic!("expected fix");
        };
        assert_eq!(abbot.fix_name, "ABBOT");
    }

    #[test]
    fn test_bad_fix_lines() {
        let body = "\
37.4 -122.1
abc -122.1 NAME
37.4 200.0 FAR
";
        let (records, errors) = parse_body::<FixParser>(600, body, None);
        assert!(records.is_empty());
        assert_eq!(errors, 3);
    }
}
