//! Whitespace tokenizer with typed accessors for record lines.

use crate::error::RecordError;
use crate::geo;

/// Tokens of one record line.
pub(crate) struct Fields<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(line: &'a str) -> Self {
        Self {
            tokens: line.split_whitespace().collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Fail unless the line has at least `count` tokens.
    pub(crate) fn require(&self, count: usize) -> Result<(), RecordError> {
        if self.tokens.len() < count {
            return Err(RecordError::TooFewFields {
                expected: count,
                found: self.tokens.len(),
            });
        }
        Ok(())
    }

    /// Token at `index`, or `""` past the end.
    pub(crate) fn str(&self, index: usize) -> &'a str {
        self.tokens.get(index).copied().unwrap_or("")
    }

    pub(crate) fn f64(&self, index: usize, field: &'static str) -> Result<f64, RecordError> {
        let token = self.str(index);
        token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| RecordError::InvalidValue {
                field,
                value: token.to_string(),
            })
    }

    pub(crate) fn i64(&self, index: usize, field: &'static str) -> Result<i64, RecordError> {
        let token = self.str(index);
        token.parse::<i64>().map_err(|_| RecordError::InvalidValue {
            field,
            value: token.to_string(),
        })
    }

    pub(crate) fn u32(&self, index: usize, field: &'static str) -> Result<u32, RecordError> {
        let token = self.str(index);
        token.parse::<u32>().map_err(|_| RecordError::InvalidValue {
            field,
            value: token.to_string(),
        })
    }

    /// Integer flag; any non-zero value is true.
    pub(crate) fn flag(&self, index: usize, field: &'static str) -> Result<bool, RecordError> {
        Ok(self.i64(index, field)? != 0)
    }

    /// Latitude/longitude pair, validated.
    pub(crate) fn position(&self, lat_index: usize, lon_index: usize) -> Result<(f64, f64), RecordError> {
        let lat = self.f64(lat_index, "latitude")?;
        let lon = self.f64(lon_index, "longitude")?;
        if !geo::is_valid_position(lat, lon) {
            return Err(RecordError::CoordinateOutOfRange { lat, lon });
        }
        Ok((lat, lon))
    }

    /// Tokens from `start` to the end, joined by single spaces.
    pub(crate) fn join_from(&self, start: usize) -> String {
        self.join_range(start, self.tokens.len())
    }

    /// Tokens in `[start, end)`, joined by single spaces.
    pub(crate) fn join_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        if start >= end {
            return String::new();
        }
        self.tokens[start..end].join(" ")
    }
}
