use std::fmt::Write;
use std::ops::Range;

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use crate::error::Error;

pub struct Utils;

impl Utils {
    /// Renders bytes as their uppercase two-digit hex representation, in
    /// input order. Device and radio identifiers go over the wire as raw
    /// bytes but are presented in this form everywhere else.
    pub fn hex_string(bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            let _ = write!(out, "{:02X}", b);
        }
        out
    }

    /// Decodes the gateway's 7-byte timestamp into a civil time in `tz`.
    ///
    /// The encoding is quasi-BCD: the hex digits of each byte are the
    /// decimal digits of the field, so 0x20 0x21 is the year 2021 rather
    /// than the number 8225. Fields are year (2 bytes), month, day, hour,
    /// minute, second. Out-of-range fields are rejected, not normalised.
    pub fn decimal_timestamp(raw: &[u8], tz: Tz) -> Result<DateTime<Tz>, Error> {
        if raw.len() != 7 {
            return Err(Error::MalformedBody(format!(
                "timestamp field must be 7 bytes, got {}",
                raw.len()
            )));
        }

        let year = Self::hex_as_decimal(&raw[0..2])?;
        let month = Self::hex_as_decimal(&raw[2..3])?;
        let day = Self::hex_as_decimal(&raw[3..4])?;
        let hour = Self::hex_as_decimal(&raw[4..5])?;
        let minute = Self::hex_as_decimal(&raw[5..6])?;
        let second = Self::hex_as_decimal(&raw[6..7])?;

        tz.with_ymd_and_hms(year as i32, month, day, hour, minute, second)
            .earliest()
            .ok_or_else(|| {
                Error::MalformedBody(format!(
                    "timestamp fields out of range: {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, minute, second
                ))
            })
    }

    // Hex digits reinterpreted as a decimal number. Fails on digits A-F,
    // which cannot appear in a well-formed timestamp.
    fn hex_as_decimal(raw: &[u8]) -> Result<u32, Error> {
        let digits = Self::hex_string(raw);
        digits.parse().map_err(|_| {
            Error::MalformedBody(format!("hex digits {:?} do not form a decimal number", digits))
        })
    }

    /// Bounds-checked sub-slice; a frame that passed length validation can
    /// still be too short for a record's fixed offsets.
    pub fn field<'a>(raw: &'a [u8], at: Range<usize>, what: &str) -> Result<&'a [u8], Error> {
        raw.get(at.clone()).ok_or_else(|| {
            Error::MalformedBody(format!(
                "{} at {}..{} is outside the {}-byte body",
                what,
                at.start,
                at.end,
                raw.len()
            ))
        })
    }

    pub fn be_u16(raw: &[u8], at: Range<usize>, what: &str) -> Result<u16, Error> {
        let bytes = Self::field(raw, at, what)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn be_u32(raw: &[u8], at: Range<usize>, what: &str) -> Result<u32, Error> {
        let bytes = Self::field(raw, at, what)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Parses an ASCII decimal sub-field, e.g. the 4-digit frame length or
    /// the 3-digit version length.
    pub fn ascii_number(raw: &[u8], at: Range<usize>, what: &str) -> Result<usize, Error> {
        let bytes = Self::field(raw, at, what)?;
        std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::MalformedBody(format!("could not parse {} from body", what)))
    }
}
