use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;

use crate::DsmrParseError;

lazy_static! {
    static ref TIMESTAMP_PATTERN: Regex =
        Regex::new("^([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})([SW])$")
            .unwrap();
}

/// The pair of UTC offsets a meter clock switches between, selected by the
/// DST flag at the end of each timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterTimeZone {
    /// Offset while DST is active (`S` flag).
    pub summer: FixedOffset,
    /// Offset outside DST (`W` flag).
    pub winter: FixedOffset,
}

impl Default for MeterTimeZone {
    /// Dutch meters run CET/CEST.
    fn default() -> Self {
        MeterTimeZone {
            summer: FixedOffset::east_opt(2 * 3600).unwrap(),
            winter: FixedOffset::east_opt(3600).unwrap(),
        }
    }
}

/// Decoder for the 13 character timestamps used on the P1 port:
/// `YYMMDDhhmmss` followed by `S` (summer) or `W` (winter).
///
/// The flag picks the UTC offset directly, so the otherwise ambiguous hour
/// around the DST changeover resolves without calendar lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampParser {
    zone: MeterTimeZone,
}

impl TimestampParser {
    pub fn new() -> Self {
        TimestampParser::default()
    }

    pub fn with_zone(zone: MeterTimeZone) -> Self {
        TimestampParser { zone }
    }

    /// Decodes one timestamp token. Years map into 2000..=2099.
    pub fn parse(&self, token: &str) -> Result<DateTime<FixedOffset>, DsmrParseError> {
        let captures = TIMESTAMP_PATTERN
            .captures(token)
            .ok_or_else(|| DsmrParseError::InvalidTimestamp(token.to_string()))?;
        // the pattern guarantees two digit groups
        let digits = |index: usize| -> u32 { captures[index].parse().unwrap_or(0) };

        let naive = NaiveDate::from_ymd_opt(2000 + digits(1) as i32, digits(2), digits(3))
            .and_then(|date| date.and_hms_opt(digits(4), digits(5), digits(6)))
            .ok_or_else(|| DsmrParseError::InvalidTimestamp(token.to_string()))?;
        let offset = match &captures[7] {
            "S" => self.zone.summer,
            _ => self.zone.winter,
        };
        offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| DsmrParseError::InvalidTimestamp(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summer_time_offset() {
        let stamp = TimestampParser::new().parse("200624113000S").unwrap();
        assert_eq!(stamp.to_rfc3339(), "2020-06-24T11:30:00+02:00");
        // same civil fields come back out
        assert_eq!(stamp.format("%y%m%d%H%M%S").to_string(), "200624113000");
    }

    #[test]
    fn test_winter_time_offset() {
        let stamp = TimestampParser::new().parse("200208153516W").unwrap();
        assert_eq!(stamp.to_rfc3339(), "2020-02-08T15:35:16+01:00");
    }

    #[test]
    fn test_dst_overlap_hour_is_unambiguous() {
        let parser = TimestampParser::new();
        let late_summer = parser.parse("201025023000S").unwrap();
        let early_winter = parser.parse("201025023000W").unwrap();
        // same wall clock reading, one real hour apart
        assert_eq!(
            early_winter.timestamp() - late_summer.timestamp(),
            3600
        );
    }

    #[test]
    fn test_leap_day() {
        let parser = TimestampParser::new();
        assert!(parser.parse("200229000000W").is_ok());
        assert!(parser.parse("190229000000W").is_err());
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        let parser = TimestampParser::new();
        for token in [
            "",
            "200624113000",
            "2006241130000",
            "20062411300S",
            "200624113000X",
            "200624113000s",
            "2O0624113000W",
            "201301113000W",
            "200632113000W",
            "200624250000W",
            "200624116000W",
            "noodles",
        ] {
            assert!(parser.parse(token).is_err(), "accepted {token:?}");
        }
    }

    #[test]
    fn test_custom_zone() {
        let zone = MeterTimeZone {
            summer: FixedOffset::east_opt(3 * 3600).unwrap(),
            winter: FixedOffset::east_opt(2 * 3600).unwrap(),
        };
        let parser = TimestampParser::with_zone(zone);
        let stamp = parser.parse("200101000000W").unwrap();
        assert_eq!(stamp.to_rfc3339(), "2020-01-01T00:00:00+02:00");
    }
}
