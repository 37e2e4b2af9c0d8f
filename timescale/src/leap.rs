//! GPS−UTC leap second table.
//!
//! The table is data, not code: the built-in copy is embedded from
//! `data/leap_seconds.json` and parsed once on first use. When IERS announces
//! a new leap second, append an entry to that file and bump `version`.

use chrono::{DateTime, Utc};
use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{TimeError, UtcInstant};

const BUILTIN_JSON: &str = include_str!("../data/leap_seconds.json");

static BUILTIN: Lazy<LeapSecondTable> = Lazy::new(|| {
    LeapSecondTable::from_json(BUILTIN_JSON).expect("embedded leap second table is valid")
});

/// One step of the table: from `effective_utc` onward GPS leads UTC by
/// `gps_minus_utc` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeapEntry {
    pub effective_utc: DateTime<Utc>,
    pub gps_minus_utc: i32,
}

impl LeapEntry {
    pub fn new(effective_utc: DateTime<Utc>, gps_minus_utc: i32) -> Self {
        Self {
            effective_utc,
            gps_minus_utc,
        }
    }
}

/// Ordered, append-only GPS−UTC offset table.
///
/// Entries are strictly increasing in both effective instant and offset.
/// Construction validates this, so lookups can assume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct LeapSecondTable {
    version: String,
    source: String,
    entries: Vec<LeapEntry>,
}

#[derive(Deserialize)]
struct RawTable {
    version: String,
    #[serde(default)]
    source: String,
    entries: Vec<LeapEntry>,
}

impl TryFrom<RawTable> for LeapSecondTable {
    type Error = TimeError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        LeapSecondTable::new(raw.version, raw.source, raw.entries)
    }
}

impl LeapSecondTable {
    /// Build a table from explicit entries.
    ///
    /// # Errors
    /// * `TimeError::InvalidLeapTable` - if entries are empty or not strictly
    ///   increasing in both instant and offset
    pub fn new(
        version: impl Into<String>,
        source: impl Into<String>,
        entries: Vec<LeapEntry>,
    ) -> Result<Self, TimeError> {
        if entries.is_empty() {
            return Err(TimeError::InvalidLeapTable("table has no entries".into()));
        }

        for pair in entries.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.effective_utc <= prev.effective_utc {
                return Err(TimeError::InvalidLeapTable(format!(
                    "entry at {} does not follow {}",
                    next.effective_utc, prev.effective_utc
                )));
            }
            if next.gps_minus_utc <= prev.gps_minus_utc {
                return Err(TimeError::InvalidLeapTable(format!(
                    "offset {} at {} does not increase on {}",
                    next.gps_minus_utc, next.effective_utc, prev.gps_minus_utc
                )));
            }
        }

        Ok(Self {
            version: version.into(),
            source: source.into(),
            entries,
        })
    }

    /// Parse and validate a table from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, TimeError> {
        let table: LeapSecondTable = serde_json::from_str(json)
            .map_err(|e| TimeError::InvalidLeapTable(e.to_string()))?;
        debug!(
            "Loaded leap second table version {} ({} entries)",
            table.version,
            table.entries.len()
        );
        Ok(table)
    }

    /// The process-wide table shipped with the crate.
    pub fn builtin() -> &'static LeapSecondTable {
        &BUILTIN
    }

    /// Return a new table with `entry` appended after the current last entry.
    ///
    /// The receiver is left untouched.
    pub fn append(&self, entry: LeapEntry, version: impl Into<String>) -> Result<Self, TimeError> {
        let mut entries = self.entries.clone();
        entries.push(entry);
        Self::new(version, self.source.clone(), entries)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn entries(&self) -> &[LeapEntry] {
        &self.entries
    }

    /// GPS−UTC offset in seconds in effect at `utc`.
    ///
    /// Returns the offset of the last entry whose effective instant is at or
    /// before `utc`, or 0 before the first entry.
    pub fn offset_at(&self, utc: &UtcInstant) -> i32 {
        let mut offset = 0;
        for entry in &self.entries {
            if entry.effective_utc <= *utc {
                offset = entry.gps_minus_utc;
            } else {
                break;
            }
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> UtcInstant {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_builtin_table_loads() {
        let table = LeapSecondTable::builtin();
        assert_eq!(table.version(), "2017-01-01");
        assert_eq!(table.entries().len(), 19);
        assert_eq!(table.entries()[0].gps_minus_utc, 0);
        assert_eq!(table.entries().last().unwrap().gps_minus_utc, 18);
    }

    #[rstest]
    #[case(utc(1979, 1, 1, 0, 0, 0), 0)]
    #[case(utc(1980, 1, 6, 0, 0, 0), 0)]
    #[case(utc(1981, 6, 30, 23, 59, 59), 0)]
    #[case(utc(1981, 7, 1, 0, 0, 0), 1)]
    #[case(utc(1998, 12, 31, 23, 59, 59), 12)]
    #[case(utc(1999, 1, 1, 0, 0, 0), 13)]
    #[case(utc(2005, 12, 31, 23, 59, 59), 13)]
    #[case(utc(2006, 1, 1, 0, 0, 0), 14)]
    #[case(utc(2016, 12, 31, 23, 59, 59), 17)]
    #[case(utc(2017, 1, 1, 0, 0, 0), 18)]
    #[case(utc(2030, 6, 1, 0, 0, 0), 18)]
    fn test_offset_at(#[case] instant: UtcInstant, #[case] expected: i32) {
        assert_eq!(LeapSecondTable::builtin().offset_at(&instant), expected);
    }

    #[test]
    fn test_offset_keeps_last_match_not_first() {
        // every entry before 2010 qualifies; the answer must be the latest one
        let table = LeapSecondTable::builtin();
        assert_eq!(table.offset_at(&utc(2010, 1, 1, 0, 0, 0)), 15);
    }

    #[test]
    fn test_append_extends_without_mutating() {
        let table = LeapSecondTable::builtin();
        let extended = table
            .append(LeapEntry::new(utc(2035, 1, 1, 0, 0, 0), 19), "2035-01-01")
            .unwrap();

        assert_eq!(extended.entries().len(), table.entries().len() + 1);
        assert_eq!(extended.version(), "2035-01-01");
        assert_eq!(extended.offset_at(&utc(2036, 1, 1, 0, 0, 0)), 19);
        assert_eq!(table.offset_at(&utc(2036, 1, 1, 0, 0, 0)), 18);
    }

    #[test]
    fn test_append_rejects_out_of_order() {
        let table = LeapSecondTable::builtin();
        let err = table
            .append(LeapEntry::new(utc(2016, 1, 1, 0, 0, 0), 19), "bad")
            .unwrap_err();
        assert!(matches!(err, TimeError::InvalidLeapTable(_)));

        let err = table
            .append(LeapEntry::new(utc(2035, 1, 1, 0, 0, 0), 18), "bad")
            .unwrap_err();
        assert!(matches!(err, TimeError::InvalidLeapTable(_)));
    }

    #[test]
    fn test_from_json_validates() {
        let json = r#"{
            "version": "test",
            "entries": [
                { "effective_utc": "1990-01-01T00:00:00Z", "gps_minus_utc": 6 },
                { "effective_utc": "1985-07-01T00:00:00Z", "gps_minus_utc": 4 }
            ]
        }"#;
        assert!(matches!(
            LeapSecondTable::from_json(json),
            Err(TimeError::InvalidLeapTable(_))
        ));

        assert!(LeapSecondTable::from_json(r#"{"version": "x", "entries": []}"#).is_err());
        assert!(LeapSecondTable::from_json("not json").is_err());
    }

    #[test]
    fn test_from_json_minimal() {
        let json = r#"{
            "version": "mini",
            "entries": [{ "effective_utc": "2000-01-01T00:00:00Z", "gps_minus_utc": 5 }]
        }"#;
        let table = LeapSecondTable::from_json(json).unwrap();
        assert_eq!(table.source(), "");
        assert_eq!(table.offset_at(&utc(1999, 1, 1, 0, 0, 0)), 0);
        assert_eq!(table.offset_at(&utc(2000, 1, 1, 0, 0, 0)), 5);
    }
}
