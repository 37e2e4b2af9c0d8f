//! Time representation conversions for the astronomy tools.
//!
//! A single UTC instant can be viewed as:
//!
//! | Representation | Definition |
//! |---|---|
//! | ISO UTC | RFC 3339 civil timestamp |
//! | JD | Julian Date, days since −4712-01-01 12:00 |
//! | MJD | JD − 2 400 000.5 |
//! | GPS | seconds since 1980-01-06T00:00:00 UTC, no leap seconds |
//!
//! GPS time runs ahead of UTC by the number of leap seconds inserted since
//! the GPS epoch; see [`leap::LeapSecondTable`].

pub mod convert;
pub mod leap;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use convert::{parse, to_all_representations, TimeConverter, TimeKind, TimeOutputs};
pub use leap::{LeapEntry, LeapSecondTable};

/// A civil UTC instant with nanosecond resolution
pub type UtcInstant = DateTime<Utc>;

/// Julian Date of the Unix epoch (1970-01-01T00:00:00Z)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Offset between Julian Date and Modified Julian Date
pub const MJD_OFFSET: f64 = 2_400_000.5;

/// Seconds in one civil day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Unix timestamp of the GPS epoch (1980-01-06T00:00:00Z)
pub const GPS_EPOCH_UNIX_SECONDS: i64 = 315_964_800;

/// Errors that can occur while parsing or converting times
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeError {
    #[error("Malformed {context} value: {raw:?}")]
    MalformedValue { context: &'static str, raw: String },

    #[error("Invalid leap second table: {0}")]
    InvalidLeapTable(String),
}

impl TimeError {
    pub(crate) fn malformed(context: &'static str, raw: &str) -> Self {
        TimeError::MalformedValue {
            context,
            raw: raw.to_string(),
        }
    }
}

/// The GPS epoch as a UTC instant.
pub fn gps_epoch() -> UtcInstant {
    DateTime::<Utc>::UNIX_EPOCH + chrono::TimeDelta::seconds(GPS_EPOCH_UNIX_SECONDS)
}
