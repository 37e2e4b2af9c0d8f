//! Conversions between the supported time representations.
//!
//! All inputs are first resolved to one canonical [`UtcInstant`]; every
//! output representation is then derived from that instant together, in
//! [`TimeOutputs`].

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::leap::LeapSecondTable;
use crate::{
    gps_epoch, TimeError, UtcInstant, GPS_EPOCH_UNIX_SECONDS, MJD_OFFSET, SECONDS_PER_DAY,
    UNIX_EPOCH_JD,
};

/// Upper bound on GPS→UTC refinement steps.
///
/// Offsets change by one second at sparse boundaries, so at most one
/// boundary can be crossed per refinement.
const MAX_GPS_ITERATIONS: usize = 5;

const NANOS_PER_SECOND: f64 = 1e9;

/// Which representation a raw input string is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeKind {
    IsoUtc,
    Jd,
    Mjd,
    Gps,
}

impl TimeKind {
    pub const ALL: [TimeKind; 4] = [TimeKind::IsoUtc, TimeKind::Jd, TimeKind::Mjd, TimeKind::Gps];

    /// Short label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            TimeKind::IsoUtc => "ISO UTC",
            TimeKind::Jd => "JD",
            TimeKind::Mjd => "MJD",
            TimeKind::Gps => "GPS seconds",
        }
    }

    /// Error context for a well-formed number outside the representable
    /// instant range (about ±262 000 years around the common era)
    pub fn out_of_range_label(&self) -> &'static str {
        match self {
            TimeKind::IsoUtc => "ISO UTC (out of supported range)",
            TimeKind::Jd => "JD (out of supported range)",
            TimeKind::Mjd => "MJD (out of supported range)",
            TimeKind::Gps => "GPS seconds (out of supported range)",
        }
    }
}

impl fmt::Display for TimeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every representation of one instant.
///
/// Only constructible from an instant, so the fields can never disagree:
/// `mjd` is always exactly `jd − 2 400 000.5`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeOutputs {
    instant: UtcInstant,
    iso_utc: String,
    jd: f64,
    mjd: f64,
    gps_seconds: f64,
}

impl TimeOutputs {
    fn derive(instant: UtcInstant, converter: &TimeConverter<'_>) -> Self {
        let jd = UNIX_EPOCH_JD + unix_seconds(&instant) / SECONDS_PER_DAY;

        Self {
            instant,
            iso_utc: instant.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            jd,
            mjd: jd - MJD_OFFSET,
            gps_seconds: converter.utc_to_gps(&instant),
        }
    }

    pub fn instant(&self) -> UtcInstant {
        self.instant
    }

    /// RFC 3339 with a `Z` suffix; fractional digits only when non-zero
    pub fn iso_utc(&self) -> &str {
        &self.iso_utc
    }

    pub fn jd(&self) -> f64 {
        self.jd
    }

    pub fn mjd(&self) -> f64 {
        self.mjd
    }

    pub fn gps_seconds(&self) -> f64 {
        self.gps_seconds
    }
}

/// Time converter bound to a specific leap second table.
///
/// [`TimeConverter::default`] uses the built-in table; tests and future
/// table revisions can supply their own.
#[derive(Debug, Clone, Copy)]
pub struct TimeConverter<'a> {
    table: &'a LeapSecondTable,
}

impl Default for TimeConverter<'static> {
    fn default() -> Self {
        Self::new(LeapSecondTable::builtin())
    }
}

impl<'a> TimeConverter<'a> {
    pub fn new(table: &'a LeapSecondTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a LeapSecondTable {
        self.table
    }

    /// Resolve a raw user string of the given kind to a UTC instant.
    ///
    /// Numeric inputs must map to an instant chrono can represent, roughly
    /// JD −9.4e7 to 9.7e7.
    ///
    /// # Errors
    /// * `TimeError::MalformedValue` - empty, unparsable or non-finite input,
    ///   with the [`TimeKind::label`] context
    /// * `TimeError::MalformedValue` - a finite number beyond the supported
    ///   range, with the [`TimeKind::out_of_range_label`] context
    pub fn parse(&self, kind: TimeKind, raw: &str) -> Result<UtcInstant, TimeError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(TimeError::malformed(kind.label(), raw));
        }

        let instant = match kind {
            TimeKind::IsoUtc => {
                return parse_iso_utc(s).ok_or_else(|| TimeError::malformed(kind.label(), raw))
            }
            TimeKind::Jd => jd_to_instant(parse_number(kind, raw, s)?),
            TimeKind::Mjd => jd_to_instant(parse_number(kind, raw, s)? + MJD_OFFSET),
            TimeKind::Gps => self.gps_to_utc(parse_number(kind, raw, s)?),
        };
        instant.ok_or_else(|| {
            debug!("{kind} value {s} is outside the representable range");
            TimeError::malformed(kind.out_of_range_label(), raw)
        })
    }

    /// Derive all representations of `instant`.
    pub fn to_all_representations(&self, instant: UtcInstant) -> TimeOutputs {
        TimeOutputs::derive(instant, self)
    }

    /// Convert GPS seconds to UTC.
    ///
    /// The GPS−UTC offset is a function of UTC, not of GPS seconds, so the
    /// offset is found by fixed-point iteration starting from the
    /// offset-free guess.
    pub fn gps_to_utc(&self, gps_seconds: f64) -> Option<UtcInstant> {
        let mut guess = gps_epoch_plus(gps_seconds)?;

        for step in 0..MAX_GPS_ITERATIONS {
            let offset = self.table.offset_at(&guess);
            let next = gps_epoch_plus(gps_seconds - offset as f64)?;
            if next == guess {
                trace!("GPS {gps_seconds} converged after {step} refinements");
                return Some(guess);
            }
            guess = next;
        }

        debug!("GPS {gps_seconds} did not settle within {MAX_GPS_ITERATIONS} refinements");
        Some(guess)
    }

    /// Convert a UTC instant to GPS seconds.
    pub fn utc_to_gps(&self, instant: &UtcInstant) -> f64 {
        seconds_since_gps_epoch(instant) + self.table.offset_at(instant) as f64
    }
}

/// Parse `raw` as `kind` using the built-in leap second table.
pub fn parse(kind: TimeKind, raw: &str) -> Result<UtcInstant, TimeError> {
    TimeConverter::default().parse(kind, raw)
}

/// Derive every representation of `instant` using the built-in table.
pub fn to_all_representations(instant: UtcInstant) -> TimeOutputs {
    TimeConverter::default().to_all_representations(instant)
}

fn parse_number(kind: TimeKind, raw: &str, s: &str) -> Result<f64, TimeError> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(TimeError::malformed(kind.label(), raw)),
    }
}

/// Accepts `T` or a space between date and time, an optional fraction and
/// an optional offset. Without an offset the time is taken as UTC.
fn parse_iso_utc(s: &str) -> Option<UtcInstant> {
    let normalized = s.replacen(' ', "T", 1);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }

    trace!("{s:?} has no explicit offset, assuming UTC");
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn unix_seconds(instant: &UtcInstant) -> f64 {
    instant.timestamp() as f64 + instant.timestamp_subsec_nanos() as f64 / NANOS_PER_SECOND
}

fn seconds_since_gps_epoch(instant: &UtcInstant) -> f64 {
    (instant.timestamp() - GPS_EPOCH_UNIX_SECONDS) as f64
        + instant.timestamp_subsec_nanos() as f64 / NANOS_PER_SECOND
}

/// Split fractional seconds into whole seconds and nanoseconds, carrying a
/// rounded-up fraction into the next second.
fn split_seconds(seconds: f64) -> Option<(i64, u32)> {
    if !seconds.is_finite() || seconds.abs() >= i64::MAX as f64 {
        return None;
    }
    let mut whole = seconds.floor();
    let mut nanos = ((seconds - whole) * NANOS_PER_SECOND).round();
    if nanos >= NANOS_PER_SECOND {
        whole += 1.0;
        nanos -= NANOS_PER_SECOND;
    }
    Some((whole as i64, nanos as u32))
}

fn jd_to_instant(jd: f64) -> Option<UtcInstant> {
    let (secs, nanos) = split_seconds((jd - UNIX_EPOCH_JD) * SECONDS_PER_DAY)?;
    DateTime::from_timestamp(secs, nanos)
}

fn gps_epoch_plus(seconds: f64) -> Option<UtcInstant> {
    let (secs, nanos) = split_seconds(seconds)?;
    let delta = TimeDelta::try_seconds(secs)? + TimeDelta::nanoseconds(nanos as i64);
    gps_epoch().checked_add_signed(delta)
}
