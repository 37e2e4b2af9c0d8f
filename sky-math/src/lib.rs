//! Small sky-geometry toolkit shared by the astrometry and UI layers.
//!
//! Everything here works in decimal degrees at the API boundary and converts
//! to radians internally. Functions are pure and allocation free.

pub mod sexagesimal;
pub mod spherical;

pub use sexagesimal::{parse_dec_deg, parse_ra_deg, AngleError};
pub use spherical::{
    angular_separation_arcsec, angular_separation_deg, normalize_ra, wrap_delta_ra,
};

/// Arcseconds per degree
pub const ARCSEC_PER_DEG: f64 = 3600.0;

/// Arcminutes per degree
pub const ARCMIN_PER_DEG: f64 = 60.0;
