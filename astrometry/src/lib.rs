//! Astrometric core for finder charts and catalog overlays.
//!
//! The pipeline is:
//!
//! ```text
//! raw FITS bytes ──► extract_primary_header ──► parse_cards ──► build_wcs ──► WcsModel
//!                                                                              │
//!                          catalog (RA, Dec) ──► world_to_pixel / project_overlay
//! ```
//!
//! Only linear WCS (CD matrix, or PC + CDELT) is supported. There is no
//! projection or distortion model, which is fine for fields of a few
//! arcminutes.
//!
//! # Pixel convention
//! All pixel coordinates are FITS 1-based: the centre of the first pixel is
//! (1, 1) and `CRPIX` is used as written. Convert explicitly with
//! [`PixelCoord::to_zero_based`] when indexing arrays or drawing.

pub mod cutout;
pub mod header;
pub mod overlay;
pub mod wcs;

use thiserror::Error;

pub use cutout::{CutoutConfig, CutoutSpec};
pub use header::{extract_primary_header, parse_cards, HeaderCard, HeaderCardTable};
pub use overlay::{project_overlay, Canvas, OverlayMarker, OverlayOptions, OverlayPlot, SkyPoint};
pub use wcs::{build_wcs, parse_fits_wcs, PixelCoord, Projector, WcsModel};

/// Errors that can occur while reading headers or applying a WCS
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WcsError {
    #[error("Missing keyword {0}")]
    MissingKeyword(String),

    #[error("Malformed value for {keyword}: {raw:?}")]
    MalformedValue { keyword: String, raw: String },

    #[error("CD matrix is singular (determinant {determinant:e})")]
    SingularMatrix { determinant: f64 },

    /// Advisory: the projection succeeded but landed outside the image
    #[error("Pixel ({x:.2}, {y:.2}) lies outside the image")]
    OutOfBounds { x: f64, y: f64 },
}

impl WcsError {
    pub(crate) fn malformed(keyword: &str, raw: impl Into<String>) -> Self {
        WcsError::MalformedValue {
            keyword: keyword.to_string(),
            raw: raw.into(),
        }
    }
}
