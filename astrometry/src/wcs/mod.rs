//! Linear World Coordinate System model.
//!
//! The model maps a pixel offset from the reference pixel to a sky offset
//! from the reference position through the CD matrix:
//!
//! ```text
//! ⎡ΔRA ⎤   ⎡CD1_1 CD1_2⎤ ⎡x − CRPIX1⎤
//! ⎣ΔDec⎦ = ⎣CD2_1 CD2_2⎦ ⎣y − CRPIX2⎦
//! ```

mod builder;
mod transform;

pub use builder::build_wcs;
pub use transform::Projector;

use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

use crate::header::{extract_primary_header, parse_cards};
use crate::WcsError;
use sky_math::ARCSEC_PER_DEG;

/// A pixel position in FITS 1-based coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelCoord {
    pub x: f64,
    pub y: f64,
}

impl PixelCoord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Same position in 0-based array coordinates
    pub fn to_zero_based(&self) -> (f64, f64) {
        (self.x - 1.0, self.y - 1.0)
    }

    /// Build from 0-based array coordinates
    pub fn from_zero_based(x: f64, y: f64) -> Self {
        Self::new(x + 1.0, y + 1.0)
    }
}

/// Immutable linear WCS for one image.
///
/// Built once per downloaded header with [`build_wcs`] and then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWcsModel")]
pub struct WcsModel {
    naxis1: u32,
    naxis2: u32,
    crpix1: f64,
    crpix2: f64,
    crval1: f64,
    crval2: f64,
    cd: Matrix2<f64>,
}

#[derive(Deserialize)]
struct RawWcsModel {
    naxis1: i64,
    naxis2: i64,
    crpix1: f64,
    crpix2: f64,
    crval1: f64,
    crval2: f64,
    cd: Matrix2<f64>,
}

impl TryFrom<RawWcsModel> for WcsModel {
    type Error = WcsError;

    fn try_from(raw: RawWcsModel) -> Result<Self, Self::Error> {
        WcsModel::new(
            (raw.naxis1, raw.naxis2),
            (raw.crpix1, raw.crpix2),
            (raw.crval1, raw.crval2),
            raw.cd,
        )
    }
}

impl WcsModel {
    /// Create a model from its parts.
    ///
    /// # Arguments
    /// * `naxis` - Image size (NAXIS1, NAXIS2) in pixels
    /// * `crpix` - Reference pixel, 1-based
    /// * `crval` - Reference position (RA, Dec) in degrees
    /// * `cd` - CD matrix in degrees per pixel
    ///
    /// # Errors
    /// * `WcsError::MalformedValue` - non-positive axis length or non-finite
    ///   reference values
    pub fn new(
        naxis: (i64, i64),
        crpix: (f64, f64),
        crval: (f64, f64),
        cd: Matrix2<f64>,
    ) -> Result<Self, WcsError> {
        let naxis1 = axis_length("NAXIS1", naxis.0)?;
        let naxis2 = axis_length("NAXIS2", naxis.1)?;

        for (keyword, value) in [
            ("CRPIX1", crpix.0),
            ("CRPIX2", crpix.1),
            ("CRVAL1", crval.0),
            ("CRVAL2", crval.1),
        ] {
            if !value.is_finite() {
                return Err(WcsError::malformed(keyword, value.to_string()));
            }
        }
        if cd.iter().any(|v| !v.is_finite()) {
            return Err(WcsError::malformed("CD", format!("{cd:?}")));
        }

        Ok(Self {
            naxis1,
            naxis2,
            crpix1: crpix.0,
            crpix2: crpix.1,
            crval1: crval.0,
            crval2: crval.1,
            cd,
        })
    }

    pub fn naxis1(&self) -> u32 {
        self.naxis1
    }

    pub fn naxis2(&self) -> u32 {
        self.naxis2
    }

    /// Reference pixel (CRPIX1, CRPIX2), 1-based
    pub fn crpix(&self) -> PixelCoord {
        PixelCoord::new(self.crpix1, self.crpix2)
    }

    /// Reference sky position (RA, Dec) in degrees
    pub fn crval(&self) -> (f64, f64) {
        (self.crval1, self.crval2)
    }

    /// CD matrix in degrees per pixel
    pub fn cd(&self) -> &Matrix2<f64> {
        &self.cd
    }

    pub fn determinant(&self) -> f64 {
        self.cd[(0, 0)] * self.cd[(1, 1)] - self.cd[(0, 1)] * self.cd[(1, 0)]
    }

    /// Pixel scale along each image axis in arcseconds per pixel.
    ///
    /// Computed from the column norms of the CD matrix, so it is independent
    /// of rotation.
    pub fn pixel_scale_arcsec(&self) -> (f64, f64) {
        let scale_x = self.cd.column(0).norm() * ARCSEC_PER_DEG;
        let scale_y = self.cd.column(1).norm() * ARCSEC_PER_DEG;
        (scale_x, scale_y)
    }

    /// Angular extent of the image along each axis in degrees
    pub fn field_of_view_deg(&self) -> (f64, f64) {
        let (sx, sy) = self.pixel_scale_arcsec();
        (
            sx * self.naxis1 as f64 / ARCSEC_PER_DEG,
            sy * self.naxis2 as f64 / ARCSEC_PER_DEG,
        )
    }
}

fn axis_length(keyword: &str, value: i64) -> Result<u32, WcsError> {
    u32::try_from(value)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| WcsError::malformed(keyword, value.to_string()))
}

/// Read a WCS straight from the bytes of a FITS file.
///
/// Equivalent to `build_wcs(&parse_cards(extract_primary_header(bytes)))`.
pub fn parse_fits_wcs(bytes: &[u8]) -> Result<WcsModel, WcsError> {
    let header = extract_primary_header(bytes);
    build_wcs(&parse_cards(header))
}
