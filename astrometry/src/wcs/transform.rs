//! Sky ⇄ pixel transforms for a [`WcsModel`].

use nalgebra::{Matrix2, Vector2};

use super::{PixelCoord, WcsModel};
use crate::WcsError;
use sky_math::{normalize_ra, wrap_delta_ra};

/// Below this |det| the CD matrix is treated as non-invertible
const SINGULAR_DETERMINANT: f64 = 1e-18;

/// A model paired with its inverted CD matrix, for projecting many
/// catalog positions against one image.
#[derive(Debug, Clone, Copy)]
pub struct Projector<'a> {
    model: &'a WcsModel,
    cd_inverse: Matrix2<f64>,
}

impl<'a> Projector<'a> {
    pub fn new(model: &'a WcsModel) -> Result<Self, WcsError> {
        let cd = model.cd();
        let determinant = model.determinant();
        if determinant.abs() < SINGULAR_DETERMINANT {
            return Err(WcsError::SingularMatrix { determinant });
        }

        let cd_inverse =
            Matrix2::new(cd[(1, 1)], -cd[(0, 1)], -cd[(1, 0)], cd[(0, 0)]) / determinant;

        Ok(Self { model, cd_inverse })
    }

    pub fn model(&self) -> &'a WcsModel {
        self.model
    }

    /// Project a sky position to a 1-based pixel position.
    ///
    /// The RA offset is wrapped into (−180°, 180°] so fields straddling
    /// RA = 0° stay continuous.
    pub fn world_to_pixel(&self, ra_deg: f64, dec_deg: f64) -> PixelCoord {
        let (crval1, crval2) = self.model.crval();
        let d_sky = Vector2::new(wrap_delta_ra(ra_deg - crval1), dec_deg - crval2);
        let d_pix = self.cd_inverse * d_sky;

        let crpix = self.model.crpix();
        PixelCoord::new(crpix.x + d_pix.x, crpix.y + d_pix.y)
    }

    /// Map a 1-based pixel position back to (RA, Dec) in degrees.
    ///
    /// RA is normalized into [0, 360).
    pub fn pixel_to_world(&self, pixel: PixelCoord) -> (f64, f64) {
        let crpix = self.model.crpix();
        let (crval1, crval2) = self.model.crval();
        let d_sky = self.model.cd() * Vector2::new(pixel.x - crpix.x, pixel.y - crpix.y);

        (normalize_ra(crval1 + d_sky.x), crval2 + d_sky.y)
    }
}

impl WcsModel {
    /// Prepare repeated transforms; fails once if the CD matrix is singular.
    pub fn projector(&self) -> Result<Projector<'_>, WcsError> {
        Projector::new(self)
    }

    /// Project a sky position (degrees) to a 1-based pixel position.
    ///
    /// # Errors
    /// * `WcsError::SingularMatrix` - |det(CD)| < 1e-18
    pub fn world_to_pixel(&self, ra_deg: f64, dec_deg: f64) -> Result<PixelCoord, WcsError> {
        Ok(self.projector()?.world_to_pixel(ra_deg, dec_deg))
    }

    /// Like [`WcsModel::world_to_pixel`], but also reports the advisory
    /// `WcsError::OutOfBounds` when the result lies outside the image.
    pub fn checked_world_to_pixel(
        &self,
        ra_deg: f64,
        dec_deg: f64,
    ) -> Result<PixelCoord, WcsError> {
        let pixel = self.world_to_pixel(ra_deg, dec_deg)?;
        if self.is_inside(pixel) {
            Ok(pixel)
        } else {
            Err(WcsError::OutOfBounds {
                x: pixel.x,
                y: pixel.y,
            })
        }
    }

    /// Map a 1-based pixel position to (RA, Dec) in degrees.
    ///
    /// # Errors
    /// * `WcsError::SingularMatrix` - same validity rule as the forward transform
    pub fn pixel_to_world(&self, pixel: PixelCoord) -> Result<(f64, f64), WcsError> {
        Ok(self.projector()?.pixel_to_world(pixel))
    }

    /// Whether a 1-based pixel position falls on the image, from the centre
    /// of the first pixel (1, 1) to the centre of the last (NAXIS1, NAXIS2).
    ///
    /// NaN coordinates are never inside.
    pub fn is_inside(&self, pixel: PixelCoord) -> bool {
        (1.0..=self.naxis1() as f64).contains(&pixel.x)
            && (1.0..=self.naxis2() as f64).contains(&pixel.y)
    }
}
