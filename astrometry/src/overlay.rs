//! Catalog overlay projection onto a display canvas.
//!
//! Catalog positions are projected through a [`WcsModel`], filtered to the
//! image footprint and rescaled so the image spans the canvas.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::wcs::{PixelCoord, WcsModel};
use crate::WcsError;

/// A catalog position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPoint {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

impl SkyPoint {
    pub fn new(ra_deg: f64, dec_deg: f64) -> Self {
        Self { ra_deg, dec_deg }
    }
}

/// Display surface size in display units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    /// Catalog points beyond this many are ignored
    pub max_points: usize,
    /// Flip vertically for displays whose origin is the top-left corner
    pub flip_y: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            max_points: 300,
            flip_y: false,
        }
    }
}

/// One catalog point placed on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayMarker {
    /// Position of the point in the input slice
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OverlayPlot {
    pub markers: Vec<OverlayMarker>,
    /// Considered points that fell outside the image
    pub outside: usize,
}

/// Project catalog points onto a canvas.
///
/// At most `options.max_points` points are considered. Points that land off
/// the image are counted in [`OverlayPlot::outside`] rather than drawn.
/// Pixel centres `0..=naxis-1` (0-based) map linearly onto `0..=width` and
/// `0..=height`.
///
/// # Errors
/// * `WcsError::SingularMatrix` - the model cannot be inverted; nothing is
///   plotted
pub fn project_overlay(
    model: &WcsModel,
    points: &[SkyPoint],
    canvas: Canvas,
    options: &OverlayOptions,
) -> Result<OverlayPlot, WcsError> {
    let projector = model.projector()?;

    let last_x = model.naxis1() as f64 - 1.0;
    let last_y = model.naxis2() as f64 - 1.0;
    // Single-pixel axes still need a non-zero span
    let scale_x = canvas.width / last_x.max(1.0);
    let scale_y = canvas.height / last_y.max(1.0);

    let mut plot = OverlayPlot::default();
    for (index, point) in points.iter().take(options.max_points).enumerate() {
        let pixel: PixelCoord = projector.world_to_pixel(point.ra_deg, point.dec_deg);
        if !model.is_inside(pixel) {
            plot.outside += 1;
            continue;
        }

        let (x0, y0) = pixel.to_zero_based();
        let y0 = if options.flip_y { last_y - y0 } else { y0 };
        plot.markers.push(OverlayMarker {
            index,
            x: x0 * scale_x,
            y: y0 * scale_y,
        });
    }

    if points.len() > options.max_points {
        debug!(
            "Overlay limited to {} of {} catalog points",
            options.max_points,
            points.len()
        );
    }
    debug!(
        "Overlay placed {} markers, {} outside the image",
        plot.markers.len(),
        plot.outside
    );

    Ok(plot)
}
