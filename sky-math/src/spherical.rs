//! Great-circle geometry on the celestial sphere.

use crate::ARCSEC_PER_DEG;

/// Angular separation between two sky positions in degrees.
///
/// Uses the spherical law of cosines:
/// ```text
/// cos(sep) = sin(δ₁)·sin(δ₂) + cos(δ₁)·cos(δ₂)·cos(α₁ − α₂)
/// ```
/// `cos(sep)` is clamped to \[-1, 1\] before `acos`, since rounding can push it
/// slightly past ±1 for coincident or antipodal points.
///
/// # Arguments
/// * `ra1_deg`, `dec1_deg` - First position (degrees)
/// * `ra2_deg`, `dec2_deg` - Second position (degrees)
///
/// # Returns
/// Separation in degrees, in \[0, 180\]
pub fn angular_separation_deg(ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64) -> f64 {
    let ra1 = ra1_deg.to_radians();
    let dec1 = dec1_deg.to_radians();
    let ra2 = ra2_deg.to_radians();
    let dec2 = dec2_deg.to_radians();

    let cos_sep = dec1.sin() * dec2.sin() + dec1.cos() * dec2.cos() * (ra1 - ra2).cos();
    cos_sep.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Angular separation in arcseconds, for catalog cross-matching.
pub fn angular_separation_arcsec(ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64) -> f64 {
    angular_separation_deg(ra1_deg, dec1_deg, ra2_deg, dec2_deg) * ARCSEC_PER_DEG
}

/// Wrap a right ascension difference into (-180, 180] degrees.
///
/// Keeps offsets continuous across the 0°/360° meridian, e.g. 359° − 1°
/// becomes −2° instead of 358°.
pub fn wrap_delta_ra(delta_deg: f64) -> f64 {
    let d = delta_deg % 360.0;
    if d > 180.0 {
        d - 360.0
    } else if d <= -180.0 {
        d + 360.0
    } else {
        d
    }
}

/// Normalize a right ascension into [0, 360) degrees.
pub fn normalize_ra(ra_deg: f64) -> f64 {
    let ra = ra_deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if ra >= 360.0 {
        0.0
    } else {
        ra
    }
}
