//! Sizing of survey cutout requests.

use serde::{Deserialize, Serialize};

use crate::WcsError;
use sky_math::{ARCMIN_PER_DEG, ARCSEC_PER_DEG};

const ARCSEC_PER_ARCMIN: f64 = ARCSEC_PER_DEG / ARCMIN_PER_DEG;

/// Limits applied when turning a field of view into a cutout request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutoutConfig {
    pub pixscale_arcsec: f64,
    pub min_pixels: u32,
    pub max_pixels: u32,
}

impl Default for CutoutConfig {
    fn default() -> Self {
        Self {
            pixscale_arcsec: 0.25,
            min_pixels: 256,
            max_pixels: 2048,
        }
    }
}

/// A square cutout request: side length and pixel scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutoutSpec {
    pub pixels: u32,
    pub pixscale_arcsec: f64,
}

impl CutoutSpec {
    /// Size a cutout covering `fov_arcmin` at the configured pixel scale.
    ///
    /// The pixel count is rounded, clamped to `[min_pixels, max_pixels]` and
    /// made even. An odd count is bumped up, or down when that would exceed
    /// `max_pixels`, so the result always stays within the limits.
    ///
    /// # Errors
    /// * `WcsError::MalformedValue` - FOV or pixel scale not positive and
    ///   finite, `min_pixels > max_pixels`, or `min_pixels == max_pixels`
    ///   with an odd value (no even count fits)
    pub fn from_fov_arcmin(fov_arcmin: f64, config: &CutoutConfig) -> Result<Self, WcsError> {
        if !(fov_arcmin.is_finite() && fov_arcmin > 0.0) {
            return Err(WcsError::malformed("fov_arcmin", fov_arcmin.to_string()));
        }
        let pixscale = config.pixscale_arcsec;
        if !(pixscale.is_finite() && pixscale > 0.0) {
            return Err(WcsError::malformed("pixscale_arcsec", pixscale.to_string()));
        }
        if config.min_pixels > config.max_pixels {
            return Err(WcsError::malformed(
                "min_pixels",
                format!("{} > max_pixels {}", config.min_pixels, config.max_pixels),
            ));
        }
        if config.min_pixels == config.max_pixels && config.max_pixels % 2 == 1 {
            return Err(WcsError::malformed(
                "max_pixels",
                format!("{} is odd and equal to min_pixels", config.max_pixels),
            ));
        }

        let wanted = (fov_arcmin * ARCSEC_PER_ARCMIN / pixscale).round();
        let mut pixels = wanted.clamp(config.min_pixels as f64, config.max_pixels as f64) as u32;
        if pixels % 2 == 1 {
            pixels = if pixels < config.max_pixels {
                pixels + 1
            } else {
                pixels - 1
            };
        }

        Ok(Self {
            pixels,
            pixscale_arcsec: pixscale,
        })
    }

    /// Field of view actually covered, in arcminutes
    pub fn fov_arcmin(&self) -> f64 {
        self.pixels as f64 * self.pixscale_arcsec / ARCSEC_PER_ARCMIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(3.0, 720)]
    #[case(0.5, 256)]
    #[case(60.0, 2048)]
    #[case(2.5, 600)]
    #[case(1.2504, 300)]
    fn test_default_sizing(#[case] fov: f64, #[case] pixels: u32) {
        let cutout = CutoutSpec::from_fov_arcmin(fov, &CutoutConfig::default()).unwrap();
        assert_eq!(cutout.pixels, pixels);
        assert_eq!(cutout.pixscale_arcsec, 0.25);
    }

    #[test]
    fn test_odd_count_made_even() {
        // 301 pixels at 0.25″
        let cutout = CutoutSpec::from_fov_arcmin(1.2541667, &CutoutConfig::default()).unwrap();
        assert_eq!(cutout.pixels, 302);

        let config = CutoutConfig {
            max_pixels: 301,
            ..Default::default()
        };
        let cutout = CutoutSpec::from_fov_arcmin(10.0, &config).unwrap();
        assert_eq!(cutout.pixels, 300);

        let config = CutoutConfig {
            min_pixels: 300,
            max_pixels: 301,
            ..Default::default()
        };
        // Bumping down still respects min_pixels
        let cutout = CutoutSpec::from_fov_arcmin(10.0, &config).unwrap();
        assert_eq!(cutout.pixels, 300);
    }

    #[rstest]
    #[case(300, 300, 300)]
    #[case(302, 302, 302)]
    fn test_fixed_even_size(#[case] min: u32, #[case] max: u32, #[case] pixels: u32) {
        let config = CutoutConfig {
            min_pixels: min,
            max_pixels: max,
            ..Default::default()
        };
        for fov in [0.1, 3.0, 60.0] {
            assert_eq!(CutoutSpec::from_fov_arcmin(fov, &config).unwrap().pixels, pixels);
        }
    }

    #[test]
    fn test_rejects_fixed_odd_size() {
        let config = CutoutConfig {
            min_pixels: 301,
            max_pixels: 301,
            ..Default::default()
        };
        for fov in [0.1, 1.2541667, 60.0] {
            assert!(matches!(
                CutoutSpec::from_fov_arcmin(fov, &config),
                Err(WcsError::MalformedValue { keyword, .. }) if keyword == "max_pixels"
            ));
        }
    }

    #[test]
    fn test_fov_round_trip() {
        let cutout = CutoutSpec::from_fov_arcmin(3.0, &CutoutConfig::default()).unwrap();
        assert_relative_eq!(cutout.fov_arcmin(), 3.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_rejects_bad_fov(#[case] fov: f64) {
        assert!(matches!(
            CutoutSpec::from_fov_arcmin(fov, &CutoutConfig::default()),
            Err(WcsError::MalformedValue { keyword, .. }) if keyword == "fov_arcmin"
        ));
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = CutoutConfig {
            pixscale_arcsec: 0.0,
            ..Default::default()
        };
        assert!(CutoutSpec::from_fov_arcmin(3.0, &config).is_err());

        let config = CutoutConfig {
            min_pixels: 4096,
            ..Default::default()
        };
        assert!(CutoutSpec::from_fov_arcmin(3.0, &config).is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: CutoutConfig = serde_json::from_str(r#"{"pixscale_arcsec": 1.0}"#).unwrap();
        assert_eq!(config.min_pixels, 256);
        assert_eq!(config.max_pixels, 2048);
        assert_eq!(config.pixscale_arcsec, 1.0);
    }
}
