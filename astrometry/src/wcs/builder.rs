//! Build a [`WcsModel`] from header keywords.

use log::debug;
use nalgebra::{Matrix2, Vector2};

use super::WcsModel;
use crate::header::HeaderCardTable;
use crate::WcsError;

const CD_KEYWORDS: [&str; 4] = ["CD1_1", "CD1_2", "CD2_1", "CD2_2"];

/// Reported when neither a complete CD matrix nor CDELT1/2 is present
const MATRIX_KEYWORDS: &str = "CD*/CDELT*";

/// Build a linear WCS from a parsed header.
///
/// Requires `NAXIS1`, `NAXIS2`, `CRPIX1`, `CRPIX2`, `CRVAL1`, `CRVAL2`.
/// The CD matrix is resolved in priority order:
///
/// 1. `CD1_1`, `CD1_2`, `CD2_1`, `CD2_2` when all four are present
/// 2. `CDELT1`, `CDELT2` with `PCi_j` (each defaulting to the identity):
///    `CD = PC · diag(CDELT1, CDELT2)`
///
/// # Errors
/// * `WcsError::MissingKeyword` - a required keyword is absent, or neither
///   matrix form is available (`"CD*/CDELT*"`)
/// * `WcsError::MalformedValue` - a present keyword does not parse, or an
///   axis length is not positive
///
/// A singular matrix is accepted here; transforms report it.
pub fn build_wcs(table: &HeaderCardTable) -> Result<WcsModel, WcsError> {
    let naxis1 = table.get_i64("NAXIS1")?;
    let naxis2 = table.get_i64("NAXIS2")?;
    let crpix1 = table.get_f64("CRPIX1")?;
    let crpix2 = table.get_f64("CRPIX2")?;
    let crval1 = table.get_f64("CRVAL1")?;
    let crval2 = table.get_f64("CRVAL2")?;

    let cd = resolve_cd_matrix(table)?;

    WcsModel::new((naxis1, naxis2), (crpix1, crpix2), (crval1, crval2), cd)
}

fn resolve_cd_matrix(table: &HeaderCardTable) -> Result<Matrix2<f64>, WcsError> {
    let [cd11, cd12, cd21, cd22] = [
        table.get_f64_opt(CD_KEYWORDS[0])?,
        table.get_f64_opt(CD_KEYWORDS[1])?,
        table.get_f64_opt(CD_KEYWORDS[2])?,
        table.get_f64_opt(CD_KEYWORDS[3])?,
    ];

    if let (Some(cd11), Some(cd12), Some(cd21), Some(cd22)) = (cd11, cd12, cd21, cd22) {
        debug!("Using CD matrix from header");
        return Ok(Matrix2::new(cd11, cd12, cd21, cd22));
    }

    let (Some(cdelt1), Some(cdelt2)) = (table.get_f64_opt("CDELT1")?, table.get_f64_opt("CDELT2")?)
    else {
        return Err(WcsError::MissingKeyword(MATRIX_KEYWORDS.to_string()));
    };

    // Absent PC terms are the FITS default, not an error
    let pc = Matrix2::new(
        table.get_f64_opt("PC1_1")?.unwrap_or(1.0),
        table.get_f64_opt("PC1_2")?.unwrap_or(0.0),
        table.get_f64_opt("PC2_1")?.unwrap_or(0.0),
        table.get_f64_opt("PC2_2")?.unwrap_or(1.0),
    );
    debug!("No complete CD matrix, using PC {pc:?} with CDELT ({cdelt1}, {cdelt2})");

    Ok(pc * Matrix2::from_diagonal(&Vector2::new(cdelt1, cdelt2)))
}
