//! FITS header fixtures for tests across the workspace.
//!
//! Real survey headers are awkward to vendor, so tests assemble them from
//! cards instead. [`HeaderBuilder`] writes fixed-format 80-byte cards and pads
//! the result to whole 2880-byte blocks, the same layout a survey service
//! returns.
//!
//! ```rust
//! use test_helpers::HeaderBuilder;
//!
//! let bytes = HeaderBuilder::new()
//!     .logical("SIMPLE", true)
//!     .int("NAXIS1", 720)
//!     .float("CDELT1", -6.94e-5)
//!     .string("CTYPE1", "RA---TAN")
//!     .build();
//! assert_eq!(bytes.len(), 2880);
//! ```

/// Length of one header card in bytes
pub const CARD_LEN: usize = 80;

/// Length of one FITS block in bytes
pub const BLOCK_LEN: usize = 2880;

/// Lay `text` out as a single card, space padded and truncated to 80 bytes.
pub fn card(text: &str) -> [u8; CARD_LEN] {
    let mut out = [b' '; CARD_LEN];
    let bytes = text.as_bytes();
    let n = bytes.len().min(CARD_LEN);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}

/// Incrementally assembles a primary header.
///
/// Values are written in FITS fixed format: keyword in columns 1-8, `= ` in
/// columns 9-10 and numbers right-justified to column 30.
#[derive(Debug, Clone, Default)]
pub struct HeaderBuilder {
    cards: Vec<[u8; CARD_LEN]>,
}

impl HeaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn int(self, keyword: &str, value: i64) -> Self {
        self.raw(keyword, &value.to_string())
    }

    pub fn float(self, keyword: &str, value: f64) -> Self {
        self.raw(keyword, &format!("{value:?}"))
    }

    /// Quoted string value, padded to at least eight characters
    pub fn string(self, keyword: &str, value: &str) -> Self {
        let escaped = value.replace('\'', "''");
        self.push(format!("{keyword:<8}= '{escaped:<8}'"))
    }

    pub fn logical(self, keyword: &str, value: bool) -> Self {
        self.raw(keyword, if value { "T" } else { "F" })
    }

    /// Value text written verbatim, e.g. Fortran `1.0D-04` exponents
    pub fn raw(self, keyword: &str, value: &str) -> Self {
        self.push(format!("{keyword:<8}= {value:>20}"))
    }

    pub fn raw_with_comment(self, keyword: &str, value: &str, comment: &str) -> Self {
        self.push(format!("{keyword:<8}= {value:>20} / {comment}"))
    }

    /// `COMMENT` card (no value indicator)
    pub fn comment(self, text: &str) -> Self {
        self.push(format!("COMMENT {text}"))
    }

    /// Linear WCS keywords with an explicit CD matrix (row-major)
    pub fn cd_wcs(
        self,
        naxis: (i64, i64),
        crpix: (f64, f64),
        crval: (f64, f64),
        cd: [f64; 4],
    ) -> Self {
        self.int("NAXIS", 2)
            .int("NAXIS1", naxis.0)
            .int("NAXIS2", naxis.1)
            .string("CTYPE1", "RA---TAN")
            .string("CTYPE2", "DEC--TAN")
            .float("CRPIX1", crpix.0)
            .float("CRPIX2", crpix.1)
            .float("CRVAL1", crval.0)
            .float("CRVAL2", crval.1)
            .float("CD1_1", cd[0])
            .float("CD1_2", cd[1])
            .float("CD2_1", cd[2])
            .float("CD2_2", cd[3])
    }

    /// Number of cards added so far, excluding `END`
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Header bytes terminated by `END` and padded to whole blocks
    pub fn build(mut self) -> Vec<u8> {
        self.cards.push(card("END"));
        self.build_without_end()
    }

    /// Header bytes padded with blank cards but with no `END` card
    pub fn build_without_end(self) -> Vec<u8> {
        let mut bytes: Vec<u8> = self.cards.concat();
        let padded = bytes.len().div_ceil(BLOCK_LEN).max(1) * BLOCK_LEN;
        bytes.resize(padded, b' ');
        bytes
    }

    fn push(mut self, text: String) -> Self {
        self.cards.push(card(&text));
        self
    }
}
