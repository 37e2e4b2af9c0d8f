//! FITS primary header reading.
//!
//! A header is a sequence of 80-byte ASCII cards terminated by an `END`
//! card and padded to a multiple of 2880 bytes:
//!
//! ```text
//! col  1-8   keyword, left-justified, space padded
//! col  9-10  "= " for value cards
//! col 11-80  value, optionally followed by " / comment"
//! ```
//!
//! Only the primary HDU is read. Cards without a value indicator
//! (`COMMENT`, `HISTORY`, blank) are skipped.

use log::{trace, warn};
use std::borrow::Cow;

use crate::WcsError;

/// Bytes per header card
pub const CARD_LEN: usize = 80;

/// Bytes per FITS logical block
pub const BLOCK_LEN: usize = 2880;

const KEYWORD_LEN: usize = 8;
const VALUE_INDICATOR: u8 = b'=';

/// Slice the primary header out of a FITS byte buffer.
///
/// Returns bytes `0..n` where `n` is the end of the `END` card rounded up to
/// the next 2880-byte boundary, clipped to the buffer length. If no `END`
/// card is found the first 2880 bytes (or the whole buffer, if shorter) are
/// returned; callers then get whatever cards were present rather than an
/// error.
pub fn extract_primary_header(bytes: &[u8]) -> &[u8] {
    let mut pos = 0;
    while pos + CARD_LEN <= bytes.len() {
        if card_keyword(&bytes[pos..pos + CARD_LEN]) == "END" {
            let end = pos + CARD_LEN;
            let padded = end.div_ceil(BLOCK_LEN) * BLOCK_LEN;
            return &bytes[..padded.min(bytes.len())];
        }
        pos += CARD_LEN;
    }

    warn!(
        "No END card in {} byte buffer, using first {} bytes as header",
        bytes.len(),
        BLOCK_LEN.min(bytes.len())
    );
    &bytes[..BLOCK_LEN.min(bytes.len())]
}

/// Parse header cards into a keyword table.
///
/// Reading stops at the first `END` card. A trailing partial card is
/// ignored.
pub fn parse_cards(header: &[u8]) -> HeaderCardTable {
    let mut table = HeaderCardTable::default();

    for card in header.chunks_exact(CARD_LEN) {
        let keyword = card_keyword(card);
        if keyword == "END" {
            break;
        }
        if keyword.is_empty() || card[KEYWORD_LEN] != VALUE_INDICATOR {
            continue;
        }

        let value = card_value(&card[KEYWORD_LEN + 1..]);
        trace!("card {keyword} = {value:?}");
        table.insert(keyword.into_owned(), value);
    }

    table
}

fn card_keyword(card: &[u8]) -> Cow<'_, str> {
    match String::from_utf8_lossy(&card[..KEYWORD_LEN]) {
        Cow::Borrowed(s) => Cow::Borrowed(s.trim_end()),
        Cow::Owned(s) => Cow::Owned(s.trim_end().to_string()),
    }
}

/// Extract the value field: cut the comment at the first `/` outside
/// quotes, trim, then remove surrounding quotes.
fn card_value(field: &[u8]) -> String {
    let text = String::from_utf8_lossy(field);

    let mut in_quotes = false;
    let mut end = text.len();
    for (i, c) in text.char_indices() {
        match c {
            '\'' => in_quotes = !in_quotes,
            '/' if !in_quotes => {
                end = i;
                break;
            }
            _ => {}
        }
    }

    let value = text[..end].trim();
    match value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
        // Trailing blanks inside FITS strings are not significant; '' escapes a quote
        Some(inner) => inner.trim_end().replace("''", "'"),
        None => value.to_string(),
    }
}

/// One `KEYWORD = value` card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCard {
    pub keyword: String,
    pub value: String,
}

/// Ordered keyword → value table of a parsed header.
///
/// Insertion order is the card order. A repeated keyword keeps its first
/// position and takes the later value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCardTable {
    cards: Vec<HeaderCard>,
}

impl HeaderCardTable {
    fn insert(&mut self, keyword: String, value: String) {
        match self.cards.iter_mut().find(|c| c.keyword == keyword) {
            Some(existing) => existing.value = value,
            None => self.cards.push(HeaderCard { keyword, value }),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderCard> {
        self.cards.iter()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    /// Raw (trimmed, unquoted) value of `keyword`
    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.cards
            .iter()
            .find(|c| c.keyword == keyword)
            .map(|c| c.value.as_str())
    }

    /// Required string value
    pub fn get_str(&self, keyword: &str) -> Result<&str, WcsError> {
        self.get(keyword)
            .ok_or_else(|| WcsError::MissingKeyword(keyword.to_string()))
    }

    /// Required integer value
    pub fn get_i64(&self, keyword: &str) -> Result<i64, WcsError> {
        self.get_i64_opt(keyword)?
            .ok_or_else(|| WcsError::MissingKeyword(keyword.to_string()))
    }

    /// Optional integer value; absent is `Ok(None)`, present but unparsable is an error
    pub fn get_i64_opt(&self, keyword: &str) -> Result<Option<i64>, WcsError> {
        self.get(keyword)
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|_| WcsError::malformed(keyword, raw))
            })
            .transpose()
    }

    /// Required floating point value
    pub fn get_f64(&self, keyword: &str) -> Result<f64, WcsError> {
        self.get_f64_opt(keyword)?
            .ok_or_else(|| WcsError::MissingKeyword(keyword.to_string()))
    }

    /// Optional floating point value.
    ///
    /// Accepts FORTRAN `D` exponents (`1.5D-03`).
    pub fn get_f64_opt(&self, keyword: &str) -> Result<Option<f64>, WcsError> {
        self.get(keyword).map(|raw| parse_fits_float(keyword, raw)).transpose()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderCardTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = HeaderCardTable::default();
        for (k, v) in iter {
            table.insert(k.into(), v.into());
        }
        table
    }
}

fn parse_fits_float(keyword: &str, raw: &str) -> Result<f64, WcsError> {
    raw.replace(['D', 'd'], "E")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| WcsError::malformed(keyword, raw))
}
