//! Trade codes: item blobs exchanged as `BL2(<base64>)` text lines.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use rand::Rng;
use tracing::warn;

use crate::blob::MIN_BLOB_LEN;

const PREFIX: &str = "BL2(";
const SUFFIX: &str = ")";

/// Standard alphabet, padded on output, padding optional on input.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Which inventory a trade code is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TradeSection {
    Bank,
    #[default]
    Items,
    Weapons,
}

impl TradeSection {
    /// Label used in `; <label>` section lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bank => "Bank",
            Self::Items => "Items",
            Self::Weapons => "Weapons",
        }
    }

    /// Parses a section label, ignoring case.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        [Self::Bank, Self::Items, Self::Weapons]
            .into_iter()
            .find(|section| section.label().eq_ignore_ascii_case(label))
    }
}

/// One decoded trade code line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeCode {
    pub section: TradeSection,
    pub blob: Vec<u8>,
}

/// Renders a blob as a trade code.
#[must_use]
pub fn format_trade_code(blob: &[u8]) -> String {
    format!("{PREFIX}{}{SUFFIX}", ENGINE.encode(blob))
}

/// Decodes a single `BL2(...)` line, surrounding whitespace allowed.
///
/// Returns `None` for anything that is not a well-formed code of a blob
/// long enough to carry a header and checksum.
#[must_use]
pub fn parse_trade_code(line: &str) -> Option<Vec<u8>> {
    let body = line.trim().strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    let blob = ENGINE.decode(body).ok()?;
    (blob.len() >= MIN_BLOB_LEN).then_some(blob)
}

/// Decodes a list of trade codes.
///
/// `; Bank`, `; Items` and `; Weapons` lines switch the section of the
/// codes that follow; other `;` lines are comments. Codes before any
/// section line go to [`TradeSection::Items`]. Malformed lines are skipped.
#[must_use]
pub fn parse_trade_codes(text: &str) -> Vec<TradeCode> {
    let mut section = TradeSection::default();
    let mut codes = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(label) = line.strip_prefix(';') {
            if let Some(next) = TradeSection::from_label(label.trim()) {
                section = next;
            }
            continue;
        }
        match parse_trade_code(line) {
            Some(blob) => codes.push(TradeCode { section, blob }),
            None => warn!(line = number + 1, "skipping malformed trade code"),
        }
    }
    codes
}

/// Source of fresh item keys.
pub trait KeySource {
    /// Returns a key drawn from the full `i32` range.
    fn next_key(&mut self) -> i32;
}

impl<R: Rng> KeySource for R {
    fn next_key(&mut self) -> i32 {
        self.gen()
    }
}
