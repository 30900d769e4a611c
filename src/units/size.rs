//! Human-readable byte sizes
//!
//! Parses strings like `512mb`, `1.5 GB` or `10 kilobytes` into byte counts
//! using base-1024 scaling.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Size unit, scaled by powers of 1024
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeUnit {
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
    Terabytes,
}

/// Recognized unit spellings, matched case-insensitively
static ALIASES: [(&str, SizeUnit); 9] = [
    ("b", SizeUnit::Bytes),
    ("kb", SizeUnit::Kilobytes),
    ("kilobytes", SizeUnit::Kilobytes),
    ("mb", SizeUnit::Megabytes),
    ("megabytes", SizeUnit::Megabytes),
    ("gb", SizeUnit::Gigabytes),
    ("gigabytes", SizeUnit::Gigabytes),
    ("tb", SizeUnit::Terabytes),
    ("terabytes", SizeUnit::Terabytes),
];

static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let units = ALIASES
        .iter()
        .map(|(alias, _)| format!("(?:{})", alias))
        .collect::<Vec<_>>()
        .join("|");
    // ASCII digits only; `\d` would also match other scripts' digits, which
    // f64 parsing rejects. Aliases are plain lowercase words.
    Regex::new(&format!(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*({})", units)).expect("invalid size pattern")
});

/// Error returned when no number followed by a known unit is found
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{input} is not a valid file size")]
pub struct SizeParseError {
    pub input: String,
}

impl SizeUnit {
    /// Power of 1024 this unit represents
    pub fn exponent(self) -> i32 {
        match self {
            Self::Bytes => 0,
            Self::Kilobytes => 1,
            Self::Megabytes => 2,
            Self::Gigabytes => 3,
            Self::Terabytes => 4,
        }
    }

    /// Look up a unit by spelling (`kb`, `Megabytes`, ...)
    pub fn from_alias(alias: &str) -> Option<Self> {
        let alias = alias.to_ascii_lowercase();
        ALIASES
            .iter()
            .find(|(name, _)| *name == alias)
            .map(|(_, unit)| *unit)
    }

    /// Convert `size` in this unit to `target` units
    ///
    /// Truncates toward zero and saturates at `i64::MAX`.
    pub fn convert(self, size: f64, target: SizeUnit) -> i64 {
        let scaled = size * 1024f64.powi(self.exponent() - target.exponent());
        // `as` saturates out-of-range floats
        scaled as i64
    }

    pub fn to_bytes(self, size: f64) -> i64 {
        self.convert(size, Self::Bytes)
    }

    pub fn to_kilobytes(self, size: f64) -> i64 {
        self.convert(size, Self::Kilobytes)
    }

    pub fn to_megabytes(self, size: f64) -> i64 {
        self.convert(size, Self::Megabytes)
    }

    pub fn to_gigabytes(self, size: f64) -> i64 {
        self.convert(size, Self::Gigabytes)
    }

    pub fn to_terabytes(self, size: f64) -> i64 {
        self.convert(size, Self::Terabytes)
    }
}

/// Parse the first `<number><unit>` found anywhere in `input` into bytes
///
/// Whitespace may separate the number and the unit. Results larger than
/// `i64::MAX` saturate.
///
/// # Errors
/// Returns `SizeParseError` if no number followed by a known unit is found.
///
/// # Examples
///
/// ```
/// use testsieve::units::parse_bytes;
///
/// assert_eq!(parse_bytes("512mb").unwrap(), 512 * 1024 * 1024);
/// assert_eq!(parse_bytes("1.5 KB").unwrap(), 1536);
/// assert!(parse_bytes("lots").is_err());
/// ```
pub fn parse_bytes(input: &str) -> Result<i64, SizeParseError> {
    let invalid = || SizeParseError {
        input: input.to_string(),
    };

    let captures = SIZE_PATTERN.captures(input).ok_or_else(invalid)?;
    let unit = SizeUnit::from_alias(&captures[2]).ok_or_else(invalid)?;
    let value: f64 = captures[1].parse().map_err(|_| invalid())?;

    Ok(unit.to_bytes(value))
}
