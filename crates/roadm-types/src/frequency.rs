//! Exact optical frequency representation.
//!
//! Frequencies are stored as an integer number of Hz so that window
//! arithmetic (center ± half width) and repeated conversions never drift.
//! Rendering goes through a single formatter so that every name built from
//! a frequency is byte-identical wherever it is produced.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

const HZ_PER_MHZ: u64 = 1_000_000;
const HZ_PER_GHZ: u64 = 1_000_000_000;
const HZ_PER_THZ: u64 = 1_000_000_000_000;

/// An optical frequency in integer Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frequency(u64);

impl Frequency {
    /// Zero frequency.
    pub const ZERO: Frequency = Frequency(0);

    /// Creates a frequency from Hz.
    pub const fn from_hz(hz: u64) -> Self {
        Self(hz)
    }

    /// Creates a frequency from MHz.
    pub const fn from_mhz(mhz: u64) -> Self {
        Self(mhz * HZ_PER_MHZ)
    }

    /// Creates a frequency from GHz.
    pub const fn from_ghz(ghz: u64) -> Self {
        Self(ghz * HZ_PER_GHZ)
    }

    /// Creates a frequency from whole THz.
    pub const fn from_thz(thz: u64) -> Self {
        Self(thz * HZ_PER_THZ)
    }

    /// Returns the frequency in Hz.
    pub const fn as_hz(&self) -> u64 {
        self.0
    }

    /// Returns half of this frequency (rounded down to the Hz).
    pub const fn half(&self) -> Self {
        Self(self.0 / 2)
    }

    /// Subtracts `other`, returning `None` on underflow.
    pub fn checked_sub(&self, other: Frequency) -> Option<Frequency> {
        self.0.checked_sub(other.0).map(Frequency)
    }

    /// Parses a decimal THz value such as `"191.35"`.
    ///
    /// Parsing is exact: the fractional part may carry at most 12 digits
    /// (1 Hz resolution).
    pub fn parse_thz(s: &str) -> Result<Self, ParseError> {
        parse_decimal(s, 12).map(Frequency)
    }

    /// Parses a decimal GHz value such as `"12.5"`.
    pub fn parse_ghz(s: &str) -> Result<Self, ParseError> {
        parse_decimal(s, 9).map(Frequency)
    }

    /// Renders the frequency in THz.
    ///
    /// The format is the shortest exact decimal with at least one fractional
    /// digit: `191.35`, `196.0`, `191.325`.
    pub fn as_thz_string(&self) -> String {
        render_decimal(self.0, HZ_PER_THZ, 12)
    }

    /// Renders the frequency in GHz with the same rules as [`as_thz_string`].
    ///
    /// [`as_thz_string`]: Frequency::as_thz_string
    pub fn as_ghz_string(&self) -> String {
        render_decimal(self.0, HZ_PER_GHZ, 9)
    }
}

impl Add for Frequency {
    type Output = Frequency;

    fn add(self, rhs: Frequency) -> Frequency {
        Frequency(self.0 + rhs.0)
    }
}

impl Sub for Frequency {
    type Output = Frequency;

    fn sub(self, rhs: Frequency) -> Frequency {
        Frequency(self.0 - rhs.0)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} THz", self.as_thz_string())
    }
}

fn render_decimal(hz: u64, unit: u64, digits: usize) -> String {
    let whole = hz / unit;
    let frac = hz % unit;
    let mut frac_str = format!("{:0width$}", frac, width = digits);
    while frac_str.len() > 1 && frac_str.ends_with('0') {
        frac_str.pop();
    }
    format!("{}.{}", whole, frac_str)
}

fn parse_decimal(s: &str, digits: usize) -> Result<u64, ParseError> {
    let invalid = || ParseError::InvalidFrequency(s.to_string());
    let s = s.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    // Trailing zeros beyond the supported resolution are harmless.
    let frac = frac.trim_end_matches('0');
    if frac.len() > digits {
        return Err(invalid());
    }

    let unit = 10u64.pow(digits as u32);
    let whole: u64 = whole.parse().map_err(|_| invalid())?;
    let frac_value: u64 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = digits);
        padded.parse().map_err(|_| invalid())?
    };

    whole
        .checked_mul(unit)
        .and_then(|w| w.checked_add(frac_value))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_thz_rendering() {
        assert_eq!(Frequency::from_ghz(191_350).as_thz_string(), "191.35");
        assert_eq!(Frequency::from_ghz(196_000).as_thz_string(), "196.0");
        assert_eq!(Frequency::from_mhz(191_325_000).as_thz_string(), "191.325");
        assert_eq!(Frequency::from_mhz(193_106_250).as_thz_string(), "193.10625");
    }

    #[test]
    fn test_ghz_rendering() {
        assert_eq!(Frequency::from_ghz(50).as_ghz_string(), "50.0");
        assert_eq!(Frequency::from_mhz(12_500).as_ghz_string(), "12.5");
        assert_eq!(Frequency::from_mhz(6_250).as_ghz_string(), "6.25");
    }

    #[test]
    fn test_parse_thz() {
        assert_eq!(
            Frequency::parse_thz("191.35").unwrap(),
            Frequency::from_ghz(191_350)
        );
        assert_eq!(Frequency::parse_thz("196").unwrap(), Frequency::from_thz(196));
        assert_eq!(
            Frequency::parse_thz("196.00").unwrap(),
            Frequency::from_ghz(196_000)
        );
        assert!(Frequency::parse_thz("abc").is_err());
        assert!(Frequency::parse_thz(".5").is_err());
        assert!(Frequency::parse_thz("1.0000000000001").is_err());
    }

    #[test]
    fn test_render_parse_is_stable() {
        for mhz in [191_350_000u64, 191_325_000, 196_100_000, 193_106_250] {
            let f = Frequency::from_mhz(mhz);
            assert_eq!(Frequency::parse_thz(&f.as_thz_string()).unwrap(), f);
        }
    }

    #[test]
    fn test_half_is_exact() {
        assert_eq!(Frequency::from_mhz(12_500).half(), Frequency::from_mhz(6_250));
        assert_eq!(Frequency::from_ghz(50).half(), Frequency::from_ghz(25));
    }
}
