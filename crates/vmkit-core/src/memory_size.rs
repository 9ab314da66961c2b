use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const KIBI: u64 = 1024;
const MEBI: u64 = KIBI * KIBI;
const GIBI: u64 = MEBI * KIBI;

/// A memory/disk quantity that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is not a valid memory size")]
pub struct InvalidMemorySize(pub String);

/// A byte quantity, parsed from strings like "512", "3M", "1.5GiB".
///
/// Unit multipliers are binary (K = 1024, M = 1024², G = 1024³) even
/// though the suffixes are spelled without the "i". This matches the
/// established on-the-wire behavior and must not change.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MemorySize {
    bytes: u64,
}

// Accepted forms: "123", "123B", "2K", "2KB", "2KiB", "2Ki", "1.5G".
// A decimal mantissa is only valid when a K/M/G unit follows it.
static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+)(?:(?:\.(\d+))?([KMG])(?:iB|i|B)?|B)?\s*$")
        .expect("hard-coded size pattern")
});

impl MemorySize {
    pub const fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    pub fn in_bytes(&self) -> u64 {
        self.bytes
    }

    pub fn in_kilobytes(&self) -> u64 {
        self.bytes / KIBI // floors
    }

    pub fn in_megabytes(&self) -> u64 {
        self.bytes / MEBI
    }

    pub fn in_gigabytes(&self) -> u64 {
        self.bytes / GIBI
    }

    /// Render with the largest binary unit whose quotient is >= 1,
    /// one decimal digit ("1.5GiB"); whole bytes below 1 KiB ("512B").
    pub fn human_readable(&self) -> String {
        for (unit, suffix) in [(GIBI, "GiB"), (MEBI, "MiB"), (KIBI, "KiB")] {
            let quotient = self.bytes as f64 / unit as f64;
            if quotient >= 1.0 {
                return format!("{quotient:.1}{suffix}");
            }
        }
        format!("{}B", self.bytes)
    }
}

impl FromStr for MemorySize {
    type Err = InvalidMemorySize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidMemorySize(s.trim().to_string());
        let caps = SIZE_PATTERN.captures(s).ok_or_else(err)?;

        let whole: u64 = caps[1].parse().map_err(|_| err())?;
        let mult = match caps.get(3).and_then(|m| m.as_str().chars().next()) {
            Some('g') | Some('G') => GIBI,
            Some('m') | Some('M') => MEBI,
            Some('k') | Some('K') => KIBI,
            _ => 1,
        };

        let mut bytes = whole.checked_mul(mult).ok_or_else(err)?;
        if let Some(frac) = caps.get(2) {
            // value = whole*mult + floor(frac*mult / 10^digits); frac < 10^digits,
            // so the fractional contribution is always below one full unit.
            let digits = frac.as_str().len() as u32;
            let frac: u64 = frac.as_str().parse().map_err(|_| err())?;
            let scale = 10u128.checked_pow(digits).ok_or_else(err)?;
            let scaled = u128::from(frac) * u128::from(mult) / scale;
            bytes = bytes
                .checked_add(u64::try_from(scaled).map_err(|_| err())?)
                .ok_or_else(err)?;
        }

        Ok(Self { bytes })
    }
}

impl fmt::Display for MemorySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.human_readable())
    }
}
