//! Fixed-point amount used for prices, taxes and mileage rates
//!
//! Stored as ten-thousandths of a currency unit so that rates such as
//! `0.655` per mile survive a database round trip exactly.

use serde::{Deserialize, Serialize};
use std::fmt;

const SCALE: i64 = 10_000;

/// Monetary amount or rate in ten-thousandths of a unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Amount from raw ten-thousandths
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Amount from whole units and hundredths (e.g. `12, 50` is 12.50)
    #[must_use]
    pub const fn from_units_cents(units: i64, cents: i64) -> Self {
        Self(units * SCALE + cents * (SCALE / 100))
    }

    /// Raw ten-thousandths, as persisted
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = SCALE.unsigned_abs();
        let fraction = abs % scale;
        if fraction % 100 == 0 {
            write!(f, "{sign}{}.{:02}", abs / scale, fraction / 100)
        } else {
            write!(f, "{sign}{}.{fraction:04}", abs / scale)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Amount::from_units_cents(12, 5).to_string(), "12.05");
        assert_eq!(Amount::from_units_cents(-3, -50).to_string(), "-3.50");
    }

    #[test]
    fn test_display_keeps_rate_precision() {
        assert_eq!(Amount::from_raw(6_550).to_string(), "0.6550");
    }
}
