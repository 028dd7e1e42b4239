use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const USD_CURRENCY_CODE: &str = "usd";

//--------------------------------------     UsdAmount       ---------------------------------------------------------
/// A US dollar amount, held as a whole number of cents so that sums and comparisons are exact.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UsdAmount(i64);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Not a valid USD amount: {0}")]
pub struct UsdConversionError(String);

impl UsdAmount {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// The amount as a floating point number of dollars, e.g. for JSON request bodies.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_dollars_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// The amount as a plain decimal string with two places, without the currency symbol. e.g. `5.00`
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for UsdAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for UsdAmount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for UsdAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl From<i64> for UsdAmount {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl Display for UsdAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.to_decimal_string())
    }
}

/// Parses operator input such as `5`, `5.5`, `5.50` or `$5`. Negative values and sub-cent precision are rejected.
impl FromStr for UsdAmount {
    type Err = UsdConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || UsdConversionError(s.to_string());
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(err());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        if frac.len() > 2 {
            return Err(err());
        }
        let dollars = if whole.is_empty() { 0 } else { whole.parse::<i64>().map_err(|_| err())? };
        let cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| err())? * 10,
            _ => frac.parse::<i64>().map_err(|_| err())?,
        };
        dollars.checked_mul(100).and_then(|d| d.checked_add(cents)).map(Self).ok_or_else(err)
    }
}
