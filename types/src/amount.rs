//! Exact ledger amounts and denomination conversion.
//!
//! Every monetary quantity is a [`RawAmount`]: an arbitrary-precision, non-negative
//! count of the indivisible ledger unit. Display values are [`DecimalAmount`]s, an
//! unscaled integer plus a base-10 scale, so no conversion ever passes through
//! floating point.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Rem};
use std::str::FromStr;

use crate::error::TypesError;

/// A non-negative quantity of raw ledger units.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawAmount(BigUint);

impl RawAmount {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn from_u128(value: u128) -> Self {
        Self(BigUint::from(value))
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `self - other`, or `None` if the result would be negative.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if other.0 > self.0 {
            None
        } else {
            Some(Self(&self.0 - &other.0))
        }
    }

    /// The value as a `u128`, the width used by the canonical block encoding.
    pub fn to_u128(&self) -> Result<u128, TypesError> {
        self.0
            .to_u128()
            .ok_or_else(|| TypesError::AmountOutOfRange(self.to_string()))
    }

    /// 16-byte big-endian encoding.
    pub fn to_be_bytes_128(&self) -> Result<[u8; 16], TypesError> {
        Ok(self.to_u128()?.to_be_bytes())
    }
}

impl From<u128> for RawAmount {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl Add for RawAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a RawAmount> for RawAmount {
    type Output = Self;
    fn add(self, rhs: &'a RawAmount) -> Self {
        Self(self.0 + &rhs.0)
    }
}

impl<'a> Rem<&'a RawAmount> for &'a RawAmount {
    type Output = RawAmount;
    fn rem(self, rhs: &'a RawAmount) -> RawAmount {
        RawAmount(&self.0 % &rhs.0)
    }
}

impl std::iter::Sum for RawAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RawAmount {
    type Err = TypesError;

    /// Parse a base-10 integer string, as the ledger reports balances.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(TypesError::NegativeAmount);
        }
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypesError::InvalidAmount(s.to_string()));
        }
        BigUint::parse_bytes(s.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| TypesError::InvalidAmount(s.to_string()))
    }
}

// Raw amounts travel as decimal strings, matching the ledger's JSON.
impl Serialize for RawAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_str_radix(10))
    }
}

impl<'de> Deserialize<'de> for RawAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The amount scales offered to the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Denomination {
    /// 10^24 raw.
    #[default]
    Unit,
    /// 10^21 raw.
    Milli,
    /// 10^18 raw.
    Micro,
}

impl Denomination {
    pub const ALL: [Denomination; 3] = [Self::Unit, Self::Milli, Self::Micro];

    /// Power of ten relating this denomination to raw.
    pub fn exponent(&self) -> u32 {
        match self {
            Self::Unit => 24,
            Self::Milli => 21,
            Self::Micro => 18,
        }
    }

    pub fn scale(&self) -> RawAmount {
        RawAmount(pow10(self.exponent()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Milli => "milli",
            Self::Micro => "micro",
        }
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Denomination {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unit" => Ok(Self::Unit),
            "milli" => Ok(Self::Milli),
            "micro" => Ok(Self::Micro),
            other => Err(TypesError::UnknownDenomination(other.to_string())),
        }
    }
}

fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u32).pow(exp)
}

/// An exact non-negative decimal: `unscaled / 10^scale`.
#[derive(Clone, Debug, Default)]
pub struct DecimalAmount {
    unscaled: BigUint,
    scale: u32,
}

impl DecimalAmount {
    pub fn new(unscaled: BigUint, scale: u32) -> Self {
        Self { unscaled, scale }.normalized()
    }

    pub fn whole(units: u128) -> Self {
        Self::new(BigUint::from(units), 0)
    }

    pub fn is_zero(&self) -> bool {
        self.unscaled.is_zero()
    }

    /// Number of fractional digits carried.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Largest whole number not above this value.
    pub fn floor(&self) -> DecimalAmount {
        Self::new(&self.unscaled / pow10(self.scale), 0)
    }

    /// The whole-number part as an integer.
    pub fn whole_part(&self) -> BigUint {
        &self.unscaled / pow10(self.scale)
    }

    fn normalized(mut self) -> Self {
        let ten = BigUint::from(10u32);
        while self.scale > 0 && (&self.unscaled % &ten).is_zero() {
            self.unscaled /= &ten;
            self.scale -= 1;
        }
        if self.unscaled.is_zero() {
            self.scale = 0;
        }
        self
    }
}

impl PartialEq for DecimalAmount {
    fn eq(&self, other: &Self) -> bool {
        let a = self.clone().normalized();
        let b = other.clone().normalized();
        a.unscaled == b.unscaled && a.scale == b.scale
    }
}

impl Eq for DecimalAmount {}

impl fmt::Display for DecimalAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.to_str_radix(10);
        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&digits);
        }
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{int_part}.{frac_part}")
    }
}

impl FromStr for DecimalAmount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(TypesError::NegativeAmount);
        }
        let s = s.strip_prefix('+').unwrap_or(s);
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(TypesError::InvalidAmount(s.to_string()));
        }
        let combined = format!("{int_part}{frac_part}");
        let unscaled = BigUint::parse_bytes(combined.as_bytes(), 10)
            .ok_or_else(|| TypesError::InvalidAmount(s.to_string()))?;
        Ok(Self::new(unscaled, frac_part.len() as u32))
    }
}

impl Serialize for DecimalAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DecimalAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Converts between display values and raw amounts.
pub struct AmountConverter;

impl AmountConverter {
    /// `value × scale(denom)`, truncated to a whole raw unit. Sub-raw fractions are
    /// discarded, never rounded up.
    pub fn to_raw(value: &DecimalAmount, denom: Denomination) -> RawAmount {
        let exp = denom.exponent();
        if value.scale <= exp {
            RawAmount(&value.unscaled * pow10(exp - value.scale))
        } else {
            RawAmount(&value.unscaled / pow10(value.scale - exp))
        }
    }

    /// Exact `raw / scale(denom)`. May carry more fractional digits than a UI shows.
    pub fn from_raw(raw: &RawAmount, denom: Denomination) -> DecimalAmount {
        DecimalAmount::new(raw.0.clone(), denom.exponent())
    }

    /// Split `raw` into whole display units and the raw residual below one unit.
    ///
    /// `to_raw(whole, d) + residual == raw` always holds.
    pub fn split(raw: &RawAmount, denom: Denomination) -> (DecimalAmount, RawAmount) {
        let scale = denom.scale();
        let residual = raw % &scale;
        let whole = Self::from_raw(raw, denom).floor();
        (whole, residual)
    }
}
