//! Arbitrary-range decimal used for HP, damage and currency
//!
//! [`Money`] wraps a `fastnum` 128-bit decimal: about 38 significant digits
//! with a decimal exponent reaching past 1e32000, so values far beyond
//! `f64::MAX` still add, compare and format correctly. Results that leave even
//! that range saturate at [`Money::MAX`] / [`Money::MIN`].
//!
//! All operations are pure: they return a new value and never mutate `self`.

pub mod format;
pub mod formulas;

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use fastnum::D128;
use fastnum::decimal::{Context, ParseError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub use format::format_short;

/// Every value carries this context. Without traps, overflow and invalid
/// operations produce Inf/NaN instead of panicking, and [`Money::wrap`] folds
/// those back into range.
const CTX: Context = Context::default().without_traps();

/// Exponents in this range print as plain decimals, the rest as `1.5e+400`
const PLAIN_EXPONENTS: std::ops::RangeInclusive<i64> = -5..=15;

/// Error returned when a decimal string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMoneyError {
    #[error("empty number")]
    Empty,
    #[error("invalid digit in {0:?}")]
    InvalidDigit(String),
    #[error("invalid exponent in {0:?}")]
    InvalidExponent(String),
    #[error("{0:?} is out of range")]
    OutOfRange(String),
}

/// Arbitrary-range decimal value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(D128);

impl Money {
    pub const ZERO: Money = Money(D128::ZERO.with_ctx(CTX));
    pub const ONE: Money = Money(D128::ONE.with_ctx(CTX));
    pub const MAX: Money = Money(D128::MAX.with_ctx(CTX));
    pub const MIN: Money = Money(D128::MIN.with_ctx(CTX));

    fn wrap(value: D128) -> Self {
        if value.is_nan() {
            Self::ZERO
        } else if value.is_infinite() {
            if value.is_negative() { Self::MIN } else { Self::MAX }
        } else {
            Self(value)
        }
    }

    /// Build from an `f64` through its shortest round-trip decimal form, so
    /// `0.1` is exactly one tenth. NaN and infinities become zero.
    pub fn from_f64(value: f64) -> Self {
        if value == 0.0 || !value.is_finite() {
            return Self::ZERO;
        }
        D128::from_str(&format!("{value:e}"), CTX)
            .map(Self::wrap)
            .unwrap_or(Self::ZERO)
    }

    /// Leading digits scaled into `[1, 10)` (0 for zero)
    pub fn mantissa(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let shift = self.0.digits_count() as i32 - 1;
        D128::from_parts(self.0.digits(), -shift, self.0.sign(), CTX).to_f64()
    }

    /// Decimal exponent of the leading digit (0 for zero)
    pub fn exponent(&self) -> i64 {
        if self.is_zero() {
            return 0;
        }
        self.0.digits_count() as i64 - 1 - self.0.fractional_digits_count() as i64
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_zero_or_less(&self) -> bool {
        self.is_zero() || self.0.is_negative()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_negative()
    }

    /// Lossy conversion. Saturates to ±infinity past `f64::MAX`.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64()
    }

    /// Base-10 logarithm (`-inf` for zero, NaN for negatives)
    pub fn log10(&self) -> f64 {
        if self.is_zero() {
            return f64::NEG_INFINITY;
        }
        if self.is_negative() {
            return f64::NAN;
        }
        self.mantissa().log10() + self.exponent() as f64
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Raise to an integer power, saturating on overflow
    pub fn powi(self, power: i32) -> Self {
        if power == 0 {
            return Self::ONE;
        }
        if self.is_zero() {
            return Self::ZERO;
        }
        Self::wrap(self.0.powi(power))
    }

    /// Raise to a real power. Undefined results (negative base with a
    /// fractional power, non-finite power) are zero.
    pub fn pow(self, power: f64) -> Self {
        if power == 0.0 {
            return Self::ONE;
        }
        if self.is_zero() || !power.is_finite() {
            return Self::ZERO;
        }
        if power.fract() == 0.0 && power.abs() <= i32::MAX as f64 {
            return self.powi(power as i32);
        }
        if self.is_negative() {
            return Self::ZERO;
        }

        // f64 rounds 100^1.5 to exactly 1000 where exp(ln) would not
        let fast = self.to_f64().powf(power);
        if fast.is_normal() && self.exponent().abs() < 300 {
            return Self::from_f64(fast);
        }
        Self::wrap(self.0.pow(Self::from_f64(power).0))
    }

    fn integral(self, round: fn(D128) -> D128) -> Self {
        // No fractional digits left to drop
        if self.0.fractional_digits_count() <= 0 {
            return self;
        }
        Self::wrap(round(self.0))
    }

    pub fn floor(self) -> Self {
        self.integral(D128::floor)
    }

    pub fn ceil(self) -> Self {
        self.integral(D128::ceil)
    }

    /// Round half away from zero
    pub fn round(self) -> Self {
        self.integral(|d| d.round(0))
    }

    /// Subtract, flooring the result at zero
    pub fn saturating_sub(self, rhs: Self) -> Self {
        let result = self - rhs;
        if result.is_negative() {
            Self::ZERO
        } else {
            result
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<u64> for Money {
    fn from(value: u64) -> Self {
        Self(D128::from_u64(value).with_ctx(CTX))
    }
}

impl From<u32> for Money {
    fn from(value: u32) -> Self {
        Self::from(u64::from(value))
    }
}

impl From<f64> for Money {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::wrap(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money::wrap(self.0 - rhs.0)
    }
}

impl Mul for Money {
    type Output = Money;

    fn mul(self, rhs: Money) -> Money {
        Money::wrap(self.0 * rhs.0)
    }
}

impl Mul<f64> for Money {
    type Output = Money;

    fn mul(self, rhs: f64) -> Money {
        self * Money::from_f64(rhs)
    }
}

/// Division by zero yields zero rather than infinity
impl Div for Money {
    type Output = Money;

    fn div(self, rhs: Money) -> Money {
        if self.is_zero() || rhs.is_zero() {
            return Money::ZERO;
        }
        Money::wrap(self.0 / rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

/// Plain decimal for exponents in `[-5, 15]`, `"<digits>e<±exponent>"`
/// otherwise. Round-trips through `FromStr`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let reduced = self.0.reduce();
        if PLAIN_EXPONENTS.contains(&self.exponent()) {
            fmt::Display::fmt(&reduced, f)
        } else {
            fmt::LowerExp::fmt(&reduced, f)
        }
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(ParseMoneyError::Empty);
        }
        let value = D128::from_str(text, CTX).map_err(|err| match err {
            ParseError::ExponentOverflow => ParseMoneyError::InvalidExponent(text.to_string()),
            ParseError::PosOverflow | ParseError::NegOverflow => {
                ParseMoneyError::OutOfRange(text.to_string())
            }
            _ => ParseMoneyError::InvalidDigit(text.to_string()),
        })?;
        // "NaN" and "inf" are valid decimal literals but not amounts
        if !value.is_finite() {
            return Err(ParseMoneyError::InvalidDigit(text.to_string()));
        }
        Ok(Money(value))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(f64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Repr::Number(n) => Ok(Money::from_f64(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str) -> Money {
        s.parse().expect("valid number")
    }

    #[test]
    fn test_construct() {
        assert_eq!(Money::from(100u64).to_f64(), 100.0);
        assert_eq!(m("1000").to_f64(), 1000.0);
        let copy = Money::from(200u64);
        assert_eq!(copy.clone().to_f64(), 200.0);
        assert!(Money::from_f64(f64::NAN).is_zero());
        assert!(Money::from_f64(f64::INFINITY).is_zero());
        assert_eq!(Money::from_f64(0.1), m("0.1"));
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from(10u64);
        let b = Money::from(20u64);
        assert_eq!((a + b).to_f64(), 30.0);
        assert_eq!((b - a).to_f64(), 10.0);
        assert_eq!((a * Money::from(2u64)).to_f64(), 20.0);
        assert_eq!((Money::from(100u64) / b).to_f64(), 5.0);
        assert_eq!((a * 1.5).to_f64(), 15.0);
        assert_eq!(a * 1.1, m("11"));
        // Operands are untouched
        assert_eq!(a.to_f64(), 10.0);
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        assert!((Money::from(5u64) / Money::ZERO).is_zero());
    }

    #[test]
    fn test_comparisons() {
        let a = Money::from(5u64);
        let b = Money::from(10u64);
        assert!(a < b);
        assert!(b > a);
        assert!(a <= a);
        assert_eq!(a, Money::from(5u64));
        assert_eq!(m("1.50"), m("1.5"));
        assert!(-b < -a);
        assert!(-a < Money::ZERO);
        assert!(m("1e400") > m("9e399"));
        assert!(m("1e400") > Money::from_f64(f64::MAX));
    }

    #[test]
    fn test_zero_checks() {
        assert!(Money::ZERO.is_zero());
        assert!(Money::ZERO.is_zero_or_less());
        assert!((-Money::ONE).is_zero_or_less());
        assert!(!Money::ONE.is_zero_or_less());
        assert!(!(-Money::ZERO).is_negative());
    }

    #[test]
    fn test_rounding_and_pow() {
        assert_eq!(Money::from(2u64).pow(3.0).to_f64(), 8.0);
        assert_eq!(Money::from(100u64).pow(1.5).to_f64(), 1000.0);
        assert_eq!(Money::from_f64(3.7).floor().to_f64(), 3.0);
        assert_eq!(Money::from_f64(3.2).ceil().to_f64(), 4.0);
        assert_eq!(Money::from_f64(3.4).round().to_f64(), 3.0);
        assert_eq!(Money::from_f64(3.6).round().to_f64(), 4.0);
        assert_eq!((-Money::from(10u64)).abs().to_f64(), 10.0);
        assert_eq!(Money::from(7u64).pow(0.0), Money::ONE);
        assert!((-Money::from(4u64)).pow(0.5).is_zero());
    }

    #[test]
    fn test_mantissa_and_exponent() {
        assert_eq!(m("229.7").exponent(), 2);
        assert!((m("229.7").mantissa() - 2.297).abs() < 1e-12);
        assert_eq!(m("0.0015").exponent(), -3);
        assert_eq!(m("1.50").exponent(), 0);
        assert_eq!(Money::ZERO.exponent(), 0);
        assert!((m("1e400").log10() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_beyond_f64_range() {
        let huge = m("1e308") * Money::from(1000u64);
        assert_eq!(huge.exponent(), 311);
        assert!(huge.to_f64().is_infinite());
        assert!(huge.to_string().contains('e'));

        let squared = m("1e200").pow(2.0);
        assert_eq!(squared.exponent(), 400);
        assert!(squared.to_string().contains('e'));

        // Tiny addends vanish instead of corrupting the leading digits
        assert_eq!(huge + Money::ONE, huge);
    }

    #[test]
    fn test_powi_past_f64() {
        // 1.2^3999 is about 1e316
        let grown = Money::from_f64(1.2).powi(3999);
        assert!(grown.to_f64().is_infinite());
        assert_eq!(grown.exponent(), 316);
        assert!(grown > Money::ZERO);
    }

    #[test]
    fn test_overflow_saturates() {
        let a = m("9e32000");
        assert_eq!(a * a, Money::MAX);
        assert_eq!((-a) * a, Money::MIN);
        assert_eq!(Money::MAX + Money::MAX, Money::MAX);
        assert_eq!(Money::from(10u64).powi(40_000), Money::MAX);
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["0", "7", "229.7", "1000", "123456789", "0.0015", "1.5e400", "2.297e-9"] {
            let value = m(text);
            let shown = value.to_string();
            assert_eq!(m(&shown), value, "{text} -> {shown}");
        }
        assert_eq!(m("229.7").to_string(), "229.7");
        assert_eq!(m("1.50").to_string(), "1.5");
        assert_eq!(m("1e400").to_string(), "1e+400");
        assert_eq!(m("1e15").to_string(), "1000000000000000");
        assert_eq!(m("1e16").to_string(), "1e+16");
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(m("2.5E+3").to_f64(), 2500.0);
        assert_eq!(m("  42 ").to_f64(), 42.0);
        assert_eq!(m("-3").to_f64(), -3.0);
        assert_eq!(m(".5").to_f64(), 0.5);
        let long = m("123456789012345678901234567890");
        assert_eq!(long.exponent(), 29);
        assert!((long.mantissa() - 1.2345678901234567).abs() < 1e-12);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Money>(), Err(ParseMoneyError::Empty));
        assert!(matches!("abc".parse::<Money>(), Err(ParseMoneyError::InvalidDigit(_))));
        assert!("1e".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
        assert!(matches!("1.2.3".parse::<Money>(), Err(ParseMoneyError::InvalidDigit(_))));
        assert!(matches!("NaN".parse::<Money>(), Err(ParseMoneyError::InvalidDigit(_))));
        assert!(matches!("inf".parse::<Money>(), Err(ParseMoneyError::InvalidDigit(_))));
    }

    #[test]
    fn test_parse_rejects_exponent_overflow() {
        assert_eq!(
            "10e9223372036854775807".parse::<Money>(),
            Err(ParseMoneyError::InvalidExponent("10e9223372036854775807".into()))
        );
        assert_eq!(
            "1e40000".parse::<Money>(),
            Err(ParseMoneyError::OutOfRange("1e40000".into()))
        );
    }

    #[test]
    fn test_saturating_sub() {
        let a = Money::from(5u64);
        assert!(a.saturating_sub(Money::from(9u64)).is_zero());
        assert_eq!(a.saturating_sub(Money::from(2u64)).to_f64(), 3.0);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&m("1.5e400")).unwrap();
        assert_eq!(json, "\"1.5e+400\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m("1.5e400"));
        let from_number: Money = serde_json::from_str("31").unwrap();
        assert_eq!(from_number.to_f64(), 31.0);
    }
}
