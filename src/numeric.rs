//! Rational amounts in the engine's `gnc_numeric` representation.
//!
//! A [`Numeric`] is a 64-bit numerator over a 64-bit denominator. A zero
//! denominator marks an error value whose numerator carries the error code,
//! and a negative denominator means "multiply by |denom|", exactly as the
//! engine stores them. Arithmetic here is exact rational arithmetic over
//! those values; rounding only happens through [`Numeric::convert`].

use std::{
    cmp::Ordering,
    fmt::Display,
    hash::{Hash, Hasher},
    iter::Sum,
    ops::{Add, Div, Mul, Neg, Sub},
    str::FromStr,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
    #[error("invalid argument")]
    Arg,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("denominators differ")]
    DenomDiff,
    #[error("result has a remainder")]
    Remainder,
    #[error("cannot parse {0:?} as a number")]
    Parse(String),
}

impl NumericError {
    /// The engine's `GNCNumericErrorCode` for this error.
    pub fn code(&self) -> i64 {
        match self {
            NumericError::Arg | NumericError::Parse(_) => -1,
            NumericError::Overflow => -2,
            NumericError::DenomDiff => -3,
            NumericError::Remainder => -4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(NumericError::Arg),
            -2 => Some(NumericError::Overflow),
            -3 => Some(NumericError::DenomDiff),
            -4 => Some(NumericError::Remainder),
            _ => None,
        }
    }
}

/// How [`Numeric::convert`] treats a remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundMode {
    /// Toward negative infinity.
    Floor,
    /// Toward positive infinity.
    Ceil,
    /// Toward zero.
    Truncate,
    /// Away from zero.
    Promote,
    /// Nearest, ties toward zero.
    HalfDown,
    /// Nearest, ties away from zero.
    HalfUp,
    /// Nearest, ties to even.
    Banker,
    /// Fail with [`NumericError::Remainder`] instead of rounding.
    Never,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct Numeric {
    num: i64,
    denom: i64,
}

type Fraction = (i128, i128);

fn gcd(mut a: i128, mut b: i128) -> i128 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

fn lowest_terms((n, d): Fraction) -> Fraction {
    let g = gcd(n, d).max(1);
    (n / g, d / g)
}

fn narrow(v: i128) -> Result<i64, NumericError> {
    i64::try_from(v).map_err(|_| NumericError::Overflow)
}

impl Numeric {
    pub const ZERO: Numeric = Numeric { num: 0, denom: 1 };

    pub const fn new(num: i64, denom: i64) -> Self {
        Self { num, denom }
    }

    pub const fn zero() -> Self {
        Self::ZERO
    }

    pub const fn from_i64(n: i64) -> Self {
        Self { num: n, denom: 1 }
    }

    /// The error value the engine uses for `err`.
    pub fn error(err: NumericError) -> Self {
        Self {
            num: err.code(),
            denom: 0,
        }
    }

    pub fn num(&self) -> i64 {
        self.num
    }

    pub fn denom(&self) -> i64 {
        self.denom
    }

    pub fn check(&self) -> Result<(), NumericError> {
        if self.denom != 0 {
            return Ok(());
        }
        match self.num {
            0 => Err(NumericError::Arg),
            n if n > 0 || n < -4 => Err(NumericError::Overflow),
            n => Err(NumericError::from_code(n).unwrap_or(NumericError::Overflow)),
        }
    }

    pub fn is_error(&self) -> bool {
        self.check().is_err()
    }

    /// The value as a fraction with a positive denominator.
    fn fraction(&self) -> Result<Fraction, NumericError> {
        self.check()?;
        if self.denom < 0 {
            Ok((self.num as i128 * -(self.denom as i128), 1))
        } else {
            Ok((self.num as i128, self.denom as i128))
        }
    }

    fn from_fraction((n, d): Fraction) -> Result<Self, NumericError> {
        if d == 0 {
            return Err(NumericError::Arg);
        }
        let (n, d) = if d < 0 { (-n, -d) } else { (n, d) };
        let g = gcd(n, d).max(1);
        Ok(Self {
            num: narrow(n / g)?,
            denom: narrow(d / g)?,
        })
    }

    pub fn is_zero(&self) -> bool {
        !self.is_error() && self.num == 0
    }

    pub fn is_negative(&self) -> bool {
        !self.is_error() && self.num < 0
    }

    pub fn is_positive(&self) -> bool {
        !self.is_error() && self.num > 0
    }

    pub fn abs(&self) -> Self {
        if self.is_negative() {
            -*self
        } else {
            *self
        }
    }

    /// Lowest-terms form with a positive denominator.
    pub fn reduce(&self) -> Result<Self, NumericError> {
        Self::from_fraction(self.fraction()?)
    }

    /// True when both values have identical numerator and denominator,
    /// unlike `==` which compares the rational values.
    pub fn same_representation(&self, other: &Numeric) -> bool {
        self.num == other.num && self.denom == other.denom
    }

    pub fn to_f64(&self) -> f64 {
        match self.fraction() {
            Ok((n, d)) => n as f64 / d as f64,
            Err(_) => f64::NAN,
        }
    }

    pub fn checked_add(&self, other: &Numeric) -> Result<Self, NumericError> {
        self.combine(other, i128::checked_add)
    }

    pub fn checked_sub(&self, other: &Numeric) -> Result<Self, NumericError> {
        self.combine(other, i128::checked_sub)
    }

    /// Brings both operands to a common denominator and applies `op` to the
    /// numerators. Subtraction works on the numerators directly, so an
    /// operand of `i64::MIN` never has to be negated.
    fn combine(&self, other: &Numeric, op: fn(i128, i128) -> Option<i128>) -> Result<Self, NumericError> {
        let (a, b) = self.fraction()?;
        let (c, d) = other.fraction()?;
        let den = b / gcd(b, d) * d;
        let n = a
            .checked_mul(den / b)
            .zip(c.checked_mul(den / d))
            .and_then(|(x, y)| op(x, y))
            .ok_or(NumericError::Overflow)?;
        Self::from_fraction((n, den))
    }

    pub fn checked_mul(&self, other: &Numeric) -> Result<Self, NumericError> {
        let (a, b) = self.fraction()?;
        let (c, d) = other.fraction()?;
        // Cross-reduce first so intermediate products stay small.
        let g1 = gcd(a, d).max(1);
        let g2 = gcd(c, b).max(1);
        let n = (a / g1).checked_mul(c / g2).ok_or(NumericError::Overflow)?;
        let den = (b / g2).checked_mul(d / g1).ok_or(NumericError::Overflow)?;
        Self::from_fraction((n, den))
    }

    pub fn checked_div(&self, other: &Numeric) -> Result<Self, NumericError> {
        let (c, d) = other.fraction()?;
        if c == 0 {
            return Err(NumericError::Arg);
        }
        self.checked_mul(&Self::from_fraction((d, c))?)
    }

    /// Re-expresses the value over `denom`, rounding the remainder by `mode`.
    pub fn convert(&self, denom: i64, mode: RoundMode) -> Result<Self, NumericError> {
        if denom <= 0 {
            return Err(NumericError::Arg);
        }
        let (n, d) = self.fraction()?;
        let scaled = n.checked_mul(denom as i128).ok_or(NumericError::Overflow)?;
        let mut q = scaled / d;
        let r = scaled % d;

        if r != 0 {
            let sign = scaled.signum();
            let twice = (r.abs() * 2).cmp(&d);
            let promote = match mode {
                RoundMode::Never => return Err(NumericError::Remainder),
                RoundMode::Floor => sign < 0,
                RoundMode::Ceil => sign > 0,
                RoundMode::Truncate => false,
                RoundMode::Promote => true,
                RoundMode::HalfDown => twice == Ordering::Greater,
                RoundMode::HalfUp => twice != Ordering::Less,
                RoundMode::Banker => match twice {
                    Ordering::Greater => true,
                    Ordering::Equal => q % 2 != 0,
                    Ordering::Less => false,
                },
            };
            if promote {
                q += sign;
            }
        }

        Ok(Self {
            num: narrow(q)?,
            denom,
        })
    }

    /// Exact conversion from a decimal: the scale becomes a power-of-ten
    /// denominator without reduction, so `12.30` is `1230/100`.
    pub fn from_decimal(d: Decimal) -> Result<Self, NumericError> {
        let denom = 10i128
            .checked_pow(d.scale())
            .ok_or(NumericError::Overflow)?;
        Ok(Self {
            num: narrow(d.mantissa())?,
            denom: narrow(denom)?,
        })
    }

    pub fn to_decimal(&self) -> Result<Decimal, NumericError> {
        let (n, d) = self.fraction()?;
        if let Some(scale) = power_of_ten(d) {
            if let Ok(dec) = Decimal::try_from_i128_with_scale(n, scale) {
                return Ok(dec);
            }
        }
        let n = Decimal::try_from_i128_with_scale(n, 0).map_err(|_| NumericError::Overflow)?;
        let d = Decimal::try_from_i128_with_scale(d, 0).map_err(|_| NumericError::Overflow)?;
        n.checked_div(d).ok_or(NumericError::Overflow)
    }
}

fn power_of_ten(mut d: i128) -> Option<u32> {
    let mut scale = 0;
    while d > 1 {
        if d % 10 != 0 {
            return None;
        }
        d /= 10;
        scale += 1;
    }
    (d == 1).then_some(scale)
}

impl Default for Numeric {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Numeric {
    fn from(n: i64) -> Self {
        Self::from_i64(n)
    }
}

impl Neg for Numeric {
    type Output = Numeric;

    fn neg(self) -> Numeric {
        if self.is_error() {
            return self;
        }
        match self.num.checked_neg() {
            Some(num) => Numeric {
                num,
                denom: self.denom,
            },
            None => Numeric::error(NumericError::Overflow),
        }
    }
}

// Operators follow the engine: a failed operation yields an error value
// that poisons later arithmetic instead of panicking.
macro_rules! impl_op {
    ($trait:ident, $method:ident, $checked:ident) => {
        impl $trait for Numeric {
            type Output = Numeric;

            fn $method(self, rhs: Numeric) -> Numeric {
                self.$checked(&rhs).unwrap_or_else(Numeric::error)
            }
        }
    };
}

impl_op!(Add, add, checked_add);
impl_op!(Sub, sub, checked_sub);
impl_op!(Mul, mul, checked_mul);
impl_op!(Div, div, checked_div);

impl Sum for Numeric {
    fn sum<I: Iterator<Item = Numeric>>(iter: I) -> Self {
        iter.fold(Numeric::ZERO, |acc, n| acc + n)
    }
}

impl<'a> Sum<&'a Numeric> for Numeric {
    fn sum<I: Iterator<Item = &'a Numeric>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        match (self.fraction(), other.fraction()) {
            (Ok(a), Ok(b)) => lowest_terms(a) == lowest_terms(b),
            _ => self.same_representation(other),
        }
    }
}

impl Eq for Numeric {}

impl Hash for Numeric {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.fraction() {
            Ok(f) => lowest_terms(f).hash(state),
            Err(_) => {
                self.num.hash(state);
                self.denom.hash(state);
            }
        }
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // Error values only order against themselves, matching `==`.
        if self.is_error() && self.same_representation(other) {
            return Some(Ordering::Equal);
        }
        let (a, b) = self.fraction().ok()?;
        let (c, d) = other.fraction().ok()?;
        match (a.checked_mul(d), c.checked_mul(b)) {
            (Some(lhs), Some(rhs)) => Some(lhs.cmp(&rhs)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl Display for Numeric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.check() {
            Ok(()) => write!(f, "{}/{}", self.num, self.denom),
            Err(e) => write!(f, "<ERROR> [{}]", e.code()),
        }
    }
}

impl std::fmt::Debug for Numeric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Numeric({})", self)
    }
}

impl FromStr for Numeric {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse_err = || NumericError::Parse(s.to_string());

        if let Some((num, denom)) = s.split_once('/') {
            let num: i64 = num.trim().parse().map_err(|_| parse_err())?;
            let denom: i64 = denom.trim().parse().map_err(|_| parse_err())?;
            if denom == 0 {
                return Err(NumericError::Arg);
            }
            return Ok(Numeric::new(num, denom));
        }

        if let Ok(n) = s.parse::<i64>() {
            return Ok(Numeric::from_i64(n));
        }

        let dec = Decimal::from_str(s).map_err(|_| parse_err())?;
        Numeric::from_decimal(dec)
    }
}

#[cfg(feature = "engine")]
impl From<gnucash_sys::gnc_numeric> for Numeric {
    fn from(n: gnucash_sys::gnc_numeric) -> Self {
        Numeric::new(n.num, n.denom)
    }
}

#[cfg(feature = "engine")]
impl From<Numeric> for gnucash_sys::gnc_numeric {
    fn from(n: Numeric) -> Self {
        gnucash_sys::gnc_numeric {
            num: n.num,
            denom: n.denom,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_check_error_values() {
        assert_eq!(Numeric::new(5, 100).check(), Ok(()));
        assert_eq!(Numeric::new(0, 0).check(), Err(NumericError::Arg));
        assert_eq!(Numeric::new(-2, 0).check(), Err(NumericError::Overflow));
        assert_eq!(Numeric::new(-4, 0).check(), Err(NumericError::Remainder));
        assert_eq!(Numeric::new(7, 0).check(), Err(NumericError::Overflow));
        assert_eq!(Numeric::new(-9, 0).check(), Err(NumericError::Overflow));
        assert!(Numeric::error(NumericError::DenomDiff).is_error());
        assert_eq!(Numeric::error(NumericError::DenomDiff).num(), -3);
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Numeric::new(1, 2), Numeric::new(2, 4));
        assert_eq!(Numeric::new(5000, 100), Numeric::from_i64(50));
        assert_ne!(Numeric::new(1, 3), Numeric::new(1, 2));
        assert!(!Numeric::new(1, 2).same_representation(&Numeric::new(2, 4)));

        let set: HashSet<Numeric> = [Numeric::new(1, 2), Numeric::new(50, 100)].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_negative_denominator_is_a_multiplier() {
        let n = Numeric::new(3, -10);
        assert_eq!(n, Numeric::from_i64(30));
        assert_eq!(n.to_f64(), 30.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = Numeric::new(5000, 100);
        let b = Numeric::new(-1250, 100);
        assert_eq!(a.checked_add(&b).unwrap(), Numeric::new(75, 2));
        assert_eq!(a.checked_sub(&b).unwrap(), Numeric::new(125, 2));
        assert_eq!(a.checked_mul(&b).unwrap(), Numeric::new(-625, 1));
        assert_eq!(a.checked_div(&b).unwrap(), Numeric::from_i64(-4));
        assert_eq!(Numeric::new(1, 3) + Numeric::new(1, 6), Numeric::new(1, 2));
    }

    #[test]
    fn test_arithmetic_errors() {
        let one = Numeric::from_i64(1);
        assert_eq!(one.checked_div(&Numeric::ZERO), Err(NumericError::Arg));
        assert_eq!(
            Numeric::from_i64(i64::MAX).checked_add(&one),
            Err(NumericError::Overflow)
        );
        let poisoned = Numeric::from_i64(i64::MAX) + one + one;
        assert_eq!(poisoned.check(), Err(NumericError::Overflow));
        assert_eq!(poisoned.to_string(), "<ERROR> [-2]");
        assert!(poisoned.to_f64().is_nan());
    }

    #[test]
    fn test_convert_rounding() {
        let n = Numeric::new(125, 1000); // 0.125
        let m = Numeric::new(-125, 1000);
        let at = |v: Numeric, mode| v.convert(100, mode).unwrap().num();

        assert_eq!(at(n, RoundMode::Floor), 12);
        assert_eq!(at(m, RoundMode::Floor), -13);
        assert_eq!(at(n, RoundMode::Ceil), 13);
        assert_eq!(at(m, RoundMode::Ceil), -12);
        assert_eq!(at(n, RoundMode::Truncate), 12);
        assert_eq!(at(m, RoundMode::Truncate), -12);
        assert_eq!(at(n, RoundMode::Promote), 13);
        assert_eq!(at(m, RoundMode::Promote), -13);
        assert_eq!(at(n, RoundMode::HalfDown), 12);
        assert_eq!(at(n, RoundMode::HalfUp), 13);
        assert_eq!(at(m, RoundMode::HalfUp), -13);
        assert_eq!(at(n, RoundMode::Banker), 12);
        assert_eq!(at(Numeric::new(135, 1000), RoundMode::Banker), 14);
        assert_eq!(at(Numeric::new(126, 1000), RoundMode::HalfDown), 13);
        assert_eq!(n.convert(100, RoundMode::Never), Err(NumericError::Remainder));
        assert_eq!(n.convert(1000, RoundMode::Never).unwrap(), n);
        assert_eq!(n.convert(0, RoundMode::Floor), Err(NumericError::Arg));
    }

    #[test]
    fn test_reduce() {
        let r = Numeric::new(-50, -10).reduce().unwrap();
        assert!(r.same_representation(&Numeric::new(-500, 1)));
        let r = Numeric::new(10, 40).reduce().unwrap();
        assert!(r.same_representation(&Numeric::new(1, 4)));
    }

    #[test]
    fn test_parse() {
        assert!("5000/100".parse::<Numeric>().unwrap().same_representation(&Numeric::new(5000, 100)));
        assert!("42".parse::<Numeric>().unwrap().same_representation(&Numeric::from_i64(42)));
        assert!("-12.34".parse::<Numeric>().unwrap().same_representation(&Numeric::new(-1234, 100)));
        assert_eq!("1/0".parse::<Numeric>(), Err(NumericError::Arg));
        assert!(matches!("abc".parse::<Numeric>(), Err(NumericError::Parse(_))));
        assert_eq!(Numeric::new(5000, 100).to_string(), "5000/100");
    }

    #[test]
    fn test_decimal_interop() {
        let n = Numeric::from_decimal(dec!(12.30)).unwrap();
        assert!(n.same_representation(&Numeric::new(1230, 100)));
        assert_eq!(n.to_decimal().unwrap(), dec!(12.30));
        assert_eq!(Numeric::new(1, 4).to_decimal().unwrap(), dec!(0.25));
        assert_eq!(Numeric::new(-7, 1).to_decimal().unwrap(), dec!(-7));
        assert_eq!(Numeric::new(3, -10).to_decimal().unwrap(), dec!(30));
        assert!(Numeric::error(NumericError::Arg).to_decimal().is_err());
    }

    #[test]
    fn test_sum_and_ordering() {
        let total: Numeric = [Numeric::new(1, 2), Numeric::new(1, 4), Numeric::new(1, 4)].iter().sum();
        assert_eq!(total, Numeric::from_i64(1));
        assert!(Numeric::new(1, 3) < Numeric::new(1, 2));
        assert!(Numeric::new(-1, 2) < Numeric::ZERO);
        assert_eq!(Numeric::error(NumericError::Arg).partial_cmp(&Numeric::ZERO), None);
    }

    #[test]
    fn test_error_value_orders_equal_to_itself() {
        let e = Numeric::error(NumericError::Overflow);
        assert_eq!(e, e);
        assert_eq!(e.partial_cmp(&e), Some(Ordering::Equal));
        assert!(e <= e);
        assert_eq!(e.partial_cmp(&Numeric::error(NumericError::Arg)), None);
        assert_eq!(Numeric::ZERO.partial_cmp(&e), None);
    }

    #[test]
    fn test_sub_at_the_edges_of_i64() {
        let min = Numeric::from_i64(i64::MIN);
        assert_eq!(Numeric::from_i64(-1).checked_sub(&min), Ok(Numeric::from_i64(i64::MAX)));
        assert_eq!(Numeric::from_i64(-1) - min, Numeric::from_i64(i64::MAX));
        assert_eq!(min.checked_sub(&min), Ok(Numeric::ZERO));
        assert_eq!(Numeric::ZERO.checked_sub(&min), Err(NumericError::Overflow));
    }

    #[test]
    fn test_neg_and_abs() {
        assert_eq!(-Numeric::new(3, 4), Numeric::new(-3, 4));
        assert_eq!(Numeric::new(-3, 4).abs(), Numeric::new(3, 4));
        assert!((-Numeric::new(i64::MIN, 1)).is_error());
    }
}
