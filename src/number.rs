//! This module contains the real number: an element of a real field.

use crate::context::RoundingMode;
use crate::error::{Error, Result};
use crate::field::RealField;
use crate::float::Float;
use crate::string::default_digits;
use core::cmp::Ordering;
use core::fmt::{Debug, Display, LowerExp};
use core::ops::Neg;
use num_bigint::{BigInt, BigUint};

/// A real number that belongs to a `RealField`. The number is stored with
/// the precision of its field, and every operation rounds its result with
/// the rounding mode of the field.
///
/// Numbers of different fields can't be mixed: the binary operations return
/// `Error::IncompatibleRings`. Use `RealField::convert` to move a number to
/// another field.
#[derive(Clone)]
pub struct RealNumber {
    parent: RealField,
    raw: Float,
}

impl RealNumber {
    pub(crate) fn new(parent: RealField, raw: Float) -> Self {
        debug_assert_eq!(raw.get_precision(), parent.precision());
        RealNumber { parent, raw }
    }

    pub(crate) fn raw(&self) -> &Float {
        &self.raw
    }

    /// Returns the field of this number.
    pub fn parent(&self) -> &RealField {
        &self.parent
    }

    pub fn precision(&self) -> usize {
        self.parent.precision()
    }

    fn rm(&self) -> RoundingMode {
        self.parent.rounding_mode()
    }

    // Printed digits parse back to the same number in this field.
    fn print_rm(&self) -> RoundingMode {
        self.rm().for_printing()
    }

    fn unary(&self, raw: Float) -> Self {
        self.parent.make(raw)
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.parent.is_compatible(&other.parent) {
            return Ok(());
        }
        let left = *self.parent.context();
        let right = *other.parent.context();
        tracing::debug!(%left, %right, "rejected numbers of different fields");
        Err(Error::IncompatibleRings { left, right })
    }

    fn binary(
        &self,
        other: &Self,
        op: fn(&Float, &Float, RoundingMode) -> Float,
    ) -> Result<Self> {
        self.check_compatible(other)?;
        Ok(self.unary(op(&self.raw, &other.raw, self.rm())))
    }

    /// Returns self + other.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.binary(other, Float::add_with_rm)
    }

    /// Returns self - other.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.binary(other, Float::sub_with_rm)
    }

    /// Returns self * other.
    pub fn mul(&self, other: &Self) -> Result<Self> {
        self.binary(other, Float::mul_with_rm)
    }

    /// Returns self / other. Division by zero produces a signed infinity, or
    /// NaN for 0/0.
    pub fn div(&self, other: &Self) -> Result<Self> {
        self.binary(other, Float::div_with_rm)
    }

    /// Returns the IEEE remainder self - n * other, where n is the integer
    /// nearest to self/other (ties to even).
    pub fn rem(&self, other: &Self) -> Result<Self> {
        self.binary(other, Float::rem_with_rm)
    }

    /// Returns the smaller of the two numbers. NaN operands are ignored, and
    /// -0 is smaller than +0.
    pub fn min(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        Ok(self.unary(self.raw.min(&other.raw)))
    }

    /// Returns the larger of the two numbers. NaN operands are ignored, and
    /// +0 is larger than -0.
    pub fn max(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        Ok(self.unary(self.raw.max(&other.raw)))
    }

    /// Compare two numbers of the same field. Returns None if one of the
    /// numbers is NaN.
    pub fn try_cmp(&self, other: &Self) -> Result<Option<Ordering>> {
        self.check_compatible(other)?;
        Ok(self.raw.partial_cmp(&other.raw))
    }

    pub fn abs(&self) -> Self {
        self.unary(self.raw.abs())
    }

    /// Returns the square root. Negative numbers produce NaN, and the root
    /// of -0 is -0.
    pub fn sqrt(&self) -> Self {
        self.unary(self.raw.sqrt_with_rm(self.rm()))
    }

    /// Returns the number raised to the integer power `n`. x^0 is 1 for
    /// every x, including NaN.
    pub fn powi(&self, n: i64) -> Self {
        self.unary(self.raw.powi_with_rm(n, self.rm()))
    }

    /// Returns the number multiplied by 2^n.
    pub fn mul_2si(&self, n: i64) -> Self {
        self.unary(self.raw.scale(n, self.rm()))
    }

    /// Round toward zero to an integral value.
    pub fn trunc(&self) -> Self {
        self.unary(self.raw.trunc())
    }

    /// Round toward -Inf to an integral value.
    pub fn floor(&self) -> Self {
        self.unary(self.raw.round_to_integral(RoundingMode::Negative))
    }

    /// Round toward +Inf to an integral value.
    pub fn ceil(&self) -> Self {
        self.unary(self.raw.round_to_integral(RoundingMode::Positive))
    }

    /// Round to the nearest integral value, with ties away from zero.
    pub fn round(&self) -> Self {
        self.unary(self.raw.round_to_integral(RoundingMode::NearestTiesToAway))
    }

    /// Returns the next number toward +Inf.
    pub fn next_above(&self) -> Self {
        self.unary(self.raw.next_up())
    }

    /// Returns the next number toward -Inf.
    pub fn next_below(&self) -> Self {
        self.unary(self.raw.next_down())
    }

    /// Returns the value of the lowest bit of the number.
    pub fn ulp(&self) -> Self {
        self.unary(self.raw.ulp(self.rm()))
    }

    pub fn is_nan(&self) -> bool {
        self.raw.is_nan()
    }

    pub fn is_infinite(&self) -> bool {
        self.raw.is_inf()
    }

    pub fn is_finite(&self) -> bool {
        self.raw.is_normal() || self.raw.is_zero()
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Returns the sign bit. This is true for -0 and for negative NaNs.
    pub fn is_sign_negative(&self) -> bool {
        self.raw.is_negative()
    }

    /// Returns -1, 0 or 1. NaN and the zeros return 0.
    pub fn sign(&self) -> i32 {
        if self.raw.is_nan() || self.raw.is_zero() {
            0
        } else if self.raw.is_negative() {
            -1
        } else {
            1
        }
    }

    /// Returns the exponent E of finite non-zero numbers, where the number
    /// is 0.1xxxx * 2^E.
    pub fn exponent(&self) -> Option<i64> {
        self.raw.is_normal().then(|| self.raw.get_exp())
    }

    /// Returns the nearest double, rounded with the rounding mode of the
    /// field.
    pub fn to_f64(&self) -> f64 {
        self.raw.to_f64(self.rm())
    }

    /// Round to an integer with the rounding mode `rm`. Returns None for NaN
    /// and the infinities.
    pub fn to_integer(&self, rm: RoundingMode) -> Option<BigInt> {
        self.raw.to_integer(rm)
    }

    /// Round to an i64 with the rounding mode `rm`. Saturates out of range
    /// values, and NaN returns 0.
    pub fn to_i64(&self, rm: RoundingMode) -> i64 {
        self.raw.to_i64(rm)
    }

    /// Returns the exact value as a fraction (numerator, denominator) with a
    /// positive power-of-two denominator, in lowest terms.
    pub fn exact_rational(&self) -> Option<(BigInt, BigInt)> {
        self.raw.exact_rational()
    }

    /// Returns the `n`-th convergent of the continued fraction of |self|.
    pub fn as_fraction(&self, n: usize) -> (BigUint, BigUint) {
        self.raw.as_fraction(n)
    }

    /// Convert to a decimal string with `digits` significant digits, or the
    /// number of digits that round-trips for the precision when None. In the
    /// directed modes the digits are rounded in the opposite direction, so
    /// that parsing them in this field rounds back to this number.
    pub fn to_string_digits(&self, digits: Option<usize>) -> String {
        let sci = self.parent.scientific_notation();
        self.raw.to_digits_string(10, digits, sci, self.print_rm())
    }

    /// Convert to a string in the radix `radix` (2 to 36).
    pub fn to_string_radix(
        &self,
        radix: u32,
        digits: Option<usize>,
    ) -> Result<String> {
        if !(2..=36).contains(&radix) {
            return Err(Error::InvalidRadix(radix));
        }
        let sci = self.parent.scientific_notation();
        Ok(self.raw.to_digits_string(radix, digits, sci, self.print_rm()))
    }

    /// Returns the default number of decimal digits for printing.
    pub fn default_digits(&self) -> usize {
        default_digits(self.precision(), 10)
    }
}

impl Neg for &RealNumber {
    type Output = RealNumber;
    fn neg(self) -> RealNumber {
        self.unary(self.raw.neg())
    }
}

impl Neg for RealNumber {
    type Output = RealNumber;
    fn neg(mut self) -> RealNumber {
        self.raw = self.raw.neg();
        self
    }
}

/// Numbers of different fields are never equal.
impl PartialEq for RealNumber {
    fn eq(&self, other: &Self) -> bool {
        self.parent.is_compatible(&other.parent) && self.raw == other.raw
    }
}

/// Numbers of different fields are unordered.
impl PartialOrd for RealNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if !self.parent.is_compatible(&other.parent) {
            return None;
        }
        self.raw.partial_cmp(&other.raw)
    }
}

impl Display for RealNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sci = self.parent.scientific_notation();
        let s = self.raw.to_digits_string(10, f.precision(), sci, self.print_rm());
        f.write_str(&s)
    }
}

impl LowerExp for RealNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = self.raw.to_digits_string(10, f.precision(), true, self.print_rm());
        f.write_str(&s)
    }
}

impl Debug for RealNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RealNumber")
            .field("value", &self.to_string())
            .field("field", self.parent.context())
            .finish()
    }
}

#[cfg(test)]
fn f64_field() -> RealField {
    RealField::default()
}

#[test]
fn test_send_sync() {
    fn check<T: Send + Sync>() {}
    check::<RealNumber>();
    check::<RealField>();
}

#[test]
fn test_arithmetic() {
    let f = f64_field();
    let a = f.from_f64(1.5);
    let b = f.from_f64(-0.25);
    assert_eq!(a.add(&b).unwrap().to_f64(), 1.25);
    assert_eq!(a.sub(&b).unwrap().to_f64(), 1.75);
    assert_eq!(a.mul(&b).unwrap().to_f64(), -0.375);
    assert_eq!(a.div(&b).unwrap().to_f64(), -6.0);
    assert_eq!(a.rem(&b).unwrap().to_f64(), 0.0);
    assert_eq!(a.min(&b).unwrap(), b);
    assert_eq!(a.max(&b).unwrap(), a);
    assert_eq!(a.try_cmp(&b).unwrap(), Some(Ordering::Greater));
    assert_eq!((-&a).to_f64(), -1.5);
    assert_eq!((-a.clone()).to_f64(), -1.5);
    assert_eq!(b.abs().to_f64(), 0.25);
    assert_eq!(f.from_i64(9).sqrt().to_f64(), 3.0);
    assert_eq!(a.powi(3).to_f64(), 3.375);
    assert_eq!(a.mul_2si(3).to_f64(), 12.0);
    assert!(a.parent() == &f);
}

#[test]
fn test_degenerate_values() {
    let f = f64_field();
    let zero = f.zero();
    let one = f.one();
    let inf = f.infinity();

    let x = one.div(&zero).unwrap();
    assert!(x.is_infinite() && x.sign() == 1);
    let x = (-&one).div(&zero).unwrap();
    assert!(x.is_infinite() && x.sign() == -1);
    assert!(zero.div(&zero).unwrap().is_nan());
    assert!(inf.sub(&inf).unwrap().is_nan());
    assert!(inf.mul(&zero).unwrap().is_nan());
    assert!((-&one).sqrt().is_nan());
    assert!(f.nan().add(&one).unwrap().is_nan());
    assert_eq!(f.nan().sign(), 0);
    assert_eq!(zero.sign(), 0);
    assert_eq!((-&zero).sign(), 0);
    assert!((-&zero).is_sign_negative());
    assert!(!zero.is_sign_negative());
    assert!(f.nan().try_cmp(&one).unwrap().is_none());
    assert!(f.nan() != f.nan());
    assert!(zero == -&zero);
    assert!(!zero.is_nan() && zero.is_finite() && zero.is_zero());
    assert!(!inf.is_finite());
}

#[test]
fn test_incompatible_fields() {
    let a = RealField::with_precision(53).unwrap();
    let b = RealField::with_precision(64).unwrap();
    let c = RealField::new(53, RoundingMode::Zero, false).unwrap();
    let x = a.one();
    let y = b.one();
    let z = c.one();

    for other in [&y, &z] {
        assert!(matches!(x.add(other), Err(Error::IncompatibleRings { .. })));
        assert!(matches!(x.sub(other), Err(Error::IncompatibleRings { .. })));
        assert!(matches!(x.mul(other), Err(Error::IncompatibleRings { .. })));
        assert!(matches!(x.div(other), Err(Error::IncompatibleRings { .. })));
        assert!(matches!(x.rem(other), Err(Error::IncompatibleRings { .. })));
        assert!(matches!(x.min(other), Err(Error::IncompatibleRings { .. })));
        assert!(matches!(x.try_cmp(other), Err(Error::IncompatibleRings { .. })));
        assert!(x != *other);
        assert!(x.partial_cmp(other).is_none());
    }

    let err = x.add(&y).unwrap_err();
    assert_eq!(
        err,
        Error::IncompatibleRings {
            left: *a.context(),
            right: *b.context()
        }
    );
    assert_eq!(
        err.to_string(),
        "incompatible real fields: (precision:53 rm:NearestTiesToEven) and \
         (precision:64 rm:NearestTiesToEven)"
    );

    // The scientific notation flag does not change the field.
    let sci = RealField::new(53, RoundingMode::NearestTiesToEven, true).unwrap();
    assert_eq!(x.add(&sci.one()).unwrap().to_f64(), 2.0);

    // Converting makes the numbers compatible.
    assert_eq!(x.add(&a.convert(&y)).unwrap().to_f64(), 2.0);
}

#[test]
fn test_rounding_mode_of_field() {
    let up = RealField::new(53, RoundingMode::Positive, false).unwrap();
    let down = RealField::new(53, RoundingMode::Negative, false).unwrap();
    let third_up = up.one().div(&up.from_i64(3)).unwrap();
    let third_down = down.one().div(&down.from_i64(3)).unwrap();
    assert!(third_up.to_f64() > third_down.to_f64());
    assert_eq!(third_down.next_above().to_f64(), third_up.to_f64());
}

#[test]
fn test_repeated_squaring() {
    // Squaring 1.1 ten times computes 1.1^1024, like native doubles.
    let f = f64_field();
    let mut x = f.parse("1.1").unwrap();
    let mut reference = 1.1f64;
    for _ in 0..10 {
        x = x.mul(&x).unwrap();
        reference *= reference;
    }
    assert_eq!(x.to_f64(), reference);
    assert_eq!(x.to_string().parse::<f64>().unwrap(), reference);
    assert!(x.to_string().starts_with("2.4328178969536"), "{}", x);
}

#[test]
fn test_display() {
    let f = f64_field();
    assert_eq!(f.from_f64(1.1).to_string(), "1.1000000000000001");
    assert_eq!(format!("{:.3}", f.from_f64(1.1)), "1.10");
    assert_eq!(format!("{:e}", f.from_f64(1.1)), "1.1000000000000001e0");
    assert_eq!(format!("{:.2e}", f.from_f64(1234.0)), "1.2e3");
    assert_eq!(f.from_f64(-0.0).to_string(), "-0.0000000000000000");
    assert_eq!(f.nan().to_string(), "NaN");
    assert_eq!(f.neg_infinity().to_string(), "-infinity");
    assert_eq!(f.from_f64(255.0).to_string_radix(16, None).unwrap(), "ff.0000000000000");
    assert!(f.one().to_string_radix(1, None).is_err());
    assert_eq!(f.one().default_digits(), 17);

    let sci = RealField::new(53, RoundingMode::NearestTiesToEven, true).unwrap();
    assert_eq!(sci.from_f64(1.5).to_string(), "1.5000000000000000e0");
    assert_eq!(sci.from_f64(1.5).to_string_digits(Some(2)), "1.5e0");

    let dbg = format!("{:?}", f.one());
    assert!(dbg.contains("1.0000000000000000"), "{}", dbg);
}

#[test]
fn test_round_trip_strings() {
    use RoundingMode::*;
    let modes = [
        NearestTiesToEven,
        NearestTiesToAway,
        Zero,
        Away,
        Positive,
        Negative,
    ];
    for rm in modes {
        for precision in [2, 24, 53, 64, 113, 300] {
            let f = RealField::new(precision, rm, false).unwrap();
            for (num, den) in [(-2, 7), (1, 3), (2, 3), (-1, 10), (355, 113)] {
                let x = f.from_rational(num, den);
                let y = f.parse(&x.to_string()).unwrap();
                assert_eq!(x, y, "{} with {}", x, rm);
                let s = x.to_string_digits(Some(x.default_digits() + 1));
                assert_eq!(f.parse(&s).unwrap(), x);
            }
        }
    }
}

#[test]
fn test_round_trip_directed() {
    // 1/3 toward zero is 0.333333333333333314829... The nearest 17 digits
    // are below the number, and parsing them toward zero gives the number
    // below, so the digits are rounded up.
    let f = RealField::new(53, RoundingMode::Zero, false).unwrap();
    let x = f.from_rational(1, 3);
    let text = x.to_string();
    assert_eq!(text, "0.33333333333333332");
    assert_eq!(f.parse(&text).unwrap(), x);

    let f = RealField::new(53, RoundingMode::Positive, false).unwrap();
    let x = f.from_rational(-1, 3);
    assert_eq!(f.parse(&x.to_string()).unwrap(), x);
    let f = f.with_rounding_mode(RoundingMode::Negative);
    let x = f.from_rational(-1, 3);
    assert_eq!(f.parse(&x.to_string()).unwrap(), x);
}

#[test]
fn test_round_trip_extreme_exponents() {
    use RoundingMode::*;
    for rm in [NearestTiesToEven, Zero, Away, Positive, Negative] {
        let f = RealField::new(53, rm, false).unwrap();
        for x in [f.max_value(), f.min_positive(), -f.max_value()] {
            let text = x.to_string();
            assert_eq!(f.parse(&text).unwrap(), x, "{} with {}", text, rm);
            let text = x.to_string_radix(3, None).unwrap();
            assert_eq!(f.from_str_radix(&text, 3).unwrap(), x);
        }
    }

    let f = RealField::default();
    let big = f.parse("1e300000000").unwrap();
    assert!(big.is_finite());
    assert_eq!(f.parse(&big.to_string()).unwrap(), big);
    let small = f.parse("1e-300000000").unwrap();
    assert!(small.is_finite() && !small.is_zero());
    assert_eq!(f.parse(&small.to_string()).unwrap(), small);
    assert!(f.parse("1e400000000").unwrap().is_infinite());
    assert!(f.parse("1e-400000000").unwrap().is_zero());
    let x = f.parse("7e-300000000").unwrap();
    let text = x.to_string();
    assert!(text.ends_with("e-300000000"), "{}", text);
    assert_eq!(f.parse(&text).unwrap(), x);
    assert_eq!(x.to_string_digits(Some(3)), "7.00e-300000000");
}

#[test]
fn test_underflow_tie_is_decided_before_rounding() {
    // The exact product is a hair above half of the smallest number, but it
    // rounds to exactly the half at this precision.
    let f = RealField::default();
    let x = f.min_positive().next_above();
    let y = f.parse("0.5").unwrap().next_below();
    assert_eq!(x.mul(&y).unwrap(), f.min_positive());

    let half = f.min_positive().mul(&f.parse("0.5").unwrap()).unwrap();
    assert!(half.is_zero());
    let f = f.with_rounding_mode(RoundingMode::NearestTiesToAway);
    let half = f.min_positive().mul(&f.parse("0.5").unwrap()).unwrap();
    assert_eq!(half, f.min_positive());
}

#[test]
fn test_integral_rounding() {
    let f = f64_field();
    let check = |v: f64| {
        let x = f.from_f64(v);
        assert_eq!(x.trunc().to_f64(), v.trunc());
        assert_eq!(x.floor().to_f64(), v.floor());
        assert_eq!(x.ceil().to_f64(), v.ceil());
        assert_eq!(x.round().to_f64(), v.round());
    };
    for v in [0.5, -0.5, 1.5, 2.5, -2.5, 7.0, 1e20, -3.7, 0.2, 123.456] {
        check(v);
    }
    assert_eq!(f.from_f64(-2.5).to_i64(RoundingMode::NearestTiesToEven), -2);
    assert_eq!(
        f.from_f64(2.5).to_integer(RoundingMode::Away),
        Some(BigInt::from(3))
    );
    let (num, den) = f.from_f64(-0.375).exact_rational().unwrap();
    assert_eq!((num, den), (BigInt::from(-3), BigInt::from(8)));
    assert_eq!(f.from_f64(1.0).exponent(), Some(1));
    assert_eq!(f.zero().exponent(), None);
    assert_eq!(f.from_f64(1.0).ulp().to_f64(), f64::EPSILON);
    let (p, q) = f.from_rational(-11, 4).as_fraction(3);
    assert_eq!((p, q), (BigUint::from(11u32), BigUint::from(4u32)));
}
