//! This module contains the real field: a shared handle to a precision and
//! rounding context, and the factory of every real number.

use crate::context::{Context, RoundingMode};
use crate::error::Result;
use crate::float::Float;
use crate::number::RealNumber;
use core::fmt::Display;
use core::hash::{Hash, Hasher};
use num_bigint::BigInt;
use std::sync::Arc;

/// A field of real numbers with a fixed precision and rounding mode. This is
/// a cheap handle to a shared `Context`: cloning the field, or creating
/// numbers in it, shares the same context. Two fields are the same field if
/// they have the same precision and rounding mode.
#[derive(Debug, Clone)]
pub struct RealField {
    ctx: Arc<Context>,
}

impl RealField {
    /// Create a new field. Fails if the precision is out of range.
    pub fn new(
        precision: usize,
        rm: RoundingMode,
        scientific: bool,
    ) -> Result<Self> {
        let ctx = Context::new(precision, rm, scientific)?;
        tracing::debug!(precision, rm = %rm, "created a real field");
        Ok(Self::from_context(ctx))
    }

    /// Create a field with the precision `precision` and the default
    /// rounding mode.
    pub fn with_precision(precision: usize) -> Result<Self> {
        Self::new(precision, RoundingMode::default(), false)
    }

    /// Create a field from a validated context.
    pub fn from_context(ctx: Context) -> Self {
        RealField { ctx: Arc::new(ctx) }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn precision(&self) -> usize {
        self.ctx.get_precision()
    }

    pub fn rounding_mode(&self) -> RoundingMode {
        self.ctx.get_rounding_mode()
    }

    pub fn scientific_notation(&self) -> bool {
        self.ctx.scientific_notation()
    }

    /// Returns true if numbers of the two fields can be mixed in arithmetic.
    pub fn is_compatible(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ctx, &other.ctx) || *self.ctx == *other.ctx
    }

    /// Returns a field with the same rounding mode and a new precision.
    pub fn to_precision(&self, precision: usize) -> Result<Self> {
        Self::new(precision, self.rounding_mode(), self.scientific_notation())
    }

    /// Returns a field with the same precision and a new rounding mode.
    pub fn with_rounding_mode(&self, rm: RoundingMode) -> Self {
        Self::from_context(self.ctx.with_rounding_mode(rm))
    }

    /// Wrap raw storage, rounded to the precision of this field.
    pub(crate) fn make(&self, raw: Float) -> RealNumber {
        RealNumber::new(self.clone(), raw)
    }

    pub fn zero(&self) -> RealNumber {
        self.make(Float::zero(self.precision(), false))
    }

    pub fn one(&self) -> RealNumber {
        self.make(Float::one(self.precision(), false))
    }

    pub fn nan(&self) -> RealNumber {
        self.make(Float::nan(self.precision(), false))
    }

    pub fn infinity(&self) -> RealNumber {
        self.make(Float::inf(self.precision(), false))
    }

    pub fn neg_infinity(&self) -> RealNumber {
        self.make(Float::inf(self.precision(), true))
    }

    /// Returns the difference between one and the next larger number:
    /// 2^(1-precision).
    pub fn epsilon(&self) -> RealNumber {
        self.make(Float::one(self.precision(), false).ulp(self.rounding_mode()))
    }

    /// Returns the largest finite number.
    pub fn max_value(&self) -> RealNumber {
        self.make(Float::largest(self.precision(), false))
    }

    /// Returns the smallest positive number.
    pub fn min_positive(&self) -> RealNumber {
        self.make(Float::smallest(self.precision(), false))
    }

    pub fn from_i64(&self, val: i64) -> RealNumber {
        self.make(Float::from_i64(self.precision(), self.rounding_mode(), val))
    }

    pub fn from_u64(&self, val: u64) -> RealNumber {
        self.make(Float::from_u64(self.precision(), self.rounding_mode(), val))
    }

    pub fn from_bigint(&self, val: &BigInt) -> RealNumber {
        let rm = self.rounding_mode();
        self.make(Float::from_bigint(self.precision(), rm, val))
    }

    /// Returns the rounded value of the rational number `num/den`. A zero
    /// denominator produces a signed infinity, or NaN for 0/0.
    pub fn from_rational(&self, num: i64, den: i64) -> RealNumber {
        self.from_big_rational(&BigInt::from(num), &BigInt::from(den))
    }

    pub fn from_big_rational(&self, num: &BigInt, den: &BigInt) -> RealNumber {
        let rm = self.rounding_mode();
        self.make(Float::from_rational(self.precision(), rm, num, den))
    }

    /// Returns the rounded value of the double `val`.
    pub fn from_f64(&self, val: f64) -> RealNumber {
        let rm = self.rounding_mode();
        self.make(Float::from_f64(self.precision(), rm, val))
    }

    /// Convert a number from any field into this field, rounding the exact
    /// value with the rounding mode of this field.
    pub fn convert(&self, val: &RealNumber) -> RealNumber {
        let rm = self.rounding_mode();
        self.make(val.raw().cast_with_rm(self.precision(), rm))
    }

    /// Parse a decimal number. See `from_str_radix`.
    pub fn parse(&self, text: &str) -> Result<RealNumber> {
        self.from_str_radix(text, 10)
    }

    /// Parse a number in the radix `radix` (2 to 36, or 0 to detect the
    /// radix from a 0x or 0b prefix). The exact value of the string is
    /// rounded with the rounding mode of this field.
    pub fn from_str_radix(&self, text: &str, radix: u32) -> Result<RealNumber> {
        let rm = self.rounding_mode();
        let raw = Float::parse_radix(self.precision(), rm, text, radix)?;
        Ok(self.make(raw))
    }
}

impl Default for RealField {
    fn default() -> Self {
        Self::from_context(Context::default())
    }
}

impl PartialEq for RealField {
    fn eq(&self, other: &Self) -> bool {
        self.is_compatible(other)
    }
}

impl Eq for RealField {}

impl Hash for RealField {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ctx.hash(state);
    }
}

impl Display for RealField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Real Field with {} bits of precision", self.precision())?;
        if self.rounding_mode() != RoundingMode::NearestTiesToEven {
            write!(f, " and rounding {}", self.rounding_mode())?;
        }
        Ok(())
    }
}

#[test]
fn test_field_identity() {
    use std::collections::HashSet;

    let a = RealField::new(64, RoundingMode::Zero, false).unwrap();
    let b = RealField::new(64, RoundingMode::Zero, true).unwrap();
    let c = RealField::new(64, RoundingMode::Positive, false).unwrap();
    let d = RealField::with_precision(65).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, a.clone());
    assert_ne!(a, c);
    assert_ne!(a, d);
    assert!(a.is_compatible(&b));

    let set: HashSet<RealField> = [a.clone(), b, c.clone(), a.clone()].into_iter().collect();
    assert_eq!(set.len(), 2);

    assert_eq!(a.to_precision(65).unwrap().with_rounding_mode(RoundingMode::NearestTiesToEven), d);
    assert_eq!(a.with_rounding_mode(RoundingMode::Positive), c);
    assert!(a.to_precision(1).is_err());
}

#[test]
fn test_field_display() {
    let f = RealField::default();
    assert_eq!(f.to_string(), "Real Field with 53 bits of precision");
    let f = RealField::new(100, RoundingMode::Zero, false).unwrap();
    assert_eq!(
        f.to_string(),
        "Real Field with 100 bits of precision and rounding Zero"
    );
}

#[test]
fn test_field_constants() {
    let f = RealField::default();
    assert_eq!(f.zero().to_f64(), 0.0);
    assert_eq!(f.one().to_f64(), 1.0);
    assert!(f.nan().is_nan());
    assert_eq!(f.infinity().to_f64(), f64::INFINITY);
    assert_eq!(f.neg_infinity().to_f64(), f64::NEG_INFINITY);
    assert_eq!(f.epsilon().to_f64(), f64::EPSILON);
    assert!(f.max_value().is_finite());
    assert!(f.max_value().next_above().is_infinite());
    assert!(f.min_positive().next_below().is_zero());
    assert_eq!(f.from_rational(1, 4).to_f64(), 0.25);
    assert_eq!(f.from_rational(-1, 0).to_f64(), f64::NEG_INFINITY);
    assert!(f.from_rational(0, 0).is_nan());
    assert_eq!(f.from_u64(7).to_f64(), 7.0);
    assert_eq!(f.from_i64(-7).to_f64(), -7.0);
    assert_eq!(f.from_bigint(&BigInt::from(1u64 << 60)).to_f64(), (1u64 << 60) as f64);
}

#[test]
fn test_field_convert() {
    let wide = RealField::with_precision(200).unwrap();
    let narrow = RealField::new(10, RoundingMode::Zero, false).unwrap();
    let third = wide.from_rational(1, 3);
    let x = narrow.convert(&third);
    assert_eq!(x.parent(), &narrow);
    assert_eq!(x.precision(), 10);
    // 1/3 truncated to 10 bits: 0.0101010101 (binary).
    assert_eq!(x.to_f64(), 341.0 / 1024.0);
    let back = wide.convert(&x);
    assert_eq!(back.to_f64(), 341.0 / 1024.0);
}

#[test]
fn test_field_parse() {
    let f = RealField::default();
    assert_eq!(f.parse("1.5").unwrap().to_f64(), 1.5);
    assert_eq!(f.from_str_radix("0x10", 0).unwrap().to_f64(), 16.0);
    assert!(f.parse("1.5.").is_err());
    assert!(f.from_str_radix("10", 99).is_err());
}
