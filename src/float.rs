//! This module contains the raw multi-precision storage of a real number,
//! and the rounding logic that every operation funnels through.

use crate::context::{RoundingMode, MAX_EXPONENT, MIN_EXPONENT};
use core::cmp::Ordering;
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Reports the kind of values that are lost when we shift right bits. In some
/// context this used as the two guard bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LossFraction {
    ExactlyZero,  //0000000
    LessThanHalf, //0xxxxxx
    ExactlyHalf,  //1000000
    MoreThanHalf, //1xxxxxx
}

impl LossFraction {
    pub fn is_exactly_zero(&self) -> bool {
        matches!(self, Self::ExactlyZero)
    }
    pub fn is_exactly_half(&self) -> bool {
        matches!(self, Self::ExactlyHalf)
    }
    pub fn is_mt_half(&self) -> bool {
        matches!(self, Self::MoreThanHalf)
    }
    pub fn is_gte_half(&self) -> bool {
        self.is_mt_half() || self.is_exactly_half()
    }

    /// Classify the remainder `rem` of a division by `divisor`.
    pub fn from_remainder(rem: &BigUint, divisor: &BigUint) -> Self {
        if rem.is_zero() {
            return LossFraction::ExactlyZero;
        }
        let rem_2x: BigUint = rem << 1usize;
        match rem_2x.cmp(divisor) {
            Ordering::Less => LossFraction::LessThanHalf,
            Ordering::Equal => LossFraction::ExactlyHalf,
            Ordering::Greater => LossFraction::MoreThanHalf,
        }
    }
}

/// Returns the fractional part that's lost during truncation of the lowest
/// `bit` bits of `val`.
pub(crate) fn loss_kind_for_bit(val: &BigUint, bit: u64) -> LossFraction {
    if bit == 0 {
        return LossFraction::ExactlyZero;
    }
    let tz = match val.trailing_zeros() {
        Some(tz) => tz,
        None => return LossFraction::ExactlyZero,
    };
    if tz >= bit {
        return LossFraction::ExactlyZero;
    }
    if !val.bit(bit - 1) {
        return LossFraction::LessThanHalf;
    }
    if tz == bit - 1 {
        LossFraction::ExactlyHalf
    } else {
        LossFraction::MoreThanHalf
    }
}

/// Shift `val` by `bits`, and report the loss.
pub(crate) fn shift_right_with_loss(
    val: &BigUint,
    bits: u64,
) -> (BigUint, LossFraction) {
    let loss = loss_kind_for_bit(val, bits);
    (val >> bits as usize, loss)
}

/// Combine the loss of accuracy with `msb` more significant and `lsb`
/// less significant.
pub(crate) fn combine_loss_fraction(
    msb: LossFraction,
    lsb: LossFraction,
) -> LossFraction {
    if !lsb.is_exactly_zero() {
        if msb.is_exactly_zero() {
            return LossFraction::LessThanHalf;
        } else if msb.is_exactly_half() {
            return LossFraction::MoreThanHalf;
        }
    }
    msb
}

#[test]
fn shift_right_fraction() {
    let x = BigUint::from(0b10000000u64);
    let res = shift_right_with_loss(&x, 3);
    assert!(res.1.is_exactly_zero());

    let x = BigUint::from(0b10000111u64);
    let res = shift_right_with_loss(&x, 3);
    assert!(res.1.is_mt_half());
    assert_eq!(res.0, BigUint::from(0b10000u64));

    let x = BigUint::from(0b10000100u64);
    let res = shift_right_with_loss(&x, 3);
    assert!(res.1.is_exactly_half());

    let x = BigUint::from(0b10000001u64);
    let res = shift_right_with_loss(&x, 3);
    assert_eq!(res.1, LossFraction::LessThanHalf);

    // Shifting past the top of the number.
    let x = BigUint::from(0b1u64);
    assert_eq!(shift_right_with_loss(&x, 1).1, LossFraction::ExactlyHalf);
    assert_eq!(shift_right_with_loss(&x, 9).1, LossFraction::LessThanHalf);
}

#[test]
fn test_combine_loss() {
    use LossFraction::*;
    assert_eq!(combine_loss_fraction(ExactlyZero, LessThanHalf), LessThanHalf);
    assert_eq!(combine_loss_fraction(ExactlyHalf, LessThanHalf), MoreThanHalf);
    assert_eq!(combine_loss_fraction(ExactlyHalf, ExactlyZero), ExactlyHalf);
    assert_eq!(combine_loss_fraction(LessThanHalf, MoreThanHalf), LessThanHalf);
}

/// Returns true if a truncated magnitude with the lowest bit `odd`, and the
/// fraction `loss` below it, needs to be incremented by one unit.
pub(crate) fn round_away(
    rm: RoundingMode,
    sign: bool,
    odd: bool,
    loss: LossFraction,
) -> bool {
    if loss.is_exactly_zero() {
        return false;
    }
    match rm {
        RoundingMode::Positive => !sign,
        RoundingMode::Negative => sign,
        RoundingMode::Zero => false,
        RoundingMode::Away => true,
        RoundingMode::NearestTiesToAway => loss.is_gte_half(),
        RoundingMode::NearestTiesToEven => {
            loss.is_mt_half() || (loss.is_exactly_half() && odd)
        }
    }
}

/// Declare the different categories of the floating point number. These
/// categories are internal to the float, and can be access by the acessors:
/// is_inf, is_zero, is_nan, is_normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Category {
    Infinity,
    NaN,
    Normal,
    Zero,
}

/// The raw storage of a real number: a sign, an exponent and a significand
/// of exactly `precision` bits. The value of a normal number is
/// 0.1mmmm * 2^exp, which is `mantissa * 2^(exp - precision)`, where the
/// top bit of the mantissa is always set.
///
/// Between an operation and the call to `normalize` the mantissa may have
/// any width; the formula above still defines the value.
#[derive(Debug, Clone)]
pub(crate) struct Float {
    // The number of bits in the significand.
    precision: usize,
    // The Sign bit.
    sign: bool,
    // The Exponent.
    exp: i64,
    // The significand, aligned to the right.
    mantissa: BigUint,
    // The kind of number this float represents.
    category: Category,
}

impl Float {
    /// Create a new normal number, that is not normalized yet. The caller
    /// needs to call `normalize` to round it to the precision.
    pub fn new(precision: usize, sign: bool, exp: i64, mantissa: BigUint) -> Self {
        if mantissa.is_zero() {
            return Float::zero(precision, sign);
        }
        Float {
            precision,
            sign,
            exp,
            mantissa,
            category: Category::Normal,
        }
    }

    /// Create a number from the exact value `sign * m * 2^e`, plus the
    /// fraction `loss` below the lowest bit of `m`, rounded to `precision`
    /// bits with the rounding mode `rm`.
    pub fn from_exact(
        precision: usize,
        rm: RoundingMode,
        sign: bool,
        m: BigUint,
        e: i64,
        loss: LossFraction,
    ) -> Self {
        let mut x = Self::new(precision, sign, e.saturating_add(precision as i64), m);
        x.normalize(rm, loss);
        x
    }

    /// Returns a new zero float.
    pub fn zero(precision: usize, sign: bool) -> Self {
        Float {
            precision,
            sign,
            exp: 0,
            mantissa: BigUint::zero(),
            category: Category::Zero,
        }
    }

    /// Returns a new float with the value one.
    pub fn one(precision: usize, sign: bool) -> Self {
        Float {
            precision,
            sign,
            exp: 1,
            mantissa: BigUint::one() << (precision - 1),
            category: Category::Normal,
        }
    }

    /// Returns a new infinity float.
    pub fn inf(precision: usize, sign: bool) -> Self {
        Float {
            precision,
            sign,
            exp: 0,
            mantissa: BigUint::zero(),
            category: Category::Infinity,
        }
    }

    /// Returns a new NaN float.
    pub fn nan(precision: usize, sign: bool) -> Self {
        Float {
            precision,
            sign,
            exp: 0,
            mantissa: BigUint::zero(),
            category: Category::NaN,
        }
    }

    /// Returns the largest finite number.
    pub fn largest(precision: usize, sign: bool) -> Self {
        let m = (BigUint::one() << precision) - BigUint::one();
        Self::raw(precision, sign, MAX_EXPONENT, m, Category::Normal)
    }

    /// Returns the smallest positive number (0.1 * 2^MIN_EXPONENT).
    pub fn smallest(precision: usize, sign: bool) -> Self {
        let m = BigUint::one() << (precision - 1);
        Self::raw(precision, sign, MIN_EXPONENT, m, Category::Normal)
    }

    pub(crate) fn raw(
        precision: usize,
        sign: bool,
        exp: i64,
        mantissa: BigUint,
        category: Category,
    ) -> Self {
        Float {
            precision,
            sign,
            exp,
            mantissa,
            category,
        }
    }

    /// Returns true if the Float is negative
    pub fn is_negative(&self) -> bool {
        self.sign
    }

    /// Returns true if the Float is +-inf.
    pub fn is_inf(&self) -> bool {
        self.category == Category::Infinity
    }

    /// Returns true if the Float is a +- NaN.
    pub fn is_nan(&self) -> bool {
        self.category == Category::NaN
    }

    /// Returns true if the Float is a +- zero.
    pub fn is_zero(&self) -> bool {
        self.category == Category::Zero
    }

    /// Returns true if this number is normal (not Zero, Nan, Inf).
    pub fn is_normal(&self) -> bool {
        self.category == Category::Normal
    }

    pub fn get_precision(&self) -> usize {
        self.precision
    }

    /// Update the sign of the float to `sign`. True means negative.
    pub fn set_sign(&mut self, sign: bool) {
        self.sign = sign
    }

    /// Returns the sign of the float. True means negative.
    pub fn get_sign(&self) -> bool {
        self.sign
    }

    /// Returns the mantissa of the float.
    pub fn get_mantissa(&self) -> &BigUint {
        &self.mantissa
    }

    /// Returns the exponent of the float.
    pub fn get_exp(&self) -> i64 {
        self.exp
    }

    /// Returns the exponent of the lowest bit of the mantissa.
    pub fn get_lsb_exp(&self) -> i64 {
        self.exp - self.precision as i64
    }

    /// Returns the category of the float.
    pub fn get_category(&self) -> Category {
        self.category
    }

    /// Returns a new float which has a flipped sign (negated value).
    pub fn neg(&self) -> Self {
        let mut x = self.clone();
        x.sign = !x.sign;
        x
    }

    /// Returns the absolute value of this float.
    pub fn abs(&self) -> Self {
        let mut x = self.clone();
        x.sign = false;
        x
    }
}

impl Float {
    /// The number overflowed, set the right value based on the rounding mode
    /// and sign.
    fn overflow(&mut self, rm: RoundingMode) {
        let inf = Self::inf(self.precision, self.sign);
        let max = Self::largest(self.precision, self.sign);

        *self = match rm {
            RoundingMode::NearestTiesToEven => inf,
            RoundingMode::NearestTiesToAway => inf,
            RoundingMode::Away => inf,
            RoundingMode::Zero => max,
            RoundingMode::Positive => {
                if self.sign {
                    max
                } else {
                    inf
                }
            }
            RoundingMode::Negative => {
                if self.sign {
                    inf
                } else {
                    max
                }
            }
        }
    }

    /// The number is below the smallest representable number. Flush to zero
    /// or to the smallest number, based on the rounding mode and sign.
    /// `half_cmp` compares the exact value, before rounding to the precision,
    /// with half of the smallest number.
    fn underflow(&mut self, rm: RoundingMode, half_cmp: Ordering) {
        let zero = Self::zero(self.precision, self.sign);
        let min = Self::smallest(self.precision, self.sign);

        *self = match rm {
            RoundingMode::NearestTiesToEven => {
                if half_cmp == Ordering::Greater {
                    min
                } else {
                    zero
                }
            }
            RoundingMode::NearestTiesToAway => {
                if half_cmp == Ordering::Less {
                    zero
                } else {
                    min
                }
            }
            RoundingMode::Zero => zero,
            RoundingMode::Away => min,
            RoundingMode::Positive => {
                if self.sign {
                    zero
                } else {
                    min
                }
            }
            RoundingMode::Negative => {
                if self.sign {
                    min
                } else {
                    zero
                }
            }
        }
    }

    /// Verify that the exponent is legal.
    pub(crate) fn check_bounds(&self) {
        if !self.is_normal() {
            return;
        }
        debug_assert!(self.exp >= MIN_EXPONENT);
        debug_assert!(self.exp <= MAX_EXPONENT);
        debug_assert_eq!(self.mantissa.bits(), self.precision as u64);
    }

    /// Returns true if we need to round away from zero (increment the mantissa).
    pub(crate) fn need_round_away_from_zero(
        &self,
        rm: RoundingMode,
        loss: LossFraction,
    ) -> bool {
        debug_assert!(self.is_normal() || self.is_zero());
        round_away(rm, self.sign, self.mantissa.bit(0), loss)
    }

    /// Normalize the number by shifting the mantissa to exactly `precision`
    /// bits, rounding if bits are lost, and clamping the exponent to the
    /// legal range. `loss` is the fraction that was already lost below the
    /// lowest bit of the mantissa. This is based on Neil Booth'
    /// implementation in APFloat.
    pub(crate) fn normalize(&mut self, rm: RoundingMode, loss: LossFraction) {
        if !self.is_normal() {
            return;
        }
        if self.mantissa.is_zero() {
            debug_assert!(loss.is_exactly_zero(), "losing information");
            *self = Self::zero(self.precision, self.sign);
            return;
        }

        let mut loss = loss;
        let precision = self.precision as u64;
        let bits = self.mantissa.bits();

        // Step I - align the mantissa to the precision.
        match bits.cmp(&precision) {
            Ordering::Greater => {
                let (m, loss2) =
                    shift_right_with_loss(&self.mantissa, bits - precision);
                self.mantissa = m;
                loss = combine_loss_fraction(loss2, loss);
            }
            Ordering::Less => {
                debug_assert!(loss.is_exactly_zero(), "losing information");
                self.mantissa <<= (precision - bits) as usize;
            }
            Ordering::Equal => {}
        }
        // The exponent tracks the value, not the width of the mantissa.
        self.exp = self.exp.saturating_add(bits as i64 - precision as i64);

        // Compare the exact value with half of the smallest number,
        // 0.1 * 2^(MIN_EXPONENT - 1), before rounding changes it.
        let half_cmp = match self.exp.cmp(&(MIN_EXPONENT - 1)) {
            Ordering::Equal => {
                let is_pow2 = self.mantissa.trailing_zeros() == Some(precision - 1);
                if is_pow2 && loss.is_exactly_zero() {
                    Ordering::Equal
                } else {
                    Ordering::Greater
                }
            }
            ord => ord,
        };

        // Step II - round the number.
        if self.need_round_away_from_zero(rm, loss) {
            self.mantissa += 1u32;
            // Did the mantissa overflow?
            if self.mantissa.bits() > precision {
                self.mantissa >>= 1usize;
                self.exp = self.exp.saturating_add(1);
            }
        }

        // Step III - check the exponent range.
        if self.exp > MAX_EXPONENT {
            self.overflow(rm);
        } else if self.exp < MIN_EXPONENT {
            self.underflow(rm, half_cmp);
        }
        self.check_bounds();
    }
}

#[test]
fn test_normalize_rounding() {
    use num_traits::ToPrimitive;
    use RoundingMode::*;
    // 0b1011 rounded to 3 bits with different rounding modes. The lost bit
    // is exactly half.
    let round = |m: u64, rm: RoundingMode, sign: bool| -> (u64, i64) {
        let x = Float::from_exact(
            3,
            rm,
            sign,
            BigUint::from(m),
            0,
            LossFraction::ExactlyZero,
        );
        (x.get_mantissa().to_u64().unwrap(), x.get_exp())
    };
    assert_eq!(round(0b1011, NearestTiesToEven, false), (0b110, 4));
    assert_eq!(round(0b1001, NearestTiesToEven, false), (0b100, 4));
    assert_eq!(round(0b1001, NearestTiesToAway, false), (0b101, 4));
    assert_eq!(round(0b1011, Zero, false), (0b101, 4));
    assert_eq!(round(0b1011, Away, false), (0b110, 4));
    assert_eq!(round(0b1011, Positive, false), (0b110, 4));
    assert_eq!(round(0b1011, Positive, true), (0b101, 4));
    assert_eq!(round(0b1011, Negative, true), (0b110, 4));
    // Rounding up overflows the mantissa and bumps the exponent.
    assert_eq!(round(0b1111, NearestTiesToEven, false), (0b100, 5));
    // Small numbers are shifted up.
    assert_eq!(round(0b1, Zero, false), (0b100, 1));
}

#[test]
fn test_overflow_underflow() {
    use RoundingMode::*;
    let big = |rm| {
        let m = BigUint::from(3u64);
        Float::from_exact(8, rm, false, m, MAX_EXPONENT, LossFraction::ExactlyZero)
    };
    assert!(big(NearestTiesToEven).is_inf());
    assert!(big(Positive).is_inf());
    assert!(big(Zero).is_normal());
    assert_eq!(big(Zero).get_exp(), MAX_EXPONENT);

    let tiny = |rm, sign| {
        let m = BigUint::from(3u64);
        Float::from_exact(8, rm, sign, m, MIN_EXPONENT * 2, LossFraction::ExactlyZero)
    };
    assert!(tiny(NearestTiesToEven, false).is_zero());
    assert!(tiny(Away, false).is_normal());
    assert!(tiny(Positive, false).is_normal());
    assert!(tiny(Positive, true).is_zero());
    assert!(tiny(Positive, true).is_negative());
    assert_eq!(tiny(Away, true).get_exp(), MIN_EXPONENT);
}

#[test]
fn test_underflow_ties() {
    use RoundingMode::*;
    // Returns m * 2^e rounded to 3 bits.
    let round = |m: u64, e: i64, rm| {
        let m = BigUint::from(m);
        Float::from_exact(3, rm, false, m, e, LossFraction::ExactlyZero)
    };
    let smallest = Float::smallest(3, false);

    // Exactly half of the smallest number.
    let half = MIN_EXPONENT - 2;
    assert!(round(1, half, NearestTiesToEven).is_zero());
    assert_eq!(round(1, half, NearestTiesToAway), smallest);

    // 0.10001 * 2^(MIN-1) is above the half, even though it rounds down to
    // the half at this precision.
    for rm in [NearestTiesToEven, NearestTiesToAway] {
        assert_eq!(round(0b10001, MIN_EXPONENT - 6, rm), smallest);
    }

    // 0.11111 * 2^(MIN-2) is below the half, even though it rounds up to
    // the half at this precision.
    for rm in [NearestTiesToEven, NearestTiesToAway] {
        assert!(round(0b11111, MIN_EXPONENT - 7, rm).is_zero());
    }

    // A sticky loss below the lowest bit of an exact half.
    let x = Float::from_exact(
        3,
        NearestTiesToEven,
        false,
        BigUint::from(0b100u64),
        MIN_EXPONENT - 4,
        LossFraction::LessThanHalf,
    );
    assert_eq!(x, smallest);
}

impl PartialEq for Float {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

/// Page 66. Chapter 3. Floating-Point Formats and Environment
/// Table 3.8: Comparison predicates and the four relations.
impl PartialOrd for Float {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let bool_to_ord = |ord: bool| -> Option<Ordering> {
            if ord {
                Some(Ordering::Less)
            } else {
                Some(Ordering::Greater)
            }
        };

        match (self.category, other.category) {
            (Category::NaN, _) | (_, Category::NaN) => None,
            (Category::Zero, Category::Zero) => Some(Ordering::Equal),
            (Category::Infinity, Category::Infinity) => {
                if self.sign == other.sign {
                    Some(Ordering::Equal)
                } else {
                    bool_to_ord(self.sign)
                }
            }
            (Category::Infinity, Category::Normal)
            | (Category::Infinity, Category::Zero)
            | (Category::Normal, Category::Zero) => bool_to_ord(self.sign),

            (Category::Normal, Category::Infinity)
            | (Category::Zero, Category::Infinity)
            | (Category::Zero, Category::Normal) => bool_to_ord(!other.sign),

            (Category::Normal, Category::Normal) => {
                if self.sign != other.sign {
                    return bool_to_ord(self.sign);
                }
                let magnitude = match self.exp.cmp(&other.exp) {
                    Ordering::Equal => {
                        // Align the two mantissas before comparing them.
                        let a = &self.mantissa << other.precision;
                        let b = &other.mantissa << self.precision;
                        a.cmp(&b)
                    }
                    ord => ord,
                };
                if self.sign {
                    Some(magnitude.reverse())
                } else {
                    Some(magnitude)
                }
            }
        }
    }
}

#[test]
fn test_comparisons() {
    use super::utils;

    // Compare a bunch of special values, using the <,>,== operators and check
    // that they match the comparison on doubles.
    for first in utils::get_special_test_values() {
        for second in utils::get_special_test_values() {
            let is_less = first < second;
            let is_eq = first == second;
            let is_gt = first > second;
            let rm = RoundingMode::NearestTiesToEven;
            let first = Float::from_f64(53, rm, first);
            let second = Float::from_f64(53, rm, second);
            assert_eq!(is_less, first < second, "<");
            assert_eq!(is_eq, first == second, "==");
            assert_eq!(is_gt, first > second, ">");
        }
    }
}

#[test]
fn test_one_imm() {
    let rm = RoundingMode::NearestTiesToEven;
    let x = Float::one(12, false);
    assert_eq!(x.to_f64(rm), 1.0);
    assert_eq!(Float::one(2, true).to_f64(rm), -1.0);
}
