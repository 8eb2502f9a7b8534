//! This module contains the conversions between floats and native numbers,
//! big integers and rationals, and the rounding to integral values.

use crate::context::RoundingMode;
use crate::float::{round_away, shift_right_with_loss, Category, Float, LossFraction};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, ToPrimitive, Zero};

/// The layout of the IEEE double.
const F64_MANTISSA: u64 = 52;
const F64_EXPONENT_MASK: u64 = 0x7ff;
/// The exponent (0.1xxx * 2^E convention) of the largest finite double.
const F64_MAX_EXP: i64 = 1024;
/// The exponent of the lowest bit of the smallest denormal.
const F64_MIN_LSB: i64 = -1074;

/// Round the exact value `m * 2^e` to a multiple of `2^target` with the
/// rounding mode `rm`, and return the multiplier.
pub(crate) fn round_at_bit(
    m: &BigUint,
    e: i64,
    target: i64,
    sign: bool,
    rm: RoundingMode,
) -> BigUint {
    if e >= target {
        return m << (e - target) as usize;
    }
    let (mut q, loss) = shift_right_with_loss(m, (target - e) as u64);
    if round_away(rm, sign, q.bit(0), loss) {
        q += 1u32;
    }
    q
}

/// Returns `x * 2^e`. The result must be representable; the scaling is done
/// in steps that keep the intermediate values in the normal range.
fn scale_f64(mut x: f64, mut e: i64) -> f64 {
    let pow2 = |e: i64| f64::from_bits(((e + 1023) as u64) << F64_MANTISSA);
    while e > 1000 {
        x *= pow2(1000);
        e -= 1000;
    }
    while e < -1000 {
        x *= pow2(-1000);
        e += 1000;
    }
    x * pow2(e)
}

/// Returns the double that an overflowing value of sign `sign` rounds to.
fn f64_overflow(rm: RoundingMode, sign: bool) -> f64 {
    let to_inf = match rm {
        RoundingMode::NearestTiesToEven
        | RoundingMode::NearestTiesToAway
        | RoundingMode::Away => true,
        RoundingMode::Zero => false,
        RoundingMode::Positive => !sign,
        RoundingMode::Negative => sign,
    };
    let val = if to_inf { f64::INFINITY } else { f64::MAX };
    if sign {
        -val
    } else {
        val
    }
}

impl Float {
    /// Load the integer `val` into the float. Notice that the number may be
    /// rounded if it does not fit in the precision.
    pub fn from_u64(precision: usize, rm: RoundingMode, val: u64) -> Self {
        let m = BigUint::from(val);
        Self::from_exact(precision, rm, false, m, 0, LossFraction::ExactlyZero)
    }

    /// Load the integer `val` into the float.
    pub fn from_i64(precision: usize, rm: RoundingMode, val: i64) -> Self {
        let m = BigUint::from(val.unsigned_abs());
        Self::from_exact(precision, rm, val < 0, m, 0, LossFraction::ExactlyZero)
    }

    /// Load the big integer `val` into the float.
    pub fn from_bigint(precision: usize, rm: RoundingMode, val: &BigInt) -> Self {
        let sign = val.sign() == Sign::Minus;
        let m = val.magnitude().clone();
        Self::from_exact(precision, rm, sign, m, 0, LossFraction::ExactlyZero)
    }

    /// Load the rational number `num/den`. A zero denominator produces
    /// +-Inf, or NaN for 0/0.
    pub fn from_rational(
        precision: usize,
        rm: RoundingMode,
        num: &BigInt,
        den: &BigInt,
    ) -> Self {
        if den.is_zero() {
            if num.is_zero() {
                return Self::nan(precision, false);
            }
            return Self::inf(precision, num.sign() == Sign::Minus);
        }
        if num.is_zero() {
            return Self::zero(precision, false);
        }
        let sign = (num.sign() == Sign::Minus) ^ (den.sign() == Sign::Minus);
        Self::from_quotient(precision, rm, sign, num.magnitude(), den.magnitude(), 0)
    }

    /// Loads and converts a native fp64 value. Every double is exactly
    /// representable with 53 bits, smaller precisions round with `rm`.
    pub fn from_f64(precision: usize, rm: RoundingMode, float: f64) -> Self {
        let bits = float.to_bits();
        let sign = (bits >> 63) == 1;
        let biased_exp = (bits >> F64_MANTISSA) & F64_EXPONENT_MASK;
        let mantissa = bits & ((1u64 << F64_MANTISSA) - 1);

        // Check for NaN/Inf
        if biased_exp == F64_EXPONENT_MASK {
            if mantissa == 0 {
                return Self::inf(precision, sign);
            }
            return Self::nan(precision, sign);
        }

        let (m, e) = if biased_exp == 0 {
            if mantissa == 0 {
                return Self::zero(precision, sign);
            }
            // Denormals.
            (mantissa, F64_MIN_LSB)
        } else {
            // Add the implicit bit for normal numbers.
            (
                mantissa | (1u64 << F64_MANTISSA),
                biased_exp as i64 - 1075,
            )
        };
        let m = BigUint::from(m);
        Self::from_exact(precision, rm, sign, m, e, LossFraction::ExactlyZero)
    }

    /// Convert this float to the nearest double, using the rounding mode
    /// `rm`. Handles the double's denormal range and overflow.
    pub fn to_f64(&self, rm: RoundingMode) -> f64 {
        let sign = self.get_sign();
        let val = match self.get_category() {
            Category::NaN => f64::NAN,
            Category::Infinity => f64::INFINITY,
            Category::Zero => 0.0,
            Category::Normal => {
                if self.get_exp() > F64_MAX_EXP {
                    return f64_overflow(rm, sign);
                }
                // The lowest bit of a double with this exponent, which is
                // fixed in the denormal range.
                let target = (self.get_exp() - 53).max(F64_MIN_LSB);
                let q = round_at_bit(
                    self.get_mantissa(),
                    self.get_lsb_exp(),
                    target,
                    sign,
                    rm,
                );
                if q.bits() as i64 + target > F64_MAX_EXP {
                    return f64_overflow(rm, sign);
                }
                // The rounded mantissa is at most 2^53.
                let q = q.to_u64().map_or(f64::INFINITY, |q| q as f64);
                scale_f64(q, target)
            }
        };
        if sign {
            -val
        } else {
            val
        }
    }

    /// Round the float to a new precision with the rounding mode `rm`.
    pub fn cast_with_rm(&self, precision: usize, rm: RoundingMode) -> Self {
        if !self.is_normal() {
            return Self::raw(
                precision,
                self.get_sign(),
                self.get_exp(),
                BigUint::zero(),
                self.get_category(),
            );
        }
        if precision == self.get_precision() {
            return self.clone();
        }
        Self::from_exact(
            precision,
            rm,
            self.get_sign(),
            self.get_mantissa().clone(),
            self.get_lsb_exp(),
            LossFraction::ExactlyZero,
        )
    }

    /// Round to an integer with the rounding mode `rm`. Returns None for NaN
    /// and Inf.
    pub fn to_integer(&self, rm: RoundingMode) -> Option<BigInt> {
        match self.get_category() {
            Category::NaN | Category::Infinity => None,
            Category::Zero => Some(BigInt::zero()),
            Category::Normal => {
                let sign = self.get_sign();
                let m = self.convert_normal_to_integer(rm);
                let sign = if sign { Sign::Minus } else { Sign::Plus };
                Some(BigInt::from_biguint(sign, m))
            }
        }
    }

    /// Converts and returns the rounded integral part. Saturates out of
    /// range values and infinities. NaN converts to zero.
    pub fn to_i64(&self, rm: RoundingMode) -> i64 {
        if self.is_nan() || self.is_zero() {
            return 0;
        }
        let saturated = if self.get_sign() { i64::MIN } else { i64::MAX };
        if self.is_inf() || self.get_exp() > 64 {
            return saturated;
        }
        self.to_integer(rm)
            .and_then(|val| val.to_i64())
            .unwrap_or(saturated)
    }

    fn convert_normal_to_integer(&self, rm: RoundingMode) -> BigUint {
        // We are converting to integer, so set the center point of the exponent
        // to the lsb instead of the msb.
        round_at_bit(
            self.get_mantissa(),
            self.get_lsb_exp(),
            0,
            self.get_sign(),
            rm,
        )
    }

    /// Round to an integral value in the float format, with the rounding
    /// mode `rm`. The result keeps the sign (trunc(-0.5) is -0).
    pub fn round_to_integral(&self, rm: RoundingMode) -> Self {
        // Only handle normal numbers (don't do anything to NaN, Inf, Zero).
        if !self.is_normal() || self.get_lsb_exp() >= 0 {
            return self.clone();
        }
        let m = self.convert_normal_to_integer(rm);
        let sign = self.get_sign();
        if m.is_zero() {
            return Self::zero(self.get_precision(), sign);
        }
        // The integer is at most 2^precision, which is exact.
        Self::from_exact(self.get_precision(), rm, sign, m, 0, LossFraction::ExactlyZero)
    }

    /// Returns a value that is rounded to the nearest integer that's not larger
    /// in magnitude than this float.
    pub fn trunc(&self) -> Self {
        self.round_to_integral(RoundingMode::Zero)
    }

    /// Returns the exact value of the number as a reduced fraction with a
    /// positive denominator (which is a power of two). Returns None for NaN
    /// and Inf.
    pub fn exact_rational(&self) -> Option<(BigInt, BigInt)> {
        match self.get_category() {
            Category::NaN | Category::Infinity => None,
            Category::Zero => Some((BigInt::zero(), BigInt::one())),
            Category::Normal => {
                let m = self.get_mantissa();
                let tz = m.trailing_zeros().unwrap_or(0);
                let m = m >> tz as usize;
                let e = self.get_lsb_exp() + tz as i64;
                let sign = if self.get_sign() { Sign::Minus } else { Sign::Plus };
                let (num, den) = if e >= 0 {
                    (m << e as usize, BigUint::one())
                } else {
                    (m, BigUint::one() << (-e) as usize)
                };
                Some((BigInt::from_biguint(sign, num), BigInt::from(den)))
            }
        }
    }
}

#[cfg(test)]
use crate::utils;

#[cfg(test)]
fn fp64(v: f64) -> Float {
    Float::from_f64(53, RoundingMode::NearestTiesToEven, v)
}

#[test]
fn test_rounding_to_integer() {
    // Test the low integers with round-to-zero.
    for i in 0..100 {
        let r = fp64(i as f64 + 0.1).to_i64(RoundingMode::Zero);
        assert_eq!(i, r);
    }

    // Test the high integers with round_to_zero.
    for i in 0..100 {
        let val = (i as i64) << 54;
        let r = Float::from_i64(64, RoundingMode::Zero, val).to_i64(RoundingMode::Zero);
        assert_eq!(val, r);
    }

    use RoundingMode::NearestTiesToAway;
    assert_eq!(1, fp64(0.5).to_i64(NearestTiesToAway));
    assert_eq!(0, fp64(0.49).to_i64(NearestTiesToAway));
    assert_eq!(199999, fp64(199999.49).to_i64(NearestTiesToAway));
    assert_eq!(0, fp64(-0.49).to_i64(NearestTiesToAway));
    assert_eq!(-1, fp64(-0.5).to_i64(NearestTiesToAway));

    use RoundingMode::Zero;
    assert_eq!(0, fp64(0.9).to_i64(Zero));
    assert_eq!(1, fp64(1.1).to_i64(Zero));
    assert_eq!(99, fp64(99.999).to_i64(Zero));
    assert_eq!(0, fp64(-0.99).to_i64(Zero));
    assert_eq!(0, fp64(-0.5).to_i64(Zero));

    use RoundingMode::Positive;
    assert_eq!(1, fp64(0.9).to_i64(Positive));
    assert_eq!(2, fp64(1.1).to_i64(Positive));
    assert_eq!(100, fp64(99.999).to_i64(Positive));
    assert_eq!(0, fp64(-0.99).to_i64(Positive));
    assert_eq!(0, fp64(-0.5).to_i64(Positive));

    use RoundingMode::NearestTiesToEven;
    assert_eq!(2, fp64(2.5).to_i64(NearestTiesToEven));
    assert_eq!(4, fp64(3.5).to_i64(NearestTiesToEven));

    // Special values
    let n_inf = f64::NEG_INFINITY;
    let inf = f64::INFINITY;
    assert_eq!(0, fp64(f64::NAN).to_i64(NearestTiesToEven));
    assert_eq!(i64::MIN, fp64(n_inf).to_i64(NearestTiesToEven));
    assert_eq!(i64::MAX, fp64(inf).to_i64(NearestTiesToEven));
    assert_eq!(i64::MAX, fp64(1e30).to_i64(NearestTiesToEven));
    assert_eq!(i64::MIN, fp64(-1e30).to_i64(NearestTiesToEven));
}

#[test]
fn test_to_integer_big() {
    let rm = RoundingMode::NearestTiesToEven;
    let x = fp64(1e30);
    let expected: BigInt = "1000000000000000019884624838656".parse().unwrap();
    assert_eq!(x.to_integer(rm), Some(expected));
    assert_eq!(fp64(-7.5).to_integer(rm), Some(BigInt::from(-8)));
    assert_eq!(fp64(f64::NAN).to_integer(rm), None);
    assert_eq!(fp64(f64::INFINITY).to_integer(rm), None);
}

#[test]
fn test_round_trip_native_float_cast() {
    let rm = RoundingMode::NearestTiesToEven;
    let pi = 355. / 113.;
    let a = fp64(pi);
    assert_eq!(pi, a.to_f64(rm));

    assert!(fp64(f64::NAN).is_nan());
    assert!(!fp64(f64::NAN).is_inf());
    assert!(fp64(f64::INFINITY).is_inf());
    assert!(!fp64(f64::INFINITY).is_nan());
    assert!(fp64(f64::NEG_INFINITY).is_inf());
    assert!(fp64(f64::NEG_INFINITY).is_negative());
    assert!(fp64(-0.0).is_zero());
    assert!(fp64(-0.0).is_negative());

    for v in utils::get_special_test_values() {
        let res = fp64(v).to_f64(rm);
        assert_eq!(v.is_nan(), res.is_nan());
        assert!(v.is_nan() || res.to_bits() == v.to_bits());
    }

    // Denormals load exactly.
    for bits in [1u64, 2, 0x000f_ffff_ffff_ffff, 0x0000_0000_1001_0010] {
        let v = f64::from_bits(bits);
        assert_eq!(fp64(v).to_f64(rm).to_bits(), bits);
    }
}

#[test]
fn test_load_store_all_f64() {
    let mut lfsr = utils::Lfsr::new();
    let rm = RoundingMode::NearestTiesToEven;
    for _ in 0..10000 {
        let in_f = f64::from_bits(lfsr.get64());
        let out_f = fp64(in_f).to_f64(rm);
        assert_eq!(in_f.is_nan(), out_f.is_nan());
        assert_eq!(in_f.is_infinite(), out_f.is_infinite());
        assert!(in_f.is_nan() || (in_f.to_bits() == out_f.to_bits()));
    }
}

#[test]
fn test_cast_down_to_f64() {
    use RoundingMode::*;
    // A 100 bit number that is just above 1.
    let above_one = Float::from_exact(
        100,
        NearestTiesToEven,
        false,
        (BigUint::one() << 99usize) + BigUint::one(),
        -99,
        LossFraction::ExactlyZero,
    );
    assert_eq!(above_one.to_f64(NearestTiesToEven), 1.0);
    assert_eq!(above_one.to_f64(Zero), 1.0);
    assert_eq!(above_one.to_f64(Positive), 1.0 + f64::EPSILON);
    assert_eq!(above_one.neg().to_f64(Negative), -1.0 - f64::EPSILON);

    // Values beyond the range of the double.
    let huge = Float::from_exact(100, Zero, false, BigUint::one(), 5000, LossFraction::ExactlyZero);
    assert_eq!(huge.to_f64(NearestTiesToEven), f64::INFINITY);
    assert_eq!(huge.to_f64(Zero), f64::MAX);
    assert_eq!(huge.neg().to_f64(Positive), -f64::MAX);
    let tiny = Float::from_exact(100, Zero, false, BigUint::one(), -5000, LossFraction::ExactlyZero);
    assert_eq!(tiny.to_f64(NearestTiesToEven), 0.0);
    assert_eq!(tiny.to_f64(Positive), f64::from_bits(1));
    assert!(tiny.neg().to_f64(Positive).is_sign_negative());
    assert_eq!(tiny.neg().to_f64(Away), -f64::from_bits(1));

    // Rounding into the denormal range: 2^-1075 is a tie.
    let half_denormal = Float::from_exact(
        100,
        Zero,
        false,
        BigUint::one(),
        -1075,
        LossFraction::ExactlyZero,
    );
    assert_eq!(half_denormal.to_f64(NearestTiesToEven), 0.0);
    assert_eq!(half_denormal.to_f64(NearestTiesToAway), f64::from_bits(1));
    // 3 * 2^-1075 is a tie that rounds to the even 2 * 2^-1074.
    let m = BigUint::from(3u32);
    let x = Float::from_exact(100, Zero, false, m, -1075, LossFraction::ExactlyZero);
    assert_eq!(x.to_f64(NearestTiesToEven), f64::from_bits(2));
}

#[test]
fn test_cast_precision() {
    use RoundingMode::*;
    let third = Float::div_with_rm(&fp64(1.0), &fp64(3.0), NearestTiesToEven);
    let low = third.cast_with_rm(10, Zero);
    let high = third.cast_with_rm(10, Positive);
    assert_eq!(low.get_precision(), 10);
    assert!(low < high);
    assert!(low < third && third < high);
    // Widening is exact.
    let wide = third.cast_with_rm(200, Zero);
    assert_eq!(wide, third);
    assert_eq!(wide.to_f64(NearestTiesToEven), 1.0 / 3.0);
    assert!(fp64(f64::NAN).cast_with_rm(10, Zero).is_nan());
}

#[test]
fn test_cast_from_integers() {
    let rm = RoundingMode::NearestTiesToEven;
    let to = |x: Float| x.to_f64(rm);
    assert_eq!(to(Float::from_i64(53, rm, 1 << 32)), (1u64 << 32) as f64);
    assert_eq!(to(Float::from_u64(53, rm, u64::MAX)), u64::MAX as f64);
    assert_eq!(to(Float::from_i64(53, rm, i64::MIN)), i64::MIN as f64);
    assert_eq!(to(Float::from_i64(53, rm, 0)), 0.);
    // 11 bits of precision, like a half float.
    assert_eq!(to(Float::from_i64(11, rm, 65500)), 65504.0);
    assert_eq!(to(Float::from_i64(11, rm, 65519)), 65504.0);
    assert_eq!(to(Float::from_i64(11, rm, 65520)), 65536.0);

    for i in -100..100 {
        let a = Float::from_i64(24, rm, i);
        let b = Float::from_f64(24, rm, i as f64);
        assert_eq!(a, b);
    }

    let big: BigInt = "-123456789012345678901234567890".parse().unwrap();
    let a = Float::from_bigint(200, rm, &big);
    assert_eq!(a.to_integer(rm), Some(big));
}

#[test]
fn test_from_rational() {
    let rm = RoundingMode::NearestTiesToEven;
    let q = |n: i64, d: i64| {
        Float::from_rational(53, rm, &BigInt::from(n), &BigInt::from(d)).to_f64(rm)
    };
    assert_eq!(q(1, 3), 1.0 / 3.0);
    assert_eq!(q(-22, 7), -22.0 / 7.0);
    assert_eq!(q(22, -7), -22.0 / 7.0);
    assert_eq!(q(10, 4), 2.5);
    assert_eq!(q(0, 4), 0.0);
    assert_eq!(q(1, 0), f64::INFINITY);
    assert_eq!(q(-1, 0), f64::NEG_INFINITY);
    assert!(q(0, 0).is_nan());
}

#[test]
fn test_exact_rational() {
    let to_pair = |v: f64| {
        let (n, d) = fp64(v).exact_rational().unwrap();
        (n.to_i64().unwrap(), d.to_i64().unwrap())
    };
    assert_eq!(to_pair(0.75), (3, 4));
    assert_eq!(to_pair(-2.5), (-5, 2));
    assert_eq!(to_pair(48.0), (48, 1));
    assert_eq!(to_pair(0.0), (0, 1));
    assert_eq!(to_pair(0.1), (3602879701896397, 36028797018963968));
    assert!(fp64(f64::NAN).exact_rational().is_none());
}

#[test]
fn test_round_floor() {
    use RoundingMode::*;
    let large_integer = (1u64 << 52) as f64;
    let rm = NearestTiesToEven;
    let t = |v: f64| fp64(v).trunc().to_f64(rm);
    assert_eq!(t(0.4), 0.);
    assert_eq!(t(1.4), 1.);
    assert_eq!(t(1.99), 1.);
    assert_eq!(t(2.0), 2.0);
    assert_eq!(t(-2.4), -2.0);
    assert_eq!(t(1999999.), 1999999.);
    assert_eq!(t(large_integer), large_integer);
    assert_eq!(t(0.001), 0.);
    assert!(t(-0.5).is_sign_negative());

    let r = |v: f64, rm: RoundingMode| fp64(v).round_to_integral(rm).to_f64(NearestTiesToEven);
    assert_eq!(r(-2.4, Negative), -3.0);
    assert_eq!(r(-2.4, Positive), -2.0);
    assert_eq!(r(2.5, NearestTiesToAway), 3.0);
    assert_eq!(r(-2.5, NearestTiesToAway), -3.0);
    assert_eq!(r(2.5, NearestTiesToEven), 2.0);
    assert_eq!(r(0.1, Positive), 1.0);
    assert_eq!(r(0.99, Away), 1.0);
    // Rounding up to a new binade.
    assert_eq!(r(large_integer - 0.5, Positive), large_integer);
}
