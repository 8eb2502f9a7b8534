//! This module contains the implementation of the basic arithmetic
//! operations: add, sub, mul, div, and the IEEE remainder. Every operation
//! computes the exact result (or the exact result truncated plus a loss
//! fraction), and rounds it once with `normalize`.

use crate::context::RoundingMode;
use crate::float::{Category, Float, LossFraction};
use core::cmp::Ordering;
use num_bigint::BigUint;
use num_traits::{One, Zero};

impl Float {
    /// An inner function that performs the addition and subtraction of normal
    /// numbers (no NaN, Inf, Zeros).
    /// See Pg 247.  Chapter 8. Algorithms for the Five Basic Operations.
    fn add_or_sub_normals(
        a: &Self,
        b: &Self,
        subtract: bool,
        rm: RoundingMode,
    ) -> Self {
        let precision = a.get_precision();
        let b_sign = b.get_sign() ^ subtract;
        // Can transform (a-b) to (a + -b), either way, there are cases where
        // subtraction needs to happen.
        let subtract = a.get_sign() != b_sign;

        // Order the operands by magnitude of the exponent.
        let (big, big_sign, small, small_sign) = if a.get_exp() >= b.get_exp() {
            (a, a.get_sign(), b, b_sign)
        } else {
            (b, b_sign, a, a.get_sign())
        };

        // If the small operand is below the rounding bits of the big operand
        // then it only contributes a sticky bit. Place three guard bits below
        // the big operand, and report the small number as a loss below them.
        let gap = big.get_exp() - small.get_exp();
        if gap >= precision as i64 + 4 {
            let m = big.get_mantissa() << 3usize;
            let e = big.get_lsb_exp() - 3;
            return if subtract {
                let m = m - BigUint::one();
                Self::from_exact(
                    precision,
                    rm,
                    big_sign,
                    m,
                    e,
                    LossFraction::MoreThanHalf,
                )
            } else {
                Self::from_exact(
                    precision,
                    rm,
                    big_sign,
                    m,
                    e,
                    LossFraction::LessThanHalf,
                )
            };
        }

        // Align the input numbers on the same exponent. This is exact.
        let e = big.get_lsb_exp().min(small.get_lsb_exp());
        let big_m = big.get_mantissa() << (big.get_lsb_exp() - e) as usize;
        let small_m = small.get_mantissa() << (small.get_lsb_exp() - e) as usize;

        if !subtract {
            let m = big_m + small_m;
            return Self::from_exact(
                precision,
                rm,
                big_sign,
                m,
                e,
                LossFraction::ExactlyZero,
            );
        }

        match big_m.cmp(&small_m) {
            Ordering::Greater => Self::from_exact(
                precision,
                rm,
                big_sign,
                big_m - small_m,
                e,
                LossFraction::ExactlyZero,
            ),
            Ordering::Less => Self::from_exact(
                precision,
                rm,
                small_sign,
                small_m - big_m,
                e,
                LossFraction::ExactlyZero,
            ),
            // IEEE 754-2019 6.3: exact zero sums are +0, except when
            // rounding toward -Inf.
            Ordering::Equal => {
                Self::zero(precision, rm == RoundingMode::Negative)
            }
        }
    }

    /// Computes a+b using the rounding mode `rm`.
    pub fn add_with_rm(a: &Self, b: &Self, rm: RoundingMode) -> Self {
        Self::add_sub(a, b, false, rm)
    }
    /// Computes a-b using the rounding mode `rm`.
    pub fn sub_with_rm(a: &Self, b: &Self, rm: RoundingMode) -> Self {
        Self::add_sub(a, b, true, rm)
    }

    fn add_sub(a: &Self, b: &Self, subtract: bool, rm: RoundingMode) -> Self {
        let precision = a.get_precision();
        let b_sign = b.get_sign() ^ subtract;

        // Table 8.2: Specification of addition for positive floating-point
        // data. Pg 247.
        match (a.get_category(), b.get_category()) {
            (Category::NaN, _) => a.clone(),
            (_, Category::NaN) => Self::nan(precision, b.get_sign()),

            (Category::Normal, Category::Zero)
            | (Category::Infinity, Category::Normal)
            | (Category::Infinity, Category::Zero) => a.cast_with_rm(precision, rm),

            (Category::Normal, Category::Infinity)
            | (Category::Zero, Category::Infinity) => {
                Self::inf(precision, b_sign)
            }

            (Category::Zero, Category::Normal) => {
                let mut b = b.cast_with_rm(precision, rm);
                b.set_sign(b_sign);
                b
            }

            (Category::Zero, Category::Zero) => {
                if a.get_sign() == b_sign {
                    Self::zero(precision, b_sign)
                } else {
                    Self::zero(precision, rm == RoundingMode::Negative)
                }
            }

            (Category::Infinity, Category::Infinity) => {
                if a.get_sign() != b_sign {
                    return Self::nan(precision, false);
                }
                Self::inf(precision, a.get_sign())
            }

            (Category::Normal, Category::Normal) => {
                Self::add_or_sub_normals(a, b, subtract, rm)
            }
        }
    }
}

#[cfg(test)]
fn fp64(v: f64) -> Float {
    Float::from_f64(53, RoundingMode::NearestTiesToEven, v)
}

#[cfg(test)]
fn to_f64(v: &Float) -> f64 {
    v.to_f64(RoundingMode::NearestTiesToEven)
}

/// Check that `r0` matches the native result `r1`: same category, and bit
/// identical unless both are NaN.
#[cfg(test)]
fn assert_same_f64(r0: f64, r1: f64) {
    assert_eq!(r0.is_finite(), r1.is_finite());
    assert_eq!(r0.is_nan(), r1.is_nan());
    assert_eq!(r0.is_infinite(), r1.is_infinite());
    assert!(r1.is_nan() || r0.to_bits() == r1.to_bits(), "{} != {}", r0, r1);
}

#[test]
fn test_addition() {
    fn add_helper(a: f64, b: f64) -> f64 {
        let a = fp64(a);
        let b = fp64(b);
        let rm = RoundingMode::NearestTiesToEven;
        to_f64(&Float::add_with_rm(&a, &b, rm))
    }

    assert_eq!(add_helper(0., -4.), -4.);
    assert_eq!(add_helper(-4., 0.), -4.);
    assert_eq!(add_helper(1., 1.), 2.);
    assert_eq!(add_helper(8., 4.), 12.);
    assert_eq!(add_helper(128., 2.), 130.);
    assert_eq!(add_helper(128., -8.), 120.);
    assert_eq!(add_helper(64., -60.), 4.);
    assert_eq!(add_helper(69., -65.), 4.);
    assert_eq!(add_helper(69., 69.), 138.);
    assert_eq!(add_helper(-128., -8.), -136.);
    assert_eq!(add_helper(64., -65.), -1.);
    assert_eq!(add_helper(-64., -65.), -129.);
    assert_eq!(add_helper(-15., 15.), 0.);
    assert_eq!(add_helper(1e300, 1e-300), 1e300);
    assert_eq!(add_helper(1., -1e-300), 1. - 1e-300);

    for i in -4..15 {
        for j in i..15 {
            assert_eq!(
                add_helper(f64::from(j), f64::from(i)),
                f64::from(i) + f64::from(j)
            );
        }
    }
}

// Pg 120.  Chapter 4. Basic Properties and Algorithms.
#[test]
fn test_addition_large_numbers() {
    let rm = RoundingMode::NearestTiesToEven;
    let add = |a: &Float, b: &Float| Float::add_with_rm(a, b, rm);
    let sub = |a: &Float, b: &Float| Float::sub_with_rm(a, b, rm);

    let one = Float::one(53, false);
    let mut a = Float::one(53, false);

    while sub(&add(&a, &one), &a) == one {
        a = add(&a, &a);
    }

    let mut b = one.clone();
    while sub(&add(&a, &b), &a) != b {
        b = add(&b, &one);
    }

    assert_eq!(to_f64(&a), 9007199254740992.);
    assert_eq!(to_f64(&b), 2.);
}

#[test]
fn test_add_signed_zeros() {
    use RoundingMode::*;
    let pz = Float::zero(53, false);
    let nz = Float::zero(53, true);
    let one = Float::one(53, false);
    assert!(!Float::add_with_rm(&pz, &nz, NearestTiesToEven).is_negative());
    assert!(Float::add_with_rm(&nz, &nz, NearestTiesToEven).is_negative());
    assert!(Float::sub_with_rm(&nz, &pz, NearestTiesToEven).is_negative());
    assert!(Float::add_with_rm(&pz, &nz, Negative).is_negative());
    // x - x is +0, or -0 when rounding down.
    assert!(!Float::sub_with_rm(&one, &one, Zero).is_negative());
    assert!(Float::sub_with_rm(&one, &one, Negative).is_negative());
    // 0 - x flips the sign of x.
    assert_eq!(to_f64(&Float::sub_with_rm(&pz, &one, Zero)), -1.0);
}

#[test]
fn test_add_directed_sticky() {
    use RoundingMode::*;
    // 1 + tiny in the different rounding modes.
    let one = fp64(1.0);
    let tiny = fp64(1e-200);
    let up = Float::add_with_rm(&one, &tiny, Positive);
    assert_eq!(to_f64(&up), 1.0 + f64::EPSILON);
    let down = Float::add_with_rm(&one, &tiny, Zero);
    assert_eq!(to_f64(&down), 1.0);
    let down = Float::sub_with_rm(&one, &tiny, Zero);
    assert_eq!(to_f64(&down), 1.0 - f64::EPSILON / 2.);
    let near = Float::sub_with_rm(&one, &tiny, NearestTiesToEven);
    assert_eq!(to_f64(&near), 1.0);
    let away = Float::sub_with_rm(&one.neg(), &tiny, Away);
    assert_eq!(to_f64(&away), -1.0 - f64::EPSILON);
}

#[test]
fn add_denormals() {
    let v0 = f64::from_bits(0x0000_0000_0010_0010);
    let v1 = f64::from_bits(0x0000_0000_1001_0010);
    let v2 = f64::from_bits(0x1000_0000_0001_0010);

    fn add_f64(a: f64, b: f64) -> f64 {
        let a0 = fp64(a);
        let b0 = fp64(b);
        assert_eq!(to_f64(&a0), a);
        let rm = RoundingMode::NearestTiesToEven;
        to_f64(&Float::add_with_rm(&a0, &b0, rm))
    }

    // Add and subtract denormals.
    assert_eq!(add_f64(v0, v1), v0 + v1);
    assert_eq!(add_f64(v0, -v0), v0 - v0);
    assert_eq!(add_f64(v0, v2), v0 + v2);
    assert_eq!(add_f64(v2, v1), v2 + v1);
    assert_eq!(add_f64(v2, -v1), v2 - v1);

    // Add and subtract denormals and normal numbers.
    assert_eq!(add_f64(v0, 10.), v0 + 10.);
    assert_eq!(add_f64(v0, -10.), v0 - 10.);
    assert_eq!(add_f64(10000., v0), 10000. + v0);
}

#[test]
fn add_special_values() {
    use crate::utils;

    // Test the addition of various irregular values.
    let values = utils::get_special_test_values();
    let rm = RoundingMode::NearestTiesToEven;

    for v0 in values {
        for v1 in values {
            let r0 = to_f64(&Float::add_with_rm(&fp64(v0), &fp64(v1), rm));
            assert_same_f64(r0, v0 + v1);
            let r0 = to_f64(&Float::sub_with_rm(&fp64(v0), &fp64(v1), rm));
            assert_same_f64(r0, v0 - v1);
        }
    }
}

#[test]
fn test_add_random_vals() {
    use crate::utils;

    let mut lfsr = utils::Lfsr::new();
    let rm = RoundingMode::NearestTiesToEven;

    for _ in 0..20000 {
        let f0 = f64::from_bits(lfsr.get64());
        let f1 = f64::from_bits(lfsr.get64());
        let r0 = to_f64(&Float::add_with_rm(&fp64(f0), &fp64(f1), rm));
        assert_same_f64(r0, f0 + f1);
    }
}

impl Float {
    /// Compute a*b using the rounding mode `rm`.
    pub fn mul_with_rm(a: &Self, b: &Self, rm: RoundingMode) -> Self {
        let precision = a.get_precision();
        let sign = a.get_sign() ^ b.get_sign();

        // Table 8.4: Specification of multiplication for floating-point data of
        // positive sign. Page 251.
        match (a.get_category(), b.get_category()) {
            (Category::NaN, _) => a.clone(),
            (_, Category::NaN) => Self::nan(precision, b.get_sign()),
            (Category::Normal, Category::Infinity)
            | (Category::Infinity, Category::Normal)
            | (Category::Infinity, Category::Infinity) => {
                Self::inf(precision, sign)
            }
            (Category::Normal, Category::Zero)
            | (Category::Zero, Category::Normal)
            | (Category::Zero, Category::Zero) => Self::zero(precision, sign),

            (Category::Zero, Category::Infinity)
            | (Category::Infinity, Category::Zero) => {
                Self::nan(precision, sign)
            }

            (Category::Normal, Category::Normal) => {
                // The product of the integer significands is exact.
                let m = a.get_mantissa() * b.get_mantissa();
                let e = a.get_lsb_exp() + b.get_lsb_exp();
                Self::from_exact(
                    precision,
                    rm,
                    sign,
                    m,
                    e,
                    LossFraction::ExactlyZero,
                )
            }
        }
    }
}

#[test]
fn test_mul_simple() {
    let rm = RoundingMode::NearestTiesToEven;
    let a: f64 = -24.0;
    let b: f64 = 0.1;
    let c = Float::mul_with_rm(&fp64(a), &fp64(b), rm);
    assert_eq!(to_f64(&c), a * b);
}

#[test]
fn mul_regular_values() {
    // Test the multiplication of regular values.
    let values = [-5.0, 0., -0., 24., 1., 11., 10000., 256., 0.1, 3., 17.5];
    let rm = RoundingMode::NearestTiesToEven;

    for v0 in values {
        for v1 in values {
            let r0 = to_f64(&Float::mul_with_rm(&fp64(v0), &fp64(v1), rm));
            assert_eq!(r0.to_bits(), (v0 * v1).to_bits());
        }
    }
}

#[test]
fn test_mul_special_values() {
    use crate::utils;
    let rm = RoundingMode::NearestTiesToEven;

    for v0 in utils::get_special_test_values() {
        for v1 in utils::get_special_test_values() {
            let r0 = to_f64(&Float::mul_with_rm(&fp64(v0), &fp64(v1), rm));
            assert_same_f64(r0, v0 * v1);
        }
    }
}

#[test]
fn test_mul_random_vals() {
    use crate::utils;
    let mut lfsr = utils::Lfsr::new();
    let rm = RoundingMode::NearestTiesToEven;

    for _ in 0..20000 {
        let f0 = f64::from_bits(lfsr.get64());
        let f1 = f64::from_bits(lfsr.get64());
        let r1 = f0 * f1;
        // Results in the native denormal range are rounded twice when
        // converted back, so only check the normal range.
        if r1 != 0. && r1.is_finite() && !r1.is_normal() {
            continue;
        }
        if r1 == 0. && f0 != 0. && f1 != 0. {
            continue;
        }
        let r0 = to_f64(&Float::mul_with_rm(&fp64(f0), &fp64(f1), rm));
        assert_same_f64(r0, r1);
    }
}

impl Float {
    /// Create a number from the exact quotient `sign * (num / den) * 2^e`,
    /// rounded to `precision` bits with the rounding mode `rm`.
    /// `den` must not be zero.
    pub(crate) fn from_quotient(
        precision: usize,
        rm: RoundingMode,
        sign: bool,
        num: &BigUint,
        den: &BigUint,
        e: i64,
    ) -> Self {
        debug_assert!(!den.is_zero(), "division by zero");
        if num.is_zero() {
            return Self::zero(precision, sign);
        }

        // Shift the dividend to make sure that the integer division generates
        // at least two bits more than the precision. The remainder is then
        // only needed to decide the loss.
        let wanted = precision as i64 + 2 + den.bits() as i64 - num.bits() as i64;
        let shift = wanted.max(0);
        let num = num << shift as usize;
        let quotient = &num / den;
        let remainder = &num - &quotient * den;
        let loss = LossFraction::from_remainder(&remainder, den);
        Self::from_exact(precision, rm, sign, quotient, e - shift, loss)
    }

    /// Compute a/b, with the rounding mode `rm`.
    pub fn div_with_rm(a: &Self, b: &Self, rm: RoundingMode) -> Self {
        let precision = a.get_precision();
        let sign = a.get_sign() ^ b.get_sign();
        // Table 8.5: Special values for x/y - Page 263.
        match (a.get_category(), b.get_category()) {
            (Category::NaN, _)
            | (_, Category::NaN)
            | (Category::Zero, Category::Zero)
            | (Category::Infinity, Category::Infinity) => {
                Self::nan(precision, sign)
            }

            (_, Category::Infinity) => Self::zero(precision, sign),
            (Category::Zero, _) => Self::zero(precision, sign),
            (_, Category::Zero) => Self::inf(precision, sign),
            (Category::Infinity, _) => Self::inf(precision, sign),
            (Category::Normal, Category::Normal) => {
                let e = a.get_lsb_exp() - b.get_lsb_exp();
                Self::from_quotient(
                    precision,
                    rm,
                    sign,
                    a.get_mantissa(),
                    b.get_mantissa(),
                    e,
                )
            }
        }
    }
}

#[test]
fn test_div_simple() {
    let rm = RoundingMode::NearestTiesToEven;
    let c = Float::div_with_rm(&fp64(1.0), &fp64(7.0), rm);
    assert_eq!(to_f64(&c), 1.0 / 7.0);

    // Directed rounding of 1/3 brackets the nearest result.
    let third_up = Float::div_with_rm(&fp64(1.0), &fp64(3.0), RoundingMode::Positive);
    let third_down = Float::div_with_rm(&fp64(1.0), &fp64(3.0), RoundingMode::Negative);
    assert!(third_down < third_up);
    assert_eq!(to_f64(&third_down), 1.0 / 3.0);
}

#[test]
fn test_div_special_values() {
    use crate::utils;
    let rm = RoundingMode::NearestTiesToEven;

    for v0 in utils::get_special_test_values() {
        for v1 in utils::get_special_test_values() {
            let r1 = v0 / v1;
            if r1 != 0. && r1.is_finite() && !r1.is_normal() {
                continue;
            }
            let r0 = to_f64(&Float::div_with_rm(&fp64(v0), &fp64(v1), rm));
            assert_same_f64(r0, r1);
        }
    }
}

#[test]
fn test_div_random_vals() {
    use crate::utils;
    let mut lfsr = utils::Lfsr::new_with_seed(7);
    let rm = RoundingMode::NearestTiesToEven;

    for _ in 0..20000 {
        let f0 = f64::from_bits(lfsr.get64());
        let f1 = f64::from_bits(lfsr.get64());
        let r1 = f0 / f1;
        if r1 != 0. && r1.is_finite() && !r1.is_normal() {
            continue;
        }
        if r1 == 0. && f0 != 0. && f1.is_finite() {
            continue;
        }
        let r0 = to_f64(&Float::div_with_rm(&fp64(f0), &fp64(f1), rm));
        assert_same_f64(r0, r1);
    }
}

#[test]
fn test_famous_pentium4_bug() {
    // https://en.wikipedia.org/wiki/Pentium_FDIV_bug
    let rm = RoundingMode::NearestTiesToEven;
    let a = Float::from_u64(113, rm, 4_195_835);
    let b = Float::from_u64(113, rm, 3_145_727);
    let res = Float::div_with_rm(&a, &b, rm);
    let result = res.to_digits_string(10, Some(20), false, rm);
    assert!(result.starts_with("1.333820449136241002"), "{}", result);
}

/// Shifting by more than this amount of bits is done with modular
/// exponentiation instead of building the shifted number.
const MAX_DIRECT_SHIFT: i64 = 1 << 16;

impl Float {
    /// Compute the IEEE remainder a - n*b, where n is the integer nearest to
    /// a/b (ties to even), with the rounding mode `rm`.
    /// See IEEE 754-2019 Section 5.3.1 remainder.
    pub fn rem_with_rm(a: &Self, b: &Self, rm: RoundingMode) -> Self {
        let precision = a.get_precision();
        match (a.get_category(), b.get_category()) {
            (Category::NaN, _) | (_, Category::NaN) => {
                Self::nan(precision, a.get_sign())
            }
            (Category::Infinity, _) | (_, Category::Zero) => {
                Self::nan(precision, a.get_sign())
            }
            (Category::Zero, _) | (Category::Normal, Category::Infinity) => {
                a.cast_with_rm(precision, rm)
            }
            (Category::Normal, Category::Normal) => Self::rem_normals(a, b, rm),
        }
    }

    fn rem_normals(a: &Self, b: &Self, rm: RoundingMode) -> Self {
        let precision = a.get_precision();

        // |a| < 2^exp_a <= |b|/2, so the nearest quotient is zero.
        if a.get_exp() < b.get_exp() - 1 {
            return a.cast_with_rm(precision, rm);
        }

        let ea = a.get_lsb_exp();
        let eb = b.get_lsb_exp();
        let e = ea.min(eb);

        // Compute r0 = |a| mod 2|b| in units of 2^e. The quotient of a/b is
        // odd if r0 >= |b|. When the exponents are far apart use the identity
        // (m * 2^k) mod y = (m * (2^k mod y)) mod y.
        let (r0, y) = if ea >= eb {
            let y = b.get_mantissa().clone();
            let y2: BigUint = &y << 1usize;
            let k = ea - eb;
            let x = if k <= MAX_DIRECT_SHIFT {
                a.get_mantissa() << k as usize
            } else {
                let two = BigUint::from(2u32);
                let scale = two.modpow(&BigUint::from(k as u64), &y2);
                a.get_mantissa() * scale
            };
            (x % &y2, y)
        } else {
            let y = b.get_mantissa() << (eb - ea) as usize;
            let y2: BigUint = &y << 1usize;
            (a.get_mantissa() % &y2, y)
        };

        let odd_quotient = r0 >= y;
        let r = if odd_quotient { r0 - &y } else { r0 };

        // Select the remainder for the nearest quotient.
        let r2: BigUint = &r << 1usize;
        let (flip, m) = match r2.cmp(&y) {
            Ordering::Less => (false, r),
            Ordering::Greater => (true, &y - &r),
            Ordering::Equal => {
                if odd_quotient {
                    (true, &y - &r)
                } else {
                    (false, r)
                }
            }
        };

        // An exact zero remainder has the sign of the dividend.
        let sign = a.get_sign() ^ (flip && !m.is_zero());
        Self::from_exact(precision, rm, sign, m, e, LossFraction::ExactlyZero)
    }
}

#[test]
fn test_remainder() {
    let rm = RoundingMode::NearestTiesToEven;
    let rem = |a: f64, b: f64| {
        to_f64(&Float::rem_with_rm(&fp64(a), &fp64(b), rm))
    };

    assert_eq!(rem(5.0, 3.0), -1.0); // 5 = 2*3 - 1
    assert_eq!(rem(4.0, 3.0), 1.0); // 4 = 1*3 + 1
    assert_eq!(rem(-5.0, 3.0), 1.0);
    assert_eq!(rem(7.5, 2.0), -0.5); // 7.5/2 = 3.75 -> 4
    // Ties go to the even quotient.
    assert_eq!(rem(5.0, 2.0), 1.0); // 2.5 -> 2
    assert_eq!(rem(7.0, 2.0), -1.0); // 3.5 -> 4
    assert_eq!(rem(1.0, 2.0), 1.0); // 0.5 -> 0
    assert_eq!(rem(3.0, 2.0), -1.0); // 1.5 -> 2
    // Exact zero keeps the sign of the dividend.
    assert!(rem(-6.0, 3.0).is_sign_negative());
    assert_eq!(rem(-6.0, 3.0), 0.0);
    // Tiny dividends are returned unchanged.
    assert_eq!(rem(1e-10, 3.0), 1e-10);
    assert_eq!(rem(0.1, 1e300), 0.1);
    // Far apart exponents.
    assert_eq!(rem(1e300, 3.0), libm_remainder(1e300, 3.0));
    assert_eq!(rem(1e300, 1e-300), libm_remainder(1e300, 1e-300));
    assert_eq!(rem(0.3, 0.1), libm_remainder(0.3, 0.1));

    // Special values.
    assert!(rem(f64::INFINITY, 2.0).is_nan());
    assert!(rem(2.0, 0.0).is_nan());
    assert!(rem(f64::NAN, 2.0).is_nan());
    assert_eq!(rem(2.0, f64::INFINITY), 2.0);
    assert!(rem(-0.0, 2.0).is_sign_negative());
}

/// A reference IEEE remainder built from the exact `%` of the standard
/// library (fmod is exact), and a correction to the nearest quotient.
#[cfg(test)]
fn libm_remainder(x: f64, y: f64) -> f64 {
    let y = y.abs();
    let r = x.abs() % y;
    // The quotient parity is not available from fmod, so use an exact
    // comparison with half of y (fmod results are exact).
    let half = y / 2.0;
    let r = if r > half {
        r - y
    } else if r == half {
        // Decide the parity of the quotient: (x - r) / y rounded.
        let q = ((x.abs() - r) / y).round();
        if q % 2.0 == 1.0 {
            r - y
        } else {
            r
        }
    } else {
        r
    };
    if x < 0.0 {
        -r
    } else {
        r
    }
}
