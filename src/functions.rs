//! This module contains the implementation of several arithmetic operations:
//! square root, integer powers, scaling by powers of two, the neighbors of
//! a number, min/max and continued fractions.

use crate::context::{RoundingMode, MAX_EXPONENT, MIN_EXPONENT};
use crate::float::{Category, Float, LossFraction};
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};

/// Integer powers whose exact result would be wider than this number of
/// bits are computed with extra precision instead.
const MAX_EXACT_POW_BITS: u64 = 1 << 22;

impl Float {
    /// Returns a number that is out of the exponent range, rounded with `rm`.
    /// This produces Inf/largest for `overflow`, and zero/smallest otherwise.
    pub(crate) fn out_of_range(
        precision: usize,
        rm: RoundingMode,
        sign: bool,
        overflow: bool,
    ) -> Self {
        let m = BigUint::one() << (precision - 1);
        let exp = if overflow {
            MAX_EXPONENT + 1
        } else {
            MIN_EXPONENT - 2
        };
        let mut x = Self::raw(precision, sign, exp, m, Category::Normal);
        x.normalize(rm, LossFraction::ExactlyZero);
        x
    }

    /// Calculates the square root of the number, correctly rounded with the
    /// rounding mode `rm`.
    pub fn sqrt_with_rm(&self, rm: RoundingMode) -> Self {
        let precision = self.get_precision();
        if self.is_zero() {
            return self.clone(); // (+/-) zero
        } else if self.is_nan() || self.is_negative() {
            return Self::nan(precision, self.get_sign()); // (-/+)Nan, -Number.
        } else if self.is_inf() {
            return self.clone(); // Inf+.
        }

        // Make the exponent even, and the mantissa wide enough for the
        // integer square root to produce two bits more than the precision.
        let m = self.get_mantissa();
        let e = self.get_lsb_exp();
        let mut shift = (2 * precision as i64 + 4 - m.bits() as i64).max(0);
        if (e - shift).rem_euclid(2) == 1 {
            shift += 1;
        }
        let x = m << shift as usize;
        let root = x.sqrt();
        let loss = if &root * &root == x {
            LossFraction::ExactlyZero
        } else {
            // The root is not exact. It was truncated, and the missing part
            // is a sticky bit below the two guard bits.
            LossFraction::LessThanHalf
        };
        Self::from_exact(precision, rm, false, root, (e - shift) / 2, loss)
    }

    /// Return this number raised to the power of 'n', rounded with the
    /// rounding mode `rm`.
    pub fn powi_with_rm(&self, n: i64, rm: RoundingMode) -> Self {
        let precision = self.get_precision();
        if n == 0 {
            return Self::one(precision, false);
        }
        let odd = n % 2 != 0;
        let sign = self.get_sign() && odd;
        match self.get_category() {
            Category::NaN => return Self::nan(precision, self.get_sign()),
            Category::Zero => {
                return if n > 0 {
                    Self::zero(precision, sign)
                } else {
                    Self::inf(precision, sign)
                };
            }
            Category::Infinity => {
                return if n > 0 {
                    Self::inf(precision, sign)
                } else {
                    Self::zero(precision, sign)
                };
            }
            Category::Normal => {}
        }

        // |x| is in [2^(E-1), 2^E), so |x|^k is in [2^(k(E-1)), 2^(kE)).
        let k = n.unsigned_abs();
        let exp = self.get_exp() as i128;
        let (low, high) = if n > 0 {
            (k as i128 * (exp - 1), k as i128 * exp)
        } else {
            (-(k as i128) * exp, -(k as i128) * (exp - 1))
        };
        if low >= MAX_EXPONENT as i128 {
            return Self::out_of_range(precision, rm, sign, true);
        }
        if high < MIN_EXPONENT as i128 - 2 {
            return Self::out_of_range(precision, rm, sign, false);
        }

        let m = self.get_mantissa();
        if k.saturating_mul(m.bits()) > MAX_EXACT_POW_BITS {
            return self.powi_extended(n, rm);
        }

        // Compute the exact power of the mantissa, and round it once.
        let Some(k32) = k.to_u32() else {
            return self.powi_extended(n, rm);
        };
        let power = m.pow(k32);
        let e = self.get_lsb_exp() * k as i64;
        if n > 0 {
            Self::from_exact(precision, rm, sign, power, e, LossFraction::ExactlyZero)
        } else {
            Self::from_quotient(precision, rm, sign, &BigUint::one(), &power, -e)
        }
    }

    /// Compute the power with repeated squaring at a higher precision, for
    /// powers that are too wide to compute exactly.
    fn powi_extended(&self, n: i64, rm: RoundingMode) -> Self {
        let precision = self.get_precision();
        let mut k = n.unsigned_abs();
        // Every multiplication adds a rounding error, and squaring doubles
        // the error of the previous steps.
        let wide = precision + 2 * (64 - k.leading_zeros() as usize) + 10;
        let wrm = RoundingMode::NearestTiesToEven;

        // This algorithm is similar to binary conversion. Each bit in 'n'
        // represents a power-of-two number, like 1,2,4,8 ... We know how to
        // generate numbers to the power of an even number by squaring the
        // number log2 times. So, we just multiply all of the numbers together
        // to get the result.
        let mut elem = Self::one(wide, false);
        let mut val = self.cast_with_rm(wide, wrm);
        while k > 0 {
            if k & 1 == 1 {
                elem = Self::mul_with_rm(&elem, &val, wrm);
            }
            val = Self::mul_with_rm(&val, &val, wrm);
            k >>= 1;
        }
        if n < 0 {
            elem = Self::div_with_rm(&Self::one(wide, false), &elem, wrm);
        }
        elem.cast_with_rm(precision, rm)
    }

    /// Returns the number multiplied by 2^n. This is exact unless the result
    /// is out of the exponent range.
    pub fn scale(&self, n: i64, rm: RoundingMode) -> Self {
        if !self.is_normal() {
            return self.clone();
        }
        let exp = self.get_exp().saturating_add(n);
        let mut x = Self::new(
            self.get_precision(),
            self.get_sign(),
            exp,
            self.get_mantissa().clone(),
        );
        x.normalize(rm, LossFraction::ExactlyZero);
        x
    }

    /// Returns the next representable number after this one in the direction
    /// of +Inf.
    pub fn next_up(&self) -> Self {
        let precision = self.get_precision();
        match self.get_category() {
            Category::NaN => self.clone(),
            Category::Infinity => {
                if self.get_sign() {
                    Self::largest(precision, true)
                } else {
                    self.clone()
                }
            }
            Category::Zero => Self::smallest(precision, false),
            Category::Normal => {
                if self.get_sign() {
                    self.decrement_magnitude()
                } else {
                    self.increment_magnitude()
                }
            }
        }
    }

    /// Returns the next representable number after this one in the direction
    /// of -Inf.
    pub fn next_down(&self) -> Self {
        self.neg().next_up().neg()
    }

    fn increment_magnitude(&self) -> Self {
        let precision = self.get_precision();
        let mut m = self.get_mantissa() + 1u32;
        let mut exp = self.get_exp();
        if m.bits() > precision as u64 {
            m >>= 1usize;
            exp += 1;
        }
        if exp > MAX_EXPONENT {
            return Self::inf(precision, self.get_sign());
        }
        Self::raw(precision, self.get_sign(), exp, m, Category::Normal)
    }

    fn decrement_magnitude(&self) -> Self {
        let precision = self.get_precision();
        let mut m = self.get_mantissa() - 1u32;
        let mut exp = self.get_exp();
        if m.bits() < precision as u64 {
            // Moved to the lower binade: 0b0111 -> 0b1111.
            m = (m << 1usize) + 1u32;
            exp -= 1;
        }
        if exp < MIN_EXPONENT {
            return Self::zero(precision, self.get_sign());
        }
        Self::raw(precision, self.get_sign(), exp, m, Category::Normal)
    }

    /// Returns the unit in the last place of the number: the value of the
    /// lowest bit of the mantissa. The ulp of zero is the smallest positive
    /// number.
    pub fn ulp(&self, rm: RoundingMode) -> Self {
        let precision = self.get_precision();
        match self.get_category() {
            Category::NaN => self.clone(),
            Category::Infinity => Self::inf(precision, false),
            Category::Zero => Self::smallest(precision, false),
            Category::Normal => Self::from_exact(
                precision,
                rm,
                false,
                BigUint::one(),
                self.get_lsb_exp(),
                LossFraction::ExactlyZero,
            ),
        }
    }

    /// Returns the greater of self and `other`.
    pub fn max(&self, other: &Self) -> Self {
        if self.is_nan() {
            return other.clone();
        } else if other.is_nan() {
            return self.clone();
        } else if self.get_sign() != other.get_sign() {
            return if self.get_sign() {
                other.clone()
            } else {
                self.clone()
            }; // Handle (+-)0.
        }
        if self > other {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// Returns the smaller of self and `other`.
    pub fn min(&self, other: &Self) -> Self {
        if self.is_nan() {
            return other.clone();
        } else if other.is_nan() {
            return self.clone();
        } else if self.get_sign() != other.get_sign() {
            return if self.get_sign() {
                self.clone()
            } else {
                other.clone()
            }; // Handle (+-)0.
        }
        if self > other {
            other.clone()
        } else {
            self.clone()
        }
    }

    /// Convert the number to a Continued Fraction of two integers.
    /// The fraction is computed using 'n' iterations of the form:
    /// a0 + 1/(a1 + 1/(a2 + 1/( ... ))).
    /// This method discards the sign, and returns (0, 0) for Inf and NaN.
    pub fn as_fraction(&self, n: usize) -> (BigUint, BigUint) {
        if self.is_zero() {
            return (BigUint::zero(), BigUint::one()); // Zero.
        } else if self.is_inf() || self.is_nan() {
            return (BigUint::zero(), BigUint::zero()); // Invalid.
        }

        // Algorithm from:
        // Elementary Functions: Algorithms and Implementation
        // 9.3.1 A few basic notions on continued fractions - Page 180.
        // The terms are extracted from the exact binary value, so the
        // expansion is exact until the value runs out.
        let precision = self.get_precision();
        let rm = RoundingMode::NearestTiesToEven;
        let one = Self::one(precision, false);
        let mut real = self.abs();

        // The convergents (p_k, p_k-1) and (q_k, q_k-1).
        let mut p = (BigUint::one(), BigUint::zero());
        let mut q = (BigUint::zero(), BigUint::one());

        for _ in 0..n.max(1) {
            let int = real.trunc();
            let a = int
                .to_integer(rm)
                .and_then(|a| a.to_biguint())
                .unwrap_or_default();
            p = (&a * &p.0 + &p.1, p.0);
            q = (&a * &q.0 + &q.1, q.0);

            let frac = Self::sub_with_rm(&real, &int, rm);
            if frac.is_zero() {
                break;
            }
            real = Self::div_with_rm(&one, &frac, rm);
        }

        (p.0, q.0)
    }
}

#[cfg(test)]
fn fp64(v: f64) -> Float {
    Float::from_f64(53, RoundingMode::NearestTiesToEven, v)
}

#[cfg(test)]
fn as_f64(v: &Float) -> f64 {
    v.to_f64(RoundingMode::NearestTiesToEven)
}

#[test]
fn test_sqrt() {
    use crate::utils;
    let rm = RoundingMode::NearestTiesToEven;

    // Try a few power-of-two values.
    for i in 0..256 {
        let v16 = Float::from_u64(53, rm, i * i);
        assert_eq!(as_f64(&v16.sqrt_with_rm(rm)), (i) as f64);
    }

    // Test the category and value of the different special values (inf, zero,
    // correct sign, etc).
    for v_f64 in utils::get_special_test_values() {
        let vf = fp64(v_f64).sqrt_with_rm(rm);
        assert_eq!(vf.is_inf(), v_f64.sqrt().is_infinite());
        assert_eq!(vf.is_nan(), v_f64.sqrt().is_nan());
        if !v_f64.sqrt().is_nan() {
            assert_eq!(vf.is_negative(), v_f64.sqrt().is_sign_negative());
            assert_eq!(as_f64(&vf), v_f64.sqrt());
        }
    }

    // Test precomputed values.
    fn check(inp: f64, res: f64) {
        let rm = RoundingMode::NearestTiesToEven;
        assert_eq!(as_f64(&fp64(inp).sqrt_with_rm(rm)), res);
    }
    check(1.5, 1.224744871391589);
    check(2.3, 1.51657508881031);
    check(6.7, 2.588435821108957);
    check(7.9, 2.8106938645110393);
    check(11.45, 3.383784863137726);
    check(1049.3, 32.39290045673589);
    check(90210.7, 300.35096137685326);
    check(199120056003.73413, 446228.70369770494);
    check(0.6666666666666666, 0.816496580927726);
    check(0.4347826086956522, 0.6593804733957871);
    check(0.14925373134328357, 0.3863337046431279);
    check(0.12658227848101264, 0.35578403348241);
    check(0.08733624454148473, 0.29552706228277087);
    check(0.0009530162965786716, 0.030870962028719993);
    check(1.1085159520988087e-5, 0.00332943831914455);
    check(5.0120298432056786e-8, 0.0002238756316173263);
}

#[test]
fn test_sqrt_random_vals() {
    use crate::utils;
    let mut lfsr = utils::Lfsr::new_with_seed(3);
    let rm = RoundingMode::NearestTiesToEven;
    for _ in 0..5000 {
        let v = f64::from_bits(lfsr.get64()).abs();
        let r0 = as_f64(&fp64(v).sqrt_with_rm(rm));
        let r1 = v.sqrt();
        assert!(r1.is_nan() || r0.to_bits() == r1.to_bits());
    }
}

#[test]
fn test_sqrt_directed() {
    use RoundingMode::*;
    let two = fp64(2.0);
    let down = two.sqrt_with_rm(Zero);
    let up = two.sqrt_with_rm(Positive);
    assert_eq!(as_f64(&down), 1.4142135623730950);
    assert_eq!(as_f64(&up), 1.4142135623730951);
    assert!(down < up);
    // Exact roots are not rounded.
    assert_eq!(fp64(0.25).sqrt_with_rm(Positive), fp64(0.5));
    assert!(fp64(-0.0).sqrt_with_rm(Zero).is_negative());
}

#[test]
fn test_powi() {
    let rm = RoundingMode::NearestTiesToEven;
    let pow = |v: f64, n: i64| as_f64(&fp64(v).powi_with_rm(n, rm));
    assert_eq!(pow(2.0, 10), 1024.0);
    assert_eq!(pow(-2.0, 3), -8.0);
    assert_eq!(pow(-2.0, 4), 16.0);
    assert_eq!(pow(2.0, -2), 0.25);
    assert_eq!(pow(10.0, 22), 1e22);
    assert_eq!(pow(10.0, -5), 1e-5);
    assert_eq!(pow(3.0, 40), 12157665459056928801.0);
    assert_eq!(pow(1.1, 2), 1.1 * 1.1);

    // Special values.
    assert_eq!(pow(f64::NAN, 0), 1.0);
    assert!(pow(f64::NAN, 3).is_nan());
    assert_eq!(pow(0.0, -1), f64::INFINITY);
    assert_eq!(pow(-0.0, -1), f64::NEG_INFINITY);
    assert_eq!(pow(-0.0, -2), f64::INFINITY);
    assert_eq!(pow(-0.0, 3).to_bits(), (-0.0f64).to_bits());
    assert_eq!(pow(f64::NEG_INFINITY, 3), f64::NEG_INFINITY);
    assert_eq!(pow(f64::NEG_INFINITY, -3).to_bits(), (-0.0f64).to_bits());

    // Out of the exponent range.
    let huge = fp64(2.0).powi_with_rm(i64::MAX, rm);
    assert!(huge.is_inf());
    let huge = fp64(-2.0).powi_with_rm(i64::MAX, RoundingMode::Zero);
    assert!(huge.is_normal() && huge.is_negative());
    let tiny = fp64(0.5).powi_with_rm(1 << 40, rm);
    assert!(tiny.is_zero());
}

#[test]
fn test_powi_large_exponents() {
    let rm = RoundingMode::NearestTiesToEven;
    // A number close to one raised to a large power uses the extended path.
    let x = Float::from_f64(64, rm, 1.0 + 1e-12);
    let r = x.powi_with_rm(1_000_000_000, rm);
    let expected = (1e-12f64).ln_1p() * 1e9;
    assert!((as_f64(&r).ln() - expected).abs() < 1e-12);

    // Powers of two are exact.
    let r = fp64(2.0).powi_with_rm(100_000, rm);
    assert_eq!(r.get_exp(), 100_001);
}

#[test]
fn test_scale() {
    let rm = RoundingMode::NearestTiesToEven;
    assert_eq!(as_f64(&fp64(3.0).scale(4, rm)), 48.0);
    assert_eq!(as_f64(&fp64(3.0).scale(-1, rm)), 1.5);
    assert!(fp64(3.0).scale(i64::MAX, rm).is_inf());
    assert!(fp64(3.0).scale(i64::MIN, rm).is_zero());
    assert!(fp64(f64::NAN).scale(1, rm).is_nan());
}

#[test]
fn test_next_up_down() {
    let rm = RoundingMode::NearestTiesToEven;
    let one = fp64(1.0);
    assert_eq!(as_f64(&one.next_up()), 1.0 + f64::EPSILON);
    assert_eq!(as_f64(&one.next_down()), 1.0 - f64::EPSILON / 2.);
    assert_eq!(as_f64(&one.neg().next_up()), -1.0 + f64::EPSILON / 2.);
    assert_eq!(one.next_up().next_down(), one);
    assert_eq!(one.next_down().next_up(), one);

    let zero = Float::zero(53, false);
    assert_eq!(zero.next_up(), Float::smallest(53, false));
    assert_eq!(zero.next_down(), Float::smallest(53, true));
    assert!(Float::smallest(53, true).next_up().is_zero());
    assert!(Float::largest(53, false).next_up().is_inf());
    assert_eq!(Float::inf(53, true).next_up(), Float::largest(53, true));

    assert_eq!(as_f64(&one.ulp(rm)), f64::EPSILON);
    assert_eq!(as_f64(&fp64(1024.0).ulp(rm)), 1024.0 * f64::EPSILON);
    assert_eq!(zero.ulp(rm), Float::smallest(53, false));
}

#[test]
fn test_min_max() {
    use crate::utils;

    fn check(v0: f64, v1: f64) {
        // Min.
        let correct = v0.min(v1);
        let test = as_f64(&fp64(v0).min(&fp64(v1)));
        assert_eq!(test.is_nan(), correct.is_nan());
        if !correct.is_nan() {
            assert_eq!(correct, test);
        }
        // Max.
        let correct = v0.max(v1);
        let test = as_f64(&fp64(v0).max(&fp64(v1)));
        assert_eq!(test.is_nan(), correct.is_nan());
        if !correct.is_nan() {
            assert_eq!(correct, test);
        }
    }

    // Test a bunch of special values (Inf, Epsilon, Nan, (+-)Zeros).
    for v0 in utils::get_special_test_values() {
        for v1 in utils::get_special_test_values() {
            check(v0, v1);
        }
    }

    let mut lfsr = utils::Lfsr::new();

    for _ in 0..100 {
        let v0 = f64::from_bits(lfsr.get64());
        let v1 = f64::from_bits(lfsr.get64());
        check(v0, v1);
    }
}

#[test]
fn test_frac() {
    let rm = RoundingMode::NearestTiesToEven;
    let x = Float::from_u64(128, rm, 2).sqrt_with_rm(rm);
    let as_pair = |n: usize| {
        let (p, q) = x.as_fraction(n);
        (p.to_u64().unwrap(), q.to_u64().unwrap())
    };

    // The convergents of sqrt(2): 1, 3/2, 7/5, 17/12, 41/29.
    assert_eq!(as_pair(1), (1, 1));
    assert_eq!(as_pair(2), (3, 2));
    assert_eq!(as_pair(3), (7, 5));
    assert_eq!(as_pair(4), (17, 12));
    assert_eq!(as_pair(5), (41, 29));

    // Finite expansions stop early.
    let (p, q) = fp64(-2.75).as_fraction(10);
    assert_eq!((p.to_u64().unwrap(), q.to_u64().unwrap()), (11, 4));
    assert_eq!(fp64(f64::NAN).as_fraction(3), (BigUint::zero(), BigUint::zero()));
}
