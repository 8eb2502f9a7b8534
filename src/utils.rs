//! This file contains test helpers: a deterministic random number generator
//! and lists of values that catch edge cases.

use crate::context::RoundingMode;
use crate::float::{Float, LossFraction};
use num_bigint::BigUint;

/// Returns list of interesting values that various tests use to catch edge cases.
pub fn get_special_test_values() -> [f64; 20] {
    [
        -f64::NAN,
        f64::NAN,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::EPSILON,
        -f64::EPSILON,
        0.000000000000000000000000000000000000001,
        f64::MIN,
        f64::MAX,
        std::f64::consts::PI,
        std::f64::consts::LN_2,
        std::f64::consts::SQRT_2,
        std::f64::consts::E,
        0.0,
        -0.0,
        10.,
        -10.,
        -0.00001,
        0.1,
        355. / 113.,
    ]
}

// Linear-feedback shift register. We use this as a random number generator for
// tests.
pub struct Lfsr {
    state: u32,
}

impl Lfsr {
    /// Generate a new LFSR number generator.
    pub fn new() -> Lfsr {
        Lfsr { state: 0x13371337 }
    }

    /// Generate a new LFSR number generator that starts with a specific state.
    pub fn new_with_seed(seed: u32) -> Lfsr {
        Lfsr {
            state: 0x13371337 ^ seed,
        }
    }

    fn next(&mut self) {
        let a = (self.state >> 24) & 1;
        let b = (self.state >> 23) & 1;
        let c = (self.state >> 22) & 1;
        let d = (self.state >> 17) & 1;
        let n = a ^ b ^ c ^ d ^ 1;
        self.state <<= 1;
        self.state |= n;
    }

    fn get(&mut self) -> u32 {
        let mut res: u32 = 0;
        for _ in 0..32 {
            self.next();
            res <<= 1;
            res ^= self.state & 0x1;
        }
        res
    }

    pub fn get64(&mut self) -> u64 {
        ((self.get() as u64) << 32) | self.get() as u64
    }

    /// Generate a random normal number with `precision` bits, and an exponent
    /// in the range [-exp_range, exp_range].
    pub fn get_float(&mut self, precision: usize, exp_range: i64) -> Float {
        let words = precision.div_ceil(32);
        let digits: Vec<u32> = (0..words).map(|_| self.get()).collect();
        // Keep exactly `precision` bits, with the top bit set.
        let m = BigUint::from_slice(&digits) >> (words * 32 - precision);
        let m = m | (BigUint::from(1u32) << (precision - 1));
        let sign = self.get() & 1 == 1;
        let e = (self.get() as i32 as i64) % (exp_range + 1);
        Float::from_exact(
            precision,
            RoundingMode::NearestTiesToEven,
            sign,
            m,
            e - precision as i64,
            LossFraction::ExactlyZero,
        )
    }
}

#[test]
fn test_lfsr_balance() {
    let mut lfsr = Lfsr::new();

    // Count the number of items, and the number of 1s.
    let mut items = 0;
    let mut ones = 0;

    for _ in 0..10000 {
        let mut u = lfsr.get();
        for _ in 0..32 {
            items += 1;
            ones += u & 1;
            u >>= 1;
        }
    }
    // Make sure that we have around 50% 1s and 50% zeros.
    assert!((ones as f64) < (0.55 * items as f64));
    assert!((ones as f64) > (0.45 * items as f64));
}

#[test]
fn test_repetition() {
    let mut lfsr = Lfsr::new();
    let first = lfsr.get();
    let second = lfsr.get();

    // Make sure that the items don't repeat themselves too frequently.
    for _ in 0..30000 {
        assert_ne!(first, lfsr.get());
        assert_ne!(second, lfsr.get());
    }
}

#[test]
fn test_random_floats() {
    let mut lfsr = Lfsr::new();
    for _ in 0..100 {
        let x = lfsr.get_float(113, 1000);
        assert!(x.is_normal());
        assert_eq!(x.get_precision(), 113);
        assert!(x.get_exp().abs() <= 1000);
    }
}
