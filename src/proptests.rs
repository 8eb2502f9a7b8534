//! Property-based tests for the real field arithmetic.

use proptest::prelude::*;

use crate::{Error, RealField, RoundingMode};

// Strategy for generating finite doubles, including zeros and subnormals.
fn finite_f64() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |x| x.is_finite())
}

// Strategy for generating the rounding modes.
fn rounding_mode() -> impl Strategy<Value = RoundingMode> {
    prop_oneof![
        Just(RoundingMode::NearestTiesToEven),
        Just(RoundingMode::NearestTiesToAway),
        Just(RoundingMode::Zero),
        Just(RoundingMode::Positive),
        Just(RoundingMode::Negative),
        Just(RoundingMode::Away),
    ]
}

proptest! {
    #[test]
    fn add_mul_commutative(a in finite_f64(), b in finite_f64(), rm in rounding_mode()) {
        let f = RealField::new(53, rm, false).unwrap();
        let (a, b) = (f.from_f64(a), f.from_f64(b));
        prop_assert_eq!(a.add(&b).unwrap(), b.add(&a).unwrap());
        prop_assert_eq!(a.mul(&b).unwrap(), b.mul(&a).unwrap());
    }

    #[test]
    fn double_precision_matches_native(a in finite_f64(), b in finite_f64()) {
        let f = RealField::default();
        let (x, y) = (f.from_f64(a), f.from_f64(b));
        // Native subnormal results are rounded twice.
        let sum = a + b;
        if sum.is_normal() {
            prop_assert_eq!(x.add(&y).unwrap().to_f64(), sum);
        }
        let prod = a * b;
        if prod.is_normal() {
            prop_assert_eq!(x.mul(&y).unwrap().to_f64(), prod);
        }
        let quot = a / b;
        if quot.is_normal() {
            prop_assert_eq!(x.div(&y).unwrap().to_f64(), quot);
        }
        if a > 0.0 && a.is_normal() {
            prop_assert_eq!(x.sqrt().to_f64(), a.sqrt());
        }
    }

    #[test]
    fn print_parse_round_trip(
        v in finite_f64(),
        precision in 2usize..300,
        radix in 2u32..=36,
        rm in rounding_mode()
    ) {
        let f = RealField::new(precision, rm, false).unwrap();
        let x = f.from_f64(v);
        let text = x.to_string_radix(radix, None).unwrap();
        let y = f.from_str_radix(&text, radix).unwrap();
        prop_assert_eq!(&x, &y, "{} in radix {} with {}", text, radix, rm);
    }

    #[test]
    fn abs_is_not_negative(v in finite_f64()) {
        let x = RealField::default().from_f64(v).abs();
        prop_assert!(!x.is_sign_negative());
        prop_assert!(x.sign() >= 0);
    }

    #[test]
    fn integers_are_exact(v in any::<i64>()) {
        let f = RealField::with_precision(64).unwrap();
        let x = f.from_i64(v);
        prop_assert_eq!(x.to_i64(RoundingMode::Zero), v);
        prop_assert_eq!(x.trunc(), x.clone());
    }

    #[test]
    fn different_fields_do_not_mix(p in 2usize..200, q in 2usize..200) {
        prop_assume!(p != q);
        let a = RealField::with_precision(p).unwrap().one();
        let b = RealField::with_precision(q).unwrap().one();
        let is_incompatible = matches!(a.add(&b), Err(Error::IncompatibleRings { .. }));
        prop_assert!(is_incompatible);
    }
}
