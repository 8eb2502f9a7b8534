//! This module contains the implementation of string conversion: parsing of
//! numbers in any radix between 2 and 36, and printing of digits.
//!
//! Both directions round once. Parsing rounds the value of the digits, and
//! printing rounds the scaled value of the number to the requested number of
//! digits. Small powers of the radix are computed exactly. Large powers are
//! bracketed by a lower and an upper bound, and the bounds are widened until
//! both round to the same result.

use crate::context::{RoundingMode, MAX_EXPONENT, MIN_EXPONENT};
use crate::error::{Error, ParseError, ParseErrorKind, Result};
use crate::float::{round_away, shift_right_with_loss, Category, Float, LossFraction};
use core::f64::consts::LN_2;
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Returns the number of significant digits in `radix` that are needed for
/// printing numbers with `precision` bits, such that parsing the digits
/// produces the same number: 1 + ceil(precision / log2(radix)).
pub(crate) fn default_digits(precision: usize, radix: u32) -> usize {
    if radix.is_power_of_two() {
        let bits_per_digit = radix.trailing_zeros() as usize;
        return 1 + precision.div_ceil(bits_per_digit);
    }
    1 + (precision as f64 * LN_2 / (radix as f64).ln()).ceil() as usize
}

/// Returns true if `c` starts the exponent part of a number in `radix`.
fn is_exponent_marker(c: char, radix: u32) -> bool {
    match c {
        '@' => true,
        'e' | 'E' => radix <= 10,
        'p' | 'P' => radix == 2 || radix == 16,
        _ => false,
    }
}

/// Parse a signed decimal exponent. Huge values saturate, they overflow or
/// underflow the number anyway.
fn parse_exponent(text: &str) -> Option<i64> {
    const LIMIT: i64 = 1 << 62;
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() {
        return None;
    }
    let mut value: i64 = 0;
    for c in digits.chars() {
        let d = c.to_digit(10)?;
        value = (value * 10 + d as i64).min(LIMIT);
    }
    Some(if negative { -value } else { value })
}

/// Returns true if `text` matches one of the special value tokens.
fn is_token(text: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|t| t.eq_ignore_ascii_case(text))
}

impl Float {
    /// Parse the string `input` in the radix `radix`, and round the exact
    /// value to `precision` bits with the rounding mode `rm`. A radix of zero
    /// selects the radix from the prefix: 0x (16), 0b (2), or 10.
    pub fn parse_radix(
        precision: usize,
        rm: RoundingMode,
        input: &str,
        radix: u32,
    ) -> Result<Self> {
        if radix != 0 && !(2..=36).contains(&radix) {
            return Err(Error::InvalidRadix(radix));
        }
        let fail = |position: usize, kind: ParseErrorKind| -> Result<Self> {
            let err = ParseError::new(input, position, kind);
            tracing::trace!(%err, "failed to parse a number");
            Err(err.into())
        };

        // Positions are reported relative to the untrimmed input.
        let start = input.len() - input.trim_start().len();
        let body = input.trim();
        if body.is_empty() {
            return fail(0, ParseErrorKind::Empty);
        }

        // Handle the plus or minus in front of the number.
        let (sign, mut pos) = match body.as_bytes()[0] {
            b'-' => (true, 1),
            b'+' => (false, 1),
            _ => (false, 0),
        };

        // Letters are digits in the large radices, so only the '@' tokens
        // are special there.
        let rest = &body[pos..];
        let words = radix <= 16;
        if is_token(rest, &["@inf@"]) || (words && is_token(rest, &["inf", "infinity"])) {
            return Ok(Self::inf(precision, sign));
        }
        if is_token(rest, &["@nan@"]) || (words && is_token(rest, &["nan"])) {
            return Ok(Self::nan(precision, sign));
        }

        // Handle the radix prefix.
        let prefix = rest.get(..2).map(|p| p.to_ascii_lowercase());
        let radix = match (radix, prefix.as_deref()) {
            (0 | 16, Some("0x")) => {
                pos += 2;
                16
            }
            (0 | 2, Some("0b")) => {
                pos += 2;
                2
            }
            (0, _) => 10,
            (radix, _) => radix,
        };

        // Scan the digits, and find the radix point and the exponent marker.
        let digits_start = pos;
        let mut digits = String::new();
        let mut frac_digits: i64 = 0;
        let mut seen_point = false;
        let mut marker: Option<(usize, char)> = None;
        for (i, c) in body[pos..].char_indices() {
            let at = pos + i;
            if c == '.' {
                if seen_point {
                    return fail(start + at, ParseErrorKind::InvalidDigit);
                }
                seen_point = true;
                continue;
            }
            if is_exponent_marker(c, radix) {
                marker = Some((at, c));
                break;
            }
            if c.to_digit(radix).is_none() {
                return fail(start + at, ParseErrorKind::InvalidDigit);
            }
            digits.push(c);
            if seen_point {
                frac_digits += 1;
            }
        }
        if digits.is_empty() {
            return fail(start + digits_start, ParseErrorKind::MissingDigits);
        }

        // Parse the exponent. 'p' is a power of two, the other markers are
        // powers of the radix.
        let (exp_radix, exp2) = match marker {
            None => (0, 0),
            Some((at, c)) => {
                let text = &body[at + c.len_utf8()..];
                let Some(value) = parse_exponent(text) else {
                    return fail(start + at, ParseErrorKind::InvalidExponent);
                };
                if c == 'p' || c == 'P' {
                    (0, value)
                } else {
                    (value, 0)
                }
            }
        };

        let Some(num) = BigUint::parse_bytes(digits.as_bytes(), radix) else {
            return fail(start + digits_start, ParseErrorKind::InvalidDigit);
        };
        if num.is_zero() {
            return Ok(Self::zero(precision, sign));
        }
        let k = exp_radix.saturating_sub(frac_digits);
        Ok(Self::from_radix_parts(precision, rm, sign, &num, radix, k, exp2))
    }

    /// Returns the rounded value of `sign * num * radix^k * 2^exp2`.
    fn from_radix_parts(
        precision: usize,
        rm: RoundingMode,
        sign: bool,
        num: &BigUint,
        radix: u32,
        k: i64,
        exp2: i64,
    ) -> Self {
        // Reject numbers that are far out of the exponent range before doing
        // any big computation.
        let log2_radix = (radix as f64).log2();
        let estimate = num.bits() as f64 + k as f64 * log2_radix + exp2 as f64;
        if estimate > (MAX_EXPONENT + 64) as f64 {
            return Self::out_of_range(precision, rm, sign, true);
        }
        if estimate < (MIN_EXPONENT - 64) as f64 {
            return Self::out_of_range(precision, rm, sign, false);
        }

        // Split the radix into a power of two, which goes to the exponent,
        // and an odd factor.
        let radix_tz = radix.trailing_zeros();
        let odd = radix >> radix_tz;
        let e = k.saturating_mul(radix_tz as i64).saturating_add(exp2);
        let exact = LossFraction::ExactlyZero;
        let k_abs = k.unsigned_abs();

        // The value is on a rounding boundary only if odd^|k| is small: it
        // must fit in the significand (k > 0) or divide the digits (k < 0).
        let limit = precision as u64 + num.bits() + 64;
        if odd == 1 || scale_bits(odd, k_abs) <= limit as f64 {
            let scale = BigUint::from(odd).pow(k_abs as u32);
            return if k >= 0 {
                Self::from_exact(precision, rm, sign, num * scale, e, exact)
            } else {
                Self::from_quotient(precision, rm, sign, num, &scale, e)
            };
        }

        // Round a lower and an upper bound of the value. Rounding is
        // monotonic, so the value rounds to the same number when they agree.
        let mut w = precision as u64 + 64;
        loop {
            let (lo_m, lo_e) = pow_bound(odd, k_abs, w, false);
            let (hi_m, hi_e) = pow_bound(odd, k_abs, w, true);
            let (a, b) = if k >= 0 {
                (
                    Self::from_exact(precision, rm, sign, num * lo_m, e + lo_e, exact),
                    Self::from_exact(precision, rm, sign, num * hi_m, e + hi_e, exact),
                )
            } else {
                (
                    Self::from_quotient(precision, rm, sign, num, &hi_m, e - hi_e),
                    Self::from_quotient(precision, rm, sign, num, &lo_m, e - lo_e),
                )
            };
            if a == b {
                return a;
            }
            w += w / 2;
        }
    }
}

/// Returns log2(odd^k), the number of bits in the exact power.
fn scale_bits(odd: u32, k: u64) -> f64 {
    k as f64 * (odd as f64).log2()
}

/// Returns a bound of `base^k` as `m * 2^e`, where `m` has at most `w`
/// bits. This is a lower bound, or an upper bound when `up` is set.
fn pow_bound(base: u32, k: u64, w: u64, up: bool) -> (BigUint, i64) {
    let truncate = |m: BigUint, e: i64| -> (BigUint, i64) {
        let bits = m.bits();
        if bits <= w {
            return (m, e);
        }
        let (mut t, loss) = shift_right_with_loss(&m, bits - w);
        if up && !loss.is_exactly_zero() {
            t += 1u32;
        }
        (t, e + (bits - w) as i64)
    };

    let base = BigUint::from(base);
    let mut acc = (BigUint::one(), 0i64);
    for i in (0..64 - k.leading_zeros()).rev() {
        acc = truncate(&acc.0 * &acc.0, acc.1 * 2);
        if (k >> i) & 1 == 1 {
            acc = truncate(&acc.0 * &base, acc.1);
        }
    }
    acc
}

/// Returns `num / den * 2^e` rounded to an integer with `rm`.
fn round_scaled(
    mut num: BigUint,
    mut den: BigUint,
    e: i64,
    sign: bool,
    rm: RoundingMode,
) -> BigUint {
    if e >= 0 {
        num <<= e as usize;
    } else {
        den <<= (-e) as usize;
    }
    let mut q = &num / &den;
    let rem = &num - &q * &den;
    let loss = LossFraction::from_remainder(&rem, &den);
    if round_away(rm, sign, q.bit(0), loss) {
        q += 1u32;
    }
    q
}

impl Float {
    /// Returns the `n` significant digits of the number in `radix` (without
    /// the sign), rounded with `rm`, and the position of the radix point `d`,
    /// such that the value is 0.DIGITS * radix^d.
    fn to_radix_digits(&self, radix: u32, n: usize, rm: RoundingMode) -> (String, i64) {
        debug_assert!(self.is_normal());
        let r = BigUint::from(radix);
        let upper = r.pow(n as u32);
        let lower = r.pow(n as u32 - 1);

        // The number is in [2^(E-1), 2^E). Start with an estimate of the
        // position of the point, and fix it if the digits don't fit.
        let log_r_2 = LN_2 / (radix as f64).ln();
        let mut d = ((self.get_exp() - 1) as f64 * log_r_2).floor() as i64 + 1;

        loop {
            let q = self.scaled_by_radix_power(radix, n, n as i64 - d, rm);
            if q >= upper {
                d += 1;
                continue;
            }
            if q < lower {
                d -= 1;
                continue;
            }
            return (q.to_str_radix(radix), d);
        }
    }

    /// Returns round(|x| * radix^k) with the rounding mode `rm`, where the
    /// result has about `n` digits.
    fn scaled_by_radix_power(
        &self,
        radix: u32,
        n: usize,
        k: i64,
        rm: RoundingMode,
    ) -> BigUint {
        let sign = self.get_sign();
        let m = self.get_mantissa();
        let radix_tz = radix.trailing_zeros();
        let odd = radix >> radix_tz;
        let e = self.get_lsb_exp() + k * radix_tz as i64;
        let k_abs = k.unsigned_abs();

        // The scaled value is on a rounding boundary only if odd^|k| is
        // small: it must divide the mantissa (k < 0) or fit in the digits
        // (k > 0). Compute those cases exactly.
        let digit_bits = n as u64 * (32 - radix.leading_zeros()) as u64;
        let limit = self.get_precision() as u64 + digit_bits + 64;
        if odd == 1 || scale_bits(odd, k_abs) <= limit as f64 {
            let scale = BigUint::from(odd).pow(k_abs as u32);
            return if k >= 0 {
                round_scaled(m * scale, BigUint::one(), e, sign, rm)
            } else {
                round_scaled(m.clone(), scale, e, sign, rm)
            };
        }

        // Round a lower and an upper bound of the scaled value, with more
        // bits until they agree.
        let mut w = limit;
        loop {
            let (lo_m, lo_e) = pow_bound(odd, k_abs, w, false);
            let (hi_m, hi_e) = pow_bound(odd, k_abs, w, true);
            let (a, b) = if k >= 0 {
                (
                    round_scaled(m * lo_m, BigUint::one(), e + lo_e, sign, rm),
                    round_scaled(m * hi_m, BigUint::one(), e + hi_e, sign, rm),
                )
            } else {
                (
                    round_scaled(m.clone(), hi_m, e - hi_e, sign, rm),
                    round_scaled(m.clone(), lo_m, e - lo_e, sign, rm),
                )
            };
            if a == b {
                return a;
            }
            w += w / 2;
        }
    }

    /// Convert the number to a string of `digits` significant digits in
    /// `radix` (the default number of digits when None), rounded with `rm`.
    /// Scientific notation is used when `scientific` is set, or when the
    /// exponent is outside of [-5, digits).
    pub fn to_digits_string(
        &self,
        radix: u32,
        digits: Option<usize>,
        scientific: bool,
        rm: RoundingMode,
    ) -> String {
        debug_assert!((2..=36).contains(&radix));
        let sign = self.get_sign();
        match self.get_category() {
            Category::NaN => "NaN".to_string(),
            Category::Infinity => {
                if sign {
                    "-infinity".to_string()
                } else {
                    "+infinity".to_string()
                }
            }
            Category::Zero => {
                let n = digits
                    .unwrap_or_else(|| default_digits(self.get_precision(), radix))
                    .max(1);
                let zeros = "0".repeat(n);
                layout(sign, &zeros, 1, radix, scientific)
            }
            Category::Normal => {
                let n = digits
                    .unwrap_or_else(|| default_digits(self.get_precision(), radix))
                    .max(1);
                let (digits, d) = self.to_radix_digits(radix, n, rm);
                layout(sign, &digits, d, radix, scientific)
            }
        }
    }
}

/// Place the radix point into `digits`, where the value is 0.DIGITS * radix^d.
fn layout(sign: bool, digits: &str, d: i64, radix: u32, scientific: bool) -> String {
    let n = digits.len() as i64;
    let exp = d - 1;
    let mut out = String::with_capacity(digits.len() + 24);
    if sign {
        out.push('-');
    }

    if scientific || exp < -5 || exp >= n {
        out.push_str(&digits[..1]);
        if n > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push(if radix <= 10 { 'e' } else { '@' });
        out.push_str(&exp.to_string());
    } else if d > 0 {
        let (int, frac) = digits.split_at(d as usize);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    } else {
        out.push_str("0.");
        out.push_str(&"0".repeat((-d) as usize));
        out.push_str(digits);
    }
    out
}

#[cfg(test)]
fn parse64(text: &str) -> Result<f64> {
    let rm = RoundingMode::NearestTiesToEven;
    Float::parse_radix(53, rm, text, 10).map(|x| x.to_f64(rm))
}

#[cfg(test)]
fn print64(v: f64) -> String {
    let rm = RoundingMode::NearestTiesToEven;
    Float::from_f64(53, rm, v).to_digits_string(10, None, false, rm)
}

#[test]
fn test_from_string() {
    assert_eq!(parse64("-3.0").unwrap(), -3.0);
    assert_eq!(parse64("-3.00").unwrap(), -3.0);
    assert_eq!(parse64("30").unwrap(), 30.0);
    assert_eq!(parse64("430.56").unwrap(), 430.56);
    assert_eq!(parse64("5.2").unwrap(), 5.2);
    assert_eq!(parse64("0.1").unwrap(), 0.1);
    assert_eq!(parse64(".5").unwrap(), 0.5);
    assert_eq!(parse64("5.").unwrap(), 5.0);
    assert_eq!(parse64("  +7  ").unwrap(), 7.0);
    assert_eq!(parse64("inf").unwrap(), f64::INFINITY);
    assert_eq!(parse64("-Infinity").unwrap(), f64::NEG_INFINITY);
    assert_eq!(parse64("@inf@").unwrap(), f64::INFINITY);
    assert!(parse64("nan").unwrap().is_nan());
    assert!(parse64("@NaN@").unwrap().is_nan());
    assert_eq!(parse64("3.2e1").unwrap(), 32.0);
    assert_eq!(parse64("44.e-1").unwrap(), 4.4);
    assert_eq!(parse64("54e-1").unwrap(), 5.4);
    assert_eq!(parse64("-54.85e-1").unwrap(), -5.485);
    assert_eq!(parse64("1E+3").unwrap(), 1000.0);
    assert_eq!(parse64("1@3").unwrap(), 1000.0);
    assert_eq!(parse64("-0").unwrap().to_bits(), (-0.0f64).to_bits());
    assert_eq!(parse64("1e400").unwrap(), f64::INFINITY);
    assert_eq!(parse64("2.2250738585072014e-308").unwrap(), f64::MIN_POSITIVE);
    assert_eq!(parse64("4.9e-324").unwrap(), f64::from_bits(1));
    assert_eq!(parse64("1e-999999999999").unwrap(), 0.0);
    assert_eq!(parse64("1e999999999999").unwrap(), f64::INFINITY);
    // The halfway point between 1 and the next double.
    assert_eq!(parse64("1.00000000000000011102230246251565404236316680908203125").unwrap(), 1.0);
    assert_eq!(
        parse64("1.00000000000000011102230246251565404236316680908203126").unwrap(),
        1.0 + f64::EPSILON
    );
}

#[test]
fn test_parse_radix() {
    let rm = RoundingMode::NearestTiesToEven;
    let parse = |text: &str, radix: u32| {
        Float::parse_radix(53, rm, text, radix).unwrap().to_f64(rm)
    };
    assert_eq!(parse("ff", 16), 255.0);
    assert_eq!(parse("0xff", 16), 255.0);
    assert_eq!(parse("0xFF", 0), 255.0);
    assert_eq!(parse("-0b101.1", 0), -5.5);
    assert_eq!(parse("101.1", 2), 5.5);
    assert_eq!(parse("1p10", 2), 1024.0);
    assert_eq!(parse("0x1.8p1", 0), 3.0);
    assert_eq!(parse("1e", 16), 30.0);
    assert_eq!(parse("1@2", 16), 256.0);
    assert_eq!(parse("z", 36), 35.0);
    assert_eq!(parse("0.1", 3), 1.0 / 3.0);
    assert_eq!(parse("12", 0), 12.0);
    assert_eq!(parse("0b1", 16), 177.0);
    // Letters are digits in radix 36.
    assert_eq!(parse("inf", 36), 24171.0);
    assert!(Float::parse_radix(53, rm, "@inf@", 36).unwrap().is_inf());
    assert!(matches!(
        Float::parse_radix(53, rm, "1", 37),
        Err(Error::InvalidRadix(37))
    ));
    assert!(matches!(
        Float::parse_radix(53, rm, "1", 1),
        Err(Error::InvalidRadix(1))
    ));
}

#[test]
fn test_parse_errors() {
    let err = |text: &str| match parse64(text) {
        Err(Error::Parse(err)) => (err.kind, err.position, err.offending),
        other => panic!("expected a parse error for {:?}, got {:?}", text, other),
    };
    assert_eq!(err(""), (ParseErrorKind::Empty, 0, String::new()));
    assert_eq!(err("   ").0, ParseErrorKind::Empty);
    assert_eq!(err("abc.de"), (ParseErrorKind::InvalidDigit, 0, "abc.de".to_string()));
    assert_eq!(err("12x4"), (ParseErrorKind::InvalidDigit, 2, "x4".to_string()));
    assert_eq!(err("  1.2.3"), (ParseErrorKind::InvalidDigit, 5, ".3".to_string()));
    assert_eq!(err("-rlp."), (ParseErrorKind::InvalidDigit, 1, "rlp.".to_string()));
    assert_eq!(err("e.-21"), (ParseErrorKind::MissingDigits, 0, "e.-21".to_string()));
    assert_eq!(err("-."), (ParseErrorKind::MissingDigits, 1, ".".to_string()));
    assert_eq!(err("1e"), (ParseErrorKind::InvalidExponent, 1, "e".to_string()));
    assert_eq!(err("1e+"), (ParseErrorKind::InvalidExponent, 1, "e+".to_string()));
    assert_eq!(err("1e5x"), (ParseErrorKind::InvalidExponent, 1, "e5x".to_string()));
    assert_eq!(err("1p3").0, ParseErrorKind::InvalidDigit);
}

#[test]
fn test_parse_rounding_modes() {
    use RoundingMode::*;
    let parse = |text: &str, rm| Float::parse_radix(53, rm, text, 10).unwrap();
    let down = parse("0.1", Zero);
    let up = parse("0.1", Positive);
    assert!(down < up);
    assert_eq!(up.to_f64(NearestTiesToEven), 0.1);
    assert_eq!(down.next_up(), up);
    // Exact values are not affected by the rounding mode.
    assert_eq!(parse("0.5", Zero), parse("0.5", Positive));
    let neg = parse("-0.1", Negative);
    assert_eq!(neg.to_f64(NearestTiesToEven), -0.1);
    assert!(neg < parse("-0.1", Zero));
}

#[test]
fn test_convert_to_string() {
    assert_eq!(print64(0.0), "0.0000000000000000");
    assert_eq!(print64(-0.0), "-0.0000000000000000");
    assert_eq!(print64(1.0), "1.0000000000000000");
    assert_eq!(print64(1.1), "1.1000000000000001");
    assert_eq!(print64(0.3), "0.29999999999999999");
    assert_eq!(print64(123.456), "123.45600000000000");
    assert_eq!(print64(-4.5), "-4.5000000000000000");
    assert_eq!(print64(0.0001), "0.00010000000000000000");
    assert_eq!(print64(1e-6), "9.9999999999999995e-7");
    assert_eq!(print64(1e16), "10000000000000000.");
    assert_eq!(print64(1e17), "1.0000000000000000e17");
    assert_eq!(print64(f64::INFINITY), "+infinity");
    assert_eq!(print64(f64::NEG_INFINITY), "-infinity");
    assert_eq!(print64(f64::NAN), "NaN");
    assert_eq!(print64(f64::MAX), "1.7976931348623157e308");
    assert_eq!(print64(f64::from_bits(1)), "4.9406564584124654e-324");

    let rm = RoundingMode::NearestTiesToEven;
    let x = Float::from_f64(53, rm, 1995.1995);
    assert_eq!(x.to_digits_string(10, Some(8), false, rm), "1995.1995");
    assert_eq!(x.to_digits_string(10, Some(3), false, rm), "2.00e3");
    assert_eq!(x.to_digits_string(10, Some(4), true, rm), "1.995e3");
    assert_eq!(x.to_digits_string(10, Some(1), false, rm), "2e3");
    assert_eq!(x.to_digits_string(10, Some(5), false, RoundingMode::Zero), "1995.1");
    assert_eq!(x.to_digits_string(10, Some(5), false, RoundingMode::Positive), "1995.2");
    assert_eq!(Float::from_f64(53, rm, 9.5).to_digits_string(10, Some(1), false, rm), "1e1");

    // Other radices.
    let x = Float::from_f64(53, rm, 255.5);
    assert_eq!(x.to_digits_string(16, Some(3), false, rm), "ff.8");
    assert_eq!(x.to_digits_string(16, Some(4), false, rm), "ff.80");
    assert_eq!(x.to_digits_string(2, Some(9), false, rm), "11111111.1");
    assert_eq!(x.to_digits_string(36, Some(3), false, rm), "73.i");
    assert_eq!(x.to_digits_string(36, Some(3), true, rm), "7.3i@1");
}

#[test]
fn test_default_digits() {
    assert_eq!(default_digits(53, 10), 17);
    assert_eq!(default_digits(24, 10), 9);
    assert_eq!(default_digits(113, 10), 36);
    assert_eq!(default_digits(53, 2), 54);
    assert_eq!(default_digits(53, 16), 15);
}

#[test]
fn test_bounded_radix_powers() {
    use crate::utils;
    let rm = RoundingMode::NearestTiesToEven;

    // Large powers of the radix are bracketed. Compare the digits with the
    // exact scaled value.
    let mut lfsr = utils::Lfsr::new();
    for radix in [10u32, 3, 36] {
        for _ in 0..20 {
            let x = lfsr.get_float(64, 20000);
            if !x.is_normal() {
                continue;
            }
            // Scale the number to about 20 digits.
            let log_r_2 = LN_2 / (radix as f64).ln();
            let d = (x.get_exp() as f64 * log_r_2) as i64;
            for k in [20 - d, 21 - d] {
                let odd = radix >> radix.trailing_zeros();
                let scale = BigUint::from(odd).pow(k.unsigned_abs() as u32);
                let e = x.get_lsb_exp() + k * radix.trailing_zeros() as i64;
                let m = x.get_mantissa().clone();
                let exact = if k >= 0 {
                    round_scaled(m * scale, BigUint::one(), e, x.get_sign(), rm)
                } else {
                    round_scaled(m, scale, e, x.get_sign(), rm)
                };
                assert_eq!(x.scaled_by_radix_power(radix, 20, k, rm), exact);
            }
        }
    }

    // Parsing far from one.
    let parse = |s: &str| Float::parse_radix(53, rm, s, 10).unwrap();
    assert_eq!(parse("1e-400").to_f64(rm), 0.0);
    let x = parse("1.5e123456789");
    let s = x.to_digits_string(10, None, false, rm);
    assert!(s.ends_with("e123456789"), "{}", s);
    assert_eq!(parse(&s), x);
    assert_eq!(x.to_digits_string(10, Some(5), false, rm), "1.5000e123456789");
    let y = parse("-1.5e-123456789");
    let s = y.to_digits_string(10, Some(5), false, rm);
    assert_eq!(s, "-1.5000e-123456789");
}

#[test]
fn test_print_parse_round_trip() {
    use crate::utils;
    let rm = RoundingMode::NearestTiesToEven;

    // Native doubles print with the default number of digits, and parse back
    // to the same bits.
    let mut lfsr = utils::Lfsr::new();
    for _ in 0..500 {
        let f0 = f64::from_bits(lfsr.get64());
        let s = print64(f0);
        let f1 = parse64(&s).unwrap();
        assert!((f0.is_nan() && f1.is_nan()) || f0.to_bits() == f1.to_bits(), "{}", s);
        if f0.is_finite() {
            assert_eq!(s.parse::<f64>().unwrap().to_bits(), f0.to_bits());
        }
    }

    // Wide numbers, in a few radices.
    for radix in [10, 3, 16, 36] {
        for _ in 0..50 {
            let x = lfsr.get_float(113, 5000);
            let s = x.to_digits_string(radix, None, false, rm);
            let y = Float::parse_radix(113, rm, &s, radix).unwrap();
            assert_eq!(x, y, "{}", s);
        }
    }
}
