//! Arbitrary-precision binary floating point numbers, organized as real
//! fields. A `RealField` fixes a precision and a rounding mode, and every
//! `RealNumber` created in the field is rounded to that precision.
//!
//! ```
//! use realfield::{RealField, RoundingMode};
//!
//! let field = RealField::new(100, RoundingMode::NearestTiesToEven, false).unwrap();
//! let third = field.from_rational(1, 3);
//! let x = third.add(&third).unwrap();
//! assert_eq!(x.to_string_digits(Some(5)), "0.66667");
//! ```

mod arithmetic;
mod cast;
mod context;
mod error;
mod field;
mod float;
mod functions;
mod number;
mod string;

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod utils;

#[cfg(feature = "python")]
mod py;

pub use self::context::{
    Context, RoundingMode, DEFAULT_PRECISION, MAX_EXPONENT, MAX_PRECISION,
    MIN_EXPONENT, MIN_PRECISION,
};
pub use self::error::{Error, ParseError, ParseErrorKind, Result};
pub use self::field::RealField;
pub use self::number::RealNumber;
pub use num_bigint::{BigInt, BigUint};
