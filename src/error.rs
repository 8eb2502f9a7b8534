//! This module contains the error types reported by field construction,
//! parsing and mixed-field arithmetic.

use crate::context::Context;
use thiserror::Error;

/// The crate-wide result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by the library. Mathematical degeneracies such as 1/0 or
/// inf-inf are not errors, they produce Inf or NaN values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid precision {precision}: must be in the range [{min}, {max}]")]
    InvalidPrecision {
        precision: usize,
        min: usize,
        max: usize,
    },
    #[error("invalid rounding mode '{0}'")]
    InvalidRoundingMode(String),
    #[error("invalid radix {0}: must be 0 (auto) or in the range [2, 36]")]
    InvalidRadix(u32),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("incompatible real fields: {left} and {right}")]
    IncompatibleRings { left: Context, right: Context },
}

/// The reason a string could not be parsed into a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The input was empty (or only whitespace).
    Empty,
    /// A character that is not a digit of the radix.
    InvalidDigit,
    /// No digits in the significand.
    MissingDigits,
    /// The exponent after the marker is malformed.
    InvalidExponent,
}

impl ParseErrorKind {
    pub fn as_string(&self) -> &str {
        match self {
            ParseErrorKind::Empty => "the input provided was empty",
            ParseErrorKind::InvalidDigit => "invalid digit",
            ParseErrorKind::MissingDigits => "no digits in the number",
            ParseErrorKind::InvalidExponent => "failed parsing the exponent",
        }
    }
}

/// Reports a malformed number. Keeps the whole input, the byte offset of
/// the problem, and the offending substring.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: '{offending}' at position {position} in '{input}'", .kind.as_string())]
pub struct ParseError {
    pub input: String,
    pub position: usize,
    pub offending: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(input: &str, position: usize, kind: ParseErrorKind) -> Self {
        let position = position.min(input.len());
        // Report the rest of the token from the bad character on.
        let offending = input[position..].to_string();
        ParseError {
            input: input.to_string(),
            position,
            offending,
            kind,
        }
    }
}

#[test]
fn test_parse_error_message() {
    let err = ParseError::new("12x4", 2, ParseErrorKind::InvalidDigit);
    assert_eq!(err.offending, "x4");
    assert_eq!(
        err.to_string(),
        "invalid digit: 'x4' at position 2 in '12x4'"
    );
    let err: Error = err.into();
    assert!(matches!(err, Error::Parse(_)));
}
