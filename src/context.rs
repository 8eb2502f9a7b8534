//! This module contains the precision and rounding descriptor that every
//! real field is built from.

use crate::error::{Error, Result};
use core::fmt::Display;
use core::hash::{Hash, Hasher};
use core::str::FromStr;

/// Defines the supported rounding modes.
/// See IEEE754-2019 Section 4.3 Rounding-direction attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoundingMode {
    #[default]
    NearestTiesToEven,
    NearestTiesToAway,
    /// Toward zero.
    Zero,
    /// Toward +Inf.
    Positive,
    /// Toward -Inf.
    Negative,
    /// Away from zero.
    Away,
}

impl RoundingMode {
    /// Create a rounding mode from a token. Accepts the variant names and
    /// the short MPFR names (RNDN, RNDZ, RNDU, RNDD, RNDA).
    pub fn from_string(s: &str) -> Option<Self> {
        let s = s.trim();
        let all = [
            RoundingMode::NearestTiesToEven,
            RoundingMode::NearestTiesToAway,
            RoundingMode::Zero,
            RoundingMode::Positive,
            RoundingMode::Negative,
            RoundingMode::Away,
        ];
        all.into_iter().find(|rm| {
            rm.as_string().eq_ignore_ascii_case(s)
                || rm.short_name().is_some_and(|n| n.eq_ignore_ascii_case(s))
        })
    }

    pub fn as_string(&self) -> &'static str {
        match self {
            RoundingMode::NearestTiesToEven => "NearestTiesToEven",
            RoundingMode::NearestTiesToAway => "NearestTiesToAway",
            RoundingMode::Zero => "Zero",
            RoundingMode::Positive => "Positive",
            RoundingMode::Negative => "Negative",
            RoundingMode::Away => "Away",
        }
    }

    fn short_name(&self) -> Option<&'static str> {
        match self {
            RoundingMode::NearestTiesToEven => Some("RNDN"),
            RoundingMode::Zero => Some("RNDZ"),
            RoundingMode::Positive => Some("RNDU"),
            RoundingMode::Negative => Some("RNDD"),
            RoundingMode::Away => Some("RNDA"),
            RoundingMode::NearestTiesToAway => None,
        }
    }

    /// Returns true for the two round-to-nearest modes.
    pub fn is_nearest(&self) -> bool {
        matches!(
            self,
            RoundingMode::NearestTiesToEven | RoundingMode::NearestTiesToAway
        )
    }

    /// Returns the mode for rounding printed digits, such that parsing the
    /// digits with this mode produces the printed number. The directed modes
    /// print the digits on the other side of the number.
    pub(crate) fn for_printing(&self) -> Self {
        match self {
            RoundingMode::Zero => RoundingMode::Away,
            RoundingMode::Away => RoundingMode::Zero,
            RoundingMode::Positive => RoundingMode::Negative,
            RoundingMode::Negative => RoundingMode::Positive,
            nearest => *nearest,
        }
    }
}

impl Display for RoundingMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_string())
    }
}

impl FromStr for RoundingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
            .ok_or_else(|| Error::InvalidRoundingMode(s.to_string()))
    }
}

/// The smallest supported precision, in bits.
pub const MIN_PRECISION: usize = 2;
/// The largest supported precision, in bits.
pub const MAX_PRECISION: usize = 1 << 24;
/// The default precision matches the IEEE double.
pub const DEFAULT_PRECISION: usize = 53;

/// Numbers are normalized as 0.1xxxx * 2^E, and E must be in the range
/// [MIN_EXPONENT, MAX_EXPONENT].
pub const MAX_EXPONENT: i64 = (1 << 30) - 1;
pub const MIN_EXPONENT: i64 = -MAX_EXPONENT;

/// Describes the precision and rounding behavior of a real field. The
/// scientific-notation flag only affects printing, and is not part of the
/// identity of the context (see `PartialEq`).
#[derive(Debug, Clone, Copy)]
pub struct Context {
    precision: usize,
    rm: RoundingMode,
    scientific: bool,
}

impl Context {
    /// Create a new context. Fails if the precision is out of the range
    /// [MIN_PRECISION, MAX_PRECISION].
    pub fn new(
        precision: usize,
        rm: RoundingMode,
        scientific: bool,
    ) -> Result<Self> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            tracing::debug!(precision, "rejected precision");
            return Err(Error::InvalidPrecision {
                precision,
                min: MIN_PRECISION,
                max: MAX_PRECISION,
            });
        }
        Ok(Context {
            precision,
            rm,
            scientific,
        })
    }

    /// Create a context with the rounding mode given as a string token.
    pub fn with_rounding_token(
        precision: usize,
        rm: &str,
        scientific: bool,
    ) -> Result<Self> {
        let rm: RoundingMode = rm.parse()?;
        Self::new(precision, rm, scientific)
    }

    /// Returns the precision in bits.
    pub fn get_precision(&self) -> usize {
        self.precision
    }

    /// Returns the rounding mode.
    pub fn get_rounding_mode(&self) -> RoundingMode {
        self.rm
    }

    /// Returns true if numbers should be printed in scientific notation.
    pub fn scientific_notation(&self) -> bool {
        self.scientific
    }

    /// Returns a copy of the context with a different rounding mode.
    pub fn with_rounding_mode(&self, rm: RoundingMode) -> Self {
        Context { rm, ..*self }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context {
            precision: DEFAULT_PRECISION,
            rm: RoundingMode::NearestTiesToEven,
            scientific: false,
        }
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.precision == other.precision && self.rm == other.rm
    }
}

impl Eq for Context {}

impl Hash for Context {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.precision.hash(state);
        self.rm.hash(state);
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "(precision:{} rm:{})", self.precision, self.rm)
    }
}

#[test]
fn test_rounding_mode_tokens() {
    assert_eq!(
        RoundingMode::from_string("RNDN"),
        Some(RoundingMode::NearestTiesToEven)
    );
    assert_eq!(RoundingMode::from_string("rndz"), Some(RoundingMode::Zero));
    assert!(RoundingMode::NearestTiesToAway.is_nearest());
    assert!(!RoundingMode::Away.is_nearest());
    assert_eq!(RoundingMode::Zero.for_printing(), RoundingMode::Away);
    assert_eq!(RoundingMode::Negative.for_printing(), RoundingMode::Positive);
    assert_eq!(
        RoundingMode::NearestTiesToAway.for_printing(),
        RoundingMode::NearestTiesToAway
    );
    assert_eq!(
        RoundingMode::from_string("Positive"),
        Some(RoundingMode::Positive)
    );
    assert_eq!(RoundingMode::from_string("RNDA"), Some(RoundingMode::Away));
    assert_eq!(
        RoundingMode::from_string("nearestTiesToAway"),
        Some(RoundingMode::NearestTiesToAway)
    );
    assert!(RoundingMode::from_string("RNDX").is_none());

    let err = "sideways".parse::<RoundingMode>().unwrap_err();
    assert_eq!(err, Error::InvalidRoundingMode("sideways".to_string()));
}

#[test]
fn test_context_bounds() {
    assert!(Context::new(2, RoundingMode::Zero, false).is_ok());
    assert!(Context::new(MAX_PRECISION, RoundingMode::Zero, false).is_ok());
    for p in [0, 1, MAX_PRECISION + 1] {
        let err = Context::new(p, RoundingMode::Zero, false).unwrap_err();
        assert!(matches!(err, Error::InvalidPrecision { precision, .. } if precision == p));
    }
    assert!(matches!(
        Context::with_rounding_token(10, "bogus", false),
        Err(Error::InvalidRoundingMode(_))
    ));
}

#[test]
fn test_context_identity() {
    let a = Context::new(64, RoundingMode::Zero, false).unwrap();
    let b = Context::new(64, RoundingMode::Zero, true).unwrap();
    let c = Context::new(64, RoundingMode::Positive, false).unwrap();
    let d = Context::new(65, RoundingMode::Zero, false).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
    assert_eq!(Context::default().get_precision(), 53);
    assert_eq!(a.to_string(), "(precision:64 rm:Zero)");
    assert_eq!(a.with_rounding_mode(RoundingMode::Positive), c);
}
