use crate::{Error, RealField, RealNumber, RoundingMode};
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        match err {
            Error::IncompatibleRings { .. } => PyTypeError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// A field of real numbers with a fixed precision and rounding mode.
///
/// Args:
///     precision: The number of bits in the mantissa (at least 2)
///     rounding: The rounding mode: "RNDN", "RNDZ", "RNDU", "RNDD", "RNDA",
///         or one of the names "NearestTiesToEven", "NearestTiesToAway",
///         "Zero", "Positive", "Negative", "Away"
///     scientific: Print numbers in scientific notation
#[pyclass(name = "RealField", frozen)]
struct PyRealField {
    inner: RealField,
}

#[pymethods]
impl PyRealField {
    #[new]
    #[pyo3(signature = (precision=53, rounding="RNDN", scientific=false))]
    fn new(precision: usize, rounding: &str, scientific: bool) -> PyResult<Self> {
        let rm: RoundingMode = rounding.parse()?;
        Ok(PyRealField {
            inner: RealField::new(precision, rm, scientific)?,
        })
    }
    /// Returns the number zero.
    fn zero(&self) -> PyRealNumber {
        self.inner.zero().into()
    }
    /// Returns the number one.
    fn one(&self) -> PyRealNumber {
        self.inner.one().into()
    }
    /// Parse a number from a string in the radix `base`.
    #[pyo3(signature = (text, base=10))]
    fn parse(&self, text: &str, base: u32) -> PyResult<PyRealNumber> {
        Ok(self.inner.from_str_radix(text, base)?.into())
    }
    /// Returns a number with the integer value 'val'.
    fn from_int(&self, val: i64) -> PyRealNumber {
        self.inner.from_i64(val).into()
    }
    /// Returns the rounded value of the float 'val'.
    fn from_float(&self, val: f64) -> PyRealNumber {
        self.inner.from_f64(val).into()
    }
    fn __call__(&self, val: f64) -> PyRealNumber {
        self.from_float(val)
    }
    /// Returns the precision in bits.
    fn precision(&self) -> usize {
        self.inner.precision()
    }
    /// Returns the rounding mode as a string.
    fn rounding_mode(&self) -> String {
        self.inner.rounding_mode().as_string().to_string()
    }
    fn __str__(&self) -> String {
        self.inner.to_string()
    }
    fn __repr__(&self) -> String {
        format!("RealField({})", self.inner.context())
    }
}

/// A real number that belongs to a RealField.
#[pyclass(name = "RealNumber", frozen)]
struct PyRealNumber {
    inner: RealNumber,
}

impl From<RealNumber> for PyRealNumber {
    fn from(inner: RealNumber) -> Self {
        PyRealNumber { inner }
    }
}

#[pymethods]
impl PyRealNumber {
    fn __add__(&self, other: &PyRealNumber) -> PyResult<PyRealNumber> {
        Ok(self.inner.add(&other.inner)?.into())
    }
    fn __sub__(&self, other: &PyRealNumber) -> PyResult<PyRealNumber> {
        Ok(self.inner.sub(&other.inner)?.into())
    }
    fn __mul__(&self, other: &PyRealNumber) -> PyResult<PyRealNumber> {
        Ok(self.inner.mul(&other.inner)?.into())
    }
    fn __truediv__(&self, other: &PyRealNumber) -> PyResult<PyRealNumber> {
        Ok(self.inner.div(&other.inner)?.into())
    }
    /// Returns the IEEE remainder of the division of two numbers.
    fn __mod__(&self, other: &PyRealNumber) -> PyResult<PyRealNumber> {
        Ok(self.inner.rem(&other.inner)?.into())
    }
    fn __neg__(&self) -> PyRealNumber {
        (-&self.inner).into()
    }
    fn __abs__(&self) -> PyRealNumber {
        self.inner.abs().into()
    }
    fn __eq__(&self, other: &PyRealNumber) -> bool {
        self.inner == other.inner
    }
    fn __lt__(&self, other: &PyRealNumber) -> bool {
        self.inner < other.inner
    }
    fn __le__(&self, other: &PyRealNumber) -> bool {
        self.inner <= other.inner
    }
    fn __gt__(&self, other: &PyRealNumber) -> bool {
        self.inner > other.inner
    }
    fn __ge__(&self, other: &PyRealNumber) -> bool {
        self.inner >= other.inner
    }
    /// Returns the square root of the number.
    fn sqrt(&self) -> PyRealNumber {
        self.inner.sqrt().into()
    }
    /// Returns the number raised to the power of `n` which is an integer.
    fn powi(&self, n: i64) -> PyRealNumber {
        self.inner.powi(n).into()
    }
    /// Convert the number to a Continued Fraction of two integers.
    /// Take 'n' iterations.
    fn as_fraction(&self, n: usize) -> (String, String) {
        let (a, b) = self.inner.as_fraction(n);
        (a.to_string(), b.to_string())
    }
    fn __float__(&self) -> f64 {
        self.inner.to_f64()
    }
    /// Format the number with `digits` significant digits in radix `base`.
    #[pyo3(signature = (digits=None, base=10))]
    fn format(&self, digits: Option<usize>, base: u32) -> PyResult<String> {
        Ok(self.inner.to_string_radix(base, digits)?)
    }
    fn __str__(&self) -> String {
        self.inner.to_string()
    }
    fn __repr__(&self) -> String {
        format!("{:?}", self.inner)
    }
    /// Returns true if the number is a NaN.
    fn is_nan(&self) -> bool {
        self.inner.is_nan()
    }
    /// Returns true if the number is +-inf.
    fn is_infinite(&self) -> bool {
        self.inner.is_infinite()
    }
    /// Returns -1, 0 or 1.
    fn sign(&self) -> i32 {
        self.inner.sign()
    }
    /// Returns the precision of the field of the number.
    fn precision(&self) -> usize {
        self.inner.precision()
    }
    /// Returns the field of the number.
    fn parent(&self) -> PyRealField {
        PyRealField {
            inner: self.inner.parent().clone(),
        }
    }
}

#[pymodule]
fn realfield(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyRealField>()?;
    m.add_class::<PyRealNumber>()?;
    Ok(())
}
