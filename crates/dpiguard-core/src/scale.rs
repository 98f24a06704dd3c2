//! Scale sanitization.
//!
//! Platform-reported scale factors are treated as hostile input: they can be
//! missing, non-numeric, non-finite, zero, negative or absurdly large. Every
//! value the rest of the crate sees goes through [`sanitize`] first.

use std::fmt;

/// Upper bound for any scale factor we are willing to apply.
pub const MAX_SCALE: f64 = 5.0;

/// Scale assumed when the host gives us nothing usable.
pub const UNSCALED: f64 = 1.0;

/// DPI reported for a scale factor of 1.0.
pub const DPI_PER_SCALE: f64 = 96.0;

/// A scale value of unknown provenance, exactly as the host reported it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawScale {
    Missing,
    Number(f64),
    Text(String),
}

impl From<f64> for RawScale {
    fn from(value: f64) -> Self {
        RawScale::Number(value)
    }
}

impl From<Option<f64>> for RawScale {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawScale::Missing, RawScale::Number)
    }
}

impl From<&str> for RawScale {
    fn from(value: &str) -> Self {
        RawScale::Text(value.to_string())
    }
}

impl From<ScaleFactor> for RawScale {
    fn from(value: ScaleFactor) -> Self {
        RawScale::Number(value.get())
    }
}

/// A scale factor that is known to be finite and within `(0, MAX_SCALE]`.
///
/// Only [`sanitize`] produces one.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub fn get(self) -> f64 {
        self.0
    }

    /// Converts to a DPI-like unit, rounded to the nearest integer.
    pub fn to_dpi(self, dpi_per_scale: f64) -> u32 {
        (self.0 * dpi_per_scale).round().max(0.0) as u32
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        ScaleFactor(UNSCALED)
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The DPI unit to convert with: `dpi_per_scale` when it is finite and
/// positive, [`DPI_PER_SCALE`] otherwise.
///
/// Every DPI comparison must agree on the unit, so callers normalise once and
/// pass the result around.
pub fn dpi_unit(dpi_per_scale: f64) -> f64 {
    if dpi_per_scale.is_finite() && dpi_per_scale > 0.0 {
        dpi_per_scale
    } else {
        DPI_PER_SCALE
    }
}

/// Produce a safe scale factor from whatever the host handed us.
///
/// - missing, non-numeric or non-finite -> 1.0
/// - zero or negative -> 1.0
/// - above [`MAX_SCALE`] -> [`MAX_SCALE`]
/// - anything else passes through unchanged
pub fn sanitize(raw: impl Into<RawScale>) -> ScaleFactor {
    let value = match raw.into() {
        RawScale::Missing => return ScaleFactor::default(),
        RawScale::Number(n) => n,
        RawScale::Text(text) => match text.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => return ScaleFactor::default(),
        },
    };

    if !value.is_finite() || value <= 0.0 {
        return ScaleFactor::default();
    }
    if value > MAX_SCALE {
        return ScaleFactor(MAX_SCALE);
    }
    ScaleFactor(value)
}
