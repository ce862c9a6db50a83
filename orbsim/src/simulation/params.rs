//! Numerical and physical parameters for a run
//!
//! `Parameters` holds:
//! - step size `dt` and number of steps,
//! - the gravitational constant `G`, resolved against an optional units tag

use serde::Deserialize;

use super::error::SimError;

/// Relative slack allowed between a configured G and the canonical value
/// of its units tag
const G_TOLERANCE: f64 = 1e-3;

/// Unit convention of the body data. Only used to pick or check `G`;
/// no conversion is ever performed.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    #[serde(rename = "km")] // km, kg, s
    Kilometres,

    #[serde(rename = "m")] // m, kg, s
    Metres,

    #[serde(rename = "natural")] // G = 1
    Natural,
}

impl Units {
    /// Canonical gravitational constant for this convention
    pub fn gravitational_constant(self) -> f64 {
        match self {
            Units::Kilometres => 6.67259e-20, // km^3 / kg / s^2
            Units::Metres => 6.67259e-11,     // m^3 / kg / s^2
            Units::Natural => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Units::Kilometres => "km",
            Units::Metres => "m",
            Units::Natural => "natural",
        }
    }

    /// Fail loudly when `g` does not belong to this unit system
    pub fn check(self, g: f64) -> Result<(), SimError> {
        let expected = self.gravitational_constant();
        if ((g - expected) / expected).abs() > G_TOLERANCE {
            return Err(SimError::UnitMismatch {
                units: self.label().to_owned(),
                expected,
                actual: g,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
#[allow(non_snake_case)]
pub struct Parameters {
    pub steps: usize, // number of steps
    pub dt: f64,      // step size
    pub G: f64,       // gravitational constant
    pub units: Option<Units>,
}

impl Parameters {
    /// Resolve `G` from an explicit value, a units tag, or both.
    /// Both given: they must agree. Neither: error.
    #[allow(non_snake_case)]
    pub fn resolve(steps: usize, dt: f64, G: Option<f64>, units: Option<Units>) -> Result<Self, SimError> {
        if !dt.is_finite() || dt == 0.0 {
            return Err(SimError::InvalidParameter(format!(
                "time step must be finite and non-zero, got {dt}"
            )));
        }

        let g = match (G, units) {
            (Some(g), Some(u)) => {
                u.check(g)?;
                g
            }
            (Some(g), None) => g,
            (None, Some(u)) => u.gravitational_constant(),
            (None, None) => {
                return Err(SimError::InvalidParameter(
                    "either G or units must be given".to_owned(),
                ))
            }
        };

        if !g.is_finite() || g <= 0.0 {
            return Err(SimError::InvalidParameter(format!(
                "gravitational constant must be finite and positive, got {g}"
            )));
        }

        Ok(Self {
            steps,
            dt,
            G: g,
            units,
        })
    }
}
