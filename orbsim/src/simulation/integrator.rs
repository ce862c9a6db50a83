//! Fixed-step integration strategies
//!
//! A strategy turns `(state, t, dt, derivative field)` into an increment
//! with the same shape as `state`. The caller applies it:
//! `new_state = state + increment * dt`. Strategies hold no per-run state
//! and never touch the system that supplies the derivative field.

use super::error::SimError;
use super::states::{StateMatrix, System};

/// Anything that can evaluate `d(state)/dt` at time `t`.
///
/// Implemented for [`System`] and for plain closures, so strategies can be
/// driven by an n-body system or by any other first-order ODE.
pub trait DerivativeSource {
    fn derivatives(&self, state: &StateMatrix, t: f64) -> Result<StateMatrix, SimError>;
}

impl DerivativeSource for System {
    fn derivatives(&self, state: &StateMatrix, t: f64) -> Result<StateMatrix, SimError> {
        self.state_derivatives(state, t)
    }
}

impl<F> DerivativeSource for F
where
    F: Fn(&StateMatrix, f64) -> Result<StateMatrix, SimError>,
{
    fn derivatives(&self, state: &StateMatrix, t: f64) -> Result<StateMatrix, SimError> {
        self(state, t)
    }
}

/// A stepping algorithm. Errors from the derivative source are returned
/// unchanged.
pub trait IntegrationStrategy {
    fn compute_increment(
        &self,
        state: &StateMatrix,
        t: f64,
        dt: f64,
        derivatives: &dyn DerivativeSource,
    ) -> Result<StateMatrix, SimError>;

    /// Order of the global error, `p` in `O(dt^p)`
    fn order(&self) -> u32;

    fn name(&self) -> &'static str;
}

/// Explicit Euler: the increment is the derivative at the start of the step.
/// First order; kept as a baseline and for cheap low-accuracy runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euler;

impl IntegrationStrategy for Euler {
    fn compute_increment(
        &self,
        state: &StateMatrix,
        t: f64,
        _dt: f64,
        derivatives: &dyn DerivativeSource,
    ) -> Result<StateMatrix, SimError> {
        evaluate(derivatives, state, t)
    }

    fn order(&self) -> u32 {
        1
    }

    fn name(&self) -> &'static str {
        "euler"
    }
}

/// Classical 4-stage Runge–Kutta.
///
/// ```text
/// f1 = f(y,             t)
/// f2 = f(y + f1 dt/2,   t + dt/2)
/// f3 = f(y + f2 dt/2,   t + dt/2)
/// f4 = f(y + f3 dt,     t + dt)
/// increment = (f1 + 2 f2 + 2 f3 + f4) / 6
/// ```
///
/// Every stage is evaluated on a freshly built hypothetical state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RungeKutta4;

impl IntegrationStrategy for RungeKutta4 {
    fn compute_increment(
        &self,
        state: &StateMatrix,
        t: f64,
        dt: f64,
        derivatives: &dyn DerivativeSource,
    ) -> Result<StateMatrix, SimError> {
        let half_dt = 0.5 * dt;

        let f1 = evaluate(derivatives, state, t)?;
        let f2 = evaluate(derivatives, &(state + &f1 * half_dt), t + half_dt)?;
        let f3 = evaluate(derivatives, &(state + &f2 * half_dt), t + half_dt)?;
        let f4 = evaluate(derivatives, &(state + &f3 * dt), t + dt)?;

        Ok((f1 + (f2 + f3) * 2.0 + f4) / 6.0)
    }

    fn order(&self) -> u32 {
        4
    }

    fn name(&self) -> &'static str {
        "rk4"
    }
}

/// Evaluate the field and make sure it answered with the shape it was asked
/// about; later stages add the result to the state
fn evaluate(derivatives: &dyn DerivativeSource, state: &StateMatrix, t: f64) -> Result<StateMatrix, SimError> {
    let f = derivatives.derivatives(state, t)?;
    if f.shape() != state.shape() {
        return Err(SimError::ShapeMismatch {
            expected_rows: state.nrows(),
            expected_cols: state.ncols(),
            rows: f.nrows(),
            cols: f.ncols(),
        });
    }
    Ok(f)
}
