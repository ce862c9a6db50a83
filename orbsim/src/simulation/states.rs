//! Core state types for the N-body simulation.
//!
//! - `Body`   holds static parameters and an append-only history of
//!   `[x, y, z, vx, vy, vz]` states
//! - `System` owns the bodies in a fixed order, stacks their latest states
//!   into an `N x 6` matrix and evaluates the derivative field
//!
//! Rows of every state matrix correspond to bodies in collection order.

use std::collections::HashSet;
use std::fmt;

use nalgebra::{DMatrix, Vector3, Vector6};

use super::error::SimError;
use super::forces::{Acceleration, NewtonianGravity, PointMasses};

pub type NVec3 = Vector3<f64>;
pub type StateVector = Vector6<f64>;
pub type StateMatrix = DMatrix<f64>;

/// Width of a body state: position then velocity
pub const STATE_WIDTH: usize = 6;

#[derive(Debug, Clone)]
pub struct Body {
    name: String,
    mass: f64,
    radius: Option<f64>, // informational only, never used in dynamics
    history: Vec<StateVector>,
}

impl Body {
    /// Create a body and seed its history with the initial condition
    pub fn new(
        name: impl Into<String>,
        mass: f64,
        radius: Option<f64>,
        initial_position: NVec3,
        initial_velocity: NVec3,
    ) -> Result<Self, SimError> {
        let name = name.into();

        if !mass.is_finite() || mass <= 0.0 {
            return Err(SimError::InvalidParameter(format!(
                "mass of '{name}' must be finite and positive, got {mass}"
            )));
        }
        if let Some(r) = radius {
            if !r.is_finite() || r < 0.0 {
                return Err(SimError::InvalidParameter(format!(
                    "radius of '{name}' must be finite and non-negative, got {r}"
                )));
            }
        }
        if !initial_position.iter().chain(initial_velocity.iter()).all(|c| c.is_finite()) {
            return Err(SimError::InvalidParameter(format!(
                "initial conditions of '{name}' must be finite"
            )));
        }

        let initial = StateVector::new(
            initial_position.x,
            initial_position.y,
            initial_position.z,
            initial_velocity.x,
            initial_velocity.y,
            initial_velocity.z,
        );

        Ok(Self {
            name,
            mass,
            radius,
            history: vec![initial],
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> Option<f64> {
        self.radius
    }

    /// Most recent committed state
    pub fn current_state(&self) -> Result<&StateVector, SimError> {
        self.history.last().ok_or_else(|| SimError::EmptyHistory {
            body: self.name.clone(),
        })
    }

    pub fn position(&self) -> Result<NVec3, SimError> {
        Ok(self.current_state()?.fixed_rows::<3>(0).into_owned())
    }

    pub fn velocity(&self) -> Result<NVec3, SimError> {
        Ok(self.current_state()?.fixed_rows::<3>(3).into_owned())
    }

    /// Append a state. Plausibility checks belong to [`System::update_state`]
    pub fn update_state(&mut self, new_state: StateVector) {
        self.history.push(new_state);
    }

    /// Committed states in chronological order
    pub fn history(&self) -> &[StateVector] {
        &self.history
    }

    /// History stacked as a `steps x 6` matrix
    pub fn history_matrix(&self) -> StateMatrix {
        StateMatrix::from_fn(self.history.len(), STATE_WIDTH, |step, k| self.history[step][k])
    }
}

/// Ordered collection of bodies plus the gravitational constant and the
/// force model used to evaluate accelerations.
///
/// Body order is fixed at construction; it defines the row index of each
/// body in every state matrix handed in or out.
pub struct System {
    bodies: Vec<Body>,
    g: f64, // gravitational constant, in the units of the body data
    forces: Box<dyn Acceleration + Send + Sync>,
}

impl fmt::Debug for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("bodies", &self.bodies)
            .field("g", &self.g)
            .field("forces", &self.forces.name())
            .finish()
    }
}

impl System {
    /// Build a system using direct Newtonian summation
    pub fn new(bodies: Vec<Body>, g: f64) -> Result<Self, SimError> {
        if !g.is_finite() || g <= 0.0 {
            return Err(SimError::InvalidParameter(format!(
                "gravitational constant must be finite and positive, got {g}"
            )));
        }

        let mut seen = HashSet::with_capacity(bodies.len());
        for b in &bodies {
            if !seen.insert(b.name()) {
                return Err(SimError::DuplicateBody(b.name().to_owned()));
            }
        }

        Ok(Self {
            bodies,
            g,
            forces: Box::new(NewtonianGravity),
        })
    }

    /// Swap the force evaluation scheme
    pub fn with_force_model<F>(mut self, model: F) -> Self
    where
        F: Acceleration + Send + Sync + 'static,
    {
        self.forces = Box::new(model);
        self
    }

    pub fn set_force_model(&mut self, model: Box<dyn Acceleration + Send + Sync>) {
        self.forces = model;
    }

    pub fn force_model_name(&self) -> &'static str {
        self.forces.name()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.name() == name)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn gravitational_constant(&self) -> f64 {
        self.g
    }

    pub fn masses(&self) -> Vec<f64> {
        self.bodies.iter().map(Body::mass).collect()
    }

    /// Latest state of every body stacked as an `N x 6` matrix.
    /// Built fresh on each call.
    pub fn current_state(&self) -> Result<StateMatrix, SimError> {
        let mut state = StateMatrix::zeros(self.bodies.len(), STATE_WIDTH);
        for (i, b) in self.bodies.iter().enumerate() {
            for (k, value) in b.current_state()?.iter().enumerate() {
                state[(i, k)] = *value;
            }
        }
        Ok(state)
    }

    /// Commit one step. The whole matrix is validated before any body is
    /// touched, so either every body gets its new row or none does.
    pub fn update_state(&mut self, state: &StateMatrix) -> Result<(), SimError> {
        self.check_shape(state)?;
        check_finite(state)?;

        for (i, b) in self.bodies.iter_mut().enumerate() {
            let row = StateVector::from_iterator(state.row(i).iter().copied());
            b.update_state(row);
        }
        Ok(())
    }

    /// Derivative field `d(state)/dt` for any admissible state matrix.
    ///
    /// Rows are `[vx, vy, vz, ax, ay, az]`: velocities copied from the
    /// input, accelerations from the force model. Pure: neither the bodies
    /// nor the system are modified. `t` is unused by Newtonian gravity.
    pub fn state_derivatives(&self, state: &StateMatrix, t: f64) -> Result<StateMatrix, SimError> {
        self.check_shape(state)?;
        check_finite(state)?;

        let n = self.bodies.len();
        let positions: Vec<NVec3> = (0..n)
            .map(|i| NVec3::new(state[(i, 0)], state[(i, 1)], state[(i, 2)]))
            .collect();
        let masses = self.masses();

        let field = PointMasses {
            g: self.g,
            masses: &masses,
            positions: &positions,
        };

        let mut accels = vec![NVec3::zeros(); n];
        self.forces.acceleration(t, &field, &mut accels)?;

        let mut derivatives = StateMatrix::zeros(n, STATE_WIDTH);
        for (i, a) in accels.iter().enumerate() {
            if !a.iter().all(|c| c.is_finite()) {
                return Err(SimError::NonFiniteState { row: i });
            }
            for k in 0..3 {
                derivatives[(i, k)] = state[(i, k + 3)];
                derivatives[(i, k + 3)] = a[k];
            }
        }
        Ok(derivatives)
    }

    /// Total linear momentum `sum m_i v_i` of the current state
    pub fn total_momentum(&self) -> Result<NVec3, SimError> {
        self.bodies.iter().try_fold(NVec3::zeros(), |acc, b| {
            Ok::<_, SimError>(acc + b.velocity()? * b.mass())
        })
    }

    /// Mass-weighted mean position of the current state
    pub fn center_of_mass(&self) -> Result<NVec3, SimError> {
        let total: f64 = self.bodies.iter().map(Body::mass).sum();
        let weighted = self.bodies.iter().try_fold(NVec3::zeros(), |acc, b| {
            Ok::<_, SimError>(acc + b.position()? * b.mass())
        })?;
        if total > 0.0 {
            Ok(weighted / total)
        } else {
            Ok(NVec3::zeros())
        }
    }

    /// Kinetic plus pairwise gravitational potential energy
    pub fn total_energy(&self) -> Result<f64, SimError> {
        let mut kinetic = 0.0;
        let mut potential = 0.0;
        for (i, bi) in self.bodies.iter().enumerate() {
            kinetic += 0.5 * bi.mass() * bi.velocity()?.norm_squared();
            let xi = bi.position()?;
            for (j, bj) in self.bodies.iter().enumerate().skip(i + 1) {
                let d = (bj.position()? - xi).norm();
                if d == 0.0 {
                    return Err(SimError::SingularConfiguration { first: i, second: j });
                }
                potential -= self.g * bi.mass() * bj.mass() / d;
            }
        }
        Ok(kinetic + potential)
    }

    fn check_shape(&self, state: &StateMatrix) -> Result<(), SimError> {
        if state.nrows() != self.bodies.len() || state.ncols() != STATE_WIDTH {
            return Err(SimError::ShapeMismatch {
                expected_rows: self.bodies.len(),
                expected_cols: STATE_WIDTH,
                rows: state.nrows(),
                cols: state.ncols(),
            });
        }
        Ok(())
    }
}

fn check_finite(state: &StateMatrix) -> Result<(), SimError> {
    for (i, row) in state.row_iter().enumerate() {
        if !row.iter().all(|c| c.is_finite()) {
            return Err(SimError::NonFiniteState { row: i });
        }
    }
    Ok(())
}
