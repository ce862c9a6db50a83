//! Error taxonomy for the integration core
//!
//! Every fallible operation in `simulation` returns [`SimError`]. Nothing
//! here is retried or logged; the caller decides policy (abort, shrink `dt`,
//! perturb the initial conditions, ...)

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Rejected physical or numerical parameter (mass, radius, G, dt, theta)
    InvalidParameter(String),

    /// A body was asked for its state but has no history
    EmptyHistory { body: String },

    /// State matrix does not line up with the system's bodies
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// Two bodies at zero separation (row indices into the state matrix)
    SingularConfiguration { first: usize, second: usize },

    /// NaN or infinity found in row `row` of a state matrix
    NonFiniteState { row: usize },

    /// Body names must be unique within a system
    DuplicateBody(String),

    /// Gravitational constant disagrees with the configured units tag
    UnitMismatch {
        units: String,
        expected: f64,
        actual: f64,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            SimError::EmptyHistory { body } => write!(f, "body '{body}' has an empty history"),
            SimError::ShapeMismatch {
                expected_rows,
                expected_cols,
                rows,
                cols,
            } => write!(
                f,
                "state matrix is {rows}x{cols}, expected {expected_rows}x{expected_cols}"
            ),
            SimError::SingularConfiguration { first, second } => write!(
                f,
                "bodies {first} and {second} are at zero separation; gravitational force is undefined"
            ),
            SimError::NonFiniteState { row } => {
                write!(f, "state row {row} contains a non-finite value")
            }
            SimError::DuplicateBody(name) => write!(f, "duplicate body name '{name}'"),
            SimError::UnitMismatch {
                units,
                expected,
                actual,
            } => write!(
                f,
                "G = {actual:e} is inconsistent with units '{units}' (expected {expected:e})"
            ),
        }
    }
}

impl std::error::Error for SimError {}
