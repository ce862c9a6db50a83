//! High-level runtime engine settings
//!
//! Selects the integration strategy and the force model used when building
//! and running a `Scenario`

use crate::configuration::config::{EngineConfig, ForceConfig, IntegratorConfig};

use super::error::SimError;
use super::forces::{Acceleration, NewtonianGravity, NewtonianGravityBarnesHut, ParallelNewtonianGravity};
use super::integrator::{Euler, IntegrationStrategy, RungeKutta4};

/// Default Barnes–Hut opening angle
pub const DEFAULT_THETA: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Engine {
    pub integrator: IntegratorConfig, // euler or rk4
    pub force: ForceConfig,           // direct, direct_parallel or barnes_hut
    pub theta: f64,                   // opening angle, barnes_hut only
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            integrator: IntegratorConfig::Rk4,
            force: ForceConfig::Direct,
            theta: DEFAULT_THETA,
        }
    }
}

impl From<&EngineConfig> for Engine {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            integrator: cfg.integrator,
            force: cfg.force,
            theta: cfg.theta.unwrap_or(DEFAULT_THETA),
        }
    }
}

impl Engine {
    pub fn strategy(&self) -> Box<dyn IntegrationStrategy + Send + Sync> {
        match self.integrator {
            IntegratorConfig::Euler => Box::new(Euler),
            IntegratorConfig::Rk4 => Box::new(RungeKutta4),
        }
    }

    pub fn force_model(&self) -> Result<Box<dyn Acceleration + Send + Sync>, SimError> {
        Ok(match self.force {
            ForceConfig::Direct => Box::new(NewtonianGravity),
            ForceConfig::DirectParallel => Box::new(ParallelNewtonianGravity),
            ForceConfig::BarnesHut => Box::new(NewtonianGravityBarnesHut::new(self.theta)?),
        })
    }
}
