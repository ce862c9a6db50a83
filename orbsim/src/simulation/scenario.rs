//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - system state (`System` with every body at its initial condition)
//! - the stepping loop (`Driver`) with the configured strategy

use crate::configuration::config::ScenarioConfig;

use super::driver::Driver;
use super::engine::Engine;
use super::error::SimError;
use super::params::Parameters;
use super::states::System;

pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: System,
    pub driver: Driver,
}

impl Scenario {
    pub fn build_scenario(cfg: &ScenarioConfig) -> Result<Self, SimError> {
        let p_cfg = &cfg.parameters;
        let parameters = Parameters::resolve(p_cfg.steps, p_cfg.dt, p_cfg.G, p_cfg.units)?;

        let engine = Engine::from(&cfg.engine);

        let bodies = cfg.bodies.to_bodies()?;
        let mut system = System::new(bodies, parameters.G)?;
        system.set_force_model(engine.force_model()?);

        let driver = Driver::from_boxed(engine.strategy());

        Ok(Self {
            engine,
            parameters,
            system,
            driver,
        })
    }

    /// Run the configured number of steps; returns the final time
    pub fn run(&mut self) -> Result<f64, SimError> {
        self.driver
            .evolve(&mut self.system, self.parameters.dt, self.parameters.steps)
    }
}
