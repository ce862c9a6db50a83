//! The stepping loop tying a [`System`] to an [`IntegrationStrategy`]
//!
//! Per step: read `y = system.current_state()`, ask the strategy for an
//! increment using the system's derivative field, commit
//! `y + increment * dt`, then advance time by `dt` (`t_{n+1} = t_n + dt`).
//! A step either commits for every body or leaves the system, the clock and
//! the step counter untouched.

use super::error::SimError;
use super::integrator::IntegrationStrategy;
use super::states::System;

pub struct Driver {
    strategy: Box<dyn IntegrationStrategy + Send + Sync>,
    time: f64,   // simulation time of the last committed state
    steps: usize, // committed steps
}

impl Driver {
    pub fn new<S>(strategy: S) -> Self
    where
        S: IntegrationStrategy + Send + Sync + 'static,
    {
        Self::from_boxed(Box::new(strategy))
    }

    pub fn from_boxed(strategy: Box<dyn IntegrationStrategy + Send + Sync>) -> Self {
        Self {
            strategy,
            time: 0.0,
            steps: 0,
        }
    }

    /// Start the clock somewhere other than `t = 0`
    pub fn starting_at(mut self, t0: f64) -> Self {
        self.time = t0;
        self
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Advance the system by one step of size `dt`
    pub fn step(&mut self, system: &mut System, dt: f64) -> Result<(), SimError> {
        check_dt(dt)?;

        let y = system.current_state()?;
        let increment = self.strategy.compute_increment(&y, self.time, dt, &*system)?;
        system.update_state(&(y + increment * dt))?;

        self.time += dt;
        self.steps += 1;
        Ok(())
    }

    /// Take `n_steps` steps; returns the final simulation time.
    /// Stops at the first failing step, keeping everything committed before it.
    pub fn evolve(&mut self, system: &mut System, dt: f64, n_steps: usize) -> Result<f64, SimError> {
        self.evolve_with(system, dt, n_steps, |_, _| {})
    }

    /// As [`Driver::evolve`], calling `observer(driver, system)` after every
    /// committed step
    pub fn evolve_with<F>(
        &mut self,
        system: &mut System,
        dt: f64,
        n_steps: usize,
        mut observer: F,
    ) -> Result<f64, SimError>
    where
        F: FnMut(&Driver, &System),
    {
        check_dt(dt)?;
        for _ in 0..n_steps {
            self.step(system, dt)?;
            observer(self, system);
        }
        Ok(self.time)
    }
}

fn check_dt(dt: f64) -> Result<(), SimError> {
    if !dt.is_finite() || dt == 0.0 {
        return Err(SimError::InvalidParameter(format!(
            "time step must be finite and non-zero, got {dt}"
        )));
    }
    Ok(())
}
