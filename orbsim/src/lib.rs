pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Body, System, NVec3, StateVector, StateMatrix, STATE_WIDTH};
pub use simulation::error::SimError;
pub use simulation::forces::{Acceleration, PointMasses, NewtonianGravity, ParallelNewtonianGravity, NewtonianGravityBarnesHut};
pub use simulation::integrator::{DerivativeSource, IntegrationStrategy, Euler, RungeKutta4};
pub use simulation::driver::Driver;
pub use simulation::engine::Engine;
pub use simulation::params::{Parameters, Units};
pub use simulation::scenario::Scenario;

pub use configuration::config::{IntegratorConfig, ForceConfig, EngineConfig, ParametersConfig, BodyConfig, BodyTable, ScenarioConfig, load_scenario, load_body_table};

pub use benchmark::benchmark::{bench_gravity, bench_strategies};
