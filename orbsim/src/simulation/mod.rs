pub mod states;
pub mod error;
pub mod params;
pub mod engine;
pub mod forces;
pub mod barnes_hut;
pub mod integrator;
pub mod driver;
pub mod scenario;
