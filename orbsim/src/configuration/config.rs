//! Configuration types for loading simulation scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`EngineConfig`]     – integration strategy and force model
//! - [`ParametersConfig`] – step size, step count, G and/or units tag
//! - [`BodyTable`]        – initial conditions keyed by body name
//! - [`ScenarioConfig`]   – top-level wrapper
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   integrator: "rk4"       # or "euler"
//!   force: "direct"         # or "direct_parallel", "barnes_hut"
//!   theta: 0.7              # Barnes–Hut opening angle
//!
//! parameters:
//!   steps: 100
//!   dt: 0.001
//!   units: "km"             # "km", "m" or "natural"
//!   G: 6.67259e-20          # optional when units are given
//!
//! bodies:
//!   alpha:
//!     mass: 1.0e+26
//!     radius: 100.0         # optional
//!     initial_position: [ 2.0e+4, 0.0, 0.0 ]
//!     initial_velocity: [ 0.0, -10.0, 0.0 ]
//!   beta:
//!     mass: 1.0e+26
//!     initial_position: [ -2.0e+4, 0.0, 0.0 ]
//!     initial_velocity: [ 0.0, 10.0, 0.0 ]
//! ```
//!
//! The order of the `bodies` mapping is the body order of the system. A body
//! table on its own (a JSON object of the same records) is read with
//! [`load_body_table`].

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::simulation::error::SimError;
use crate::simulation::params::Units;
use crate::simulation::states::{Body, NVec3};

/// Which integration strategy the engine uses
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorConfig {
    #[serde(rename = "euler")] // explicit Euler, first order
    Euler,

    #[default]
    #[serde(rename = "rk4")] // classical 4th-order Runge–Kutta
    Rk4,
}

/// Which force model evaluates accelerations
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceConfig {
    #[default]
    #[serde(rename = "direct")] // O(N^2) pairwise sum
    Direct,

    #[serde(rename = "direct_parallel")] // O(N^2), parallel over bodies
    DirectParallel,

    #[serde(rename = "barnes_hut")] // octree approximation
    BarnesHut,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub integrator: IntegratorConfig,
    #[serde(default)]
    pub force: ForceConfig,
    pub theta: Option<f64>, // Barnes–Hut opening angle
}

#[derive(Deserialize, Debug, Clone)]
#[allow(non_snake_case)]
pub struct ParametersConfig {
    pub steps: usize,
    pub dt: f64,
    pub G: Option<f64>,
    pub units: Option<Units>,
}

/// One body record, as keyed by name in a [`BodyTable`]
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub mass: f64,
    pub radius: Option<f64>,
    pub initial_position: Vec<f64>,
    pub initial_velocity: Vec<f64>,
}

impl BodyConfig {
    /// Turn the record into a [`Body`] named `name`
    pub fn to_body(&self, name: &str) -> Result<Body, SimError> {
        let position = vec3(name, "initial_position", &self.initial_position)?;
        let velocity = vec3(name, "initial_velocity", &self.initial_velocity)?;
        Body::new(name, self.mass, self.radius, position, velocity)
    }
}

fn vec3(name: &str, field: &str, v: &[f64]) -> Result<NVec3, SimError> {
    match v {
        [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
        _ => Err(SimError::InvalidParameter(format!(
            "{field} of '{name}' must have 3 components, got {}",
            v.len()
        ))),
    }
}

/// Name → record mapping that keeps document order and rejects
/// duplicate names
#[derive(Debug, Clone, Default)]
pub struct BodyTable {
    entries: Vec<(String, BodyConfig)>,
}

impl BodyTable {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BodyConfig)> {
        self.entries.iter().map(|(n, b)| (n.as_str(), b))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build every body, in table order
    pub fn to_bodies(&self) -> Result<Vec<Body>, SimError> {
        self.iter().map(|(name, cfg)| cfg.to_body(name)).collect()
    }
}

impl<'de> Deserialize<'de> for BodyTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = BodyTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping from body name to body parameters")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<BodyTable, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut seen = HashSet::new();
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, body)) = map.next_entry::<String, BodyConfig>()? {
                    if !seen.insert(name.clone()) {
                        return Err(de::Error::custom(format!("duplicate body name '{name}'")));
                    }
                    entries.push((name, body));
                }
                Ok(BodyTable { entries })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Top-level scenario configuration loaded from YAML
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub bodies: BodyTable,
}

impl ScenarioConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("failed to parse scenario")
    }
}

/// Read a scenario file
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_yaml::from_reader(reader).with_context(|| format!("failed to parse scenario {}", path.display()))
}

/// Read a bare body table (YAML, or JSON since YAML parses it too)
pub fn load_body_table(path: &Path) -> Result<BodyTable> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_yaml::from_reader(reader).with_context(|| format!("failed to parse body table {}", path.display()))
}
