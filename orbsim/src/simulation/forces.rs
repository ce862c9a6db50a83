//! Force / acceleration models for the n-body engine
//!
//! Every model implements [`Acceleration`] and is evaluated on a borrowed
//! [`PointMasses`] view, so the same model serves the committed state and
//! the hypothetical stage states of multi-stage integrators. Models:
//! - direct Newtonian O(N²) sum (default)
//! - the same sum with the outer body loop spread across rayon workers
//! - a Barnes–Hut octree approximation

use rayon::prelude::*;

use super::barnes_hut::BarnesHutTree;
use super::error::SimError;
use super::states::NVec3;

/// Positions and masses of every body for one force evaluation,
/// plus the gravitational constant owned by the system
#[derive(Debug, Clone, Copy)]
pub struct PointMasses<'a> {
    pub g: f64,
    pub masses: &'a [f64],
    pub positions: &'a [NVec3],
}

impl PointMasses<'_> {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Trait for acceleration sources.
/// Implementations overwrite `out[i]` with the acceleration of body `i`;
/// `out.len()` always equals `field.len()`.
pub trait Acceleration {
    fn acceleration(&self, t: f64, field: &PointMasses, out: &mut [NVec3]) -> Result<(), SimError>;

    /// Short label used in diagnostics
    fn name(&self) -> &'static str;
}

/// Direct Newtonian gravity, no softening.
/// Zero separation is reported as [`SimError::SingularConfiguration`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NewtonianGravity;

impl Acceleration for NewtonianGravity {
    fn acceleration(&self, _t: f64, field: &PointMasses, out: &mut [NVec3]) -> Result<(), SimError> {
        // Zero buffer
        for a in out.iter_mut() {
            *a = NVec3::zeros();
        }

        let n = field.len();

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            let xi = field.positions[i];
            let mi = field.masses[i];

            for j in (i + 1)..n {
                let xj = field.positions[j];
                let mj = field.masses[j];

                // displacement from i to j: i is pulled along +r, j along -r
                let r = xj - xi;
                let coef = pair_coefficient(field.g, &r, i, j)?;

                // a_i +=  G * m_j * r / |r|^3
                // a_j += -G * m_i * r / |r|^3
                out[i] += coef * mj * r;
                out[j] -= coef * mi * r;
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

/// Direct Newtonian gravity with one rayon task per target body.
///
/// Each body sums its own pull from every other body, so the pairwise
/// symmetry trick is not used and the work is twice that of
/// [`NewtonianGravity`], spread over all cores.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelNewtonianGravity;

impl Acceleration for ParallelNewtonianGravity {
    fn acceleration(&self, _t: f64, field: &PointMasses, out: &mut [NVec3]) -> Result<(), SimError> {
        out.par_iter_mut().enumerate().try_for_each(|(i, a)| {
            let xi = field.positions[i];
            let mut acc = NVec3::zeros();
            for (j, (xj, mj)) in field.positions.iter().zip(field.masses).enumerate() {
                if j == i {
                    continue;
                }
                let r = xj - xi;
                let (first, second) = if i < j { (i, j) } else { (j, i) };
                acc += pair_coefficient(field.g, &r, first, second)? * mj * r;
            }
            *a = acc;
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "direct_parallel"
    }
}

/// Newtonian gravity evaluated via a Barnes–Hut octree.
/// `theta` is the opening angle; `theta = 0` opens every node and
/// reproduces the direct sum
#[derive(Debug, Clone, Copy)]
pub struct NewtonianGravityBarnesHut {
    theta: f64,
}

impl NewtonianGravityBarnesHut {
    pub fn new(theta: f64) -> Result<Self, SimError> {
        if !theta.is_finite() || theta < 0.0 {
            return Err(SimError::InvalidParameter(format!(
                "opening angle theta must be finite and non-negative, got {theta}"
            )));
        }
        Ok(Self { theta })
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }
}

impl Acceleration for NewtonianGravityBarnesHut {
    fn acceleration(&self, _t: f64, field: &PointMasses, out: &mut [NVec3]) -> Result<(), SimError> {
        let tree = BarnesHutTree::build(field)?;
        for (i, a) in out.iter_mut().enumerate() {
            *a = tree.acceleration_on(i, field, self.theta)?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "barnes_hut"
    }
}

/// `G / |r|^3` for the pair `(first, second)` separated by `r`.
/// Fails instead of handing back an infinite or NaN coefficient.
pub(crate) fn pair_coefficient(g: f64, r: &NVec3, first: usize, second: usize) -> Result<f64, SimError> {
    let r2 = r.dot(r);
    if r2 == 0.0 {
        return Err(SimError::SingularConfiguration { first, second });
    }

    let inv_r = r2.sqrt().recip();
    let coef = g * inv_r * inv_r * inv_r;
    if !coef.is_finite() {
        return Err(SimError::SingularConfiguration { first, second });
    }
    Ok(coef)
}
