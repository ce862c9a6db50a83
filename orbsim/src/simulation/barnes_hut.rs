//! # Barnes–Hut octree
//!
//! Approximates the gravitational acceleration on each body by treating
//! sufficiently distant groups of bodies as a single mass at their center of
//! mass, replacing the `O(N²)` pair sum with roughly `O(N log N)` work.
//!
//! - Space is recursively split into 8 octants; every node stores its
//!   bounding cube, total mass and center of mass (COM).
//! - A leaf holds at most one body.
//! - A node is "opened" (descended into) when `size / distance >= theta`,
//!   otherwise its COM stands in for the whole subtree.
//!
//! The tree is rebuilt on every force evaluation from the positions handed
//! in, so it never observes anything but the state being evaluated.

use super::error::SimError;
use super::forces::{pair_coefficient, PointMasses};
use super::states::NVec3;

/// Deepest subdivision allowed. Two bodies that still share a leaf after
/// this many halvings of the root cube are treated as coincident.
const MAX_DEPTH: usize = 64;

/// A single octree node
pub struct BarnesHutNode {
    pub mass: f64,
    pub com: NVec3,
    pub bbox_min: NVec3,
    pub bbox_max: NVec3,
    pub children: [Option<usize>; 8], // indices into BarnesHutTree::nodes
    pub body_index: Option<usize>,    // Some(i) if this leaf holds body i
}

impl BarnesHutNode {
    fn empty(bbox_min: NVec3, bbox_max: NVec3) -> Self {
        Self {
            mass: 0.0,
            com: NVec3::zeros(),
            bbox_min,
            bbox_max,
            children: [None; 8],
            body_index: None,
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.iter().all(|c| c.is_none())
    }
}

/// Octree over one set of point masses, nodes stored in a flat arena
pub struct BarnesHutTree {
    pub nodes: Vec<BarnesHutNode>,
    pub root: usize,
}

impl BarnesHutTree {
    /// Build the tree: bounding cube, insertion, then a bottom-up mass/COM pass.
    ///
    /// Fails with [`SimError::SingularConfiguration`] if two bodies occupy
    /// the same position.
    pub fn build(field: &PointMasses) -> Result<Self, SimError> {
        let (bbox_min, bbox_max) = compute_global_bbox(field.positions);

        let root = 0;
        let mut tree = BarnesHutTree {
            nodes: vec![BarnesHutNode::empty(bbox_min, bbox_max)],
            root,
        };

        for i in 0..field.len() {
            tree.insert_body(root, i, field, 0)?;
        }

        tree.compute_mass_and_com(field, root);

        Ok(tree)
    }

    /// Approximate acceleration on body `i`
    pub fn acceleration_on(&self, i: usize, field: &PointMasses, theta: f64) -> Result<NVec3, SimError> {
        let mut acc = NVec3::zeros();
        self.traverse_node(self.root, i, field, theta, &mut acc)?;
        Ok(acc)
    }

    fn insert_body(
        &mut self,
        node_idx: usize,
        body_idx: usize,
        field: &PointMasses,
        depth: usize,
    ) -> Result<(), SimError> {
        // Snapshot by value so no borrow of self.nodes is held while recursing
        let resident = self.nodes[node_idx].body_index;
        let is_leaf = self.nodes[node_idx].is_leaf();

        if is_leaf {
            match resident {
                // empty leaf: store body here
                None => {
                    self.nodes[node_idx].body_index = Some(body_idx);
                    return Ok(());
                }
                // occupied leaf: push the resident down one level first
                Some(existing) => {
                    if field.positions[existing] == field.positions[body_idx] || depth >= MAX_DEPTH {
                        let (first, second) = (existing.min(body_idx), existing.max(body_idx));
                        return Err(SimError::SingularConfiguration { first, second });
                    }
                    self.nodes[node_idx].body_index = None;
                    self.descend(node_idx, existing, field, depth)?;
                }
            }
        }

        self.descend(node_idx, body_idx, field, depth)
    }

    /// Forward a body into the child octant containing it, creating the
    /// child node on first use
    fn descend(&mut self, node_idx: usize, body_idx: usize, field: &PointMasses, depth: usize) -> Result<(), SimError> {
        let bbox_min = self.nodes[node_idx].bbox_min;
        let bbox_max = self.nodes[node_idx].bbox_max;
        let octant = child_index_for_point(&field.positions[body_idx], &bbox_min, &bbox_max);

        let child = match self.nodes[node_idx].children[octant] {
            Some(idx) => idx,
            None => {
                let (cmin, cmax) = child_bbox(&bbox_min, &bbox_max, octant);
                let new_idx = self.nodes.len();
                self.nodes.push(BarnesHutNode::empty(cmin, cmax));
                self.nodes[node_idx].children[octant] = Some(new_idx);
                new_idx
            }
        };

        self.insert_body(child, body_idx, field, depth + 1)
    }

    /// Bottom-up pass filling `mass` and `com` of every node in the subtree
    fn compute_mass_and_com(&mut self, field: &PointMasses, node_idx: usize) {
        let mut mass = 0.0;
        let mut com = NVec3::zeros();

        let body_index = self.nodes[node_idx].body_index;
        let children = self.nodes[node_idx].children; // Copy

        if let Some(b) = body_index {
            mass += field.masses[b];
            com += field.positions[b] * field.masses[b];
        }

        for &child in children.iter().flatten() {
            self.compute_mass_and_com(field, child);
            let cn = &self.nodes[child];
            if cn.mass > 0.0 {
                mass += cn.mass;
                com += cn.com * cn.mass;
            }
        }

        if mass > 0.0 {
            com /= mass;
        }

        let node = &mut self.nodes[node_idx];
        node.mass = mass;
        node.com = com;
    }

    fn traverse_node(
        &self,
        node_idx: usize,
        body_idx: usize,
        field: &PointMasses,
        theta: f64,
        acc: &mut NVec3,
    ) -> Result<(), SimError> {
        let node = &self.nodes[node_idx];

        if node.mass == 0.0 {
            return Ok(());
        }

        // leaf: exact pairwise interaction
        if let Some(other) = node.body_index {
            if other == body_idx {
                return Ok(());
            }
            let r = field.positions[other] - field.positions[body_idx];
            let (first, second) = (other.min(body_idx), other.max(body_idx));
            *acc += pair_coefficient(field.g, &r, first, second)? * field.masses[other] * r;
            return Ok(());
        }

        let size_vec = node.bbox_max - node.bbox_min;
        let size = size_vec.x.max(size_vec.y).max(size_vec.z);

        let r = node.com - field.positions[body_idx];
        let dist = r.norm();

        // far enough away: the node's COM stands in for its subtree.
        // dist == 0 always opens the node
        if dist > 0.0 && size / dist < theta {
            let inv_r = dist.recip();
            *acc += field.g * node.mass * inv_r * inv_r * inv_r * r;
            return Ok(());
        }

        for &child in node.children.iter().flatten() {
            self.traverse_node(child, body_idx, field, theta, acc)?;
        }
        Ok(())
    }
}

/// Cubic bounding box enclosing every position
fn compute_global_bbox(positions: &[NVec3]) -> (NVec3, NVec3) {
    let mut min = NVec3::repeat(f64::INFINITY);
    let mut max = NVec3::repeat(f64::NEG_INFINITY);

    for p in positions {
        min = min.inf(p);
        max = max.sup(p);
    }

    if positions.is_empty() {
        return (NVec3::zeros(), NVec3::zeros());
    }

    // Expand to a cube so size is well-defined
    let center = (min + max) * 0.5;
    let half = (max - min).max() * 0.5;
    let half = NVec3::repeat(half);

    (center - half, center + half)
}

/// Octant of `p` within a node: bit 0 = +x half, bit 1 = +y, bit 2 = +z
fn child_index_for_point(p: &NVec3, bbox_min: &NVec3, bbox_max: &NVec3) -> usize {
    let center = (bbox_min + bbox_max) * 0.5;
    let mut idx = 0;

    if p.x >= center.x { idx |= 1; }
    if p.y >= center.y { idx |= 2; }
    if p.z >= center.z { idx |= 4; }

    idx
}

/// Bounding box of octant `child_idx`, same bit layout as `child_index_for_point`
fn child_bbox(parent_min: &NVec3, parent_max: &NVec3, child_idx: usize) -> (NVec3, NVec3) {
    let center = (parent_min + parent_max) * 0.5;

    let mut min = *parent_min;
    let mut max = *parent_max;

    for axis in 0..3 {
        if (child_idx & (1 << axis)) == 0 {
            max[axis] = center[axis];
        } else {
            min[axis] = center[axis];
        }
    }

    (min, max)
}
