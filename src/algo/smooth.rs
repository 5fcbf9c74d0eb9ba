//! Delta-field relaxation.
//!
//! The transferred displacement field carries high-frequency noise from the
//! closest-point approximation. This module applies uniform Laplacian
//! relaxation to the field: each round replaces every non-static vertex's
//! delta with the arithmetic mean of its own delta and its neighbors'
//! deltas, all read from the previous round. More iterations smooth more
//! aggressively and can under-shoot sharp, intentional deformation
//! features; the trade-off is the caller's to make.

use log::debug;
use nalgebra::Vector3;
use rayon::prelude::*;

use crate::algo::classify::StaticVertices;
use crate::algo::delta::DeltaSet;
use crate::error::{Result, TransferError};
use crate::mesh::{Adjacency, VertexId};

/// Options for delta-field smoothing.
#[derive(Debug, Clone)]
pub struct SmoothOptions {
    /// Number of relaxation rounds (0 is a no-op).
    pub iterations: usize,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self {
            iterations: 3,
            parallel: true,
        }
    }
}

impl SmoothOptions {
    /// Create options with the specified number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Relax a displacement field over a mesh's adjacency.
///
/// Each round is a simultaneous update: every new delta is computed from the
/// previous round's values before any is written, so the result does not
/// depend on vertex order. Static vertices pass through unchanged in every
/// round, as do vertices with no neighbors. Zero iterations returns the
/// input unchanged.
///
/// Rounds compose exactly: smoothing for `n1 + n2` iterations equals
/// smoothing for `n1` and then for `n2`.
///
/// Fails with [`TransferError::TopologyMismatch`] when `deltas`,
/// `adjacency`, and `statics` do not cover the same number of vertices.
pub fn smooth_deltas(
    deltas: &DeltaSet,
    adjacency: &Adjacency,
    statics: &StaticVertices,
    options: &SmoothOptions,
) -> Result<DeltaSet> {
    if adjacency.len() != deltas.len() {
        return Err(TransferError::TopologyMismatch {
            expected: deltas.len(),
            found: adjacency.len(),
        });
    }
    if statics.len() != deltas.len() {
        return Err(TransferError::TopologyMismatch {
            expected: deltas.len(),
            found: statics.len(),
        });
    }

    let mut current: Vec<Vector3<f64>> = deltas.as_slice().to_vec();
    let num_vertices = current.len();

    for round in 0..options.iterations {
        let next: Vec<Vector3<f64>> = if options.parallel {
            (0..num_vertices)
                .into_par_iter()
                .map(|i| relaxed(i, &current, adjacency, statics))
                .collect()
        } else {
            (0..num_vertices)
                .map(|i| relaxed(i, &current, adjacency, statics))
                .collect()
        };
        current = next;

        debug!("smoothing round {}/{} complete", round + 1, options.iterations);
    }

    Ok(DeltaSet::from(current))
}

/// Compute one vertex's relaxed delta from the previous round.
fn relaxed(
    i: usize,
    current: &[Vector3<f64>],
    adjacency: &Adjacency,
    statics: &StaticVertices,
) -> Vector3<f64> {
    let v = VertexId::new(i);
    if statics.is_static(v) {
        return current[i];
    }

    let neighbors = adjacency.neighbors(v);
    if neighbors.is_empty() {
        return current[i];
    }

    let mut sum = current[i];
    for &n in neighbors {
        sum += current[n.index()];
    }
    sum / (neighbors.len() + 1) as f64
}
