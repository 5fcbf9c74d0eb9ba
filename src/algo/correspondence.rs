//! Closest-point correspondence between two meshes.
//!
//! For every vertex of a "from" mesh, the resolver finds the closest point
//! on the surface of a "to" mesh and records it in terms of the "to" mesh's
//! topology: the hit triangle plus barycentric weights, or a single nearest
//! vertex when the hit triangle is degenerate. The resulting
//! [`CorrespondenceMap`] can then sample any per-vertex field of the "to"
//! mesh (in this pipeline, a displacement field) at those recorded
//! locations.
//!
//! The search scans triangles in face-traversal order with a strict `<`
//! comparison, so ties resolve to the first triangle achieving the minimum
//! distance. That choice is deterministic but not geometrically meaningful;
//! callers must not read anything into it. The scan is O(|from vertices| ×
//! |to triangles|); a spatial index over the "to" mesh would reduce the
//! search cost without changing any result.

use log::debug;
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::algo::delta::DeltaSet;
use crate::error::{Result, TransferError};
use crate::mesh::{Mesh, VertexId};

/// Options for correspondence resolution.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Whether to parallelize the per-vertex search (default: true).
    /// Parallel and sequential runs produce identical maps.
    pub parallel: bool,

    /// Squared-area cutoff below which a triangle is treated as degenerate
    /// and its nearest corner is recorded instead of barycentric weights.
    pub degenerate_epsilon: f64,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            degenerate_epsilon: 1e-12,
        }
    }
}

impl ResolveOptions {
    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the degenerate-triangle cutoff.
    pub fn with_degenerate_epsilon(mut self, epsilon: f64) -> Self {
        self.degenerate_epsilon = epsilon.max(0.0);
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Where one "from" vertex lands on the "to" mesh's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceAnchor {
    /// The closest point lies on a triangle; `weights` are barycentric
    /// coordinates over `vertices` (non-negative, summing to 1).
    Triangle {
        /// Index into the "to" mesh's triangle list.
        triangle: usize,
        /// The triangle's corner vertices in the "to" mesh.
        vertices: [VertexId; 3],
        /// Barycentric weights over the corners.
        weights: [f64; 3],
    },

    /// Degenerate fallback: the nearest single vertex, weight 1.
    Vertex {
        /// The nearest vertex in the "to" mesh.
        vertex: VertexId,
    },
}

/// A total mapping from every "from" vertex to a location on the "to" mesh.
///
/// Computed once per transfer operation from two mesh snapshots, immutable,
/// and discarded when the operation completes.
#[derive(Debug, Clone)]
pub struct CorrespondenceMap {
    anchors: Vec<SurfaceAnchor>,
    to_vertex_count: usize,
}

impl CorrespondenceMap {
    /// Get the number of mapped "from" vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Check whether the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Get the anchor recorded for a "from" vertex.
    #[inline]
    pub fn anchor(&self, v: VertexId) -> &SurfaceAnchor {
        &self.anchors[v.index()]
    }

    /// Get all anchors, indexed by "from" vertex.
    #[inline]
    pub fn anchors(&self) -> &[SurfaceAnchor] {
        &self.anchors
    }

    /// Sample a per-vertex field of the "to" mesh at each anchor.
    ///
    /// Produces one value per "from" vertex: the barycentric combination of
    /// the anchor triangle's corner values, or the single vertex's value for
    /// fallback anchors. Fails with [`TransferError::TopologyMismatch`] when
    /// `field` does not match the "to" mesh this map was resolved against.
    pub fn interpolate(&self, field: &DeltaSet) -> Result<DeltaSet> {
        if field.len() != self.to_vertex_count {
            return Err(TransferError::TopologyMismatch {
                expected: self.to_vertex_count,
                found: field.len(),
            });
        }

        let deltas: Vec<Vector3<f64>> = self
            .anchors
            .iter()
            .map(|anchor| match anchor {
                SurfaceAnchor::Triangle {
                    vertices: [a, b, c],
                    weights: [wa, wb, wc],
                    ..
                } => field.get(*a) * *wa + field.get(*b) * *wb + field.get(*c) * *wc,
                SurfaceAnchor::Vertex { vertex } => *field.get(*vertex),
            })
            .collect();

        Ok(DeltaSet::from(deltas))
    }
}

/// Resolve the closest-point correspondence from `from` onto `to`.
///
/// For every vertex of `from`, finds the minimum-distance point over all of
/// `to`'s triangles and records it as a [`SurfaceAnchor`]. Fails with
/// [`TransferError::InvalidGeometry`] if `to` has no triangles.
///
/// # Example
///
/// ```
/// use retarget::algo::{resolve, ResolveOptions};
/// use retarget::mesh::Mesh;
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let to = Mesh::new(positions.clone(), vec![vec![0, 1, 2]]).unwrap();
/// let from = Mesh::new(positions, vec![vec![0, 1, 2]]).unwrap();
///
/// let map = resolve(&from, &to, &ResolveOptions::default()).unwrap();
/// assert_eq!(map.len(), 3);
/// ```
pub fn resolve(from: &Mesh, to: &Mesh, options: &ResolveOptions) -> Result<CorrespondenceMap> {
    if to.triangles().is_empty() {
        return Err(TransferError::invalid_geometry(
            "correspondence target has no triangles",
        ));
    }

    let epsilon = options.degenerate_epsilon;
    let anchors: Vec<SurfaceAnchor> = if options.parallel {
        from.positions()
            .par_iter()
            .map(|p| closest_anchor(p, to, epsilon))
            .collect()
    } else {
        from.positions()
            .iter()
            .map(|p| closest_anchor(p, to, epsilon))
            .collect()
    };

    debug!(
        "resolved correspondence for {} vertices against {} triangles",
        anchors.len(),
        to.num_triangles()
    );

    Ok(CorrespondenceMap {
        anchors,
        to_vertex_count: to.num_vertices(),
    })
}

/// Scan all triangles of `to` for the closest surface point to `p`.
fn closest_anchor(p: &Point3<f64>, to: &Mesh, epsilon: f64) -> SurfaceAnchor {
    let mut best_dist = f64::INFINITY;
    let mut best = SurfaceAnchor::Vertex {
        vertex: VertexId::new(0),
    };

    for (ti, tri) in to.triangles().iter().enumerate() {
        let [a, b, c] = to.triangle_positions(tri);

        if is_degenerate(&a, &b, &c, epsilon) {
            // Collapsed triangle: fall back to its nearest corner
            for &v in &tri.vertices {
                let d = (to.position(v) - p).norm_squared();
                if d < best_dist {
                    best_dist = d;
                    best = SurfaceAnchor::Vertex { vertex: v };
                }
            }
        } else {
            let (q, weights) = closest_point_on_triangle(p, &a, &b, &c);
            let d = (q - p).norm_squared();
            if d < best_dist {
                best_dist = d;
                best = SurfaceAnchor::Triangle {
                    triangle: ti,
                    vertices: tri.vertices,
                    weights,
                };
            }
        }
    }

    best
}

/// Check whether a triangle's squared area falls below the cutoff.
fn is_degenerate(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, epsilon: f64) -> bool {
    let ab = b - a;
    let ac = c - a;
    ab.cross(&ac).norm_squared() <= epsilon
}

/// Compute the closest point on a triangle to a query point, together with
/// its barycentric coordinates over (a, b, c).
///
/// Region test on the triangle's Voronoi decomposition; assumes the triangle
/// is non-degenerate.
fn closest_point_on_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> (Point3<f64>, [f64; 3]) {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (*a, [1.0, 0.0, 0.0]);
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (*b, [0.0, 1.0, 0.0]);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (Point3::from(a.coords + ab * v), [1.0 - v, v, 0.0]);
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (*c, [0.0, 0.0, 1.0]);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (Point3::from(a.coords + ac * w), [1.0 - w, 0.0, w]);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (Point3::from(b.coords + (c - b) * w), [0.0, 1.0 - w, w]);
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    (
        Point3::from(a.coords + ab * v + ac * w),
        [1.0 - v - w, v, w],
    )
}
