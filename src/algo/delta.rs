//! Per-vertex displacement extraction and application.
//!
//! A [`DeltaSet`] is the difference between a deformed mesh and its base:
//! one displacement vector per vertex. Deltas are extracted from a
//! topologically identical (base, deformed) pair, carried across a
//! correspondence, filtered, smoothed, and finally added back onto a base
//! mesh to reconstruct the deformed output.

use nalgebra::{Point3, Vector3};

use crate::error::{Result, TransferError};
use crate::mesh::{Mesh, VertexId};

/// An ordered set of per-vertex displacement vectors.
///
/// The invariant `deltas.len() == mesh.num_vertices()` is checked wherever a
/// delta set meets a mesh ([`DeltaSet::between`], [`DeltaSet::apply_to`]).
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaSet {
    deltas: Vec<Vector3<f64>>,
}

impl DeltaSet {
    /// Create a delta set of the given length with all displacements zero.
    pub fn zeros(len: usize) -> Self {
        Self {
            deltas: vec![Vector3::zeros(); len],
        }
    }

    /// Extract the displacement of `deformed` relative to `base`.
    ///
    /// The meshes are assumed topologically identical (same mesh, different
    /// pose); fails with [`TransferError::TopologyMismatch`] when their
    /// vertex counts differ.
    ///
    /// # Example
    ///
    /// ```
    /// use retarget::algo::DeltaSet;
    /// use retarget::mesh::Mesh;
    /// use nalgebra::Point3;
    ///
    /// let positions = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.5, 1.0, 0.0),
    /// ];
    /// let base = Mesh::new(positions, vec![vec![0, 1, 2]]).unwrap();
    ///
    /// // Deformed = base: the extracted deltas are all zero
    /// let deltas = DeltaSet::between(&base, &base).unwrap();
    /// assert!(deltas.as_slice().iter().all(|d| d.norm() == 0.0));
    /// ```
    pub fn between(base: &Mesh, deformed: &Mesh) -> Result<Self> {
        if base.num_vertices() != deformed.num_vertices() {
            return Err(TransferError::TopologyMismatch {
                expected: base.num_vertices(),
                found: deformed.num_vertices(),
            });
        }

        let deltas = base
            .positions()
            .iter()
            .zip(deformed.positions())
            .map(|(b, d)| d - b)
            .collect();

        Ok(Self { deltas })
    }

    /// Get the number of displacements.
    #[inline]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// Check whether the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Get the displacement of a vertex.
    #[inline]
    pub fn get(&self, v: VertexId) -> &Vector3<f64> {
        &self.deltas[v.index()]
    }

    /// Get all displacements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[Vector3<f64>] {
        &self.deltas
    }

    /// Zero the displacement of a vertex.
    #[inline]
    pub(crate) fn zero(&mut self, v: VertexId) {
        self.deltas[v.index()] = Vector3::zeros();
    }

    /// Add these displacements onto a base mesh, producing a new snapshot.
    ///
    /// Fails with [`TransferError::TopologyMismatch`] when the set length
    /// differs from the mesh's vertex count.
    pub fn apply_to(&self, base: &Mesh) -> Result<Mesh> {
        if self.deltas.len() != base.num_vertices() {
            return Err(TransferError::TopologyMismatch {
                expected: base.num_vertices(),
                found: self.deltas.len(),
            });
        }

        let positions: Vec<Point3<f64>> = base
            .positions()
            .iter()
            .zip(&self.deltas)
            .map(|(p, d)| p + d)
            .collect();

        base.with_positions(positions)
    }
}

impl From<Vec<Vector3<f64>>> for DeltaSet {
    fn from(deltas: Vec<Vector3<f64>>) -> Self {
        Self { deltas }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle_at(z: f64) -> Mesh {
        let positions = vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.5, 1.0, z),
        ];
        Mesh::new(positions, vec![vec![0, 1, 2]]).unwrap()
    }

    #[test]
    fn test_identity_yields_zero_deltas() {
        let mesh = triangle_at(0.0);
        let deltas = DeltaSet::between(&mesh, &mesh).unwrap();

        assert_eq!(deltas.len(), 3);
        for d in deltas.as_slice() {
            assert_eq!(d.norm(), 0.0);
        }
    }

    #[test]
    fn test_extraction() {
        let base = triangle_at(0.0);
        let deformed = triangle_at(2.5);

        let deltas = DeltaSet::between(&base, &deformed).unwrap();
        for d in deltas.as_slice() {
            assert_relative_eq!(d.z, 2.5);
            assert_relative_eq!(d.x, 0.0);
        }
    }

    #[test]
    fn test_vertex_count_mismatch() {
        let base = triangle_at(0.0);
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let other = Mesh::new(positions, vec![vec![0, 1, 2, 3]]).unwrap();

        let result = DeltaSet::between(&base, &other);
        assert!(matches!(
            result,
            Err(TransferError::TopologyMismatch { expected: 3, found: 4 })
        ));
    }

    #[test]
    fn test_apply_roundtrip() {
        let base = triangle_at(0.0);
        let deformed = triangle_at(1.0);

        let deltas = DeltaSet::between(&base, &deformed).unwrap();
        let rebuilt = deltas.apply_to(&base).unwrap();

        for (a, b) in rebuilt.positions().iter().zip(deformed.positions()) {
            assert_relative_eq!((a - b).norm(), 0.0);
        }
    }

    #[test]
    fn test_apply_length_mismatch() {
        let base = triangle_at(0.0);
        let deltas = DeltaSet::zeros(7);

        assert!(matches!(
            deltas.apply_to(&base),
            Err(TransferError::TopologyMismatch { .. })
        ));
    }
}
