//! Immutable polygon mesh snapshots.
//!
//! A [`Mesh`] captures scene geometry at the moment a transfer operation
//! starts: vertex positions, polygonal faces, and a fan triangulation used
//! for surface queries. Snapshots are never mutated in place; deformed
//! results are produced as new snapshots via [`Mesh::with_positions`].
//!
//! Vertex adjacency is derived from the faces on first use and cached per
//! instance.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use nalgebra::Point3;

use super::index::{FaceId, VertexId};
use crate::error::{Result, TransferError};

/// A triangle of the internal triangulation.
///
/// Polygonal faces are fan-triangulated at construction time; each triangle
/// remembers the face it came from, so triangle traversal order follows face
/// order.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// The three corner vertices.
    pub vertices: [VertexId; 3],
    /// The polygonal face this triangle belongs to.
    pub face: FaceId,
}

/// Per-vertex neighbor lists derived from the faces of a mesh.
///
/// Two vertices are neighbors when they share a face (all unordered pairs
/// within a face, so for polygons with more than three vertices this
/// includes non-edge pairs). Neighbor lists are sorted ascending and
/// symmetric: if `b` is a neighbor of `a`, then `a` is a neighbor of `b`.
#[derive(Debug, Clone)]
pub struct Adjacency {
    neighbors: Vec<Vec<VertexId>>,
}

impl Adjacency {
    fn build(vertex_count: usize, faces: &[Vec<VertexId>]) -> Self {
        let mut sets: Vec<BTreeSet<u32>> = vec![BTreeSet::new(); vertex_count];

        for face in faces {
            for (i, &a) in face.iter().enumerate() {
                for &b in &face[i + 1..] {
                    sets[a.index()].insert(b.index() as u32);
                    sets[b.index()].insert(a.index() as u32);
                }
            }
        }

        let neighbors = sets
            .into_iter()
            .map(|set| set.into_iter().map(|v| VertexId::new(v as usize)).collect())
            .collect();

        Self { neighbors }
    }

    /// Get the number of vertices this adjacency covers.
    #[inline]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Check whether the adjacency covers zero vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Get the neighbors of a vertex, sorted ascending.
    #[inline]
    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        &self.neighbors[v.index()]
    }
}

/// An immutable snapshot of a polygon mesh.
///
/// # Example
///
/// ```
/// use retarget::mesh::Mesh;
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3]];
///
/// let mesh = Mesh::new(positions, faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 4);
/// assert_eq!(mesh.num_faces(), 1);
/// assert_eq!(mesh.num_triangles(), 2); // quad fans into two triangles
/// ```
#[derive(Debug, Clone)]
pub struct Mesh {
    positions: Vec<Point3<f64>>,
    faces: Vec<Vec<VertexId>>,
    triangles: Vec<Triangle>,
    adjacency: OnceLock<Adjacency>,
}

impl Mesh {
    /// Create a mesh snapshot from vertex positions and polygonal faces.
    ///
    /// Faces are fan-triangulated for surface queries. Fails with
    /// [`TransferError::InvalidGeometry`] when the mesh has no vertices, no
    /// faces, a face with fewer than three vertices, an out-of-range vertex
    /// index, or a face that references the same vertex twice.
    pub fn new(positions: Vec<Point3<f64>>, faces: Vec<Vec<usize>>) -> Result<Self> {
        if positions.is_empty() {
            return Err(TransferError::invalid_geometry("mesh has no vertices"));
        }
        if faces.is_empty() {
            return Err(TransferError::invalid_geometry("mesh has no faces"));
        }

        let mut checked_faces = Vec::with_capacity(faces.len());
        for (fi, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(TransferError::invalid_geometry(format!(
                    "face {} has {} vertices, need at least 3",
                    fi,
                    face.len()
                )));
            }
            for (i, &vi) in face.iter().enumerate() {
                if vi >= positions.len() {
                    return Err(TransferError::invalid_geometry(format!(
                        "face {} references vertex {} out of range ({} vertices)",
                        fi,
                        vi,
                        positions.len()
                    )));
                }
                if face[i + 1..].contains(&vi) {
                    return Err(TransferError::invalid_geometry(format!(
                        "face {} references vertex {} twice",
                        fi, vi
                    )));
                }
            }
            checked_faces.push(face.iter().map(|&vi| VertexId::new(vi)).collect());
        }

        let triangles = triangulate(&checked_faces);

        Ok(Self {
            positions,
            faces: checked_faces,
            triangles,
            adjacency: OnceLock::new(),
        })
    }

    /// Create a mesh snapshot from a triangle list.
    ///
    /// Convenience for callers whose geometry is already triangulated.
    pub fn from_triangles(positions: Vec<Point3<f64>>, triangles: &[[usize; 3]]) -> Result<Self> {
        let faces = triangles.iter().map(|t| t.to_vec()).collect();
        Self::new(positions, faces)
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of polygonal faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of triangles in the internal triangulation.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.positions[v.index()]
    }

    /// Get all vertex positions.
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Get all polygonal faces.
    #[inline]
    pub fn faces(&self) -> &[Vec<VertexId>] {
        &self.faces
    }

    /// Get the internal triangulation, in face-traversal order.
    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Get the corner positions of a triangle.
    #[inline]
    pub fn triangle_positions(&self, tri: &Triangle) -> [Point3<f64>; 3] {
        let [a, b, c] = tri.vertices;
        [self.positions[a.index()], self.positions[b.index()], self.positions[c.index()]]
    }

    // ==================== Adjacency ====================

    /// Get the vertex adjacency of this mesh.
    ///
    /// Computed on first use and cached for the lifetime of the snapshot.
    pub fn adjacency(&self) -> &Adjacency {
        self.adjacency
            .get_or_init(|| Adjacency::build(self.positions.len(), &self.faces))
    }

    /// Get the neighbors of a vertex, sorted ascending.
    #[inline]
    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        self.adjacency().neighbors(v)
    }

    // ==================== Derivation ====================

    /// Derive a new snapshot with the same topology and different positions.
    ///
    /// This is how deformed outputs are produced; the face list, the
    /// triangulation, and any cached adjacency carry over. Fails with
    /// [`TransferError::TopologyMismatch`] when the position count differs
    /// from this mesh's vertex count.
    pub fn with_positions(&self, positions: Vec<Point3<f64>>) -> Result<Self> {
        if positions.len() != self.positions.len() {
            return Err(TransferError::TopologyMismatch {
                expected: self.positions.len(),
                found: positions.len(),
            });
        }

        Ok(Self {
            positions,
            faces: self.faces.clone(),
            triangles: self.triangles.clone(),
            adjacency: self.adjacency.clone(),
        })
    }
}

/// Fan-triangulate validated polygonal faces.
fn triangulate(faces: &[Vec<VertexId>]) -> Vec<Triangle> {
    let mut triangles = Vec::with_capacity(faces.len());
    for (fi, face) in faces.iter().enumerate() {
        for i in 1..face.len() - 1 {
            triangles.push(Triangle {
                vertices: [face[0], face[i], face[i + 1]],
                face: FaceId::new(fi),
            });
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        Mesh::new(positions, vec![vec![0, 1, 2, 3]]).unwrap()
    }

    fn two_triangles() -> Mesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        Mesh::from_triangles(positions, &[[0, 1, 2], [1, 0, 3]]).unwrap()
    }

    #[test]
    fn test_no_vertices_rejected() {
        let result = Mesh::new(vec![], vec![vec![0, 1, 2]]);
        assert!(matches!(result, Err(TransferError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_no_faces_rejected() {
        let result = Mesh::new(vec![Point3::origin()], vec![]);
        assert!(matches!(result, Err(TransferError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_short_face_rejected() {
        let positions = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let result = Mesh::new(positions, vec![vec![0, 1]]);
        assert!(matches!(result, Err(TransferError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let positions = vec![Point3::origin()];
        let result = Mesh::new(positions, vec![vec![0, 1, 2]]);
        assert!(matches!(result, Err(TransferError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_duplicate_vertex_in_face_rejected() {
        let positions = vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let result = Mesh::new(positions, vec![vec![0, 0, 2]]);
        assert!(matches!(result, Err(TransferError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_fan_triangulation() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.5, 1.0, 0.0),
            Point3::new(0.5, 2.0, 0.0),
            Point3::new(-0.5, 1.0, 0.0),
        ];
        let mesh = Mesh::new(positions, vec![vec![0, 1, 2, 3, 4]]).unwrap();

        // A pentagon fans into three triangles, all attached to face 0
        assert_eq!(mesh.num_triangles(), 3);
        for tri in mesh.triangles() {
            assert_eq!(tri.face, FaceId::new(0));
            assert_eq!(tri.vertices[0], VertexId::new(0));
        }
    }

    #[test]
    fn test_adjacency_symmetric() {
        let mesh = two_triangles();
        let adjacency = mesh.adjacency();

        for i in 0..mesh.num_vertices() {
            let a = VertexId::new(i);
            for &b in adjacency.neighbors(a) {
                assert!(
                    adjacency.neighbors(b).contains(&a),
                    "adjacency not symmetric for {:?} <-> {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_adjacency_from_shared_faces() {
        let mesh = two_triangles();

        // Vertices 2 and 3 never share a face
        assert!(!mesh.neighbors(VertexId::new(2)).contains(&VertexId::new(3)));
        // Vertices 0 and 1 share both faces, listed once
        let n0 = mesh.neighbors(VertexId::new(0));
        assert_eq!(n0.iter().filter(|&&v| v == VertexId::new(1)).count(), 1);
    }

    #[test]
    fn test_quad_adjacency_includes_all_face_pairs() {
        let mesh = quad();

        // All unordered pairs within the quad are neighbors, diagonals included
        for i in 0..4 {
            let n = mesh.neighbors(VertexId::new(i));
            assert_eq!(n.len(), 3);
        }
    }

    #[test]
    fn test_with_positions_shares_topology() {
        let mesh = two_triangles();
        let moved: Vec<Point3<f64>> = mesh
            .positions()
            .iter()
            .map(|p| Point3::new(p.x, p.y, p.z + 1.0))
            .collect();

        let deformed = mesh.with_positions(moved).unwrap();
        assert_eq!(deformed.num_faces(), mesh.num_faces());
        assert_eq!(deformed.num_triangles(), mesh.num_triangles());
        assert!((deformed.position(VertexId::new(0)).z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_with_positions_count_mismatch() {
        let mesh = two_triangles();
        let result = mesh.with_positions(vec![Point3::origin()]);
        assert!(matches!(
            result,
            Err(TransferError::TopologyMismatch { expected: 4, found: 1 })
        ));
    }
}
