//! Host-scene access abstraction.
//!
//! The transfer engine never walks a host application's scene graph. It asks
//! a [`SceneSource`] to resolve opaque references into [`Mesh`] snapshots and
//! to enumerate the deformed variants (the blend shape payload) attached to a
//! reference. Hosts substitute their own scene-access layer behind this
//! interface; [`MemoryScene`] is the reference in-memory implementation used
//! by tests and benchmarks.
//!
//! Output flows the other way by plain return values: the engine hands back
//! named deformed snapshots and performs no scene mutation itself.

use std::collections::HashMap;

use crate::error::{Result, TransferError};
use crate::mesh::Mesh;

/// Resolves opaque scene references into mesh snapshots.
pub trait SceneSource {
    /// Resolve a reference to a mesh snapshot.
    ///
    /// Fails with [`TransferError::InvalidGeometry`] when the reference does
    /// not resolve to usable polygonal geometry.
    fn resolve(&self, id: &str) -> Result<Mesh>;

    /// List the deformed variants attached to a reference, in order.
    ///
    /// A mesh with no attached blend shape yields an empty list, not an
    /// error.
    fn variants(&self, id: &str) -> Result<Vec<(String, Mesh)>>;
}

/// An in-memory [`SceneSource`].
///
/// # Example
///
/// ```
/// use retarget::scene::{MemoryScene, SceneSource};
/// use retarget::mesh::Mesh;
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh = Mesh::new(positions, vec![vec![0, 1, 2]]).unwrap();
///
/// let mut scene = MemoryScene::new();
/// scene.insert_mesh("face", mesh);
///
/// assert!(scene.resolve("face").is_ok());
/// assert!(scene.resolve("missing").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    meshes: HashMap<String, Mesh>,
    variants: HashMap<String, Vec<(String, Mesh)>>,
}

impl MemoryScene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a mesh under the given reference.
    pub fn insert_mesh(&mut self, id: impl Into<String>, mesh: Mesh) {
        self.meshes.insert(id.into(), mesh);
    }

    /// Attach a named deformed variant to the given reference.
    ///
    /// Variants are listed in insertion order.
    pub fn insert_variant(&mut self, id: impl Into<String>, name: impl Into<String>, mesh: Mesh) {
        self.variants.entry(id.into()).or_default().push((name.into(), mesh));
    }
}

impl SceneSource for MemoryScene {
    fn resolve(&self, id: &str) -> Result<Mesh> {
        self.meshes.get(id).cloned().ok_or_else(|| {
            TransferError::invalid_geometry(format!("no mesh named {:?} in scene", id))
        })
    }

    fn variants(&self, id: &str) -> Result<Vec<(String, Mesh)>> {
        Ok(self.variants.get(id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn triangle() -> Mesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        Mesh::new(positions, vec![vec![0, 1, 2]]).unwrap()
    }

    #[test]
    fn test_resolve_known_mesh() {
        let mut scene = MemoryScene::new();
        scene.insert_mesh("face", triangle());

        let mesh = scene.resolve("face").unwrap();
        assert_eq!(mesh.num_vertices(), 3);
    }

    #[test]
    fn test_resolve_unknown_mesh() {
        let scene = MemoryScene::new();
        let result = scene.resolve("missing");
        assert!(matches!(result, Err(TransferError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_variants_ordered() {
        let mut scene = MemoryScene::new();
        scene.insert_mesh("face", triangle());
        scene.insert_variant("face", "smile", triangle());
        scene.insert_variant("face", "frown", triangle());

        let variants = scene.variants("face").unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].0, "smile");
        assert_eq!(variants[1].0, "frown");
    }

    #[test]
    fn test_variants_empty_without_blend_shape() {
        let mut scene = MemoryScene::new();
        scene.insert_mesh("face", triangle());

        assert!(scene.variants("face").unwrap().is_empty());
    }
}
