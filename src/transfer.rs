//! The transfer session state machine.
//!
//! A [`TransferSession`] holds the user's current source and target
//! designations and drives the end-to-end pipeline: extract deltas from the
//! source's deformed pose, carry them across a closest-point correspondence
//! onto the target, suppress sub-threshold noise, relax the remaining
//! field, and reconstruct a deformed target snapshot.
//!
//! The session owns no scene access and mutates no scene state. References
//! are resolved through a [`SceneSource`] at designation time, and outputs
//! are plain return values the host applies itself.

use log::{debug, info};

use crate::algo::classify::ensure_threshold;
use crate::algo::{
    classify_static, resolve, smooth_deltas, CorrespondenceMap, DeltaSet, ResolveOptions,
    SmoothOptions,
};
use crate::error::{Result, TransferError};
use crate::mesh::Mesh;
use crate::scene::SceneSource;

/// Per-call transfer parameters.
///
/// Both knobs trade robustness against fidelity: the threshold decides how
/// small a transferred displacement must be to count as correspondence
/// noise, and the iteration count decides how aggressively the surviving
/// field is relaxed.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Displacement magnitude below which a vertex is pinned as static.
    pub threshold: f64,

    /// Number of smoothing rounds applied to the transferred deltas.
    pub iterations: usize,

    /// Whether to parallelize the per-vertex passes (default: true).
    pub parallel: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            threshold: 0.001,
            iterations: 3,
            parallel: true,
        }
    }
}

impl TransferOptions {
    /// Create options with the specified static threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Create options with the specified number of smoothing iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// One transferred variant: a name and the deformed target snapshot.
///
/// The host is expected to create or update a deformed variant named
/// `name` on the target with these positions; the engine itself never
/// touches the scene.
#[derive(Debug, Clone)]
pub struct TransferResult {
    /// The variant name (the deformed reference for
    /// [`TransferSession::execute_from_mesh`], the attached variant's name
    /// for [`TransferSession::execute_from_blend_shape`]).
    pub name: String,

    /// The deformed target mesh.
    pub mesh: Mesh,
}

#[derive(Debug, Clone)]
struct SourceSlot {
    id: String,
    mesh: Mesh,
    variants: Vec<(String, Mesh)>,
}

#[derive(Debug, Clone)]
struct TargetSlot {
    id: String,
    mesh: Mesh,
}

/// Drives blend shape transfers between a designated source and target.
///
/// A session starts empty, gains a source and a target through
/// [`set_source`](Self::set_source) / [`set_target`](Self::set_target)
/// (each designation replaces the previous one wholesale), and becomes
/// valid once both resolve. The two entry points re-validate defensively
/// and fail with [`TransferError::InvalidState`] when prerequisites are
/// missing.
///
/// # Example
///
/// ```
/// use retarget::scene::MemoryScene;
/// use retarget::transfer::{TransferOptions, TransferSession};
/// use retarget::mesh::Mesh;
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let base = Mesh::new(positions.clone(), vec![vec![0, 1, 2]]).unwrap();
/// let raised: Vec<_> = positions.iter().map(|p| Point3::new(p.x, p.y, p.z + 1.0)).collect();
/// let deformed = base.with_positions(raised).unwrap();
///
/// let mut scene = MemoryScene::new();
/// scene.insert_mesh("head", base.clone());
/// scene.insert_mesh("head_smile", deformed);
/// scene.insert_mesh("other_head", base);
///
/// let mut session = TransferSession::new();
/// session.set_source(&scene, "head").unwrap();
/// session.set_target(&scene, "other_head").unwrap();
/// assert!(session.is_valid());
///
/// let result = session
///     .execute_from_mesh(&scene, "head_smile", &TransferOptions::default())
///     .unwrap();
/// assert_eq!(result.name, "head_smile");
/// assert_eq!(result.mesh.num_vertices(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransferSession {
    source: Option<SourceSlot>,
    target: Option<TargetSlot>,
}

impl TransferSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Designation ====================

    /// Designate the transfer source.
    ///
    /// Resolves the reference to a mesh snapshot and captures its attached
    /// deformed variants. Replaces any previous source. Propagates
    /// [`TransferError::InvalidGeometry`] from resolution, leaving the
    /// previous designation untouched on failure.
    pub fn set_source(&mut self, scene: &dyn SceneSource, id: &str) -> Result<()> {
        let mesh = scene.resolve(id)?;
        let variants = scene.variants(id)?;
        debug!(
            "source {:?}: {} vertices, {} variants",
            id,
            mesh.num_vertices(),
            variants.len()
        );
        self.source = Some(SourceSlot {
            id: id.to_string(),
            mesh,
            variants,
        });
        Ok(())
    }

    /// Designate the transfer target.
    ///
    /// Replaces any previous target; otherwise as
    /// [`set_source`](Self::set_source).
    pub fn set_target(&mut self, scene: &dyn SceneSource, id: &str) -> Result<()> {
        let mesh = scene.resolve(id)?;
        debug!("target {:?}: {} vertices", id, mesh.num_vertices());
        self.target = Some(TargetSlot {
            id: id.to_string(),
            mesh,
        });
        Ok(())
    }

    /// Clear the source designation.
    pub fn clear_source(&mut self) {
        self.source = None;
    }

    /// Clear the target designation.
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Get the current source reference, if designated.
    pub fn source_id(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.id.as_str())
    }

    /// Get the current target reference, if designated.
    pub fn target_id(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.id.as_str())
    }

    // ==================== Validity ====================

    /// Check whether both source and target are designated.
    pub fn is_valid(&self) -> bool {
        self.source.is_some() && self.target.is_some()
    }

    /// Check whether the session is valid and the source carries at least
    /// one deformed variant.
    pub fn is_valid_with_blend_shape(&self) -> bool {
        self.is_valid()
            && self
                .source
                .as_ref()
                .is_some_and(|s| !s.variants.is_empty())
    }

    // ==================== Execution ====================

    /// Transfer the deformation of an already-deformed source pose.
    ///
    /// `id` must resolve to a deformed variant of the current source mesh
    /// (same topology; it need not be formally attached as a blend shape).
    /// Returns one [`TransferResult`] named after `id`.
    ///
    /// Fails with [`TransferError::InvalidState`] when the session is not
    /// valid, and propagates pipeline errors otherwise. A failed call
    /// produces no output.
    pub fn execute_from_mesh(
        &self,
        scene: &dyn SceneSource,
        id: &str,
        options: &TransferOptions,
    ) -> Result<TransferResult> {
        let (source, target) = self.slots()?;
        ensure_threshold(options.threshold)?;

        let deformed = scene.resolve(id)?;
        let source_deltas = DeltaSet::between(&source.mesh, &deformed)?;
        let map = self.correspondence(source, target, options)?;
        self.finish(id, &source_deltas, &map, target, options)
    }

    /// Transfer every deformed variant attached to the source.
    ///
    /// Runs the pipeline once per variant, in attachment order, and returns
    /// one [`TransferResult`] per variant, named after it. The
    /// correspondence is resolved once and shared across variants; the
    /// results are identical to resolving per variant.
    ///
    /// Fails with [`TransferError::InvalidState`] when the session is not
    /// valid or the source has no attached variants.
    pub fn execute_from_blend_shape(
        &self,
        options: &TransferOptions,
    ) -> Result<Vec<TransferResult>> {
        let (source, target) = self.slots()?;
        if source.variants.is_empty() {
            return Err(TransferError::InvalidState {
                details: "source has no blend shape variants",
            });
        }
        ensure_threshold(options.threshold)?;

        let map = self.correspondence(source, target, options)?;
        source
            .variants
            .iter()
            .map(|(name, deformed)| {
                let source_deltas = DeltaSet::between(&source.mesh, deformed)?;
                self.finish(name, &source_deltas, &map, target, options)
            })
            .collect()
    }

    // ==================== Pipeline ====================

    fn slots(&self) -> Result<(&SourceSlot, &TargetSlot)> {
        match (&self.source, &self.target) {
            (Some(source), Some(target)) => Ok((source, target)),
            (None, _) => Err(TransferError::InvalidState {
                details: "source not set",
            }),
            (_, None) => Err(TransferError::InvalidState {
                details: "target not set",
            }),
        }
    }

    /// Anchor every target vertex on the source surface.
    fn correspondence(
        &self,
        source: &SourceSlot,
        target: &TargetSlot,
        options: &TransferOptions,
    ) -> Result<CorrespondenceMap> {
        resolve(
            &target.mesh,
            &source.mesh,
            &ResolveOptions::default().with_parallel(options.parallel),
        )
    }

    /// Remap, classify, smooth, and reconstruct one variant.
    fn finish(
        &self,
        name: &str,
        source_deltas: &DeltaSet,
        map: &CorrespondenceMap,
        target: &TargetSlot,
        options: &TransferOptions,
    ) -> Result<TransferResult> {
        let mut remapped = map.interpolate(source_deltas)?;
        let statics = classify_static(&remapped, options.threshold)?;
        statics.pin(&mut remapped)?;

        let smoothed = smooth_deltas(
            &remapped,
            target.mesh.adjacency(),
            &statics,
            &SmoothOptions::default()
                .with_iterations(options.iterations)
                .with_parallel(options.parallel),
        )?;

        let mesh = smoothed.apply_to(&target.mesh)?;
        info!(
            "transferred {:?} onto {:?} ({} static of {} vertices, {} iterations)",
            name,
            target.id,
            statics.count(),
            statics.len(),
            options.iterations
        );

        Ok(TransferResult {
            name: name.to_string(),
            mesh,
        })
    }
}
