//! Static-vertex classification.
//!
//! The closest-point correspondence is an approximation, and it leaks small
//! spurious displacements onto regions the sculptor never touched. Vertices
//! whose transferred displacement magnitude falls below a threshold are
//! classified as static and pinned to zero displacement, so smoothing cannot
//! amplify that noise.

use log::debug;

use crate::algo::delta::DeltaSet;
use crate::error::{Result, TransferError};
use crate::mesh::VertexId;

/// The set of vertices classified as static for one transfer.
#[derive(Debug, Clone)]
pub struct StaticVertices {
    mask: Vec<bool>,
    count: usize,
}

impl StaticVertices {
    /// Create an empty classification (no vertex static) of the given length.
    pub fn none(len: usize) -> Self {
        Self {
            mask: vec![false; len],
            count: 0,
        }
    }

    /// Get the number of vertices this classification covers.
    #[inline]
    pub fn len(&self) -> usize {
        self.mask.len()
    }

    /// Check whether the classification covers zero vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    /// Get the number of static vertices.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Check whether a vertex is static.
    #[inline]
    pub fn is_static(&self, v: VertexId) -> bool {
        self.mask[v.index()]
    }

    /// Iterate over the static vertex indices, ascending.
    pub fn indices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, &s)| s)
            .map(|(i, _)| VertexId::new(i))
    }

    /// Pin every static vertex's displacement to zero.
    ///
    /// Fails with [`TransferError::TopologyMismatch`] when the delta set
    /// length differs from this classification's length.
    pub fn pin(&self, deltas: &mut DeltaSet) -> Result<()> {
        if deltas.len() != self.mask.len() {
            return Err(TransferError::TopologyMismatch {
                expected: self.mask.len(),
                found: deltas.len(),
            });
        }
        for v in self.indices() {
            deltas.zero(v);
        }
        Ok(())
    }
}

/// Validate a static-vertex threshold.
pub(crate) fn ensure_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(TransferError::invalid_param(
            "threshold",
            threshold,
            "must be finite and non-negative",
        ));
    }
    Ok(())
}

/// Classify vertices whose displacement magnitude is below `threshold`.
///
/// A vertex is static iff the Euclidean magnitude of its delta is strictly
/// less than `threshold`; a threshold of zero classifies only exact
/// zero-length deltas. Fails with [`TransferError::InvalidParameter`] when
/// `threshold` is negative or not finite.
///
/// # Example
///
/// ```
/// use retarget::algo::{classify_static, DeltaSet};
/// use retarget::mesh::VertexId;
/// use nalgebra::Vector3;
///
/// let deltas = DeltaSet::from(vec![
///     Vector3::new(0.0, 0.0, 1.0),
///     Vector3::new(0.0, 0.0, 1e-5),
/// ]);
///
/// let statics = classify_static(&deltas, 0.001).unwrap();
/// assert!(!statics.is_static(VertexId::new(0)));
/// assert!(statics.is_static(VertexId::new(1)));
/// ```
pub fn classify_static(deltas: &DeltaSet, threshold: f64) -> Result<StaticVertices> {
    ensure_threshold(threshold)?;

    let mask: Vec<bool> = deltas.as_slice().iter().map(|d| d.norm() < threshold).collect();
    let count = mask.iter().filter(|&&s| s).count();

    debug!(
        "classified {} of {} vertices as static (threshold {})",
        count,
        mask.len(),
        threshold
    );

    Ok(StaticVertices { mask, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_zero_threshold_excludes_positive_magnitudes() {
        let deltas = DeltaSet::from(vec![
            Vector3::zeros(),
            Vector3::new(1e-300, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ]);

        let statics = classify_static(&deltas, 0.0).unwrap();
        assert!(statics.is_static(VertexId::new(0)));
        assert!(!statics.is_static(VertexId::new(1)));
        assert!(!statics.is_static(VertexId::new(2)));
        assert_eq!(statics.count(), 1);
    }

    #[test]
    fn test_threshold_is_strict() {
        let deltas = DeltaSet::from(vec![
            Vector3::new(0.001, 0.0, 0.0),
            Vector3::new(0.0009, 0.0, 0.0),
        ]);

        let statics = classify_static(&deltas, 0.001).unwrap();
        // Magnitude exactly at the threshold is not static
        assert!(!statics.is_static(VertexId::new(0)));
        assert!(statics.is_static(VertexId::new(1)));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let deltas = DeltaSet::zeros(1);
        assert!(matches!(
            classify_static(&deltas, -0.5),
            Err(TransferError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let deltas = DeltaSet::zeros(1);
        assert!(matches!(
            classify_static(&deltas, f64::NAN),
            Err(TransferError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_pin_zeroes_static_deltas() {
        let mut deltas = DeltaSet::from(vec![
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1e-6, 0.0, 0.0),
        ]);

        let statics = classify_static(&deltas, 0.001).unwrap();
        statics.pin(&mut deltas).unwrap();

        assert_eq!(deltas.get(VertexId::new(1)).norm(), 0.0);
        assert!(deltas.get(VertexId::new(0)).norm() > 0.0);
    }

    #[test]
    fn test_pin_length_mismatch() {
        let statics = StaticVertices::none(2);
        let mut deltas = DeltaSet::zeros(3);
        assert!(matches!(
            statics.pin(&mut deltas),
            Err(TransferError::TopologyMismatch { .. })
        ));
    }

    #[test]
    fn test_indices_iteration() {
        let deltas = DeltaSet::from(vec![
            Vector3::zeros(),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::zeros(),
        ]);

        let statics = classify_static(&deltas, 1e-9).unwrap();
        let indices: Vec<VertexId> = statics.indices().collect();
        assert_eq!(indices, vec![VertexId::new(0), VertexId::new(2)]);
    }
}
