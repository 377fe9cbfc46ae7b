//! Error types for partitioning and GLB assembly.

use thiserror::Error;

/// Errors that can occur while partitioning a mesh or assembling a GLB.
///
/// None of these are caused by user input that made it through the OFF
/// reader. [`GlbError::Invariant`] and [`GlbError::NormalCountMismatch`]
/// mean a caller handed in inconsistent buffers.
#[derive(Error, Debug)]
pub enum GlbError {
    /// The normals slice is not aligned with the mesh vertices.
    #[error("expected {vertices} normals (one per vertex), got {normals}")]
    NormalCountMismatch {
        /// Number of mesh vertices.
        vertices: usize,
        /// Number of normals supplied.
        normals: usize,
    },

    /// A geometry group, or the faces feeding it, breaks a buffer invariant.
    #[error("geometry group {group}: {message}")]
    Invariant {
        /// Position of the group in emission order.
        group: usize,
        /// What was inconsistent.
        message: String,
    },

    /// The assembled asset does not fit the 32-bit GLB length field.
    #[error("asset is {0} bytes, larger than a GLB container can hold")]
    TooLarge(usize),

    /// Scene JSON serialization failed.
    #[error("scene JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the binary container failed.
    #[error("GLB container error: {0}")]
    Container(#[from] gltf::Error),
}

impl GlbError {
    pub(crate) fn invariant(group: usize, message: impl Into<String>) -> Self {
        Self::Invariant {
            group,
            message: message.into(),
        }
    }

    /// True for contract violations between pipeline stages, as opposed to
    /// serialization failures.
    pub fn is_invariant(&self) -> bool {
        matches!(
            self,
            GlbError::Invariant { .. } | GlbError::NormalCountMismatch { .. }
        )
    }
}
