//! Engine error taxonomy.

use crate::buffer::marshal::ElementType;

/// Convenience alias used across the engine.
pub type RasterFxResult<T> = Result<T, RasterFxError>;

/// Every failure the engine can report.
///
/// None of these terminate the host. Per-port variants are logged and the port is treated as
/// absent; call-level variants mean "no output for this node this frame".
#[derive(thiserror::Error, Debug)]
pub enum RasterFxError {
    /// Destination or input storage is neither 32-bit nor 64-bit BGRA.
    #[error("unsupported pixel format: {0:?}")]
    UnsupportedPixelFormat(ElementType),

    /// The named port exists but nothing is connected to it.
    #[error("disconnected port '{port}'")]
    DisconnectedPort {
        /// Port name as declared by the effect.
        port: String,
    },

    /// The named port is missing on the node or points at no upstream node.
    #[error("invalid port '{port}'")]
    InvalidPort {
        /// Port name as declared by the effect.
        port: String,
    },

    /// The upstream node behind a port could not report its region.
    #[error("bbox unavailable for port '{port}'")]
    BBoxUnavailable {
        /// Port name as declared by the effect.
        port: String,
    },

    /// The resolved output region has non-positive width or height.
    #[error("empty or degenerate region")]
    EmptyOrDegenerateRegion,

    /// Copying between host tile storage and a pixel buffer failed.
    #[error("buffer marshal error: {0}")]
    BufferMarshal(String),

    /// A declared parameter could not be fetched from the host.
    #[error("missing parameter '{0}'")]
    MissingParam(String),

    /// An effect's compute step failed.
    #[error("compute error: {0}")]
    Compute(String),

    /// Invalid arguments to a primitive.
    #[error("validation error: {0}")]
    Validation(String),

    /// Instance bookkeeping failed (missing instance, poisoned lock, aliasing).
    #[error("instance error: {0}")]
    Instance(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RasterFxError {
    /// Build a [`RasterFxError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RasterFxError::Compute`] value.
    pub fn compute(msg: impl Into<String>) -> Self {
        Self::Compute(msg.into())
    }

    /// Build a [`RasterFxError::BufferMarshal`] value.
    pub fn marshal(msg: impl Into<String>) -> Self {
        Self::BufferMarshal(msg.into())
    }

    /// Build a [`RasterFxError::Instance`] value.
    pub fn instance(msg: impl Into<String>) -> Self {
        Self::Instance(msg.into())
    }

    /// `true` for failures that only disqualify a single input port.
    pub fn is_port_local(&self) -> bool {
        matches!(
            self,
            Self::DisconnectedPort { .. } | Self::InvalidPort { .. } | Self::BBoxUnavailable { .. }
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
