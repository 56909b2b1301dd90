//! Error handling for PanelCAM
//!
//! Provides error types for every layer of the pipeline:
//! - Geometry errors (profiles, solids, assemblies, face classification)
//! - CAM errors (job building and toolpath realization)
//! - Export errors (file output)
//!
//! All error types use `thiserror`. Geometric and CAM failures are
//! deterministic for the same inputs; only I/O failures are worth retrying.

use std::path::PathBuf;
use thiserror::Error;

/// Geometry error type
///
/// Raised by the profile builder, the solid kernel, the part compositor,
/// the face classifier and the DXF exporter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Shape parameters are degenerate
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry {
        /// Why the parameters were rejected.
        reason: String,
    },

    /// A polyline could not be closed into a simple loop
    #[error("Open profile: {reason}")]
    OpenProfile {
        /// Why the loop could not be closed.
        reason: String,
    },

    /// A font resource could not be located or parsed
    #[error("Font '{font}' could not be resolved: {reason}")]
    FontResolution {
        /// The requested font (family name or path).
        font: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A boolean operation consumed the whole operand
    #[error("Boolean {operation} left an empty result")]
    EmptyResult {
        /// The operation that emptied the result.
        operation: String,
    },

    /// Two sibling parts interpenetrate
    #[error("Parts '{first}' and '{second}' overlap by {volume:.6} mm^3")]
    OverlapDetected {
        /// Name of the first part.
        first: String,
        /// Name of the second part.
        second: String,
        /// Overlapping bounding volume.
        volume: f64,
    },

    /// Faces within one bucket have incompatible orientations
    #[error("Ambiguous classification at key {key:.6}: {reason}")]
    AmbiguousClassification {
        /// The bucket key.
        key: f64,
        /// Which orientations collided.
        reason: String,
    },

    /// Input is not planar 2D geometry
    #[error("Unsupported geometry: {reason}")]
    UnsupportedGeometry {
        /// What was unsupported.
        reason: String,
    },
}

impl GeometryError {
    /// Shorthand for [`GeometryError::InvalidGeometry`]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`GeometryError::EmptyResult`]
    pub fn empty(operation: impl Into<String>) -> Self {
        Self::EmptyResult {
            operation: operation.into(),
        }
    }
}

/// CAM error type
///
/// Represents errors related to machining job construction and toolpath realization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CamError {
    /// Operation references faces that cannot be machined in this job
    #[error("Invalid target for {operation}: {reason}")]
    InvalidTarget {
        /// The operation being appended.
        operation: String,
        /// Why the target was rejected.
        reason: String,
    },

    /// Tool or job parameters are out of range
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameters {
        /// Parameter name.
        parameter: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The CAM engine failed to realize an operation
    #[error("CAM engine failed on operation {index}: {reason}")]
    Engine {
        /// Zero-based index of the failing operation.
        index: usize,
        /// The failure reason.
        reason: String,
    },
}

impl CamError {
    /// Shorthand for [`CamError::InvalidTarget`]
    pub fn invalid_target(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Main error type for PanelCAM
///
/// Unifies all error types into a single type for convenient error handling.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// CAM error
    #[error(transparent)]
    Cam(#[from] CamError),

    /// Output file could not be written
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The path being written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// DXF serialization error
    #[error("DXF error: {0}")]
    Dxf(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Only file writes are worth retrying; everything else is deterministic
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Io { .. })
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }

    /// Check if this is a CAM error
    pub fn is_cam_error(&self) -> bool {
        matches!(self, Error::Cam(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_error_display() {
        let err = GeometryError::invalid("corner radius 10 exceeds 5");
        assert_eq!(err.to_string(), "Invalid geometry: corner radius 10 exceeds 5");

        let err = GeometryError::OverlapDetected {
            first: "cover".into(),
            second: "sleeve".into(),
            volume: 1.5,
        };
        assert!(err.to_string().contains("'cover' and 'sleeve'"));
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = CamError::invalid_target("profile", "empty group").into();
        assert!(err.is_cam_error());
        assert!(!err.is_geometry_error());
        assert_eq!(err.to_string(), "Invalid target for profile: empty group");
    }

    #[test]
    fn test_only_io_is_retryable() {
        let io = Error::io(
            "nc/out.nc",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(io.is_retryable());
        assert!(io.to_string().contains("nc/out.nc"));

        let geometry: Error = GeometryError::empty("subtract").into();
        assert!(!geometry.is_retryable());
        assert!(!Error::Config("jobs is empty".into()).is_retryable());
    }
}
