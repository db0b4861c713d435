//! Error types for the driftfield core.

use thiserror::Error;

/// Errors produced at the fallible edges of the engine.
///
/// The simulation itself has no failure paths: degenerate inputs (zero
/// viewport, zero-distance steering, out-of-bounds field lookups) degrade to
/// guarded no-ops. What can fail is construction-time name resolution and
/// the raster/snapshot edge.
#[derive(Debug, Error)]
pub enum SimError {
    /// Width or height was zero (or overflowed) when creating a raster
    /// surface or validating a scene.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A formation pattern name was not recognized by the registry.
    #[error("unknown formation pattern: {0}")]
    UnknownFormation(String),

    /// An anchor-assignment policy name was not recognized.
    #[error("unknown assignment policy: {0}")]
    UnknownAssignment(String),

    /// An I/O failure while writing a snapshot.
    #[error("io error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let err = SimError::InvalidDimensions;
        let msg = format!("{err}");
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn unknown_formation_includes_name() {
        let err = SimError::UnknownFormation("pentagram".into());
        let msg = format!("{err}");
        assert!(
            msg.contains("pentagram"),
            "expected message containing 'pentagram', got: {msg}"
        );
    }

    #[test]
    fn unknown_assignment_includes_name() {
        let err = SimError::UnknownAssignment("round-robin".into());
        let msg = format!("{err}");
        assert!(
            msg.contains("round-robin"),
            "expected message containing 'round-robin', got: {msg}"
        );
    }

    #[test]
    fn io_error_includes_message() {
        let err = SimError::Io("disk full".into());
        let msg = format!("{err}");
        assert!(msg.contains("disk full"), "missing message in: {msg}");
    }

    #[test]
    fn sim_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SimError>();
    }

    #[test]
    fn sim_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<SimError>();
    }
}
