use thiserror::Error;

/// Boxed error returned by user supplied conversion functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when registering or running mappings
#[derive(Debug, Error)]
pub enum MapperError {
    /// A custom mapping function was missing at registration
    #[error("mapping function for {source_type} -> {dest_type} is nil")]
    NilFunction {
        source_type: &'static str,
        dest_type: &'static str,
    },

    /// No registration exists for the requested type pair
    #[error("no mapping registered for {source_type} -> {dest_type}")]
    MapNotExist {
        source_type: &'static str,
        dest_type: &'static str,
    },

    /// The type pair (or its derived pointer/value twin) is already registered
    #[error("mapping {source_type} -> {dest_type} already exists")]
    MapAlreadyExists {
        source_type: &'static str,
        dest_type: &'static str,
    },

    /// One side of the pair is not a struct or pointer-to-struct
    #[error("unsupported mapping {source_type} -> {dest_type}: both sides must be structs or pointers to structs")]
    UnsupportedMap {
        source_type: &'static str,
        dest_type: &'static str,
    },

    /// Error returned by a registered custom function, surfaced unchanged
    #[error(transparent)]
    Custom(BoxError),

    /// A custom function produced a value of the wrong type
    #[error("type assertion failed: expected {expected}, got {actual}")]
    TypeAssertion {
        expected: &'static str,
        actual: &'static str,
    },

    /// The mapper was frozen and can no longer be reconfigured
    #[error("mapper is frozen; registrations and configuration are closed")]
    Frozen,

    /// Failed to acquire an internal lock
    #[error("failed to acquire lock")]
    LockError,

    /// Strict mode: no profile was cached for a struct pair
    #[error("no mapping profile for {0}")]
    ProfileNotFound(String),

    /// Strict mode: the source and destination shapes do not line up
    #[error("structural mismatch at {path}: cannot map {source_kind} into {dest_kind}")]
    StructuralMismatch {
        path: String,
        source_kind: String,
        dest_kind: String,
    },
}

impl MapperError {
    /// Wraps an arbitrary error as a custom-function failure.
    pub fn custom<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        MapperError::Custom(err.into())
    }
}

/// Result type for mapper operations
pub type Result<T> = std::result::Result<T, MapperError>;
