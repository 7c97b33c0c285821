use super::error::ResolveError;

/// Type alias for Result with anyhow::Error as the error type.
/// Used at the application edges (configuration, file reading, CLI).
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Type alias for Result with the typed pipeline error.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
