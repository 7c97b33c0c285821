/// Shared kernel - error types, result aliases, cancellation and file safety checks
pub mod cancel;
pub mod error;
pub mod result;
pub mod security;

pub use result::{ResolveResult, Result};
