//! Centralized error handling.
//!
//! Only the orchestration boundary produces errors: fetching from the
//! upstream source and persisting the output file. The playlist filter is a
//! pure text transform and has no error cases of its own.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
