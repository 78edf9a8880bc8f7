//! # Cachet Core
//!
//! Shared types for the Cachet workspace: the error taxonomy, the
//! `CacheResult` alias used by internal plumbing, and the `OperationResult`
//! returned by every public facade operation.

mod error;
mod result;

pub use error::{CacheError, CacheResult};
pub use result::{FailureReason, OperationResult};
