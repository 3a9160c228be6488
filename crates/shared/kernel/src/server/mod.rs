//! Shared HTTP plumbing: application state, the failure envelope, and system routes.

mod health;
mod response;
pub mod router;
mod state;

pub use response::{ApiFailure, FailureBody, FieldError};
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};
