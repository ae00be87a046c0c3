//! Code generation client.
//!
//! Developer-friendly goal: keep the public surface small and predictable.
//! Implementation details are split into submodules.

pub mod builder;
pub mod core;
pub mod error_classification;
pub mod policy;
pub mod request;
pub mod types;

mod execution;
mod validation;

pub use builder::CodeGenClientBuilder;
pub use core::CodeGenClient;
pub use error_classification::{classify_status, is_retryable_status};
pub use policy::RetryPolicy;
pub use request::GenerateRequestBuilder;
pub use types::{CallStats, CancelHandle};
