//! fedauthz Core Types
//!
//! Identity and request-context values shared by the policy engine and its
//! callers. This crate contains pure types and logic with no I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod error;
pub mod person;
pub mod text;

// Re-exports
pub use context::AuthzContext;
pub use error::{CoreError, CoreResult};
pub use person::Person;
pub use text::{normalize_str, value_type_name};
