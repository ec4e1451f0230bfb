//! Request middleware.

pub mod validation;
pub use validation::{validate_request, RequestRules, ValidationSource};
