//! Request extraction helpers.

pub mod request_data;
pub use request_data::{body_fields, RequestSources};
