//! Resource controllers: the generic CRUD set and scoped child listings.

mod crud;
mod scoped;
pub use crud::{parse_id, PageQuery, ResourceController, CREATED_MESSAGE, DELETED_MESSAGE};
pub use scoped::ScopedListing;
