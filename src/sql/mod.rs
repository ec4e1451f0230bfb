//! Parameterized SQL for resource tables: identifiers come from the catalog, values are always bound.

mod builder;
pub mod params;
pub use builder::*;
pub use params::PgBindValue;
