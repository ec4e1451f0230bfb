pub mod resources;
pub mod settings;
pub mod table;

pub use resources::*;
pub use settings::*;
pub use table::*;
