pub mod commands;
pub mod entities;
pub mod errors;
pub mod loan;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use value_objects::*;
