pub mod command;
pub mod models;

pub use command::*;
pub use models::*;
