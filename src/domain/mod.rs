pub mod models;
pub mod store;
pub mod errors;
pub mod export;

pub use models::*;
pub use store::*;
pub use errors::*;
pub use export::*;
