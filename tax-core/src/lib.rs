pub mod calculations;
pub mod models;
pub mod store;

pub use calculations::compute;
pub use models::*;
pub use store::PolicyStore;
