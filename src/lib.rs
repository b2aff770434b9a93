pub mod modules;
pub mod shared;

pub use shared::errors::{AppError, AppResult};
