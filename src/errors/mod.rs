//! Error hierarchy and `IntoResponse` mapping for the HTTP surface.

mod types;

pub use types::{AppError, AppResult};
