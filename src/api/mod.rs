//! HTTP surface: delta notifications plus the manual rebuild and clear triggers.

pub mod error;
pub mod handlers;
pub mod router;

pub use error::AppError;
pub use router::build_router;
