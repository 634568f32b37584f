//! Utility modules

pub mod error;
pub mod urls;

pub use error::{AppError, AppResult, ErrorResponse};
pub use urls::{file_url, is_remote, local_path};
