pub mod admin;
pub mod catalog;
pub mod errors;
pub mod sync;

pub use errors::{ServiceError, ServiceResult};
