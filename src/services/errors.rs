use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::forms::items::{DeleteItemFormError, ItemFormError, LoginFormError};

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The visitor is not logged in as admin.
    #[error("unauthorized")]
    Unauthorized,
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// Another mutation of the same item is still running.
    #[error("operation already in progress")]
    Conflict,
    /// The store holds demo data, which is never written back.
    #[error("demo data is read-only")]
    ReadOnly,
    /// Submitted form data was rejected.
    #[error("{0}")]
    Form(String),
    /// A value violated a domain constraint.
    #[error("{0}")]
    TypeConstraint(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<ItemFormError> for ServiceError {
    fn from(val: ItemFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<LoginFormError> for ServiceError {
    fn from(val: LoginFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<DeleteItemFormError> for ServiceError {
    fn from(val: DeleteItemFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}
