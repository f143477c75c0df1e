use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::domain::errors::{CheckoutError, IdentityError, StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email already registered")]
    EmailTaken,
    #[error("not found")]
    NotFound,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Checkout(CheckoutError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::NotAuthenticated => AppError::NotAuthenticated,
            CheckoutError::Store(inner) => AppError::Internal(inner.to_string()),
            other => AppError::Checkout(other),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::EmailTaken => AppError::EmailTaken,
            IdentityError::InvalidCredentials => AppError::InvalidCredentials,
            IdentityError::Store(inner) => AppError::Internal(inner.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotAuthenticated | AppError::InvalidCredentials => {
                HttpResponse::Unauthorized().json(json!({ "error": self.to_string() }))
            }
            AppError::EmailTaken => {
                HttpResponse::Conflict().json(json!({ "error": self.to_string() }))
            }
            AppError::NotFound => {
                HttpResponse::NotFound().json(json!({ "error": self.to_string() }))
            }
            AppError::InvalidInput(_) => {
                HttpResponse::BadRequest().json(json!({ "error": self.to_string() }))
            }
            AppError::Checkout(e) => match e {
                CheckoutError::EmptyCart => {
                    HttpResponse::UnprocessableEntity().json(json!({ "error": e.to_string() }))
                }
                CheckoutError::ProductNotFound(_) => {
                    HttpResponse::NotFound().json(json!({ "error": e.to_string() }))
                }
                CheckoutError::InsufficientStock {
                    product_id,
                    available,
                    requested,
                } => HttpResponse::Conflict().json(json!({
                    "error": e.to_string(),
                    "product_id": product_id,
                    "available": available,
                    "requested": requested,
                })),
                CheckoutError::CommitConflict => {
                    HttpResponse::Conflict().json(json!({ "error": e.to_string() }))
                }
                // Mapped away by From<CheckoutError>; kept for exhaustiveness.
                CheckoutError::NotAuthenticated | CheckoutError::Store(_) => {
                    HttpResponse::InternalServerError()
                        .json(json!({ "error": "Internal server error" }))
                }
            },
            AppError::Internal(_) => HttpResponse::InternalServerError()
                .json(json!({ "error": "Internal server error" })),
        }
    }
}
