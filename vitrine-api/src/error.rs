use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use vitrine_core::{PricingError, RepoError};

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}

// `?` cannot convert a boxed repository error into anyhow directly.
pub fn repo_error(err: RepoError) -> AppError {
    AppError::Anyhow(anyhow::anyhow!(err))
}

/// Pricing errors keep "product missing" distinct so the storefront can
/// render a not-found page; everything else is a 500.
pub fn pricing_error(err: PricingError) -> AppError {
    match err {
        PricingError::ProductNotFound(id) => {
            AppError::NotFoundError(format!("product not found: {}", id))
        }
        PricingError::InvalidQuantity(q) => {
            AppError::ValidationError(format!("quantity must be positive, got {}", q))
        }
        other => AppError::Anyhow(other.into()),
    }
}
