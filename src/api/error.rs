use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

use crate::domain::customer::CustomerError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Customer(#[from] CustomerError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::BadRequest(_) => "invalid_argument",
            Self::Customer(e) => e.kind(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Customer(e) => match e {
                CustomerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                CustomerError::NotFound(_) | CustomerError::PhoneNotFound { .. } => StatusCode::NOT_FOUND,
                CustomerError::Conflict { .. } => StatusCode::CONFLICT,
                CustomerError::Storage(_) | CustomerError::ConfirmationFailed { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // storage details stay in the logs
        let message = if status.is_server_error() {
            "internal error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ErrorBody {
            error: self.kind(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Unauthenticated("missing merchant"), StatusCode::UNAUTHORIZED),
            (ApiError::BadRequest("bad json".into()), StatusCode::BAD_REQUEST),
            (CustomerError::invalid_argument("bad id").into(), StatusCode::BAD_REQUEST),
            (CustomerError::NotFound(Uuid::nil()).into(), StatusCode::NOT_FOUND),
            (
                CustomerError::PhoneNotFound { merchant_id: Uuid::nil(), phone: "1".into() }.into(),
                StatusCode::NOT_FOUND,
            ),
            (
                CustomerError::Conflict { merchant_id: Uuid::nil(), phone: "1".into() }.into(),
                StatusCode::CONFLICT,
            ),
            (CustomerError::storage(anyhow::anyhow!("down")).into(), StatusCode::INTERNAL_SERVER_ERROR),
            (
                CustomerError::ConfirmationFailed { customer_id: Uuid::nil(), reason: "x".into() }.into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected, "{err}");
        }
    }
}
