use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ApiResponse;

/// Geolocation failures reported by clients, keyed to the platform error codes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied. Enable location access for this site in your browser settings and try again")]
    PermissionDenied,
    #[error("Current position is unavailable")]
    PositionUnavailable,
    #[error("Timed out waiting for a location fix")]
    Timeout,
}

impl LocationError {
    /// Platform geolocation error codes: 1 permission, 2 unavailable, 3 timeout.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(LocationError::PermissionDenied),
            2 => Some(LocationError::PositionUnavailable),
            3 => Some(LocationError::Timeout),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error(transparent)]
    Location(#[from] LocationError),
}

impl ServiceError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        ServiceError::Forbidden(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        ServiceError::InvalidArgument(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::InvalidArgument(_) | ServiceError::Location(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) | ServiceError::Store(sqlx::Error::RowNotFound) => {
                StatusCode::NOT_FOUND
            }
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // Store messages can leak connection details; keep those generic.
            ServiceError::Store(sqlx::Error::RowNotFound) => "Record not found".to_string(),
            ServiceError::Store(err) => {
                log::error!("Store error: {err:?}");
                "Store operation failed".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_error_codes_map_to_subtypes() {
        assert_eq!(
            LocationError::from_code(1),
            Some(LocationError::PermissionDenied)
        );
        assert_eq!(
            LocationError::from_code(2),
            Some(LocationError::PositionUnavailable)
        );
        assert_eq!(LocationError::from_code(3), Some(LocationError::Timeout));
        assert_eq!(LocationError::from_code(9), None);
    }

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            ServiceError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::forbidden("admin only").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::invalid("bad status").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::not_found("Business").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Location(LocationError::Timeout).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
