use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// 字段约束，校验失败时随字段名一起返回
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    NonEmpty,
    Finite,
    AtLeast(f64),
    GreaterThan(f64),
    Between(f64, f64),
}

impl Constraint {
    pub fn admits(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match *self {
            Constraint::NonEmpty | Constraint::Finite => true,
            Constraint::AtLeast(min) => value >= min,
            Constraint::GreaterThan(min) => value > min,
            Constraint::Between(min, max) => value >= min && value <= max,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::NonEmpty => write!(f, "must not be empty"),
            Constraint::Finite => write!(f, "must be a finite number"),
            Constraint::AtLeast(min) => write!(f, "must be at least {}", min),
            Constraint::GreaterThan(min) => write!(f, "must be greater than {}", min),
            Constraint::Between(min, max) => write!(f, "must be between {} and {}", min, max),
        }
    }
}

/// 核心计算唯一会抛出的错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: {field}")]
    Missing { field: &'static str },

    #[error("Invalid {field}: must be a number")]
    NotNumeric { field: &'static str },

    #[error("Invalid {field}: must be a string")]
    NotText { field: &'static str },

    #[error("Invalid {field}: {constraint}")]
    OutOfRange {
        field: &'static str,
        constraint: Constraint,
    },

    #[error("Invalid {field}: result is not a finite number")]
    NonFiniteResult { field: &'static str },

    #[error("Invalid email address")]
    InvalidEmail,
}

impl ValidationError {
    /// 出错字段名（如有）
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NotNumeric { field }
            | ValidationError::NotText { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::NonFiniteResult { field } => Some(field),
            ValidationError::InvalidEmail => Some("email"),
            ValidationError::NotAnObject => None,
        }
    }
}

/// 服务层错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Scenario {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// 错误响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database failure: {:?}", e);
                "Internal storage error".to_string()
            }
            other => {
                tracing::warn!("Request rejected: {}", other);
                other.to_string()
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_messages() {
        assert_eq!(Constraint::AtLeast(1.0).to_string(), "must be at least 1");
        assert_eq!(Constraint::GreaterThan(0.0).to_string(), "must be greater than 0");
        assert_eq!(
            Constraint::Between(0.0, 100.0).to_string(),
            "must be between 0 and 100"
        );
    }

    #[test]
    fn test_constraint_rejects_non_finite() {
        assert!(!Constraint::AtLeast(0.0).admits(f64::INFINITY));
        assert!(!Constraint::Finite.admits(f64::NAN));
        assert!(Constraint::Between(0.0, 100.0).admits(100.0));
        assert!(!Constraint::GreaterThan(0.0).admits(0.0));
    }

    #[test]
    fn test_validation_error_names_field_and_constraint() {
        let err = ValidationError::OutOfRange {
            field: "error_rate_manual",
            constraint: Constraint::Between(0.0, 100.0),
        };
        assert_eq!(err.field(), Some("error_rate_manual"));
        assert_eq!(
            err.to_string(),
            "Invalid error_rate_manual: must be between 0 and 100"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::from(ValidationError::InvalidEmail).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound(Uuid::nil()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
