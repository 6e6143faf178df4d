use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::application::usecases::{
    clients::ClientError, packages::PackageError, plan_assignment::PlanAssignmentError,
    revenue_reports::RevenueReportError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ConflictRace(String),

    #[error("Service temporarily unavailable")]
    StoreUnavailable(#[source] anyhow::Error),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidIdentifier(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictRace(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Store and internal details are logged, never returned.
        match &self {
            AppError::StoreUnavailable(err) => {
                error!(status = status.as_u16(), error = ?err, "http: store unavailable")
            }
            AppError::Internal(err) => {
                error!(status = status.as_u16(), error = ?err, "http: internal error")
            }
            _ => {}
        }

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<PlanAssignmentError> for AppError {
    fn from(err: PlanAssignmentError) -> Self {
        let message = err.to_string();
        match err {
            PlanAssignmentError::InvalidIdentifier(_) => AppError::InvalidIdentifier(message),
            PlanAssignmentError::BadRequest(_) => AppError::BadRequest(message),
            PlanAssignmentError::Forbidden(_) => AppError::Forbidden(message),
            PlanAssignmentError::NotFound(_) => AppError::NotFound(message),
            PlanAssignmentError::ConflictRace => AppError::ConflictRace(message),
            PlanAssignmentError::StoreUnavailable(err) => AppError::StoreUnavailable(err),
            PlanAssignmentError::Internal(err) => AppError::Internal(err),
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let message = err.to_string();
        match err {
            ClientError::InvalidIdentifier(_) => AppError::InvalidIdentifier(message),
            ClientError::BadRequest(_) => AppError::BadRequest(message),
            ClientError::Forbidden(_) => AppError::Forbidden(message),
            ClientError::NotFound(_) => AppError::NotFound(message),
            ClientError::StoreUnavailable(err) => AppError::StoreUnavailable(err),
            ClientError::Internal(err) => AppError::Internal(err),
        }
    }
}

impl From<RevenueReportError> for AppError {
    fn from(err: RevenueReportError) -> Self {
        let message = err.to_string();
        match err {
            RevenueReportError::BadRequest(_) => AppError::BadRequest(message),
            RevenueReportError::Forbidden(_) => AppError::Forbidden(message),
            RevenueReportError::StoreUnavailable(err) => AppError::StoreUnavailable(err),
            RevenueReportError::Internal(err) => AppError::Internal(err),
        }
    }
}

impl From<PackageError> for AppError {
    fn from(err: PackageError) -> Self {
        match err {
            PackageError::StoreUnavailable(err) => AppError::StoreUnavailable(err),
            PackageError::Internal(err) => AppError::Internal(err),
        }
    }
}
