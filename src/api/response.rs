// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{IntegrityError, RoutingError, StoreError};

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response with message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Data for an operation that finished but did not fully succeed
    pub fn partial(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(message.into()),
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
            ApiError::Unavailable(m) => {
                error!("Request failed: {}", m);
                (StatusCode::SERVICE_UNAVAILABLE, m)
            }
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::InvalidPath(_) => ApiError::BadRequest(err.to_string()),
            other => ApiError::Unavailable(other.to_string()),
        }
    }
}

impl From<RoutingError> for ApiError {
    fn from(err: RoutingError) -> Self {
        match err {
            RoutingError::NotFound(_) => ApiError::NotFound(err.to_string()),
            RoutingError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
            RoutingError::EmptyResponse => ApiError::BadRequest(err.to_string()),
            RoutingError::Store(e) => e.into(),
        }
    }
}

impl From<IntegrityError> for ApiError {
    fn from(err: IntegrityError) -> Self {
        match err {
            IntegrityError::NotFound(_) => ApiError::NotFound(err.to_string()),
            IntegrityError::Store(e) => e.into(),
        }
    }
}
