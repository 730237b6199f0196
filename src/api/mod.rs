//! REST API module.
//!
//! Handlers return [`ApiResult`]; success bodies share the `{status: "success", ...}`
//! envelope and failures go through [`AppError`]'s error envelope.

mod accounts;
mod categories;
mod settings;
mod styles;
mod tattoos;
mod upload;

pub use accounts::*;
pub use categories::*;
pub use settings::*;
pub use styles::*;
pub use tattoos::*;
pub use upload::*;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::Pagination;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip)]
    pub status_code: StatusCode,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            status_code: StatusCode::OK,
            status: "success",
            count: None,
            total: None,
            pagination: None,
            message: None,
            token: None,
            data: Some(data),
        }
    }

    /// Respond with `201 Created`.
    pub fn created(mut self) -> Self {
        self.status_code = StatusCode::CREATED;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// A full listing; `count` is the number of items returned.
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            ..Self::new(items)
        }
    }

    /// One page of a listing.
    pub fn page(items: Vec<T>, pagination: Pagination) -> Self {
        Self {
            total: Some(pagination.total),
            pagination: Some(pagination),
            ..Self::list(items)
        }
    }
}

impl ApiResponse<()> {
    /// A body with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            ..Self::new(())
        }
        .with_message(message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// JSON body extractor whose rejections use the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
