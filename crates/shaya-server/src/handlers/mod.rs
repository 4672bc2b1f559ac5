pub mod auth;
pub mod entity;

use axum::extract::{FromRequest, FromRequestParts};
use serde::Serialize;

use crate::error::ApiError;

/// `axum::Json` whose rejection is reported as `{"detail": ...}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` whose rejection is reported as `{"detail": ...}`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `axum::extract::Query` whose rejection is reported as `{"detail": ...}`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Body of the plain acknowledgement responses.
#[derive(Serialize)]
pub struct Message {
  pub message: String,
}

impl Message {
  pub fn new(message: impl Into<String>) -> Self {
    Self { message: message.into() }
  }
}
