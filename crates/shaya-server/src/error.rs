//! Error types and axum `IntoResponse` implementation.
//!
//! Every error reaches the client as JSON `{"detail": "<message>"}`.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] shaya_core::Error),

  #[error("not authenticated")]
  NotAuthenticated,

  #[error("invalid token")]
  InvalidToken,

  #[error("user not found")]
  UserNotFound,

  #[error("Credenciales inválidas")]
  InvalidCredentials,

  #[error("insufficient permissions")]
  Forbidden,

  /// A request body, path or query string that could not be parsed.
  #[error("{0}")]
  BadRequest(String),

  #[error("token error: {0}")]
  Token(#[from] jsonwebtoken::errors::Error),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    use shaya_core::Error as Core;

    match self {
      Self::Core(Core::Validation(_) | Core::Conflict(_) | Core::Integrity(_)) => {
        StatusCode::BAD_REQUEST
      }
      Self::Core(Core::NotFound(_)) => StatusCode::NOT_FOUND,
      Self::Core(Core::PasswordHash(_) | Core::Store(_)) | Self::Token(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
      Self::NotAuthenticated
      | Self::InvalidToken
      | Self::UserNotFound
      | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
      Self::Forbidden => StatusCode::FORBIDDEN,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();

    let detail = match &self {
      // Constraint text names tables and columns; keep it in the log.
      Self::Core(shaya_core::Error::Integrity(msg)) => {
        tracing::warn!(constraint = %msg, "unmapped integrity violation");
        "database integrity error".to_owned()
      }
      other => {
        if status.is_server_error() {
          tracing::error!(error = %other, "request failed");
        }
        other.to_string()
      }
    };

    (status, Json(json!({ "detail": detail }))).into_response()
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use shaya_core::{
    entity::UniqueField,
    validate::{Field, ValidationError},
  };

  async fn body(err: ApiError) -> (StatusCode, serde_json::Value) {
    let resp = err.into_response();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn validation_uses_field_message() {
    let err = ApiError::from(shaya_core::Error::from(ValidationError(Field::Phone)));
    let (status, json) = body(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
      json["detail"],
      "El número debe ser un valor númerico de 10 caracteres"
    );
  }

  #[tokio::test]
  async fn conflict_names_the_field() {
    let err = ApiError::from(shaya_core::Error::Conflict(UniqueField::FarmName));
    let (status, json) = body(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "farm_name already exists");
  }

  #[tokio::test]
  async fn integrity_detail_is_generic() {
    let err = ApiError::from(shaya_core::Error::Integrity(
      "UNIQUE constraint failed: users.person_id".into(),
    ));
    let (status, json) = body(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "database integrity error");
  }

  #[tokio::test]
  async fn not_found_and_auth_statuses() {
    let (status, json) =
      body(ApiError::from(shaya_core::Error::NotFound("Farmer"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["detail"], "Farmer not found");

    let (status, json) = body(ApiError::InvalidCredentials).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["detail"], "Credenciales inválidas");

    let (status, _) = body(ApiError::Forbidden).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }
}
