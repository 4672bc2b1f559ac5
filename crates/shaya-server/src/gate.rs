//! Access gate: extractors that resolve the session cookie to a user and
//! enforce the admin role.

use axum::{extract::FromRequestParts, http::request::Parts};
use shaya_core::{
  store::{AdminStore, EntityStore},
  user::{Role, User},
};

use crate::{AppState, auth::AuthService, error::ApiError, session};

/// The authenticated user making the request.
pub struct CurrentUser(pub User);

/// The authenticated user, who is also an admin.
pub struct RequireAdmin(pub User);

impl<S: AdminStore> FromRequestParts<AppState<S>> for CurrentUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token =
      session::token_from_headers(&parts.headers).ok_or(ApiError::NotAuthenticated)?;

    let claims = AuthService::new(state.store.as_ref(), &state.tokens)
      .validate_token(&token)
      .ok_or(ApiError::InvalidToken)?;
    let id = claims.user_id().ok_or(ApiError::InvalidToken)?;

    let user = EntityStore::<User>::get(state.store.as_ref(), id)
      .await
      .map_err(|e| ApiError::Core(e.into()))?
      .ok_or(ApiError::UserNotFound)?;

    Ok(Self(user))
  }
}

impl<S: AdminStore> FromRequestParts<AppState<S>> for RequireAdmin {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
    if user.role != Role::Admin {
      tracing::warn!(user = %user.username, "admin route refused");
      return Err(ApiError::Forbidden);
    }
    Ok(Self(user))
  }
}
