//! `/auth` handlers: login, current user and logout.

use axum::{
  Json, Router,
  extract::State,
  http::header::SET_COOKIE,
  response::{AppendHeaders, IntoResponse},
  routing::{get, post},
};
use serde::{Deserialize, Serialize};
use shaya_core::{store::AdminStore, user::Role, validate};

use crate::{
  AppState,
  auth::AuthService,
  error::ApiError,
  gate::CurrentUser,
  handlers::{ApiJson, Message},
  session,
};

pub fn routes<S: AdminStore>() -> Router<AppState<S>> {
  Router::new()
    .route("/login",  post(login::<S>))
    .route("/me",     get(me))
    .route("/logout", post(logout::<S>))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Me {
  pub id:       i64,
  pub username: String,
  pub role:     Role,
}

pub async fn login<S: AdminStore>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
  validate::username(&body.username).map_err(shaya_core::Error::from)?;
  validate::password(&body.password).map_err(shaya_core::Error::from)?;

  let auth = AuthService::new(state.store.as_ref(), &state.tokens);
  let user = auth
    .authenticate(&body.username, &body.password)
    .await?
    .ok_or(ApiError::InvalidCredentials)?;

  let ttl = state.config.token_ttl();
  let token = auth.issue_token(user.id, ttl)?;
  let cookie = session::session_cookie(token, ttl, state.config.is_production());
  tracing::info!(user = %user.username, "logged in");

  Ok((
    AppendHeaders([(SET_COOKIE, cookie.to_string())]),
    Json(Message::new("Login exitoso")),
  ))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<Me> {
  Json(Me { id: user.id, username: user.username, role: user.role })
}

pub async fn logout<S: AdminStore>(
  State(state): State<AppState<S>>,
) -> impl IntoResponse {
  let cookie = session::removal_cookie(state.config.is_production());
  (
    AppendHeaders([(SET_COOKIE, cookie.to_string())]),
    Json(Message::new("Logout exitoso")),
  )
}
