//! HTTP layer for the Shaya administrative backend.
//!
//! Exposes an axum [`Router`] with the auth routes and the CRUD routes of
//! users, customers and farmers, backed by any [`AdminStore`].

pub mod auth;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod session;
pub mod token;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Router,
  http::{HeaderValue, Method, header},
};
use serde::Deserialize;
use shaya_core::{customer::Customer, farmer::Farmer, store::AdminStore, user::User};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use handlers::entity;
use token::TokenSigner;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// under the process environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                      String,
  #[serde(default = "default_port")]
  pub port:                      u16,
  /// SQLite database file; `:memory:` for a throwaway store.
  #[serde(default = "default_db_name")]
  pub db_name:                   String,
  /// Accepted so existing deployment environments still load; the SQLite
  /// backend has no use for them.
  #[serde(default)]
  pub db_host:                   Option<String>,
  #[serde(default = "default_db_port")]
  pub db_port:                   u16,
  #[serde(default)]
  pub db_user:                   Option<String>,
  #[serde(default)]
  pub db_password:               Option<String>,
  /// HS256 key for session tokens.
  pub secret_key:                String,
  #[serde(default = "default_token_hours")]
  pub access_token_expire_hours: i64,
  /// Origin allowed to call the API with credentials.
  #[serde(default)]
  pub frontend_url:              Option<String>,
  #[serde(default = "default_env")]
  pub env:                       String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8000 }
fn default_db_name() -> String { "shaya.db".to_owned() }
fn default_db_port() -> u16 { 5432 }
fn default_token_hours() -> i64 { 8 }
fn default_env() -> String { "development".to_owned() }

impl ServerConfig {
  /// Production deployments mark the session cookie `Secure`.
  pub fn is_production(&self) -> bool {
    self.env.eq_ignore_ascii_case("production")
  }

  pub fn token_ttl(&self) -> chrono::Duration {
    chrono::Duration::hours(self.access_token_expire_hours)
  }

  /// Names of the set connection settings the SQLite backend ignores.
  pub fn ignored_db_settings(&self) -> Vec<&'static str> {
    [
      ("DB_HOST", self.db_host.is_some()),
      ("DB_USER", self.db_user.is_some()),
      ("DB_PASSWORD", self.db_password.is_some()),
    ]
    .into_iter()
    .filter_map(|(name, set)| set.then_some(name))
    .collect()
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenSigner>,
  pub config: Arc<ServerConfig>,
}

impl<S> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self {
      store:  Arc::new(store),
      tokens: Arc::new(TokenSigner::new(config.secret_key.as_bytes())),
      config: Arc::new(config),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      tokens: Arc::clone(&self.tokens),
      config: Arc::clone(&self.config),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the application [`Router`]. Every route is served both at the root
/// and under `/api/v1`.
pub fn router<S: AdminStore>(state: AppState<S>) -> Router {
  let api = Router::new()
    .nest("/auth",      handlers::auth::routes::<S>())
    .nest("/users",     entity::routes::<S, User>())
    .nest("/customers", entity::routes::<S, Customer>())
    .nest("/farmers",   entity::routes::<S, Farmer>());

  let mut app = Router::new()
    .merge(api.clone())
    .nest("/api/v1", api)
    .layer(TraceLayer::new_for_http());

  if let Some(cors) = state.config.frontend_url.as_deref().and_then(cors_layer) {
    app = app.layer(cors);
  }

  app.with_state(state)
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
  let Ok(origin) = HeaderValue::from_str(origin) else {
    tracing::warn!(origin, "ignoring invalid FRONTEND_URL");
    return None;
  };
  Some(
    CorsLayer::new()
      .allow_origin(origin)
      .allow_credentials(true)
      .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
      .allow_headers([header::CONTENT_TYPE]),
  )
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
  };
  use serde_json::{Value, json};
  use shaya_core::{
    person::PersonInput,
    service::EntityService,
    user::{NewUser, Role},
  };
  use shaya_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  pub(crate) fn test_config() -> ServerConfig {
    ServerConfig {
      host:                      "127.0.0.1".to_owned(),
      port:                      8000,
      db_name:                   ":memory:".to_owned(),
      db_host:                   None,
      db_port:                   5432,
      db_user:                   None,
      db_password:               None,
      secret_key:                "test-secret".to_owned(),
      access_token_expire_hours: 8,
      frontend_url:              None,
      env:                       "development".to_owned(),
    }
  }

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    for (username, role, document) in
      [("administrador", Role::Admin, "1"), ("consulta", Role::User, "2")]
    {
      EntityService::<_, User>::new(&store)
        .create(NewUser {
          username: username.into(),
          password: "secret1".into(),
          role,
          person: PersonInput {
            full_name:   username.into(),
            document:    document.into(),
            phone:       None,
            email:       format!("{username}@example.com"),
            observation: None,
          },
        })
        .await
        .unwrap();
    }
    AppState::new(store, test_config())
  }

  async fn send(
    state:  &AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    cookie: Option<&str>,
    body:   Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
      builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    router(state.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  /// Log in and return the `name=value` pair to send back as `Cookie`.
  async fn login(state: &AppState<SqliteStore>, username: &str) -> String {
    let resp = send(
      state,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": username, "password": "secret1" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp
      .headers()
      .get(header::SET_COOKIE)
      .unwrap()
      .to_str()
      .unwrap()
      .to_owned();
    set_cookie.split(';').next().unwrap().to_owned()
  }

  fn customer_body(document: &str, email: &str) -> Value {
    json!({
      "customerType": "mayorista",
      "address": "Calle 3 # 2-1",
      "city": "Pitalito",
      "person": {
        "full_name": "maria DE las mercedes",
        "document": document,
        "email": email
      }
    })
  }

  // ── Auth ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn login_sets_session_cookie() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": "administrador", "password": "secret1" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_owned();
    assert!(set_cookie.starts_with("access_token="), "{set_cookie}");
    assert!(set_cookie.contains("HttpOnly"), "{set_cookie}");
    assert!(set_cookie.contains("Max-Age=28800"), "{set_cookie}");
    assert_eq!(json_body(resp).await["message"], "Login exitoso");
  }

  #[tokio::test]
  async fn wrong_password_is_401() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": "administrador", "password": "wrong-one" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(json_body(resp).await["detail"], "Credenciales inválidas");
  }

  #[tokio::test]
  async fn short_login_password_is_a_validation_error() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": "administrador", "password": "123" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
      json_body(resp).await["detail"],
      "La contraseña debe tener al menos 6 caracteres"
    );
  }

  #[tokio::test]
  async fn me_reports_the_session_user() {
    let state = make_state().await;
    let cookie = login(&state, "consulta").await;

    let resp = send(&state, "GET", "/auth/me", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me = json_body(resp).await;
    assert_eq!(me["username"], "consulta");
    assert_eq!(me["role"], "user");
    assert!(me.get("hashed_password").is_none());
  }

  #[tokio::test]
  async fn me_without_cookie_is_401() {
    let state = make_state().await;
    let resp = send(&state, "GET", "/auth/me", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["detail"], "not authenticated");
  }

  #[tokio::test]
  async fn logout_clears_cookie() {
    let state = make_state().await;
    let resp = send(&state, "POST", "/auth/logout", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_owned();
    assert!(set_cookie.starts_with("access_token=;"), "{set_cookie}");
    assert!(set_cookie.contains("Max-Age=0"), "{set_cookie}");
    assert_eq!(json_body(resp).await["message"], "Logout exitoso");
  }

  // ── Entities ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn login_create_customer_then_get() {
    let state = make_state().await;
    let cookie = login(&state, "administrador").await;

    let resp = send(
      &state,
      "POST",
      "/customers/create",
      Some(&cookie),
      Some(customer_body("900100", "maria@example.com")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created = json_body(resp).await;
    let id = created["id"].as_i64().unwrap();

    let resp = send(
      &state,
      "GET",
      &format!("/customers/get/customer/{id}"),
      Some(&cookie),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = json_body(resp).await;
    assert_eq!(fetched["person"]["full_name"], "Maria de las Mercedes");
    assert_eq!(fetched["customerType"], "mayorista");
    assert_eq!(fetched, created);
  }

  #[tokio::test]
  async fn routes_are_also_served_under_api_v1() {
    let state = make_state().await;
    let cookie = login(&state, "administrador").await;
    let resp = send(&state, "GET", "/api/v1/users/get", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn plain_user_cannot_create() {
    let state = make_state().await;
    let cookie = login(&state, "consulta").await;
    let resp = send(
      &state,
      "POST",
      "/customers/create",
      Some(&cookie),
      Some(customer_body("900100", "maria@example.com")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(resp).await["detail"], "insufficient permissions");
  }

  #[tokio::test]
  async fn reads_require_a_session() {
    let state = make_state().await;
    let resp = send(&state, "GET", "/farmers/get", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp =
      send(&state, "GET", "/farmers/get", Some("access_token=forged"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["detail"], "invalid token");
  }

  #[tokio::test]
  async fn duplicate_document_is_reported() {
    let state = make_state().await;
    let cookie = login(&state, "administrador").await;

    // Document "1" belongs to the admin's own person.
    let resp = send(
      &state,
      "POST",
      "/customers/create",
      Some(&cookie),
      Some(customer_body("1", "otra@example.com")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["detail"], "document already exists");
  }

  #[tokio::test]
  async fn malformed_json_is_400_with_detail() {
    let state = make_state().await;
    let cookie = login(&state, "administrador").await;
    let resp = send(
      &state,
      "POST",
      "/farmers/create",
      Some(&cookie),
      Some(json!({ "farm_name": "La Palma" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["detail"].is_string());
  }

  #[tokio::test]
  async fn update_then_search_users_by_role() {
    let state = make_state().await;
    let cookie = login(&state, "administrador").await;

    let users = json_body(
      send(&state, "GET", "/users/get?role=user", Some(&cookie), None).await,
    )
    .await;
    let id = users[0]["id"].as_i64().unwrap();

    let resp = send(
      &state,
      "PUT",
      &format!("/users/update/{id}"),
      Some(&cookie),
      Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["role"], "admin");

    let admins = json_body(
      send(&state, "GET", "/users/get?role=admin", Some(&cookie), None).await,
    )
    .await;
    assert_eq!(admins.as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn role_query_on_customers_is_a_plain_listing() {
    let state = make_state().await;
    let cookie = login(&state, "administrador").await;
    for (document, email) in [("900100", "a@example.com"), ("900200", "b@example.com")] {
      let resp = send(
        &state,
        "POST",
        "/customers/create",
        Some(&cookie),
        Some(customer_body(document, email)),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = send(&state, "GET", "/customers/get?role=x", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let found = json_body(resp).await;
    let documents: Vec<_> = found
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["person"]["document"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(documents, ["900200", "900100"]);
  }

  #[tokio::test]
  async fn delete_reports_success_and_missing() {
    let state = make_state().await;
    let cookie = login(&state, "administrador").await;
    let created = json_body(
      send(
        &state,
        "POST",
        "/customers/create",
        Some(&cookie),
        Some(customer_body("900100", "maria@example.com")),
      )
      .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let resp =
      send(&state, "DELETE", &format!("/customers/delete/{id}"), Some(&cookie), None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      json_body(resp).await["message"],
      format!("Customer {id} deleted successfully")
    );

    let resp =
      send(&state, "DELETE", &format!("/customers/delete/{id}"), Some(&cookie), None)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["detail"], "Customer not found");
  }

  #[tokio::test]
  async fn bulk_create_needs_no_session_and_skips_bad_items() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/farmers/create-bulk",
      None,
      Some(json!([
        {
          "farm_name": "La Palma",
          "farm_location": "Vereda Uno",
          "person": { "full_name": "luis", "document": "10", "email": "luis@example.com" }
        },
        {
          "farm_name": "La Palma",
          "farm_location": "Vereda Dos",
          "person": { "full_name": "pedro", "document": "11", "email": "pedro@example.com" }
        }
      ])),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created = json_body(resp).await;
    assert_eq!(created.as_array().unwrap().len(), 1);
    assert_eq!(created[0]["person"]["full_name"], "Luis");
  }

  #[test]
  fn ignored_db_settings_are_listed() {
    let mut config = test_config();
    assert!(config.ignored_db_settings().is_empty());
    config.db_host = Some("db.internal".into());
    assert_eq!(config.ignored_db_settings(), ["DB_HOST"]);
  }
}
