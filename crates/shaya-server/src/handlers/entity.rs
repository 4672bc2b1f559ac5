//! CRUD handlers shared by the `/users`, `/customers` and `/farmers` routes.

use axum::{
  Json, Router,
  extract::State,
  routing::{delete, get, post, put},
};
use serde::{Deserialize, de::DeserializeOwned};
use shaya_core::{
  customer::Customer,
  entity::RoleEntity,
  farmer::Farmer,
  service::EntityService,
  store::{AdminStore, EntityStore, SearchQuery},
  user::{Role, User},
};

use crate::{
  AppState,
  error::ApiError,
  gate::{CurrentUser, RequireAdmin},
  handlers::{ApiJson, ApiPath, ApiQuery, Message},
};

/// A role entity exposed over HTTP.
pub trait Resource:
  RoleEntity<New: DeserializeOwned, Patch: DeserializeOwned>
{
  /// Segment in `/get/{segment}/{id}`.
  const SEGMENT: &'static str;
  /// Whether `GET /get` honours the `role` query parameter.
  const FILTERS_BY_ROLE: bool = false;
}

impl Resource for User {
  const SEGMENT: &'static str = "user";
  const FILTERS_BY_ROLE: bool = true;
}

impl Resource for Customer {
  const SEGMENT: &'static str = "customer";
}

impl Resource for Farmer {
  const SEGMENT: &'static str = "farmer";
}

/// The six routes of one entity, to be nested under its collection path.
pub fn routes<S, E>() -> Router<AppState<S>>
where
  S: AdminStore + EntityStore<E>,
  E: Resource,
{
  Router::new()
    .route("/create",       post(create::<S, E>))
    .route("/create-bulk",  post(create_bulk::<S, E>))
    .route("/update/{id}",  put(update::<S, E>))
    .route("/get",          get(search::<S, E>))
    .route(&format!("/get/{}/{{id}}", E::SEGMENT), get(fetch::<S, E>))
    .route("/delete/{id}",  delete(remove::<S, E>))
}

fn service<S, E>(state: &AppState<S>) -> EntityService<'_, S, E>
where
  S: AdminStore + EntityStore<E>,
  E: Resource,
{
  EntityService::new(state.store.as_ref())
}

// ─── Handlers ────────────────────────────────────────────────────────────────

pub async fn create<S, E>(
  State(state): State<AppState<S>>,
  RequireAdmin(_): RequireAdmin,
  ApiJson(input): ApiJson<E::New>,
) -> Result<Json<E>, ApiError>
where
  S: AdminStore + EntityStore<E>,
  E: Resource,
{
  Ok(Json(service::<S, E>(&state).create(input).await?))
}

/// Unauthenticated; failing items are skipped.
pub async fn create_bulk<S, E>(
  State(state): State<AppState<S>>,
  ApiJson(items): ApiJson<Vec<E::New>>,
) -> Json<Vec<E>>
where
  S: AdminStore + EntityStore<E>,
  E: Resource,
{
  Json(service::<S, E>(&state).create_bulk(items).await)
}

pub async fn update<S, E>(
  State(state): State<AppState<S>>,
  RequireAdmin(_): RequireAdmin,
  ApiPath(id): ApiPath<i64>,
  ApiJson(patch): ApiJson<E::Patch>,
) -> Result<Json<E>, ApiError>
where
  S: AdminStore + EntityStore<E>,
  E: Resource,
{
  Ok(Json(service::<S, E>(&state).update(id, patch).await?))
}

pub async fn fetch<S, E>(
  State(state): State<AppState<S>>,
  CurrentUser(_): CurrentUser,
  ApiPath(id): ApiPath<i64>,
) -> Result<Json<E>, ApiError>
where
  S: AdminStore + EntityStore<E>,
  E: Resource,
{
  Ok(Json(service::<S, E>(&state).get(id).await?))
}

/// Query string of `GET /get`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
  pub search: Option<String>,
  pub role:   Option<String>,
}

impl SearchParams {
  /// `role` is dropped unparsed for entities without one.
  fn into_query<E: Resource>(self) -> Result<SearchQuery, ApiError> {
    let role = self
      .role
      .filter(|r| E::FILTERS_BY_ROLE && !r.is_empty())
      .map(|r| r.parse::<Role>())
      .transpose()
      .map_err(shaya_core::Error::from)?;
    Ok(SearchQuery { text: self.search, role })
  }
}

pub async fn search<S, E>(
  State(state): State<AppState<S>>,
  CurrentUser(_): CurrentUser,
  ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Vec<E>>, ApiError>
where
  S: AdminStore + EntityStore<E>,
  E: Resource,
{
  let query = params.into_query::<E>()?;
  Ok(Json(service::<S, E>(&state).search(&query).await?))
}

pub async fn remove<S, E>(
  State(state): State<AppState<S>>,
  RequireAdmin(_): RequireAdmin,
  ApiPath(id): ApiPath<i64>,
) -> Result<Json<Message>, ApiError>
where
  S: AdminStore + EntityStore<E>,
  E: Resource,
{
  if !service::<S, E>(&state).delete(id).await? {
    return Err(shaya_core::Error::NotFound(E::NAME).into());
  }
  Ok(Json(Message::new(format!("{} {id} deleted successfully", E::NAME))))
}
