use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;
use warp::Filter;
use warp::http::StatusCode;

use crate::auth::SessionStore;
use crate::error::ServiceError;
use crate::service::{CreateRentalRequest, RentalService};

#[derive(Debug)]
pub struct Unauthorized;
impl warp::reject::Reject for Unauthorized {}

// The session backend being unreachable is an infrastructure failure, not a
// bad token; it must not look like a 401 to callers.
#[derive(Debug)]
pub struct SessionUnavailable;
impl warp::reject::Reject for SessionUnavailable {}

#[derive(Debug)]
pub struct ServiceReject(pub ServiceError);
impl warp::reject::Reject for ServiceReject {}

#[derive(Deserialize)]
struct StatusAtQuery {
  datetime: DateTime<Utc>,
}

#[derive(Serialize)]
struct ErrorBody {
  error: String,
}

pub fn create_route(
  service: RentalService,
  sessions: Arc<dyn SessionStore>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
  warp::path!("rental_request")
    .and(warp::post())
    .and(with_owner(sessions))
    .and(warp::body::json())
    .and(with_service(service))
    .and_then(handle_create)
}

pub fn status_route(
  service: RentalService,
  sessions: Arc<dyn SessionStore>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
  warp::path!("rental_request" / Uuid / "status")
    .and(warp::get())
    .and(with_owner(sessions))
    .and(with_service(service))
    .and_then(handle_status)
}

pub fn status_at_route(
  service: RentalService,
  sessions: Arc<dyn SessionStore>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
  warp::path!("rental_request" / Uuid / "status_at")
    .and(warp::get())
    .and(with_owner(sessions))
    .and(warp::query::<StatusAtQuery>())
    .and(with_service(service))
    .and_then(handle_status_at)
}

fn with_service(
  service: RentalService,
) -> impl Filter<Extract = (RentalService,), Error = std::convert::Infallible> + Clone {
  warp::any().map(move || service.clone())
}

// Bearer-token auth: the session backend resolves the token to an owner id,
// which every handler below trusts without re-validating.
fn with_owner(
  sessions: Arc<dyn SessionStore>,
) -> impl Filter<Extract = (Uuid,), Error = warp::Rejection> + Clone {
  warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
    let sessions = sessions.clone();
    async move {
      let token = header
        .as_deref()
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| warp::reject::custom(Unauthorized))?;
      match sessions.resolve(token).await {
        Ok(Some(owner_id)) => Ok(owner_id),
        Ok(None) => Err(warp::reject::custom(Unauthorized)),
        Err(e) => {
          error!(error = %e, "session lookup failed");
          Err(warp::reject::custom(SessionUnavailable))
        }
      }
    }
  })
}

async fn handle_create(
  owner_id: Uuid,
  body: CreateRentalRequest,
  service: RentalService,
) -> Result<impl warp::Reply, warp::Rejection> {
  let request = service
    .create_request(owner_id, body)
    .await
    .map_err(|e| warp::reject::custom(ServiceReject(e)))?;
  Ok(warp::reply::with_status(warp::reply::json(&request), StatusCode::CREATED))
}

async fn handle_status(
  request_id: Uuid,
  _owner_id: Uuid,
  service: RentalService,
) -> Result<impl warp::Reply, warp::Rejection> {
  let event = service
    .get_status(request_id)
    .await
    .map_err(|e| warp::reject::custom(ServiceReject(e)))?;
  Ok(warp::reply::json(&event))
}

async fn handle_status_at(
  request_id: Uuid,
  _owner_id: Uuid,
  query: StatusAtQuery,
  service: RentalService,
) -> Result<impl warp::Reply, warp::Rejection> {
  let event = service
    .get_status_at(request_id, query.datetime)
    .await
    .map_err(|e| warp::reject::custom(ServiceReject(e)))?;
  Ok(warp::reply::json(&event))
}

pub async fn handle_rejection(err: warp::Rejection) -> Result<impl warp::Reply, warp::Rejection> {
  let (status, message) = if err.is_not_found() {
    (StatusCode::NOT_FOUND, "not found".to_string())
  } else if err.find::<Unauthorized>().is_some() {
    (StatusCode::UNAUTHORIZED, "missing or expired token".to_string())
  } else if err.find::<SessionUnavailable>().is_some() {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
  } else if let Some(ServiceReject(service_error)) = err.find::<ServiceReject>() {
    match service_error {
      ServiceError::InvalidDateRange => (StatusCode::BAD_REQUEST, service_error.to_string()),
      ServiceError::EquipmentNotFound
      | ServiceError::RentalRequestNotFound
      | ServiceError::NoStatusAtTime => (StatusCode::NOT_FOUND, service_error.to_string()),
      ServiceError::Store(e) => {
        error!(error = %e, "store failure on request path");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
      }
    }
  } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some()
    || err.find::<warp::reject::InvalidQuery>().is_some()
  {
    (StatusCode::BAD_REQUEST, "invalid request format".to_string())
  } else {
    return Err(err);
  };

  Ok(warp::reply::with_status(warp::reply::json(&ErrorBody { error: message }), status))
}
