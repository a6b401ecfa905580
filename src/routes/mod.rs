use std::sync::Arc;

use warp::Filter;

use crate::auth::SessionStore;
use crate::service::RentalService;

pub mod rental_requests;

pub fn routes(
  service: RentalService,
  sessions: Arc<dyn SessionStore>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
  rental_requests::create_route(service.clone(), sessions.clone())
    .or(rental_requests::status_route(service.clone(), sessions.clone()))
    .or(rental_requests::status_at_route(service, sessions))
    .recover(rental_requests::handle_rejection)
}
