pub mod availability;
pub mod event;
pub mod health;
pub mod me;
pub mod notification;
pub mod schedule;
pub mod search;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /events                                  create (POST)
/// /events/upcoming                         upcoming events
/// /events/{id}                             get, update (PUT), delete
/// /events/{id}/accept                      accept (POST)
/// /events/{id}/favorite                    favorite (POST), unfavorite (DELETE)
/// /events/{id}/contact                     contact the owner (POST)
/// /events/{id}/calendar                    mirror to external calendar (POST)
///
/// /me/events                               events the caller owns
/// /me/favorites                            the caller's favorites
/// /me/contacts                             the caller's contacts
///
/// /availability                            list, submit (POST)
/// /availability/{id}                       remove (DELETE)
/// /availability/overlapping                windows overlapping a range
/// /availability/free                       free/busy check
///
/// /schedule                                reconciled schedule
/// /schedule/available                      availability check incl. events
///
/// /search                                  event search (POST)
/// /search/sample                           random sample of matches (POST)
/// /search/available                        free users among candidates (POST)
///
/// /notifications                           list
/// /notifications/{id}/read                 mark read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/events", event::router())
        .nest("/me", me::router())
        .nest("/availability", availability::router())
        .nest("/schedule", schedule::router())
        .nest("/search", search::router())
        .nest("/notifications", notification::router())
}
