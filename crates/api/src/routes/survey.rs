//! Route definitions for the `/surveys` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{participation, survey};
use crate::state::AppState;

/// Routes mounted at `/surveys`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete
/// POST   /{id}/participations   -> submit answers
/// GET    /{id}/participants     -> list participants
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(survey::list).post(survey::create))
        .route(
            "/{id}",
            get(survey::get_by_id)
                .put(survey::update)
                .delete(survey::delete),
        )
        .route("/{id}/participations", post(participation::create))
        .route("/{id}/participants", get(participation::list_participants))
}
