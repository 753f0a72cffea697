//! Route definitions for `/participations` and `/answers`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{answer, participation};
use crate::state::AppState;

/// Routes mounted at `/participations`.
pub fn participation_router() -> Router<AppState> {
    Router::new().route("/{id}", get(participation::get_by_id))
}

/// Routes mounted at `/answers`.
///
/// ```text
/// GET    /        -> list
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn answer_router() -> Router<AppState> {
    Router::new().route("/", get(answer::list)).route(
        "/{id}",
        get(answer::get_by_id)
            .put(answer::update)
            .delete(answer::delete),
    )
}
