pub mod answer;
pub mod health;
pub mod survey;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /surveys                        list, create
/// /surveys/{id}                   get, update (reconcile), delete
/// /surveys/{id}/participations    submit answers
/// /surveys/{id}/participants      participant list
/// /participations/{id}            one participation with its answers
/// /answers, /answers/{id}         answer CRUD (no create; answers arrive
///                                 with a participation)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/surveys", survey::router())
        .nest("/participations", answer::participation_router())
        .nest("/answers", answer::answer_router())
}
