use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", post(handlers::login))
        .route("/register", post(handlers::register))
        .route("/logout", post(handlers::logout))
        .route("/habits", post(handlers::add_habit))
        .route("/habits/:id/complete", post(handlers::complete_habit))
        .route("/habits/:id/delete", post(handlers::delete_habit))
        .route("/testing/date", post(handlers::set_test_date))
        .route("/theme/toggle", post(handlers::switch_theme))
        .route("/api/state", get(handlers::get_state))
        .route("/api/calendar", get(handlers::get_calendar))
        .with_state(state)
}
