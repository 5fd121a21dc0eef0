use axum::{routing::get, Router};

use super::handlers::{list_day_slots, list_month_days, list_range_slots};
use crate::app_state::AppState;

pub fn availability_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_range_slots))
        .route("/{date}", get(list_day_slots))
        .route("/month/{year}/{month}", get(list_month_days))
}
