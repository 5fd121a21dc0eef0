use axum::{
    routing::{delete, get},
    Router,
};

use super::handlers::{
    create_weekly_rule, delete_exception, delete_weekly_rule, list_exceptions, list_weekly_rules,
    upsert_exception,
};
use crate::app_state::AppState;

pub fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route("/rules", get(list_weekly_rules).post(create_weekly_rule))
        .route("/rules/{id}", delete(delete_weekly_rule))
        .route("/exceptions", get(list_exceptions).put(upsert_exception))
        .route("/exceptions/{date}", delete(delete_exception))
}
