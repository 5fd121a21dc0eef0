use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{cancel_booking, create_booking, get_booking, reschedule_booking};
use crate::app_state::AppState;

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/{id}", get(get_booking))
        .route("/{id}/cancel", post(cancel_booking))
        .route("/{id}/reschedule", post(reschedule_booking))
}
