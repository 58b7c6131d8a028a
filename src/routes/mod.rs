pub mod contact;

use axum::Router;
use axum::routing::post;

use crate::state::SharedState;

pub fn contact_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/v1/contact", post(contact::submit))
        .route("/api/v1/contact/validate", post(contact::validate))
}
