//! Route table for the note endpoints.

use axum::routing::get;
use axum::Router;

use super::super::AppState;
use super::handlers::{create_note, delete_note, get_note, list_notes, update_note};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notes).post(create_note))
        .route("/:id", get(get_note).put(update_note).delete(delete_note))
}
