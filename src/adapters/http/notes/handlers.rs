//! Handlers for the notes CRUD surface.
//!
//! Ownership is existence-scoped: the repository only ever sees queries
//! scoped to the caller, so someone else's note answers 404, never 403.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;

use crate::domain::foundation::NoteId;
use crate::domain::note::validate_note;

use super::super::envelope::{self, Pagination};
use super::super::error::{ApiError, ApiJson};
use super::super::middleware::RequireAuth;
use super::super::AppState;
use super::dto::{ListNotesQuery, NoteDto, NoteRequest};

const MAX_PAGE_SIZE: u32 = 100;

fn note_not_found() -> ApiError {
    ApiError::not_found("NOTE_NOT_FOUND", "Note not found")
}

fn parse_note_id(raw: &str) -> Result<NoteId, ApiError> {
    NoteId::parse(raw).map_err(|_| ApiError::validation_field("id", "must be a valid UUID"))
}

/// POST /notes
pub async fn create_note(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiJson(req): ApiJson<NoteRequest>,
) -> Result<Response, ApiError> {
    validate_note(&req.title, &req.content)?;

    let note = state
        .notes
        .create(current.id, &req.title, &req.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(envelope::success(NoteDto::from(&note))),
    )
        .into_response())
}

/// GET /notes
pub async fn list_notes(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(query): Query<ListNotesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);

    let (notes, total) = state.notes.list_for_owner(current.id, page, limit).await?;
    let notes: Vec<NoteDto> = notes.iter().map(NoteDto::from).collect();

    Ok(Json(envelope::paginated(
        notes,
        Pagination::new(page, limit, total),
    )))
}

/// GET /notes/:id
pub async fn get_note(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_note_id(&id)?;
    let note = state
        .notes
        .find_for_owner(id, current.id)
        .await?
        .ok_or_else(note_not_found)?;

    Ok(Json(envelope::success(NoteDto::from(&note))))
}

/// PUT /notes/:id
pub async fn update_note(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<NoteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_note_id(&id)?;
    validate_note(&req.title, &req.content)?;

    let note = state
        .notes
        .update_for_owner(id, current.id, &req.title, &req.content, Utc::now())
        .await?
        .ok_or_else(note_not_found)?;

    Ok(Json(envelope::success(NoteDto::from(&note))))
}

/// DELETE /notes/:id
pub async fn delete_note(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_note_id(&id)?;
    let deleted = state.notes.delete_for_owner(id, current.id).await?;
    if !deleted {
        return Err(note_not_found());
    }

    Ok(Json(envelope::message_only("Note deleted")))
}
