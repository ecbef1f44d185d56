//! Notes: the owner-scoped CRUD surface of the starter kit.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::foundation::{AccountId, NoteId};

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum content length in characters.
pub const MAX_CONTENT_LEN: usize = 50_000;

/// A note owned by exactly one account.
///
/// Ownership is existence-scoped: to any other account this note does not
/// exist, and lookups answer not-found rather than forbidden.
#[derive(Debug, Clone)]
pub struct Note {
    pub id: NoteId,
    pub account_id: AccountId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validation failures for note payloads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NoteError {
    #[error("Title must be between 1 and {MAX_TITLE_LEN} characters")]
    InvalidTitle,

    #[error("Content must be at most {MAX_CONTENT_LEN} characters")]
    ContentTooLong,
}

/// Validates a title/content pair before create or update.
pub fn validate_note(title: &str, content: &str) -> Result<(), NoteError> {
    let title_len = title.chars().count();
    if title_len == 0 || title_len > MAX_TITLE_LEN {
        return Err(NoteError::InvalidTitle);
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(NoteError::ContentTooLong);
    }
    Ok(())
}
