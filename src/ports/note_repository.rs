//! NoteRepository port - owner-scoped note storage.
//!
//! Every read and write is scoped by owner in the query itself, so a note
//! belonging to someone else is indistinguishable from one that does not
//! exist. Handlers translate `None`/`false` into 404.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::{AccountId, DomainError, NoteId};
use crate::domain::note::Note;

/// Port for note storage.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn create(
        &self,
        owner: AccountId,
        title: &str,
        content: &str,
    ) -> Result<Note, DomainError>;

    /// Fetch a note iff it exists and belongs to `owner`.
    async fn find_for_owner(
        &self,
        id: NoteId,
        owner: AccountId,
    ) -> Result<Option<Note>, DomainError>;

    /// Newest-first page of the owner's notes plus the total count.
    async fn list_for_owner(
        &self,
        owner: AccountId,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Note>, u64), DomainError>;

    /// Update a note iff it belongs to `owner`; `None` otherwise.
    async fn update_for_owner(
        &self,
        id: NoteId,
        owner: AccountId,
        title: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Note>, DomainError>;

    /// Delete a note iff it belongs to `owner`; returns whether a row went away.
    async fn delete_for_owner(&self, id: NoteId, owner: AccountId) -> Result<bool, DomainError>;
}
