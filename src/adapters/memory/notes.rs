//! In-memory note repository.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::{AccountId, DomainError, NoteId};
use crate::domain::note::Note;
use crate::ports::NoteRepository;

#[derive(Default)]
pub struct MemoryNoteRepository {
    notes: Mutex<Vec<Note>>,
}

impl MemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteRepository for MemoryNoteRepository {
    async fn create(
        &self,
        owner: AccountId,
        title: &str,
        content: &str,
    ) -> Result<Note, DomainError> {
        let now = Utc::now();
        let note = Note {
            id: NoteId::generate(),
            account_id: owner,
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.notes.lock().unwrap().push(note.clone());
        Ok(note)
    }

    async fn find_for_owner(
        &self,
        id: NoteId,
        owner: AccountId,
    ) -> Result<Option<Note>, DomainError> {
        Ok(self
            .notes
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == id && n.account_id == owner)
            .cloned())
    }

    async fn list_for_owner(
        &self,
        owner: AccountId,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Note>, u64), DomainError> {
        let notes = self.notes.lock().unwrap();
        let mut owned: Vec<Note> = notes
            .iter()
            .filter(|n| n.account_id == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = owned.len() as u64;
        let offset = (page.saturating_sub(1) as usize) * limit as usize;
        let page_items = owned.into_iter().skip(offset).take(limit as usize).collect();
        Ok((page_items, total))
    }

    async fn update_for_owner(
        &self,
        id: NoteId,
        owner: AccountId,
        title: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Note>, DomainError> {
        let mut notes = self.notes.lock().unwrap();
        let Some(note) = notes
            .iter_mut()
            .find(|n| n.id == id && n.account_id == owner)
        else {
            return Ok(None);
        };
        note.title = title.to_string();
        note.content = content.to_string();
        note.updated_at = updated_at;
        Ok(Some(note.clone()))
    }

    async fn delete_for_owner(&self, id: NoteId, owner: AccountId) -> Result<bool, DomainError> {
        let mut notes = self.notes.lock().unwrap();
        let before = notes.len();
        notes.retain(|n| !(n.id == id && n.account_id == owner));
        Ok(notes.len() < before)
    }
}
