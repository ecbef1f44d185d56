//! PostgreSQL implementation of the note repository.
//!
//! Every query carries the owner in its WHERE clause, so foreign notes
//! are indistinguishable from absent ones.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{AccountId, DomainError, NoteId};
use crate::domain::note::Note;
use crate::ports::NoteRepository;

use super::db_error;

pub struct PostgresNoteRepository {
    pool: PgPool,
}

impl PostgresNoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NoteRow {
    id: Uuid,
    account_id: Uuid,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: NoteId::from_uuid(row.id),
            account_id: AccountId::from_uuid(row.account_id),
            title: row.title,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl NoteRepository for PostgresNoteRepository {
    async fn create(
        &self,
        owner: AccountId,
        title: &str,
        content: &str,
    ) -> Result<Note, DomainError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            INSERT INTO notes (id, account_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner.as_uuid())
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("failed to create note", e))?;

        Ok(row.into())
    }

    async fn find_for_owner(
        &self,
        id: NoteId,
        owner: AccountId,
    ) -> Result<Option<Note>, DomainError> {
        let row = sqlx::query_as::<_, NoteRow>(
            "SELECT * FROM notes WHERE id = $1 AND account_id = $2",
        )
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("failed to load note", e))?;

        Ok(row.map(Into::into))
    }

    async fn list_for_owner(
        &self,
        owner: AccountId,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Note>, u64), DomainError> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE account_id = $1")
            .bind(owner.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("failed to count notes", e))?;

        let rows = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT * FROM notes
            WHERE account_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner.as_uuid())
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("failed to list notes", e))?;

        Ok((rows.into_iter().map(Into::into).collect(), total as u64))
    }

    async fn update_for_owner(
        &self,
        id: NoteId,
        owner: AccountId,
        title: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Note>, DomainError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            UPDATE notes
            SET title = $3, content = $4, updated_at = $5
            WHERE id = $1 AND account_id = $2
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .bind(title)
        .bind(content)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("failed to update note", e))?;

        Ok(row.map(Into::into))
    }

    async fn delete_for_owner(&self, id: NoteId, owner: AccountId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND account_id = $2")
            .bind(id.as_uuid())
            .bind(owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("failed to delete note", e))?;

        Ok(result.rows_affected() > 0)
    }
}
