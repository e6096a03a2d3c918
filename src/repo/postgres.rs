//! Postgres-backed repos.
//!
//! Colors are stored as their lowercase palette name, tags as `TEXT[]`,
//! timestamps as epoch milliseconds in `BIGINT`. A `BIGSERIAL seq` column
//! keeps creation order for reads.

use async_trait::async_trait;
use canvas::{Connection, ConnectionId, Note, NoteColor, NoteId};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{ConnectionRepo, NoteRepo, NoteUpdate, RepoError};

type NoteRow = (Uuid, String, String, Option<String>, f64, f64, f64, f64, String, Vec<String>, i64, i64);

const NOTE_COLUMNS: &str = "id, title, content, owner_id, x, y, width, height, color, tags, created_at, updated_at";

fn note_from_row(row: NoteRow) -> Note {
    let (id, title, content, owner_id, x, y, width, height, color, tags, created_at, updated_at) = row;
    Note {
        id,
        title,
        content,
        owner_id,
        x,
        y,
        width,
        height,
        color: NoteColor::from_name(&color),
        tags,
        created_at,
        updated_at,
    }
}

#[derive(Clone)]
pub struct PgNoteRepo {
    pool: PgPool,
}

impl PgNoteRepo {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepo for PgNoteRepo {
    async fn get_all(&self) -> Result<Vec<Note>, RepoError> {
        let rows = sqlx::query_as::<_, NoteRow>(&format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY seq"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(note_from_row).collect())
    }

    async fn get_by_id(&self, id: NoteId) -> Result<Option<Note>, RepoError> {
        let row = sqlx::query_as::<_, NoteRow>(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(note_from_row))
    }

    async fn create(&self, note: &Note) -> Result<NoteId, RepoError> {
        sqlx::query(
            "INSERT INTO notes (id, title, content, owner_id, x, y, width, height, color, tags, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(note.id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.owner_id)
        .bind(note.x)
        .bind(note.y)
        .bind(note.width)
        .bind(note.height)
        .bind(note.color.as_str())
        .bind(&note.tags)
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(&self.pool)
        .await?;
        debug!(id = %note.id, "note inserted");
        Ok(note.id)
    }

    async fn update(&self, id: NoteId, update: NoteUpdate) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE notes SET \
               title = COALESCE($2, title), \
               content = COALESCE($3, content), \
               color = COALESCE($4, color), \
               tags = COALESCE($5, tags), \
               x = COALESCE($6, x), \
               y = COALESCE($7, y), \
               updated_at = $8 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(update.title)
        .bind(update.content)
        .bind(update.color.map(NoteColor::as_str))
        .bind(update.tags)
        .bind(update.x)
        .bind(update.y)
        .bind(update.updated_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: NoteId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgConnectionRepo {
    pool: PgPool,
}

impl PgConnectionRepo {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionRepo for PgConnectionRepo {
    async fn get_all(&self) -> Result<Vec<Connection>, RepoError> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid, Uuid)>(
            "SELECT id, from_note_id, to_note_id FROM connections ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, from_note_id, to_note_id)| Connection { id, from_note_id, to_note_id })
            .collect())
    }

    async fn create(&self, connection: &Connection) -> Result<ConnectionId, RepoError> {
        sqlx::query("INSERT INTO connections (id, from_note_id, to_note_id) VALUES ($1, $2, $3)")
            .bind(connection.id)
            .bind(connection.from_note_id)
            .bind(connection.to_note_id)
            .execute(&self.pool)
            .await?;
        Ok(connection.id)
    }

    async fn delete(&self, id: ConnectionId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM connections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_by_note_id(&self, note_id: NoteId) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM connections WHERE from_note_id = $1 OR to_note_id = $1")
            .bind(note_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(all(test, feature = "live-db-tests"))]
#[path = "postgres_test.rs"]
mod tests;
