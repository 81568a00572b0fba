//! Author table mapping and author-specific queries.
//!
//! # Invariants
//! - Table shape: `authors(id INTEGER PRIMARY KEY, name TEXT NOT NULL)`.

use crate::db::ConnectionProvider;
use crate::model::author::{Author, AuthorId};
use crate::model::{RowId, ValidationError};
use crate::repo::entity_repo::{Entity, EntityRepository};
use crate::repo::identity_map::Shared;
use crate::repo::sealed::AssignId;
use crate::repo::RepoResult;
use rusqlite::types::Value;
use rusqlite::Row;

/// Repository over the `authors` table.
pub type AuthorRepository<'db, P> = EntityRepository<'db, P, Author>;

/// Raw `authors` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRow {
    pub id: AuthorId,
    pub name: String,
}

impl AssignId for Author {
    fn assign_id(&mut self, id: Option<RowId>) {
        self.set_id(id);
    }
}

impl Entity for Author {
    type Row = AuthorRow;

    const TABLE: &'static str = "authors";
    const COLUMNS: &'static [&'static str] = &["name"];
    const CREATE_TABLE_SQL: &'static str = "CREATE TABLE IF NOT EXISTS authors (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );";

    fn id(&self) -> Option<RowId> {
        Author::id(self)
    }

    fn column_values(&self) -> Vec<Value> {
        vec![Value::Text(self.name().to_string())]
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<AuthorRow> {
        Ok(AuthorRow {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }

    fn row_id(row: &AuthorRow) -> RowId {
        row.id
    }

    fn from_row(row: AuthorRow) -> Result<Self, ValidationError> {
        let mut author = Author::new(row.name)?;
        author.set_id(Some(row.id));
        Ok(author)
    }
}

impl<P: ConnectionProvider> EntityRepository<'_, P, Author> {
    /// Builds, saves and tracks a new author.
    pub fn create(&mut self, name: impl Into<String>) -> RepoResult<Shared<Author>> {
        let author = Author::new(name)?;
        self.add(author)
    }

    /// First author (lowest id) with exactly this name.
    pub fn find_by_name(&mut self, name: &str) -> RepoResult<Option<Shared<Author>>> {
        self.find_first_where("name", Value::Text(name.to_string()))
    }
}
