//! Article table mapping and article-specific queries.
//!
//! # Responsibility
//! - Declare the `articles` table with its author/magazine foreign keys.
//! - Provide title and reference lookups.
//!
//! # Invariants
//! - Foreign keys are declared in the schema and enforced by SQLite when
//!   the provider enables `foreign_keys`; nothing is checked in memory.

use crate::db::ConnectionProvider;
use crate::model::article::{Article, ArticleId};
use crate::model::author::{Author, AuthorId};
use crate::model::magazine::{Magazine, MagazineId};
use crate::model::{RowId, ValidationError};
use crate::repo::entity_repo::{Entity, EntityRepository};
use crate::repo::identity_map::Shared;
use crate::repo::sealed::AssignId;
use crate::repo::RepoResult;
use rusqlite::types::Value;
use rusqlite::Row;

/// Repository over the `articles` table.
pub type ArticleRepository<'db, P> = EntityRepository<'db, P, Article>;

/// Raw `articles` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRow {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
    pub author_id: AuthorId,
    pub magazine_id: MagazineId,
}

impl AssignId for Article {
    fn assign_id(&mut self, id: Option<RowId>) {
        self.set_id(id);
    }
}

impl Entity for Article {
    type Row = ArticleRow;

    const TABLE: &'static str = "articles";
    const COLUMNS: &'static [&'static str] = &["title", "content", "author_id", "magazine_id"];
    const CREATE_TABLE_SQL: &'static str = "CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        author_id INTEGER NOT NULL,
        magazine_id INTEGER NOT NULL,
        FOREIGN KEY (author_id) REFERENCES authors(id),
        FOREIGN KEY (magazine_id) REFERENCES magazines(id)
    );";

    fn id(&self) -> Option<RowId> {
        Article::id(self)
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title().to_string()),
            Value::Text(self.content().to_string()),
            Value::Integer(self.author_id()),
            Value::Integer(self.magazine_id()),
        ]
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<ArticleRow> {
        Ok(ArticleRow {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            author_id: row.get(3)?,
            magazine_id: row.get(4)?,
        })
    }

    fn row_id(row: &ArticleRow) -> RowId {
        row.id
    }

    fn from_row(row: ArticleRow) -> Result<Self, ValidationError> {
        let mut article = Article::new(row.title, row.content, row.author_id, row.magazine_id)?;
        article.set_id(Some(row.id));
        Ok(article)
    }
}

impl<P: ConnectionProvider> EntityRepository<'_, P, Article> {
    /// Builds an article for saved `author` and `magazine`, saves and tracks
    /// it.
    ///
    /// # Errors
    /// - `RepoError::Validation` when an attribute is invalid or either
    ///   reference is still a draft; nothing is written.
    /// - `RepoError::Db` when storage rejects the row, e.g. a foreign key
    ///   pointing at a deleted author.
    pub fn create(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        author: &Author,
        magazine: &Magazine,
    ) -> RepoResult<Shared<Article>> {
        let article = Article::for_entities(title, content, author, magazine)?;
        self.add(article)
    }

    pub fn find_by_title(&mut self, title: &str) -> RepoResult<Option<Shared<Article>>> {
        self.find_first_where("title", Value::Text(title.to_string()))
    }

    /// Every article written by `author_id`, in id order.
    pub fn find_by_author(&mut self, author_id: AuthorId) -> RepoResult<Vec<Shared<Article>>> {
        self.find_all_where("author_id", Value::Integer(author_id))
    }

    /// Every article published in `magazine_id`, in id order.
    pub fn find_by_magazine(
        &mut self,
        magazine_id: MagazineId,
    ) -> RepoResult<Vec<Shared<Article>>> {
        self.find_all_where("magazine_id", Value::Integer(magazine_id))
    }
}
