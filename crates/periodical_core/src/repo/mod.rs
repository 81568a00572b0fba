//! Repository layer: table lifecycle, CRUD and identity maps.
//!
//! # Responsibility
//! - Keep SQL details inside the persistence boundary.
//! - Keep one in-memory instance per stored row within a repository scope.
//!
//! # Invariants
//! - Identity maps change only after the matching statement succeeded.
//! - Rows read from storage pass the same validation as in-memory writes.
//! - Storage errors are returned unchanged inside `RepoError::Db`.

use crate::db::DbError;
use crate::model::{RowId, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod article_repo;
pub mod author_repo;
pub mod entity_repo;
pub mod identity_map;
pub mod magazine_repo;

mod sealed {
    use crate::model::RowId;

    /// Storage-side id assignment. Unreachable outside the crate, so ids only
    /// ever come from INSERT, DELETE or a stored row.
    pub trait AssignId {
        fn assign_id(&mut self, id: Option<RowId>);
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// An update targeted a row that no longer exists.
    NotFound { table: &'static str, id: RowId },
    /// The operation needs a saved instance but got a draft.
    Unsaved { table: &'static str },
    /// A tracked instance is borrowed by the caller while the repository
    /// needs to write to it.
    Borrowed {
        table: &'static str,
        id: Option<RowId>,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "row not found: {table}.id={id}"),
            Self::Unsaved { table } => {
                write!(f, "instance has not been saved to `{table}` yet")
            }
            Self::Borrowed { table, id: Some(id) } => {
                write!(f, "instance {table}.id={id} is borrowed elsewhere")
            }
            Self::Borrowed { table, id: None } => {
                write!(f, "draft `{table}` instance is borrowed elsewhere")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::Unsaved { .. } | Self::Borrowed { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
