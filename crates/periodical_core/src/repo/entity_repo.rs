//! Generic table repository shared by every entity.
//!
//! # Responsibility
//! - Issue table lifecycle and CRUD statements for one entity table.
//! - Route every read through the repository's identity map.
//!
//! # Invariants
//! - Each public operation runs exactly one statement through the provider.
//! - `save` on a draft registers the instance only after INSERT succeeded.
//! - `delete` evicts the instance only after DELETE succeeded, and every
//!   tracked handle for the deleted id becomes a draft.
//! - Handles are borrowed with `try_borrow*`; conflicts are reported as
//!   `RepoError::Borrowed` before any statement runs.

use crate::db::{ConnectionProvider, DbResult};
use crate::model::{RowId, ValidationError};
use crate::repo::identity_map::{read_handle, shared, write_handle, IdentityMap, Shared};
use crate::repo::sealed::AssignId;
use crate::repo::{RepoError, RepoResult};
use log::{debug, info, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::rc::Rc;

/// Persistence contract implemented by each domain record.
///
/// `COLUMNS` lists the non-key columns in the order used by
/// `column_values` and by the SELECT projection after `id`.
///
/// Sealed: only the crate's own records implement it, and ids can only be
/// assigned by the repository.
///
/// ```compile_fail
/// use periodical_core::{Author, Entity};
///
/// let mut author = Author::new("Ada").unwrap();
/// <Author as Entity>::set_id(&mut author, Some(1));
/// ```
pub trait Entity: AssignId + Sized {
    /// Unvalidated row as read from storage, including its id.
    type Row;

    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    const CREATE_TABLE_SQL: &'static str;

    fn id(&self) -> Option<RowId>;
    fn column_values(&self) -> Vec<Value>;

    /// Reads one row from a `SELECT id, <COLUMNS>` projection.
    fn read_row(row: &Row<'_>) -> rusqlite::Result<Self::Row>;
    fn row_id(row: &Self::Row) -> RowId;
    /// Builds a validated, persisted instance from a stored row.
    fn from_row(row: Self::Row) -> Result<Self, ValidationError>;
}

/// Repository for one entity table.
///
/// Owns the identity map for its table; dropping the repository ends the
/// identity scope.
pub struct EntityRepository<'db, P, T> {
    db: &'db P,
    identity: IdentityMap<T>,
}

impl<'db, P: ConnectionProvider, T: Entity> EntityRepository<'db, P, T> {
    pub fn new(db: &'db P) -> Self {
        Self {
            db,
            identity: IdentityMap::default(),
        }
    }

    pub fn identity_map(&self) -> &IdentityMap<T> {
        &self.identity
    }

    /// Creates the table when it does not exist yet. Existing rows are kept.
    pub fn create_table(&self) -> RepoResult<()> {
        self.db
            .with_connection(|conn| Ok(conn.execute_batch(T::CREATE_TABLE_SQL)?))?;
        info!(
            "event=table_create module=repo status=ok table={}",
            T::TABLE
        );
        Ok(())
    }

    /// Drops the table when it exists.
    pub fn drop_table(&self) -> RepoResult<()> {
        let sql = format!("DROP TABLE IF EXISTS {};", T::TABLE);
        self.db.with_connection(|conn| Ok(conn.execute_batch(&sql)?))?;
        info!("event=table_drop module=repo status=ok table={}", T::TABLE);
        Ok(())
    }

    /// Saves a draft as a new tracked row and returns its handle.
    pub fn add(&mut self, entity: T) -> RepoResult<Shared<T>> {
        let handle = shared(entity);
        self.save(&handle)?;
        Ok(handle)
    }

    /// Inserts a draft or updates a persisted instance.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when a persisted instance's row is gone.
    /// - `RepoError::Db` for any storage failure; the identity map is not
    ///   changed in that case.
    /// - `RepoError::Borrowed` when a draft is borrowed by the caller, since
    ///   its id has to be written back.
    pub fn save(&mut self, entity: &Shared<T>) -> RepoResult<()> {
        let (id, values) = {
            let current = read_handle(entity, None)?;
            (current.id(), current.column_values())
        };

        match id {
            Some(id) => self.update_row(id, values),
            None => {
                let mut draft = write_handle(entity, None)?;
                let id = self.insert_row(values)?;
                draft.assign_id(Some(id));
                drop(draft);
                self.identity.register(id, Rc::clone(entity));
                Ok(())
            }
        }
    }

    /// Writes a persisted instance's current attributes to its row.
    ///
    /// # Errors
    /// - `RepoError::Unsaved` for drafts.
    /// - `RepoError::NotFound` when the row is gone.
    pub fn update(&self, entity: &Shared<T>) -> RepoResult<()> {
        let (id, values) = {
            let current = read_handle(entity, None)?;
            (current.id(), current.column_values())
        };
        let id = id.ok_or(RepoError::Unsaved { table: T::TABLE })?;
        self.update_row(id, values)
    }

    /// Deletes the instance's row and turns the instance back into a draft.
    ///
    /// A row that is already gone is not an error. When the map tracks a
    /// different handle for the same id (e.g. `entity` was loaded through
    /// another repository), that handle becomes a draft as well, so no
    /// in-memory instance keeps an id SQLite may hand out again.
    ///
    /// # Errors
    /// - `RepoError::Unsaved` for drafts; nothing is executed.
    /// - `RepoError::Borrowed` when `entity` or the tracked handle is
    ///   borrowed; nothing is executed.
    pub fn delete(&mut self, entity: &Shared<T>) -> RepoResult<()> {
        let mut current = write_handle(entity, None)?;
        let id = current.id().ok_or(RepoError::Unsaved { table: T::TABLE })?;

        let tracked = self
            .identity
            .get(id)
            .filter(|handle| !Rc::ptr_eq(handle, entity));
        let mut other = match &tracked {
            Some(handle) => Some(write_handle(handle, Some(id))?),
            None => None,
        };

        let sql = format!("DELETE FROM {} WHERE id = ?1;", T::TABLE);
        let changed = self
            .db
            .with_connection(|conn| Ok(conn.execute(&sql, [id])?))?;

        if self.identity.evict(id).is_none() {
            warn!(
                "event=row_delete module=repo status=untracked table={} id={}",
                T::TABLE,
                id
            );
        }
        current.assign_id(None);
        if let Some(other) = other.as_mut() {
            other.assign_id(None);
            warn!(
                "event=row_delete module=repo status=foreign_handle table={} id={}",
                T::TABLE,
                id
            );
        }
        debug!(
            "event=row_delete module=repo status=ok table={} id={} changed={}",
            T::TABLE,
            id,
            changed
        );
        Ok(())
    }

    /// Returns every row of the table in id order.
    ///
    /// # Errors
    /// - `RepoError::Validation` or `RepoError::Borrowed` from any row; the
    ///   identity map is left unchanged.
    pub fn get_all(&mut self) -> RepoResult<Vec<Shared<T>>> {
        let sql = format!("{} ORDER BY id ASC;", select_sql::<T>());
        let rows = self
            .db
            .with_connection(|conn| query_rows::<T>(conn, &sql, &[]))?;
        self.identity.reconcile_all(rows)
    }

    pub fn find_by_id(&mut self, id: RowId) -> RepoResult<Option<Shared<T>>> {
        self.find_first_where("id", Value::Integer(id))
    }

    /// Feeds one stored row through the identity map.
    pub fn reconcile(&mut self, row: T::Row) -> RepoResult<Shared<T>> {
        self.identity.reconcile(row)
    }

    /// First row (by id) whose `column` equals `value`.
    pub(crate) fn find_first_where(
        &mut self,
        column: &'static str,
        value: Value,
    ) -> RepoResult<Option<Shared<T>>> {
        let sql = format!(
            "{} WHERE {column} = ?1 ORDER BY id ASC LIMIT 1;",
            select_sql::<T>()
        );
        let mut rows = self
            .db
            .with_connection(|conn| query_rows::<T>(conn, &sql, &[value]))?;
        match rows.pop() {
            Some(row) => Ok(Some(self.reconcile(row)?)),
            None => Ok(None),
        }
    }

    /// All rows (by id) whose `column` equals `value`.
    pub(crate) fn find_all_where(
        &mut self,
        column: &'static str,
        value: Value,
    ) -> RepoResult<Vec<Shared<T>>> {
        let sql = format!("{} WHERE {column} = ?1 ORDER BY id ASC;", select_sql::<T>());
        let rows = self
            .db
            .with_connection(|conn| query_rows::<T>(conn, &sql, &[value]))?;
        self.identity.reconcile_all(rows)
    }

    fn insert_row(&self, values: Vec<Value>) -> RepoResult<RowId> {
        let placeholders = (1..=T::COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders});",
            T::TABLE,
            T::COLUMNS.join(", ")
        );

        let id = self.db.with_connection(|conn| {
            conn.execute(&sql, params_from_iter(values))?;
            Ok(conn.last_insert_rowid())
        })?;
        debug!(
            "event=row_insert module=repo status=ok table={} id={}",
            T::TABLE,
            id
        );
        Ok(id)
    }

    fn update_row(&self, id: RowId, mut values: Vec<Value>) -> RepoResult<()> {
        let assignments = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE id = ?{};",
            T::TABLE,
            T::COLUMNS.len() + 1
        );
        values.push(Value::Integer(id));

        let changed = self
            .db
            .with_connection(|conn| Ok(conn.execute(&sql, params_from_iter(values))?))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: T::TABLE,
                id,
            });
        }
        debug!(
            "event=row_update module=repo status=ok table={} id={}",
            T::TABLE,
            id
        );
        Ok(())
    }
}

fn select_sql<T: Entity>() -> String {
    format!("SELECT id, {} FROM {}", T::COLUMNS.join(", "), T::TABLE)
}

fn query_rows<T: Entity>(conn: &Connection, sql: &str, params: &[Value]) -> DbResult<Vec<T::Row>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(params))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(T::read_row(row)?);
    }
    Ok(out)
}
