//! Magazine table mapping and magazine-specific queries.
//!
//! # Invariants
//! - Table shape: `magazines(id INTEGER PRIMARY KEY, name TEXT NOT NULL,
//!   category TEXT NOT NULL)`. Articles reference `magazines(id)`.

use crate::db::ConnectionProvider;
use crate::model::magazine::{Magazine, MagazineId};
use crate::model::{RowId, ValidationError};
use crate::repo::entity_repo::{Entity, EntityRepository};
use crate::repo::identity_map::Shared;
use crate::repo::sealed::AssignId;
use crate::repo::RepoResult;
use rusqlite::types::Value;
use rusqlite::Row;

/// Repository over the `magazines` table.
pub type MagazineRepository<'db, P> = EntityRepository<'db, P, Magazine>;

/// Raw `magazines` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagazineRow {
    pub id: MagazineId,
    pub name: String,
    pub category: String,
}

impl AssignId for Magazine {
    fn assign_id(&mut self, id: Option<RowId>) {
        self.set_id(id);
    }
}

impl Entity for Magazine {
    type Row = MagazineRow;

    const TABLE: &'static str = "magazines";
    const COLUMNS: &'static [&'static str] = &["name", "category"];
    const CREATE_TABLE_SQL: &'static str = "CREATE TABLE IF NOT EXISTS magazines (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL
    );";

    fn id(&self) -> Option<RowId> {
        Magazine::id(self)
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name().to_string()),
            Value::Text(self.category().to_string()),
        ]
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<MagazineRow> {
        Ok(MagazineRow {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
        })
    }

    fn row_id(row: &MagazineRow) -> RowId {
        row.id
    }

    fn from_row(row: MagazineRow) -> Result<Self, ValidationError> {
        let mut magazine = Magazine::new(row.name, row.category)?;
        magazine.set_id(Some(row.id));
        Ok(magazine)
    }
}

impl<P: ConnectionProvider> EntityRepository<'_, P, Magazine> {
    /// Builds, saves and tracks a new magazine.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> RepoResult<Shared<Magazine>> {
        let magazine = Magazine::new(name, category)?;
        self.add(magazine)
    }

    pub fn find_by_name(&mut self, name: &str) -> RepoResult<Option<Shared<Magazine>>> {
        self.find_first_where("name", Value::Text(name.to_string()))
    }

    /// Every magazine in `category`, in id order.
    pub fn find_by_category(&mut self, category: &str) -> RepoResult<Vec<Shared<Magazine>>> {
        self.find_all_where("category", Value::Text(category.to_string()))
    }
}
