//! Per-repository identity map.
//!
//! # Responsibility
//! - Map primary keys to the single shared instance for that row.
//! - Reconcile freshly read rows into existing instances.
//!
//! # Invariants
//! - At most one handle per id.
//! - A row that fails validation never touches the mapped instance.
//! - A batch of rows is applied all-or-nothing.
//! - Handles are never borrowed in a way that can panic; a conflicting
//!   caller borrow surfaces as `RepoError::Borrowed`.

use crate::model::RowId;
use crate::repo::entity_repo::Entity;
use crate::repo::{RepoError, RepoResult};
use log::debug;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

/// Shared, mutable handle to one tracked instance.
///
/// Every caller that loaded the same row holds a clone of the same `Rc`.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps an entity in a fresh, untracked handle.
pub fn shared<T>(entity: T) -> Shared<T> {
    Rc::new(RefCell::new(entity))
}

pub(crate) fn read_handle<T: Entity>(
    handle: &Shared<T>,
    id: Option<RowId>,
) -> RepoResult<Ref<'_, T>> {
    handle
        .try_borrow()
        .map_err(|_| RepoError::Borrowed { table: T::TABLE, id })
}

pub(crate) fn write_handle<T: Entity>(
    handle: &Shared<T>,
    id: Option<RowId>,
) -> RepoResult<RefMut<'_, T>> {
    handle
        .try_borrow_mut()
        .map_err(|_| RepoError::Borrowed { table: T::TABLE, id })
}

#[derive(Debug)]
pub struct IdentityMap<T> {
    entries: HashMap<RowId, Shared<T>>,
}

impl<T> Default for IdentityMap<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T: Entity> IdentityMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: RowId) -> Option<Shared<T>> {
        self.entries.get(&id).cloned()
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked ids in ascending order.
    pub fn ids(&self) -> Vec<RowId> {
        let mut ids: Vec<RowId> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn register(&mut self, id: RowId, entity: Shared<T>) {
        self.entries.insert(id, entity);
    }

    pub(crate) fn evict(&mut self, id: RowId) -> Option<Shared<T>> {
        self.entries.remove(&id)
    }

    /// Reconcile-or-insert for one raw row.
    ///
    /// 1. Look up the row id.
    /// 2. When tracked, validate the row and overwrite the tracked instance in
    ///    place, returning the same handle.
    /// 3. Otherwise build a new instance, track it and return it.
    ///
    /// # Errors
    /// - `RepoError::Validation` for an invalid row.
    /// - `RepoError::Borrowed` when the tracked instance is currently
    ///   borrowed by the caller.
    ///
    /// In both cases the map and any tracked instance are left as they were.
    pub fn reconcile(&mut self, row: T::Row) -> RepoResult<Shared<T>> {
        let id = T::row_id(&row);
        let fresh = T::from_row(row)?;

        match self.get(id) {
            Some(existing) => {
                *write_handle(&existing, Some(id))? = fresh;
                log_reconcile::<T>(id, true);
                Ok(existing)
            }
            None => Ok(self.track(id, fresh)),
        }
    }

    /// Reconciles a batch of rows as one unit.
    ///
    /// Every row is validated and every tracked instance is checked for
    /// conflicting borrows before anything is written.
    ///
    /// # Errors
    /// - The first `RepoError::Validation` or `RepoError::Borrowed` in row
    ///   order. Nothing in the map or in any tracked instance has changed.
    pub fn reconcile_all(&mut self, rows: Vec<T::Row>) -> RepoResult<Vec<Shared<T>>> {
        let fresh = rows
            .into_iter()
            .map(|row| {
                let id = T::row_id(&row);
                T::from_row(row).map(|entity| (id, entity))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let existing: Vec<Option<Shared<T>>> =
            fresh.iter().map(|(id, _)| self.get(*id)).collect();
        let mut guards = Vec::with_capacity(existing.len());
        for ((id, _), handle) in fresh.iter().zip(&existing) {
            guards.push(match handle {
                Some(handle) => Some(write_handle(handle, Some(*id))?),
                None => None,
            });
        }

        let mut out = Vec::with_capacity(fresh.len());
        for (((id, entity), guard), handle) in fresh.into_iter().zip(guards).zip(&existing) {
            match (guard, handle) {
                (Some(mut guard), Some(handle)) => {
                    *guard = entity;
                    log_reconcile::<T>(id, true);
                    out.push(Rc::clone(handle));
                }
                _ => out.push(self.track(id, entity)),
            }
        }
        Ok(out)
    }

    fn track(&mut self, id: RowId, entity: T) -> Shared<T> {
        log_reconcile::<T>(id, false);
        let handle = shared(entity);
        self.entries.insert(id, Rc::clone(&handle));
        handle
    }
}

fn log_reconcile<T: Entity>(id: RowId, hit: bool) {
    debug!(
        "event=identity_reconcile module=repo table={} id={} hit={}",
        T::TABLE,
        id,
        hit
    );
}

#[cfg(test)]
mod tests {
    use super::{shared, IdentityMap};
    use crate::model::author::Author;
    use crate::model::ValidationError;
    use crate::repo::author_repo::AuthorRow;
    use crate::repo::RepoError;
    use std::rc::Rc;

    fn row(id: i64, name: &str) -> AuthorRow {
        AuthorRow {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn reconcile_inserts_then_reuses_handle() {
        let mut map = IdentityMap::<Author>::new();

        let first = map.reconcile(row(1, "Ada")).unwrap();
        assert_eq!(first.borrow().id(), Some(1));
        assert_eq!(map.len(), 1);

        let second = map.reconcile(row(1, "Ada Lovelace")).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.borrow().name(), "Ada Lovelace");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn invalid_row_leaves_tracked_instance_untouched() {
        let mut map = IdentityMap::<Author>::new();
        let tracked = map.reconcile(row(4, "Ada")).unwrap();

        let err = map.reconcile(row(4, "")).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ValidationError::EmptyAuthorName)
        ));
        assert_eq!(tracked.borrow().name(), "Ada");
    }

    #[test]
    fn invalid_new_row_is_not_tracked() {
        let mut map = IdentityMap::<Author>::new();
        assert!(map.reconcile(row(2, "")).is_err());
        assert!(!map.contains(2));
        assert!(map.is_empty());
    }

    #[test]
    fn register_and_evict_round_trip() {
        let mut map = IdentityMap::<Author>::new();
        let handle = shared(Author::new("Grace").unwrap());
        map.register(7, Rc::clone(&handle));
        map.register(3, shared(Author::new("Ada").unwrap()));
        assert_eq!(map.ids(), vec![3, 7]);

        let evicted = map.evict(7).unwrap();
        assert!(Rc::ptr_eq(&evicted, &handle));
        assert!(map.evict(7).is_none());
    }

    #[test]
    fn reconcile_reports_borrowed_handle_instead_of_panicking() {
        let mut map = IdentityMap::<Author>::new();
        let tracked = map.reconcile(row(1, "Ada")).unwrap();

        let guard = tracked.borrow();
        let err = map.reconcile(row(1, "Ada Lovelace")).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Borrowed {
                table: "authors",
                id: Some(1)
            }
        ));
        assert_eq!(guard.name(), "Ada");
        drop(guard);

        map.reconcile(row(1, "Ada Lovelace")).unwrap();
        assert_eq!(tracked.borrow().name(), "Ada Lovelace");
    }

    #[test]
    fn reconcile_all_validates_every_row_before_writing() {
        let mut map = IdentityMap::<Author>::new();
        let ada = map.reconcile(row(1, "Ada")).unwrap();

        let err = map
            .reconcile_all(vec![row(1, "Ada Lovelace"), row(2, "Grace"), row(3, "")])
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ValidationError::EmptyAuthorName)
        ));
        assert_eq!(ada.borrow().name(), "Ada");
        assert_eq!(map.ids(), vec![1]);

        let all = map
            .reconcile_all(vec![row(1, "Ada Lovelace"), row(2, "Grace")])
            .unwrap();
        assert!(Rc::ptr_eq(&all[0], &ada));
        assert_eq!(ada.borrow().name(), "Ada Lovelace");
        assert_eq!(map.ids(), vec![1, 2]);
    }

    #[test]
    fn reconcile_all_checks_borrows_before_writing() {
        let mut map = IdentityMap::<Author>::new();
        map.reconcile(row(1, "Ada")).unwrap();
        let grace = map.reconcile(row(2, "Grace")).unwrap();

        let guard = grace.borrow_mut();
        let err = map
            .reconcile_all(vec![row(1, "Ada Lovelace"), row(2, "Grace Hopper")])
            .unwrap_err();
        assert!(matches!(err, RepoError::Borrowed { id: Some(2), .. }));
        drop(guard);

        assert_eq!(map.get(1).unwrap().borrow().name(), "Ada");
        assert_eq!(grace.borrow().name(), "Grace");
    }
}
