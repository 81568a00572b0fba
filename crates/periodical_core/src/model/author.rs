//! Author domain model.
//!
//! # Invariants
//! - `name` is never empty.
//! - `id` is `None` until the author is saved, and again after delete.

use super::{RowId, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type AuthorId = RowId;

/// A person who writes articles.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AuthorInput")]
pub struct Author {
    id: Option<AuthorId>,
    name: String,
}

/// Untrusted wire shape. Any `id` in the payload is ignored.
#[derive(Deserialize)]
struct AuthorInput {
    name: String,
}

impl TryFrom<AuthorInput> for Author {
    type Error = ValidationError;

    fn try_from(value: AuthorInput) -> Result<Self, Self::Error> {
        Self::new(value.name)
    }
}

impl Author {
    /// Creates a draft author.
    ///
    /// # Errors
    /// - `ValidationError::EmptyAuthorName` when `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { id: None, name })
    }

    pub fn id(&self) -> Option<AuthorId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the name. A rejected value leaves the current name in place.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn set_id(&mut self, id: Option<AuthorId>) {
        self.id = id;
    }
}

impl Display for Author {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Author {}>", self.name)
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyAuthorName);
    }
    Ok(())
}
