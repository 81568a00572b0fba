//! Magazine domain model.
//!
//! # Invariants
//! - `name` has 2..=16 characters.
//! - `category` is never empty.

use super::{check_char_range, RowId, ValidationError};
use super::{MAGAZINE_NAME_MAX_CHARS, MAGAZINE_NAME_MIN_CHARS};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type MagazineId = RowId;

/// A publication that articles appear in.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MagazineInput")]
pub struct Magazine {
    id: Option<MagazineId>,
    name: String,
    category: String,
}

#[derive(Deserialize)]
struct MagazineInput {
    name: String,
    category: String,
}

impl TryFrom<MagazineInput> for Magazine {
    type Error = ValidationError;

    fn try_from(value: MagazineInput) -> Result<Self, Self::Error> {
        Self::new(value.name, value.category)
    }
}

impl Magazine {
    /// Creates a draft magazine.
    ///
    /// # Errors
    /// - `ValidationError::MagazineNameLength` when `name` is outside 2..=16
    ///   characters.
    /// - `ValidationError::EmptyCategory` when `category` is empty.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let category = category.into();
        validate_name(&name)?;
        validate_category(&category)?;
        Ok(Self {
            id: None,
            name,
            category,
        })
    }

    pub fn id(&self) -> Option<MagazineId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_category(&mut self, category: impl Into<String>) -> Result<(), ValidationError> {
        let category = category.into();
        validate_category(&category)?;
        self.category = category;
        Ok(())
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn set_id(&mut self, id: Option<MagazineId>) {
        self.id = id;
    }
}

impl Display for Magazine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Magazine {}>", self.name)
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    check_char_range(name, MAGAZINE_NAME_MIN_CHARS, MAGAZINE_NAME_MAX_CHARS)
        .map_err(|chars| ValidationError::MagazineNameLength { chars })
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    if category.is_empty() {
        return Err(ValidationError::EmptyCategory);
    }
    Ok(())
}
