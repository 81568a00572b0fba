//! Domain model for the article/author/magazine schema.
//!
//! # Responsibility
//! - Define the record types persisted by the repository layer.
//! - Own every attribute rule and its user-facing message.
//!
//! # Invariants
//! - A value of any entity type always satisfies its attribute rules;
//!   constructors and setters validate before they mutate.
//! - Primary keys are assigned by storage only. A record without an id is a
//!   draft.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod article;
pub mod author;
pub mod magazine;

/// Storage-assigned primary key shared by all tables.
pub type RowId = i64;

pub(crate) const TITLE_MIN_CHARS: usize = 5;
pub(crate) const TITLE_MAX_CHARS: usize = 50;
pub(crate) const MAGAZINE_NAME_MIN_CHARS: usize = 2;
pub(crate) const MAGAZINE_NAME_MAX_CHARS: usize = 16;

/// Attribute rule violation raised by constructors and setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyAuthorName,
    TitleLength { chars: usize },
    EmptyContent,
    /// The referenced author has not been saved yet.
    MissingAuthorId,
    /// The referenced magazine has not been saved yet.
    MissingMagazineId,
    MagazineNameLength { chars: usize },
    EmptyCategory,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAuthorName => write!(f, "Name must be a non-empty string"),
            Self::TitleLength { .. } => write!(
                f,
                "Title must be a string between {TITLE_MIN_CHARS} and {TITLE_MAX_CHARS} characters"
            ),
            Self::EmptyContent => write!(f, "Content must be a non-empty string"),
            Self::MissingAuthorId => write!(f, "Author ID must be an integer"),
            Self::MissingMagazineId => write!(f, "Magazine ID must be an integer"),
            Self::MagazineNameLength { .. } => write!(
                f,
                "Name must be a string between {MAGAZINE_NAME_MIN_CHARS} and {MAGAZINE_NAME_MAX_CHARS} characters"
            ),
            Self::EmptyCategory => write!(f, "Category must be a non-empty string"),
        }
    }
}

impl Error for ValidationError {}

/// Returns `Ok(char_count)` when `value` has between `min` and `max`
/// characters inclusive. Counts Unicode scalar values, not bytes.
pub(crate) fn check_char_range(value: &str, min: usize, max: usize) -> Result<(), usize> {
    let chars = value.chars().count();
    if (min..=max).contains(&chars) {
        Ok(())
    } else {
        Err(chars)
    }
}
