//! Article domain model.
//!
//! # Responsibility
//! - Hold one article's text and its author/magazine references.
//!
//! # Invariants
//! - `title` has 5..=50 characters; `content` is never empty.
//! - `author_id`/`magazine_id` always name a saved row id. Whether that row
//!   still exists is checked by storage, not here.

use super::author::{Author, AuthorId};
use super::magazine::{Magazine, MagazineId};
use super::{check_char_range, RowId, ValidationError, TITLE_MAX_CHARS, TITLE_MIN_CHARS};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type ArticleId = RowId;

/// A piece of writing by one author, published in one magazine.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ArticleInput")]
pub struct Article {
    id: Option<ArticleId>,
    title: String,
    content: String,
    author_id: AuthorId,
    magazine_id: MagazineId,
}

#[derive(Deserialize)]
struct ArticleInput {
    title: String,
    content: String,
    author_id: AuthorId,
    magazine_id: MagazineId,
}

impl TryFrom<ArticleInput> for Article {
    type Error = ValidationError;

    fn try_from(value: ArticleInput) -> Result<Self, Self::Error> {
        Self::new(
            value.title,
            value.content,
            value.author_id,
            value.magazine_id,
        )
    }
}

impl Article {
    /// Creates a draft article from raw reference ids.
    ///
    /// # Errors
    /// - `ValidationError::TitleLength` when `title` is outside 5..=50
    ///   characters.
    /// - `ValidationError::EmptyContent` when `content` is empty.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author_id: AuthorId,
        magazine_id: MagazineId,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        let content = content.into();
        validate_title(&title)?;
        validate_content(&content)?;
        Ok(Self {
            id: None,
            title,
            content,
            author_id,
            magazine_id,
        })
    }

    /// Creates a draft article referencing saved entities.
    ///
    /// # Errors
    /// - Same as [`Article::new`].
    /// - `ValidationError::MissingAuthorId` / `MissingMagazineId` when either
    ///   reference is still a draft.
    pub fn for_entities(
        title: impl Into<String>,
        content: impl Into<String>,
        author: &Author,
        magazine: &Magazine,
    ) -> Result<Self, ValidationError> {
        let author_id = author.id().ok_or(ValidationError::MissingAuthorId)?;
        let magazine_id = magazine.id().ok_or(ValidationError::MissingMagazineId)?;
        Self::new(title, content, author_id, magazine_id)
    }

    pub fn id(&self) -> Option<ArticleId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author_id(&self) -> AuthorId {
        self.author_id
    }

    pub fn magazine_id(&self) -> MagazineId {
        self.magazine_id
    }

    /// Replaces the title. A rejected value leaves the current title in place.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ValidationError> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        Ok(())
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<(), ValidationError> {
        let content = content.into();
        validate_content(&content)?;
        self.content = content;
        Ok(())
    }

    /// Points the article at another saved author.
    pub fn set_author(&mut self, author: &Author) -> Result<(), ValidationError> {
        self.author_id = author.id().ok_or(ValidationError::MissingAuthorId)?;
        Ok(())
    }

    /// Points the article at another saved magazine.
    pub fn set_magazine(&mut self, magazine: &Magazine) -> Result<(), ValidationError> {
        self.magazine_id = magazine.id().ok_or(ValidationError::MissingMagazineId)?;
        Ok(())
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn set_id(&mut self, id: Option<ArticleId>) {
        self.id = id;
    }
}

impl Display for Article {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Article {}>", self.title)
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    check_char_range(title, TITLE_MIN_CHARS, TITLE_MAX_CHARS)
        .map_err(|chars| ValidationError::TitleLength { chars })
}

fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok(())
}
