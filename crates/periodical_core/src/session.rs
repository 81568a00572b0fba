//! Explicit identity scope over one store.
//!
//! # Responsibility
//! - Group the three table repositories over a shared provider.
//! - Order schema lifecycle so foreign keys always have a target.
//!
//! # Invariants
//! - Identity maps live exactly as long as the session.
//! - `create_tables` creates referenced tables before `articles`;
//!   `drop_tables` drops `articles` first.

use crate::db::ConnectionProvider;
use crate::repo::article_repo::ArticleRepository;
use crate::repo::author_repo::AuthorRepository;
use crate::repo::magazine_repo::MagazineRepository;
use crate::repo::RepoResult;

pub struct Session<'db, P: ConnectionProvider> {
    pub authors: AuthorRepository<'db, P>,
    pub magazines: MagazineRepository<'db, P>,
    pub articles: ArticleRepository<'db, P>,
}

impl<'db, P: ConnectionProvider> Session<'db, P> {
    pub fn new(db: &'db P) -> Self {
        Self {
            authors: AuthorRepository::new(db),
            magazines: MagazineRepository::new(db),
            articles: ArticleRepository::new(db),
        }
    }

    pub fn create_tables(&self) -> RepoResult<()> {
        self.authors.create_table()?;
        self.magazines.create_table()?;
        self.articles.create_table()?;
        Ok(())
    }

    pub fn drop_tables(&self) -> RepoResult<()> {
        self.articles.drop_table()?;
        self.magazines.drop_table()?;
        self.authors.drop_table()?;
        Ok(())
    }
}
