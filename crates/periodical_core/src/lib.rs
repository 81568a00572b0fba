//! Minimal SQLite-backed ORM for articles, authors and magazines.
//!
//! Records are validated on construction, persisted through per-table
//! repositories, and kept unique per row by each repository's identity map.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod session;

pub use db::{ConnectionProvider, DbError, DbResult, FileDatabase, MemoryDatabase, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::article::{Article, ArticleId};
pub use model::author::{Author, AuthorId};
pub use model::magazine::{Magazine, MagazineId};
pub use model::{RowId, ValidationError};
pub use repo::article_repo::{ArticleRepository, ArticleRow};
pub use repo::author_repo::{AuthorRepository, AuthorRow};
pub use repo::entity_repo::{Entity, EntityRepository};
pub use repo::identity_map::{shared, IdentityMap, Shared};
pub use repo::magazine_repo::{MagazineRepository, MagazineRow};
pub use repo::{RepoError, RepoResult};
pub use session::Session;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
