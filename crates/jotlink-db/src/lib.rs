//! # jotlink-db
//!
//! PostgreSQL database layer for jotlink.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for notes, threads, messages, jobs,
//!   attachments, and identity tokens
//! - Transitive ownership resolution for access control
//! - URL sniffing over note content
//!
//! ## Example
//!
//! ```rust,ignore
//! use jotlink_core::{CreateNoteRequest, NoteRepository};
//! use jotlink_db::{create_pool, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool("postgres://localhost/jotlink").await?;
//!     let db = Database::new(pool);
//!     db.migrate().await?;
//!
//!     let note_id = db.notes.insert(CreateNoteRequest {
//!         user_id: uuid::Uuid::new_v4(),
//!         content: "check this out https://example.com".to_string(),
//!         image_id: None,
//!     }).await?;
//!
//!     println!("Created note: {}", note_id);
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod attachments;
pub mod identity;
pub mod jobs;
pub mod link_scan;
pub mod messages;
pub mod notes;
pub mod pool;
pub mod threads;

// Re-export core types
pub use jotlink_core::*;

// Re-export repository implementations
pub use access::PgAccessControl;
pub use attachments::{
    generate_storage_path, FilesystemBackend, PgAttachmentRepository, StorageBackend,
};
pub use identity::PgIdentityRepository;
pub use jobs::PgJobRepository;
pub use link_scan::first_http_url;
pub use messages::PgMessageRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use threads::PgThreadRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note repository for CRUD operations.
    pub notes: PgNoteRepository,
    /// Thread repository (one thread per note).
    pub threads: PgThreadRepository,
    /// Message repository (append-only, trusted write path).
    pub messages: PgMessageRepository,
    /// Job repository for deferred background work.
    pub jobs: PgJobRepository,
    /// Identity token repository.
    pub identity: PgIdentityRepository,
    /// Ownership resolution for access control.
    pub access: PgAccessControl,
    /// Attachment repository (requires backend configuration).
    /// Use `with_filesystem_storage` to configure.
    pub attachments: Option<PgAttachmentRepository>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            threads: PgThreadRepository::new(pool.clone()),
            messages: PgMessageRepository::new(pool.clone()),
            jobs: PgJobRepository::new(pool.clone()),
            identity: PgIdentityRepository::new(pool.clone()),
            access: PgAccessControl::new(pool.clone()),
            attachments: None,
            pool,
        }
    }

    /// Configure attachment storage with a filesystem backend path.
    pub fn with_filesystem_storage(mut self, path: &str) -> Self {
        self.attachments = Some(PgAttachmentRepository::new(
            self.pool.clone(),
            FilesystemBackend::new(path),
        ));
        self
    }

    /// Run pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("migration failed: {}", e)))?;
        Ok(())
    }
}
