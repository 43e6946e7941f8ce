//! Attachment storage: metadata rows in PostgreSQL, bytes on a storage
//! backend behind a trait seam.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use jotlink_core::{AttachmentRepository, Error, Result};

/// Storage backend trait for different storage implementations.
///
/// Allows abstracting over filesystem, S3, or other storage providers.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data to the specified path.
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Read data from the specified path.
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Check if data exists at the specified path.
    async fn exists(&self, path: &str) -> Result<bool>;
}

/// Filesystem storage backend.
///
/// Path format: `{base_path}/blobs/{first-2-hex}/{uuid}.bin`
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given base directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);
        debug!(storage_path = %path, size = data.len(), "attachment write");

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, &full_path).await?;

        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.full_path(path)).await?)
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.full_path(path)).await?)
    }
}

/// Generate the storage path for an attachment blob.
pub fn generate_storage_path(id: Uuid) -> String {
    let hex = id.simple().to_string();
    format!("blobs/{}/{}.bin", &hex[..2], id)
}

/// PostgreSQL + backend implementation of AttachmentRepository.
pub struct PgAttachmentRepository {
    pool: Pool<Postgres>,
    backend: Box<dyn StorageBackend>,
}

impl PgAttachmentRepository {
    /// Create a new repository over the given pool and storage backend.
    pub fn new(pool: Pool<Postgres>, backend: impl StorageBackend + 'static) -> Self {
        Self {
            pool,
            backend: Box::new(backend),
        }
    }
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    async fn create(&self, user_id: Uuid) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO attachments (id, user_id, storage_path, created_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(user_id)
        .bind(generate_storage_path(id))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn store(&self, id: Uuid, content_type: Option<&str>, data: &[u8]) -> Result<()> {
        let path: Option<String> =
            sqlx::query_scalar("SELECT storage_path FROM attachments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;

        let path = path.ok_or_else(|| Error::NotFound(format!("attachment {}", id)))?;

        self.backend.write(&path, data).await?;

        sqlx::query("UPDATE attachments SET content_type = $2, size_bytes = $3 WHERE id = $1")
            .bind(id)
            .bind(content_type)
            .bind(data.len() as i64)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(())
    }

    async fn open(&self, id: Uuid) -> Result<Option<(Vec<u8>, Option<String>)>> {
        let row = sqlx::query("SELECT storage_path, content_type FROM attachments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let path: String = row.try_get("storage_path").map_err(Error::Database)?;
        let content_type: Option<String> = row.try_get("content_type").map_err(Error::Database)?;

        // A registered slot whose upload never arrived resolves to absent.
        if !self.backend.exists(&path).await? {
            return Ok(None);
        }

        let data = self.backend.read(&path).await?;
        Ok(Some((data, content_type)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_path_shards_by_prefix() {
        let id = Uuid::now_v7();
        let path = generate_storage_path(id);
        assert!(path.starts_with("blobs/"));
        assert!(path.ends_with(".bin"));
        assert!(path.contains(&id.to_string()));
    }

    #[tokio::test]
    async fn test_filesystem_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        let path = "blobs/ab/test.bin";
        assert!(!backend.exists(path).await.unwrap());

        backend.write(path, b"image bytes").await.unwrap();
        assert!(backend.exists(path).await.unwrap());
        assert_eq!(backend.read(path).await.unwrap(), b"image bytes");
    }

    #[tokio::test]
    async fn test_filesystem_backend_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        backend.write("blobs/x/a.bin", b"one").await.unwrap();
        backend.write("blobs/x/a.bin", b"two").await.unwrap();
        assert_eq!(backend.read("blobs/x/a.bin").await.unwrap(), b"two");
    }
}
