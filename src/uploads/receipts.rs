//! Local receipt store.
//!
//! Receipts land under `<uploads_root>/receipts/` with a unique filename
//! and are served statically under `/uploads/receipts/`. Only image and
//! PDF uploads within the configured size cap are accepted.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use uuid::Uuid;

use crate::utils::errors::{ApiError, ApiResult};

const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp", "pdf"];
const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "application/pdf",
];

/// The URL prefix receipts are served under.
pub const RECEIPT_URL_PREFIX: &str = "/uploads/receipts";

#[derive(Debug, Clone)]
pub struct ReceiptStore {
    dir: PathBuf,
    max_size: usize,
}

impl ReceiptStore {
    /// `uploads_root` is the directory served under `/uploads`.
    pub fn new(uploads_root: impl Into<PathBuf>, max_size_mb: u64) -> Self {
        Self {
            dir: uploads_root.into().join("receipts"),
            max_size: (max_size_mb as usize) * 1024 * 1024,
        }
    }

    /// Ensure the receipt directory exists.
    pub async fn init(&self) -> ApiResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist an uploaded receipt and return its public URL path.
    pub async fn save(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> ApiResult<String> {
        if data.len() > self.max_size {
            return Err(ApiError::PayloadTooLarge(format!(
                "receipt exceeds {} bytes",
                self.max_size
            )));
        }

        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .ok_or_else(|| {
                ApiError::Validation("receipt filename has no extension".to_string())
            })?;

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ApiError::Validation(format!(
                "receipt type .{} not allowed (JPEG, JPG, PNG, WEBP, PDF only)",
                extension
            )));
        }

        if let Some(mime) = content_type {
            if !ALLOWED_MIME_TYPES.contains(&mime) {
                return Err(ApiError::Validation(format!(
                    "receipt content type {} not allowed",
                    mime
                )));
            }
        }

        let filename = format!("receipt-{}.{}", Uuid::new_v4(), extension);
        tokio::fs::write(self.dir.join(&filename), &data).await?;

        Ok(format!("{}/{}", RECEIPT_URL_PREFIX, filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store(max_mb: u64) -> (TempDir, ReceiptStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = ReceiptStore::new(temp_dir.path(), max_mb);
        store.init().await.unwrap();
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_save_returns_public_url() {
        let (_guard, store) = store(10).await;

        let url = store
            .save("lunch.png", Some("image/png"), Bytes::from_static(b"png-bytes"))
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/receipts/receipt-"));
        assert!(url.ends_with(".png"));

        let filename = url.rsplit('/').next().unwrap();
        let on_disk = tokio::fs::read(store.dir().join(filename)).await.unwrap();
        assert_eq!(on_disk, b"png-bytes");
    }

    #[tokio::test]
    async fn test_rejects_disallowed_extension() {
        let (_guard, store) = store(10).await;

        let err = store
            .save("malware.exe", None, Bytes::from_static(b"nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = store
            .save("no-extension", None, Bytes::from_static(b"nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rejects_mismatched_mime() {
        let (_guard, store) = store(10).await;

        let err = store
            .save("receipt.pdf", Some("text/html"), Bytes::from_static(b"nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rejects_oversized_upload() {
        let (_guard, store) = store(0).await;

        let err = store
            .save("big.pdf", Some("application/pdf"), Bytes::from_static(b"toobig"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::PayloadTooLarge(_)));
    }

    #[tokio::test]
    async fn test_unique_names_for_same_original() {
        let (_guard, store) = store(10).await;

        let a = store
            .save("r.jpg", None, Bytes::from_static(b"a"))
            .await
            .unwrap();
        let b = store
            .save("r.jpg", None, Bytes::from_static(b"b"))
            .await
            .unwrap();
        assert_ne!(a, b);
    }
}
