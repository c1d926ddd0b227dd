use crate::traits::{ImageHost, ImageUpload};
use std::path::PathBuf;
use storefront_core::util::blake3_hex;
use storefront_core::{ImageKind, Result, StoreError};
use tracing::info;

/// Writes images below `root` and serves them from `base_url`.
///
/// Files are content addressed (`<blake3>.<ext>`), so uploading the same bytes
/// twice yields the same URL.
#[derive(Debug, Clone)]
pub struct LocalImageHost {
    root: PathBuf,
    base_url: String,
}

impl LocalImageHost {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

fn checked_folder(folder: &str) -> Result<&str> {
    let ok = !folder.is_empty()
        && folder
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(folder)
    } else {
        Err(StoreError::Invalid(format!("bad media folder: {folder:?}")))
    }
}

#[async_trait::async_trait]
impl ImageHost for LocalImageHost {
    async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String> {
        let kind = ImageKind::from_content_type(&image.content_type)?;
        let folder = checked_folder(folder)?;
        if image.bytes.is_empty() {
            return Err(StoreError::Invalid(format!("empty file: {}", image.file_name)));
        }
        let file = format!("{}.{}", blake3_hex(&image.bytes), kind.extension());
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        tokio::fs::write(dir.join(&file), &image.bytes)
            .await
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        info!(original = %image.file_name, stored = %file, "image uploaded");
        Ok(format!("{}/{}/{}", self.base_url, folder, file))
    }
}
