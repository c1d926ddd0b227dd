use crate::errors::{Result, StoreError};
use serde::{Deserialize, Serialize};

/// Image formats accepted for product pictures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Jpg,
    Png,
    Gif,
}

impl ImageKind {
    /// Classifies an upload by the subtype of its content type (`image/png` -> `Png`).
    pub fn from_content_type(content_type: &str) -> Result<Self> {
        let parsed: mime::Mime = content_type
            .parse()
            .map_err(|_| StoreError::Invalid(format!("bad content type: {content_type}")))?;
        match parsed.subtype().as_str().to_ascii_lowercase().as_str() {
            "jpeg" => Ok(Self::Jpeg),
            "jpg" => Ok(Self::Jpg),
            "png" => Ok(Self::Png),
            "gif" => Ok(Self::Gif),
            other => Err(StoreError::Invalid(format!("unsupported file type: {other}"))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}
