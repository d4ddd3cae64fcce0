use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::form::{FormError, RiskItem};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// A site photo handed to the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageArtifact {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Read an image from disk, inferring the MIME type from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(bytes, mime_type_for(path)))
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        _ => "application/octet-stream",
    }
}

/// What the analyzer saw: the kind of work and the hazards it spotted.
/// Both fields are required; an answer missing either is malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    pub work_type: String,
    pub hazards: Vec<String>,
}

impl ImageAnalysis {
    /// One seeded risk row per reported hazard, in order.
    pub fn into_risk_items(self) -> Vec<RiskItem> {
        self.hazards
            .iter()
            .map(|hazard| RiskItem::from_analysis(&self.work_type, hazard))
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Image analysis API key is not configured (set GEMINI_API_KEY or analyzer.api_key)")]
    MissingCredential,
    #[error("Image analysis request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Image analysis API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Image analysis returned an unreadable response: {0}")]
    MalformedResponse(String),
    #[error("An image analysis is already running for this form")]
    InProgress,
    #[error("Analysis result could not be applied: {0}")]
    Rejected(#[from] FormError),
    #[error("Could not read image: {0}")]
    Io(#[from] std::io::Error),
}

/// External image-classification collaborator.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait HazardAnalyzer: Send + Sync {
    async fn analyze(&self, image: &ImageArtifact) -> Result<ImageAnalysis, AnalysisError>;
}
