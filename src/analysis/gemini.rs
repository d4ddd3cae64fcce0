//! Gemini `generateContent` client used as the production hazard analyzer.
//!
//! The image is sent inline (base64) together with an instruction prompt and
//! a response schema, so the model answers with a JSON document of the shape
//! `{ "workType": string, "hazards": [string] }`.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info};

use super::analyzer::{AnalysisError, HazardAnalyzer, ImageAnalysis, ImageArtifact};
use crate::config::AnalyzerConfig;

#[derive(Debug, Clone)]
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            prompt: config.prompt.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model)
    }

    fn request_body(&self, image: &ImageArtifact) -> Value {
        json!({
            "contents": [{
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": image.mime_type,
                            "data": STANDARD.encode(&image.bytes),
                        }
                    },
                    { "text": self.prompt }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "workType": {
                            "type": "STRING",
                            "description": "The primary type of work identified in the image."
                        },
                        "hazards": {
                            "type": "ARRAY",
                            "description": "A list of potential hazards or risks observed.",
                            "items": { "type": "STRING" }
                        }
                    }
                }
            }
        })
    }
}

/// Pull the model's JSON answer out of a `generateContent` response.
fn parse_analysis(body: &str) -> Result<ImageAnalysis, AnalysisError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| AnalysisError::MalformedResponse(format!("invalid envelope: {e}")))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AnalysisError::MalformedResponse(
            "response contained no candidate text".to_string(),
        ));
    }

    serde_json::from_str(&text)
        .map_err(|e| AnalysisError::MalformedResponse(format!("invalid analysis JSON: {e}")))
}

#[async_trait]
impl HazardAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, image: &ImageArtifact) -> Result<ImageAnalysis, AnalysisError> {
        let api_key = self.api_key.as_deref().ok_or(AnalysisError::MissingCredential)?;

        debug!(
            model = %self.model,
            mime_type = %image.mime_type,
            bytes = image.bytes.len(),
            "Sending image for hazard analysis"
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&self.request_body(image))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(status = status.as_u16(), "Image analysis API returned an error");
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let analysis = parse_analysis(&body)?;
        info!(
            work_type = %analysis.work_type,
            hazards = analysis.hazards.len(),
            "Image analysis completed"
        );
        Ok(analysis)
    }
}
