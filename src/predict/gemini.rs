//! Google Gemini text generation over REST.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::config::PredictorConfig;
use crate::predict::{PredictError, TextModel};

#[derive(Debug, Deserialize)]
struct GenerateResponse {
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

fn first_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &PredictorConfig) -> Result<Self, PredictError> {
        let mut endpoint = Url::parse(&config.base_url)
            .map_err(|e| PredictError::Config(format!("predictor base URL: {}", e)))?;
        let call = format!("{}:generateContent", config.model);
        endpoint
            .path_segments_mut()
            .map_err(|_| PredictError::Config("predictor base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(["v1beta", "models", call.as_str()]);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, PredictError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PredictError::Status {
                status: status.as_u16(),
                detail: detail.chars().take(200).collect(),
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        first_text(parsed).ok_or(PredictError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"TARGET_PRICE: 10\n"},{"text":"CONFIDENCE: 60%"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(
            first_text(response).as_deref(),
            Some("TARGET_PRICE: 10\nCONFIDENCE: 60%")
        );
    }

    #[test]
    fn test_blocked_answer_has_no_text() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(first_text(response).is_none());
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(first_text(response).is_none());
    }

    #[test]
    fn test_endpoint_layout() {
        let client = GeminiClient::new(&PredictorConfig {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
