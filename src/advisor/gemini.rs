use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{AdviceRequest, AdviceResponse, AdvisorError, TextGenerator};
use crate::config::AdvisorConfig;

/// Client for the `generateContent` endpoint of the generative language API.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GeminiClient {
    pub fn from_config(config: &AdvisorConfig) -> Result<Self, AdvisorError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(AdvisorError::MissingApiKey)?
            .to_string();

        let http = reqwest::Client::builder()
            .user_agent(format!("compound/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AdvisorError::TransportFailure(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn send(&self, prompt: String) -> Result<AdviceResponse, AdvisorError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
        };

        let response = self
            .http
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AdvisorError::TransportFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                model = %self.model,
                "advisor service returned an error status"
            );
        }

        let body = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| AdvisorError::TransportFailure(e.to_string()))?;

        first_text(body)
            .map(|text| AdviceResponse { text })
            .ok_or(AdvisorError::NoContent)
    }
}

impl TextGenerator for GeminiClient {
    fn generate(
        &self,
        request: AdviceRequest,
    ) -> impl Future<Output = Result<AdviceResponse, AdvisorError>> + Send {
        self.send(request.prompt)
    }
}

fn first_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
        .filter(|text| !text.trim().is_empty())
}
