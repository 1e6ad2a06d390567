//! Gemini advisor -- short motivational summary via the generateContent API.

use async_trait::async_trait;
use indoc::formatdoc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::error::AdvisoryError;
use crate::integrations::traits::Advisor;
use crate::reward::ProgressSummary;
use crate::storage::AdvisoryConfig;

pub struct GeminiAdvisor {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

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

impl GeminiAdvisor {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Build from configuration, reading the API key from the configured
    /// environment variable.
    pub fn from_config(config: &AdvisoryConfig) -> Result<Self, AdvisoryError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AdvisoryError::NotConfigured(format!("{} is not set", config.api_key_env))
            })?;
        Ok(Self::new(&config.endpoint, &config.model, api_key))
    }

    fn url(&self) -> Result<Url, AdvisoryError> {
        let base = self.endpoint.trim_end_matches('/');
        let mut url = Url::parse(&format!(
            "{base}/v1beta/models/{}:generateContent",
            self.model
        ))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

/// Prompt sent to the model.
pub fn build_prompt(summary: &ProgressSummary) -> String {
    formatdoc! {"
        You are a helpful assistant analyzing productivity.
        Stats:
        - Finished tasks: {done}
        - Total tasks: {total}
        - Sprints completed: {sprints}

        Give a short motivational summary in under 2 sentences.
        ",
        done = summary.tasks_done,
        total = summary.tasks_total,
        sprints = summary.sprints_completed,
    }
}

#[async_trait]
impl Advisor for GeminiAdvisor {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn advise(&self, summary: &ProgressSummary) -> Result<String, AdvisoryError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(summary) }] }]
        });

        let resp = self.client.post(self.url()?).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AdvisoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let data: GenerateResponse = resp.json().await?;
        let text = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AdvisoryError::EmptyResponse);
        }
        Ok(text)
    }
}
