use crate::config::Config;
use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

/// External text-generation service. Returns the raw reply text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` and ask for a JSON-only reply.
    async fn generate_json(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Gemini `generateContent` over REST.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            api_base: api_base.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_key, &config.model, &config.api_base)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_json(&self, prompt: &str) -> anyhow::Result<String> {
        let payload = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ],
            "generationConfig": {
                "responseMimeType": "application/json"
            }
        });

        info!("Calling {} ({} prompt characters)", self.model, prompt.len());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "LLM API request failed: {} {}",
                status,
                api_error_message(&body).unwrap_or_default()
            ));
        }

        let response_json: Value = response.json().await?;
        let text = reply_text(&response_json)?;

        info!("Received {} characters from {}", text.len(), self.model);
        Ok(text)
    }
}

/// Joins the text parts of the first candidate.
fn reply_text(response_json: &Value) -> anyhow::Result<String> {
    let parts = response_json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            let reason = response_json["promptFeedback"]["blockReason"]
                .as_str()
                .or_else(|| response_json["candidates"][0]["finishReason"].as_str())
                .unwrap_or("no candidates");
            anyhow!("Invalid response format from LLM ({})", reason)
        })?;

    let text: String = parts.iter().filter_map(|part| part["text"].as_str()).collect();
    if text.trim().is_empty() {
        return Err(anyhow!("LLM returned an empty reply"));
    }
    Ok(text)
}

fn api_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["error"]["message"].as_str().map(str::to_string)
}
