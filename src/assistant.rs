//! Assistant invoker — composes natural-language instructions and calls the
//! Ollama generation endpoint.

use serde_json::{Value, json};
use tracing::debug;

use crate::config::Config;
use crate::error::ServiceError;

/// Returned when the generation endpoint answers without a `response` field.
/// Graceful degradation, not an error.
pub const NO_RESPONSE: &str = "No response from Ollama.";

/// Client for the local generation endpoint. Non-streaming, one request per
/// summary or reply; generated text is never cached.
pub struct Assistant {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl Assistant {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.ollama_url.clone(),
            model: config.model.clone(),
        }
    }

    /// Summarize a message, skipping marketing/footer boilerplate.
    pub async fn summarize(
        &self,
        sender: &str,
        subject: &str,
        content: &str,
    ) -> Result<String, ServiceError> {
        self.generate(&summary_prompt(sender, subject, content)).await
    }

    /// Draft a polite, professional reply to a message.
    pub async fn draft_reply(
        &self,
        sender: &str,
        subject: &str,
        content: &str,
    ) -> Result<String, ServiceError> {
        self.generate(&reply_prompt(sender, subject, content)).await
    }

    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        debug!(model = %self.model, prompt_bytes = prompt.len(), "generation request");
        let payload = json!({
            "stream": false,
            "model": self.model,
            "prompt": prompt,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::Http {
                service: "generation",
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                service: "generation",
                status,
            });
        }

        let body: Value = response.json().await.map_err(|e| ServiceError::Malformed {
            service: "generation",
            reason: e.to_string(),
        })?;
        Ok(extract_response(&body))
    }
}

/// Pull the generated text out of the endpoint's JSON body.
fn extract_response(body: &Value) -> String {
    body.get("response")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| NO_RESPONSE.to_string())
}

fn summary_prompt(sender: &str, subject: &str, content: &str) -> String {
    format!(
        "Summarize the following email, highlighting key points. Skip all standard \
         marketing email closing content that talks about their social media, address, \
         links to unsubscribe, etc. Also your response should just be a summary \
         paragraph, don't include anything introducing the summary. Just the summary \
         in as many sentences as are required to cover all points.\n\n\
         Sender: {sender}\nSubject: {subject}\nContent:\n{content}"
    )
}

fn reply_prompt(sender: &str, subject: &str, content: &str) -> String {
    format!(
        "Write a polite and professional reply to the following email:\n\n\
         Sender: {sender}\nSubject: {subject}\nContent: {content}"
    )
}

// ── Tests ───────────────────────────────────────────────────────────
