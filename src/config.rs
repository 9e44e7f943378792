//! Configuration, read once from environment variables at startup.

use secrecy::SecretString;

/// Immutable runtime configuration, constructed in `main` and passed into
/// each component constructor.
#[derive(Debug, Clone)]
pub struct Config {
    /// JMAP API endpoint (method-call batching over HTTPS POST).
    pub api_url: String,
    /// JMAP account identifier.
    pub account_id: String,
    /// Bearer token for the mail service and blob downloads.
    pub api_token: SecretString,
    /// Host serving `/jmap/download/{accountId}/{blobId}/`.
    pub download_url: String,
    /// Ollama generation endpoint.
    pub ollama_url: String,
    /// Model name sent with every generation request.
    pub model: String,
    /// Maximum number of inbox messages to list.
    pub fetch_limit: usize,
}

impl Config {
    /// Build config from environment variables.
    ///
    /// Missing required values are not validated here — an empty API URL or
    /// token simply fails at the mail service, which reports the problem.
    pub fn from_env() -> Self {
        let api_url = std::env::var("JMAP_API_URL").unwrap_or_default();
        let account_id = std::env::var("JMAP_ACCOUNT_ID").unwrap_or_default();
        let api_token = SecretString::from(std::env::var("JMAP_API_TOKEN").unwrap_or_default());

        let download_url = std::env::var("JMAP_DOWNLOAD_URL")
            .unwrap_or_else(|_| "https://www.fastmailusercontent.com".to_string());

        let ollama_url = std::env::var("OLLAMA_URL")
            .unwrap_or_else(|_| "http://localhost:11434/api/generate".to_string());

        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3".to_string());

        let fetch_limit: usize = std::env::var("INBOX_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Self {
            api_url,
            account_id,
            api_token,
            download_url,
            ollama_url,
            model,
            fetch_limit,
        }
    }
}
