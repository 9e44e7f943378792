//! JMAP HTTP client — `Mailbox/get`, `Email/query`, `Email/get`, and blob
//! downloads. Single-shot request/response pairs; no caching, no retries.

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::Config;
use crate::error::ServiceError;
use crate::jmap::types::{EmailSummary, Mailbox, MailboxRole};

const USING: [&str; 2] = ["urn:ietf:params:jmap:core", "urn:ietf:params:jmap:mail"];

/// Client for the JMAP mail service. One instance per session.
pub struct JmapClient {
    http: reqwest::Client,
    api_url: String,
    download_url: String,
    account_id: String,
    token: SecretString,
}

impl JmapClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            download_url: config.download_url.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
            token: config.api_token.clone(),
        }
    }

    /// Find the inbox id, if the account has a mailbox tagged with the
    /// inbox role.
    pub async fn locate_inbox(&self) -> Result<Option<String>, ServiceError> {
        let args = self
            .call("Mailbox/get", json!({ "accountId": self.account_id }))
            .await?;
        let response: MailboxGetResponse = parse_args(args)?;
        Ok(find_inbox(&response.list))
    }

    /// List up to `limit` message ids in the mailbox, newest first.
    /// The returned order is authoritative for on-screen indices.
    pub async fn list_recent_messages(
        &self,
        mailbox_id: &str,
        limit: usize,
    ) -> Result<Vec<String>, ServiceError> {
        let args = self
            .call("Email/query", query_args(&self.account_id, mailbox_id, limit))
            .await?;
        let response: EmailQueryResponse = parse_args(args)?;
        debug!(count = response.ids.len(), "listed inbox messages");
        Ok(response.ids)
    }

    /// Batch-fetch sender, subject, and body references in a single round
    /// trip. The service may answer in any order; the result is restored to
    /// the input id order.
    pub async fn fetch_message_details(
        &self,
        ids: &[String],
    ) -> Result<Vec<EmailSummary>, ServiceError> {
        let args = self
            .call("Email/get", get_args(&self.account_id, ids))
            .await?;
        let response: EmailGetResponse = parse_args(args)?;
        Ok(reorder_by_ids(response.list, ids))
    }

    /// Fetch a raw body blob from the content-addressed download endpoint.
    pub async fn download_blob(&self, blob_id: &str) -> Result<String, ServiceError> {
        let url = format!(
            "{}/jmap/download/{}/{}/",
            self.download_url, self.account_id, blob_id
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| ServiceError::Http {
                service: "download",
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                service: "download",
                status,
            });
        }
        response.text().await.map_err(|e| ServiceError::Http {
            service: "download",
            source: e,
        })
    }

    /// Issue a single JMAP method call and return its response arguments.
    async fn call(&self, method: &str, args: Value) -> Result<Value, ServiceError> {
        let payload = json!({
            "using": USING,
            "methodCalls": [[method, args, "0"]],
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(self.token.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::Http {
                service: "mail",
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                service: "mail",
                status,
            });
        }

        let body: Value = response.json().await.map_err(|e| ServiceError::Malformed {
            service: "mail",
            reason: e.to_string(),
        })?;
        first_method_response(&body)
    }
}

// ── Response envelopes ──────────────────────────────────────────────

#[derive(Deserialize)]
struct MailboxGetResponse {
    #[serde(default)]
    list: Vec<Mailbox>,
}

#[derive(Deserialize)]
struct EmailQueryResponse {
    #[serde(default)]
    ids: Vec<String>,
}

#[derive(Deserialize)]
struct EmailGetResponse {
    #[serde(default)]
    list: Vec<EmailSummary>,
}

// ── Helpers (public within the crate for testing) ───────────────────

fn malformed(reason: impl Into<String>) -> ServiceError {
    ServiceError::Malformed {
        service: "mail",
        reason: reason.into(),
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, ServiceError> {
    serde_json::from_value(args).map_err(|e| malformed(e.to_string()))
}

/// `Email/query` arguments: mailbox filter, newest-first sort, bounded limit.
pub(crate) fn query_args(account_id: &str, mailbox_id: &str, limit: usize) -> Value {
    json!({
        "accountId": account_id,
        "filter": { "inMailbox": mailbox_id },
        "sort": [{ "property": "receivedAt", "isAscending": false }],
        "limit": limit,
    })
}

/// `Email/get` arguments: explicit property projection for the batch fetch.
pub(crate) fn get_args(account_id: &str, ids: &[String]) -> Value {
    json!({
        "accountId": account_id,
        "ids": ids,
        "properties": ["textBody", "htmlBody", "subject", "from", "blobId", "receivedAt"],
    })
}

/// Pull `methodResponses[0][1]` out of a JMAP response envelope.
/// A method-level `error` response counts as malformed.
pub(crate) fn first_method_response(body: &Value) -> Result<Value, ServiceError> {
    let call = body
        .pointer("/methodResponses/0")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing methodResponses"))?;

    let (name, args) = match (call.first().and_then(Value::as_str), call.get(1)) {
        (Some(name), Some(args)) => (name, args),
        _ => return Err(malformed("method response is not a [name, args, id] triple")),
    };

    if name == "error" {
        let kind = args.get("type").and_then(Value::as_str).unwrap_or("unknown");
        return Err(malformed(format!("method-level error: {kind}")));
    }
    Ok(args.clone())
}

/// Scan for the mailbox tagged with the inbox role.
pub(crate) fn find_inbox(mailboxes: &[Mailbox]) -> Option<String> {
    mailboxes
        .iter()
        .find(|m| m.role == Some(MailboxRole::Inbox))
        .map(|m| m.id.clone())
}

/// Restore the caller's id order. Ids the service did not answer for are
/// dropped, never padded.
pub(crate) fn reorder_by_ids(list: Vec<EmailSummary>, ids: &[String]) -> Vec<EmailSummary> {
    let mut by_id: HashMap<String, EmailSummary> =
        list.into_iter().map(|e| (e.id.clone(), e)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

// ── Tests ───────────────────────────────────────────────────────────
