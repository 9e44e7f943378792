//! JMAP data types, restricted to the properties this client projects.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A mailbox as returned by `Mailbox/get`.
#[derive(Debug, Clone, Deserialize)]
pub struct Mailbox {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<MailboxRole>,
}

/// Mailbox role tags. Only `Inbox` is consumed; anything unfamiliar
/// collapses to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailboxRole {
    Inbox,
    Archive,
    Drafts,
    Junk,
    Sent,
    Trash,
    #[serde(other)]
    Other,
}

/// One message from `Email/get`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub from: Option<Vec<EmailAddress>>,
    #[serde(default)]
    pub text_body: Vec<BodyPart>,
    #[serde(default)]
    pub html_body: Vec<BodyPart>,
    /// Message-level blob, the fallback when neither body list has a pointer.
    #[serde(default)]
    pub blob_id: Option<String>,
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
}

impl EmailSummary {
    /// Sender display name, falling back to the bare address, then a placeholder.
    pub fn sender_name(&self) -> &str {
        self.from
            .as_deref()
            .and_then(|addrs| addrs.first())
            .and_then(|a| a.name.as_deref().or(a.email.as_deref()))
            .unwrap_or("Unknown Sender")
    }

    pub fn subject_line(&self) -> &str {
        self.subject.as_deref().unwrap_or("(No Subject)")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailAddress {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A structural body reference; `blob_id` is what makes it downloadable.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyPart {
    #[serde(default)]
    pub blob_id: Option<String>,
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mailbox_role_inbox() {
        let mailbox: Mailbox =
            serde_json::from_value(json!({ "id": "mb1", "name": "Inbox", "role": "inbox" }))
                .unwrap();
        assert_eq!(mailbox.role, Some(MailboxRole::Inbox));
    }

    #[test]
    fn mailbox_unknown_role_collapses_to_other() {
        let mailbox: Mailbox =
            serde_json::from_value(json!({ "id": "mb2", "role": "important" })).unwrap();
        assert_eq!(mailbox.role, Some(MailboxRole::Other));
    }

    #[test]
    fn mailbox_missing_role() {
        let mailbox: Mailbox = serde_json::from_value(json!({ "id": "mb3" })).unwrap();
        assert_eq!(mailbox.role, None);
    }

    #[test]
    fn email_summary_deserializes_projected_properties() {
        let email: EmailSummary = serde_json::from_value(json!({
            "id": "m1",
            "subject": "Quarterly report",
            "from": [{ "name": "Alice", "email": "alice@example.com" }],
            "textBody": [{ "blobId": "bt1", "type": "text/plain" }],
            "htmlBody": [{ "blobId": "bh1", "type": "text/html" }],
            "blobId": "braw",
            "receivedAt": "2025-06-01T09:30:00Z",
        }))
        .unwrap();
        assert_eq!(email.sender_name(), "Alice");
        assert_eq!(email.subject_line(), "Quarterly report");
        assert_eq!(email.text_body[0].blob_id.as_deref(), Some("bt1"));
        assert_eq!(email.html_body[0].content_type.as_deref(), Some("text/html"));
        assert!(email.received_at.is_some());
    }

    #[test]
    fn sender_falls_back_to_address_then_placeholder() {
        let email: EmailSummary = serde_json::from_value(json!({
            "id": "m2",
            "from": [{ "email": "bob@example.com" }],
        }))
        .unwrap();
        assert_eq!(email.sender_name(), "bob@example.com");

        let email: EmailSummary = serde_json::from_value(json!({ "id": "m3" })).unwrap();
        assert_eq!(email.sender_name(), "Unknown Sender");
        assert_eq!(email.subject_line(), "(No Subject)");
    }
}
