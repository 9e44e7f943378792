//! Content resolution — pick a blob source for a message and reduce it to
//! clean plain text.

use tracing::debug;

use crate::error::ServiceError;
use crate::jmap::JmapClient;
use crate::jmap::types::EmailSummary;

/// Returned when a message has no usable body reference at all. A valid
/// terminal state, not an error.
pub const NO_CONTENT: &str = "(No content available)";

/// Resolve a message to plain text.
///
/// Whatever blob is fetched goes through the same HTML cleanup — the
/// declared body variant is not trusted to match the actual content.
/// A message with no usable reference resolves to [`NO_CONTENT`] without
/// touching the network.
pub async fn resolve(client: &JmapClient, email: &EmailSummary) -> Result<String, ServiceError> {
    let Some(blob_id) = select_blob(email) else {
        debug!(id = %email.id, "no usable body reference");
        return Ok(NO_CONTENT.to_string());
    };
    let raw = client.download_blob(blob_id).await?;
    Ok(clean_text(&raw))
}

/// Blob-source selection chain, in strict priority order: a text-body part
/// with a blob pointer, an html-body part with a blob pointer, the
/// message-level blob. A body part without a pointer falls through to the
/// next rule.
pub fn select_blob(email: &EmailSummary) -> Option<&str> {
    email
        .text_body
        .iter()
        .find_map(|part| part.blob_id.as_deref())
        .or_else(|| email.html_body.iter().find_map(|part| part.blob_id.as_deref()))
        .or(email.blob_id.as_deref())
}

/// Reduce an HTML (or plain text) blob to whitespace-normalized plain text.
///
/// `<style>` subtrees and comments are dropped entirely, remaining markup is
/// stripped, character entities are decoded, and every whitespace run
/// collapses to a single space with no leading/trailing whitespace.
pub fn clean_text(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        rest = &rest[open..];
        if rest.starts_with("<!--") {
            rest = match rest.find("-->") {
                Some(end) => &rest[end + 3..],
                None => "",
            };
        } else if opens_style(rest) {
            rest = skip_style(rest);
        } else {
            rest = match rest.find('>') {
                Some(end) => &rest[end + 1..],
                None => "",
            };
        }
    }
    text.push_str(rest);

    decode_entities(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when `rest` (starting at `<`) opens a style element.
fn opens_style(rest: &str) -> bool {
    let after = rest[1..].as_bytes();
    if after.len() < 5 || !after[..5].eq_ignore_ascii_case(b"style") {
        return false;
    }
    matches!(
        after.get(5),
        None | Some(b'>' | b'/' | b' ' | b'\t' | b'\r' | b'\n')
    )
}

/// Skip a whole `<style>` subtree: past the opening tag, then past the
/// matching close tag. Tag and descendant text must not reach the output.
fn skip_style(rest: &str) -> &str {
    let Some(end) = rest.find('>') else { return "" };
    if rest[..end].ends_with('/') {
        // self-closing, no subtree
        return &rest[end + 1..];
    }
    let body = &rest[end + 1..];
    // ASCII lowercasing keeps byte offsets stable
    match body.to_ascii_lowercase().find("</style") {
        Some(close) => {
            let tail = &body[close..];
            match tail.find('>') {
                Some(gt) => &tail[gt + 1..],
                None => "",
            }
        }
        None => "",
    }
}

/// Decode the common named entities plus numeric `&#NN;` / `&#xNN;` forms.
/// Unrecognized entities pass through verbatim.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(semi) = rest[1..].find(';').map(|i| i + 1).filter(|&i| i <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        match decode_entity(&rest[1..semi]) {
            Some(ch) => out.push(ch),
            None => out.push_str(&rest[..=semi]),
        }
        rest = &rest[semi + 1..];
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn email(value: serde_json::Value) -> EmailSummary {
        serde_json::from_value(value).unwrap()
    }

    // ── Blob selection priority ─────────────────────────────────────

    #[test]
    fn text_body_wins_over_html_body() {
        let email = email(json!({
            "id": "m1",
            "textBody": [{ "blobId": "bt" }],
            "htmlBody": [{ "blobId": "bh" }],
            "blobId": "braw",
        }));
        assert_eq!(select_blob(&email), Some("bt"));
    }

    #[test]
    fn html_body_used_when_no_text_body() {
        let email = email(json!({
            "id": "m2",
            "htmlBody": [{ "blobId": "bh" }],
            "blobId": "braw",
        }));
        assert_eq!(select_blob(&email), Some("bh"));
    }

    #[test]
    fn message_level_blob_is_the_fallback() {
        let email = email(json!({ "id": "m3", "blobId": "braw" }));
        assert_eq!(select_blob(&email), Some("braw"));
    }

    #[test]
    fn no_reference_at_all_selects_nothing() {
        let email = email(json!({ "id": "m4" }));
        assert_eq!(select_blob(&email), None);
    }

    #[tokio::test]
    async fn no_reference_resolves_to_placeholder_without_network() {
        use secrecy::SecretString;

        use crate::config::Config;

        // Empty endpoints: any request attempt would fail, so a successful
        // resolve proves no network call was made.
        let config = Config {
            api_url: String::new(),
            account_id: String::new(),
            api_token: SecretString::from(String::new()),
            download_url: String::new(),
            ollama_url: String::new(),
            model: String::new(),
            fetch_limit: 10,
        };
        let client = JmapClient::new(&config);
        let email = email(json!({ "id": "m8" }));
        assert_eq!(resolve(&client, &email).await.unwrap(), NO_CONTENT);
        assert_eq!(NO_CONTENT, "(No content available)");
    }

    #[test]
    fn body_part_without_pointer_falls_through() {
        // A text part exists but carries no blob pointer: the html part wins.
        let email = email(json!({
            "id": "m5",
            "textBody": [{ "type": "text/plain" }],
            "htmlBody": [{ "blobId": "bh" }],
        }));
        assert_eq!(select_blob(&email), Some("bh"));

        // Neither body part has a pointer: message-level blob wins.
        let email = self::email(json!({
            "id": "m6",
            "textBody": [{ "type": "text/plain" }],
            "htmlBody": [{ "type": "text/html" }],
            "blobId": "braw",
        }));
        assert_eq!(select_blob(&email), Some("braw"));
    }

    #[test]
    fn later_part_with_pointer_beats_earlier_without() {
        let email = email(json!({
            "id": "m7",
            "textBody": [{ "type": "text/plain" }, { "blobId": "bt2" }],
        }));
        assert_eq!(select_blob(&email), Some("bt2"));
    }

    // ── HTML reduction ──────────────────────────────────────────────

    #[test]
    fn style_subtree_is_excluded_entirely() {
        assert_eq!(
            clean_text("<p>Hello<style>.x{color:red}</style> World</p>"),
            "Hello World"
        );
    }

    #[test]
    fn style_with_attributes_and_mixed_case() {
        assert_eq!(
            clean_text(r#"a <STYLE type="text/css">body { margin: 0 }</Style> b"#),
            "a b"
        );
    }

    #[test]
    fn unclosed_style_swallows_the_rest() {
        assert_eq!(clean_text("keep<style>.x{} never shown"), "keep");
    }

    #[test]
    fn whitespace_collapses_to_single_spaces() {
        assert_eq!(clean_text("  Line\none\t\ttwo   three \n"), "Line one two three");
        assert_eq!(
            clean_text("<div>\n  <p>Hi</p>\n  <p>there</p>\n</div>"),
            "Hi there"
        );
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(clean_text("a <!-- hidden <b>markup</b> --> b"), "a b");
        assert_eq!(clean_text("a<!-- inline -->b"), "ab");
    }

    #[test]
    fn entities_decode_after_stripping() {
        assert_eq!(clean_text("Tom &amp; Jerry &lt;3"), "Tom & Jerry <3");
        assert_eq!(clean_text("it&#39;s&nbsp;here"), "it's here");
        assert_eq!(clean_text("&#x41;pple"), "Apple");
        // unknown entities pass through
        assert_eq!(clean_text("&copy; 2025"), "&copy; 2025");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(clean_text("No markup at all"), "No markup at all");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn stray_ampersand_survives() {
        assert_eq!(clean_text("fish & chips"), "fish & chips");
    }
}
