//! Interactive triage session — an explicit state machine over the inbox
//! listing and post-summary menus, driven by stdin line reads.
//!
//! Input interpretation is pure (`interpret_listing`, `interpret_post_action`)
//! so every transition is enumerable and testable without a terminal; the
//! async driver just wires prompts to network calls, strictly sequentially.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use crate::assistant::Assistant;
use crate::content;
use crate::error::Result;
use crate::jmap::JmapClient;
use crate::jmap::types::EmailSummary;

// ── Input interpretation ────────────────────────────────────────────

/// What the user asked for at the inbox listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingChoice {
    /// 0-based message index (shown 1-based on screen).
    Select(usize),
    Quit,
    Invalid,
}

/// What the user asked for at the post-summary menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostActionChoice {
    ReviewAnother,
    DraftReply,
    Quit,
    Invalid,
}

/// Interpret input at the listing prompt against the number of listed
/// messages. Anything unrecognized is `Invalid` — reprompt, no transition.
pub fn interpret_listing(input: &str, count: usize) -> ListingChoice {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return ListingChoice::Quit;
    }
    // Digits only; signs like "+2" are not a selection.
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return ListingChoice::Invalid;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => ListingChoice::Select(n - 1),
        _ => ListingChoice::Invalid,
    }
}

/// Interpret input at the post-summary menu.
pub fn interpret_post_action(input: &str) -> PostActionChoice {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" => PostActionChoice::ReviewAnother,
        "2" => PostActionChoice::DraftReply,
        "q" => PostActionChoice::Quit,
        _ => PostActionChoice::Invalid,
    }
}

// ── Session driver ──────────────────────────────────────────────────

/// A listed message with its content already resolved. Content is immutable
/// once resolved and reused for both the summary and the drafted reply.
struct TriagedEmail {
    summary: EmailSummary,
    content: String,
}

/// One interactive session over a located inbox.
pub struct Session {
    jmap: JmapClient,
    assistant: Assistant,
    inbox_id: String,
    limit: usize,
}

impl Session {
    pub fn new(jmap: JmapClient, assistant: Assistant, inbox_id: String, limit: usize) -> Self {
        Self {
            jmap,
            assistant,
            inbox_id,
            limit,
        }
    }

    /// Run the menu loop until the user quits (or stdin closes). Service
    /// errors propagate to the caller's top-level handler.
    pub async fn run(self) -> Result<()> {
        let mut input = BufReader::new(tokio::io::stdin()).lines();

        // Listing state: each pass fetches a fresh message list.
        loop {
            let emails = self.load_inbox().await?;

            println!("\nYour Inbox:");
            for (i, email) in emails.iter().enumerate() {
                print_listing_line(i + 1, &email.summary);
            }
            println!("\nOptions:");
            println!("Enter the number of the email to process.");
            println!("Q: Quit");

            // Reprompt on invalid input without refetching.
            let selected = loop {
                let Some(line) = prompt(&mut input, "Choose an email or action: ").await? else {
                    return Ok(());
                };
                match interpret_listing(&line, emails.len()) {
                    ListingChoice::Quit => {
                        println!("Goodbye!");
                        return Ok(());
                    }
                    ListingChoice::Select(i) => break i,
                    ListingChoice::Invalid => println!("Invalid choice. Please try again."),
                }
            };

            let email = &emails[selected];
            let sender = email.summary.sender_name();
            let subject = email.summary.subject_line();

            println!("\nOllama is summarizing your email...");
            let summary = self
                .assistant
                .summarize(sender, subject, &email.content)
                .await?;
            println!("\nSummary:\n{summary}");

            // PostAction state: act on the already-resolved content.
            loop {
                println!("\nOptions:");
                println!("1: Review another email");
                println!("2: Generate a reply to this email");
                println!("Q: Quit");

                let Some(line) = prompt(&mut input, "Choose an action: ").await? else {
                    return Ok(());
                };
                match interpret_post_action(&line) {
                    PostActionChoice::ReviewAnother => break,
                    PostActionChoice::DraftReply => {
                        let reply = self
                            .assistant
                            .draft_reply(sender, subject, &email.content)
                            .await?;
                        println!("\nGenerated Reply:\n{reply}");
                        break;
                    }
                    PostActionChoice::Quit => {
                        println!("Goodbye!");
                        return Ok(());
                    }
                    PostActionChoice::Invalid => println!("Invalid option. Please try again."),
                }
            }
        }
    }

    /// Fetch the freshest message list and resolve content per message,
    /// preserving the query's descending-receipt order.
    async fn load_inbox(&self) -> Result<Vec<TriagedEmail>> {
        let ids = self
            .jmap
            .list_recent_messages(&self.inbox_id, self.limit)
            .await?;
        let summaries = self.jmap.fetch_message_details(&ids).await?;

        let mut emails = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let content = content::resolve(&self.jmap, &summary).await?;
            debug!(id = %summary.id, bytes = content.len(), "resolved message content");
            emails.push(TriagedEmail { summary, content });
        }
        Ok(emails)
    }
}

fn print_listing_line(position: usize, email: &EmailSummary) {
    match email.received_at {
        Some(at) => println!(
            "{position}. [{}] From: {} | Subject: {}",
            at.format("%Y-%m-%d %H:%M"),
            email.sender_name(),
            email.subject_line()
        ),
        None => println!(
            "{position}. From: {} | Subject: {}",
            email.sender_name(),
            email.subject_line()
        ),
    }
}

/// Print a prompt and read one line; `None` on stdin EOF.
async fn prompt(input: &mut Lines<BufReader<Stdin>>, text: &str) -> Result<Option<String>> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

// ── Tests ───────────────────────────────────────────────────────────
