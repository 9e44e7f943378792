//! JMAP mail service client — the subset of JMAP this assistant consumes.

pub mod client;
pub mod types;

pub use client::JmapClient;
pub use types::{BodyPart, EmailAddress, EmailSummary, Mailbox, MailboxRole};
