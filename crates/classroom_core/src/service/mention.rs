//! Mention extraction for notification text.
//!
//! A mention is `@` followed by a whitespace-free token that itself contains
//! an `@`, e.g. `@student@example.com` mentions `student@example.com`.

use crate::model::identity::MailId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(\S+@\S+)").expect("valid mention regex"));

/// Returns mentioned identities in order of first appearance, without
/// duplicates.
pub fn extract_mentions(text: &str) -> Vec<MailId> {
    let mut mentions: Vec<MailId> = Vec::new();
    let mut seen: BTreeSet<MailId> = BTreeSet::new();
    for caps in MENTION_RE.captures_iter(text) {
        let Some(token) = caps.get(1) else {
            continue;
        };
        let mail = MailId::new(token.as_str());
        if seen.insert(mail.clone()) {
            mentions.push(mail);
        }
    }
    mentions
}
