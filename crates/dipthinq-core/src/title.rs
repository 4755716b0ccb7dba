//! Conversation title generation.
//!
//! A title is requested from the relay with a fixed prompt, then cleaned of
//! the decoration models like to add (quotes, markdown, "Title:" prefixes).
//! Any failure degrades to a truncation of the user's first message.

use std::sync::LazyLock;

use regex::Regex;

use dipthinq_types::{conversation::truncate_chars, relay::RelayRequest};

use crate::ports::RelayPort;

/// Characters of the first message used as a temporary or fallback title.
pub const FALLBACK_TITLE_CHARS: usize = 30;
pub const MAX_TITLE_WORDS: usize = 5;
pub const MAX_TITLE_CHARS: usize = 50;

static SURROUNDING_QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^["'`]+|["'`]+$"#).expect("valid regex"));
static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+\s*").expect("valid regex"));
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*+").expect("valid regex"));
static KNOWN_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:title|the title is)\s*:\s*").expect("valid regex")
});

pub fn title_prompt(user_text: &str) -> String {
    format!(
        "You are a title generator. Your ONLY task is to create a short title.

User's first message: \"{user_text}\"

Generate a title that:
- Is 3-5 words maximum
- Describes the main topic or question
- Is in title case (Capitalize Each Word)
- Is concise and clear

IMPORTANT: Return ONLY the title text. No quotes, no explanations, no \"Title:\" prefix, no markdown, nothing else. Just the title words."
    )
}

/// Temporary and fallback title: the first 30 characters of the message.
pub fn fallback_title(user_text: &str) -> String {
    truncate_chars(user_text, FALLBACK_TITLE_CHARS)
}

/// Strip decoration from raw model output and bound its length.
///
/// Returns `None` when nothing usable is left or the result exceeds
/// [`MAX_TITLE_CHARS`].
pub fn sanitize_title(raw: &str) -> Option<String> {
    let mut current = raw.trim().to_string();

    // Decorations nest ("**Title:** \"X\""), so strip until nothing changes.
    loop {
        let mut next = SURROUNDING_QUOTES.replace_all(&current, "").into_owned();
        next = HEADING_MARKER.replace(&next, "").into_owned();
        next = EMPHASIS.replace_all(&next, "").into_owned();
        next = KNOWN_PREFIX.replace(&next, "").into_owned();
        let next = next.trim().to_string();
        if next == current {
            break;
        }
        current = next;
    }

    let title = current
        .split_whitespace()
        .take(MAX_TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return None;
    }
    Some(title)
}

/// Ask the relay for a short title. Never fails.
pub async fn generate_title(
    relay: &dyn RelayPort,
    agent_id: &str,
    title_model: &str,
    user_text: &str,
) -> String {
    let req = RelayRequest::new(title_prompt(user_text), agent_id).with_model(title_model);

    match relay.send(req).await {
        Ok(reply) => {
            let raw = reply.response.unwrap_or_default();
            match sanitize_title(&raw) {
                Some(title) => return title,
                None => log::warn!("Discarding unusable generated title: {:?}", raw),
            }
        }
        Err(e) => log::warn!("Title generation failed: {}", e),
    }

    fallback_title(user_text)
}
