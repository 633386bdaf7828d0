//! Context compaction strategies for conversation history.
//!
//! Provides the two pure strategies memory uses to stay bounded:
//!
//! - **Truncate**: Drop old messages, keeping only the N most recent.
//! - **Summarize**: Replace old messages with a single summary message,
//!   keeping the N most recent messages intact.
//!
//! and the [`Summarizer`] capability that decides where to cut and produces
//! the summary text. The default [`LlmSummarizer`] asks the agent's own model.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::agent::ModelBinding;
use crate::error::{HermesError, Result};
use crate::providers::Tokenizer;
use crate::session::Message;

/// Prefix of every synthesized summary message.
pub const SUMMARY_PREFIX: &str = "[Conversation Summary]\n";

/// Approximate token count of one message.
///
/// Uses the tokenizer when it succeeds, otherwise `chars / 4`.
pub fn estimate_tokens(message: &Message, tokenizer: &dyn Tokenizer) -> usize {
    match tokenizer.tokenize(&message.content) {
        Ok(tokens) => tokens.len(),
        Err(e) => {
            debug!(error = %e, "Tokenizer failed, using length heuristic");
            message.content.chars().count() / 4
        }
    }
}

/// Approximate token count of a whole sequence.
pub fn estimate_total(messages: &[Message], tokenizer: &dyn Tokenizer) -> usize {
    messages.iter().map(|m| estimate_tokens(m, tokenizer)).sum()
}

/// Truncate messages to keep only the N most recent.
///
/// The result is always a suffix of the input of length
/// `min(keep_recent, messages.len())`. A leading summary is dropped like any
/// other message when the tail is long enough.
///
/// # Examples
/// ```
/// use hermes::session::Message;
/// use hermes::agent::compaction::truncate_messages;
///
/// let msgs = vec![
///     Message::summary("[Conversation Summary]\nearlier"),
///     Message::user("Hi"),
///     Message::assistant("Hello!"),
///     Message::user("How are you?"),
/// ];
/// let result = truncate_messages(msgs, 2);
/// assert_eq!(result.len(), 2);
/// assert_eq!(result[0].content, "Hello!");
/// ```
pub fn truncate_messages(messages: Vec<Message>, keep_recent: usize) -> Vec<Message> {
    if messages.len() <= keep_recent {
        return messages;
    }
    let skip = messages.len() - keep_recent;
    messages.into_iter().skip(skip).collect()
}

/// Whether `messages` holds at most one summary, and only at the front.
pub fn summary_is_leading(messages: &[Message]) -> bool {
    messages.iter().skip(1).all(|m| !m.is_summary())
}

/// Merge every summary in `messages` into one leading summary.
///
/// Summary texts are joined oldest first under a single [`SUMMARY_PREFIX`];
/// all other messages keep their order. Sequences that already satisfy
/// [`summary_is_leading`] are returned unchanged.
///
/// # Examples
/// ```
/// use hermes::session::Message;
/// use hermes::agent::compaction::consolidate_summaries;
///
/// let msgs = vec![
///     Message::user("a"),
///     Message::summary("[Conversation Summary]\nold"),
///     Message::user("b"),
/// ];
/// let result = consolidate_summaries(msgs);
/// assert_eq!(result.len(), 3);
/// assert!(result[0].is_summary());
/// assert!(!result[2].is_summary());
/// ```
pub fn consolidate_summaries(messages: Vec<Message>) -> Vec<Message> {
    if summary_is_leading(&messages) {
        return messages;
    }

    let (summaries, rest): (Vec<Message>, Vec<Message>) =
        messages.into_iter().partition(Message::is_summary);
    let text = summaries
        .iter()
        .map(|m| m.content.strip_prefix(SUMMARY_PREFIX).unwrap_or(m.content.as_str()).trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    debug!(summaries = summaries.len(), "Merged summaries into one leading entry");
    let mut result = Vec::with_capacity(rest.len() + 1);
    result.push(Message::summary(&format!("{}{}", SUMMARY_PREFIX, text)));
    result.extend(rest);
    result
}

/// Number of leading messages a summary must cover when keeping
/// `keep_recent` messages verbatim.
///
/// The cut never leaves a summary in the kept tail: it moves past the last
/// summary, so that summary is folded along with the prefix.
pub fn fold_point(messages: &[Message], keep_recent: usize) -> usize {
    let by_count = messages.len().saturating_sub(keep_recent);
    match messages.iter().rposition(Message::is_summary) {
        Some(last) if last > 0 => by_count.max(last + 1),
        _ => by_count,
    }
}

/// Summarize old messages into a single summary message, keeping the most
/// recent messages intact.
///
/// Returns `[summary, ...last keep_recent messages]`. Any earlier summary is
/// part of the folded prefix, even one inside the last `keep_recent`
/// messages, so the result holds exactly one summary and it comes first.
///
/// # Examples
/// ```
/// use hermes::session::Message;
/// use hermes::agent::compaction::summarize_messages;
///
/// let msgs = vec![
///     Message::user("Tell me about Rust"),
///     Message::assistant("Rust is a systems language..."),
///     Message::user("What about async?"),
///     Message::assistant("Async in Rust uses tokio..."),
/// ];
/// let result = summarize_messages(msgs, 2, "User asked about Rust.");
/// assert_eq!(result.len(), 3); // summary + 2 recent
/// assert!(result[0].is_summary());
/// ```
pub fn summarize_messages(
    messages: Vec<Message>,
    keep_recent: usize,
    summary_text: &str,
) -> Vec<Message> {
    let skip = fold_point(&messages, keep_recent);
    if skip == 0 {
        // Nothing to summarize
        return messages;
    }

    let mut result = Vec::with_capacity(1 + messages.len() - skip);
    result.push(Message::summary(&format!("{}{}", SUMMARY_PREFIX, summary_text)));
    result.extend(messages.into_iter().skip(skip));
    result
}

/// Build a prompt asking an LLM to summarize a conversation.
///
/// # Examples
/// ```
/// use hermes::session::Message;
/// use hermes::agent::compaction::build_summary_prompt;
///
/// let msgs = vec![
///     Message::user("Hello"),
///     Message::assistant("Hi there!"),
/// ];
/// let prompt = build_summary_prompt(&msgs);
/// assert!(prompt.contains("user: Hello"));
/// assert!(prompt.contains("assistant: Hi there!"));
/// ```
pub fn build_summary_prompt(messages: &[Message]) -> String {
    let mut transcript = String::new();
    for msg in messages {
        transcript.push_str(&format!("{}: {}\n", msg.role, msg.content));
    }

    format!(
        "Summarize the following conversation focusing on key decisions, \
         information exchanged, and actions taken. Be concise.\n\n{}",
        transcript
    )
}

/// Number of trailing messages whose tokens fit in `budget`, at least one.
pub fn tail_within(messages: &[Message], budget: usize, tokenizer: &dyn Tokenizer) -> usize {
    let mut used = 0;
    let mut kept = 0;
    for msg in messages.iter().rev() {
        let cost = estimate_tokens(msg, tokenizer);
        if kept > 0 && used + cost > budget {
            break;
        }
        used += cost;
        kept += 1;
    }
    kept
}

/// Collapses the oldest messages of a conversation into one summary.
///
/// Implementations return either `messages` unchanged or a sequence that
/// starts with exactly one summary message followed by a suffix of the
/// input.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        messages: Vec<Message>,
        token_limit: usize,
        tokenizer: &dyn Tokenizer,
    ) -> Result<Vec<Message>>;
}

/// Summarizer backed by a model binding.
///
/// Keeps the longest tail that fits in half the budget verbatim and asks
/// the model to summarize everything before it.
pub struct LlmSummarizer {
    binding: ModelBinding,
    max_tokens: Option<u32>,
}

impl LlmSummarizer {
    pub fn new(binding: ModelBinding) -> Self {
        Self {
            binding,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(
        &self,
        messages: Vec<Message>,
        token_limit: usize,
        tokenizer: &dyn Tokenizer,
    ) -> Result<Vec<Message>> {
        let fold = fold_point(&messages, tail_within(&messages, token_limit / 2, tokenizer));
        if fold == 0 {
            return Ok(messages);
        }
        let keep = messages.len() - fold;

        let prefix = &messages[..fold];
        let request = vec![Message::user(&build_summary_prompt(prefix))];
        let response = self
            .binding
            .provider()
            .chat(
                request,
                Vec::new(),
                Some(self.binding.model()),
                self.binding.chat_options(self.max_tokens),
            )
            .await?;

        let text = response.content.trim();
        if text.is_empty() {
            return Err(HermesError::Provider(
                "Summarization returned an empty response".to_string(),
            ));
        }

        info!(
            folded = prefix.len(),
            kept = keep,
            "Collapsed conversation prefix into summary"
        );
        Ok(summarize_messages(messages, keep, text))
    }
}
