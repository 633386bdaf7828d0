//! Token-budgeted conversation memory.
//!
//! A [`MemoryBuffer`] is rebuilt from caller-supplied history every turn,
//! summarized when it overflows the token budget, and trimmed to a maximum
//! number of entries before it reaches the model.

use tracing::{debug, info, warn};

use crate::providers::Tokenizer;
use crate::session::Message;

use super::compaction::{
    consolidate_summaries, estimate_total, summary_is_leading, truncate_messages, Summarizer,
};

/// Ordered conversation store for one agent.
///
/// # Example
/// ```
/// use hermes::agent::MemoryBuffer;
/// use hermes::session::Message;
///
/// let mut memory = MemoryBuffer::new();
/// memory.replace_from(&[Message::user("a"), Message::assistant("b"), Message::user("c")]);
/// memory.trim_to_max_turns(2);
/// assert_eq!(memory.snapshot(), vec![Message::assistant("b"), Message::user("c")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryBuffer {
    messages: Vec<Message>,
}

impl MemoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole buffer with the caller's history.
    ///
    /// Summaries anywhere in `history` are merged into a single leading
    /// summary.
    pub fn replace_from(&mut self, history: &[Message]) {
        self.messages = consolidate_summaries(history.to_vec());
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Estimated token count of the buffer.
    pub fn estimated_tokens(&self, tokenizer: &dyn Tokenizer) -> usize {
        estimate_total(&self.messages, tokenizer)
    }

    /// Summarize the buffer if its estimated size exceeds `token_limit`.
    ///
    /// Returns whether the buffer changed. A failing summarizer, or one whose
    /// output would not shrink the buffer or would hold a summary anywhere
    /// but first, leaves it untouched.
    pub async fn ensure_budget(
        &mut self,
        token_limit: usize,
        tokenizer: &dyn Tokenizer,
        summarizer: &dyn Summarizer,
    ) -> bool {
        let before = self.estimated_tokens(tokenizer);
        if before <= token_limit {
            return false;
        }

        info!(
            tokens = before,
            token_limit,
            messages = self.messages.len(),
            "Memory over token budget, summarizing"
        );

        let original = self.messages.clone();
        match summarizer
            .summarize(original.clone(), token_limit, tokenizer)
            .await
        {
            Ok(summarized) => {
                if !summary_is_leading(&summarized) {
                    warn!("Summary is not the single leading entry, keeping original history");
                    return false;
                }
                let after = estimate_total(&summarized, tokenizer);
                if summarized.len() > original.len() || after > before {
                    warn!(
                        tokens_before = before,
                        tokens_after = after,
                        "Summary did not shrink memory, keeping original history"
                    );
                    return false;
                }
                debug!(
                    tokens_before = before,
                    tokens_after = after,
                    messages = summarized.len(),
                    "Memory summarized"
                );
                let changed = summarized != original;
                self.messages = summarized;
                changed
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed, keeping original history");
                false
            }
        }
    }

    /// Keep only the last `max_turns` entries.
    pub fn trim_to_max_turns(&mut self, max_turns: usize) {
        if self.messages.len() > max_turns {
            debug!(
                from = self.messages.len(),
                to = max_turns,
                "Trimming memory to max history length"
            );
            let messages = std::mem::take(&mut self.messages);
            self.messages = truncate_messages(messages, max_turns);
        }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::compaction::summarize_messages;
    use crate::error::{HermesError, Result};
    use crate::providers::WordPieceTokenizer;
    use crate::session::Role;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Folds everything but the last message into a one-word summary.
    struct KeepLast {
        calls: AtomicUsize,
    }

    impl KeepLast {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Summarizer for KeepLast {
        async fn summarize(
            &self,
            messages: Vec<Message>,
            _token_limit: usize,
            _tokenizer: &dyn Tokenizer,
        ) -> Result<Vec<Message>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(summarize_messages(messages, 1, "s"))
        }
    }

    struct Failing;

    #[async_trait]
    impl Summarizer for Failing {
        async fn summarize(
            &self,
            _messages: Vec<Message>,
            _token_limit: usize,
            _tokenizer: &dyn Tokenizer,
        ) -> Result<Vec<Message>> {
            Err(HermesError::Provider("summary backend down".into()))
        }
    }

    /// Produces a summary larger than what it replaces.
    struct Verbose;

    #[async_trait]
    impl Summarizer for Verbose {
        async fn summarize(
            &self,
            messages: Vec<Message>,
            _token_limit: usize,
            _tokenizer: &dyn Tokenizer,
        ) -> Result<Vec<Message>> {
            let long = "word ".repeat(500);
            Ok(summarize_messages(messages, 1, &long))
        }
    }

    fn history(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(&format!("question number {} about the market", i))
                } else {
                    Message::assistant(&format!("answer number {} with some detail", i))
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn test_under_budget_skips_summarizer() {
        let tok = WordPieceTokenizer::default();
        let summarizer = KeepLast::new();
        let mut memory = MemoryBuffer::new();
        memory.replace_from(&history(2));
        assert!(!memory.ensure_budget(10_000, &tok, &summarizer).await);
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_over_budget_summary_shrinks() {
        let tok = WordPieceTokenizer::default();
        let summarizer = KeepLast::new();
        let mut memory = MemoryBuffer::new();
        let input = history(8);
        memory.replace_from(&input);
        let before = memory.estimated_tokens(&tok);

        assert!(memory.ensure_budget(10, &tok, &summarizer).await);
        assert!(memory.estimated_tokens(&tok) <= before);
        assert!(memory.len() <= input.len());
        assert!(memory.messages()[0].is_summary());
        assert_eq!(memory.messages().last(), input.last());
    }

    #[tokio::test]
    async fn test_failed_summary_keeps_original() {
        let tok = WordPieceTokenizer::default();
        let mut memory = MemoryBuffer::new();
        let input = history(6);
        memory.replace_from(&input);
        assert!(!memory.ensure_budget(1, &tok, &Failing).await);
        assert_eq!(memory.snapshot(), input);

        memory.trim_to_max_turns(2);
        assert_eq!(memory.len(), 2);
    }

    #[tokio::test]
    async fn test_growing_summary_is_rejected() {
        let tok = WordPieceTokenizer::default();
        let mut memory = MemoryBuffer::new();
        let input = history(3);
        memory.replace_from(&input);
        assert!(!memory.ensure_budget(1, &tok, &Verbose).await);
        assert_eq!(memory.snapshot(), input);
    }

    /// Keeps everything and appends a fresh summary at the end.
    struct TrailingSummary;

    #[async_trait]
    impl Summarizer for TrailingSummary {
        async fn summarize(
            &self,
            messages: Vec<Message>,
            _token_limit: usize,
            _tokenizer: &dyn Tokenizer,
        ) -> Result<Vec<Message>> {
            let mut out: Vec<Message> = messages.into_iter().skip(2).collect();
            out.push(Message::summary("s"));
            Ok(out)
        }
    }

    #[tokio::test]
    async fn test_misplaced_summary_is_rejected() {
        let tok = WordPieceTokenizer::default();
        let mut memory = MemoryBuffer::new();
        let input = history(6);
        memory.replace_from(&input);
        assert!(!memory.ensure_budget(1, &tok, &TrailingSummary).await);
        assert_eq!(memory.snapshot(), input);
    }

    #[test]
    fn test_replace_from_merges_inner_summaries() {
        let mut memory = MemoryBuffer::new();
        memory.replace_from(&[
            Message::user("long question"),
            Message::assistant("long answer"),
            Message::summary("[Conversation Summary]\ns1"),
            Message::user("hi"),
        ]);

        let roles: Vec<Role> = memory.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Summary, Role::User, Role::Assistant, Role::User]);
        assert_eq!(memory.messages()[0].content, "[Conversation Summary]\ns1");
    }

    #[tokio::test]
    async fn test_earlier_summary_is_folded() {
        let tok = WordPieceTokenizer::default();
        let summarizer = KeepLast::new();
        let mut memory = MemoryBuffer::new();
        let mut input = history(4);
        input.insert(0, Message::summary("[Conversation Summary]\nearlier"));
        memory.replace_from(&input);

        assert!(memory.ensure_budget(1, &tok, &summarizer).await);
        let summaries = memory.messages().iter().filter(|m| m.is_summary()).count();
        assert_eq!(summaries, 1);
        assert!(memory.messages()[0].is_summary());
    }

    #[test]
    fn test_trim_law() {
        let input = history(5);
        for n in 0..8 {
            let mut memory = MemoryBuffer::new();
            memory.replace_from(&input);
            memory.trim_to_max_turns(n);
            assert_eq!(memory.len(), n.min(input.len()));
            assert_eq!(memory.messages(), &input[input.len() - memory.len()..]);
        }
    }

    #[test]
    fn test_replace_from_is_wholesale() {
        let mut memory = MemoryBuffer::new();
        memory.replace_from(&history(4));
        memory.replace_from(&history(1));
        assert_eq!(memory.len(), 1);
        memory.clear();
        assert!(memory.is_empty());
    }
}
