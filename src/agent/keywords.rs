//! Keyword extraction and input decoration.
//!
//! Before a user turn reaches the model, its salient keywords are listed
//! below the original text to focus the model's attention. Extraction never
//! fails: a bad input yields no keywords.

use std::collections::HashMap;

use crate::utils::string::indent_block;

/// Maximum keywords attached to one input.
pub const MAX_KEYWORDS: usize = 10;

const MIN_WORD_CHARS: usize = 3;

const STOP_WORDS: &[&str] = &[
    // English
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "him", "his", "how", "its", "may", "new", "now", "old", "see",
    "two", "who", "did", "get", "let", "say", "she", "too", "use", "what", "when", "where",
    "which", "while", "with", "would", "could", "should", "this", "that", "these", "those",
    "there", "their", "them", "then", "than", "they", "from", "have", "into", "about", "your",
    "will", "just", "like", "some", "more", "most", "also", "been", "being", "does", "doing",
    "each", "other", "such", "only", "over", "very", "here", "why", "were", "because", "after",
    "before", "between", "both", "under", "again", "further", "once", "please", "tell", "give",
    // Portuguese
    "que", "não", "uma", "para", "com", "por", "mais", "como", "mas", "foi", "ele", "ela",
    "das", "dos", "tem", "seu", "sua", "ser", "quando", "muito", "nos", "já", "está", "eu",
    "também", "pelo", "pela", "até", "isso", "entre", "era", "depois", "sem", "mesmo", "aos",
    "ter", "seus", "suas", "quem", "nas", "esse", "essa", "eles", "elas", "você", "vocês",
    "qual", "quais", "onde", "sobre", "este", "esta", "isto", "aquele", "aquela", "minha",
    "meu", "nosso", "nossa", "ou", "num", "numa", "pelos", "pelas", "porque", "hoje", "agora",
];

/// Extracts focus keywords from a user input.
pub trait KeywordExtractor: Send + Sync {
    /// Ordered keywords, most relevant first. Returns an empty list rather
    /// than failing.
    fn extract(&self, text: &str) -> Vec<String>;
}

/// Frequency-ranked unigrams and bigrams with English and Portuguese stop
/// words removed.
///
/// # Example
/// ```
/// use hermes::agent::{FrequencyKeywordExtractor, KeywordExtractor};
///
/// let keywords = FrequencyKeywordExtractor::default()
///     .extract("What is the interest rate? The interest rate rose today.");
/// assert_eq!(keywords[0], "interest");
/// assert!(keywords.contains(&"interest rate".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct FrequencyKeywordExtractor {
    max_keywords: usize,
}

impl FrequencyKeywordExtractor {
    pub fn new(max_keywords: usize) -> Self {
        Self { max_keywords }
    }
}

impl Default for FrequencyKeywordExtractor {
    fn default() -> Self {
        Self::new(MAX_KEYWORDS)
    }
}

fn is_candidate(word: &str) -> bool {
    word.chars().count() >= MIN_WORD_CHARS
        && !STOP_WORDS.contains(&word)
        && !word.chars().all(|c| c.is_numeric())
}

impl KeywordExtractor for FrequencyKeywordExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        // keyword -> (count, first position)
        let mut scores: HashMap<String, (usize, usize)> = HashMap::new();
        let mut bump = |key: String, pos: usize| {
            scores.entry(key).or_insert((0, pos)).0 += 1;
        };

        for (pos, word) in words.iter().enumerate() {
            if !is_candidate(word) {
                continue;
            }
            bump((*word).to_string(), pos);
            if let Some(next) = words.get(pos + 1) {
                if is_candidate(next) {
                    bump(format!("{} {}", word, next), pos);
                }
            }
        }

        let mut ranked: Vec<(String, (usize, usize))> = scores.into_iter().collect();
        ranked.sort_by(|(a_key, (a_count, a_pos)), (b_key, (b_count, b_pos))| {
            b_count
                .cmp(a_count)
                .then(a_pos.cmp(b_pos))
                .then(a_key.len().cmp(&b_key.len()))
        });
        ranked
            .into_iter()
            .take(self.max_keywords)
            .map(|(key, _)| key)
            .collect()
    }
}

/// Decorate `input` with its keywords, indented four spaces per line.
///
/// # Example
/// ```
/// use hermes::agent::enhance_input;
///
/// let text = enhance_input("2+2?", &["math".to_string()]);
/// assert_eq!(
///     text,
///     "    # User Input (to be processed):\n    2+2?\n    \n    \
///      ## Extracted Keywords For User Input (to focus on):\n    math"
/// );
/// ```
pub fn enhance_input(input: &str, keywords: &[String]) -> String {
    let block = format!(
        "# User Input (to be processed):\n{}\n\n# Extracted Keywords For User Input (to focus on):\n{}",
        input.trim(),
        keywords.join(", ")
    );
    indent_block(&block, 4)
}
