//! UTF-8 safe string helpers.
//!
//! Char-based previews (never slicing by byte index, which can panic on
//! multibyte characters) and the block indentation used by rendered prompts.

/// Return the first `n` characters of `s` as a `String` (no ellipsis).
pub fn prefix_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Return the last `n` characters of `s` as a `String`.
pub fn suffix_chars(s: &str, n: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(n)).collect()
}

/// Return a preview of `s` up to `n` characters. If `s` is longer than `n`
/// characters, the returned string will include a trailing ellipsis `...`.
pub fn preview(s: &str, n: usize) -> String {
    let mut prefix = prefix_chars(s, n);
    if s.chars().count() > n {
        prefix.push_str("...");
    }
    prefix
}

/// Re-indent every line of `text` to exactly `spaces` leading spaces.
///
/// Existing leading whitespace is stripped first, so templates written with
/// arbitrary source indentation render uniformly. Blank lines become
/// `spaces` spaces.
///
/// # Example
/// ```
/// use hermes::utils::string::indent_block;
///
/// assert_eq!(indent_block("a\n\t  b", 2), "  a\n  b");
/// ```
pub fn indent_block(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.split('\n')
        .map(|line| format!("{}{}", pad, line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_basic_ascii() {
        let s = "hello world";
        assert_eq!(preview(s, 5), "hello...");
        assert_eq!(preview(s, 20), "hello world");
    }

    #[test]
    fn preview_multibyte_characters() {
        let s = "cotação do dólar";
        assert_eq!(preview(s, 7), "cotação...");
    }

    #[test]
    fn suffix_chars_basic() {
        assert_eq!(suffix_chars("abcdef", 4), "cdef");
        assert_eq!(suffix_chars("ab", 4), "ab");
        assert_eq!(suffix_chars("ação", 2), "ão");
    }

    #[test]
    fn indent_block_normalizes_indentation() {
        let text = "\n        # Title\n    body\nlast";
        assert_eq!(indent_block(text, 4), "    \n    # Title\n    body\n    last");
    }

    #[test]
    fn indent_block_zero_spaces() {
        assert_eq!(indent_block("   x\n y", 0), "x\ny");
    }
}
