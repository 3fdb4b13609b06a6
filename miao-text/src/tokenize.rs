//! Text normalization and tokenization for knowledge matching.
//!
//! Both functions are pure and work on any script. Normalization folds case,
//! drops everything that is not a letter, digit or whitespace (so CJK
//! punctuation such as `？` and `，` disappears along with ASCII punctuation),
//! and collapses whitespace.
//!
//! Tokenization picks one of two paths depending on the normalized text:
//!
//! *   **Word path**: the text contains whitespace, so it is split into words.
//!     This covers Latin-alphabet languages and mixed input.
//! *   **Bigram path**: the text has no whitespace at all, which is typical of
//!     unsegmented scripts such as Chinese. Every overlapping two-character
//!     window becomes a token.
//!
//! ```
//! use miao_text::{normalize, tokenize};
//!
//! assert_eq!(normalize("  Hello,   World! "), "hello world");
//! assert_eq!(normalize("什么是人工智能？"), "什么是人工智能");
//!
//! assert_eq!(tokenize("Hello, World!"), vec!["hello", "world"]);
//! assert_eq!(tokenize("人工智能"), vec!["人工", "工智", "智能"]);
//! ```
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Anything that is not a Unicode letter, digit or whitespace.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").expect("punctuation pattern is valid"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Normalizes text for comparison.
///
/// Lowercases with Unicode case folding, removes every character that is not a
/// letter, digit or whitespace, then collapses whitespace runs into a single
/// space and trims both ends. Punctuation is removed before whitespace is
/// collapsed, which keeps the function idempotent (`"a - b"` becomes `"a b"`,
/// not `"a  b"`).
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Splits text into comparable tokens.
///
/// The input is normalized first. Normalized text containing a space is split
/// into words; otherwise it is broken into overlapping character bigrams. A
/// single remaining character is returned as its own token, and empty input
/// yields no tokens.
///
/// Duplicates are preserved here; use [`token_set`] for set semantics.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return Vec::new();
    }

    if normalized.chars().any(char::is_whitespace) {
        return normalized
            .split_whitespace()
            .map(str::to_string)
            .collect();
    }

    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() <= 1 {
        return chars.iter().map(|c| c.to_string()).collect();
    }

    chars
        .windows(2)
        .map(|pair| pair.iter().collect::<String>())
        .collect()
}

/// Tokenizes text and collapses duplicate tokens.
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}
