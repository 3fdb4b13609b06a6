//! Passage chunking for free-text knowledge corpora.
//!
//! A corpus file (for example an exported FAQ or a plain-text manual) is split
//! into "passages" that an embedding model can score individually. The
//! chunker works on paragraphs: text is split on blank lines, each paragraph
//! is trimmed, and neighbouring paragraphs are merged while the merged passage
//! stays under a character budget. This keeps short paragraphs (headings,
//! one-line answers) together with their context without producing passages
//! that are too long for the model.
//!
//! # Key Features
//!
//! *   **Paragraph aware**: passages never split a paragraph in the middle.
//! *   **Greedy merging**: consecutive paragraphs are joined with a single
//!     newline while the combined character count stays below the limit.
//! *   **Oversized paragraphs**: a paragraph longer than the limit becomes a
//!     passage of its own rather than being cut.
//! *   **Character based**: limits count `char`s, not bytes, so CJK text gets
//!     the same budget as Latin text.
//!
//! # Usage
//!
//! ```
//! use miao_text::text::chunk_paragraphs;
//!
//! let corpus = "第一段。\n\n第二段。\n\n\n第三段。";
//! let passages = chunk_paragraphs(corpus, 300);
//!
//! assert_eq!(passages.len(), 1);
//! assert_eq!(passages[0].text, "第一段。\n第二段。\n第三段。");
//!
//! let passages = chunk_paragraphs(corpus, 9);
//! assert_eq!(passages.len(), 2);
//! assert_eq!(passages[1].sequence, 1);
//! ```
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Default passage budget in characters.
pub const DEFAULT_PASSAGE_CHARS: usize = 300;

/// Blank line, possibly containing other whitespace.
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph pattern is valid"));

/// A single passage extracted from a corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Passage {
    /// Position of this passage in the corpus (0-indexed).
    pub sequence: usize,
    /// The merged paragraph text.
    pub text: String,
}

impl Passage {
    /// Number of characters in the passage.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits `corpus` into paragraph-aligned passages of fewer than `max_chars`
/// characters (unless a single paragraph is already longer).
///
/// # Arguments
///
/// *   `corpus` - The full text to split.
/// *   `max_chars` - Passage budget in characters. Paragraphs are merged while
///     the sum of their lengths stays strictly below this value.
///
/// # Returns
///
/// Passages in corpus order. Empty or whitespace-only input returns an empty
/// vector.
pub fn chunk_paragraphs(corpus: &str, max_chars: usize) -> Vec<Passage> {
    let mut passages: Vec<Passage> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for paragraph in PARAGRAPH_BREAK.split(corpus) {
        let trimmed = paragraph.trim();
        if trimmed.is_empty() {
            continue;
        }
        let paragraph_chars = trimmed.chars().count();

        if current_chars + paragraph_chars < max_chars {
            // Extend the current passage
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(trimmed);
            current_chars += paragraph_chars;
        } else {
            if !current.is_empty() {
                passages.push(Passage {
                    sequence: passages.len(),
                    text: std::mem::take(&mut current),
                });
            }
            current.push_str(trimmed);
            current_chars = paragraph_chars;
        }
    }

    if !current.is_empty() {
        passages.push(Passage {
            sequence: passages.len(),
            text: current,
        });
    }

    passages
}
