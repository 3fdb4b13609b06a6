pub mod text;
pub mod tokenize;

// Re-export the scoring primitives for external use
pub use text::{DEFAULT_PASSAGE_CHARS, Passage, chunk_paragraphs};
pub use tokenize::{normalize, token_set, tokenize};
