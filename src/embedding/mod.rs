//! Embedding gateway contract (spec.md §4.2).
//!
//! Opaque, all-or-nothing: `embed` either returns one vector per input
//! string, in order, or fails with [`crate::error::EmbeddingError`]. The
//! pair solver never inspects the vectors' provenance.

pub mod ollama;

use async_trait::async_trait;

use crate::error::EmbeddingError;

#[async_trait]
pub trait EmbeddingGateway: Send + Sync {
    /// Embed each input string, preserving order. All-or-nothing: a failure
    /// on any single input aborts the whole batch.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbeddingError>;
}

/// Truncate `text` to at most `max_chars` Unicode code points (not bytes),
/// per spec.md §4.2.
pub fn truncate_chars(text: &str, max_chars: Option<usize>) -> String {
    match max_chars {
        Some(limit) => text.chars().take(limit).collect(),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_code_points_not_bytes() {
        // "é" as a single precomposed code point is 2 bytes in UTF-8.
        let text = "éééé";
        assert_eq!(truncate_chars(text, Some(2)), "éé");
        assert_eq!(truncate_chars(text, None), text);
    }
}
