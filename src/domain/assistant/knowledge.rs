//! Static knowledge corpus and keyword-overlap retrieval.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chunks handed to the model when the question is about the app.
pub const DEFAULT_TOP_N: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    pub content: String,
}

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("failed to read knowledge corpus: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid knowledge entry on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only, ordered corpus loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    chunks: Vec<KnowledgeChunk>,
}

impl KnowledgeBase {
    pub fn new(chunks: Vec<KnowledgeChunk>) -> Self {
        Self { chunks }
    }

    /// One JSON object with a `content` field per line; blank lines skipped.
    pub fn from_jsonl(raw: &str) -> Result<Self, KnowledgeError> {
        let mut chunks = Vec::new();
        for (index, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let chunk = serde_json::from_str::<KnowledgeChunk>(line).map_err(|source| {
                KnowledgeError::Parse {
                    line: index + 1,
                    source,
                }
            })?;
            chunks.push(chunk);
        }
        Ok(Self { chunks })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Up to `top_n` chunks ranked by how many query tokens they contain.
    ///
    /// Tokens are the whitespace-separated words of the lower-cased query,
    /// repeats included, each tested as a substring of the lower-cased chunk.
    /// Chunks scoring zero are dropped; equal scores keep corpus order.
    pub fn retrieve(&self, query: &str, top_n: usize) -> Vec<&KnowledgeChunk> {
        let query = query.to_lowercase();
        let tokens: Vec<&str> = query.split_whitespace().collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &KnowledgeChunk)> = self
            .chunks
            .iter()
            .map(|chunk| {
                let content = chunk.content.to_lowercase();
                let score = tokens.iter().filter(|t| content.contains(*t)).count();
                (score, chunk)
            })
            .filter(|(score, _)| *score > 0)
            .collect();

        // stable: ties stay in corpus order
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(top_n).map(|(_, c)| c).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn corpus(items: &[&str]) -> KnowledgeBase {
        KnowledgeBase::new(
            items
                .iter()
                .map(|c| KnowledgeChunk {
                    content: c.to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn parses_jsonl_skipping_blank_lines() {
        let raw = "{\"content\": \"ServiBid connects customers with providers.\"}\n\n  \n{\"content\": \"Payments are in AED.\"}\n";
        let kb = KnowledgeBase::from_jsonl(raw).unwrap();
        assert_eq!(kb.len(), 2);
    }

    #[test]
    fn reports_bad_line_number() {
        let raw = "{\"content\": \"ok\"}\nnot json\n";
        match KnowledgeBase::from_jsonl(raw) {
            Err(KnowledgeError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other.map(|k| k.len())),
        }
    }

    #[test]
    fn ranks_by_overlap_and_drops_zero() {
        let kb = corpus(&[
            "Providers place bids on open requests.",
            "Customers pay providers after the job is done.",
            "The weather is nice.",
            "Customers can accept bids from providers.",
        ]);
        let hits = kb.retrieve("how do customers accept bids", 3);
        assert_eq!(hits[0].content, "Customers can accept bids from providers.");
        assert!(hits.iter().all(|c| c.content != "The weather is nice."));
    }

    #[test]
    fn ties_keep_corpus_order_and_cap_at_top_n() {
        let kb = corpus(&["bid one", "bid two", "bid three", "bid four"]);
        let hits: Vec<&str> = kb.retrieve("bid", 3).iter().map(|c| c.content.as_str()).collect();
        assert_eq!(hits, vec!["bid one", "bid two", "bid three"]);
    }

    #[test]
    fn repeated_tokens_count_each_time() {
        let kb = corpus(&["payment refund", "refund refund policy"]);
        // "payment" matches only the first; "refund refund" adds 2 to both
        let hits = kb.retrieve("refund refund payment", 2);
        assert_eq!(hits[0].content, "payment refund");
    }

    #[test]
    fn empty_query_or_corpus_returns_nothing() {
        assert!(corpus(&["anything"]).retrieve("   ", 3).is_empty());
        assert!(KnowledgeBase::default().retrieve("bids", 3).is_empty());
    }

    proptest! {
        #[test]
        fn retrieval_is_deterministic(query in "[a-z ]{0,40}") {
            let kb = corpus(&[
                "servibid lets customers post requests",
                "providers bid on requests",
                "ratings are out of five",
            ]);
            let first: Vec<String> = kb.retrieve(&query, 3).iter().map(|c| c.content.clone()).collect();
            let second: Vec<String> = kb.retrieve(&query, 3).iter().map(|c| c.content.clone()).collect();
            prop_assert_eq!(first.clone(), second);
            prop_assert!(first.len() <= 3);
        }
    }
}
