//! Reads the JSON Lines knowledge corpus from disk at startup.

use std::path::Path;
use tokio::fs;

use crate::domain::assistant::{KnowledgeBase, KnowledgeError};

/// Load the corpus at `path`, or an empty corpus when no path is configured.
///
/// A configured path that cannot be read or parsed is an error; the server
/// refuses to start rather than answer app questions without context.
pub async fn load_knowledge_base(path: Option<&Path>) -> Result<KnowledgeBase, KnowledgeError> {
    let Some(path) = path else {
        tracing::info!("No knowledge corpus configured; app questions get no context");
        return Ok(KnowledgeBase::default());
    };

    let raw = fs::read_to_string(path).await?;
    let knowledge = KnowledgeBase::from_jsonl(&raw)?;
    tracing::info!(
        path = %path.display(),
        chunks = knowledge.len(),
        "Knowledge corpus loaded"
    );
    Ok(knowledge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn missing_path_gives_empty_corpus() {
        let kb = load_knowledge_base(None).await.unwrap();
        assert!(kb.is_empty());
    }

    #[tokio::test]
    async fn loads_chunks_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"content": "Customers post requests and providers bid."}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"content": "Payments are released when the job is done."}}"#).unwrap();

        let kb = load_knowledge_base(Some(file.path())).await.unwrap();
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.retrieve("payments", 3).len(), 1);
    }

    #[tokio::test]
    async fn unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_knowledge_base(Some(&dir.path().join("missing.jsonl"))).await;
        assert!(matches!(result, Err(KnowledgeError::Io(_))));
    }

    #[tokio::test]
    async fn malformed_line_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{\"content\": \"fine\"}}\n{{broken").unwrap();

        let result = load_knowledge_base(Some(file.path())).await;
        assert!(matches!(result, Err(KnowledgeError::Parse { line: 2, .. })));
    }
}
