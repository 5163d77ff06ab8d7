//! Document sources: resolve an identifier to document text.
//!
//! - `FsDocumentSource`: identifiers are file paths
//! - `MemoryDocumentSource`: in-memory map, for tests

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::{SourceError, SourceResult};

/// Resolves document identifiers. One bounded attempt per call.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn resolve(&self, document: &str) -> SourceResult<String>;
}

// ---------------------------------------------------------------------------
// FsDocumentSource
// ---------------------------------------------------------------------------

/// Reads UTF-8 files, optionally relative to a root directory.
#[derive(Debug, Clone, Default)]
pub struct FsDocumentSource {
    root: Option<PathBuf>,
}

impl FsDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn path_for(&self, document: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(document),
            None => PathBuf::from(document),
        }
    }
}

#[async_trait]
impl DocumentSource for FsDocumentSource {
    async fn resolve(&self, document: &str) -> SourceResult<String> {
        let path = self.path_for(document);

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => SourceError::NotFound {
                document: document.to_string(),
            },
            _ => SourceError::Read {
                document: document.to_string(),
                reason: e.to_string(),
            },
        })?;
        if !metadata.is_file() {
            return Err(SourceError::NotFound {
                document: document.to_string(),
            });
        }

        let bytes = tokio::fs::read(&path).await.map_err(|e| SourceError::Read {
            document: document.to_string(),
            reason: e.to_string(),
        })?;

        String::from_utf8(bytes).map_err(|e| SourceError::Decode {
            document: document.to_string(),
            reason: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// MemoryDocumentSource
// ---------------------------------------------------------------------------

/// In-memory document map. Unknown identifiers resolve to `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentSource {
    documents: HashMap<String, SourceResult<String>>,
}

impl MemoryDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, document: &str, text: impl Into<String>) -> Self {
        self.documents.insert(document.to_string(), Ok(text.into()));
        self
    }

    pub fn with_failure(mut self, document: &str, error: SourceError) -> Self {
        self.documents.insert(document.to_string(), Err(error));
        self
    }
}

#[async_trait]
impl DocumentSource for MemoryDocumentSource {
    async fn resolve(&self, document: &str) -> SourceResult<String> {
        self.documents
            .get(document)
            .cloned()
            .unwrap_or_else(|| {
                Err(SourceError::NotFound {
                    document: document.to_string(),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_source_reads_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("story.md"), "As a user…\n").unwrap();

        let source = FsDocumentSource::with_root(dir.path());
        assert_eq!(source.resolve("story.md").await.unwrap(), "As a user…\n");
    }

    #[tokio::test]
    async fn test_fs_source_missing_file_and_directory_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let source = FsDocumentSource::with_root(dir.path());

        assert!(matches!(
            source.resolve("nope.md").await,
            Err(SourceError::NotFound { .. })
        ));
        assert!(matches!(
            source.resolve("sub").await,
            Err(SourceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_fs_source_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.bin");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let source = FsDocumentSource::new();
        let result = source.resolve(path.to_str().unwrap()).await;
        assert!(matches!(result, Err(SourceError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_memory_source_scripts_results() {
        let source = MemoryDocumentSource::new()
            .with_document("a", "text")
            .with_failure(
                "b",
                SourceError::Read {
                    document: "b".to_string(),
                    reason: "locked".to_string(),
                },
            );

        assert_eq!(source.resolve("a").await.unwrap(), "text");
        assert!(matches!(
            source.resolve("b").await,
            Err(SourceError::Read { .. })
        ));
        assert!(matches!(
            source.resolve("c").await,
            Err(SourceError::NotFound { .. })
        ));
    }
}
