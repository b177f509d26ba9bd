//! Content handlers: turn a matched file into a [`Content`] value.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::content::{Content, FileMetadata};
use crate::{Error, Result};

/// Capability that loads one file.
///
/// Handlers are stateless and may be invoked concurrently for independent
/// files. The only suspension point is the underlying read.
#[async_trait]
pub trait ContentHandler: Send + Sync {
    /// Load `path`, whose stat result is `metadata`.
    async fn load(&self, path: &Path, metadata: &FileMetadata) -> Result<Content>;

    /// Short name used in logs and configuration.
    fn name(&self) -> &str {
        "custom"
    }
}

/// Async closures taking the owned path and metadata are handlers too.
#[async_trait]
impl<F, Fut> ContentHandler for F
where
    F: Fn(PathBuf, FileMetadata) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Content>> + Send + 'static,
{
    async fn load(&self, path: &Path, metadata: &FileMetadata) -> Result<Content> {
        self(path.to_path_buf(), metadata.clone()).await
    }
}

/// Reads the whole file as bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBytesHandler;

#[async_trait]
impl ContentHandler for RawBytesHandler {
    async fn load(&self, path: &Path, _metadata: &FileMetadata) -> Result<Content> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        Ok(Content::Bytes(bytes))
    }

    fn name(&self) -> &str {
        "raw"
    }
}

/// Reads the whole file as UTF-8 text.
///
/// Invalid UTF-8 surfaces as an [`Error::Io`] with kind `InvalidData`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawTextHandler;

#[async_trait]
impl ContentHandler for RawTextHandler {
    async fn load(&self, path: &Path, _metadata: &FileMetadata) -> Result<Content> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        Ok(Content::Text(text))
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// Reads the whole file and parses it as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonHandler;

#[async_trait]
impl ContentHandler for JsonHandler {
    async fn load(&self, path: &Path, _metadata: &FileMetadata) -> Result<Content> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        let value = serde_json::from_slice(&bytes).map_err(|e| Error::parse(path, e))?;
        Ok(Content::Json(value))
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// Returns the file's metadata without reading it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataHandler;

#[async_trait]
impl ContentHandler for MetadataHandler {
    async fn load(&self, _path: &Path, metadata: &FileMetadata) -> Result<Content> {
        Ok(Content::Metadata(metadata.clone()))
    }

    fn name(&self) -> &str {
        "metadata"
    }
}

/// Names accepted by [`by_name`].
pub const HANDLER_NAMES: &[&str] = &["json", "text", "raw", "metadata"];

/// Look up a built-in handler by its short name.
#[must_use]
pub fn by_name(name: &str) -> Option<Arc<dyn ContentHandler>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Arc::new(JsonHandler)),
        "text" | "utf8" => Some(Arc::new(RawTextHandler)),
        "raw" | "bytes" => Some(Arc::new(RawBytesHandler)),
        "metadata" | "stat" => Some(Arc::new(MetadataHandler)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn meta_of(path: &Path) -> FileMetadata {
        FileMetadata::from(&fs::metadata(path).unwrap())
    }

    #[tokio::test]
    async fn test_raw_bytes_handler() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blob.bin");
        fs::write(&path, [0u8, 159, 146, 150]).unwrap();

        let content = RawBytesHandler.load(&path, &meta_of(&path)).await.unwrap();
        assert_eq!(content.as_bytes(), Some(&[0u8, 159, 146, 150][..]));
    }

    #[tokio::test]
    async fn test_raw_text_handler() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        fs::write(&path, "héllo").unwrap();

        let content = RawTextHandler.load(&path, &meta_of(&path)).await.unwrap();
        assert_eq!(content.as_text(), Some("héllo"));
    }

    #[tokio::test]
    async fn test_raw_text_handler_rejects_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.txt");
        fs::write(&path, [0xffu8, 0xfe]).unwrap();

        let err = RawTextHandler
            .load(&path, &meta_of(&path))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.path(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_json_handler() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("doc.json");
        fs::write(&path, r#"{"test": 1, "list": [1, 2]}"#).unwrap();

        let content = JsonHandler.load(&path, &meta_of(&path)).await.unwrap();
        let value = content.as_json().unwrap();
        assert_eq!(value["test"], 1);
        assert_eq!(value["list"], serde_json::json!([1, 2]));
    }

    #[tokio::test]
    async fn test_json_handler_parse_error_names_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{ nope").unwrap();

        let err = JsonHandler.load(&path, &meta_of(&path)).await.unwrap_err();
        match err {
            Error::Parse { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gone.json");
        let meta = FileMetadata {
            size: 0,
            mode: 0,
            modified: None,
            readonly: false,
        };

        let err = JsonHandler.load(&path, &meta).await.unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[tokio::test]
    async fn test_metadata_handler_does_not_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("anything.zzz");
        fs::write(&path, "12345").unwrap();
        let meta = meta_of(&path);

        // Remove the file: the handler must answer from metadata alone.
        fs::remove_file(&path).unwrap();
        let content = MetadataHandler.load(&path, &meta).await.unwrap();
        assert_eq!(content.as_metadata().unwrap().size, 5);
    }

    #[tokio::test]
    async fn test_closure_handler() {
        let handler = |path: PathBuf, meta: FileMetadata| async move {
            Ok::<_, Error>(Content::Text(format!("{}:{}", path.display(), meta.size)))
        };
        let meta = FileMetadata {
            size: 7,
            mode: 0,
            modified: None,
            readonly: false,
        };

        let content = handler.load(Path::new("x"), &meta).await.unwrap();
        assert_eq!(content.as_text(), Some("x:7"));
        assert_eq!(handler.name(), "custom");
    }

    #[test]
    fn test_by_name() {
        for name in HANDLER_NAMES {
            assert_eq!(by_name(name).unwrap().name(), *name);
        }
        assert_eq!(by_name("JSON").unwrap().name(), "json");
        assert!(by_name("yaml").is_none());
    }
}
