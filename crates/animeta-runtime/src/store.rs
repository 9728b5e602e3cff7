use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use animeta_core::error::AnimetaError;
use animeta_core::file_spec::{CatalogSerializer, FormatSerializer, LocalFileSpec};

/// Cached catalog files under the host's data directory.
#[derive(Debug, Clone)]
pub struct FileStore<Z = CatalogSerializer> {
    root: PathBuf,
    serializer: Z,
}

impl FileStore<CatalogSerializer> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_serializer(root, CatalogSerializer)
    }
}

impl<Z: FormatSerializer> FileStore<Z> {
    pub fn with_serializer(root: impl Into<PathBuf>, serializer: Z) -> Self {
        Self {
            root: root.into(),
            serializer,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for<S: LocalFileSpec>(&self, spec: &S) -> PathBuf {
        self.root.join(spec.relative_path())
    }

    /// The file's bytes, or `None` when it hasn't been cached yet.
    pub async fn read_raw<S: LocalFileSpec>(
        &self,
        spec: &S,
    ) -> Result<Option<Vec<u8>>, AnimetaError> {
        match tokio::fs::read(self.path_for(spec)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn write_raw<S: LocalFileSpec>(
        &self,
        spec: &S,
        bytes: &[u8],
    ) -> Result<(), AnimetaError> {
        let path = self.path_for(spec);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote cache file");
        Ok(())
    }

    pub async fn load<S: LocalFileSpec>(&self, spec: &S) -> Result<Option<S::Item>, AnimetaError> {
        let Some(bytes) = self.read_raw(spec).await? else {
            return Ok(None);
        };
        let item = self
            .serializer
            .deserialize(spec.format(), &bytes, &self.path_for(spec))?;
        Ok(Some(item))
    }

    pub async fn save<S: LocalFileSpec>(&self, spec: &S, item: &S::Item) -> Result<(), AnimetaError> {
        let bytes = self
            .serializer
            .serialize(spec.format(), item, &self.path_for(spec))?;
        self.write_raw(spec, &bytes).await
    }
}
