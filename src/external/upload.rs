use async_trait::async_trait;
use std::path::PathBuf;

/// An uploaded binary the assembler can read by name.
///
/// Uploaded images and attached model files both arrive through this
/// capability, so the assembler never touches the filesystem directly and
/// tests can hand it in-memory or deliberately failing files.
#[async_trait]
pub trait ReadableBinary: Send + Sync {
    /// Original file name, extension included.
    fn name(&self) -> &str;

    async fn read_bytes(&self) -> std::io::Result<Vec<u8>>;
}

/// A file on local disk, named by its final path component.
pub struct FsUpload {
    path: PathBuf,
    name: String,
}

impl FsUpload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }
}

#[async_trait]
impl ReadableBinary for FsUpload {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

/// An already-buffered upload. Used by tests and by embedders that receive
/// bytes over the wire instead of a path.
pub struct MemoryUpload {
    name: String,
    bytes: Vec<u8>,
}

impl MemoryUpload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }
}

#[async_trait]
impl ReadableBinary for MemoryUpload {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}
