use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A file staged for upload: name plus raw content.
/// Consumed when the job is submitted; the controller keeps only `FileMeta`.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub name: String,
    pub bytes: Bytes,
}

impl FilePayload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn meta(&self) -> FileMeta {
        FileMeta {
            name: self.name.clone(),
            size_bytes: self.bytes.len() as u64,
        }
    }
}

/// Display-facing descriptor of a staged file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub size_bytes: u64,
}
