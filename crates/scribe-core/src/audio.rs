//! Uploaded audio and its staged copy in the blob store.

use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ids::ObjectName;

/// Media type used when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An audio blob submitted by a caller. Lives for one request.
#[derive(Clone, Debug)]
pub struct AudioUpload {
    /// Raw file content.
    pub bytes: Bytes,
    /// Declared media type (e.g. `audio/mpeg`).
    pub content_type: String,
    /// Original file name, when the caller sent one.
    pub file_name: Option<String>,
}

impl AudioUpload {
    /// Build an upload, falling back to [`DEFAULT_CONTENT_TYPE`] for a blank
    /// media type.
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        let content_type = if content_type.trim().is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            content_type
        };
        Self {
            bytes: bytes.into(),
            content_type,
            file_name: None,
        }
    }

    /// Attach the original file name.
    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Size of the payload in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Extension used for the staged object name.
    pub fn extension(&self) -> &'static str {
        extension_for_content_type(&self.content_type)
    }
}

/// A durably stored copy of an upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    /// Bucket holding the object.
    pub bucket: String,
    /// Generated object name.
    pub name: ObjectName,
    /// Media type recorded as object metadata.
    pub content_type: String,
    /// Stored size in bytes.
    pub size: u64,
}

impl StoredObject {
    /// `gs://bucket/name` URI the speech API reads from.
    pub fn uri(&self) -> String {
        format!("gs://{}/{}", self.bucket, self.name)
    }
}

/// Map a media type to the extension used in object names.
///
/// Recognition is configured for MP3 by default, so anything unrecognised
/// keeps the `mp3` extension.
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => "wav",
        "audio/flac" | "audio/x-flac" => "flac",
        "audio/ogg" | "audio/opus" => "ogg",
        "audio/webm" => "webm",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" | "audio/aac" => "m4a",
        "audio/amr" => "amr",
        _ => "mp3",
    }
}

/// Guess a media type from a file path's extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" | "opus" => "audio/ogg",
        "webm" => "audio/webm",
        "m4a" | "mp4" | "aac" => "audio/mp4",
        "amr" => "audio/amr",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
