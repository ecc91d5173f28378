use crate::error::S3Error;
use bytes::Bytes;
use serde::Deserialize;
use std::path::Path;

/// The file to upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// File name as it is sent in the form part
    pub name: String,
    /// MIME type, e.g. `image/png`
    pub content_type: String,
    pub content: Bytes,
}

impl UploadFile {
    pub fn new<N, C, B>(name: N, content_type: C, content: B) -> Self
    where
        N: Into<String>,
        C: Into<String>,
        B: Into<Bytes>,
    {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            content: content.into(),
        }
    }

    /// Reads a local file into memory. The MIME type is not guessed and must be given.
    pub async fn from_path<P, C>(path: P, content_type: C) -> Result<Self, S3Error>
    where
        P: AsRef<Path>,
        C: Into<String>,
    {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::new(name, content_type, content))
    }

    /// The part of the MIME type after the `/`, used as file extension
    pub fn mime_subtype(&self) -> Option<&str> {
        self.content_type.split('/').nth(1)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub bucket: String,
    /// The full object path including an optional directory
    pub key: String,
    pub location: String,
    pub status: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    pub key: String,
    pub status: u16,
    /// The raw response body
    pub message: String,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct ErrorResponse {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message")]
    #[allow(dead_code)]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn parse(body: &str) -> Option<Self> {
        quick_xml::de::from_str(body).ok()
    }
}
