use crate::config::ProgressFn;
use crate::error::S3Error;
use crate::form::SignedForm;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::env;
use std::fmt::{Debug, Formatter};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;
use url::Url;

static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Size of the file chunks handed to the HTTP client, one progress tick each
const PROGRESS_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug)]
pub enum Payload {
    Empty,
    Form(SignedForm),
}

pub struct TransportRequest {
    pub uri: String,
    pub method: http::Method,
    pub payload: Payload,
    pub on_progress: Option<ProgressFn>,
}

impl Debug for TransportRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportRequest")
            .field("uri", &self.uri)
            .field("method", &self.method)
            .field("payload", &self.payload)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

/// Sends a single request to the store. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, S3Error>;
}

/// Default [`Transport`] on top of `reqwest`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Option<reqwest::Client>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use your own `reqwest::Client` instead of the shared default one
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Some(client),
        }
    }

    fn client(&self) -> Result<&reqwest::Client, S3Error> {
        match &self.client {
            Some(client) => Ok(client),
            None => get_client(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, S3Error> {
        let url = Url::parse(&request.uri)?;
        let mut builder = self.client()?.request(request.method, url);

        if let Payload::Form(form) = request.payload {
            builder = builder.multipart(multipart_form(form, request.on_progress)?);
        }

        let res = builder.send().await?;
        let status = res.status();
        debug!("store answered with {}", status);

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: res.text().await?,
        })
    }
}

fn get_client<'a>() -> Result<&'a reqwest::Client, S3Error> {
    if let Some(client) = CLIENT.get() {
        return Ok(client);
    }

    let mut builder = reqwest::Client::builder()
        .brotli(true)
        .connect_timeout(Duration::from_secs(10))
        .tcp_keepalive(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(600));
    #[cfg(feature = "rustls-tls")]
    {
        builder = builder.use_rustls_tls();
    }
    if env::var("S3_DANGER_ALLOW_INSECURE").as_deref() == Ok("true") {
        builder = builder.danger_accept_invalid_certs(true);
    }
    let client = builder.build()?;

    Ok(CLIENT.get_or_init(|| client))
}

fn multipart_form(form: SignedForm, on_progress: Option<ProgressFn>) -> Result<Form, S3Error> {
    let mut multipart = Form::new();
    for (name, value) in form.fields {
        multipart = multipart.text(name, value);
    }

    let file = form.file;
    let total = file.content.len() as u64;
    let part = match on_progress {
        Some(on_progress) => Part::stream_with_length(
            Body::wrap_stream(progress_stream(file.content, on_progress)),
            total,
        ),
        None => Part::bytes(file.content.to_vec()),
    };
    let part = part.file_name(file.name).mime_str(&file.content_type)?;

    Ok(multipart.part("file", part))
}

/// Splits the content into chunks and reports `(loaded, total)` each time the HTTP client
/// pulls the next one.
fn progress_stream(
    content: Bytes,
    on_progress: ProgressFn,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let total = content.len() as u64;
    let chunks = (0..content.len())
        .step_by(PROGRESS_CHUNK_SIZE)
        .map(|start| content.slice(start..(start + PROGRESS_CHUNK_SIZE).min(content.len())))
        .collect::<Vec<Bytes>>();

    let mut loaded = 0u64;
    futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
        loaded += chunk.len() as u64;
        on_progress(loaded, total);
        Ok::<Bytes, std::io::Error>(chunk)
    }))
}
