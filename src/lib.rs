// Copyright 2024 Sebastian Dobe <sebastiandobe@mailbox.org>

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

use std::env;

/// Upload / delete client, your main entrypoint
pub use crate::client::S3Client;
/// Client configuration and its validated form
pub use crate::config::{ClientConfig, ParsingFunction, ProgressFn, ValidatedConfig};
/// S3 Credentials
pub use crate::credentials::{AccessKeyId, AccessKeySecret, Credentials};
/// Specialized S3 Error type which wraps errors from different sources
pub use crate::error::{ErrorKind, S3Error};
/// The signed multipart form of an upload
pub use crate::form::SignedForm;
/// Object key derivation
pub use crate::key::{default_sanitize, resolve_key, IdGenerator, UuidGenerator};
/// POST policy document and signing dates
pub use crate::policy::{build_policy, Condition, PolicyDocument, SigningContext};
/// SigV4 key derivation and policy signing
pub use crate::signature::{sign_policy, signing_key, uri_encode};
/// Pluggable HTTP transport
pub use crate::transport::{
    Payload, ReqwestTransport, Transport, TransportRequest, TransportResponse,
};
/// Specialized Request / Response objects
pub use crate::types::{DeleteResult, UploadFile, UploadResult};

mod client;
mod config;
mod constants;
mod credentials;
mod error;
mod form;
mod key;
mod policy;
mod signature;
mod transport;
mod types;

pub mod prelude;

/// S3 Region Wrapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region(pub String);

impl Region {
    pub fn new<S>(region: S) -> Self
    where
        S: Into<String>,
    {
        Self(region.into())
    }

    pub fn try_from_env() -> Result<Self, S3Error> {
        Ok(Self(env::var("S3_REGION")?))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
