use crate::config::{ClientConfig, ValidatedConfig};
use crate::error::S3Error;
use crate::form::SignedForm;
use crate::key::{object_path, resolve_key, IdGenerator, UuidGenerator};
use crate::transport::{Payload, ReqwestTransport, Transport, TransportRequest, TransportResponse};
use crate::types::{DeleteResult, ErrorResponse, UploadFile, UploadResult};
use crate::{policy, signature};
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};
use time::OffsetDateTime;
use tracing::{debug, error};

/// Uploads and deletes objects with client side signed POST policies.
pub struct S3Client {
    config: ClientConfig,
    validated: OnceLock<ValidatedConfig>,
    transport: Arc<dyn Transport>,
    ids: Arc<dyn IdGenerator>,
}

impl Debug for S3Client {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl S3Client {
    /// The config is validated lazily at the start of each operation, so an invalid config
    /// surfaces as the error of the first call.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            validated: OnceLock::new(),
            transport: Arc::new(ReqwestTransport::new()),
            ids: Arc::new(UuidGenerator),
        }
    }

    pub fn try_from_env() -> Result<Self, S3Error> {
        Ok(Self::new(ClientConfig::try_from_env()?))
    }

    pub fn with_transport<T: Transport + 'static>(mut self, transport: Arc<T>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_id_generator<G: IdGenerator + 'static>(mut self, ids: G) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// The validated config, computed once and cached for the lifetime of the client
    pub fn config(&self) -> Result<&ValidatedConfig, S3Error> {
        if let Some(validated) = self.validated.get() {
            return Ok(validated);
        }
        let validated = self.config.validate()?;
        Ok(self.validated.get_or_init(|| validated))
    }

    /// Builds the signed form for an upload without sending it, e.g. to hand the fields
    /// to a browser.
    pub fn signed_form(
        &self,
        file: UploadFile,
        key: Option<&str>,
        dir_name: Option<&str>,
    ) -> Result<SignedForm, S3Error> {
        self.signed_form_at(file, key, dir_name, OffsetDateTime::now_utc())
    }

    pub fn signed_form_at(
        &self,
        file: UploadFile,
        key: Option<&str>,
        dir_name: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<SignedForm, S3Error> {
        let config = self.config()?;
        check_payload(&file, key, dir_name)?;

        let (policy, ctx) = policy::build_policy(config, now)?;
        let policy = policy.encode()?;
        let signature = signature::sign_policy(
            &config.credentials.access_key_secret,
            &config.region,
            &ctx.date_stamp,
            &policy,
        )?;

        let key = resolve_key(&file, key, config, self.ids.as_ref())?;
        let path = object_path(dir_name, &key);

        Ok(SignedForm::new(config, &ctx, policy, signature, path, file))
    }

    /// Uploads a file via a signed POST policy.
    ///
    /// Resolves for HTTP 200 - 207, anything else is returned as [`S3Error::Transport`].
    #[tracing::instrument(level = "debug", skip_all, fields(key = key, dir_name = dir_name))]
    pub async fn upload_file(
        &self,
        file: UploadFile,
        key: Option<&str>,
        dir_name: Option<&str>,
    ) -> Result<UploadResult, S3Error> {
        self.upload_file_at(file, key, dir_name, OffsetDateTime::now_utc())
            .await
    }

    pub async fn upload_file_at(
        &self,
        file: UploadFile,
        key: Option<&str>,
        dir_name: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<UploadResult, S3Error> {
        let form = self.signed_form_at(file, key, dir_name, now)?;
        let config = self.config()?;
        let path = form.key().to_string();
        debug!(
            "uploading {} bytes to bucket {} as {}",
            form.file.len(),
            config.bucket_name,
            path
        );

        let res = self
            .transport
            .send(TransportRequest {
                uri: config.base_url.clone(),
                method: http::Method::POST,
                payload: Payload::Form(form),
                on_progress: config.on_upload_progress.clone(),
            })
            .await?;

        if !(200..=207).contains(&res.status) {
            error!("upload of {} failed with HTTP {}", path, res.status);
            return Err(transport_error(res));
        }

        Ok(UploadResult {
            bucket: config.bucket_name.clone(),
            location: format!("{}/{}", config.base_url, path),
            key: path,
            status: res.status,
        })
    }

    /// Deletes an object.
    ///
    /// Resolves with whatever status the store answered, classifying it is left to the
    /// caller.
    #[tracing::instrument(level = "debug", skip_all, fields(key = key))]
    pub async fn delete_file(&self, key: &str) -> Result<DeleteResult, S3Error> {
        let config = self.config()?;
        if key.trim().is_empty() {
            return Err(S3Error::Validation(
                "'key' must be a nonempty string".to_string(),
            ));
        }

        let res = self
            .transport
            .send(TransportRequest {
                uri: format!("{}/{}", config.base_url, signature::uri_encode(key)),
                method: http::Method::DELETE,
                payload: Payload::Empty,
                on_progress: None,
            })
            .await?;
        debug!("delete of {} answered with HTTP {}", key, res.status);

        Ok(DeleteResult {
            key: key.to_string(),
            status: res.status,
            message: res.body,
        })
    }
}

fn check_payload(
    file: &UploadFile,
    key: Option<&str>,
    dir_name: Option<&str>,
) -> Result<(), S3Error> {
    if file.content_type.trim().is_empty() {
        return Err(S3Error::Validation(
            "A file with a content type must be provided".to_string(),
        ));
    }
    if key.is_some_and(|key| key.trim().is_empty()) {
        return Err(S3Error::Validation(
            "If included, the 'key' argument must be a nonempty string".to_string(),
        ));
    }
    if dir_name.is_some_and(|dir| dir.trim().is_empty()) {
        return Err(S3Error::Validation(
            "If included, the 'dirName' argument must be a nonempty string".to_string(),
        ));
    }
    Ok(())
}

fn transport_error(res: TransportResponse) -> S3Error {
    let code = ErrorResponse::parse(&res.body).map(|err| err.code);
    S3Error::Transport {
        status: res.status,
        status_text: res.status_text,
        message: res.body,
        code,
    }
}
