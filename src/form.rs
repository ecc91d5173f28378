use crate::config::ValidatedConfig;
use crate::constants::{ACL, ALGORITHM, META_TAG, META_UUID, SERVER_SIDE_ENCRYPTION};
use crate::policy::SigningContext;
use crate::types::UploadFile;

/// The multipart fields of a signed POST policy upload.
///
/// `fields` are sent in order, followed by the `file` part as the last field, which S3
/// requires.
#[derive(Debug, Clone)]
pub struct SignedForm {
    pub fields: Vec<(&'static str, String)>,
    pub file: UploadFile,
}

impl SignedForm {
    pub fn new(
        config: &ValidatedConfig,
        ctx: &SigningContext,
        policy: String,
        signature: String,
        key: String,
        file: UploadFile,
    ) -> Self {
        let credential = config
            .credentials
            .scope(&ctx.date_stamp, config.region.as_str());

        let fields = vec![
            ("key", key),
            ("acl", ACL.to_string()),
            ("content-type", file.content_type.clone()),
            ("x-amz-meta-uuid", META_UUID.to_string()),
            ("x-amz-server-side-encryption", SERVER_SIDE_ENCRYPTION.to_string()),
            ("x-amz-credential", credential),
            ("x-amz-algorithm", ALGORITHM.to_string()),
            ("x-amz-date", ctx.amz_date_stamp.clone()),
            ("x-amz-meta-tag", META_TAG.to_string()),
            ("policy", policy),
            ("x-amz-signature", signature),
        ];

        Self { fields, file }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The object key this form uploads to
    pub fn key(&self) -> &str {
        self.field("key").unwrap_or_default()
    }
}
