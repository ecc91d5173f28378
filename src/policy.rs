use crate::config::ValidatedConfig;
use crate::constants::{
    ACL, ALGORITHM, ISO_8601_MILLIS, META_UUID, POLICY_VALIDITY, SERVER_SIDE_ENCRYPTION,
};
use crate::error::S3Error;
use base64::engine::general_purpose;
use base64::Engine;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use time::OffsetDateTime;

/// Dates derived once per call from the policy expiration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    /// `yyyy-mm-ddThh:mm:ss.sssZ`
    pub iso_date: String,
    /// `yyyymmdd`
    pub date_stamp: String,
    /// the ISO date without `-`, `:` and `.`, sent as `x-amz-date`
    pub amz_date_stamp: String,
}

impl SigningContext {
    pub fn new(now: OffsetDateTime) -> Result<Self, S3Error> {
        let expiration = now.to_offset(time::UtcOffset::UTC) + POLICY_VALIDITY;
        let iso_date = expiration.format(ISO_8601_MILLIS)?;
        let date_stamp = iso_date
            .split('T')
            .next()
            .unwrap_or_default()
            .replace('-', "");
        let amz_date_stamp = iso_date.replace(['-', ':', '.'], "");

        Ok(Self {
            iso_date,
            date_stamp,
            amz_date_stamp,
        })
    }
}

/// A single POST policy condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `{"<field>": "<value>"}`
    Eq(&'static str, String),
    /// `["starts-with", "$<field>", "<prefix>"]`
    StartsWith(&'static str, String),
}

impl Serialize for Condition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Condition::Eq(field, value) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(field, value)?;
                map.end()
            }
            Condition::StartsWith(field, prefix) => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element("starts-with")?;
                seq.serialize_element(&format!("${}", field))?;
                seq.serialize_element(prefix)?;
                seq.end()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDocument {
    pub expiration: String,
    pub conditions: Vec<Condition>,
}

impl PolicyDocument {
    /// The condition order is part of what gets signed and must not change.
    pub fn new(config: &ValidatedConfig, ctx: &SigningContext) -> Self {
        let credential = config
            .credentials
            .scope(&ctx.date_stamp, config.region.as_str());

        Self {
            expiration: ctx.iso_date.clone(),
            conditions: vec![
                Condition::Eq("bucket", config.bucket_name.clone()),
                Condition::Eq("acl", ACL.to_string()),
                Condition::StartsWith("key", String::new()),
                Condition::StartsWith("Content-Type", String::new()),
                Condition::Eq("x-amz-meta-uuid", META_UUID.to_string()),
                Condition::Eq(
                    "x-amz-server-side-encryption",
                    SERVER_SIDE_ENCRYPTION.to_string(),
                ),
                Condition::StartsWith("x-amz-meta-tag", String::new()),
                Condition::Eq("x-amz-credential", credential),
                Condition::Eq("x-amz-algorithm", ALGORITHM.to_string()),
                Condition::Eq("x-amz-date", ctx.amz_date_stamp.clone()),
            ],
        }
    }

    /// Base64 of the compact JSON document, with any `$`, `\n` and `\r` removed
    pub fn encode(&self) -> Result<String, S3Error> {
        let json = serde_json::to_string(self)?;
        let mut encoded = general_purpose::STANDARD.encode(json.as_bytes());
        encoded.retain(|c| !matches!(c, '$' | '\n' | '\r'));
        Ok(encoded)
    }
}

/// Builds the policy and its signing dates for a given point in time.
pub fn build_policy(
    config: &ValidatedConfig,
    now: OffsetDateTime,
) -> Result<(PolicyDocument, SigningContext), S3Error> {
    let ctx = SigningContext::new(now)?;
    let policy = PolicyDocument::new(config, &ctx);
    Ok((policy, ctx))
}
