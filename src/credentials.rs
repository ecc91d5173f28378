use crate::error::S3Error;
use std::env;
use std::fmt::{Debug, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKeyId(pub String);

impl AsRef<str> for AccessKeyId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl AccessKeyId {
    pub fn new<S: Into<String>>(access_key_id: S) -> Self {
        Self(access_key_id.into())
    }
}

/// The secret half of the credentials. Never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKeySecret(pub String);

impl Debug for AccessKeySecret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessKeySecret(<hidden>)")
    }
}

impl AsRef<str> for AccessKeySecret {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl AccessKeySecret {
    pub fn new<S: Into<String>>(access_key_secret: S) -> Self {
        Self(access_key_secret.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: AccessKeyId,
    pub access_key_secret: AccessKeySecret,
}

impl Credentials {
    pub fn new<S>(key: S, secret: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            access_key_id: AccessKeyId(key.into()),
            access_key_secret: AccessKeySecret(secret.into()),
        }
    }

    pub fn try_from_env() -> Result<Self, S3Error> {
        let access_key_id = env::var("S3_ACCESS_KEY_ID")?;
        let access_key_secret = env::var("S3_ACCESS_KEY_SECRET")?;

        Ok(Self {
            access_key_id: AccessKeyId(access_key_id),
            access_key_secret: AccessKeySecret(access_key_secret),
        })
    }

    /// The `x-amz-credential` scope for a given `yyyymmdd` date stamp
    pub fn scope(&self, date_stamp: &str, region: &str) -> String {
        format!(
            "{}/{}/{}/s3/aws4_request",
            self.access_key_id.as_ref(),
            date_stamp,
            region
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_secret_hidden_in_debug() {
        let creds = Credentials::new("AKID", "SECRET");
        let dbg = format!("{:?}", creds);
        assert!(dbg.contains("AKID"));
        assert!(!dbg.contains("SECRET"));
    }

    #[test]
    fn test_scope() {
        let creds = Credentials::new("AKID", "SECRET");
        assert_eq!(
            creds.scope("20240115", "eu-central-1"),
            "AKID/20240115/eu-central-1/s3/aws4_request"
        );
    }
}
