use crate::credentials::Credentials;
use crate::error::S3Error;
use crate::Region;
use serde_json::{Map, Value};
use std::env;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Caller supplied key derivation hook. Must return a nonempty string.
pub type ParsingFunction = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Upload progress callback, invoked with `(loaded, total)` bytes
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Raw client configuration as given by the caller.
///
/// Nothing is checked at construction time. [`ClientConfig::validate`] turns it into a
/// [`ValidatedConfig`] with all defaults filled in.
#[derive(Clone, Default)]
pub struct ClientConfig {
    pub bucket_name: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub base_url: Option<String>,
    pub parse_file_name: Option<bool>,
    pub parsing_function: Option<ParsingFunction>,
    pub on_upload_progress: Option<ProgressFn>,
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("bucket_name", &self.bucket_name)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<hidden>")
            .field("base_url", &self.base_url)
            .field("parse_file_name", &self.parse_file_name)
            .field("parsing_function", &self.parsing_function.is_some())
            .field("on_upload_progress", &self.on_upload_progress.is_some())
            .finish()
    }
}

impl ClientConfig {
    pub fn new<S>(bucket_name: S, region: S, access_key_id: S, secret_access_key: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            bucket_name: bucket_name.into(),
            region: region.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_parse_file_name(mut self, parse_file_name: bool) -> Self {
        self.parse_file_name = Some(parse_file_name);
        self
    }

    pub fn with_parsing_function<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.parsing_function = Some(Arc::new(f));
        self
    }

    pub fn with_upload_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        self.on_upload_progress = Some(Arc::new(f));
        self
    }

    /// Reads the config from `S3_BUCKET`, `S3_REGION`, `S3_ACCESS_KEY_ID`,
    /// `S3_ACCESS_KEY_SECRET` and the optional `S3_URL` and `S3_PARSE_FILE_NAME`.
    pub fn try_from_env() -> Result<Self, S3Error> {
        let bucket_name = env::var("S3_BUCKET")?;
        let region = Region::try_from_env()?;
        let credentials = Credentials::try_from_env()?;

        let parse_file_name = match env::var("S3_PARSE_FILE_NAME") {
            Ok(value) => Some(value.parse::<bool>().map_err(|_| {
                S3Error::Config("S3_PARSE_FILE_NAME cannot be parsed as bool".to_string())
            })?),
            Err(_) => None,
        };

        Ok(Self {
            bucket_name,
            region: region.0,
            access_key_id: credentials.access_key_id.0,
            secret_access_key: credentials.access_key_secret.0,
            base_url: env::var("S3_URL").ok(),
            parse_file_name,
            ..Default::default()
        })
    }

    /// Builds a config from a loosely typed JSON object like
    /// `{"bucketName": "...", "region": "...", "accessKeyId": "...", "secretAccessKey": "..."}`.
    ///
    /// Callbacks cannot be expressed in JSON. Attach them afterwards with
    /// [`ClientConfig::with_parsing_function`] and [`ClientConfig::with_upload_progress`].
    pub fn from_json(value: &Value) -> Result<Self, S3Error> {
        let obj = value.as_object().filter(|obj| !obj.is_empty()).ok_or_else(|| {
            S3Error::Config("the client config must be a nonempty object".to_string())
        })?;

        let base_url = match obj.get("baseUrl") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(S3Error::Config(
                    "If included, 'baseUrl' must be a nonempty string".to_string(),
                ))
            }
        };

        let parse_file_name = match obj.get("parseFileName") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                return Err(S3Error::Config(
                    "If included, 'parseFileName' must be a boolean".to_string(),
                ))
            }
        };

        for name in ["onUploadProgress", "parsingFunction"] {
            if obj.get(name).is_some_and(|v| !v.is_null()) {
                return Err(S3Error::Config(format!(
                    "If included, the value for the '{}' key must be a function",
                    name
                )));
            }
        }

        Ok(Self {
            bucket_name: json_str(obj, "bucketName")?,
            region: json_str(obj, "region")?,
            access_key_id: json_str(obj, "accessKeyId")?,
            secret_access_key: json_str(obj, "secretAccessKey")?,
            base_url,
            parse_file_name,
            ..Default::default()
        })
    }

    /// Checks all fields and fills in the defaults.
    ///
    /// Pure and idempotent: `self` is left untouched and validating the same config twice
    /// yields the same result.
    pub fn validate(&self) -> Result<ValidatedConfig, S3Error> {
        nonempty("bucketName", &self.bucket_name)?;
        nonempty("region", &self.region)?;
        nonempty("accessKeyId", &self.access_key_id)?;
        nonempty("secretAccessKey", &self.secret_access_key)?;

        let base_url = match &self.base_url {
            Some(url) if url.trim().is_empty() => {
                return Err(S3Error::Config(
                    "If included, 'baseUrl' must be a nonempty string".to_string(),
                ));
            }
            Some(url) => url.clone(),
            None => format!(
                "https://{}.s3.{}.amazonaws.com",
                self.bucket_name, self.region
            ),
        };

        Ok(ValidatedConfig {
            bucket_name: self.bucket_name.clone(),
            region: Region::new(self.region.as_str()),
            credentials: Credentials::new(
                self.access_key_id.as_str(),
                self.secret_access_key.as_str(),
            ),
            base_url,
            parse_file_name: self.parse_file_name.unwrap_or(true),
            parsing_function: self.parsing_function.clone(),
            on_upload_progress: self.on_upload_progress.clone(),
        })
    }
}

fn nonempty(name: &str, value: &str) -> Result<(), S3Error> {
    if value.trim().is_empty() {
        Err(S3Error::Config(format!("'{}' must be a nonempty string", name)))
    } else {
        Ok(())
    }
}

fn json_str(obj: &Map<String, Value>, name: &str) -> Result<String, S3Error> {
    match obj.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(S3Error::Config(format!("'{}' must be a nonempty string", name))),
    }
}

/// A checked [`ClientConfig`] with all defaults applied
#[derive(Clone)]
pub struct ValidatedConfig {
    pub bucket_name: String,
    pub region: Region,
    pub credentials: Credentials,
    pub base_url: String,
    pub parse_file_name: bool,
    pub parsing_function: Option<ParsingFunction>,
    pub on_upload_progress: Option<ProgressFn>,
}

impl Debug for ValidatedConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedConfig")
            .field("bucket_name", &self.bucket_name)
            .field("region", &self.region)
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url)
            .field("parse_file_name", &self.parse_file_name)
            .field("parsing_function", &self.parsing_function.is_some())
            .field("on_upload_progress", &self.on_upload_progress.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config() -> ClientConfig {
        ClientConfig::new("b", "us-east-1", "AKID", "SECRET")
    }

    #[test]
    fn test_defaults() {
        let validated = config().validate().unwrap();
        assert_eq!(validated.base_url, "https://b.s3.us-east-1.amazonaws.com");
        assert!(validated.parse_file_name);
        assert!(validated.parsing_function.is_none());
        assert!(validated.on_upload_progress.is_none());
    }

    #[test]
    fn test_explicit_values_kept() {
        let validated = config()
            .with_base_url("http://localhost:9000/b")
            .with_parse_file_name(false)
            .validate()
            .unwrap();
        assert_eq!(validated.base_url, "http://localhost:9000/b");
        assert!(!validated.parse_file_name);
    }

    #[test]
    fn test_missing_required_fields() {
        let cases: [(&str, fn(&mut ClientConfig)); 4] = [
            ("bucketName", |c| c.bucket_name.clear()),
            ("region", |c| c.region = "   ".to_string()),
            ("accessKeyId", |c| c.access_key_id.clear()),
            ("secretAccessKey", |c| c.secret_access_key = "\t".to_string()),
        ];
        for (name, mutate) in cases {
            let mut cfg = config();
            mutate(&mut cfg);
            let err = cfg.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
            assert!(err.to_string().contains(name), "{} not in {}", name, err);
        }
    }

    #[test]
    fn test_blank_base_url() {
        let err = config().with_base_url("  ").validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("baseUrl"));
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let cfg = config();
        let first = cfg.validate().unwrap();
        let second = cfg.validate().unwrap();
        assert!(cfg.base_url.is_none());
        assert!(cfg.parse_file_name.is_none());
        assert_eq!(first.base_url, second.base_url);
    }

    #[test]
    fn test_secret_not_in_debug() {
        let cfg = config();
        assert!(!format!("{:?}", cfg).contains("SECRET"));
        assert!(!format!("{:?}", cfg.validate().unwrap()).contains("SECRET"));
    }

    #[test]
    fn test_from_json() {
        let cfg = ClientConfig::from_json(&json!({
            "bucketName": "b",
            "region": "us-east-1",
            "accessKeyId": "AKID",
            "secretAccessKey": "SECRET",
            "parseFileName": false,
        }))
        .unwrap();
        assert_eq!(cfg.parse_file_name, Some(false));
        let validated = cfg.validate().unwrap();
        assert!(!validated.parse_file_name);
        assert_eq!(validated.base_url, "https://b.s3.us-east-1.amazonaws.com");
    }

    #[test]
    fn test_from_json_rejects_shapes() {
        for value in [json!({}), json!([1, 2]), json!("b"), json!(null)] {
            let err = ClientConfig::from_json(&value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }
    }

    #[test]
    fn test_from_json_rejects_types() {
        let base = json!({
            "bucketName": "b",
            "region": "us-east-1",
            "accessKeyId": "AKID",
            "secretAccessKey": "SECRET",
        });

        let mut value = base.clone();
        value["region"] = json!(42);
        let err = ClientConfig::from_json(&value).unwrap_err();
        assert!(err.to_string().contains("region"));

        let mut value = base.clone();
        value["parseFileName"] = json!("yes");
        let err = ClientConfig::from_json(&value).unwrap_err();
        assert!(err.to_string().contains("parseFileName"));

        let mut value = base.clone();
        value["baseUrl"] = json!(true);
        let err = ClientConfig::from_json(&value).unwrap_err();
        assert!(err.to_string().contains("baseUrl"));

        let mut value = base;
        value["onUploadProgress"] = json!("not a function");
        let err = ClientConfig::from_json(&value).unwrap_err();
        assert!(err.to_string().contains("onUploadProgress"));
    }
}
