pub use crate::client::S3Client;
pub use crate::config::ClientConfig;
pub use crate::credentials::{AccessKeyId, AccessKeySecret, Credentials};
pub use crate::error::{ErrorKind, S3Error};
pub use crate::types::{DeleteResult, UploadFile, UploadResult};
