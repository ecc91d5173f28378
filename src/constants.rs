use time::format_description::BorrowedFormatItem;

/// How long a signed policy stays valid after it has been built
pub const POLICY_VALIDITY: time::Duration = time::Duration::minutes(10);

pub const ISO_8601_MILLIS: &[BorrowedFormatItem<'static>] = time::macros::format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const SERVICE: &str = "s3";
pub const ACL: &str = "public-read";
pub const SERVER_SIDE_ENCRYPTION: &str = "AES256";
/// Fixed `x-amz-meta-uuid` value, signed into the policy and sent with every form
pub const META_UUID: &str = "14365123651274";
pub const META_TAG: &str = "";
