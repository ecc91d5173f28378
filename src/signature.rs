use crate::constants::SERVICE;
use crate::credentials::AccessKeySecret;
use crate::error::S3Error;
use crate::Region;
use bytes::BytesMut;
use hmac::Hmac;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use sha2::digest::Mac;
use sha2::Sha256;

const FRAGMENT: &AsciiSet = &CONTROLS
    // URL_RESERVED
    .add(b':')
    .add(b'?')
    .add(b'#')
    .add(b'[')
    .add(b']')
    .add(b'@')
    .add(b'!')
    .add(b'$')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b';')
    .add(b'=')
    // URL_UNSAFE
    .add(b'"')
    .add(b' ')
    .add(b'<')
    .add(b'>')
    .add(b'%')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'`');

/// Percent-encodes an object key for use as URL path, keeping `/` as separator.
pub fn uri_encode(key: &str) -> String {
    utf8_percent_encode(key, FRAGMENT).to_string()
}

/// Derives the SigV4 signing key scoped to `date_stamp` (`yyyymmdd`), region and `s3`.
pub fn signing_key(
    secret_key: &AccessKeySecret,
    region: &Region,
    date_stamp: &str,
) -> Result<Vec<u8>, S3Error> {
    let mut secret = BytesMut::with_capacity(72);
    secret.extend(b"AWS4");
    secret.extend(secret_key.as_ref().as_bytes());

    let mut date_hmac = Hmac::<Sha256>::new_from_slice(secret.as_ref())?;
    date_hmac.update(date_stamp.as_bytes());

    let mut region_hmac = Hmac::<Sha256>::new_from_slice(&date_hmac.finalize().into_bytes())?;
    region_hmac.update(region.as_str().as_bytes());

    let mut service_hmac = Hmac::<Sha256>::new_from_slice(&region_hmac.finalize().into_bytes())?;
    service_hmac.update(SERVICE.as_bytes());

    let mut signing_hmac = Hmac::<Sha256>::new_from_slice(&service_hmac.finalize().into_bytes())?;
    signing_hmac.update(b"aws4_request");

    Ok(signing_hmac.finalize().into_bytes().to_vec())
}

/// Signs the base64 encoded policy, returning the lowercase hex signature.
pub fn sign_policy(
    secret_key: &AccessKeySecret,
    region: &Region,
    date_stamp: &str,
    policy_base64: &str,
) -> Result<String, S3Error> {
    let key = signing_key(secret_key, region, date_stamp)?;
    let mut hmac = Hmac::<Sha256>::new_from_slice(&key)?;
    hmac.update(policy_base64.as_bytes());
    Ok(hex::encode(hmac.finalize().into_bytes()))
}
