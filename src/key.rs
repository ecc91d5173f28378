use crate::config::ValidatedConfig;
use crate::error::S3Error;
use crate::types::UploadFile;
use uuid::Uuid;

/// Source of unique, URL-safe, nonempty ids for generated object keys
pub trait IdGenerator: Send + Sync {
    fn generate_id(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

const STRIPPED: &[char] = &[
    '{', '`', '}', '^', '%', ']', '"', '>', '[', '~', '<', '|', '#', '/', '=', '?', '+', ':',
    '\\',
];

/// Unicode whitespace as JavaScript sees it: `U+FEFF` counts, `U+0085` does not.
fn is_js_whitespace(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

/// Removes all characters which are unsafe in an object key.
pub fn default_sanitize(key: &str) -> Result<String, S3Error> {
    let parsed = key
        .chars()
        .filter(|c| !STRIPPED.contains(c) && !is_js_whitespace(*c))
        .collect::<String>();
    if parsed.is_empty() {
        return Err(S3Error::Key(format!(
            "A 'key' may not be composed of special characters only; received '{}'",
            key
        )));
    }
    Ok(parsed)
}

/// Computes the final object key for an upload.
///
/// A caller key without a `.` gets the MIME subtype of the file appended as extension.
/// Without a caller key, a fresh id is generated.
pub fn resolve_key(
    file: &UploadFile,
    caller_key: Option<&str>,
    config: &ValidatedConfig,
    ids: &dyn IdGenerator,
) -> Result<String, S3Error> {
    let Some(key) = caller_key else {
        return Ok(format!("{}.{}", ids.generate_id(), extension(file)?));
    };

    // a configured hook is always run and checked, its result is only used when parsing
    let parsed = match &config.parsing_function {
        Some(f) => Some(checked_parse(f(key), key)?),
        None => None,
    };
    let base = match (config.parse_file_name, parsed) {
        (true, Some(parsed)) => parsed,
        (true, None) => default_sanitize(key)?,
        (false, _) => key.to_string(),
    };

    if key.contains('.') {
        Ok(base)
    } else {
        Ok(format!("{}.{}", base, extension(file)?))
    }
}

/// Prefixes the key with `dir_name/` if given
pub fn object_path(dir_name: Option<&str>, key: &str) -> String {
    match dir_name {
        Some(dir) => format!("{}/{}", dir, key),
        None => key.to_string(),
    }
}

fn checked_parse(parsed: String, key: &str) -> Result<String, S3Error> {
    if parsed.trim().is_empty() {
        Err(S3Error::Key(format!(
            "The 'parsingFunction' must return a nonempty string; received '{}'; returned '{}'",
            key, parsed
        )))
    } else {
        Ok(parsed)
    }
}

fn extension(file: &UploadFile) -> Result<&str, S3Error> {
    file.mime_subtype()
        .filter(|ext| !ext.is_empty())
        .ok_or_else(|| {
            S3Error::Key(format!(
                "cannot derive a file extension from content type '{}'",
                file.content_type
            ))
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    pub(crate) struct FixedId(pub &'static str);

    impl IdGenerator for FixedId {
        fn generate_id(&self) -> String {
            self.0.to_string()
        }
    }

    fn png() -> UploadFile {
        UploadFile::new("photo", "image/png", vec![1u8, 2, 3])
    }

    fn cfg() -> ClientConfig {
        ClientConfig::new("b", "us-east-1", "AKID", "SECRET")
    }

    fn resolve(config: ClientConfig, key: Option<&str>) -> Result<String, S3Error> {
        resolve_key(&png(), key, &config.validate().unwrap(), &FixedId("id123"))
    }

    #[test]
    fn test_default_sanitize() {
        assert_eq!(default_sanitize("my photo?.png").unwrap(), "myphoto.png");
        assert_eq!(
            default_sanitize(r#"a{b`c}d^e%f]g"h>i[j~k<l|m#n/o=p?q+r:s\t"#).unwrap(),
            "abcdefghijklmnopqrst"
        );
        assert_eq!(default_sanitize("tab\tand\nnewline").unwrap(), "tabandnewline");
        assert_eq!(default_sanitize("keep-_.!*'()&$@,;").unwrap(), "keep-_.!*'()&$@,;");
    }

    #[test]
    fn test_default_sanitize_js_whitespace() {
        assert_eq!(default_sanitize("a\u{feff}b").unwrap(), "ab");
        assert_eq!(default_sanitize("a\u{85}b").unwrap(), "a\u{85}b");
        assert_eq!(default_sanitize("a\u{a0}b\u{2028}c\u{3000}d").unwrap(), "abcd");
        assert_eq!(default_sanitize("\u{feff}").unwrap_err().kind(), ErrorKind::Key);
    }

    #[test]
    fn test_default_sanitize_only_special_chars() {
        let err = default_sanitize("/?# \\").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Key);
    }

    #[test]
    fn test_default_sanitize_idempotent() {
        for key in ["my photo?.png", "a/b/c", "plain", "ünï cödé+1", "x\\y"] {
            let once = default_sanitize(key).unwrap();
            assert_eq!(default_sanitize(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_no_key_generates_id() {
        assert_eq!(resolve(cfg(), None).unwrap(), "id123.png");
    }

    #[test]
    fn test_key_with_dot() {
        assert_eq!(resolve(cfg(), Some("my photo.png")).unwrap(), "myphoto.png");
        assert_eq!(
            resolve(cfg().with_parse_file_name(false), Some("photo.png")).unwrap(),
            "photo.png"
        );
        assert_eq!(
            resolve(cfg().with_parse_file_name(false), Some("my photo.png")).unwrap(),
            "my photo.png"
        );
        assert_eq!(
            resolve(
                cfg().with_parsing_function(|k| k.to_uppercase()),
                Some("photo.png")
            )
            .unwrap(),
            "PHOTO.PNG"
        );
    }

    #[test]
    fn test_key_without_dot() {
        assert_eq!(resolve(cfg(), Some("my photo")).unwrap(), "myphoto.png");
        assert_eq!(
            resolve(cfg().with_parse_file_name(false), Some("my photo")).unwrap(),
            "my photo.png"
        );
        assert_eq!(
            resolve(cfg().with_parsing_function(|k| format!("x-{}", k)), Some("photo")).unwrap(),
            "x-photo.png"
        );
    }

    #[test]
    fn test_parsing_function_checked_without_parse_file_name() {
        let config = cfg()
            .with_parse_file_name(false)
            .with_parsing_function(|_| String::new());
        let err = resolve(config, Some("photo")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Key);

        // the result is validated but the caller key is used verbatim
        let config = cfg()
            .with_parse_file_name(false)
            .with_parsing_function(|k| k.to_uppercase());
        assert_eq!(resolve(config, Some("my photo")).unwrap(), "my photo.png");
    }

    #[test]
    fn test_parsing_function_not_called_without_key() {
        let config = cfg().with_parsing_function(|_| String::new());
        assert_eq!(resolve(config, None).unwrap(), "id123.png");
    }

    #[test]
    fn test_parsing_function_empty_result() {
        let err = resolve(cfg().with_parsing_function(|_| "  ".to_string()), Some("photo"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Key);
    }

    #[test]
    fn test_missing_extension() {
        let file = UploadFile::new("f", "application", Vec::new());
        let config = cfg().validate().unwrap();
        let err = resolve_key(&file, None, &config, &FixedId("id")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Key);
        // a caller key with an extension does not need the content type
        assert_eq!(
            resolve_key(&file, Some("f.bin"), &config, &FixedId("id")).unwrap(),
            "f.bin"
        );
    }

    #[test]
    fn test_uuid_generator() {
        let a = UuidGenerator.generate_id();
        let b = UuidGenerator.generate_id();
        assert_ne!(a, b);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c == '-'));
    }

    #[test]
    fn test_object_path() {
        assert_eq!(object_path(Some("avatars"), "a.png"), "avatars/a.png");
        assert_eq!(object_path(None, "a.png"), "a.png");
    }
}
