//! Percent-decoding of request paths
//!
//! The raw path is decoded exactly once, so `%252e` stays the literal text `%2e`
//! and can never turn into a dot segment.

use percent_encoding::percent_decode_str;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// `%` not followed by two hex digits
    MalformedEscape,
    /// Decoded bytes are not UTF-8
    InvalidUtf8,
    /// Decoded path contains NUL or a backslash
    ForbiddenCharacter,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::MalformedEscape => "malformed percent-escape",
            Self::InvalidUtf8 => "decoded path is not UTF-8",
            Self::ForbiddenCharacter => "decoded path contains NUL or backslash",
        };
        f.write_str(reason)
    }
}

/// Decode a raw request path into the text it names.
pub fn decode_path(raw: &str) -> Result<String, DecodeError> {
    validate_escapes(raw.as_bytes())?;

    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| DecodeError::InvalidUtf8)?;

    // Backslash is a separator on Windows; refuse it everywhere so a path
    // means the same thing on every platform.
    if decoded.contains(['\0', '\\']) {
        return Err(DecodeError::ForbiddenCharacter);
    }
    Ok(decoded.into_owned())
}

/// `percent_decode_str` passes bad escapes through untouched; reject them instead.
fn validate_escapes(bytes: &[u8]) -> Result<(), DecodeError> {
    let mut rest = bytes;
    while let Some(at) = rest.iter().position(|&b| b == b'%') {
        match rest.get(at + 1..at + 3) {
            Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                rest = &rest[at + 3..];
            }
            _ => return Err(DecodeError::MalformedEscape),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_unchanged() {
        assert_eq!(decode_path("/docs/a.txt").unwrap(), "/docs/a.txt");
        assert_eq!(decode_path("").unwrap(), "");
    }

    #[test]
    fn test_decodes_escapes() {
        assert_eq!(decode_path("/my%20file.txt").unwrap(), "/my file.txt");
        assert_eq!(decode_path("/%2e%2E/x").unwrap(), "/../x");
        assert_eq!(decode_path("/caf%C3%A9").unwrap(), "/café");
        assert_eq!(decode_path("/a%2Fb").unwrap(), "/a/b");
    }

    #[test]
    fn test_decodes_only_once() {
        assert_eq!(decode_path("/%252e%252e/").unwrap(), "/%2e%2e/");
    }

    #[test]
    fn test_malformed_escapes() {
        assert_eq!(decode_path("/100%"), Err(DecodeError::MalformedEscape));
        assert_eq!(decode_path("/%4"), Err(DecodeError::MalformedEscape));
        assert_eq!(decode_path("/%zz"), Err(DecodeError::MalformedEscape));
        assert_eq!(decode_path("/%%41"), Err(DecodeError::MalformedEscape));
    }

    #[test]
    fn test_invalid_utf8() {
        assert_eq!(decode_path("/%ff%fe"), Err(DecodeError::InvalidUtf8));
        assert_eq!(decode_path("/%C0%AE"), Err(DecodeError::InvalidUtf8));
    }

    #[test]
    fn test_forbidden_characters() {
        assert_eq!(decode_path("/a%00b"), Err(DecodeError::ForbiddenCharacter));
        assert_eq!(decode_path("/..%5c..%5cetc"), Err(DecodeError::ForbiddenCharacter));
        assert_eq!(decode_path("/..\\etc"), Err(DecodeError::ForbiddenCharacter));
    }
}
