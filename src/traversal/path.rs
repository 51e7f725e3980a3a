//! Request path normalization.

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Path segment separator.
pub const SEPARATOR: char = '/';

/// A raw path segment whose percent-decoded bytes are not UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("path segment {segment:?} does not decode to UTF-8")]
pub struct InvalidSegment {
    pub segment: String,
}

/// Split a request path into traversal tokens.
///
/// Exactly one leading and one trailing separator are removed; everything
/// else, including empty segments from doubled separators, is kept. The empty
/// path yields a single empty token.
pub fn tokenize(path: &str) -> Vec<String> {
    let path = path.strip_prefix(SEPARATOR).unwrap_or(path);
    let path = path.strip_suffix(SEPARATOR).unwrap_or(path);
    path.split(SEPARATOR).map(str::to_owned).collect()
}

/// Tokenize a raw URI path, percent-decoding each segment after splitting.
///
/// An encoded separator (`%2F`) stays inside its segment. A segment that does
/// not decode to UTF-8 fails the whole path rather than being replaced, so
/// distinct raw paths never collapse into one token.
pub fn tokenize_uri_path(raw: &str) -> Result<Vec<String>, InvalidSegment> {
    tokenize(raw)
        .into_iter()
        .map(|token| match percent_decode_str(&token).decode_utf8() {
            Ok(decoded) => Ok(decoded.into_owned()),
            Err(_) => Err(InvalidSegment { segment: token }),
        })
        .collect()
}
