use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::HandlerError;
use crate::store::Item;

/// The escape set of JavaScript's `encodeURIComponent`. Callers decode
/// cursors with `decodeURIComponent`, so the two sets must agree.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Serializes a scan position so the caller can echo it back verbatim on the
/// next request.
pub(crate) fn encode(key: &Item) -> Result<String, HandlerError> {
    let json = serde_json::to_string(key)?;
    Ok(utf8_percent_encode(&json, COMPONENT).to_string())
}

pub(crate) fn decode(raw: &str) -> Result<Item, HandlerError> {
    let json = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| HandlerError::Internal("pagination cursor is not valid utf-8"))?;
    Ok(serde_json::from_str(&json)?)
}
