use std::borrow::Cow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode file bytes: UTF-8 with any BOM stripped, falling back to
/// Latin-1 (every byte maps to the code point of the same value).
#[must_use]
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(body) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            tracing::debug!("input is not valid UTF-8; decoding as Latin-1");
            Cow::Owned(body.iter().map(|&b| char::from(b)).collect())
        }
    }
}
