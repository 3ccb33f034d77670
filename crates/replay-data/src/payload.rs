//! Embedded match payload extraction.
//!
//! Replay containers carry a binary header, one JSON object describing the
//! match, then binary packet frames. The container layout is not parsed: the
//! first `{` byte is taken as the start of the object and exactly one balanced
//! object is decoded from there. Anything after it is ignored, and a second
//! embedded object would never be considered.

use replay_core::error::{ReplayError, Result};
use serde_json::{Deserializer, Map, Value};
use tracing::debug;

/// Top-level fields of the embedded match object, with no schema applied.
pub type Payload = Map<String, Value>;

/// Locates and decodes the embedded match object.
pub struct PayloadExtractor;

impl PayloadExtractor {
    /// Byte offset of the first `{`, if any.
    pub fn locate(raw: &[u8]) -> Option<usize> {
        raw.iter().position(|&b| b == b'{')
    }

    /// Decode the first JSON object in `raw`.
    ///
    /// Invalid UTF-8 after the opening brace is replaced rather than rejected,
    /// so binary frames behind the object never break the parse.
    pub fn extract(raw: &[u8]) -> Result<Payload> {
        let offset = Self::locate(raw).ok_or(ReplayError::NoPayloadFound)?;
        let text = String::from_utf8_lossy(&raw[offset..]);

        let mut stream = Deserializer::from_str(&text).into_iter::<Payload>();
        match stream.next() {
            Some(Ok(payload)) => {
                debug!(
                    offset,
                    consumed = stream.byte_offset(),
                    trailing = text.len() - stream.byte_offset(),
                    keys = payload.len(),
                    "match payload extracted"
                );
                Ok(payload)
            }
            Some(Err(source)) => Err(ReplayError::MalformedPayload { offset, source }),
            // The text starts with '{', so the stream always yields something.
            None => Err(ReplayError::NoPayloadFound),
        }
    }
}
