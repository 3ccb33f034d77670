//! Replay container decoding.
//!
//! A replay file is either stored as-is or wrapped in gzip. The two-byte gzip
//! magic decides which; nothing else about the container is interpreted here.

use std::borrow::Cow;
use std::io::{Read, Seek, SeekFrom};

use flate2::read::MultiGzDecoder;
use replay_core::error::{ReplayError, Result};
use tracing::debug;

/// Standard gzip signature (RFC 1952, ID1/ID2).
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// How the container bytes are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Plain,
}

impl Compression {
    /// Classify a buffer by its leading bytes.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(&GZIP_MAGIC) {
            Compression::Gzip
        } else {
            Compression::Plain
        }
    }

    /// Classify a seekable stream by peeking at its first two bytes.
    ///
    /// The stream position is restored before returning, whatever the outcome.
    pub fn sniff_reader<R: Read + Seek>(reader: &mut R) -> std::io::Result<Self> {
        let start = reader.stream_position()?;
        let mut magic = [0u8; 2];
        let mut filled = 0;
        while filled < magic.len() {
            match reader.read(&mut magic[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    reader.seek(SeekFrom::Start(start))?;
                    return Err(e);
                }
            }
        }
        reader.seek(SeekFrom::Start(start))?;
        Ok(Self::sniff(&magic[..filled]))
    }
}

/// Turns raw replay bytes into the uncompressed container contents.
pub struct ContainerDecoder;

impl ContainerDecoder {
    /// Decode an in-memory buffer.
    ///
    /// Plain buffers are returned borrowed and untouched; gzip buffers are
    /// fully decompressed (multi-member streams are concatenated).
    pub fn decode(bytes: &[u8]) -> Result<Cow<'_, [u8]>> {
        match Compression::sniff(bytes) {
            Compression::Plain => Ok(Cow::Borrowed(bytes)),
            Compression::Gzip => {
                let mut out = Vec::with_capacity(bytes.len().saturating_mul(4));
                MultiGzDecoder::new(bytes)
                    .read_to_end(&mut out)
                    .map_err(ReplayError::Decode)?;
                debug!(
                    compressed = bytes.len(),
                    decompressed = out.len(),
                    "gzip container inflated"
                );
                Ok(Cow::Owned(out))
            }
        }
    }

    /// Decode a seekable stream from its current position to the end.
    pub fn decode_reader<R: Read + Seek>(reader: &mut R) -> Result<Vec<u8>> {
        let compression = Compression::sniff_reader(reader)?;
        let mut out = Vec::new();
        match compression {
            Compression::Plain => {
                reader.read_to_end(&mut out)?;
            }
            Compression::Gzip => {
                MultiGzDecoder::new(reader)
                    .read_to_end(&mut out)
                    .map_err(ReplayError::Decode)?;
            }
        }
        Ok(out)
    }
}
