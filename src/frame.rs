//! Envelope frame codec.
//!
//! A log file is a bare concatenation of frames, one per flush:
//!
//! ```text
//! +----------------+-------------+---------------+----------------+-------------+
//! | key len (u32)  | wrapped key | nonce (fixed) | ct len (u32)   | cipher text |
//! +----------------+-------------+---------------+----------------+-------------+
//! ```
//!
//! Both length prefixes are little-endian. There is no file header, magic or
//! footer, so a file can keep growing by appending frames.

use crate::common::errors::{Error, Result};
use crate::common::utils::checked_len_u32;
use std::io::{ErrorKind, Read};

/// Size of each length prefix in bytes.
pub const LEN_PREFIX_SIZE: usize = 4;

/// One encrypted record, as written per flush.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// The symmetric key, encrypted under the recipient public key.
    pub wrapped_key: Vec<u8>,
    /// Symmetric nonce, stored in the clear.
    pub nonce: Vec<u8>,
    pub cipher_text: Vec<u8>,
}

impl Frame {
    pub fn new(wrapped_key: Vec<u8>, nonce: Vec<u8>, cipher_text: Vec<u8>) -> Self {
        Self {
            wrapped_key,
            nonce,
            cipher_text,
        }
    }

    /// Number of bytes this frame occupies on disk.
    pub fn encoded_len(&self) -> usize {
        2 * LEN_PREFIX_SIZE + self.wrapped_key.len() + self.nonce.len() + self.cipher_text.len()
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_frame(&self.wrapped_key, &self.nonce, &self.cipher_text)
    }
}

/// Lays out one frame. Fails if a variable-length field exceeds `u32::MAX`.
pub fn encode_frame(wrapped_key: &[u8], nonce: &[u8], cipher_text: &[u8]) -> Result<Vec<u8>> {
    let key_len = checked_len_u32(wrapped_key.len(), "wrapped key")
        .ok_or_else(|| Error::Framing("wrapped key is too long for a u32 length prefix".into()))?;
    let ct_len = checked_len_u32(cipher_text.len(), "cipher text")
        .ok_or_else(|| Error::Framing("cipher text is too long for a u32 length prefix".into()))?;

    let mut out = Vec::with_capacity(
        2 * LEN_PREFIX_SIZE + wrapped_key.len() + nonce.len() + cipher_text.len(),
    );
    out.extend_from_slice(&key_len.to_le_bytes());
    out.extend_from_slice(wrapped_key);
    out.extend_from_slice(nonce);
    out.extend_from_slice(&ct_len.to_le_bytes());
    out.extend_from_slice(cipher_text);
    Ok(out)
}

/// Reads one frame from `source`.
///
/// Returns `Ok(None)` when the source is exhausted exactly at a frame
/// boundary and [`Error::Framing`] when it ends mid-frame.
pub fn decode_frame<R: Read>(source: &mut R, nonce_len: usize) -> Result<Option<Frame>> {
    decode_frame_with_limit(source, nonce_len, u32::MAX)
}

/// Like [`decode_frame`], but rejects any length prefix above `max_field_len`
/// before reading the field.
pub fn decode_frame_with_limit<R: Read>(
    source: &mut R,
    nonce_len: usize,
    max_field_len: u32,
) -> Result<Option<Frame>> {
    let mut prefix = [0u8; LEN_PREFIX_SIZE];
    match read_fully(source, &mut prefix)? {
        0 => return Ok(None),
        LEN_PREFIX_SIZE => {}
        n => {
            return Err(Error::Framing(format!(
                "stream ends {n} bytes into a wrapped-key length prefix"
            )));
        }
    }
    let key_len = u32::from_le_bytes(prefix);
    let wrapped_key = read_field(source, key_len, max_field_len, "wrapped key")?;

    let mut nonce = vec![0u8; nonce_len];
    let got = read_fully(source, &mut nonce)?;
    if got != nonce_len {
        return Err(Error::Framing(format!(
            "nonce truncated: expected {nonce_len} bytes, got {got}"
        )));
    }

    let got = read_fully(source, &mut prefix)?;
    if got != LEN_PREFIX_SIZE {
        return Err(Error::Framing(format!(
            "cipher-text length prefix truncated: got {got} of {LEN_PREFIX_SIZE} bytes"
        )));
    }
    let ct_len = u32::from_le_bytes(prefix);
    let cipher_text = read_field(source, ct_len, max_field_len, "cipher text")?;

    tracing::trace!(
        wrapped_key_len = key_len,
        cipher_text_len = ct_len,
        "decoded frame"
    );
    Ok(Some(Frame {
        wrapped_key,
        nonce,
        cipher_text,
    }))
}

fn read_field<R: Read>(source: &mut R, len: u32, max_len: u32, what: &str) -> Result<Vec<u8>> {
    if len > max_len {
        return Err(Error::Framing(format!(
            "{what} length {len} exceeds the limit of {max_len} bytes"
        )));
    }
    // Grow with the data actually present instead of trusting the prefix.
    let mut field = Vec::new();
    source.by_ref().take(u64::from(len)).read_to_end(&mut field)?;
    if field.len() != len as usize {
        return Err(Error::Framing(format!(
            "{what} truncated: expected {len} bytes, got {}",
            field.len()
        )));
    }
    Ok(field)
}

/// Fills as much of `buf` as the source allows; returns the byte count.
fn read_fully<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Iterator over the frames of a byte source. Stops after the first error.
pub struct FrameReader<R: Read> {
    source: R,
    nonce_len: usize,
    max_field_len: u32,
    done: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(source: R, nonce_len: usize) -> Self {
        Self::with_limit(source, nonce_len, u32::MAX)
    }

    pub fn with_limit(source: R, nonce_len: usize, max_field_len: u32) -> Self {
        Self {
            source,
            nonce_len,
            max_field_len,
            done: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match decode_frame_with_limit(&mut self.source, self.nonce_len, self.max_field_len) {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
