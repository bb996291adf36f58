//! The envelope-encrypting append stream.
//!
//! [`EncryptingAppendStream`] sits between a log writer and the log file.
//! Writes only fill an in-memory buffer. Each flush seals the buffer under
//! fresh symmetric key material, wraps that key for the recipient and appends
//! exactly one frame to the file.
//!
//! ```rust,ignore
//! use std::io::Write;
//! use seal_log::EncryptingAppendStream;
//!
//! let file = std::fs::OpenOptions::new().create(true).append(true).open("app.log")?;
//! let mut stream = EncryptingAppendStream::new(file, public_key);
//! writeln!(stream, "service started")?;
//! stream.flush()?; // one frame on disk
//! stream.close()?;
//! ```

use crate::asymmetric::systems::rsa::RsaCryptoSystem;
use crate::asymmetric::traits::AsymmetricCryptographicSystem;
use crate::common::config::CryptoConfig;
use crate::common::errors::{Error, Result};
use crate::frame::Frame;
use crate::symmetric::systems::aes_gcm::AesGcmSystem;
use crate::symmetric::traits::SymmetricCryptographicSystem;
use std::io::{self, SeekFrom, Write};
use std::marker::PhantomData;
use zeroize::Zeroize;

/// Write-only, position-less sink that emits one encrypted frame per flush.
///
/// Not safe for concurrent use; all calls take `&mut self`.
///
/// If the sink fails after accepting part of a frame, the stream is
/// poisoned: nothing more is written to that sink, since any later frame
/// would follow a torn one and make the rest of the file unreadable.
pub struct EncryptingAppendStream<W, A = RsaCryptoSystem, S = AesGcmSystem>
where
    W: Write,
    A: AsymmetricCryptographicSystem,
    S: SymmetricCryptographicSystem,
{
    sink: Option<W>,
    public_key: A::PublicKey,
    buffer: Vec<u8>,
    frames_written: u64,
    poisoned: bool,
    _symmetric: PhantomData<S>,
}

impl<W: Write> EncryptingAppendStream<W> {
    /// Creates a stream using RSA-OAEP key wrapping and AES-256-GCM payloads.
    pub fn new(sink: W, public_key: rsa::RsaPublicKey) -> Self {
        Self::with_systems(sink, public_key, 0)
    }

    pub fn with_config(sink: W, public_key: rsa::RsaPublicKey, config: &CryptoConfig) -> Self {
        Self::with_systems(sink, public_key, config.initial_buffer_capacity)
    }
}

impl<W, A, S> EncryptingAppendStream<W, A, S>
where
    W: Write,
    A: AsymmetricCryptographicSystem,
    S: SymmetricCryptographicSystem,
{
    /// Creates a stream over explicit primitives, pre-allocating `capacity`
    /// bytes for the plaintext buffer.
    pub fn with_systems(sink: W, public_key: A::PublicKey, capacity: usize) -> Self {
        Self {
            sink: Some(sink),
            public_key,
            buffer: Vec::with_capacity(capacity),
            frames_written: 0,
            poisoned: false,
            _symmetric: PhantomData,
        }
    }

    pub fn can_read(&self) -> bool {
        false
    }

    pub fn can_seek(&self) -> bool {
        false
    }

    /// True until the stream is closed or poisoned.
    pub fn can_write(&self) -> bool {
        self.sink.is_some() && !self.poisoned
    }

    pub fn is_closed(&self) -> bool {
        self.sink.is_none()
    }

    /// True once the sink failed part-way through a frame.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Bytes written since the last emitted frame.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn get_ref(&self) -> Option<&W> {
        self.sink.as_ref()
    }

    pub fn read(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Err(Error::Unsupported("read"))
    }

    pub fn seek(&mut self, _pos: SeekFrom) -> Result<u64> {
        Err(Error::Unsupported("seek"))
    }

    pub fn length(&self) -> Result<u64> {
        Err(Error::Unsupported("length"))
    }

    pub fn set_length(&mut self, _len: u64) -> Result<()> {
        Err(Error::Unsupported("set_length"))
    }

    pub fn position(&self) -> Result<u64> {
        Err(Error::Unsupported("position"))
    }

    pub fn set_position(&mut self, _pos: u64) -> Result<()> {
        Err(Error::Unsupported("set_position"))
    }

    /// Seals the buffered bytes into one frame and writes it to the sink.
    ///
    /// Returns `Ok(false)` without touching the sink when nothing is
    /// buffered. On failure the buffer is kept. A later flush retries only
    /// if the sink accepted none of the frame's bytes; otherwise the stream
    /// is poisoned and every further flush fails.
    pub fn flush_frame(&mut self) -> Result<bool> {
        if self.poisoned {
            return Err(poisoned_error().into());
        }
        if self.buffer.is_empty() {
            return Ok(false);
        }
        let Some(sink) = self.sink.as_mut() else {
            return Err(closed_error().into());
        };

        let frame = seal::<A, S>(&self.public_key, &self.buffer)?;
        let bytes = frame.encode()?;
        let (written, result) = write_counted(sink, &bytes);
        if let Err(e) = result {
            if written > 0 {
                self.poisoned = true;
                tracing::error!(
                    written,
                    frame_len = bytes.len(),
                    error = %e,
                    "sink failed mid-frame, encrypting stream poisoned"
                );
            }
            return Err(e.into());
        }

        self.frames_written += 1;
        tracing::debug!(
            plaintext_len = self.buffer.len(),
            frame_len = bytes.len(),
            frames_written = self.frames_written,
            "emitted encrypted frame"
        );
        self.buffer.zeroize();

        if let Err(e) = sink.flush() {
            // The frame may sit half-written in a buffered sink.
            self.poisoned = true;
            tracing::error!(error = %e, "sink flush failed, encrypting stream poisoned");
            return Err(e.into());
        }
        Ok(true)
    }

    /// Emits any buffered bytes and releases the sink. Safe to call again.
    ///
    /// The sink is dropped even if the final flush fails; that error is
    /// returned and the buffered bytes are discarded.
    ///
    /// A poisoned stream only releases its sink; bytes still buffered are
    /// discarded and reported as an error.
    pub fn close(&mut self) -> Result<()> {
        if self.sink.is_none() {
            return Ok(());
        }
        let result = if self.poisoned {
            if self.buffer.is_empty() {
                Ok(())
            } else {
                tracing::warn!(
                    discarded = self.buffer.len(),
                    "dropping buffered bytes of a poisoned stream"
                );
                Err(poisoned_error().into())
            }
        } else {
            self.flush_frame().map(|_| ())
        };
        drop(self.sink.take());
        self.buffer.zeroize();
        result
    }

    /// Emits any buffered bytes and hands the sink back.
    pub fn finish(mut self) -> Result<W> {
        self.flush_frame()?;
        self.buffer.zeroize();
        self.sink.take().ok_or_else(|| closed_error().into())
    }
}

fn seal<A, S>(public_key: &A::PublicKey, plaintext: &[u8]) -> Result<Frame>
where
    A: AsymmetricCryptographicSystem,
    S: SymmetricCryptographicSystem,
{
    let material = S::generate_key_material().map_err(Into::<Error>::into)?;
    let cipher_text = S::encrypt(&material, plaintext).map_err(Into::<Error>::into)?;
    let wrapped_key = A::encrypt(public_key, material.key()).map_err(Into::<Error>::into)?;
    Ok(Frame::new(wrapped_key, material.nonce().to_vec(), cipher_text))
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "encrypting stream is closed")
}

fn poisoned_error() -> io::Error {
    io::Error::new(
        io::ErrorKind::BrokenPipe,
        "encrypting stream is poisoned by a partially written frame",
    )
}

/// `write_all` that also reports how many bytes the sink accepted before failing.
fn write_counted<W: Write>(sink: &mut W, bytes: &[u8]) -> (usize, io::Result<()>) {
    let mut written = 0;
    while written < bytes.len() {
        match sink.write(&bytes[written..]) {
            Ok(0) => return (written, Err(io::ErrorKind::WriteZero.into())),
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return (written, Err(e)),
        }
    }
    (written, Ok(()))
}

impl<W, A, S> Write for EncryptingAppendStream<W, A, S>
where
    W: Write,
    A: AsymmetricCryptographicSystem,
    S: SymmetricCryptographicSystem,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.sink.is_none() {
            return Err(closed_error());
        }
        if self.poisoned {
            return Err(poisoned_error());
        }
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_frame().map(|_| ()).map_err(io::Error::from)
    }
}

impl<W, A, S> Drop for EncryptingAppendStream<W, A, S>
where
    W: Write,
    A: AsymmetricCryptographicSystem,
    S: SymmetricCryptographicSystem,
{
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "final flush of encrypted log stream failed");
        }
    }
}

impl<W, A, S> std::fmt::Debug for EncryptingAppendStream<W, A, S>
where
    W: Write,
    A: AsymmetricCryptographicSystem,
    S: SymmetricCryptographicSystem,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptingAppendStream")
            .field("buffered_len", &self.buffer.len())
            .field("frames_written", &self.frames_written)
            .field("closed", &self.is_closed())
            .field("poisoned", &self.poisoned)
            .finish()
    }
}
