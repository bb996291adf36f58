//! # Seal-Log: Envelope Encryption for Append-Only Logs
//!
//! `seal-log` encrypts log files at rest as they are written. Every flush of
//! an [`EncryptingAppendStream`] seals the buffered bytes under a fresh
//! AES-256-GCM key, wraps that key with the recipient's RSA public key
//! (OAEP, SHA-256) and appends one self-delimiting frame to the file. Only the
//! holder of the matching private key can read the log back with a
//! [`LogFileDecryptor`].
//!
//! ## Core Concepts
//!
//! - **`KeyPairGenerator`**: Produces RSA key pairs as JSON key blobs.
//! - **`EncryptingAppendStream`**: A write-only `std::io::Write` sink, one frame per flush.
//! - **`frame`**: The binary frame layout shared by both directions.
//! - **`LogFileDecryptor`**: Walks the frames of a log file and concatenates their plaintext.
//! - **`FileOpenHook`**: The seam through which a log writer's file handle becomes encrypted.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::io::Write;
//! use seal_log::asymmetric::{AsymmetricCryptographicSystem, RsaCryptoSystem};
//! use seal_log::{EncryptingAppendStream, KeyPairGenerator, LogFileDecryptor};
//!
//! fn main() -> seal_log::Result<()> {
//!     let blobs = KeyPairGenerator::generate(2048)?;
//!     let public_key = RsaCryptoSystem::import_public_key(&blobs.public_key)?;
//!     let private_key = RsaCryptoSystem::import_private_key(&blobs.private_key)?;
//!
//!     let mut stream = EncryptingAppendStream::new(Vec::new(), public_key);
//!     stream.write_all(b"Hello, encrypted log!")?;
//!     stream.flush()?;
//!     let file = stream.finish()?;
//!
//!     let plaintext = LogFileDecryptor::new(&private_key).decrypt_bytes(&file)?;
//!     assert_eq!(plaintext, b"Hello, encrypted log!");
//!     Ok(())
//! }
//! ```

pub mod appender;
pub mod asymmetric;
pub mod common;
pub mod decryptor;
pub mod files;
pub mod frame;
pub mod hook;
pub mod keygen;
pub mod stream;
pub mod symmetric;

pub use appender::EncryptedLogAppender;
pub use common::{CryptoConfig, Error, Result};
pub use decryptor::LogFileDecryptor;
pub use frame::{Frame, FrameReader};
pub use hook::{BoxedSink, EncryptingFileHook, FileOpenHook};
pub use keygen::{KeyFilePaths, KeyPairBlobs, KeyPairGenerator};
pub use stream::EncryptingAppendStream;

/// The version of the `seal-log` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
