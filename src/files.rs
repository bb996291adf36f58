//! File-level operations behind the `seal-log` commands.

use crate::asymmetric::systems::rsa::RsaCryptoSystem;
use crate::asymmetric::traits::AsymmetricCryptographicSystem;
use crate::common::config::CryptoConfig;
use crate::common::errors::{Error, Result};
use crate::decryptor::LogFileDecryptor;
use crate::keygen::{KeyFilePaths, KeyPairGenerator};
use crate::stream::EncryptingAppendStream;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Default number of plaintext bytes sealed into each frame by [`encrypt_file`].
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Generates a key pair per `config` and writes both key files into `dir`.
pub fn generate_keys(dir: impl AsRef<Path>, config: &CryptoConfig) -> Result<KeyFilePaths> {
    KeyPairGenerator::with_config(config)
        .generate_default()?
        .write_to_dir(dir)
}

/// Reads a public key file. A private key file is accepted too; only its
/// public half is used.
pub fn load_public_key(path: impl AsRef<Path>) -> Result<RsaPublicKey> {
    let blob = fs::read_to_string(path.as_ref())?;
    RsaCryptoSystem::import_public_key(&blob).map_err(|e| Error::Key(e.to_string()))
}

pub fn load_private_key(path: impl AsRef<Path>) -> Result<RsaPrivateKey> {
    let blob = zeroize::Zeroizing::new(fs::read_to_string(path.as_ref())?);
    RsaCryptoSystem::import_private_key(&blob).map_err(|e| Error::Key(e.to_string()))
}

/// Decrypts `input` into `output`.
///
/// The whole file is decrypted in memory first, so a failure leaves
/// `output` untouched.
pub fn decrypt_file(
    private_key: &RsaPrivateKey,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &CryptoConfig,
) -> Result<usize> {
    let source = BufReader::new(File::open(input.as_ref())?);
    let plaintext = zeroize::Zeroizing::new(
        LogFileDecryptor::with_config(private_key, config).decrypt(source)?,
    );
    fs::write(output.as_ref(), plaintext.as_slice())?;
    Ok(plaintext.len())
}

/// Encrypts `input` into `output`, one frame per `chunk_size` bytes.
///
/// With `append` the frames are added after whatever `output` already holds;
/// otherwise `output` is truncated first. Returns the number of frames written.
pub fn encrypt_file(
    public_key: &RsaPublicKey,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    chunk_size: usize,
    append: bool,
) -> Result<u64> {
    if chunk_size == 0 {
        return Err(Error::Config("chunk size must be greater than zero".into()));
    }

    let mut source = File::open(input.as_ref())?;
    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    let sink = options.open(output.as_ref())?;

    let mut stream = EncryptingAppendStream::new(sink, public_key.clone());
    let mut chunk = zeroize::Zeroizing::new(vec![0u8; chunk_size]);
    loop {
        let n = read_chunk(&mut source, &mut chunk)?;
        if n == 0 {
            break;
        }
        stream.write_all(&chunk[..n])?;
        stream.flush_frame()?;
    }

    let frames = stream.frames_written();
    stream.close()?;
    Ok(frames)
}

/// Fills `buf` as far as the source allows; short only at end of input.
fn read_chunk<R: Read>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
