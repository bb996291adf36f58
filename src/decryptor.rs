//! Recovers the plaintext of an encrypted log file.

use crate::asymmetric::systems::rsa::RsaCryptoSystem;
use crate::asymmetric::traits::AsymmetricCryptographicSystem;
use crate::common::config::{CryptoConfig, DEFAULT_MAX_FIELD_LEN};
use crate::common::errors::{Error, Result};
use crate::frame::{Frame, FrameReader};
use crate::symmetric::systems::aes_gcm::AesGcmSystem;
use crate::symmetric::traits::{SymmetricCryptographicSystem, SymmetricKeyMaterial};
use std::io::Read;
use std::marker::PhantomData;

/// Walks the frames of a log file and concatenates their plaintext.
///
/// The private key is borrowed for the lifetime of the decryptor only.
pub struct LogFileDecryptor<'k, A = RsaCryptoSystem, S = AesGcmSystem>
where
    A: AsymmetricCryptographicSystem,
    S: SymmetricCryptographicSystem,
{
    private_key: &'k A::PrivateKey,
    max_field_len: u32,
    _symmetric: PhantomData<S>,
}

impl<'k> LogFileDecryptor<'k> {
    /// Creates a decryptor for RSA-OAEP wrapped keys and AES-256-GCM payloads.
    pub fn new(private_key: &'k rsa::RsaPrivateKey) -> Self {
        Self::with_systems(private_key)
    }

    pub fn with_config(private_key: &'k rsa::RsaPrivateKey, config: &CryptoConfig) -> Self {
        Self::new(private_key).with_max_field_len(config.max_field_len)
    }
}

impl<'k, A, S> LogFileDecryptor<'k, A, S>
where
    A: AsymmetricCryptographicSystem,
    S: SymmetricCryptographicSystem,
{
    pub fn with_systems(private_key: &'k A::PrivateKey) -> Self {
        Self {
            private_key,
            max_field_len: DEFAULT_MAX_FIELD_LEN,
            _symmetric: PhantomData,
        }
    }

    /// Caps the length prefix accepted for any single frame field.
    pub fn with_max_field_len(mut self, max_field_len: u32) -> Self {
        self.max_field_len = max_field_len;
        self
    }

    /// Decrypts every frame in `source`, in file order.
    ///
    /// An empty source yields empty output. Any framing, key or payload
    /// failure aborts the whole call.
    pub fn decrypt<R: Read>(&self, source: R) -> Result<Vec<u8>> {
        let mut plaintext = Vec::new();
        let mut frames = 0usize;
        for frame in FrameReader::with_limit(source, S::NONCE_SIZE, self.max_field_len) {
            let frame = frame?;
            let chunk = self.decrypt_frame(&frame).inspect_err(|e| {
                tracing::debug!(frame = frames, error = %e, "frame failed to decrypt");
            })?;
            plaintext.extend_from_slice(&chunk);
            frames += 1;
        }
        tracing::debug!(frames, plaintext_len = plaintext.len(), "decrypted log");
        Ok(plaintext)
    }

    pub fn decrypt_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        self.decrypt(bytes)
    }

    /// Unwraps the frame's key and opens its payload.
    pub fn decrypt_frame(&self, frame: &Frame) -> Result<Vec<u8>> {
        let key = A::decrypt(self.private_key, &frame.wrapped_key)
            .map_err(|e| Error::KeyMismatch(e.to_string()))?;
        let material = SymmetricKeyMaterial::new(key, frame.nonce.clone());
        if material.key().len() != S::KEY_SIZE {
            return Err(Error::KeyMismatch(format!(
                "unwrapped key is {} bytes, expected {}",
                material.key().len(),
                S::KEY_SIZE
            )));
        }

        S::decrypt(&material, &frame.cipher_text).map_err(|e| {
            tracing::trace!(error = %e, "payload rejected");
            Error::PayloadAuthentication
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_keys;
    use crate::frame::{LEN_PREFIX_SIZE, encode_frame};
    use crate::stream::EncryptingAppendStream;
    use std::io::Write;

    fn encrypt_chunks(chunks: &[&[u8]]) -> Vec<u8> {
        let (public_key, _) = test_keys::shared();
        let mut stream = EncryptingAppendStream::new(Vec::new(), public_key.clone());
        for chunk in chunks {
            stream.write_all(chunk).unwrap();
            stream.flush().unwrap();
        }
        stream.finish().unwrap()
    }

    fn decryptor() -> LogFileDecryptor<'static> {
        LogFileDecryptor::new(&test_keys::shared().1)
    }

    #[test]
    fn test_empty_input_decrypts_to_empty() {
        assert!(decryptor().decrypt_bytes(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_frames_concatenate_in_file_order() {
        let file = encrypt_chunks(&[b"Entry1", b"Entry2", b"Entry3"]);
        assert_eq!(decryptor().decrypt_bytes(&file).unwrap(), b"Entry1Entry2Entry3");
    }

    #[test]
    fn test_decrypt_from_reader() {
        let file = encrypt_chunks(&[b"from a reader"]);
        let plaintext = decryptor().decrypt(std::io::Cursor::new(file)).unwrap();
        assert_eq!(plaintext, b"from a reader");
    }

    #[test]
    fn test_wrong_private_key_is_key_mismatch() {
        let file = encrypt_chunks(&[b"secret"]);
        let (_, wrong_key) = test_keys::other();

        let result = LogFileDecryptor::new(wrong_key).decrypt_bytes(&file);
        assert!(matches!(result, Err(Error::KeyMismatch(_))));
    }

    #[test]
    fn test_corrupted_wrapped_key_is_key_mismatch() {
        let mut file = encrypt_chunks(&[b"secret"]);
        file[LEN_PREFIX_SIZE + 3] ^= 0x40;

        assert!(matches!(decryptor().decrypt_bytes(&file), Err(Error::KeyMismatch(_))));
    }

    #[test]
    fn test_corrupted_payload_fails_authentication() {
        let mut file = encrypt_chunks(&[b"a payload worth protecting"]);
        let last = file.len() - 1;
        file[last] ^= 0x01;

        assert!(matches!(decryptor().decrypt_bytes(&file), Err(Error::PayloadAuthentication)));
    }

    #[test]
    fn test_second_frame_failure_returns_no_partial_output() {
        let mut file = encrypt_chunks(&[b"good", b"bad"]);
        let last = file.len() - 1;
        file[last] ^= 0x01;

        assert!(decryptor().decrypt_bytes(&file).is_err());
    }

    #[test]
    fn test_truncated_file_is_framing_error() {
        let file = encrypt_chunks(&[b"first", b"second"]);

        for cut in [1, LEN_PREFIX_SIZE + 10, file.len() - 1] {
            let result = decryptor().decrypt_bytes(&file[..cut]);
            assert!(matches!(result, Err(Error::Framing(_))), "cut at {cut}");
        }
    }

    #[test]
    fn test_field_limit_applies() {
        let file = encrypt_chunks(&[b"limited"]);
        let result = decryptor().with_max_field_len(64).decrypt_bytes(&file);

        assert!(matches!(result, Err(Error::Framing(msg)) if msg.contains("exceeds the limit")));
    }

    #[test]
    fn test_unwrapped_key_of_wrong_length_rejected() {
        let (public_key, _) = test_keys::shared();
        let wrapped = RsaCryptoSystem::encrypt(public_key, &[0u8; 16]).unwrap();
        let file = encrypt_frame_bytes(&wrapped);

        let result = decryptor().decrypt_bytes(&file);
        assert!(matches!(result, Err(Error::KeyMismatch(msg)) if msg.contains("16 bytes")));
    }

    fn encrypt_frame_bytes(wrapped_key: &[u8]) -> Vec<u8> {
        encode_frame(wrapped_key, &[0u8; 12], &[0u8; 32]).unwrap()
    }

    #[test]
    fn test_appended_files_decrypt_as_one() {
        let mut file = encrypt_chunks(&[b"day one\n"]);
        file.extend(encrypt_chunks(&[b"day two\n", b"day three\n"]));

        assert_eq!(
            decryptor().decrypt_bytes(&file).unwrap(),
            b"day one\nday two\nday three\n"
        );
    }
}
