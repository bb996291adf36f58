//! AES-GCM 对称加密实现
use crate::symmetric::traits::{SymmetricCryptographicSystem, SymmetricKeyMaterial};
use aes_gcm::aead::{self, Aead, Error as AeadError, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use thiserror::Error;

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;
pub(crate) const TAG_SIZE: usize = 16; // AES-GCM 认证标签长度

/// AES-GCM 系统的独立错误类型
#[derive(Error, Debug)]
pub enum AesGcmSystemError {
    #[error("Invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("Invalid nonce size: expected {expected}, got {actual}")]
    InvalidNonceSize { expected: usize, actual: usize },

    #[error("Encryption failed: {0}")]
    EncryptionFailed(AeadError),

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Ciphertext is malformed or truncated: {0}")]
    MalformedCiphertext(String),
}

/// AES-256-GCM 对称加密系统
///
/// 密文格式为 `加密数据 || 16 字节认证标签`，nonce 单独存放在帧中。
#[derive(Debug)]
pub struct AesGcmSystem;

impl AesGcmSystem {
    fn cipher(
        material: &SymmetricKeyMaterial,
    ) -> Result<(Aes256Gcm, aead::Nonce<Aes256Gcm>), AesGcmSystemError> {
        if material.key().len() != KEY_SIZE {
            return Err(AesGcmSystemError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: material.key().len(),
            });
        }
        if material.nonce().len() != NONCE_SIZE {
            return Err(AesGcmSystemError::InvalidNonceSize {
                expected: NONCE_SIZE,
                actual: material.nonce().len(),
            });
        }
        let key = aes_gcm::Key::<Aes256Gcm>::from_slice(material.key());
        Ok((Aes256Gcm::new(key), *Nonce::from_slice(material.nonce())))
    }
}

impl SymmetricCryptographicSystem for AesGcmSystem {
    const KEY_SIZE: usize = KEY_SIZE;
    const NONCE_SIZE: usize = NONCE_SIZE;
    type Error = AesGcmSystemError;

    fn generate_key_material() -> Result<SymmetricKeyMaterial, Self::Error> {
        let key = Aes256Gcm::generate_key(OsRng);
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        Ok(SymmetricKeyMaterial::new(key.to_vec(), nonce.to_vec()))
    }

    fn encrypt(material: &SymmetricKeyMaterial, plaintext: &[u8]) -> Result<Vec<u8>, Self::Error> {
        let (cipher, nonce) = Self::cipher(material)?;
        cipher
            .encrypt(&nonce, plaintext)
            .map_err(AesGcmSystemError::EncryptionFailed)
    }

    fn decrypt(
        material: &SymmetricKeyMaterial,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, Self::Error> {
        if ciphertext.len() < TAG_SIZE {
            return Err(AesGcmSystemError::MalformedCiphertext(format!(
                "ciphertext of {} bytes is shorter than the {TAG_SIZE}-byte tag",
                ciphertext.len()
            )));
        }
        let (cipher, nonce) = Self::cipher(material)?;
        cipher
            .decrypt(&nonce, ciphertext)
            .map_err(|_| AesGcmSystemError::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_material() {
        let material = AesGcmSystem::generate_key_material().unwrap();
        assert_eq!(material.key().len(), KEY_SIZE);
        assert_eq!(material.nonce().len(), NONCE_SIZE);

        let other = AesGcmSystem::generate_key_material().unwrap();
        assert_ne!(material.key(), other.key());
        assert_ne!(material.nonce(), other.nonce());
    }

    #[test]
    fn test_encrypt_decrypt_success() {
        let material = AesGcmSystem::generate_key_material().unwrap();
        let plaintext = b"this is a secret message";

        let ciphertext = AesGcmSystem::encrypt(&material, plaintext).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len() + TAG_SIZE);

        let decrypted_plaintext = AesGcmSystem::decrypt(&material, &ciphertext).unwrap();
        assert_eq!(plaintext, decrypted_plaintext.as_slice());
    }

    #[test]
    fn test_decrypt_wrong_key() {
        let material = AesGcmSystem::generate_key_material().unwrap();
        let other = AesGcmSystem::generate_key_material().unwrap();
        let wrong = SymmetricKeyMaterial::new(other.key().to_vec(), material.nonce().to_vec());

        let ciphertext = AesGcmSystem::encrypt(&material, b"this is another secret").unwrap();
        let result = AesGcmSystem::decrypt(&wrong, &ciphertext);

        assert!(matches!(result, Err(AesGcmSystemError::DecryptionFailed)));
    }

    #[test]
    fn test_decrypt_tampered_ciphertext() {
        let material = AesGcmSystem::generate_key_material().unwrap();
        let mut ciphertext =
            AesGcmSystem::encrypt(&material, b"secret message, do not tamper").unwrap();

        // 篡改密文部分
        ciphertext[0] ^= 0xff;

        let result = AesGcmSystem::decrypt(&material, &ciphertext);
        assert!(matches!(result, Err(AesGcmSystemError::DecryptionFailed)));
    }

    #[test]
    fn test_decrypt_tampered_nonce() {
        let material = AesGcmSystem::generate_key_material().unwrap();
        let ciphertext = AesGcmSystem::encrypt(&material, b"nonce matters").unwrap();

        let mut nonce = material.nonce().to_vec();
        nonce[0] ^= 0x01;
        let shifted = SymmetricKeyMaterial::new(material.key().to_vec(), nonce);

        assert!(matches!(
            AesGcmSystem::decrypt(&shifted, &ciphertext),
            Err(AesGcmSystemError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_invalid_material_sizes() {
        let short_key = SymmetricKeyMaterial::new(vec![0u8; 16], vec![0u8; NONCE_SIZE]);
        assert!(matches!(
            AesGcmSystem::encrypt(&short_key, b"data"),
            Err(AesGcmSystemError::InvalidKeySize { expected: 32, actual: 16 })
        ));

        let long_nonce = SymmetricKeyMaterial::new(vec![0u8; KEY_SIZE], vec![0u8; 24]);
        assert!(matches!(
            AesGcmSystem::encrypt(&long_nonce, b"data"),
            Err(AesGcmSystemError::InvalidNonceSize { expected: 12, actual: 24 })
        ));
    }

    #[test]
    fn test_decrypt_too_short_ciphertext() {
        let material = AesGcmSystem::generate_key_material().unwrap();
        let result = AesGcmSystem::decrypt(&material, &[0u8; TAG_SIZE - 1]);
        assert!(matches!(
            result,
            Err(AesGcmSystemError::MalformedCiphertext(e)) if e.contains("shorter")
        ));
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let material = AesGcmSystem::generate_key_material().unwrap();

        let ciphertext = AesGcmSystem::encrypt(&material, b"").unwrap();
        assert_eq!(ciphertext.len(), TAG_SIZE);
        assert!(AesGcmSystem::decrypt(&material, &ciphertext).unwrap().is_empty());
    }
}
