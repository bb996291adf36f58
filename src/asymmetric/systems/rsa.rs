//! `RsaCryptoSystem` 提供了基于 RSA-OAEP (SHA-256) 的非对称加解密功能。
//! 在 `seal-log` 中，它只用于封装每个日志帧的对称密钥。

use crate::asymmetric::key_format::RsaKeyParameters;
use crate::asymmetric::traits::AsymmetricCryptographicSystem;
use crate::common::config::{CryptoConfig, validate_rsa_key_bits};
use rsa::rand_core::OsRng as RsaOsRng;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use thiserror::Error;

/// RSA 系统的独立错误类型
#[derive(Error, Debug)]
pub enum RsaSystemError {
    #[error("RSA key generation failed: {0}")]
    KeyGeneration(#[source] rsa::Error),

    #[error("unsupported RSA key size: {0}")]
    KeySize(String),

    #[error("RSA encryption failed: {0}")]
    Encryption(#[source] rsa::Error),

    #[error("RSA decryption failed: {0}")]
    Decryption(#[source] rsa::Error),

    #[error("invalid RSA key: {0}")]
    InvalidKey(String),

    #[error("key blob serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// RSA加密系统实现
///
/// 使用 OAEP (SHA-256) 填充封装密钥。
#[derive(Debug)]
pub struct RsaCryptoSystem;

fn oaep() -> Oaep {
    Oaep::new::<Sha256>()
}

impl AsymmetricCryptographicSystem for RsaCryptoSystem {
    type PublicKey = RsaPublicKey;
    type PrivateKey = RsaPrivateKey;
    type Error = RsaSystemError;

    fn generate_keypair(
        config: &CryptoConfig,
    ) -> Result<(Self::PublicKey, Self::PrivateKey), Self::Error> {
        let bits = config.rsa_key_bits;
        validate_rsa_key_bits(bits).map_err(|e| RsaSystemError::KeySize(e.to_string()))?;

        let mut rsa_rng = RsaOsRng;
        let private_key =
            RsaPrivateKey::new(&mut rsa_rng, bits).map_err(RsaSystemError::KeyGeneration)?;
        let public_key = RsaPublicKey::from(&private_key);
        tracing::debug!(bits, "generated RSA key pair");

        Ok((public_key, private_key))
    }

    fn public_key_of(private_key: &Self::PrivateKey) -> Self::PublicKey {
        RsaPublicKey::from(private_key)
    }

    fn encrypt(public_key: &Self::PublicKey, plaintext: &[u8]) -> Result<Vec<u8>, Self::Error> {
        let mut rng = RsaOsRng;
        public_key
            .encrypt(&mut rng, oaep(), plaintext)
            .map_err(RsaSystemError::Encryption)
    }

    fn decrypt(private_key: &Self::PrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>, Self::Error> {
        private_key
            .decrypt(oaep(), ciphertext)
            .map_err(RsaSystemError::Decryption)
    }

    fn export_public_key(public_key: &Self::PublicKey) -> Result<String, Self::Error> {
        RsaKeyParameters::from_public_key(public_key).to_json()
    }

    fn export_private_key(private_key: &Self::PrivateKey) -> Result<String, Self::Error> {
        RsaKeyParameters::from_private_key(private_key)?.to_json()
    }

    fn import_public_key(key_data: &str) -> Result<Self::PublicKey, Self::Error> {
        RsaKeyParameters::from_json(key_data)?.to_public_key()
    }

    fn import_private_key(key_data: &str) -> Result<Self::PrivateKey, Self::Error> {
        let params = RsaKeyParameters::from_json(key_data)?;
        if params.d.is_none() {
            return Err(RsaSystemError::InvalidKey(
                "blob holds a public key only; a private key is required".into(),
            ));
        }
        params.to_private_key()
    }
}
