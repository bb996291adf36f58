//!
//! 集成测试的通用辅助函数
//!

#![allow(dead_code)]

use rsa::{RsaPrivateKey, RsaPublicKey};
use seal_log::asymmetric::{AsymmetricCryptographicSystem, RsaCryptoSystem};
use seal_log::{KeyPairBlobs, KeyPairGenerator};
use std::sync::OnceLock;

/// A 2048-bit pair generated once per test binary through the public key-pair generator.
pub fn shared_blobs() -> &'static KeyPairBlobs {
    static BLOBS: OnceLock<KeyPairBlobs> = OnceLock::new();
    BLOBS.get_or_init(|| KeyPairGenerator::generate(2048).unwrap())
}

/// The shared pair, imported back into key objects.
pub fn shared_keys() -> (RsaPublicKey, RsaPrivateKey) {
    let blobs = shared_blobs();
    (
        RsaCryptoSystem::import_public_key(&blobs.public_key).unwrap(),
        RsaCryptoSystem::import_private_key(&blobs.private_key).unwrap(),
    )
}
