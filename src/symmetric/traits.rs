use crate::common::errors::Error;
use crate::common::utils::ZeroizingVec;

/// 只保护一个帧的一次性 `(key, nonce)`。
///
/// 释放时自动清零密钥。
#[derive(Clone, Debug)]
pub struct SymmetricKeyMaterial {
    key: ZeroizingVec,
    nonce: Vec<u8>,
}

impl SymmetricKeyMaterial {
    pub fn new(key: Vec<u8>, nonce: Vec<u8>) -> Self {
        Self {
            key: ZeroizingVec(key),
            nonce,
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }
}

/// 对称加密系统的公共特征
pub trait SymmetricCryptographicSystem: Sized {
    /// 密钥的期望长度（以字节为单位）。
    const KEY_SIZE: usize;

    /// 每帧中明文存放的 nonce 长度。
    const NONCE_SIZE: usize;

    /// 该系统的错误类型。
    type Error: std::error::Error + Send + Sync + Into<Error> + 'static;

    /// 从系统随机源生成新的密钥和 nonce。
    fn generate_key_material() -> Result<SymmetricKeyMaterial, Self::Error>;

    /// 使用密钥加密数据。
    fn encrypt(material: &SymmetricKeyMaterial, plaintext: &[u8]) -> Result<Vec<u8>, Self::Error>;

    /// 使用密钥解密数据。
    fn decrypt(material: &SymmetricKeyMaterial, ciphertext: &[u8])
    -> Result<Vec<u8>, Self::Error>;
}
