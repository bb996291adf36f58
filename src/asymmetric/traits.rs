//! 定义了非对称加密系统的核心 Trait。
use crate::common::config::CryptoConfig;
use crate::common::errors::Error;
use std::fmt::Debug;

/// `AsymmetricCryptographicSystem` 定义了非对称加密算法必须实现的核心功能。
///
/// 在 `seal-log` 中，非对称算法只用于封装每帧的对称密钥，日志数据本身不经过它。
pub trait AsymmetricCryptographicSystem: Sized {
    /// 公钥类型
    type PublicKey: Clone + Debug;

    /// 私钥类型
    type PrivateKey: Clone;

    /// 错误类型
    type Error: std::error::Error + Send + Sync + Into<Error> + 'static;

    /// 生成密钥对
    fn generate_keypair(
        config: &CryptoConfig,
    ) -> Result<(Self::PublicKey, Self::PrivateKey), Self::Error>;

    /// 由私钥推导出公钥
    fn public_key_of(private_key: &Self::PrivateKey) -> Self::PublicKey;

    /// 使用公钥加密单个数据块（通常是对称密钥）。
    fn encrypt(public_key: &Self::PublicKey, plaintext: &[u8]) -> Result<Vec<u8>, Self::Error>;

    /// 使用私钥解密单个数据块（通常是对称密钥）。
    fn decrypt(private_key: &Self::PrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>, Self::Error>;

    /// 将公钥导出为标准格式
    fn export_public_key(public_key: &Self::PublicKey) -> Result<String, Self::Error>;

    /// 将私钥导出为标准格式
    fn export_private_key(private_key: &Self::PrivateKey) -> Result<String, Self::Error>;

    /// 从标准格式导入公钥
    fn import_public_key(key_data: &str) -> Result<Self::PublicKey, Self::Error>;

    /// 从标准格式导入私钥
    fn import_private_key(key_data: &str) -> Result<Self::PrivateKey, Self::Error>;
}
