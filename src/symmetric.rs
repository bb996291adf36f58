//! 对称加密核心模块
//!
//! 使用一次性密钥材料加密单个帧的缓冲日志数据。

pub mod systems;
pub mod traits;

pub use self::systems::aes_gcm::{AesGcmSystem, AesGcmSystemError};
pub use self::traits::{SymmetricCryptographicSystem, SymmetricKeyMaterial};
