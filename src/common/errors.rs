use crate::asymmetric::systems::rsa::RsaSystemError;
use crate::symmetric::systems::aes_gcm::AesGcmSystemError;
use thiserror::Error;

/// 加密日志操作可能遇到的错误类型
#[derive(Error, Debug)]
pub enum Error {
    /// 在只写流上执行读取、定位或查询位置
    #[error("operation `{0}` is not supported on a write-only encrypting stream")]
    Unsupported(&'static str),

    #[error("malformed frame: {0}")]
    Framing(String),

    /// 无法用给定私钥解开封装的对称密钥
    #[error("wrapped key could not be unwrapped (wrong private key or corrupted data): {0}")]
    KeyMismatch(String),

    #[error("frame payload failed authentication")]
    PayloadAuthentication,

    #[error("invalid key material: {0}")]
    Key(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("RSA error: {0}")]
    Rsa(#[from] RsaSystemError),

    #[error("AES-GCM error: {0}")]
    AesGcm(#[from] AesGcmSystemError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error (JSON): {0}")]
    Json(#[from] serde_json::Error),
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(inner) => inner,
            Error::Unsupported(_) => std::io::Error::new(std::io::ErrorKind::Unsupported, err),
            other => std::io::Error::other(other),
        }
    }
}

/// 全局结果类型
pub type Result<T, E = Error> = std::result::Result<T, E>;
