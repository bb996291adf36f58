//!
//! # 通用配置模块
//!
//! 密钥生成、加密流和解密器共用的参数。
//! 从 JSON 文件加载，所有字段均可省略并回退到默认值。
//!
use crate::common::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 新密钥对允许的最小 RSA 模数位数
pub const MIN_RSA_KEY_BITS: usize = 1024;
/// 新密钥对允许的最大 RSA 模数位数
pub const MAX_RSA_KEY_BITS: usize = 4096;

/// 单个帧字段长度前缀的默认上限（64 MiB）
pub const DEFAULT_MAX_FIELD_LEN: u32 = 64 * 1024 * 1024;

const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// 加密配置
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CryptoConfig {
    /// RSA密钥位数
    pub rsa_key_bits: usize,
    /// 解码器接受的最大字段长度（字节）
    pub max_field_len: u32,
    /// 加密流明文缓冲区的初始容量
    pub initial_buffer_capacity: usize,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            rsa_key_bits: 2048,
            max_field_len: DEFAULT_MAX_FIELD_LEN,
            initial_buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl CryptoConfig {
    /// 读取并校验配置文件
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 返回使用新 RSA 密钥位数的配置
    pub fn with_rsa_key_bits(mut self, bits: usize) -> Self {
        self.rsa_key_bits = bits;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_rsa_key_bits(self.rsa_key_bits)?;
        if self.max_field_len == 0 {
            return Err(Error::Config("max_field_len must be greater than zero".into()));
        }
        Ok(())
    }
}

pub(crate) fn validate_rsa_key_bits(bits: usize) -> Result<()> {
    if !(MIN_RSA_KEY_BITS..=MAX_RSA_KEY_BITS).contains(&bits) {
        return Err(Error::Config(format!(
            "RSA key size must be {MIN_RSA_KEY_BITS}..={MAX_RSA_KEY_BITS} bits, got {bits}"
        )));
    }
    if bits % 8 != 0 {
        return Err(Error::Config(format!(
            "RSA key size must be a multiple of 8 bits, got {bits}"
        )));
    }
    Ok(())
}
