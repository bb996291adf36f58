//! 非对称加密核心模块
//!
//! 负责封装和解封每个日志帧的对称密钥。

pub mod key_format;
pub mod systems;
pub mod traits;

pub use self::key_format::RsaKeyParameters;
pub use self::systems::rsa::{RsaCryptoSystem, RsaSystemError};
pub use self::traits::AsymmetricCryptographicSystem;
