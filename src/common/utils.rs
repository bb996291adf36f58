use std::ops::Deref;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// 自动清零的字节向量，用于对称密钥等敏感数据
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ZeroizingVec(pub Vec<u8>);

impl Deref for ZeroizingVec {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for ZeroizingVec {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for ZeroizingVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ZeroizingVec([REDACTED; {}])", self.0.len())
    }
}

/// 将缓冲区长度转换为帧中的 `u32` 长度前缀
pub(crate) fn checked_len_u32(len: usize, what: &str) -> Option<u32> {
    match u32::try_from(len) {
        Ok(len) => Some(len),
        Err(_) => {
            tracing::debug!(len, field = what, "length does not fit in a u32 prefix");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_does_not_leak_contents() {
        let secret = ZeroizingVec(b"top secret".to_vec());
        let rendered = format!("{secret:?}");

        assert!(!rendered.contains("top secret"));
        assert!(rendered.contains("10"));
    }

    #[test]
    fn test_checked_len_u32() {
        assert_eq!(checked_len_u32(42, "field"), Some(42));
        assert_eq!(checked_len_u32(u32::MAX as usize, "field"), Some(u32::MAX));
        #[cfg(target_pointer_width = "64")]
        assert_eq!(checked_len_u32(u32::MAX as usize + 1, "field"), None);
    }
}
