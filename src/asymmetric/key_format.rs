//! Portable text form of RSA keys.
//!
//! A key blob is a JSON object whose values are big-endian unsigned integers
//! in standard base64:
//!
//! ```json
//! { "Modulus": "...", "Exponent": "AQAB" }
//! ```
//!
//! Private blobs additionally carry `P`, `Q`, `DP`, `DQ`, `InverseQ` and `D`.
//! Public blobs never do.

use crate::asymmetric::systems::rsa::RsaSystemError;
use base64::{Engine, engine::general_purpose};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::common::config::MAX_RSA_KEY_BITS;

/// The serialized parameters of an RSA key.
#[derive(Clone, PartialEq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct RsaKeyParameters {
    #[serde(rename = "Modulus")]
    pub modulus: String,
    #[serde(rename = "Exponent")]
    pub exponent: String,
    #[serde(rename = "P", default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(rename = "Q", default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(rename = "DP", default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    #[serde(rename = "DQ", default, skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    #[serde(rename = "InverseQ", default, skip_serializing_if = "Option::is_none")]
    pub inverse_q: Option<String>,
    #[serde(rename = "D", default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

impl std::fmt::Debug for RsaKeyParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeyParameters")
            .field("modulus", &self.modulus)
            .field("exponent", &self.exponent)
            .field("has_private_parts", &self.has_private_parts())
            .finish()
    }
}

impl RsaKeyParameters {
    pub fn from_public_key(public_key: &RsaPublicKey) -> Self {
        Self {
            modulus: encode_uint(public_key.n()),
            exponent: encode_uint(public_key.e()),
            p: None,
            q: None,
            dp: None,
            dq: None,
            inverse_q: None,
            d: None,
        }
    }

    pub fn from_private_key(private_key: &RsaPrivateKey) -> Result<Self, RsaSystemError> {
        let [p, q] = private_key.primes() else {
            return Err(RsaSystemError::InvalidKey(
                "only two-prime RSA keys can be exported".into(),
            ));
        };

        // CRT values are filled in by `precompute`.
        let mut key = private_key.clone();
        key.precompute()
            .map_err(|e| RsaSystemError::InvalidKey(format!("CRT precomputation failed: {e}")))?;
        let (Some(dp), Some(dq), Some(inverse_q)) = (key.dp(), key.dq(), key.crt_coefficient())
        else {
            return Err(RsaSystemError::InvalidKey("CRT values are unavailable".into()));
        };

        Ok(Self {
            modulus: encode_uint(private_key.n()),
            exponent: encode_uint(private_key.e()),
            p: Some(encode_uint(p)),
            q: Some(encode_uint(q)),
            dp: Some(encode_uint(dp)),
            dq: Some(encode_uint(dq)),
            inverse_q: Some(encode_uint(&inverse_q)),
            d: Some(encode_uint(private_key.d())),
        })
    }

    /// True if any private component is present.
    pub fn has_private_parts(&self) -> bool {
        self.d.is_some()
            || self.p.is_some()
            || self.q.is_some()
            || self.dp.is_some()
            || self.dq.is_some()
            || self.inverse_q.is_some()
    }

    /// Reconstructs the public key. Works on public and private blobs alike.
    pub fn to_public_key(&self) -> Result<RsaPublicKey, RsaSystemError> {
        let n = decode_uint("Modulus", &self.modulus)?;
        let e = decode_uint("Exponent", &self.exponent)?;
        RsaPublicKey::new_with_max_size(n, e, MAX_RSA_KEY_BITS)
            .map_err(|e| RsaSystemError::InvalidKey(format!("invalid public key: {e}")))
    }

    /// Reconstructs and validates the private key, checking the stored CRT
    /// values against the ones derived from `P`, `Q` and `D`.
    pub fn to_private_key(&self) -> Result<RsaPrivateKey, RsaSystemError> {
        let n = decode_uint("Modulus", &self.modulus)?;
        let e = decode_uint("Exponent", &self.exponent)?;
        let d = decode_uint("D", required("D", &self.d)?)?;
        let p = decode_uint("P", required("P", &self.p)?)?;
        let q = decode_uint("Q", required("Q", &self.q)?)?;

        let mut key = RsaPrivateKey::from_components(n, e, d, vec![p, q])
            .map_err(|e| RsaSystemError::InvalidKey(format!("invalid private key: {e}")))?;
        key.validate().map_err(|e| {
            RsaSystemError::InvalidKey(format!("private key failed validation: {e}"))
        })?;
        key.precompute()
            .map_err(|e| RsaSystemError::InvalidKey(format!("CRT precomputation failed: {e}")))?;

        check_crt_value("DP", self.dp.as_deref(), key.dp().cloned())?;
        check_crt_value("DQ", self.dq.as_deref(), key.dq().cloned())?;
        check_crt_value("InverseQ", self.inverse_q.as_deref(), key.crt_coefficient())?;

        Ok(key)
    }

    pub fn to_json(&self) -> Result<String, RsaSystemError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(key_data: &str) -> Result<Self, RsaSystemError> {
        Ok(serde_json::from_str(key_data)?)
    }
}

fn encode_uint(value: &BigUint) -> String {
    general_purpose::STANDARD.encode(value.to_bytes_be())
}

fn decode_uint(field: &str, value: &str) -> Result<BigUint, RsaSystemError> {
    let bytes = general_purpose::STANDARD
        .decode(value.trim())
        .map_err(|e| {
            RsaSystemError::InvalidKey(format!("field {field} is not valid base64: {e}"))
        })?;
    if bytes.is_empty() {
        return Err(RsaSystemError::InvalidKey(format!("field {field} is empty")));
    }
    Ok(BigUint::from_bytes_be(&bytes))
}

fn required<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str, RsaSystemError> {
    value.as_deref().ok_or_else(|| {
        RsaSystemError::InvalidKey(format!("private key blob is missing field {field}"))
    })
}

// Absent CRT fields are tolerated and recomputed; present ones must agree.
fn check_crt_value(
    field: &str,
    stored: Option<&str>,
    derived: Option<BigUint>,
) -> Result<(), RsaSystemError> {
    let Some(stored) = stored else {
        return Ok(());
    };
    let stored = decode_uint(field, stored)?;
    if derived.as_ref() != Some(&stored) {
        return Err(RsaSystemError::InvalidKey(format!(
            "field {field} is inconsistent with the key's primes"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_keys;

    #[test]
    fn test_public_blob_has_no_private_fields() {
        let (public_key, _) = test_keys::shared();
        let json = RsaKeyParameters::from_public_key(public_key).to_json().unwrap();

        assert!(json.contains("\"Modulus\""));
        assert!(json.contains("\"Exponent\""));
        for field in ["\"D\"", "\"P\"", "\"Q\"", "\"DP\"", "\"DQ\"", "\"InverseQ\""] {
            assert!(!json.contains(field), "public blob leaked {field}");
        }
    }

    #[test]
    fn test_private_blob_has_all_fields() {
        let (_, private_key) = test_keys::shared();
        let params = RsaKeyParameters::from_private_key(private_key).unwrap();
        let json = params.to_json().unwrap();

        for field in ["Modulus", "Exponent", "D", "P", "Q", "DP", "DQ", "InverseQ"] {
            assert!(json.contains(&format!("\"{field}\"")), "private blob is missing {field}");
        }
        assert!(params.has_private_parts());
    }

    #[test]
    fn test_private_roundtrip_is_lossless() {
        let (_, private_key) = test_keys::shared();
        let params = RsaKeyParameters::from_private_key(private_key).unwrap();

        let restored = RsaKeyParameters::from_json(&params.to_json().unwrap())
            .unwrap()
            .to_private_key()
            .unwrap();

        assert_eq!(&restored, private_key);
        assert_eq!(RsaKeyParameters::from_private_key(&restored).unwrap(), params);
    }

    #[test]
    fn test_private_blob_yields_public_half() {
        let (public_key, private_key) = test_keys::shared();
        let params = RsaKeyParameters::from_private_key(private_key).unwrap();

        assert_eq!(&params.to_public_key().unwrap(), public_key);
    }

    #[test]
    fn test_missing_private_field_rejected() {
        let (_, private_key) = test_keys::shared();
        let mut params = RsaKeyParameters::from_private_key(private_key).unwrap();
        params.d = None;

        let err = params.to_private_key().unwrap_err();
        assert!(matches!(err, RsaSystemError::InvalidKey(msg) if msg.contains("D")));
    }

    #[test]
    fn test_inconsistent_crt_value_rejected() {
        let (_, private_key) = test_keys::shared();
        let mut params = RsaKeyParameters::from_private_key(private_key).unwrap();
        params.dp = Some(general_purpose::STANDARD.encode([7u8; 16]));

        let err = params.to_private_key().unwrap_err();
        assert!(matches!(err, RsaSystemError::InvalidKey(msg) if msg.contains("DP")));
    }

    #[test]
    fn test_tampered_prime_rejected() {
        let (_, private_key) = test_keys::shared();
        let mut params = RsaKeyParameters::from_private_key(private_key).unwrap();
        std::mem::swap(&mut params.p, &mut params.d);

        assert!(params.to_private_key().is_err());
    }

    #[test]
    fn test_garbage_base64_rejected() {
        let (public_key, _) = test_keys::shared();
        let mut params = RsaKeyParameters::from_public_key(public_key);
        params.modulus = "!!not base64!!".into();

        assert!(matches!(
            params.to_public_key(),
            Err(RsaSystemError::InvalidKey(msg)) if msg.contains("Modulus")
        ));
    }
}
