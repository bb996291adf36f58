//! Key-pair generation and key files.

use crate::asymmetric::systems::rsa::RsaCryptoSystem;
use crate::asymmetric::traits::AsymmetricCryptographicSystem;
use crate::common::config::{CryptoConfig, validate_rsa_key_bits};
use crate::common::errors::{Error, Result};
use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// File name of the exported public key.
pub const PUBLIC_KEY_FILE: &str = "public_key.json";
/// File name of the exported private key.
pub const PRIVATE_KEY_FILE: &str = "private_key.json";

/// The two exported halves of a freshly generated key pair.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyPairBlobs {
    pub public_key: String,
    pub private_key: String,
}

impl std::fmt::Debug for KeyPairBlobs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPairBlobs")
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Where [`KeyPairBlobs::write_to_dir`] put the key files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyFilePaths {
    pub public_key: PathBuf,
    pub private_key: PathBuf,
}

impl KeyPairBlobs {
    /// Writes both blobs into `dir`, creating it if needed. The private key
    /// file is readable by its owner only on Unix.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<KeyFilePaths> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let paths = KeyFilePaths {
            public_key: dir.join(PUBLIC_KEY_FILE),
            private_key: dir.join(PRIVATE_KEY_FILE),
        };
        fs::write(&paths.public_key, &self.public_key)?;
        write_private(&paths.private_key, &self.private_key)?;

        tracing::info!(
            public_key = %paths.public_key.display(),
            private_key = %paths.private_key.display(),
            "wrote key pair"
        );
        Ok(paths)
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600) // -rw-------
        .open(path)?;
    // `mode` only applies to newly created files.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

/// Produces independent key pairs serialized in the key interchange format.
pub struct KeyPairGenerator<A: AsymmetricCryptographicSystem = RsaCryptoSystem> {
    config: CryptoConfig,
    _system: PhantomData<A>,
}

impl KeyPairGenerator {
    /// Generates an RSA key pair of `key_size_bits`.
    pub fn generate(key_size_bits: usize) -> Result<KeyPairBlobs> {
        Self::with_config(&CryptoConfig::default().with_rsa_key_bits(key_size_bits))
            .generate_default()
    }

    pub fn with_config(config: &CryptoConfig) -> Self {
        Self::for_system(config.clone())
    }
}

impl<A: AsymmetricCryptographicSystem> KeyPairGenerator<A> {
    pub fn for_system(config: CryptoConfig) -> Self {
        Self {
            config,
            _system: PhantomData,
        }
    }

    /// Generates a fresh pair using the configured key size. Nothing is cached
    /// between calls.
    pub fn generate_default(&self) -> Result<KeyPairBlobs> {
        validate_rsa_key_bits(self.config.rsa_key_bits)?;
        let (public_key, private_key) =
            A::generate_keypair(&self.config).map_err(Into::<Error>::into)?;

        Ok(KeyPairBlobs {
            public_key: A::export_public_key(&public_key).map_err(Into::<Error>::into)?,
            private_key: A::export_private_key(&private_key).map_err(Into::<Error>::into)?,
        })
    }
}
