//! Adapter between a log writer's file-open event and the encrypting stream.
//!
//! Logging frameworks that open their own files usually expose a callback
//! that may replace the raw file handle before any byte is written. This
//! module models that callback as [`FileOpenHook`].

use crate::common::errors::Result;
use crate::stream::EncryptingAppendStream;
use rsa::RsaPublicKey;
use std::io::Write;
use std::path::Path;

/// A boxed byte sink handed between a log writer and its hook.
pub type BoxedSink = Box<dyn Write + Send>;

/// Called once every time a log file is opened for writing.
///
/// The returned sink replaces `raw_sink` for all subsequent writes.
/// `encoding` is the text encoding the writer will use; hooks that only
/// deal in bytes can ignore it.
pub trait FileOpenHook: Send + Sync {
    fn on_file_opened(
        &self,
        path: &Path,
        raw_sink: BoxedSink,
        encoding: &str,
    ) -> Result<BoxedSink>;
}

impl<F> FileOpenHook for F
where
    F: Fn(&Path, BoxedSink, &str) -> Result<BoxedSink> + Send + Sync,
{
    fn on_file_opened(
        &self,
        path: &Path,
        raw_sink: BoxedSink,
        encoding: &str,
    ) -> Result<BoxedSink> {
        self(path, raw_sink, encoding)
    }
}

/// Wraps every opened file in an [`EncryptingAppendStream`] for one recipient.
#[derive(Clone, Debug)]
pub struct EncryptingFileHook {
    public_key: RsaPublicKey,
}

impl EncryptingFileHook {
    pub fn new(public_key: RsaPublicKey) -> Self {
        Self { public_key }
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }
}

impl FileOpenHook for EncryptingFileHook {
    fn on_file_opened(
        &self,
        path: &Path,
        raw_sink: BoxedSink,
        encoding: &str,
    ) -> Result<BoxedSink> {
        tracing::debug!(path = %path.display(), encoding, "encrypting log file");
        Ok(Box::new(EncryptingAppendStream::new(raw_sink, self.public_key.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_keys;
    use crate::decryptor::LogFileDecryptor;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_encrypting_hook_wraps_sink() {
        let (public_key, private_key) = test_keys::shared();
        let hook = EncryptingFileHook::new(public_key.clone());
        assert_eq!(hook.public_key(), public_key);
        let raw = SharedSink::default();

        let mut sink = hook
            .on_file_opened(Path::new("app.log"), Box::new(raw.clone()), "utf-8")
            .unwrap();
        sink.write_all(b"through the hook").unwrap();
        sink.flush().unwrap();
        drop(sink);

        let file = raw.0.lock().unwrap().clone();
        assert_ne!(file, b"through the hook");
        assert_eq!(
            LogFileDecryptor::new(private_key).decrypt_bytes(&file).unwrap(),
            b"through the hook"
        );
    }

    #[test]
    fn test_closure_hook() {
        let hook = |_: &Path, raw: BoxedSink, encoding: &str| -> Result<BoxedSink> {
            assert_eq!(encoding, "utf-8");
            Ok(raw)
        };
        let raw = SharedSink::default();

        let mut sink = hook
            .on_file_opened(Path::new("plain.log"), Box::new(raw.clone()), "utf-8")
            .unwrap();
        sink.write_all(b"untouched").unwrap();

        assert_eq!(raw.0.lock().unwrap().as_slice(), b"untouched");
    }
}
