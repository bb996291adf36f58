//! A minimal log appender that writes entries through a [`FileOpenHook`].

use crate::common::errors::Result;
use crate::hook::{BoxedSink, EncryptingFileHook, FileOpenHook};
use rsa::RsaPublicKey;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const ENCODING: &str = "utf-8";

/// Appends log entries to one file, flushing after every entry.
///
/// With an [`EncryptingFileHook`] each entry becomes exactly one encrypted
/// frame, so a crash loses at most the entry being written.
pub struct EncryptedLogAppender {
    path: PathBuf,
    sink: Option<BoxedSink>,
    entries: u64,
}

impl EncryptedLogAppender {
    /// Opens `path` for appending and encrypts every entry for `public_key`.
    pub fn open(path: impl AsRef<Path>, public_key: RsaPublicKey) -> Result<Self> {
        Self::open_with_hook(path, &EncryptingFileHook::new(public_key))
    }

    /// Opens `path` for appending, letting `hook` replace the raw file sink.
    pub fn open_with_hook<H: FileOpenHook + ?Sized>(
        path: impl AsRef<Path>,
        hook: &H,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let sink = hook.on_file_opened(&path, Box::new(file), ENCODING)?;
        tracing::debug!(path = %path.display(), "opened log appender");

        Ok(Self {
            path,
            sink: Some(sink),
            entries: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries_written(&self) -> u64 {
        self.entries
    }

    /// Writes `entry` as-is and flushes it.
    pub fn append(&mut self, entry: &[u8]) -> Result<()> {
        let sink = self.sink.as_mut().ok_or_else(closed)?;
        sink.write_all(entry)?;
        sink.flush()?;
        self.entries += 1;
        Ok(())
    }

    /// Writes `line` followed by a newline and flushes it.
    pub fn append_line(&mut self, line: &str) -> Result<()> {
        let mut entry = Vec::with_capacity(line.len() + 1);
        entry.extend_from_slice(line.as_bytes());
        entry.push(b'\n');
        self.append(&entry)
    }

    /// Flushes and releases the file. Safe to call again.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut sink) = self.sink.take() {
            sink.flush()?;
            tracing::debug!(
                path = %self.path.display(),
                entries = self.entries,
                "closed log appender"
            );
        }
        Ok(())
    }
}

fn closed() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::BrokenPipe, "log appender is closed")
}

impl Drop for EncryptedLogAppender {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(path = %self.path.display(), error = %e, "closing log appender failed");
        }
    }
}
