//! Cooperative cancellation of a running extraction.
//!
//! A [`Cancellation`] is a shared flag. Whoever owns the process (the CLI's
//! signal handlers) raises it; the extractor and the prompt check it at
//! blocking points and unwind with `SealError::Interrupted`, so every drop
//! guard still runs.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, SealError};

/// Shared "stop now" flag.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    ///
    /// Only performs an atomic store, so it is safe to call from a signal
    /// handler.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(SealError::Interrupted)` once the flag is raised.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(SealError::Interrupted);
        }
        Ok(())
    }

    /// Wrap `inner` so reads fail as soon as the flag is raised.
    pub fn reader<R: Read>(&self, inner: R) -> CancellableReader<R> {
        CancellableReader {
            inner,
            cancellation: self.clone(),
        }
    }
}

/// A reader that stops yielding data once its [`Cancellation`] fires.
///
/// The failure is reported as `ErrorKind::Other` rather than `Interrupted`,
/// since `Read::read_exact` and `io::copy` retry the latter.
#[derive(Debug)]
pub struct CancellableReader<R> {
    inner: R,
    cancellation: Cancellation,
}

impl<R: Read> Read for CancellableReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.cancellation.is_cancelled() {
            return Err(io::Error::other("extraction cancelled"));
        }
        self.inner.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let cancellation = Cancellation::new();
        let handle = cancellation.clone();
        assert!(cancellation.check().is_ok());

        handle.cancel();

        assert!(cancellation.is_cancelled());
        assert!(matches!(cancellation.check(), Err(SealError::Interrupted)));
    }

    #[test]
    fn test_reader_stops_after_cancel() {
        let cancellation = Cancellation::new();
        let mut reader = cancellation.reader(&b"abcdef"[..]);

        let mut buf = [0u8; 3];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"abc");

        cancellation.cancel();
        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }
}
