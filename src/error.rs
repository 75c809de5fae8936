use std::io;
use std::sync::Arc;

/// The flat set of ways a core operation can fail.
///
/// There is no hierarchy: every codec and container function reports one of
/// these six kinds, mirroring the `ERROR_*` values of the reference
/// implementation this crate is wire-compatible with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Should never happen in practice; indicates a bug in this crate.
    Internal,
    /// The input ran out of bytes before a value finished decoding.
    EarlyEof,
    /// Decoding succeeded but bytes remain after the top-level value. Soft:
    /// the decoded tree is still returned alongside this error.
    LeftoverData,
    /// The input is structurally invalid (bad tag id, negative length,
    /// non-`End` type terminating an empty list, oversized MCA offset, ...).
    InvalidData,
    /// A bounded write (SNBT printing, `pack_into`) ran out of window space.
    BufferOverflow,
    /// gzip/zlib (de)compression failed.
    UnzipError,
}

/// An error produced by this crate, carrying the byte offset at which it was
/// detected (`0` when no specific offset applies).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind:?} at byte offset {position}")]
pub struct Error {
    kind: ErrorKind,
    position: usize,
    #[source]
    source: Option<SourceError>,
}

#[derive(Debug, Clone, thiserror::Error)]
enum SourceError {
    #[error(transparent)]
    Io(Arc<io::Error>),
}

impl Error {
    pub fn new(kind: ErrorKind, position: usize) -> Self {
        Self { kind, position, source: None }
    }

    pub(crate) fn from_io(kind: ErrorKind, position: usize, err: io::Error) -> Self {
        Self {
            kind,
            position,
            source: Some(SourceError::Io(Arc::new(err))),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

pub type Result<T> = std::result::Result<T, Error>;
