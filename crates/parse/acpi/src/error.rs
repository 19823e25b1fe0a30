//! Error taxonomy for table discovery and dumping.

use std::io;

use serde::Serialize;

/// Errors that can occur while locating, reading or persisting ACPI tables.
///
/// Every variant carries the physical offset (or artifact name) it concerns
/// so a failure can be diagnosed from the report alone.
#[derive(Debug, thiserror::Error)]
pub enum AcpiError {
    /// The source could not be positioned at the requested offset.
    #[error("cannot seek to {offset:#x}")]
    Seek {
        /// Offset that was requested.
        offset: u64,
        /// Underlying I/O error, if the seek failed outright rather than
        /// landing at a different position.
        #[source]
        source: Option<io::Error>,
    },
    /// The source reported an I/O error while reading.
    #[error("read error at {offset:#x}")]
    Read {
        /// Offset the read started at.
        offset: u64,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Fewer bytes were available than requested.
    #[error("short read at {offset:#x}: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Offset the read started at.
        offset: u64,
        /// Number of bytes requested.
        expected: usize,
        /// Number of bytes actually returned.
        actual: usize,
    },
    /// The root descriptor did not start with `"RSD PTR "`.
    #[error("no root descriptor at {offset:#x}: found signature {:?}", String::from_utf8_lossy(.found))]
    SignatureMismatch {
        /// Offset of the candidate descriptor.
        offset: u64,
        /// The eight bytes found where the signature was expected.
        found: [u8; 8],
    },
    /// A declared length is too small or implausibly large.
    #[error("implausible length {length} at {offset:#x}")]
    InvalidLength {
        /// Offset of the structure declaring the length.
        offset: u64,
        /// The declared length.
        length: u32,
    },
    /// The byte sum of a structure was not zero.
    #[error("checksum mismatch at {offset:#x}: bytes sum to {sum:#04x}")]
    ChecksumMismatch {
        /// Offset of the structure.
        offset: u64,
        /// The (nonzero) byte sum modulo 256.
        sum: u8,
    },
    /// The sink failed to persist an artifact.
    #[error("cannot write {name}")]
    SinkWrite {
        /// Artifact name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Discriminant of an [`AcpiError`], suitable for reports and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// See [`AcpiError::Seek`].
    SeekError,
    /// See [`AcpiError::Read`].
    ReadError,
    /// See [`AcpiError::ShortRead`].
    ShortRead,
    /// See [`AcpiError::SignatureMismatch`].
    SignatureMismatch,
    /// See [`AcpiError::InvalidLength`].
    InvalidLength,
    /// See [`AcpiError::ChecksumMismatch`].
    ChecksumMismatch,
    /// See [`AcpiError::SinkWrite`].
    SinkWriteError,
}

impl AcpiError {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Seek { .. } => ErrorKind::SeekError,
            Self::Read { .. } => ErrorKind::ReadError,
            Self::ShortRead { .. } => ErrorKind::ShortRead,
            Self::SignatureMismatch { .. } => ErrorKind::SignatureMismatch,
            Self::InvalidLength { .. } => ErrorKind::InvalidLength,
            Self::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            Self::SinkWrite { .. } => ErrorKind::SinkWriteError,
        }
    }
}
