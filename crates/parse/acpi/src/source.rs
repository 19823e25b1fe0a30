//! Seekable byte sources.
//!
//! The real source is physical memory exposed as a pseudo-file (`/dev/mem`),
//! but the engine only ever seeks to an absolute offset and reads. Any
//! `Read + Seek` type is a [`ByteSource`], so tests use an `io::Cursor`.

use std::io::{self, Read, Seek, SeekFrom};

use log::debug;

use crate::AcpiError;

/// A random-access byte device.
pub trait ByteSource {
    /// Position the source at `offset`, returning the resulting position.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the source cannot be positioned.
    fn seek_to(&mut self, offset: u64) -> io::Result<u64>;

    /// Read into `buf` from the current position, returning the number of
    /// bytes read. `Ok(0)` means no more bytes are available.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the read fails.
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<T: Read + Seek> ByteSource for T {
    fn seek_to(&mut self, offset: u64) -> io::Result<u64> {
        self.seek(SeekFrom::Start(offset))
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }
}

/// Seek to `offset` and read exactly `len` bytes into a fresh buffer.
///
/// The source must land exactly on `offset`. The read is issued once: any
/// count below `len` is [`AcpiError::ShortRead`]. Only an interrupted read
/// is reissued.
///
/// # Errors
///
/// [`AcpiError::Seek`], [`AcpiError::Read`] or [`AcpiError::ShortRead`].
pub fn read_exact_at(
    source: &mut impl ByteSource,
    offset: u64,
    len: usize,
) -> Result<Vec<u8>, AcpiError> {
    debug!("seek {offset:#x}, read {len} bytes");
    match source.seek_to(offset) {
        Ok(pos) if pos == offset => {}
        Ok(pos) => {
            debug!("seek to {offset:#x} landed at {pos:#x}");
            return Err(AcpiError::Seek {
                offset,
                source: None,
            });
        }
        Err(e) => {
            return Err(AcpiError::Seek {
                offset,
                source: Some(e),
            });
        }
    }

    let mut buf = vec![0u8; len];
    let actual = loop {
        match source.read_into(&mut buf) {
            Ok(n) => break n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(AcpiError::Read { offset, source: e }),
        }
    };
    if actual < len {
        return Err(AcpiError::ShortRead {
            offset,
            expected: len,
            actual,
        });
    }
    Ok(buf)
}
