//! `rsdp-binparse` --- bounds-checked field extraction from byte slices.
//!
//! Firmware structures are read out of physical memory, so every byte slice
//! handed to a parser is untrusted and may be truncated. Instead of casting a
//! buffer to a packed struct, parsers pull individual fields out at known
//! offsets with [`FromBytes::read_at`], which returns `None` when the field
//! does not fit.
//!
//! All multi-byte integers are little-endian, as in ACPI.
//!
//! ```
//! use rsdp_binparse::FromBytes;
//!
//! let data = [0x46, 0x41, 0x43, 0x50, 0x14, 0x01, 0x00, 0x00];
//! assert_eq!(<[u8; 4]>::read_at(&data, 0), Some(*b"FACP"));
//! assert_eq!(u32::read_at(&data, 4), Some(0x114));
//! assert_eq!(u32::read_at(&data, 6), None);
//! ```

#![warn(missing_docs)]

/// A type that can be decoded from a little-endian byte representation.
pub trait FromBytes: Sized {
    /// Number of bytes occupied by the encoded value.
    const SIZE: usize;

    /// Decode a value from a slice of exactly [`FromBytes::SIZE`] bytes.
    ///
    /// Callers guarantee the length; implementations may return `None`
    /// if it is wrong.
    fn decode(bytes: &[u8]) -> Option<Self>;

    /// Read a value at `offset` within `data`.
    ///
    /// Returns `None` if `offset + SIZE` overflows or runs past the end of
    /// `data`.
    #[must_use]
    fn read_at(data: &[u8], offset: usize) -> Option<Self> {
        let end = offset.checked_add(Self::SIZE)?;
        Self::decode(data.get(offset..end)?)
    }

    /// Read a value from the start of `data`.
    #[must_use]
    fn read_from(data: &[u8]) -> Option<Self> {
        Self::read_at(data, 0)
    }
}

macro_rules! impl_from_bytes_le {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromBytes for $ty {
                const SIZE: usize = core::mem::size_of::<$ty>();

                fn decode(bytes: &[u8]) -> Option<Self> {
                    Some(<$ty>::from_le_bytes(bytes.try_into().ok()?))
                }
            }
        )*
    };
}

impl_from_bytes_le!(u8, u16, u32, u64);

impl<const N: usize> FromBytes for [u8; N] {
    const SIZE: usize = N;

    fn decode(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(u8::read_from(&data), Some(0x01));
        assert_eq!(u16::read_from(&data), Some(0x0201));
        assert_eq!(u32::read_from(&data), Some(0x0403_0201));
        assert_eq!(u64::read_from(&data), Some(0x0807_0605_0403_0201));
    }

    #[test]
    fn unaligned_offsets() {
        let data = [0xff, 0x34, 0x12, 0x00, 0x00];
        assert_eq!(u32::read_at(&data, 1), Some(0x1234));
    }

    #[test]
    fn field_past_end_is_none() {
        let data = [0u8; 8];
        assert_eq!(u64::read_at(&data, 1), None);
        assert_eq!(u32::read_at(&data, 8), None);
        assert_eq!(u8::read_at(&data, 7), Some(0));
    }

    #[test]
    fn offset_overflow_is_none() {
        let data = [0u8; 8];
        assert_eq!(u16::read_at(&data, usize::MAX), None);
        assert_eq!(<[u8; 4]>::read_at(&data, usize::MAX - 1), None);
    }

    #[test]
    fn byte_arrays() {
        let data = *b"RSD PTR \x00";
        assert_eq!(<[u8; 8]>::read_from(&data), Some(*b"RSD PTR "));
        assert_eq!(<[u8; 0]>::read_at(&data, 9), Some([]));
    }
}
