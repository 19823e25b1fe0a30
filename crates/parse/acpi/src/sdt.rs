//! System Description Table (SDT) header, checksum and table materialization.

use log::{debug, info};
use rsdp_binparse::FromBytes;
use serde::Serialize;

use crate::AcpiError;
use crate::source::{ByteSource, read_exact_at};

/// Default ceiling on a declared table length: 16 MiB.
///
/// Real tables are a few KiB (a large DSDT rarely exceeds a few hundred).
/// Anything larger is treated as corrupt rather than allocated.
pub const DEFAULT_MAX_TABLE_LENGTH: u32 = 16 * 1024 * 1024;

/// Bounds applied to values read from untrusted memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest declared table length that will be read.
    pub max_table_length: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_table_length: DEFAULT_MAX_TABLE_LENGTH,
        }
    }
}

/// Standard ACPI System Description Table header.
///
/// This 36-byte header is present at the start of every ACPI table
/// (XSDT, FADT, DSDT, MADT, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdtHeader {
    /// 4-byte ASCII signature identifying the table type.
    pub signature: [u8; 4],
    /// Total length of the table, including the header, in bytes.
    pub length: u32,
    /// Revision of the table structure.
    pub revision: u8,
    /// Checksum byte. The entire table, including the header, must sum to zero.
    pub checksum: u8,
    /// OEM-supplied identification string.
    pub oem_id: [u8; 6],
    /// OEM-supplied table identification string.
    pub oem_table_id: [u8; 8],
    /// OEM-supplied revision number.
    pub oem_revision: u32,
    /// Vendor ID of the utility that created the table.
    pub creator_id: u32,
    /// Revision of the utility that created the table.
    pub creator_revision: u32,
}

impl SdtHeader {
    /// The size of an SDT header in bytes.
    pub const SIZE: usize = 36;

    /// Parse a header from the start of `data`.
    ///
    /// Returns `None` if the slice is shorter than [`SdtHeader::SIZE`] bytes.
    #[must_use]
    pub fn parse(data: &[u8]) -> Option<Self> {
        Some(Self {
            signature: FromBytes::read_at(data, 0)?,
            length: u32::read_at(data, 4)?,
            revision: u8::read_at(data, 8)?,
            checksum: u8::read_at(data, 9)?,
            oem_id: FromBytes::read_at(data, 10)?,
            oem_table_id: FromBytes::read_at(data, 16)?,
            oem_revision: u32::read_at(data, 24)?,
            creator_id: u32::read_at(data, 28)?,
            creator_revision: u32::read_at(data, 32)?,
        })
    }

    /// Returns the signature as text, with non-UTF-8 bytes replaced.
    #[must_use]
    pub fn signature_str(&self) -> String {
        String::from_utf8_lossy(&self.signature).into_owned()
    }

    /// Returns the OEM ID as text, trailing padding removed.
    #[must_use]
    pub fn oem_id_str(&self) -> String {
        String::from_utf8_lossy(trim_padding(&self.oem_id)).into_owned()
    }
}

/// Sum every byte of `data` modulo 256.
#[must_use]
pub fn byte_sum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Validate the checksum of a byte slice.
///
/// ACPI tables are designed so that the sum of all bytes in the table equals
/// zero (mod 256). This function computes that sum and returns `true` when
/// the checksum is valid.
#[must_use]
pub fn validate_checksum(data: &[u8]) -> bool {
    byte_sum(data) == 0
}

/// A table read from the source whose checksum has been validated.
///
/// `data` holds the complete table (header included), exactly as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Offset the table was read from.
    pub offset: u64,
    /// The parsed header.
    pub header: SdtHeader,
    /// The full table bytes.
    pub data: Vec<u8>,
}

impl Table {
    /// Returns the table signature.
    #[must_use]
    pub fn signature(&self) -> [u8; 4] {
        self.header.signature
    }

    /// Returns the table length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the table holds no bytes, which a validated table
    /// never does.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The bytes following the header.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        self.data.get(SdtHeader::SIZE..).unwrap_or(&[])
    }

    /// A serializable description of this table.
    #[must_use]
    pub fn summary(&self) -> TableSummary {
        TableSummary {
            offset: self.offset,
            signature: self.header.signature_str(),
            length: self.header.length,
            revision: self.header.revision,
            oem_id: self.header.oem_id_str(),
        }
    }
}

/// What the report records about a successfully dumped table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    /// Offset the table was read from.
    pub offset: u64,
    /// Signature, lossily decoded.
    pub signature: String,
    /// Declared (and read) length.
    pub length: u32,
    /// Table revision.
    pub revision: u8,
    /// OEM ID, trailing padding removed.
    pub oem_id: String,
}

/// Reads and validates the ACPI table at `offset` with default [`Limits`].
///
/// # Errors
///
/// See [`materialize_table_with`].
pub fn materialize_table(source: &mut impl ByteSource, offset: u64) -> Result<Table, AcpiError> {
    materialize_table_with(source, offset, &Limits::default())
}

/// Reads and validates the ACPI table at `offset`.
///
/// Performs the standard table loading sequence:
/// 1. Read the SDT header to learn the table length
/// 2. Reject lengths below the header size or above `limits`
/// 3. Re-read the full table from the same offset
/// 4. Validate the checksum over the whole buffer
///
/// # Errors
///
/// [`AcpiError::Seek`], [`AcpiError::Read`] or [`AcpiError::ShortRead`] if
/// the source cannot supply the bytes, [`AcpiError::InvalidLength`] for an
/// implausible length, [`AcpiError::ChecksumMismatch`] if the bytes do not
/// sum to zero.
pub fn materialize_table_with(
    source: &mut impl ByteSource,
    offset: u64,
    limits: &Limits,
) -> Result<Table, AcpiError> {
    let header_data = read_exact_at(source, offset, SdtHeader::SIZE)?;
    let header = SdtHeader::parse(&header_data).ok_or(AcpiError::ShortRead {
        offset,
        expected: SdtHeader::SIZE,
        actual: header_data.len(),
    })?;
    debug!(
        "header at {offset:#x}: signature {:?}, length {}",
        header.signature_str(),
        header.length
    );

    if (header.length as usize) < SdtHeader::SIZE || header.length > limits.max_table_length {
        return Err(AcpiError::InvalidLength {
            offset,
            length: header.length,
        });
    }

    // The source cannot peek, so the header is read a second time as part
    // of the full table.
    let data = read_exact_at(source, offset, header.length as usize)?;
    let sum = byte_sum(&data);
    if sum != 0 {
        return Err(AcpiError::ChecksumMismatch { offset, sum });
    }

    // Parse again from the buffer actually validated, in case the backing
    // memory changed between the two reads.
    let header = SdtHeader::parse(&data).ok_or(AcpiError::ShortRead {
        offset,
        expected: SdtHeader::SIZE,
        actual: data.len(),
    })?;
    if header.length as usize != data.len() {
        return Err(AcpiError::InvalidLength {
            offset,
            length: header.length,
        });
    }

    info!(
        "checksum correct for {} at {offset:#x}, size {}",
        header.signature_str(),
        header.length
    );
    Ok(Table {
        offset,
        header,
        data,
    })
}

/// Strip trailing space and NUL padding.
pub(crate) fn trim_padding(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |i| i + 1);
    &bytes[..end]
}

/// Output file name for a table with the given signature: `<SIG>.tbl`.
///
/// Trailing padding is trimmed. Bytes that could not appear in a sane file
/// name (path separators, dots, control bytes, non-ASCII) become `_`.
#[must_use]
pub fn artifact_name(signature: &[u8; 4]) -> String {
    let trimmed = trim_padding(signature);
    let mut name: String = if trimmed.is_empty() {
        "____".to_owned()
    } else {
        trimmed
            .iter()
            .map(|&b| {
                if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'-') {
                    char::from(b)
                } else {
                    '_'
                }
            })
            .collect()
    };
    name.push_str(".tbl");
    name
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::testing::{Image, table};
    use crate::ErrorKind;

    #[test]
    fn zero_sum_buffers_validate() {
        let data = table(b"APIC", &[1, 2, 3, 4, 5, 6, 7]);
        assert!(validate_checksum(&data));
        assert!(validate_checksum(&[]));
        assert!(validate_checksum(&[0x80, 0x80]));
    }

    #[test]
    fn any_single_byte_flip_breaks_checksum() {
        let data = table(b"SSDT", &[0xde, 0xad, 0xbe, 0xef]);
        for i in 0..data.len() {
            for delta in [1u8, 0x80, 0xff] {
                let mut corrupt = data.clone();
                corrupt[i] = corrupt[i].wrapping_add(delta);
                assert!(!validate_checksum(&corrupt), "byte {i} + {delta}");
            }
        }
    }

    #[test]
    fn header_fields_at_their_offsets() {
        let data = table(b"FACP", &[0; 8]);
        let header = SdtHeader::parse(&data).unwrap();
        assert_eq!(&header.signature, b"FACP");
        assert_eq!(header.length, 44);
        assert_eq!(header.revision, 1);
        assert_eq!(&header.oem_id, b"RSDPF ");
        assert_eq!(header.oem_id_str(), "RSDPF");
        assert_eq!(&header.oem_table_id, b"SYNTHTBL");
        assert_eq!(header.creator_revision, 1);
        assert!(SdtHeader::parse(&data[..35]).is_none());
    }

    #[test]
    fn materializes_table_and_body() {
        let body = [0xaa; 12];
        let mut image = Image::new(0x2000);
        image.put(0x1000, &table(b"HPET", &body));
        let mut src = Cursor::new(image.into_bytes());

        let t = materialize_table(&mut src, 0x1000).unwrap();
        assert_eq!(&t.signature(), b"HPET");
        assert_eq!(t.len(), 48);
        assert_eq!(t.body(), &body);
        assert!(validate_checksum(&t.data));
        assert_eq!(t.summary().signature, "HPET");
    }

    #[test]
    fn materialize_is_idempotent() {
        let mut image = Image::new(0x2000);
        image.put(0x800, &table(b"MCFG", &[3; 20]));
        let mut src = Cursor::new(image.into_bytes());

        let a = materialize_table(&mut src, 0x800).unwrap();
        let b = materialize_table(&mut src, 0x800).unwrap();
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn zero_length_is_invalid() {
        let mut data = table(b"BOGU", &[]);
        data[4..8].copy_from_slice(&0u32.to_le_bytes());
        let mut image = Image::new(0x1000);
        image.put(0x100, &data);

        let err = materialize_table(&mut Cursor::new(image.into_bytes()), 0x100).unwrap_err();
        assert!(matches!(
            err,
            AcpiError::InvalidLength {
                offset: 0x100,
                length: 0
            }
        ));
    }

    #[test]
    fn oversized_length_is_invalid() {
        let mut data = table(b"BOGU", &[]);
        data[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
        let mut image = Image::new(0x1000);
        image.put(0, &data);
        let mut src = Cursor::new(image.into_bytes());

        let err = materialize_table(&mut src, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidLength);

        let limits = Limits {
            max_table_length: 40,
        };
        let mut image = Image::new(0x100);
        image.put(0, &table(b"BIGT", &[0; 8]));
        let err = materialize_table_with(&mut Cursor::new(image.into_bytes()), 0, &limits)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidLength);
    }

    #[test]
    fn truncated_body_is_short_read() {
        let data = table(b"DSDT", &[1; 64]);
        let mut image = Image::new(0x100);
        image.put(0x100 - 50, &data[..50]);

        let err = materialize_table(&mut Cursor::new(image.into_bytes()), 0x100 - 50).unwrap_err();
        assert!(matches!(
            err,
            AcpiError::ShortRead {
                expected: 100,
                actual: 50,
                ..
            }
        ));
    }

    #[test]
    fn header_past_end_is_short_read() {
        let mut src = Cursor::new(vec![0u8; 16]);
        let err = materialize_table(&mut src, 0x1_0000).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShortRead);
    }

    #[test]
    fn bad_checksum_is_rejected() {
        let mut data = table(b"APIC", &[5; 8]);
        data[40] ^= 0x01;
        let mut image = Image::new(0x100);
        image.put(0, &data);

        let err = materialize_table(&mut Cursor::new(image.into_bytes()), 0).unwrap_err();
        assert!(matches!(
            err,
            AcpiError::ChecksumMismatch { offset: 0, sum } if sum != 0
        ));
    }

    #[test]
    fn artifact_names() {
        assert_eq!(artifact_name(b"FACP"), "FACP.tbl");
        assert_eq!(artifact_name(b"$PNP"), "$PNP.tbl");
        assert_eq!(artifact_name(b"EC  "), "EC.tbl");
        assert_eq!(artifact_name(b"AB\0\0"), "AB.tbl");
        assert_eq!(artifact_name(b"../x"), "___x.tbl");
        assert_eq!(artifact_name(b"a/\xffb"), "a__b.tbl");
        assert_eq!(artifact_name(b"    "), "____.tbl");
    }
}
