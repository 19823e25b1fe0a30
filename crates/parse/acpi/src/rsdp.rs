//! Root System Description Pointer (RSDP) parsing and validation.
//!
//! The RSDP is the entry point into the ACPI table hierarchy. ACPI 1.0
//! defines a 20-byte structure, while ACPI 2.0+ extends it to 36 bytes with
//! a length field and a 64-bit XSDT address. The whole 36-byte block is
//! always read; only the XSDT address is used to continue the walk.

use log::{debug, info};
use rsdp_binparse::FromBytes;
use serde::Serialize;

use crate::AcpiError;
use crate::sdt::{byte_sum, trim_padding};
use crate::source::{ByteSource, read_exact_at};

/// A validated ACPI 2.0+ root descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDescriptor {
    offset: u64,
    raw: [u8; RootDescriptor::SIZE],
}

impl RootDescriptor {
    /// Size of the ACPI 1.0 portion in bytes.
    pub const V1_SIZE: usize = 20;

    /// Size of the ACPI 2.0 structure in bytes.
    pub const SIZE: usize = 36;

    /// Expected signature bytes (note the trailing space).
    pub const SIGNATURE: &[u8; 8] = b"RSD PTR ";

    const CHECKSUM_OFFSET: usize = 8;
    const OEM_ID_OFFSET: usize = 9;
    const REVISION_OFFSET: usize = 15;
    const RSDT_ADDRESS_OFFSET: usize = 16;
    const LENGTH_OFFSET: usize = 20;
    const XSDT_ADDRESS_OFFSET: usize = 24;
    const EXTENDED_CHECKSUM_OFFSET: usize = 32;

    /// Validate a descriptor read from `offset`.
    ///
    /// The signature must be `"RSD PTR "`, the declared length must lie
    /// between the ACPI 1.0 and 2.0 sizes, and the first `length` bytes must
    /// sum to zero.
    ///
    /// # Errors
    ///
    /// [`AcpiError::SignatureMismatch`], [`AcpiError::InvalidLength`] or
    /// [`AcpiError::ChecksumMismatch`].
    pub fn parse(offset: u64, raw: [u8; Self::SIZE]) -> Result<Self, AcpiError> {
        let descriptor = Self { offset, raw };

        if &descriptor.signature() != Self::SIGNATURE {
            return Err(AcpiError::SignatureMismatch {
                offset,
                found: descriptor.signature(),
            });
        }

        let length = descriptor.length();
        let covered = match usize::try_from(length) {
            Ok(len) if (Self::V1_SIZE..=Self::SIZE).contains(&len) => len,
            _ => return Err(AcpiError::InvalidLength { offset, length }),
        };

        let sum = byte_sum(&raw[..covered]);
        if sum != 0 {
            return Err(AcpiError::ChecksumMismatch { offset, sum });
        }

        Ok(descriptor)
    }

    /// Offset the descriptor was read from.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The descriptor bytes exactly as read.
    #[must_use]
    pub fn raw(&self) -> &[u8; Self::SIZE] {
        &self.raw
    }

    /// The 8-byte signature.
    #[must_use]
    pub fn signature(&self) -> [u8; 8] {
        self.field(0)
    }

    /// Checksum byte covering the ACPI 1.0 portion.
    #[must_use]
    pub fn checksum(&self) -> u8 {
        self.field(Self::CHECKSUM_OFFSET)
    }

    /// OEM identification string.
    #[must_use]
    pub fn oem_id(&self) -> [u8; 6] {
        self.field(Self::OEM_ID_OFFSET)
    }

    /// ACPI revision: 0 for ACPI 1.0, 2 for ACPI 2.0+.
    #[must_use]
    pub fn revision(&self) -> u8 {
        self.field(Self::REVISION_OFFSET)
    }

    /// Legacy 32-bit RSDT address.
    #[must_use]
    pub fn rsdt_address(&self) -> u32 {
        self.field(Self::RSDT_ADDRESS_OFFSET)
    }

    /// Declared length of the descriptor.
    #[must_use]
    pub fn length(&self) -> u32 {
        self.field(Self::LENGTH_OFFSET)
    }

    /// 64-bit XSDT address.
    #[must_use]
    pub fn xsdt_address(&self) -> u64 {
        self.field(Self::XSDT_ADDRESS_OFFSET)
    }

    /// Checksum byte covering the whole structure.
    #[must_use]
    pub fn extended_checksum(&self) -> u8 {
        self.field(Self::EXTENDED_CHECKSUM_OFFSET)
    }

    /// A serializable description of this descriptor.
    #[must_use]
    pub fn summary(&self) -> DescriptorSummary {
        DescriptorSummary {
            offset: self.offset,
            oem_id: String::from_utf8_lossy(trim_padding(&self.oem_id())).into_owned(),
            revision: self.revision(),
            length: self.length(),
            rsdt_address: self.rsdt_address(),
            xsdt_address: self.xsdt_address(),
        }
    }

    fn field<T: FromBytes + Default>(&self, offset: usize) -> T {
        // All offsets are constants inside the fixed 36-byte array.
        T::read_at(&self.raw, offset).unwrap_or_default()
    }
}

/// What the report records about the root descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorSummary {
    /// Offset the descriptor was read from.
    pub offset: u64,
    /// OEM ID, trailing padding removed.
    pub oem_id: String,
    /// ACPI revision.
    pub revision: u8,
    /// Declared descriptor length.
    pub length: u32,
    /// Legacy 32-bit RSDT address.
    pub rsdt_address: u32,
    /// 64-bit XSDT address.
    pub xsdt_address: u64,
}

/// Read and validate the root descriptor at `offset`.
///
/// # Errors
///
/// [`AcpiError::Seek`], [`AcpiError::Read`] or [`AcpiError::ShortRead`] if
/// the 36 bytes cannot be read, otherwise any error from
/// [`RootDescriptor::parse`].
pub fn locate_root(source: &mut impl ByteSource, offset: u64) -> Result<RootDescriptor, AcpiError> {
    let data = read_exact_at(source, offset, RootDescriptor::SIZE)?;
    let raw: [u8; RootDescriptor::SIZE] =
        FromBytes::read_from(&data).ok_or(AcpiError::ShortRead {
            offset,
            expected: RootDescriptor::SIZE,
            actual: data.len(),
        })?;
    debug!("read {} bytes at {offset:#x}", data.len());

    let descriptor = RootDescriptor::parse(offset, raw)?;
    info!(
        "found RSDP at {offset:#x}: revision {}, length {}, XSDT at {:#x}",
        descriptor.revision(),
        descriptor.length(),
        descriptor.xsdt_address()
    );
    Ok(descriptor)
}
