//! Fixed ACPI Description Table (FADT) pointer extraction.
//!
//! Only the DSDT address is read out of the FADT. The 64-bit `X_DSDT` field
//! (ACPI 2.0+) is preferred; when it is zero the 32-bit `DSDT` field is used.
//! Fields beyond the end of an older, shorter FADT read as zero.

use rsdp_binparse::FromBytes;
use serde::Serialize;

use crate::sdt::Table;

/// FADT table signature.
pub const FADT_SIGNATURE: &[u8; 4] = b"FACP";

/// Which FADT field a DSDT address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PointerSource {
    /// The 64-bit `X_DSDT` field.
    Extended,
    /// The 32-bit `DSDT` field.
    Legacy,
}

/// A DSDT address found in a FADT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DsdtPointer {
    /// Physical address of the DSDT.
    pub address: u64,
    /// Field the address was read from.
    pub source: PointerSource,
}

/// The DSDT-related fields of a FADT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fadt {
    /// Physical address of the DSDT.
    ///
    /// 32-bit field at offset 40. Zero if not present.
    pub dsdt: u32,
    /// 64-bit physical address of the DSDT (ACPI 2.0+).
    ///
    /// Zero if not present or table predates ACPI 2.0.
    pub x_dsdt: u64,
}

impl Fadt {
    /// Byte offset of `dsdt` within the FADT.
    const DSDT_OFFSET: usize = 40;
    /// Byte offset of `x_dsdt` within the FADT (ACPI 2.0+).
    const X_DSDT_OFFSET: usize = 140;

    /// Read the DSDT fields from raw FADT bytes, header included.
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            dsdt: u32::read_at(data, Self::DSDT_OFFSET).unwrap_or(0),
            x_dsdt: u64::read_at(data, Self::X_DSDT_OFFSET).unwrap_or(0),
        }
    }

    /// Read the DSDT fields from a materialized table, if it is a FADT.
    #[must_use]
    pub fn from_table(table: &Table) -> Option<Self> {
        (&table.signature() == FADT_SIGNATURE).then(|| Self::from_bytes(&table.data))
    }

    /// Returns the DSDT address.
    ///
    /// Prefers the 64-bit `x_dsdt` field if non-zero, otherwise falls back
    /// to the 32-bit `dsdt` field. Returns `None` if both are zero.
    #[must_use]
    pub fn dsdt_pointer(&self) -> Option<DsdtPointer> {
        if self.x_dsdt != 0 {
            Some(DsdtPointer {
                address: self.x_dsdt,
                source: PointerSource::Extended,
            })
        } else if self.dsdt != 0 {
            Some(DsdtPointer {
                address: u64::from(self.dsdt),
                source: PointerSource::Legacy,
            })
        } else {
            None
        }
    }
}
