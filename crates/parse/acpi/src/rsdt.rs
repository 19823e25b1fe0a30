//! XSDT entry enumeration.
//!
//! The Extended System Description Table holds, past its header, a packed
//! array of 64-bit physical addresses, one per child table. Trailing bytes
//! that do not form a whole entry are ignored.

use rsdp_binparse::FromBytes;

use crate::sdt::Table;

/// Size in bytes of a single table-pointer entry in the XSDT (64-bit).
pub const XSDT_ENTRY_SIZE: usize = 8;

/// Iterator over table entry physical addresses in an XSDT, in array order.
#[derive(Debug, Clone)]
pub struct XsdtEntries<'a> {
    /// Byte slice covering all entries.
    data: &'a [u8],
    /// Current offset (in bytes) from the start of `data`.
    offset: usize,
}

impl<'a> XsdtEntries<'a> {
    /// Iterate the entries of a materialized XSDT.
    #[must_use]
    pub fn new(xsdt: &'a Table) -> Self {
        Self::from_body(xsdt.body())
    }

    /// Iterate entries packed in `data` (the table body, header excluded).
    #[must_use]
    pub fn from_body(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }
}

impl Iterator for XsdtEntries<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        let addr = u64::read_at(self.data, self.offset)?;
        self.offset += XSDT_ENTRY_SIZE;
        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.len().saturating_sub(self.offset) / XSDT_ENTRY_SIZE;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for XsdtEntries<'_> {}
