//! `rsdp-acpi` --- ACPI table discovery, validation and dumping.
//!
//! Starting from the physical address of the Root System Description
//! Pointer, this crate validates the RSDP, reads the XSDT it names, and
//! dumps every table the XSDT lists. When one of those tables is the FADT,
//! the DSDT it points to is dumped as well.
//!
//! Memory is reached through a [`ByteSource`] (anything `Read + Seek`, such
//! as `/dev/mem`), and tables are written through a [`TableSink`]. Every
//! structure is read with explicit, bounds-checked field extraction: nothing
//! read from memory is trusted until its length and checksum have been
//! checked.
//!
//! # Usage
//!
//! ```ignore
//! let mut mem = File::open("/dev/mem")?;
//! let mut sink = DirSink::new(".");
//! let report = rsdp_acpi::run(&mut mem, 0x7fb7_e014, &mut sink);
//! println!("{report}");
//! ```
//!
//! Artifacts written: `xsdp.bin` (the raw RSDP), `xsdt.tbl`, and one
//! `<SIG>.tbl` per dumped table.

#![warn(missing_docs)]

pub mod error;
pub mod fadt;
pub mod report;
pub mod rsdp;
pub mod rsdt;
pub mod sdt;
pub mod sink;
pub mod source;
pub mod walk;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use error::{AcpiError, ErrorKind};
pub use fadt::{DsdtPointer, Fadt, PointerSource};
pub use report::{EntryReport, Failure, Outcome, Report, SubtableReport};
pub use rsdp::{DescriptorSummary, RootDescriptor, locate_root};
pub use rsdt::XsdtEntries;
pub use sdt::{
    DEFAULT_MAX_TABLE_LENGTH, Limits, SdtHeader, Table, TableSummary, artifact_name,
    materialize_table, materialize_table_with, validate_checksum,
};
pub use sink::{DirSink, MemorySink, TableSink};
pub use source::ByteSource;
pub use walk::{RSDP_ARTIFACT, Walker, XSDT_ARTIFACT, run};
