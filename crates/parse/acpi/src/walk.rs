//! The dump walk: RSDP → XSDT → every listed table, plus the DSDT named by
//! the FADT.
//!
//! Errors on the RSDP or the XSDT end the run, since without them there is
//! nothing to enumerate. Errors on an individual table are recorded in the
//! [`Report`] and the walk moves on to the next entry.
//!
//! The DSDT is reached through exactly one extra step after a FADT has been
//! dumped. The table found there is not inspected for further pointers.

use log::{error, info, warn};

use crate::AcpiError;
use crate::fadt::{DsdtPointer, Fadt, PointerSource};
use crate::report::{EntryReport, Failure, Outcome, Report, SubtableReport};
use crate::rsdp::locate_root;
use crate::rsdt::XsdtEntries;
use crate::sdt::{Limits, Table, artifact_name, materialize_table_with};
use crate::sink::TableSink;
use crate::source::ByteSource;

/// Artifact name for the raw root descriptor.
pub const RSDP_ARTIFACT: &str = "xsdp.bin";

/// Artifact name for the raw XSDT.
pub const XSDT_ARTIFACT: &str = "xsdt.tbl";

/// Walks the table hierarchy of one source, writing into one sink.
pub struct Walker<'a, S, K> {
    source: &'a mut S,
    sink: &'a mut K,
    limits: Limits,
}

impl<'a, S: ByteSource, K: TableSink> Walker<'a, S, K> {
    /// Create a walker with default [`Limits`].
    pub fn new(source: &'a mut S, sink: &'a mut K) -> Self {
        Self {
            source,
            sink,
            limits: Limits::default(),
        }
    }

    /// Replace the limits applied to declared lengths.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Dump everything reachable from the root descriptor at `rsdp_offset`.
    ///
    /// Never fails: a fatal error is recorded in [`Report::fatal`].
    pub fn run(&mut self, rsdp_offset: u64) -> Report {
        let mut report = Report::default();
        if let Err(failure) = self.walk(rsdp_offset, &mut report) {
            error!("{}", failure.message);
            report.fatal = Some(failure);
        }
        report
    }

    fn walk(&mut self, rsdp_offset: u64, report: &mut Report) -> Result<(), Failure> {
        let root = locate_root(&mut *self.source, rsdp_offset)
            .map_err(|e| Failure::new(rsdp_offset, &e))?;
        report.descriptor = Some(root.summary());

        self.persist(RSDP_ARTIFACT, root.raw())
            .map_err(|e| Failure::new(rsdp_offset, &e))?;
        info!("wrote {} bytes to {RSDP_ARTIFACT}", root.raw().len());

        let xsdt_offset = root.xsdt_address();
        let xsdt = materialize_table_with(&mut *self.source, xsdt_offset, &self.limits)
            .map_err(|e| Failure::new(xsdt_offset, &e))?;
        self.persist(XSDT_ARTIFACT, &xsdt.data)
            .map_err(|e| Failure::new(xsdt_offset, &e))?;
        report.root_table = Some(xsdt.summary());

        let entries = XsdtEntries::new(&xsdt);
        info!(
            "XSDT {} length {}, {} tables found",
            xsdt.header.signature_str(),
            xsdt.len(),
            entries.len()
        );

        for (index, offset) in entries.enumerate() {
            info!("dumping table {index:02} at {offset:#x}");
            let entry = self.dump_entry(index, offset);
            report.entries.push(entry);
        }
        Ok(())
    }

    /// Dump one XSDT entry, then the DSDT if the entry is a FADT.
    ///
    /// The DSDT step depends only on the entry having validated; a failed
    /// write of the FADT itself is recorded but does not skip it.
    fn dump_entry(&mut self, index: usize, offset: u64) -> EntryReport {
        let table = match materialize_table_with(&mut *self.source, offset, &self.limits) {
            Ok(table) => table,
            Err(e) => {
                warn!("table {index:02} at {offset:#x}: {e}");
                return EntryReport {
                    index,
                    offset,
                    outcome: Outcome::Failed(Failure::new(offset, &e)),
                    subtable: None,
                };
            }
        };

        let pointer = Fadt::from_table(&table).and_then(|fadt| {
            let pointer = fadt.dsdt_pointer();
            if pointer.is_none() {
                warn!("FADT at {offset:#x} has no DSDT address");
            }
            pointer
        });
        let outcome = match self.persist_table(&table) {
            Ok(()) => Outcome::Dumped(table.summary()),
            Err(e) => {
                warn!("table {index:02} at {offset:#x}: {e}");
                Outcome::Failed(Failure::new(offset, &e))
            }
        };

        EntryReport {
            index,
            offset,
            outcome,
            subtable: pointer.map(|p| self.dump_subtable(p)),
        }
    }

    fn dump_subtable(&mut self, pointer: DsdtPointer) -> SubtableReport {
        let field = match pointer.source {
            PointerSource::Extended => "X_DSDT",
            PointerSource::Legacy => "DSDT",
        };
        info!("following FADT {field} to {:#x}", pointer.address);

        let outcome = match self.dump_one(pointer.address) {
            Ok(table) => Outcome::Dumped(table.summary()),
            Err(e) => {
                warn!("DSDT at {:#x}: {e}", pointer.address);
                Outcome::Failed(Failure::new(pointer.address, &e))
            }
        };
        SubtableReport { pointer, outcome }
    }

    /// Materialize the table at `offset` and persist it as `<SIG>.tbl`.
    ///
    /// The validated table is returned for inspection.
    ///
    /// # Errors
    ///
    /// Any error from [`materialize_table_with`], or
    /// [`AcpiError::SinkWrite`] if the table cannot be persisted.
    pub fn dump_one(&mut self, offset: u64) -> Result<Table, AcpiError> {
        let table = materialize_table_with(&mut *self.source, offset, &self.limits)?;
        self.persist_table(&table)?;
        Ok(table)
    }

    fn persist_table(&mut self, table: &Table) -> Result<(), AcpiError> {
        let name = artifact_name(&table.signature());
        self.persist(&name, &table.data)?;
        info!("wrote {} bytes to {name}", table.len());
        Ok(())
    }

    fn persist(&mut self, name: &str, bytes: &[u8]) -> Result<(), AcpiError> {
        self.sink
            .persist(name, bytes)
            .map_err(|source| AcpiError::SinkWrite {
                name: name.to_owned(),
                source,
            })
    }
}

/// Dump everything reachable from the root descriptor at `rsdp_offset` with
/// default [`Limits`].
pub fn run<S: ByteSource, K: TableSink>(source: &mut S, rsdp_offset: u64, sink: &mut K) -> Report {
    Walker::new(source, sink).run(rsdp_offset)
}
