//! Outcome of a dump run.
//!
//! Every step the walker attempts ends up here, successful or not, so a run
//! against corrupt memory can be diagnosed without re-running it.

use std::error::Error as _;
use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::error::{AcpiError, ErrorKind};
use crate::fadt::{DsdtPointer, PointerSource};
use crate::rsdp::DescriptorSummary;
use crate::sdt::TableSummary;

/// A recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Offset of the structure being processed.
    pub offset: u64,
    /// Error kind.
    pub kind: ErrorKind,
    /// Human-readable message, including the underlying cause.
    pub message: String,
}

impl Failure {
    /// Record `err`, raised while processing the structure at `offset`.
    #[must_use]
    pub fn new(offset: u64, err: &AcpiError) -> Self {
        let mut message = err.to_string();
        let mut cause = err.source();
        while let Some(e) = cause {
            let _ = write!(message, ": {e}");
            cause = e.source();
        }
        Self {
            offset,
            kind: err.kind(),
            message,
        }
    }
}

/// Result of materializing and persisting one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The table validated and was written.
    Dumped(TableSummary),
    /// The table could not be read, validated or written.
    Failed(Failure),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Dumped`].
    #[must_use]
    pub fn is_dumped(&self) -> bool {
        matches!(self, Self::Dumped(_))
    }

    /// The failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Dumped(_) => None,
            Self::Failed(f) => Some(f),
        }
    }
}

/// The DSDT step taken after dumping a FADT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtableReport {
    /// Where the DSDT address came from.
    pub pointer: DsdtPointer,
    /// Result of dumping the DSDT.
    pub outcome: Outcome,
}

/// One XSDT entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    /// Position in the XSDT entry array.
    pub index: usize,
    /// Address stored in the entry.
    pub offset: u64,
    /// Result of dumping the table.
    pub outcome: Outcome,
    /// The DSDT step, present only when the entry was a FADT carrying a
    /// DSDT address.
    pub subtable: Option<SubtableReport>,
}

/// Summary of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// The root descriptor, if it was located and validated.
    pub descriptor: Option<DescriptorSummary>,
    /// The XSDT, if it was materialized and written.
    pub root_table: Option<TableSummary>,
    /// Every XSDT entry, in array order.
    pub entries: Vec<EntryReport>,
    /// The failure that stopped the run early, if any.
    pub fatal: Option<Failure>,
}

impl Report {
    /// Returns `true` if the descriptor and root table were both processed.
    /// Failed child tables do not affect this.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.fatal.is_none()
    }

    /// Number of XSDT entries attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.entries.len()
    }

    /// Number of XSDT entries dumped.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_dumped()).count()
    }

    /// Number of DSDT steps attempted.
    #[must_use]
    pub fn subtables_attempted(&self) -> usize {
        self.entries.iter().filter(|e| e.subtable.is_some()).count()
    }

    /// Number of DSDT steps that dumped their table.
    #[must_use]
    pub fn subtables_succeeded(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|e| e.subtable.as_ref())
            .filter(|s| s.outcome.is_dumped())
            .count()
    }

    /// Every failure in the run, in the order it happened.
    #[must_use]
    pub fn failures(&self) -> Vec<&Failure> {
        let mut failures: Vec<&Failure> = Vec::new();
        for entry in &self.entries {
            failures.extend(entry.outcome.failure());
            failures.extend(entry.subtable.as_ref().and_then(|s| s.outcome.failure()));
        }
        failures.extend(self.fatal.as_ref());
        failures
    }
}

fn fmt_outcome(f: &mut fmt::Formatter<'_>, outcome: &Outcome) -> fmt::Result {
    match outcome {
        Outcome::Dumped(t) => writeln!(f, "{}  length {}", t.signature, t.length),
        Outcome::Failed(e) => writeln!(f, "FAILED ({:?}): {}", e.kind, e.message),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(d) = &self.descriptor {
            writeln!(
                f,
                "RSDP  {:#010x}  revision {}, OEM {:?}, XSDT at {:#x}",
                d.offset, d.revision, d.oem_id, d.xsdt_address
            )?;
        }
        if let Some(t) = &self.root_table {
            writeln!(
                f,
                "XSDT  {:#010x}  length {}, {} entries",
                t.offset,
                t.length,
                self.entries.len()
            )?;
        }
        for entry in &self.entries {
            write!(f, "  [{:02}] {:#010x}  ", entry.index, entry.offset)?;
            fmt_outcome(f, &entry.outcome)?;
            if let Some(sub) = &entry.subtable {
                let field = match sub.pointer.source {
                    PointerSource::Extended => "X_DSDT",
                    PointerSource::Legacy => "DSDT",
                };
                write!(f, "       -> {:#010x} via {field}  ", sub.pointer.address)?;
                fmt_outcome(f, &sub.outcome)?;
            }
        }
        if let Some(fatal) = &self.fatal {
            writeln!(f, "FATAL ({:?}): {}", fatal.kind, fatal.message)?;
        }
        write!(
            f,
            "{} of {} tables dumped, {} of {} DSDT lookups dumped",
            self.succeeded(),
            self.attempted(),
            self.subtables_succeeded(),
            self.subtables_attempted()
        )
    }
}
