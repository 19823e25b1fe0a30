//! rsdp-follow: dump ACPI tables through `/dev/mem`.
//!
//! Pipeline: open device → validate RSDP at the given address → dump XSDT →
//! dump every table it lists (and the DSDT named by the FADT) → print report.
//!
//! Individual tables that fail to validate do not change the exit status;
//! only a bad RSDP, a bad XSDT or an unusable output directory do.

mod cli;
mod logging;

use std::fs::{self, File};
use std::io::{self, Write as _};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use rsdp_acpi::{ByteSource, DirSink, Limits, MemorySink, Report, TableSink, Walker};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    logging::init(logging::Verbosity::from_flags(cli.quiet, cli.verbose));

    let report = dump(&cli)?;
    print_report(&report, cli.json)?;

    if let Some(fatal) = &report.fatal {
        bail!("{}", fatal.message);
    }
    Ok(())
}

/// Open the device and walk the tables into the configured sink.
fn dump(cli: &cli::Cli) -> Result<Report> {
    let mut mem = File::open(&cli.device)
        .with_context(|| format!("cannot open {}", cli.device.display()))?;
    info!("opened {}", cli.device.display());

    let limits = Limits {
        max_table_length: cli.max_table_size,
    };

    if cli.dry_run {
        info!("dry run: nothing will be written");
        let mut sink = MemorySink::new();
        return Ok(walk(&mut mem, &mut sink, limits, cli.address));
    }

    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("cannot create {}", cli.output_dir.display()))?;
    let mut sink = DirSink::new(&cli.output_dir);
    Ok(walk(&mut mem, &mut sink, limits, cli.address))
}

fn walk(
    source: &mut impl ByteSource,
    sink: &mut impl TableSink,
    limits: Limits,
    address: u64,
) -> Report {
    info!("following RSDP at {address:#x}");
    Walker::new(source, sink).with_limits(limits).run(address)
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, report).context("cannot serialize report")?;
        writeln!(out)?;
    } else {
        writeln!(out, "{report}")?;
    }
    Ok(())
}
