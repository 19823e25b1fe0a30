//! Command-line interface definitions for rsdp-follow.

use std::path::PathBuf;

use clap::Parser;
use rsdp_acpi::DEFAULT_MAX_TABLE_LENGTH;

/// Dump ACPI tables from physical memory, starting at the RSDP.
///
/// Writes xsdp.bin, xsdt.tbl and one <SIG>.tbl per table into the output
/// directory.
#[derive(Parser, Debug)]
#[command(name = "rsdp-follow", version, about)]
pub struct Cli {
    /// Physical address of the RSDP, in hexadecimal (e.g. 7fb7e014).
    #[arg(value_parser = parse_hex)]
    pub address: u64,

    /// Memory device to read from.
    #[arg(long, short = 'd', default_value = "/dev/mem")]
    pub device: PathBuf,

    /// Directory the dumped tables are written to (created if missing).
    #[arg(long, short = 'o', default_value = ".")]
    pub output_dir: PathBuf,

    /// Largest table length, in bytes, that will be read.
    #[arg(long, default_value_t = DEFAULT_MAX_TABLE_LENGTH)]
    pub max_table_size: u32,

    /// Validate tables without writing any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Only log warnings and errors.
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also log every seek and read.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

/// Parse a hexadecimal address, with or without a `0x` prefix.
fn parse_hex(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid hexadecimal address {s:?}: {e}"))
}
