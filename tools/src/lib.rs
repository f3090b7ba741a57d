//! Command-line tools for WSG saves.
//!
//! This crate backs the `wsg-tools` binary:
//!
//! - Decode a save to its player record, raw or as JSON
//! - Encode a record back into a save
//! - Move items in and out as trade codes
//! - Apply quick edits
//! - Inspect container headers, one file or a directory at a time
//!
//! # Design Principles
//!
//! - **Never clobber the input** - Output paths must differ from input paths.
//! - **Human-readable output** - Make it easy to see what a save holds.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use codec::{inspect_container, CodecResult, Compressor, ContainerHeader, ContainerLimits};
use glob::Pattern;
use tracing::Level;

/// A file found while scanning a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveEntry {
    pub path: PathBuf,
    pub size: u64,
}

/// Lists files in `dir`, optionally filtered by a glob on path or file name.
///
/// Entries are sorted by path.
pub fn collect_save_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<SaveEntry>> {
    let pattern = glob
        .map(|value| Pattern::new(value).context("invalid glob pattern"))
        .transpose()?;

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(SaveEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

/// What `inspect` reports for one save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectReport {
    pub file_len: usize,
    pub header: ContainerHeader,
}

/// Reads the container header of `raw`.
pub fn inspect_save<C: Compressor + ?Sized>(
    raw: &[u8],
    compressor: &C,
    limits: &ContainerLimits,
) -> CodecResult<InspectReport> {
    Ok(InspectReport {
        file_len: raw.len(),
        header: inspect_container(raw, compressor, limits)?,
    })
}

/// Renders a report as indented `name: value` lines.
#[must_use]
pub fn format_inspect_report(report: &InspectReport) -> String {
    let header = &report.header;
    let mut out = String::new();
    let _ = writeln!(out, "file: {} bytes", report.file_len);
    let _ = writeln!(out, "  length: {}", header.length);
    let _ = writeln!(out, "  byte order: {:?}", header.byte_order);
    let _ = writeln!(out, "  crc32: 0x{:08x}", header.crc32);
    let _ = writeln!(out, "  plaintext: {} bytes", header.plaintext_len);
    out
}

/// Fails if `output` names the same file as `input`.
///
/// `None` output means stdout and is always allowed.
pub fn ensure_distinct_paths(input: &Path, output: Option<&Path>) -> Result<()> {
    let Some(output) = output else {
        return Ok(());
    };
    let same = match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(input), Ok(output)) => input == output,
        _ => input == output,
    };
    if same {
        bail!(
            "refusing to overwrite {}, choose a different output file",
            input.display()
        );
    }
    Ok(())
}

/// Log level for a `-v` count: warnings by default, then info, debug, trace.
#[must_use]
pub const fn verbosity_level(count: u8) -> Level {
    match count {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}
