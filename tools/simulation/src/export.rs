//! Report and raw-log sinks
//!
//! `CsvReport` appends one statistics row per run. `RawLog` appends the full
//! ECU population of every run in one of three encodings.
//!
//! # Binary raw-log format (per run)
//! ```text
//! [record_len: u32 LE][record: bincode]
//! ```

use rating_core::aggregate::VehicleRating;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use types::profile::EcuProfile;
use types::severity::SeverityClass;

use crate::driver::{RunMetadata, RunReport, RunSink};

/// Decimal places kept for means, deviations and the vehicle rating in reports.
pub const REPORT_DP: u32 = 6;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary encoding error: {0}")]
    Binary(#[from] bincode::Error),

    #[error("Unknown raw log format: {0}")]
    UnknownFormat(String),

    #[error("Raw log format {0} cannot be read back")]
    UnreadableFormat(RawFormat),

    #[error("Corrupt raw log at byte {offset}: {reason}")]
    Corrupt { offset: u64, reason: String },

    #[error("Record of {0} bytes exceeds the u32 frame limit")]
    FrameTooLarge(usize),
}

// ── CSV report ──────────────────────────────────────────────────────

/// Tabular report with one row per run.
pub struct CsvReport<W: Write> {
    writer: W,
}

impl CsvReport<BufWriter<File>> {
    /// Open `path` for appending. The header is written only if the file is
    /// new or empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_new = file.metadata()?.len() == 0;
        Self::from_writer(BufWriter::new(file), is_new)
    }
}

impl<W: Write> CsvReport<W> {
    pub fn from_writer(mut writer: W, write_header: bool) -> Result<Self, SinkError> {
        if write_header {
            writeln!(writer, "{}", Self::header())?;
        }
        Ok(Self { writer })
    }

    /// `sum_D,count_D,mean_D,median_D,stdev_D,...,vehicle_rating,seed,run,total_runs`
    pub fn header() -> String {
        let mut columns: Vec<String> = Vec::with_capacity(24);
        for class in SeverityClass::ALL {
            for stat in ["sum", "count", "mean", "median", "stdev"] {
                columns.push(format!("{}_{}", stat, class));
            }
        }
        columns.extend(["vehicle_rating", "seed", "run", "total_runs"].map(String::from));
        columns.join(",")
    }

    /// One report row. An unrated run leaves the vehicle rating cell empty.
    pub fn format_row(report: &RunReport) -> String {
        let mut cells: Vec<String> = Vec::with_capacity(24);
        for stats in &report.result.stats {
            cells.push(stats.sum.to_string());
            cells.push(stats.count.to_string());
            cells.push(report_decimal(stats.mean));
            cells.push(stats.median.to_string());
            cells.push(report_decimal(stats.stdev));
        }
        cells.push(match report.result.vehicle_rating {
            VehicleRating::Rated(value) => report_decimal(value),
            VehicleRating::Unrated => String::new(),
        });
        let RunMetadata {
            seed,
            run,
            total_runs,
        } = report.metadata;
        cells.push(seed.to_string());
        cells.push(run.to_string());
        cells.push(total_runs.to_string());
        cells.join(",")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn report_decimal(value: Decimal) -> String {
    value.round_dp(REPORT_DP).normalize().to_string()
}

impl<W: Write> RunSink for CsvReport<W> {
    fn record(&mut self, report: &RunReport) -> Result<(), SinkError> {
        writeln!(self.writer, "{}", Self::format_row(report))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

// ── Raw log ─────────────────────────────────────────────────────────

/// Encoding of the raw log. Content is identical across formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawFormat {
    /// Length-prefixed bincode frames
    #[default]
    Binary,
    /// One compact JSON object per line
    JsonLines,
    /// Pretty `Debug` rendering, one block per run
    Text,
}

impl fmt::Display for RawFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RawFormat::Binary => "binary",
            RawFormat::JsonLines => "json",
            RawFormat::Text => "text",
        };
        f.write_str(name)
    }
}

impl FromStr for RawFormat {
    type Err = SinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "bin" => Ok(RawFormat::Binary),
            "json" | "jsonl" => Ok(RawFormat::JsonLines),
            "text" | "txt" => Ok(RawFormat::Text),
            _ => Err(SinkError::UnknownFormat(s.to_string())),
        }
    }
}

/// One raw-log entry: the run's identity and its full population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub metadata: RunMetadata,
    pub profiles: Vec<EcuProfile>,
}

impl RawRecord {
    pub fn from_report(report: &RunReport) -> Self {
        Self {
            metadata: report.metadata,
            profiles: report.profiles.clone(),
        }
    }
}

/// Append-only per-run population log.
pub struct RawLog<W: Write> {
    writer: W,
    format: RawFormat,
    records_written: u64,
}

impl RawLog<BufWriter<File>> {
    pub fn open(path: impl AsRef<Path>, format: RawFormat) -> Result<Self, SinkError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_writer(BufWriter::new(file), format))
    }
}

impl<W: Write> RawLog<W> {
    pub fn from_writer(writer: W, format: RawFormat) -> Self {
        Self {
            writer,
            format,
            records_written: 0,
        }
    }

    pub fn format(&self) -> RawFormat {
        self.format
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn append(&mut self, record: &RawRecord) -> Result<(), SinkError> {
        match self.format {
            RawFormat::Binary => {
                let bytes = bincode::serialize(record)?;
                let len = u32::try_from(bytes.len()).map_err(|_| SinkError::FrameTooLarge(bytes.len()))?;
                self.writer.write_all(&len.to_le_bytes())?;
                self.writer.write_all(&bytes)?;
            }
            RawFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, record)?;
                self.writer.write_all(b"\n")?;
            }
            RawFormat::Text => {
                writeln!(self.writer, "{:#?}", record)?;
                writeln!(self.writer)?;
            }
        }
        self.records_written += 1;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RunSink for RawLog<W> {
    fn record(&mut self, report: &RunReport) -> Result<(), SinkError> {
        self.append(&RawRecord::from_report(report))
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Read every record of a raw log file.
pub fn read_records(path: impl AsRef<Path>, format: RawFormat) -> Result<Vec<RawRecord>, SinkError> {
    let file = File::open(path)?;
    read_records_from(BufReader::new(file), format)
}

/// Read every record from a raw-log stream.
///
/// Text logs are for humans and cannot be read back.
pub fn read_records_from<R: BufRead>(reader: R, format: RawFormat) -> Result<Vec<RawRecord>, SinkError> {
    match format {
        RawFormat::Binary => read_binary(reader),
        RawFormat::JsonLines => {
            let mut records = Vec::new();
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                records.push(serde_json::from_str(&line)?);
            }
            Ok(records)
        }
        RawFormat::Text => Err(SinkError::UnreadableFormat(RawFormat::Text)),
    }
}

fn read_binary<R: Read>(mut reader: R) -> Result<Vec<RawRecord>, SinkError> {
    let mut records = Vec::new();
    let mut offset: u64 = 0;
    loop {
        let mut len_buf = [0u8; 4];
        match read_full(&mut reader, &mut len_buf)? {
            0 => return Ok(records),
            4 => {}
            n => {
                return Err(SinkError::Corrupt {
                    offset,
                    reason: format!("truncated length prefix ({} of 4 bytes)", n),
                })
            }
        }
        let len = u32::from_le_bytes(len_buf) as usize;

        let mut body = vec![0u8; len];
        let read = read_full(&mut reader, &mut body)?;
        if read != len {
            return Err(SinkError::Corrupt {
                offset,
                reason: format!("truncated record ({} of {} bytes)", read, len),
            });
        }
        records.push(bincode::deserialize(&body)?);
        offset += 4 + len as u64;
    }
}

/// Fill `buf` as far as the stream allows, returning the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
