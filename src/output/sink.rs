//! Record sink implementations
//!
//! Records are plain text lines, `<url>, <value> ms`, appended once per
//! accepted URL and never rewritten.

use crate::CrawlError;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Latency figure written next to a URL
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Latency {
    /// Elapsed fetch time in seconds; written as `100 × seconds`
    Measured(f64),

    /// Final round, written as a literal `0`
    Unmeasured,
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Measured(seconds) => write!(f, "{:.3}", 100.0 * seconds),
            Self::Unmeasured => write!(f, "0"),
        }
    }
}

/// One persisted line
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub url: String,
    pub latency: Latency,
}

impl Record {
    pub fn new(url: impl Into<String>, latency: Latency) -> Self {
        Self {
            url: url.into(),
            latency,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} ms", self.url, self.latency)
    }
}

/// Append-only destination for records
pub trait RecordSink {
    /// Appends one record
    fn append(&mut self, record: &Record) -> io::Result<()>;

    /// Flushes buffered records to the underlying store
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// In-memory sink, useful for tests and dry runs
impl RecordSink for Vec<Record> {
    fn append(&mut self, record: &Record) -> io::Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Text file sink; the file is truncated when the sink is created
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Creates (or truncates) the record file
    ///
    /// # Returns
    ///
    /// * `Ok(FileSink)` - File is open for writing
    /// * `Err(CrawlError::SinkUnavailable)` - File could not be created
    pub fn create(path: &Path) -> Result<Self, CrawlError> {
        let file = File::create(path).map_err(|source| CrawlError::SinkUnavailable {
            path: path.display().to_string(),
            source,
        })?;

        tracing::debug!("Opened record file {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for FileSink {
    fn append(&mut self, record: &Record) -> io::Result<()> {
        writeln!(self.writer, "{}", record)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
