//! CSV file writer
//!
//! Rows are fully encoded in memory before the file is touched, so a failed
//! encode never leaves a partial row on disk.

use crate::domain::{PaymentOrderRow, SinkError};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// How a batch is written to the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the file with a header followed by the rows
    Create,
    /// Add rows to the end of an existing file, without a header
    Append,
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMode::Create => "create",
            WriteMode::Append => "append",
        }
    }
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes payment order rows to a CSV file
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a batch in the given mode, returning the number of rows written
    ///
    /// `Create` writes to a temporary file next to the target and renames it
    /// over the target. `Append` requires the file to exist and does not
    /// check its header.
    pub fn write(&self, rows: &[PaymentOrderRow], mode: WriteMode) -> Result<usize, SinkError> {
        let buffer = encode(rows, mode == WriteMode::Create)?;

        match mode {
            WriteMode::Create => self.replace_with(&buffer)?,
            WriteMode::Append => self.append(&buffer)?,
        }

        tracing::debug!(
            path = %self.path.display(),
            mode = %mode,
            rows = rows.len(),
            bytes = buffer.len(),
            "CSV batch written"
        );

        Ok(rows.len())
    }

    fn replace_with(&self, buffer: &[u8]) -> Result<(), SinkError> {
        let create_failed = |message: String| SinkError::CreateFailed {
            path: self.path.display().to_string(),
            message,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| create_failed(e.to_string()))?;
        temp.write_all(buffer)
            .map_err(|e| create_failed(e.to_string()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| create_failed(e.to_string()))?;
        temp.persist(&self.path)
            .map_err(|e| create_failed(e.error.to_string()))?;

        Ok(())
    }

    fn append(&self, buffer: &[u8]) -> Result<(), SinkError> {
        let append_failed = |message: String| SinkError::AppendFailed {
            path: self.path.display().to_string(),
            message,
        };

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| append_failed(e.to_string()))?;
        file.write_all(buffer)
            .map_err(|e| append_failed(e.to_string()))?;
        file.sync_all().map_err(|e| append_failed(e.to_string()))?;

        Ok(())
    }
}

fn encode(rows: &[PaymentOrderRow], header: bool) -> Result<Vec<u8>, SinkError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    if header {
        writer.write_record(PaymentOrderRow::COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| SinkError::EncodeFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimestampField;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn row(tracking: &str, amount: i64) -> PaymentOrderRow {
        PaymentOrderRow {
            created_at: Some(TimestampField::At(
                Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap(),
            )),
            tracking_number: tracking.to_string(),
            provider: "stripe".to_string(),
            items_type: "physical".to_string(),
            status: "paid".to_string(),
            no_of_items: 2,
            amount_in_cents: amount,
            payment_link: "unknown".to_string(),
            payment_link_expire_at: TimestampField::unknown(),
        }
    }

    const HEADER: &str = "created_at,tracking_number,provider,items_type,status,no_of_items,amount_in_cents,payment_link,payment_link_expire_at";

    #[test]
    fn test_create_writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path().join("out.csv"));

        let written = sink.write(&[row("T-1", 150)], WriteMode::Create).unwrap();
        assert_eq!(written, 1);

        let text = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(
            text,
            format!("{HEADER}\n2024-03-01T09:15:00.000Z,T-1,stripe,physical,paid,2,150,unknown,unknown\n")
        );
    }

    #[test]
    fn test_create_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale contents\nmore stale\n").unwrap();

        let sink = CsvSink::new(&path);
        sink.write(&[row("T-1", 1)], WriteMode::Create).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("stale"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_append_adds_rows_without_header() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path().join("out.csv"));

        sink.write(&[row("T-1", 1)], WriteMode::Create).unwrap();
        sink.write(&[row("T-2", 2), row("T-3", 3)], WriteMode::Append)
            .unwrap();

        let text = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines.iter().filter(|l| **l == HEADER).count(), 1);
        assert!(lines[1].contains("T-1"));
        assert!(lines[2].contains("T-2"));
        assert!(lines[3].contains("T-3"));
    }

    #[test]
    fn test_append_to_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path().join("missing.csv"));

        let err = sink.write(&[row("T-1", 1)], WriteMode::Append).unwrap_err();
        assert!(matches!(err, SinkError::AppendFailed { .. }));
        assert!(!sink.path().exists());
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path().join("nope").join("out.csv"));

        let err = sink.write(&[row("T-1", 1)], WriteMode::Create).unwrap_err();
        assert!(matches!(err, SinkError::CreateFailed { .. }));
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path().join("out.csv"));
        let mut r = row("T-1", 1);
        r.provider = "acme, inc".to_string();

        sink.write(&[r], WriteMode::Create).unwrap();

        let text = std::fs::read_to_string(sink.path()).unwrap();
        assert!(text.contains("\"acme, inc\""));
    }

    #[test]
    fn test_write_mode_display() {
        assert_eq!(WriteMode::Create.to_string(), "create");
        assert_eq!(WriteMode::Append.to_string(), "append");
    }
}
