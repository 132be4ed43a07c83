//! Tab-separated record logs
//!
//! One record per line: `period \t cohort \t json`. A header line
//! `period\tcohort\trecord` may lead the file. Malformed rows are skipped with
//! a warning and counted; only I/O failures abort a read.

use super::{RecordResult, Versioned};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::warn;

pub const HEADER: &str = "period\tcohort\trecord";

#[derive(Debug, Clone, PartialEq)]
pub struct TsvRow<T> {
    pub period: i32,
    pub cohort: usize,
    pub record: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsvLog<T> {
    pub rows: Vec<TsvRow<T>>,
    /// Rows dropped because they could not be parsed
    pub skipped: usize,
}

impl<T> Default for TsvLog<T> {
    fn default() -> Self {
        TsvLog {
            rows: Vec::new(),
            skipped: 0,
        }
    }
}

pub fn read_tsv<T, R>(reader: R) -> RecordResult<TsvLog<T>>
where
    T: DeserializeOwned + Versioned,
    R: BufRead,
{
    let mut log = TsvLog::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim_end_matches('\r');
        if trimmed.trim().is_empty() || (line_no == 1 && trimmed == HEADER) {
            continue;
        }

        match parse_row(trimmed) {
            Ok(row) => log.rows.push(row),
            Err(reason) => {
                warn!(line = line_no, %reason, "skipping malformed record");
                log.skipped += 1;
            }
        }
    }

    Ok(log)
}

pub fn read_tsv_file<T>(path: impl AsRef<Path>) -> RecordResult<TsvLog<T>>
where
    T: DeserializeOwned + Versioned,
{
    let file = File::open(path)?;
    read_tsv(BufReader::new(file))
}

fn parse_row<T>(line: &str) -> Result<TsvRow<T>, String>
where
    T: DeserializeOwned + Versioned,
{
    let mut columns = line.splitn(3, '\t');
    let (Some(period), Some(cohort), Some(json)) = (columns.next(), columns.next(), columns.next()) else {
        return Err("expected 3 tab-separated columns".to_string());
    };

    let period: i32 = period
        .trim()
        .parse()
        .map_err(|_| format!("period '{period}' is not an integer"))?;
    let cohort: usize = cohort
        .trim()
        .parse()
        .map_err(|_| format!("cohort '{cohort}' is not a non-negative integer"))?;
    let record: T = serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;
    record.check_version().map_err(|e| e.to_string())?;

    Ok(TsvRow { period, cohort, record })
}

/// Writes records as TSV lines, header first
pub struct TsvWriter<W: Write> {
    inner: W,
    rows: usize,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(mut inner: W) -> RecordResult<Self> {
        writeln!(inner, "{HEADER}")?;
        Ok(TsvWriter { inner, rows: 0 })
    }

    pub fn write_row<T: Serialize>(&mut self, period: i32, cohort: usize, record: &T) -> RecordResult<()> {
        // serde_json escapes tabs and newlines inside strings, so one record stays one line
        let json = serde_json::to_string(record)?;
        writeln!(self.inner, "{period}\t{cohort}\t{json}")?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(mut self) -> RecordResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{TopicRecord, VertexRecord, SCHEMA_VERSION};

    fn topic(period: i32, label: &str) -> TopicRecord {
        TopicRecord {
            schema_version: SCHEMA_VERSION,
            period,
            cohort: 5,
            seeds: vec![VertexRecord { id: 1, label: label.into() }],
            members: vec![VertexRecord { id: 2, label: "tab\there".into() }],
        }
    }

    #[test]
    fn test_write_then_read() {
        let mut writer = TsvWriter::new(Vec::new()).unwrap();
        writer.write_row(2001, 5, &topic(2001, "a")).unwrap();
        writer.write_row(2002, 5, &topic(2002, "b")).unwrap();
        assert_eq!(writer.rows(), 2);
        let bytes = writer.into_inner().unwrap();

        let log: TsvLog<TopicRecord> = read_tsv(bytes.as_slice()).unwrap();
        assert_eq!(log.skipped, 0);
        assert_eq!(log.rows.len(), 2);
        assert_eq!(log.rows[1].period, 2002);
        assert_eq!(log.rows[0].record.members[0].label, "tab\there");
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let good = serde_json::to_string(&topic(1, "a")).unwrap();
        let text = format!(
            "{HEADER}\n1\t5\t{good}\nonly-one-column\nx\t5\t{good}\n1\tfive\t{good}\n1\t5\t{{not json\n\n2\t5\t{good}\n"
        );
        let log: TsvLog<TopicRecord> = read_tsv(text.as_bytes()).unwrap();
        assert_eq!(log.rows.len(), 2);
        assert_eq!(log.skipped, 4);
    }

    #[test]
    fn test_wrong_schema_version_is_skipped() {
        let mut record = topic(1, "a");
        record.schema_version = 2;
        let text = format!("1\t5\t{}\n", serde_json::to_string(&record).unwrap());
        let log: TsvLog<TopicRecord> = read_tsv(text.as_bytes()).unwrap();
        assert!(log.rows.is_empty());
        assert_eq!(log.skipped, 1);
    }
}
