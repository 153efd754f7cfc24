//! Reading transactions out of CSV files.
//!
//! Import files have a header row followed by rows of
//! `title, type, value, category`. Rows that don't describe a valid
//! transaction are skipped rather than failing the whole import.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::{sync::mpsc, task};
use tracing::debug;

use super::domain::transactions::{TransactionDetails, TransactionType};

/// How many parsed records the reader may get ahead of the consumer.
const RECORD_BUFFER_SIZE: usize = 64;

/// A row of an import file that describes a valid transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportRow {
    pub details: TransactionDetails,
    pub category: String,
}

#[derive(Debug, Error)]
pub enum ReadRowsError {
    #[error("could not read import file {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("import reader stopped unexpectedly: {0}")]
    ReaderFailed(#[from] task::JoinError),
}

/// Read every valid transaction row from a CSV file.
///
/// The file is read on a blocking thread which hands records over as they are
/// parsed. This returns once the reader has reached the end of the file.
///
/// # Returns
///
/// The valid rows in the order they appear in the file.
pub async fn read_rows(path: &Path) -> Result<Vec<ImportRow>, ReadRowsError> {
    let (sender, mut receiver) = mpsc::channel(RECORD_BUFFER_SIZE);

    let reader_path = path.to_path_buf();
    let reader = task::spawn_blocking(move || send_records(&reader_path, sender));

    let mut rows = Vec::new();

    // The channel closes when the reader is done with the file.
    while let Some(record) = receiver.recv().await {
        match parse_row(&record) {
            Some(row) => rows.push(row),
            None => debug!(?record, "Skipping malformed import row."),
        }
    }

    reader.await?.map_err(|source| ReadRowsError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(?path, rows = rows.len(), "Read import file.");

    Ok(rows)
}

fn send_records(path: &Path, sender: mpsc::Sender<StringRecord>) -> Result<(), csv::Error> {
    let file = File::open(path)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(BufReader::new(file));

    for result in reader.records() {
        match result {
            Ok(record) => {
                if sender.blocking_send(record).is_err() {
                    // Nobody is waiting for the rest of the file.
                    break;
                }
            }
            Err(error) if error.is_io_error() => return Err(error),
            Err(error) => debug!(%error, "Skipping unparseable import row."),
        }
    }

    Ok(())
}

/// Parse a single data row.
///
/// Returns [`None`] if the title, type or value cell is empty, or if the type
/// or value don't make sense for a transaction. Missing trailing cells are
/// treated as empty.
pub fn parse_row(record: &StringRecord) -> Option<ImportRow> {
    let cell = |index| record.get(index).map(str::trim).unwrap_or("");

    let (title, kind, value, category) = (cell(0), cell(1), cell(2), cell(3));

    if title.is_empty() || kind.is_empty() || value.is_empty() {
        return None;
    }

    let kind = kind.parse::<TransactionType>().ok()?;
    let value = value.parse::<Decimal>().ok()?;
    let details = TransactionDetails::new(title, value, kind).ok()?;

    Some(ImportRow {
        details,
        category: category.to_owned(),
    })
}
