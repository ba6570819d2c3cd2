//! Reassembles rows from `ReadRows` cell chunks.
//!
//! The service streams a row as a run of chunks:
//!
//! ```text
//! chunk 1: row_key=r1 family=cf qualifier=a ts=2 value="x"
//! chunk 2:                      qualifier=b ts=1 value="ab" value_size=4
//! chunk 3:                                       value="cd"
//! chunk 4:                                                   commit_row
//! ```
//!
//! The row key is only present on the first chunk of a row, family and
//! qualifier are inherited until they change, and a value split across
//! chunks announces its total size with `value_size`. `reset_row` throws
//! away the row in progress. Rows arrive in strictly increasing key order.

use bytes::{Bytes, BytesMut};

use dfdl_proto::v2::read_rows_response::cell_chunk::RowStatus;
use dfdl_proto::v2::read_rows_response::CellChunk;
use dfdl_proto::v2::ReadRowsResponse;

use crate::error::{ClientError, ClientResult};
use crate::model::{Cell, Row};

fn invalid(reason: &str) -> ClientError {
    ClientError::InvalidChunk(reason.to_string())
}

/// A cell whose value is still arriving.
#[derive(Debug)]
struct PartialCell {
    family: String,
    qualifier: Bytes,
    timestamp_micros: i64,
    labels: Vec<String>,
    value: BytesMut,
}

impl PartialCell {
    fn into_cell(self) -> Cell {
        Cell {
            family: self.family,
            qualifier: self.qualifier,
            timestamp_micros: self.timestamp_micros,
            labels: self.labels,
            value: self.value.freeze(),
        }
    }
}

/// A row whose commit has not been seen yet.
#[derive(Debug)]
struct PartialRow {
    key: Bytes,
    cells: Vec<Cell>,
    family: Option<String>,
    qualifier: Option<Bytes>,
    cell: Option<PartialCell>,
}

impl PartialRow {
    fn new(key: Bytes) -> Self {
        Self {
            key,
            cells: Vec::new(),
            family: None,
            qualifier: None,
            cell: None,
        }
    }
}

/// Chunk-to-row state machine for one `ReadRows` call.
#[derive(Debug, Default)]
pub struct RowMerger {
    last_key: Option<Bytes>,
    row: Option<PartialRow>,
    rows_committed: u64,
}

impl RowMerger {
    /// Creates a merger for a fresh stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows completed so far.
    pub fn rows_committed(&self) -> u64 {
        self.rows_committed
    }

    /// Key of the last committed or scanned row.
    pub fn last_key(&self) -> Option<&Bytes> {
        self.last_key.as_ref()
    }

    /// Feeds one response and returns the rows it completed.
    pub fn push(&mut self, response: ReadRowsResponse) -> ClientResult<Vec<Row>> {
        let mut rows = Vec::new();
        for chunk in response.chunks {
            if let Some(row) = self.push_chunk(chunk)? {
                rows.push(row);
            }
        }

        if !response.last_scanned_row_key.is_empty() && self.row.is_none() {
            self.check_order(&response.last_scanned_row_key)?;
            self.last_key = Some(response.last_scanned_row_key);
        }
        Ok(rows)
    }

    /// Checks that the stream did not end inside a row.
    pub fn finish(&self) -> ClientResult<()> {
        match &self.row {
            Some(row) => Err(ClientError::InvalidChunk(format!(
                "stream ended before row {:?} was committed",
                String::from_utf8_lossy(&row.key)
            ))),
            None => Ok(()),
        }
    }

    fn check_order(&self, key: &Bytes) -> ClientResult<()> {
        match &self.last_key {
            Some(last) if key <= last => Err(invalid("row keys out of order")),
            _ => Ok(()),
        }
    }

    fn push_chunk(&mut self, chunk: CellChunk) -> ClientResult<Option<Row>> {
        if chunk.row_status == Some(RowStatus::ResetRow(true)) {
            return self.reset(&chunk);
        }

        let mut row = match self.row.take() {
            None => {
                if chunk.row_key.is_empty() {
                    return Err(invalid("new row is missing a row key"));
                }
                if chunk.family_name.is_none() {
                    return Err(invalid("new row is missing a family name"));
                }
                if chunk.qualifier.is_none() {
                    return Err(invalid("new row is missing a qualifier"));
                }
                self.check_order(&chunk.row_key)?;
                PartialRow::new(chunk.row_key.clone())
            }
            Some(row) => {
                if !chunk.row_key.is_empty() && chunk.row_key != row.key {
                    return Err(invalid("row key changed without a commit"));
                }
                if chunk.family_name.is_some() && chunk.qualifier.is_none() {
                    return Err(invalid("family changed without a qualifier"));
                }
                row
            }
        };

        let cell = match row.cell.take() {
            Some(mut cell) => {
                if chunk.family_name.is_some()
                    || chunk.qualifier.is_some()
                    || chunk.timestamp_micros != 0
                    || !chunk.labels.is_empty()
                {
                    return Err(invalid("split value chunk carries cell metadata"));
                }
                cell.value.extend_from_slice(&chunk.value);
                cell
            }
            None => {
                if let Some(family) = chunk.family_name {
                    row.family = Some(family);
                }
                if let Some(qualifier) = chunk.qualifier {
                    row.qualifier = Some(Bytes::from(qualifier));
                }
                let (Some(family), Some(qualifier)) = (row.family.clone(), row.qualifier.clone())
                else {
                    return Err(invalid("cell has no family or qualifier"));
                };
                let mut value = BytesMut::with_capacity(chunk.value_size.max(0) as usize);
                value.extend_from_slice(&chunk.value);
                PartialCell {
                    family,
                    qualifier,
                    timestamp_micros: chunk.timestamp_micros,
                    labels: chunk.labels,
                    value,
                }
            }
        };

        if chunk.value_size > 0 {
            if chunk.row_status == Some(RowStatus::CommitRow(true)) {
                return Err(invalid("commit_row in the middle of a split value"));
            }
            row.cell = Some(cell);
            self.row = Some(row);
            return Ok(None);
        }
        row.cells.push(cell.into_cell());

        if chunk.row_status == Some(RowStatus::CommitRow(true)) {
            self.last_key = Some(row.key.clone());
            self.rows_committed += 1;
            return Ok(Some(Row::new(row.key, row.cells)));
        }

        self.row = Some(row);
        Ok(None)
    }

    fn reset(&mut self, chunk: &CellChunk) -> ClientResult<Option<Row>> {
        if self.row.is_none() {
            return Err(invalid("reset_row with no row in progress"));
        }
        if !chunk.row_key.is_empty()
            || chunk.family_name.is_some()
            || chunk.qualifier.is_some()
            || chunk.timestamp_micros != 0
            || !chunk.labels.is_empty()
            || !chunk.value.is_empty()
        {
            return Err(invalid("reset_row chunk carries data"));
        }
        self.row = None;
        Ok(None)
    }
}
