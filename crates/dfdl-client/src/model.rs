//! Rows, cells, mutations and queries.
//!
//! These are the backend-neutral values passed through the
//! [`TableAdmin`](crate::backend::TableAdmin) and
//! [`DataClient`](crate::backend::DataClient) traits.

use std::fmt;
use std::ops::Bound;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

/// A single versioned value at (row, family, qualifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Column family name.
    pub family: String,
    /// Column qualifier.
    pub qualifier: Bytes,
    /// Version, in microseconds since the epoch.
    pub timestamp_micros: i64,
    /// Labels applied by server-side filters.
    pub labels: Vec<String>,
    /// Cell contents.
    pub value: Bytes,
}

impl Cell {
    /// Creates a cell without labels.
    pub fn new(
        family: impl Into<String>,
        qualifier: impl Into<Bytes>,
        timestamp_micros: i64,
        value: impl Into<Bytes>,
    ) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
            timestamp_micros,
            labels: Vec::new(),
            value: value.into(),
        }
    }

    /// Returns true if the cell lives at `family:qualifier`.
    pub fn is_column(&self, family: &str, qualifier: &[u8]) -> bool {
        self.family == family && self.qualifier.as_ref() == qualifier
    }

    /// Returns the qualifier as text, replacing invalid UTF-8.
    pub fn qualifier_utf8(&self) -> String {
        String::from_utf8_lossy(&self.qualifier).into_owned()
    }

    /// Returns the value as text, replacing invalid UTF-8.
    pub fn value_utf8(&self) -> String {
        String::from_utf8_lossy(&self.value).into_owned()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Family: {}    Qualifier: {}    Value: {}",
            self.family,
            self.qualifier_utf8(),
            self.value_utf8()
        )
    }
}

/// A row and all of its cells, in the store's native cell order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Row key.
    pub key: Bytes,
    /// Cells grouped by family and qualifier, newest version first.
    pub cells: Vec<Cell>,
}

impl Row {
    /// Creates a row.
    pub fn new(key: impl Into<Bytes>, cells: Vec<Cell>) -> Self {
        Self {
            key: key.into(),
            cells,
        }
    }

    /// Returns the key as text, replacing invalid UTF-8.
    pub fn key_utf8(&self) -> String {
        String::from_utf8_lossy(&self.key).into_owned()
    }

    /// Returns every cell at `family:qualifier`, preserving row order.
    pub fn cells_for(&self, family: &str, qualifier: &[u8]) -> Vec<Cell> {
        self.cells
            .iter()
            .filter(|cell| cell.is_column(family, qualifier))
            .cloned()
            .collect()
    }

    /// Returns the newest cell at `family:qualifier`.
    pub fn latest(&self, family: &str, qualifier: &[u8]) -> Option<&Cell> {
        self.cells
            .iter()
            .filter(|cell| cell.is_column(family, qualifier))
            .max_by_key(|cell| cell.timestamp_micros)
    }
}

/// One `SetCell` entry of a [`RowMutation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCell {
    /// Column family name.
    pub family: String,
    /// Column qualifier.
    pub qualifier: Bytes,
    /// Explicit version. `None` uses the client clock at send time.
    pub timestamp_micros: Option<i64>,
    /// New contents.
    pub value: Bytes,
}

/// An atomic set of changes to one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMutation {
    /// Table id (not the fully-qualified name).
    pub table_id: String,
    /// Row key.
    pub row_key: Bytes,
    /// Changes, applied in order.
    pub cells: Vec<SetCell>,
}

impl RowMutation {
    /// Starts an empty mutation of `row_key` in `table_id`.
    pub fn create(table_id: impl Into<String>, row_key: impl Into<Bytes>) -> Self {
        Self {
            table_id: table_id.into(),
            row_key: row_key.into(),
            cells: Vec::new(),
        }
    }

    /// Adds a cell write versioned with the client clock.
    pub fn set_cell(
        mut self,
        family: impl Into<String>,
        qualifier: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Self {
        self.cells.push(SetCell {
            family: family.into(),
            qualifier: qualifier.into(),
            timestamp_micros: None,
            value: value.into(),
        });
        self
    }

    /// Adds a cell write with an explicit version.
    pub fn set_cell_at(
        mut self,
        family: impl Into<String>,
        qualifier: impl Into<Bytes>,
        timestamp_micros: i64,
        value: impl Into<Bytes>,
    ) -> Self {
        self.cells.push(SetCell {
            family: family.into(),
            qualifier: qualifier.into(),
            timestamp_micros: Some(timestamp_micros),
            value: value.into(),
        });
        self
    }

    /// Returns true if the mutation changes nothing.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A contiguous span of row keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRange {
    /// Lower bound.
    pub start: Bound<Bytes>,
    /// Upper bound.
    pub end: Bound<Bytes>,
}

impl RowRange {
    /// Every row in the table.
    pub fn unbounded() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// `[start, end)`.
    pub fn closed_open(start: impl Into<Bytes>, end: impl Into<Bytes>) -> Self {
        Self {
            start: Bound::Included(start.into()),
            end: Bound::Excluded(end.into()),
        }
    }

    /// `[start, end]`.
    pub fn closed(start: impl Into<Bytes>, end: impl Into<Bytes>) -> Self {
        Self {
            start: Bound::Included(start.into()),
            end: Bound::Included(end.into()),
        }
    }

    /// Every key beginning with `prefix`.
    pub fn prefix(prefix: impl Into<Bytes>) -> Self {
        let prefix = prefix.into();
        let end = match prefix_successor(&prefix) {
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };
        let start = if prefix.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(prefix)
        };
        Self { start, end }
    }

    /// Returns true if `key` falls inside the range.
    pub fn contains(&self, key: &[u8]) -> bool {
        let above_start = match &self.start {
            Bound::Included(start) => key >= start.as_ref(),
            Bound::Excluded(start) => key > start.as_ref(),
            Bound::Unbounded => true,
        };
        let below_end = match &self.end {
            Bound::Included(end) => key <= end.as_ref(),
            Bound::Excluded(end) => key < end.as_ref(),
            Bound::Unbounded => true,
        };
        above_start && below_end
    }
}

/// Smallest key greater than every key starting with `prefix`.
fn prefix_successor(prefix: &[u8]) -> Option<Bytes> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(Bytes::from(end));
        }
    }
    None
}

/// A multi-row read.
///
/// With no keys and no ranges the query covers the whole table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Table id.
    pub table_id: String,
    /// Individual keys to read.
    pub row_keys: Vec<Bytes>,
    /// Ranges to read.
    pub ranges: Vec<RowRange>,
    /// Maximum number of rows returned. `None` and `Some(0)` both mean no limit.
    pub limit: Option<u64>,
}

impl Query {
    /// Creates a query over the whole table.
    pub fn create(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            row_keys: Vec::new(),
            ranges: Vec::new(),
            limit: None,
        }
    }

    /// Adds a single key.
    pub fn row_key(mut self, key: impl Into<Bytes>) -> Self {
        self.row_keys.push(key.into());
        self
    }

    /// Adds a range.
    pub fn range(mut self, range: RowRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Adds every key beginning with `prefix`.
    pub fn prefix(self, prefix: impl Into<Bytes>) -> Self {
        self.range(RowRange::prefix(prefix))
    }

    /// Caps the number of rows returned. Zero means no limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if the query covers every row.
    pub fn is_full_table(&self) -> bool {
        self.row_keys.is_empty() && self.ranges.is_empty()
    }

    /// Returns true if the query selects `key`.
    pub fn matches(&self, key: &[u8]) -> bool {
        self.is_full_table()
            || self.row_keys.iter().any(|k| k.as_ref() == key)
            || self.ranges.iter().any(|r| r.contains(key))
    }
}

/// Column family settings for a new table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilySpec {
    /// Family name.
    pub name: String,
    /// Keep at most this many versions per cell. `None` keeps all.
    pub max_versions: Option<u32>,
}

/// Table to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    /// Table id.
    pub table_id: String,
    /// Column families.
    pub families: Vec<FamilySpec>,
}

impl TableSpec {
    /// Starts a table with no families.
    pub fn of(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            families: Vec::new(),
        }
    }

    /// Adds a family that keeps every version.
    pub fn add_family(mut self, name: impl Into<String>) -> Self {
        self.families.push(FamilySpec {
            name: name.into(),
            max_versions: None,
        });
        self
    }

    /// Adds a family that keeps at most `max_versions` versions.
    pub fn add_family_with_max_versions(mut self, name: impl Into<String>, max_versions: u32) -> Self {
        self.families.push(FamilySpec {
            name: name.into(),
            max_versions: Some(max_versions),
        });
        self
    }
}

/// Current time in microseconds, truncated to whole milliseconds.
///
/// Tables are created with millisecond granularity, which rejects versions
/// that are not multiples of 1000.
pub fn client_timestamp_micros() -> i64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    millis * 1000
}
