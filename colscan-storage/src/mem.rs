//! In-memory storage reader used for tests and examples.

use std::sync::{Arc, RwLock};

use colscan_result::{Error, Result};
use colscan_types::{ColumnHandle, ColumnVector, RowBatch, ScalarKind};
use rustc_hash::FxHashMap;

use crate::options::ReadOptions;
use crate::traits::{RecordReader, StorageOpener, StorageReader};

/// A table held entirely in memory, one vector per column.
#[derive(Debug, Clone)]
pub struct MemTable {
    columns: Vec<ColumnHandle>,
    data: Vec<ColumnVector>,
    row_count: usize,
}

impl MemTable {
    pub fn new(columns: Vec<ColumnHandle>, data: Vec<ColumnVector>) -> Result<Self> {
        if columns.len() != data.len() {
            return Err(Error::InvalidArgumentError(format!(
                "table has {} columns but {} vectors",
                columns.len(),
                data.len()
            )));
        }
        let row_count = data.first().map_or(0, ColumnVector::len);
        if let Some((col, vec)) = columns
            .iter()
            .zip(&data)
            .find(|(_, v)| v.len() != row_count)
        {
            return Err(Error::InvalidArgumentError(format!(
                "column {} has {} rows, expected {row_count}",
                col.name(),
                vec.len()
            )));
        }
        Ok(Self {
            columns,
            data,
            row_count,
        })
    }

    pub fn columns(&self) -> &[ColumnHandle] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }
}

/// In-memory storage keyed by path.
#[derive(Default)]
pub struct MemStorage {
    tables: RwLock<FxHashMap<String, Arc<MemTable>>>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_table(&self, path: impl Into<String>, table: MemTable) {
        self.tables
            .write()
            .expect("MemStorage tables write lock poisoned")
            .insert(path.into(), Arc::new(table));
    }
}

impl StorageOpener for MemStorage {
    type Reader = MemReader;

    fn open(&self, path: &str) -> Result<MemReader> {
        let table = self
            .tables
            .read()
            .expect("MemStorage tables read lock poisoned")
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("no table at path '{path}'")))?;
        tracing::debug!(path, rows = table.row_count(), "opened in-memory table");
        Ok(MemReader {
            path: path.to_string(),
            table,
            closed: false,
        })
    }
}

/// Open handle on one [`MemTable`].
pub struct MemReader {
    path: String,
    table: Arc<MemTable>,
    closed: bool,
}

impl MemReader {
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl StorageReader for MemReader {
    fn read(&mut self, options: &ReadOptions) -> Result<Box<dyn RecordReader>> {
        if self.closed {
            return Err(Error::storage(format!("reader for '{}' is closed", self.path)));
        }
        let table = &self.table;

        // Physical columns are emitted in table order, each at most once;
        // missing columns follow as null placeholders.
        let mut physical: Vec<usize> = Vec::new();
        let mut missing: Vec<String> = Vec::new();
        for name in options.included_columns() {
            match table.position(name) {
                Some(idx) => {
                    if !physical.contains(&idx) {
                        physical.push(idx);
                    }
                }
                None if options.is_tolerant_schema_evolution() => {
                    tracing::debug!(column = %name, path = %self.path, "column missing, reading as nulls");
                    if !missing.contains(name) {
                        missing.push(name.clone());
                    }
                }
                None => {
                    return Err(Error::NotFound(format!(
                        "column '{name}' not in '{}'",
                        self.path
                    )));
                }
            }
        }
        physical.sort_unstable();

        let projected = options
            .included_columns()
            .iter()
            .map(|name| match table.position(name) {
                Some(idx) => physical.iter().position(|p| *p == idx).unwrap_or_default(),
                None => {
                    physical.len() + missing.iter().position(|m| m == name).unwrap_or_default()
                }
            })
            .collect();

        let by_ordinal: FxHashMap<usize, usize> = table
            .columns
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.ordinal(), idx))
            .collect();
        let predicate = options.predicate();
        let selected: Vec<usize> = (0..table.row_count)
            .filter(|&row| {
                predicate.matches(|ordinal| {
                    let idx = *by_ordinal.get(&ordinal)?;
                    table.data[idx].value_at(row, table.columns[idx].kind())
                })
            })
            .filter(|&row| {
                !options.skips_corrupt_records() || !is_corrupt(table, &physical, row)
            })
            .collect();
        tracing::debug!(
            path = %self.path,
            selected = selected.len(),
            total = table.row_count,
            predicate = %predicate,
            "prepared in-memory read"
        );

        Ok(Box::new(MemRecordReader {
            table: Arc::clone(table),
            physical,
            missing: missing.len(),
            projected,
            selected,
            cursor: 0,
            completed_bytes: 0,
        }))
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::storage(format!(
                "reader for '{}' already closed",
                self.path
            )));
        }
        self.closed = true;
        Ok(())
    }
}

/// Text rows that are not valid UTF-8 cannot be decoded.
fn is_corrupt(table: &MemTable, physical: &[usize], row: usize) -> bool {
    physical.iter().any(|&idx| {
        matches!(table.columns[idx].kind(), ScalarKind::Text)
            && table.data[idx]
                .bytes_at(row)
                .is_some_and(|b| std::str::from_utf8(b).is_err())
    })
}

struct MemRecordReader {
    table: Arc<MemTable>,
    physical: Vec<usize>,
    missing: usize,
    projected: Vec<usize>,
    selected: Vec<usize>,
    cursor: usize,
    completed_bytes: u64,
}

impl RecordReader for MemRecordReader {
    fn read_batch(&mut self, max_rows: usize) -> Result<RowBatch> {
        if max_rows == 0 {
            return Err(Error::InvalidArgumentError(
                "max_rows must be positive".to_string(),
            ));
        }
        let end = self.cursor.saturating_add(max_rows).min(self.selected.len());
        let rows = &self.selected[self.cursor..end];
        self.cursor = end;

        let mut columns = Vec::with_capacity(self.physical.len() + self.missing);
        for &idx in &self.physical {
            let vector = self.table.data[idx].take(rows);
            self.completed_bytes += vector_bytes(&vector);
            columns.push(vector);
        }
        columns.extend((0..self.missing).map(|_| ColumnVector::Missing { len: rows.len() }));

        let end_of_file = self.cursor >= self.selected.len();
        Ok(RowBatch {
            row_count: rows.len(),
            columns,
            projected_columns: self.projected.clone(),
            end_of_file,
        })
    }

    fn completed_bytes(&self) -> u64 {
        self.completed_bytes
    }
}

fn vector_bytes(vector: &ColumnVector) -> u64 {
    match vector {
        ColumnVector::Long(v) => 8 * v.len() as u64,
        ColumnVector::Double(v) => 8 * v.len() as u64,
        ColumnVector::Bytes { slices, .. } => slices.iter().map(|(_, len)| *len as u64).sum(),
        ColumnVector::Missing { .. } => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::PredicateDescription;

    fn people() -> MemTable {
        MemTable::new(
            vec![
                ColumnHandle::new("id", ScalarKind::Integer, 0),
                ColumnHandle::new("name", ScalarKind::Text, 1),
            ],
            vec![
                ColumnVector::Long(vec![1, 2, 3]),
                ColumnVector::text(["ann", "bo", "cy"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = MemTable::new(
            vec![
                ColumnHandle::new("a", ScalarKind::Integer, 0),
                ColumnHandle::new("b", ScalarKind::Integer, 1),
            ],
            vec![ColumnVector::Long(vec![1]), ColumnVector::Long(vec![1, 2])],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentError(_)));
    }

    #[test]
    fn projection_maps_request_order_onto_table_order() {
        let storage = MemStorage::new();
        storage.insert_table("t", people());
        let mut reader = storage.open("t").unwrap();
        let opts = ReadOptions::new(
            vec!["name".into(), "id".into(), "name".into()],
            PredicateDescription::accept_all(),
        );
        let mut records = reader.read(&opts).unwrap();
        let batch = records.read_batch(10).unwrap();
        assert_eq!(batch.columns.len(), 2);
        assert_eq!(batch.projected_columns, vec![1, 0, 1]);
        assert!(batch.end_of_file);
        assert_eq!(records.completed_bytes(), 3 * 8 + 7);
    }

    #[test]
    fn close_twice_is_reported() {
        let storage = MemStorage::new();
        storage.insert_table("t", people());
        let mut reader = storage.open("t").unwrap();
        reader.close().unwrap();
        assert!(reader.is_closed());
        assert!(reader.close().is_err());
    }
}
