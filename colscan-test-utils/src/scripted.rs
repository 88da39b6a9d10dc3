//! Storage opener whose batches and failures are scripted up front.
//!
//! Used to drive the scan adapter through paths that real storage only
//! produces under fault conditions: open failures, I/O errors mid-scan and
//! failing closes.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use colscan_result::{Error, Result};
use colscan_storage::{ReadOptions, RecordReader, StorageOpener, StorageReader};
use colscan_types::{ColumnVector, RowBatch};

/// One scripted response to `read_batch`.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Batch(RowBatch),
    Fail(String),
}

impl ScriptStep {
    /// Batch with a single integer column.
    pub fn ints(values: &[i64], end_of_file: bool) -> Self {
        ScriptStep::Batch(RowBatch::new(
            values.len(),
            vec![ColumnVector::Long(values.to_vec())],
            end_of_file,
        ))
    }

    pub fn empty(end_of_file: bool) -> Self {
        ScriptStep::Batch(RowBatch::empty(end_of_file))
    }
}

#[derive(Debug, Default)]
struct ProbeState {
    opened: Vec<String>,
    read_calls: usize,
    read_batch_calls: usize,
    close_calls: usize,
    last_options: Option<ReadOptions>,
    max_rows: Vec<usize>,
}

/// Observes what the code under test did to a [`ScriptedStorage`].
#[derive(Debug, Clone, Default)]
pub struct ScriptProbe {
    state: Rc<RefCell<ProbeState>>,
}

impl ScriptProbe {
    pub fn opened_paths(&self) -> Vec<String> {
        self.state.borrow().opened.clone()
    }

    pub fn read_calls(&self) -> usize {
        self.state.borrow().read_calls
    }

    pub fn read_batch_calls(&self) -> usize {
        self.state.borrow().read_batch_calls
    }

    pub fn close_calls(&self) -> usize {
        self.state.borrow().close_calls
    }

    pub fn last_options(&self) -> Option<ReadOptions> {
        self.state.borrow().last_options.clone()
    }

    /// `max_rows` argument of every `read_batch` call, in order.
    pub fn requested_max_rows(&self) -> Vec<usize> {
        self.state.borrow().max_rows.clone()
    }
}

/// Storage opener replaying a fixed script.
///
/// Each `read_batch` pops the next [`ScriptStep`]; once the script runs out
/// the reader keeps returning empty end-of-file batches. Completed bytes
/// grow by eight per delivered row.
#[derive(Debug, Clone, Default)]
pub struct ScriptedStorage {
    steps: Vec<ScriptStep>,
    fail_open: Option<String>,
    fail_read: Option<String>,
    fail_close: Option<String>,
    probe: ScriptProbe,
}

impl ScriptedStorage {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    pub fn fail_open(mut self, message: impl Into<String>) -> Self {
        self.fail_open = Some(message.into());
        self
    }

    pub fn fail_read(mut self, message: impl Into<String>) -> Self {
        self.fail_read = Some(message.into());
        self
    }

    pub fn fail_close(mut self, message: impl Into<String>) -> Self {
        self.fail_close = Some(message.into());
        self
    }

    pub fn probe(&self) -> ScriptProbe {
        self.probe.clone()
    }
}

impl StorageOpener for ScriptedStorage {
    type Reader = ScriptedReader;

    fn open(&self, path: &str) -> Result<ScriptedReader> {
        self.probe.state.borrow_mut().opened.push(path.to_string());
        if let Some(message) = &self.fail_open {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                message.clone(),
            )));
        }
        Ok(ScriptedReader {
            steps: self.steps.clone().into(),
            fail_read: self.fail_read.clone(),
            fail_close: self.fail_close.clone(),
            probe: self.probe.clone(),
        })
    }
}

pub struct ScriptedReader {
    steps: VecDeque<ScriptStep>,
    fail_read: Option<String>,
    fail_close: Option<String>,
    probe: ScriptProbe,
}

impl StorageReader for ScriptedReader {
    fn read(&mut self, options: &ReadOptions) -> Result<Box<dyn RecordReader>> {
        {
            let mut state = self.probe.state.borrow_mut();
            state.read_calls += 1;
            state.last_options = Some(options.clone());
        }
        if let Some(message) = &self.fail_read {
            return Err(Error::storage(message));
        }
        Ok(Box::new(ScriptedRecords {
            steps: std::mem::take(&mut self.steps),
            probe: self.probe.clone(),
            completed_bytes: 0,
        }))
    }

    fn close(&mut self) -> Result<()> {
        self.probe.state.borrow_mut().close_calls += 1;
        match &self.fail_close {
            Some(message) => Err(Error::storage(message)),
            None => Ok(()),
        }
    }
}

struct ScriptedRecords {
    steps: VecDeque<ScriptStep>,
    probe: ScriptProbe,
    completed_bytes: u64,
}

impl RecordReader for ScriptedRecords {
    fn read_batch(&mut self, max_rows: usize) -> Result<RowBatch> {
        {
            let mut state = self.probe.state.borrow_mut();
            state.read_batch_calls += 1;
            state.max_rows.push(max_rows);
        }
        match self.steps.pop_front() {
            Some(ScriptStep::Batch(batch)) => {
                self.completed_bytes += 8 * batch.row_count as u64;
                Ok(batch)
            }
            Some(ScriptStep::Fail(message)) => Err(Error::Io(std::io::Error::other(message))),
            None => Ok(RowBatch::empty(true)),
        }
    }

    fn completed_bytes(&self) -> u64 {
        self.completed_bytes
    }
}
