//! In-memory checkpoint store for testing.

use chrono::NaiveDateTime;
use std::sync::{Arc, Mutex, PoisonError};

use crate::checkpoint::{CheckpointError, CheckpointStore};

/// Checkpoint store kept in memory, recording every write.
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpointStore {
    value: Arc<Mutex<Option<NaiveDateTime>>>,
    writes: Arc<Mutex<Vec<NaiveDateTime>>>,
    fail_writes: bool,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing checkpoint.
    pub fn with_value(timestamp: NaiveDateTime) -> Self {
        let store = Self::default();
        *store.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(timestamp);
        store
    }

    /// A store whose writes always fail.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Every timestamp written, in order.
    pub fn writes(&self) -> Vec<NaiveDateTime> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn read(&self) -> Option<NaiveDateTime> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, timestamp: NaiveDateTime) -> Result<(), CheckpointError> {
        if self.fail_writes {
            return Err(CheckpointError::WriteFailed {
                path: "memory".into(),
                source: std::io::Error::other("write rejected"),
            });
        }

        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(timestamp);
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(timestamp);
        Ok(())
    }
}
