//! Ring buffer of executed instructions.
//!
//! Filled by the engine when [`EngineConfig::trace_enabled`](crate::EngineConfig)
//! is set. The buffer keeps the most recent records and drops the oldest.

use std::collections::VecDeque;
use std::fmt;

use crate::instruction::Instruction;

// =============================================================================
// Trace Record
// =============================================================================

/// One executed instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceRecord {
    /// Monotonically increasing record ID.
    pub id: u64,
    /// Position of the instruction in its program.
    pub position: usize,
    /// Continuation depth when the instruction ran (0 = top-level program).
    pub depth: usize,
    /// The instruction itself.
    pub instruction: Instruction,
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:<5} [{}] {:4}  {}",
            self.id, self.depth, self.position, self.instruction
        )
    }
}

// =============================================================================
// Trace Buffer
// =============================================================================

/// A bounded ring buffer of [`TraceRecord`]s, oldest first.
#[derive(Clone, Debug)]
pub struct TraceBuffer {
    records: VecDeque<TraceRecord>,
    max_size: usize,
    next_id: u64,
}

impl TraceBuffer {
    /// Creates a new trace buffer with the given maximum size.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
            next_id: 0,
        }
    }

    /// Appends a record, evicting the oldest when full.
    ///
    /// Returns the assigned record ID.
    pub fn push(&mut self, position: usize, depth: usize, instruction: Instruction) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.records.push_back(TraceRecord {
            id,
            position,
            depth,
            instruction,
        });
        while self.records.len() > self.max_size {
            self.records.pop_front();
        }

        id
    }

    /// Returns the number of records in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the maximum number of records retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Clears all records. IDs keep increasing.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Returns an iterator over all records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter()
    }

    /// Returns the most recent N records, oldest first.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<&TraceRecord> {
        let start = self.records.len().saturating_sub(count);
        self.records.iter().skip(start).collect()
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}
