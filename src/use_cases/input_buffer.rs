use crate::domain::PlayerInput;
use std::collections::VecDeque;
use tracing::{debug, warn};

// Default cap on pending inputs (~4 s of input at 60 Hz).
pub const DEFAULT_MAX_PENDING: usize = 256;

/// Pending local inputs held until the server acknowledges them.
///
/// Inputs are kept in ascending sequence order regardless of insertion order.
/// Every operation is total; there are no failure modes beyond an input being
/// rejected or dropped, and both are logged.
pub struct InputBuffer {
    inputs: VecDeque<PlayerInput>,
    last_processed_sequence: u64,
    max_pending: usize,
}

impl InputBuffer {
    pub fn new(max_pending: usize) -> Self {
        Self {
            inputs: VecDeque::new(),
            last_processed_sequence: 0,
            max_pending,
        }
    }

    /// Insert preserving ascending sequence order.
    ///
    /// Duplicate sequences are rejected, as are sequences already covered by
    /// an acknowledgement. When the buffer is full the oldest pending input
    /// is dropped to make room. Returns whether the input was stored.
    pub fn add_input(&mut self, input: PlayerInput) -> bool {
        if input.sequence <= self.last_processed_sequence {
            debug!(
                sequence = input.sequence,
                "ignoring already-acknowledged input"
            );
            return false;
        }

        let idx = self.inputs.partition_point(|i| i.sequence < input.sequence);
        if self
            .inputs
            .get(idx)
            .is_some_and(|i| i.sequence == input.sequence)
        {
            warn!(sequence = input.sequence, "duplicate input sequence rejected");
            return false;
        }

        if self.inputs.len() >= self.max_pending {
            if let Some(dropped) = self.inputs.pop_front() {
                warn!(
                    sequence = dropped.sequence,
                    "input buffer full; dropping oldest pending input"
                );
            }
        }

        let idx = self.inputs.partition_point(|i| i.sequence < input.sequence);
        self.inputs.insert(idx, input);
        true
    }

    /// Inputs newer than the last acknowledged sequence, in sequence order.
    /// Read-only and restartable.
    pub fn pending_inputs(&self) -> impl Iterator<Item = &PlayerInput> {
        self.inputs
            .iter()
            .filter(|i| i.sequence > self.last_processed_sequence)
    }

    /// Record an acknowledgement. The high-water mark never moves backwards;
    /// everything the mark now covers is discarded.
    pub fn mark_processed(&mut self, sequence: u64) {
        if sequence <= self.last_processed_sequence {
            return;
        }
        self.last_processed_sequence = sequence;
        while self
            .inputs
            .front()
            .is_some_and(|i| i.sequence <= sequence)
        {
            self.inputs.pop_front();
        }
    }

    pub fn last_processed_sequence(&self) -> u64 {
        self.last_processed_sequence
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Drop all pending inputs and reset the acknowledgement mark. Used when
    /// a session ends so nothing leaks into the next connection.
    pub fn clear(&mut self) {
        self.inputs.clear();
        self.last_processed_sequence = 0;
    }
}
