//! Single-element exchange between neighbouring lanes of one group.
//!
//! Each lane owns one slot. A rotate is publish, barrier, read the
//! neighbour's slot, barrier; the second barrier keeps a fast lane from
//! overwriting its slot before a slow neighbour has read it. Neighbours
//! wrap around the group, so a lane that passes its value through
//! unchanged hands it back to where it came from.

use std::sync::{Mutex, PoisonError};

use crate::sync::{Aborted, LockstepBarrier};

/// Shared slot buffer for one lane group.
#[derive(Debug)]
pub struct LaneExchange<T> {
    slots: Vec<Mutex<T>>,
    barrier: LockstepBarrier,
}

impl<T: Copy + Default> LaneExchange<T> {
    /// Exchange for a group of `lanes` lanes.
    pub fn new(lanes: usize) -> Self {
        Self {
            slots: (0..lanes).map(|_| Mutex::new(T::default())).collect(),
            barrier: LockstepBarrier::new(lanes),
        }
    }

    /// Lanes in the group.
    pub fn lanes(&self) -> usize {
        self.barrier.parties()
    }

    /// Publish `value` and return the value published by lane `lane + 1`.
    pub fn pull_from_next(&self, lane: usize, value: T) -> Result<T, Aborted> {
        let from = (lane + 1) % self.lanes();
        self.rotate(lane, value, from)
    }

    /// Publish `value` and return the value published by lane `lane - 1`.
    pub fn pull_from_prev(&self, lane: usize, value: T) -> Result<T, Aborted> {
        let from = (lane + self.lanes() - 1) % self.lanes();
        self.rotate(lane, value, from)
    }

    fn rotate(&self, lane: usize, value: T, from: usize) -> Result<T, Aborted> {
        *self.slots[lane]
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = value;
        self.barrier.wait()?;
        let received = *self.slots[from]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.barrier.wait()?;
        Ok(received)
    }

    /// Release every lane blocked in a rotate.
    pub fn abort(&self) {
        self.barrier.abort();
    }
}
