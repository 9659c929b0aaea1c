use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::grid::{Direction, Position};
use crate::tile::WallType;

/// A finished cell, ready to be handed to the host.
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub position: Position,
    pub wall_type: WallType,
    pub rotation: Direction,
    /// Set when the cell was already emitted once and is re-sent after
    /// backtracking carved another passage out of it.
    pub revisit: bool,
}

impl Placement {
    pub fn is_new(&self) -> bool {
        !self.revisit
    }

    pub fn rotation_units(&self) -> i32 {
        self.rotation.rotation_units()
    }
}

#[derive(Debug, Default)]
struct State {
    items: VecDeque<Placement>,
    closed: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    available: Condvar,
}

/// Unbounded FIFO shared by the generator and the placer.
///
/// Cloning yields another handle to the same queue. Once closed, the queue
/// is emptied and every further push is dropped.
#[derive(Debug, Clone, Default)]
pub struct PlacementQueue {
    shared: Arc<Shared>,
}

impl PlacementQueue {
    pub fn new() -> Self {
        Default::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a record; returns `false` if the queue is closed.
    pub fn push(&self, placement: Placement) -> bool {
        let mut state = self.lock();

        if state.closed {
            return false;
        }

        state.items.push_back(placement);
        drop(state);

        self.shared.available.notify_one();

        true
    }

    pub fn pop(&self) -> Option<Placement> {
        self.lock().items.pop_front()
    }

    /// Pops the oldest record, waiting up to `timeout` for one to arrive.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Placement> {
        let state = self.lock();

        let (mut state, _) = self
            .shared
            .available
            .wait_timeout_while(state, timeout, |state| {
                state.items.is_empty() && !state.closed
            })
            .unwrap_or_else(PoisonError::into_inner);

        state.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Drops everything queued and rejects later pushes.
    pub fn close(&self) {
        let mut state = self.lock();

        state.items.clear();
        state.closed = true;
        drop(state);

        self.shared.available.notify_all();
    }
}
