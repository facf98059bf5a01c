// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Result slot table: single-assignment outcomes keyed by correlation id.
//!
//! A producer (response delivered by the network thread) and a consumer (the
//! call site) meet on a correlation id, in either order:
//!
//! ```text
//! producer first:  settle(7) -> plant settled slot     await_or_create(7) -> finds it
//! consumer first:  await_or_create(7) -> plant pending settle(7) -> finds it, settles
//! ```
//!
//! The table mutex guards the check-and-insert only. Settling a slot and
//! waking its waiters happen after the table lock is released, so a slow
//! consumer of one id never stalls another id.
//!
//! A slot is settled at most once: later [`ResultSlots::settle`] calls for the
//! same id return `false` and change nothing.
//!
//! An entry leaves the table as soon as the second side arrives. The retired
//! slot moves to a bounded FIFO history (`DEFAULT_SETTLED_HISTORY` entries by
//! default), so a duplicate settle or an extra consumer that shows up shortly
//! after still sees the first outcome. Once evicted from the history, an id
//! is unknown again and a new settle for it starts a fresh slot.

use crate::config::DEFAULT_SETTLED_HISTORY;
use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Correlation id shared by the request and its asynchronous outcome.
pub type SlotId = u32;

struct Slot<T, E> {
    outcome: Mutex<Option<Result<T, E>>>,
    ready: Condvar,
    #[cfg(feature = "async")]
    notify: tokio::sync::Notify,
}

impl<T: Clone, E: Clone> Slot<T, E> {
    fn with(outcome: Option<Result<T, E>>) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            ready: Condvar::new(),
            #[cfg(feature = "async")]
            notify: tokio::sync::Notify::new(),
        }
    }

    fn settle(&self, outcome: Result<T, E>) -> bool {
        {
            let mut current = self.outcome.lock();
            if current.is_some() {
                return false;
            }
            *current = Some(outcome);
        }
        self.ready.notify_all();
        #[cfg(feature = "async")]
        self.notify.notify_waiters();
        true
    }

    fn get(&self) -> Option<Result<T, E>> {
        self.outcome.lock().clone()
    }
}

/// Which side planted a live entry.
enum Live<T, E> {
    /// Consumer arrived first; the slot is still empty.
    Awaiting(Arc<Slot<T, E>>),
    /// Producer arrived first; the slot holds the outcome.
    Settled(Arc<Slot<T, E>>),
}

struct Table<T, E> {
    live: HashMap<SlotId, Live<T, E>>,
    retired: HashMap<SlotId, Arc<Slot<T, E>>>,
    order: VecDeque<(SlotId, Arc<Slot<T, E>>)>,
    history: usize,
}

impl<T, E> Table<T, E> {
    /// Move a slot whose both sides have arrived into the history.
    fn retire(&mut self, id: SlotId, slot: Arc<Slot<T, E>>) {
        if self.history == 0 {
            return;
        }
        if self.order.len() == self.history {
            if let Some((old_id, old)) = self.order.pop_front() {
                // The id may have been retired again since; keep the newer slot.
                if self
                    .retired
                    .get(&old_id)
                    .is_some_and(|current| Arc::ptr_eq(current, &old))
                {
                    self.retired.remove(&old_id);
                }
            }
        }
        self.retired.insert(id, slot.clone());
        self.order.push_back((id, slot));
    }
}

/// Table of pending and settled outcomes.
///
/// # Example
///
/// ```
/// use tagwire::ResultSlots;
///
/// let slots: ResultSlots<f64, String> = ResultSlots::new();
/// assert!(slots.settle(7, Ok(3.14)));
/// assert!(!slots.settle(7, Ok(2.71)));
/// assert_eq!(slots.await_or_create(7).wait(), Ok(3.14));
/// assert!(slots.is_empty());
/// ```
pub struct ResultSlots<T, E> {
    table: Mutex<Table<T, E>>,
}

impl<T: Clone, E: Clone> Default for ResultSlots<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, E: Clone> ResultSlots<T, E> {
    pub fn new() -> Self {
        Self::with_history(DEFAULT_SETTLED_HISTORY)
    }

    /// Table remembering up to `history` retired slots.
    pub fn with_history(history: usize) -> Self {
        Self {
            table: Mutex::new(Table {
                live: HashMap::new(),
                retired: HashMap::new(),
                order: VecDeque::with_capacity(history.min(DEFAULT_SETTLED_HISTORY)),
                history,
            }),
        }
    }

    /// Record the outcome for `id`.
    ///
    /// Returns `true` if this call settled the slot, `false` if an outcome was
    /// already recorded (first write wins).
    pub fn settle(&self, id: SlotId, outcome: Result<T, E>) -> bool {
        let existing = {
            let mut table = self.table.lock();
            if let Some(slot) = table.retired.get(&id) {
                slot.clone()
            } else {
                match table.live.get(&id) {
                    Some(Live::Settled(_)) => {
                        log::debug!("[slots] {} already settled; outcome dropped", id);
                        return false;
                    }
                    Some(Live::Awaiting(slot)) => {
                        let slot = slot.clone();
                        table.live.remove(&id);
                        table.retire(id, slot.clone());
                        slot
                    }
                    None => {
                        table
                            .live
                            .insert(id, Live::Settled(Arc::new(Slot::with(Some(outcome)))));
                        log::trace!("[slots] {} settled before any consumer", id);
                        return true;
                    }
                }
            }
        };

        let settled = existing.settle(outcome);
        if settled {
            log::trace!("[slots] {} settled for waiting consumer", id);
        } else {
            log::debug!("[slots] {} already settled; outcome dropped", id);
        }
        settled
    }

    /// Handle on the outcome for `id`, creating a pending slot if the producer
    /// has not been seen yet.
    pub fn await_or_create(&self, id: SlotId) -> Settlement<T, E> {
        let mut table = self.table.lock();
        if let Some(slot) = table.retired.get(&id) {
            return Settlement {
                id,
                slot: slot.clone(),
            };
        }
        let slot = match table.live.get(&id) {
            Some(Live::Awaiting(slot)) => slot.clone(),
            Some(Live::Settled(slot)) => {
                let slot = slot.clone();
                table.live.remove(&id);
                table.retire(id, slot.clone());
                slot
            }
            None => {
                let slot = Arc::new(Slot::with(None));
                table.live.insert(id, Live::Awaiting(slot.clone()));
                slot
            }
        };
        Settlement { id, slot }
    }

    /// Forget `id`, live or retired. Outstanding [`Settlement`]s keep working.
    ///
    /// Used by callers that give up on an outcome (timeout, cancelled call).
    pub fn release(&self, id: SlotId) -> bool {
        let mut table = self.table.lock();
        let live = table.live.remove(&id).is_some();
        let retired = table.retired.remove(&id).is_some();
        live || retired
    }

    /// Whether `id` is waiting for its second side.
    pub fn contains(&self, id: SlotId) -> bool {
        self.table.lock().live.contains_key(&id)
    }

    /// Number of ids waiting for their second side.
    pub fn len(&self) -> usize {
        self.table.lock().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().live.is_empty()
    }

    /// Number of retired slots still remembered.
    pub fn retired(&self) -> usize {
        self.table.lock().retired.len()
    }
}

impl<T, E> fmt::Debug for ResultSlots<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.lock();
        f.debug_struct("ResultSlots")
            .field("live", &table.live.len())
            .field("retired", &table.retired.len())
            .field("history", &table.history)
            .finish()
    }
}

/// Consumer side of one slot.
pub struct Settlement<T, E> {
    id: SlotId,
    slot: Arc<Slot<T, E>>,
}

impl<T, E> Clone for Settlement<T, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            slot: self.slot.clone(),
        }
    }
}

impl<T: Clone, E: Clone> Settlement<T, E> {
    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn is_settled(&self) -> bool {
        self.slot.outcome.lock().is_some()
    }

    /// Outcome if already settled.
    pub fn try_get(&self) -> Option<Result<T, E>> {
        self.slot.get()
    }

    /// Block until the slot is settled.
    ///
    /// Timeouts belong to the caller's RPC layer; use
    /// [`wait_timeout`](Self::wait_timeout) for a bounded wait.
    pub fn wait(&self) -> Result<T, E> {
        let mut outcome = self.slot.outcome.lock();
        loop {
            if let Some(result) = outcome.as_ref() {
                return result.clone();
            }
            self.slot.ready.wait(&mut outcome);
        }
    }

    /// Block until the slot is settled or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, E>> {
        let mut outcome = self.slot.outcome.lock();
        if outcome.is_none() {
            // Spurious wakeups are absorbed by the predicate.
            self.slot
                .ready
                .wait_while_for(&mut outcome, |o| o.is_none(), timeout);
        }
        outcome.clone()
    }

    /// Wait for the outcome without blocking the executor.
    #[cfg(feature = "async")]
    pub async fn settled(&self) -> Result<T, E> {
        loop {
            let mut notified = std::pin::pin!(self.slot.notify.notified());
            // Register before checking so a settle in between is not missed.
            notified.as_mut().enable();
            if let Some(result) = self.slot.get() {
                return result;
            }
            notified.await;
        }
    }
}

impl<T, E> fmt::Debug for Settlement<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settlement")
            .field("id", &self.id)
            .field("settled", &self.slot.outcome.lock().is_some())
            .finish()
    }
}
