//! Load-state lifecycle with stale-result protection.
//!
//! A [`Lifecycle`] owns one [`LoadState`] and hands out a [`Ticket`] per
//! activation. Only the newest ticket may settle the state, and nothing may
//! settle it after [`Lifecycle::teardown`]. Cancellation is cooperative: the
//! stale fetch still runs to completion, its result is just dropped.
//!
//! ```text
//!   begin() ──▶ Pending ──settle(Ok)──▶ Ready(T)
//!                  │
//!                  └──settle(Err)──▶ Failed(reason)
//! ```
//!
//! The state is published through a `tokio::sync::watch` channel and is
//! always replaced wholesale. The generation check, the teardown check and
//! the write run inside the channel's update closure, so a `settle` can never
//! interleave with a newer `begin`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::watch;

use crate::models::LoadState;

/// Identifies one activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

pub struct Lifecycle<T> {
    state: watch::Sender<LoadState<T>>,
    generation: AtomicU64,
    torn_down: AtomicBool,
}

impl<T> Lifecycle<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LoadState::Pending);
        Self {
            state,
            generation: AtomicU64::new(0),
            torn_down: AtomicBool::new(false),
        }
    }

    /// Start a new activation: reset to `Pending` and supersede any earlier
    /// ticket. Returns `None` once torn down.
    pub fn begin(&self) -> Option<Ticket> {
        let mut ticket = None;
        self.state.send_if_modified(|state| {
            if self.torn_down.load(Ordering::Acquire) {
                return false;
            }
            let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            ticket = Some(Ticket(generation));
            *state = LoadState::Pending;
            true
        });
        ticket
    }

    /// Apply the outcome of the activation identified by `ticket`.
    ///
    /// Returns `false` (and leaves the state untouched) when the ticket has
    /// been superseded, the lifecycle is torn down, or this activation has
    /// already settled.
    pub fn settle(&self, ticket: Ticket, outcome: Result<T, String>) -> bool {
        self.state.send_if_modified(|state| {
            if self.torn_down.load(Ordering::Acquire)
                || self.generation.load(Ordering::Acquire) != ticket.0
                || !state.is_pending()
            {
                return false;
            }
            *state = match outcome {
                Ok(value) => LoadState::Ready(value),
                Err(reason) => LoadState::Failed(reason),
            };
            true
        })
    }

    /// Stop accepting results. Permanent for this instance.
    pub fn teardown(&self) {
        self.state.send_if_modified(|_| {
            self.torn_down.store(true, Ordering::Release);
            false
        });
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    /// `true` if `ticket` is still the newest activation.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.0
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState<T>> {
        self.state.subscribe()
    }
}

impl<T: Clone> Lifecycle<T> {
    pub fn snapshot(&self) -> LoadState<T> {
        self.state.borrow().clone()
    }
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Self::new()
    }
}
