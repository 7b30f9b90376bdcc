//! Single-flight coordination for access-token refresh.
//!
//! DESIGN
//! ======
//! At most one refresh is outstanding. The first caller to see an expired
//! token gets a [`RefreshLease`] and performs the refresh; everyone else is
//! parked on a FIFO queue of oneshot channels and released with the
//! leader's outcome. The lease settles on drop, so the in-flight flag is
//! released exactly once on every path, including a dropped future.

#[cfg(test)]
#[path = "refresh_test.rs"]
mod refresh_test;

use std::cell::RefCell;
use std::collections::VecDeque;

use futures::channel::oneshot;

use crate::error::ApiError;

/// Outcome delivered to parked requests: the new access token or the
/// refresh failure.
pub type RefreshOutcome = Result<String, ApiError>;

#[derive(Default)]
struct CoordinatorState {
    in_flight: bool,
    waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

#[derive(Default)]
pub struct RefreshCoordinator {
    state: RefCell<CoordinatorState>,
}

/// Role handed out by [`RefreshCoordinator::begin_or_enqueue`].
pub enum RefreshTicket<'a> {
    /// This caller performs the refresh.
    Leader(RefreshLease<'a>),
    /// A refresh is already running; await its outcome.
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the refresh if none is running, otherwise join the queue.
    pub fn begin_or_enqueue(&self) -> RefreshTicket<'_> {
        let mut state = self.state.borrow_mut();
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            log::debug!("refresh in flight, parked request ({} waiting)", state.waiters.len());
            RefreshTicket::Waiter(rx)
        } else {
            state.in_flight = true;
            RefreshTicket::Leader(RefreshLease { coordinator: self, settled: false })
        }
    }

    pub fn in_flight(&self) -> bool {
        self.state.borrow().in_flight
    }

    pub fn waiting(&self) -> usize {
        self.state.borrow().waiters.len()
    }

    fn settle(&self, outcome: &RefreshOutcome) {
        // Take the queue before waking anyone so a released request that
        // immediately fails again starts a fresh cycle.
        let waiters = {
            let mut state = self.state.borrow_mut();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            // A dropped receiver means that caller went away.
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Exclusive right to run the current refresh.
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    /// Release the flag and deliver `outcome` to every parked request in
    /// the order they were parked.
    pub fn settle(mut self, outcome: &RefreshOutcome) {
        self.settled = true;
        self.coordinator.settle(outcome);
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            log::warn!("refresh abandoned before settling, rejecting parked requests");
            self.coordinator.settle(&Err(ApiError::Network("token refresh abandoned".to_owned())));
        }
    }
}
