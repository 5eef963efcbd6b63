//! Fetch lifecycle per subject key.
//!
//! ```text
//! Idle -> Loading -> Ready -> Refreshing -> Ready
//!            \          ^         /
//!             +-> Error +--------+
//! ```
//!
//! Every request bumps the key's generation and hands out a `FetchTicket`.
//! Only the ticket of the current generation can commit; anything older is
//! dropped without touching state or waking subscribers, so completion order
//! of concurrent fetches does not matter.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ErrorKind;
use crate::model::{SubjectKey, SubjectSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RefreshState {
    Idle,
    Loading,
    Ready,
    Refreshing,
    Error,
}

/// What the view should render when it is not showing an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Nothing committed yet; show a spinner.
    NotLoaded,
    /// A successful fetch with nothing in it, e.g. before tip-off.
    NotYetAvailable,
    Populated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectView {
    pub status: RefreshState,
    pub summary: Option<Arc<SubjectSummary>>,
    pub error: Option<ErrorKind>,
    /// Summary is from an earlier cycle: a refresh is pending or the last one failed.
    pub stale: bool,
    pub generation: u64,
}

impl SubjectView {
    fn idle() -> Self {
        Self {
            status: RefreshState::Idle,
            summary: None,
            error: None,
            stale: false,
            generation: 0,
        }
    }

    pub fn availability(&self) -> Availability {
        match self.summary.as_deref() {
            None => Availability::NotLoaded,
            Some(summary) if summary.is_empty() => Availability::NotYetAvailable,
            Some(_) => Availability::Populated,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.status, RefreshState::Loading | RefreshState::Refreshing)
    }
}

#[derive(Debug, Clone)]
pub struct FetchTicket {
    key: SubjectKey,
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

impl FetchTicket {
    pub fn key(&self) -> &SubjectKey {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Set once a newer request supersedes this one. Workers may check it to
    /// skip or abandon the transport call; committing is still guarded by the
    /// generation check.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Committed,
    Superseded,
    UnknownSubject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub type Callback = Box<dyn FnMut(&SubjectKey, &SubjectView) + Send>;

struct SubjectEntry {
    view: SubjectView,
    in_flight: Option<Arc<AtomicBool>>,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl SubjectEntry {
    fn new() -> Self {
        Self {
            view: SubjectView::idle(),
            in_flight: None,
            subscribers: Vec::new(),
        }
    }

    fn issue(&mut self, key: &SubjectKey) -> FetchTicket {
        if let Some(previous) = self.in_flight.take() {
            previous.store(true, Ordering::Release);
        }
        let cancelled = Arc::new(AtomicBool::new(false));
        self.in_flight = Some(cancelled.clone());
        self.view.generation += 1;
        FetchTicket {
            key: key.clone(),
            generation: self.view.generation,
            cancelled,
        }
    }

    fn notify(&mut self, key: &SubjectKey) {
        let view = self.view.clone();
        for (_, callback) in self.subscribers.iter_mut() {
            callback(key, &view);
        }
    }
}

#[derive(Default)]
pub struct RefreshCoordinator {
    subjects: HashMap<SubjectKey, SubjectEntry>,
    next_subscription: u64,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for committed transitions of `key`. The first
    /// subscription on an idle key starts the initial load and returns its ticket.
    pub fn subscribe(
        &mut self,
        key: SubjectKey,
        callback: Callback,
    ) -> (SubscriptionId, Option<FetchTicket>) {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        let entry = self.subjects.entry(key.clone()).or_insert_with(SubjectEntry::new);
        entry.subscribers.push((id, callback));

        if entry.view.status != RefreshState::Idle {
            return (id, None);
        }
        let ticket = entry.issue(&key);
        entry.view.status = RefreshState::Loading;
        debug!(subject = %key, generation = ticket.generation, "initial load");
        entry.notify(&key);
        (id, Some(ticket))
    }

    pub fn unsubscribe(&mut self, key: &SubjectKey, id: SubscriptionId) -> bool {
        let Some(entry) = self.subjects.get_mut(key) else {
            return false;
        };
        let before = entry.subscribers.len();
        entry.subscribers.retain(|(sub, _)| *sub != id);
        entry.subscribers.len() != before
    }

    pub fn subscriber_count(&self, key: &SubjectKey) -> usize {
        self.subjects
            .get(key)
            .map(|entry| entry.subscribers.len())
            .unwrap_or(0)
    }

    /// Starts a new generation for `key`. Any fetch still running for the key
    /// is superseded and its ticket flagged cancelled.
    pub fn request_refresh(&mut self, key: &SubjectKey) -> FetchTicket {
        let entry = self
            .subjects
            .entry(key.clone())
            .or_insert_with(SubjectEntry::new);
        let ticket = entry.issue(key);

        let next = match entry.view.status {
            RefreshState::Idle => RefreshState::Loading,
            RefreshState::Ready | RefreshState::Error => RefreshState::Refreshing,
            busy => busy,
        };
        debug!(subject = %key, generation = ticket.generation, ?next, "refresh requested");
        if next != entry.view.status {
            entry.view.status = next;
            entry.view.error = None;
            entry.view.stale = entry.view.summary.is_some();
            entry.notify(key);
        }
        ticket
    }

    /// Applies a fetch outcome if `ticket` is still the latest for its key.
    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<SubjectSummary, ErrorKind>,
    ) -> Resolution {
        let key = &ticket.key;
        let Some(entry) = self.subjects.get_mut(key) else {
            return Resolution::UnknownSubject;
        };
        let current = entry.view.generation == ticket.generation
            && entry
                .in_flight
                .as_ref()
                .is_some_and(|flag| Arc::ptr_eq(flag, &ticket.cancelled));
        if !current {
            debug!(
                subject = %key,
                generation = ticket.generation,
                latest = entry.view.generation,
                "discarding superseded result"
            );
            return Resolution::Superseded;
        }
        entry.in_flight = None;

        match outcome {
            Ok(summary) => {
                info!(subject = %key, generation = ticket.generation, empty = summary.is_empty(), "committed");
                entry.view.status = RefreshState::Ready;
                entry.view.summary = Some(Arc::new(summary));
                entry.view.error = None;
                entry.view.stale = false;
            }
            Err(err) => {
                warn!(subject = %key, generation = ticket.generation, error = %err, "fetch failed");
                entry.view.status = RefreshState::Error;
                entry.view.stale = entry.view.summary.is_some();
                entry.view.error = Some(err);
            }
        }
        entry.notify(key);
        Resolution::Committed
    }

    pub fn view(&self, key: &SubjectKey) -> SubjectView {
        self.subjects
            .get(key)
            .map(|entry| entry.view.clone())
            .unwrap_or_else(SubjectView::idle)
    }

    pub fn status(&self, key: &SubjectKey) -> RefreshState {
        self.subjects
            .get(key)
            .map(|entry| entry.view.status)
            .unwrap_or(RefreshState::Idle)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SubjectKey> {
        self.subjects.keys()
    }

    /// Forgets `key`; a fetch still running for it can no longer commit.
    pub fn remove(&mut self, key: &SubjectKey) -> bool {
        let Some(entry) = self.subjects.remove(key) else {
            return false;
        };
        if let Some(flag) = entry.in_flight {
            flag.store(true, Ordering::Release);
        }
        true
    }
}
