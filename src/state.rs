use std::collections::HashMap;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::ErrorKind;
use crate::game_log::SortDirection;
use crate::model::{GameMatchup, PlayerProfile, SubjectKey, SubjectSummary};
use crate::refresh::{
    Callback, FetchTicket, RefreshCoordinator, RefreshState, Resolution, SubjectView,
    SubscriptionId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRequest {
    pub player_id: String,
    pub season: String,
    /// Team the player is shown under; only used for the accent color.
    pub team_id: String,
    pub profile: PlayerProfile,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Game(GameMatchup),
    Player(PlayerRequest),
}

impl FetchRequest {
    pub fn subject_key(&self) -> SubjectKey {
        match self {
            FetchRequest::Game(matchup) => SubjectKey::game(matchup.game_id.trim()),
            FetchRequest::Player(req) => SubjectKey::player(req.player_id.trim(), req.season.trim()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Fetch {
        ticket: FetchTicket,
        request: FetchRequest,
    },
}

#[derive(Debug, Clone)]
pub enum Delta {
    FetchResolved {
        ticket: FetchTicket,
        outcome: Result<SubjectSummary, ErrorKind>,
    },
}

/// Owner of all refresh state. Lives on one thread; fetch workers talk to it
/// only through `Delta` messages.
pub struct AppState {
    pub coordinator: RefreshCoordinator,
    requests: HashMap<SubjectKey, FetchRequest>,
    last_requested: HashMap<SubjectKey, Instant>,
    cmd_tx: Option<Sender<ProviderCommand>>,
    auto_refresh: Option<Duration>,
}

impl AppState {
    pub fn new(cmd_tx: Option<Sender<ProviderCommand>>) -> Self {
        Self {
            coordinator: RefreshCoordinator::new(),
            requests: HashMap::new(),
            last_requested: HashMap::new(),
            cmd_tx,
            auto_refresh: None,
        }
    }

    pub fn with_auto_refresh(mut self, interval: Option<Duration>) -> Self {
        self.auto_refresh = interval;
        self
    }

    /// Subscribes to `request`'s subject, starting the initial load if nobody
    /// watched it before.
    pub fn open(&mut self, request: FetchRequest, callback: Callback) -> (SubjectKey, SubscriptionId) {
        let key = request.subject_key();
        self.requests.insert(key.clone(), request);
        let (id, ticket) = self.coordinator.subscribe(key.clone(), callback);
        if let Some(ticket) = ticket {
            self.dispatch(ticket);
        }
        (key, id)
    }

    /// Drops one subscription. The last one to leave forgets the subject, so
    /// it is no longer auto-refreshed and an in-flight fetch cannot commit.
    pub fn close(&mut self, key: &SubjectKey, id: SubscriptionId) {
        if !self.coordinator.unsubscribe(key, id) {
            return;
        }
        if self.coordinator.subscriber_count(key) == 0 {
            debug!(subject = %key, "last subscriber left");
            self.requests.remove(key);
            self.last_requested.remove(key);
            self.coordinator.remove(key);
        }
    }

    /// Manual refresh (pull-to-refresh, header button). Returns `false` for
    /// a subject that was never opened.
    pub fn request_refresh(&mut self, key: &SubjectKey) -> bool {
        if !self.requests.contains_key(key) {
            debug!(subject = %key, "refresh for unknown subject ignored");
            return false;
        }
        let ticket = self.coordinator.request_refresh(key);
        self.dispatch(ticket);
        true
    }

    /// External timer hook: refreshes every opened subject whose interval has
    /// elapsed and which is not already fetching. Returns how many were issued.
    pub fn refresh_due(&mut self, now: Instant) -> usize {
        let Some(interval) = self.auto_refresh else {
            return 0;
        };
        let due: Vec<SubjectKey> = self
            .requests
            .keys()
            .filter(|key| !self.coordinator.view(key).is_busy())
            .filter(|key| {
                self.last_requested
                    .get(*key)
                    .is_none_or(|at| now.saturating_duration_since(*at) >= interval)
            })
            .cloned()
            .collect();
        for key in &due {
            self.request_refresh(key);
        }
        due.len()
    }

    pub fn view(&self, key: &SubjectKey) -> SubjectView {
        self.coordinator.view(key)
    }

    pub fn status(&self, key: &SubjectKey) -> RefreshState {
        self.coordinator.status(key)
    }

    fn dispatch(&mut self, ticket: FetchTicket) {
        let key = ticket.key().clone();
        self.last_requested.insert(key.clone(), Instant::now());
        let Some(request) = self.requests.get(&key).cloned() else {
            return;
        };
        let sent = self.cmd_tx.as_ref().is_some_and(|tx| {
            tx.send(ProviderCommand::Fetch {
                ticket: ticket.clone(),
                request,
            })
            .is_ok()
        });
        if !sent {
            warn!(subject = %key, "provider worker unavailable");
            self.coordinator.resolve(
                &ticket,
                Err(ErrorKind::TransportFailure(
                    "provider worker unavailable".to_string(),
                )),
            );
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) -> Resolution {
    match delta {
        Delta::FetchResolved { ticket, outcome } => state.coordinator.resolve(&ticket, outcome),
    }
}
