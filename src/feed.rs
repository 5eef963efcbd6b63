use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::error::ErrorKind;
use crate::model::{SeasonType, SubjectSummary};
use crate::normalize::{normalize_dashboard_json, normalize_game_json, normalize_game_log_json};
use crate::provider::StatsProvider;
use crate::refresh::FetchTicket;
use crate::state::{Delta, FetchRequest, PlayerRequest, ProviderCommand};
use crate::summary::{PlayerInputs, build_player_view, build_team_stats_summary};

/// Worker thread that turns `ProviderCommand`s into `Delta`s. Each fetch runs
/// as its own job on a rayon pool; the thread exits once every command sender
/// is dropped.
pub fn spawn_provider(
    provider: Arc<dyn StatsProvider>,
    parallelism: usize,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let pool = build_fetch_pool(parallelism);
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Fetch { ticket, request } => {
                    let provider = provider.clone();
                    let tx = tx.clone();
                    let job = move || run_job(provider.as_ref(), ticket, request, &tx);
                    if let Some(pool) = pool.as_ref() {
                        pool.spawn(job);
                    } else {
                        thread::spawn(job);
                    }
                }
            }
        }
        debug!("provider command channel closed");
    })
}

fn run_job(provider: &dyn StatsProvider, ticket: FetchTicket, request: FetchRequest, tx: &Sender<Delta>) {
    if ticket.is_cancelled() {
        debug!(subject = %ticket.key(), generation = ticket.generation(), "skipping superseded fetch");
        return;
    }
    let Some(outcome) = fetch_summary(provider, &request, &ticket) else {
        return;
    };
    let _ = tx.send(Delta::FetchResolved { ticket, outcome });
}

/// Fetch, normalize and aggregate one subject. Returns `None` when the ticket
/// was superseded while the transport call was running; the payload is then
/// dropped without being parsed.
pub fn fetch_summary(
    provider: &dyn StatsProvider,
    request: &FetchRequest,
    ticket: &FetchTicket,
) -> Option<Result<SubjectSummary, ErrorKind>> {
    match request {
        FetchRequest::Game(matchup) => {
            info!(game_id = %matchup.game_id, generation = ticket.generation(), "fetching team stats");
            let body = provider.game_team_stats(matchup);
            if ticket.is_cancelled() {
                return None;
            }
            Some(
                body.map_err(|err| ErrorKind::transport(&err))
                    .and_then(|raw| normalize_game_json(&raw, matchup))
                    .map(|data| SubjectSummary::Game(build_team_stats_summary(&data))),
            )
        }
        FetchRequest::Player(req) => {
            info!(player_id = %req.player_id, season = %req.season, generation = ticket.generation(), "fetching player");
            let fetched = fetch_player_bodies(provider, req);
            if ticket.is_cancelled() {
                return None;
            }
            Some(fetched.and_then(|bodies| build_player_summary(provider, req, bodies)))
        }
    }
}

struct PlayerBodies {
    regular_season: String,
    playoffs: String,
    dashboard: String,
}

/// The three player requests go out together; any failure fails the cycle.
fn fetch_player_bodies(
    provider: &dyn StatsProvider,
    req: &PlayerRequest,
) -> Result<PlayerBodies, ErrorKind> {
    let (regular_season, (playoffs, dashboard)) = rayon::join(
        || provider.season_player_game_log(&req.player_id, &req.season, SeasonType::RegularSeason),
        || {
            rayon::join(
                || provider.season_player_game_log(&req.player_id, &req.season, SeasonType::Playoffs),
                || provider.player_dashboard_by_year(&req.player_id, &req.season),
            )
        },
    );
    Ok(PlayerBodies {
        regular_season: regular_season.map_err(|err| ErrorKind::transport(&err))?,
        playoffs: playoffs.map_err(|err| ErrorKind::transport(&err))?,
        dashboard: dashboard.map_err(|err| ErrorKind::transport(&err))?,
    })
}

fn build_player_summary(
    provider: &dyn StatsProvider,
    req: &PlayerRequest,
    bodies: PlayerBodies,
) -> Result<SubjectSummary, ErrorKind> {
    let inputs = PlayerInputs {
        regular_season: normalize_game_log_json(
            &bodies.regular_season,
            &req.player_id,
            SeasonType::RegularSeason,
        )?,
        playoffs: normalize_game_log_json(&bodies.playoffs, &req.player_id, SeasonType::Playoffs)?,
        dashboard: normalize_dashboard_json(&bodies.dashboard, &req.player_id, &req.season)?,
        image_url: provider.player_image_url(&req.player_id),
        player_id: req.player_id.trim().to_string(),
        season: req.season.trim().to_string(),
        team_id: req.team_id.clone(),
        profile: req.profile.clone(),
    };
    Ok(SubjectSummary::Player(build_player_view(inputs, req.direction)))
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|idx| format!("courtside-fetch-{idx}"))
        .build()
        .ok()
}
