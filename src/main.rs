use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use tracing::info;

use courtside::config::{Config, StatsSource};
use courtside::fake_feed::FakeStatsProvider;
use courtside::feed::spawn_provider;
use courtside::game_log::{SortDirection, opponent_label};
use courtside::logging;
use courtside::model::{
    GameMatchup, PlayerProfile, PlayerViewModel, Side, SubjectKey, SubjectSummary, TeamIdentity,
    TeamStatsSummary,
};
use courtside::provider::{HttpStatsProvider, StatsProvider};
use courtside::quarter_scores::quarter_label;
use courtside::refresh::{Availability, RefreshState, SubjectView};
use courtside::state::{AppState, FetchRequest, PlayerRequest, apply_delta};
use courtside::team_colors::resolve_identity;

const USAGE: &str = "usage:
  courtside game <game_id> <home> <away> [--date YYYYMMDD] [--cycles N] [--json]
  courtside player <player_id> <season> [--team TEAM_ID] [--asc] [--cycles N] [--json]
                   [--name NAME] [--number N] [--exp YEARS] [--height F-I] [--weight LBS] [--school S]

<home>/<away> accept a team abbreviation (TOR) or provider team id.";

struct Args {
    request: FetchRequest,
    cycles: Option<usize>,
    json: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::init();

    let config = Config::from_env()?;
    let args = parse_args(std::env::args().skip(1).collect())?;
    let provider: Arc<dyn StatsProvider> = match config.stats_source {
        StatsSource::Http => Arc::new(HttpStatsProvider::new(config.clone())),
        StatsSource::Fake => Arc::new(FakeStatsProvider::new(config.fake_feed_seed)),
    };
    info!(source = ?config.stats_source, "starting");

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let worker = spawn_provider(provider, config.fetch_parallelism, tx, cmd_rx);

    let (view_tx, view_rx) = mpsc::channel::<SubjectView>();
    let mut state = AppState::new(Some(cmd_tx)).with_auto_refresh(config.auto_refresh);
    let (key, _subscription) = state.open(
        args.request,
        Box::new(move |_: &SubjectKey, view: &SubjectView| {
            let _ = view_tx.send(view.clone());
        }),
    );

    // Without a timer, keep cycling by hand until the requested count is reached.
    let cycles = args
        .cycles
        .or(if config.auto_refresh.is_some() { None } else { Some(1) });
    let mut committed = 0usize;
    loop {
        match rx.recv_timeout(Duration::from_millis(250)) {
            Ok(delta) => {
                apply_delta(&mut state, delta);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(anyhow!("provider worker stopped"));
            }
        }

        for view in view_rx.try_iter() {
            if !matches!(view.status, RefreshState::Ready | RefreshState::Error) {
                continue;
            }
            committed += 1;
            if args.json {
                println!("{}", serde_json::to_string(&view).context("serialize view")?);
            } else {
                print!("{}", render_view(&view));
            }
        }

        if cycles.is_some_and(|limit| committed >= limit) {
            break;
        }
        if config.auto_refresh.is_some() {
            state.refresh_due(Instant::now());
        } else if !state.view(&key).is_busy() {
            state.request_refresh(&key);
        }
    }

    drop(state);
    let _ = worker.join();
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Args> {
    let mut positional = Vec::new();
    let mut date = None;
    let mut team = None;
    let mut cycles = None;
    let mut json = false;
    let mut direction = SortDirection::Descending;
    let mut profile = PlayerProfile::default();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--asc" => direction = SortDirection::Ascending,
            "--date" => date = Some(iter.next().context("--date needs a value")?),
            "--team" => team = Some(iter.next().context("--team needs a value")?),
            "--name" => profile.name = iter.next().context("--name needs a value")?,
            "--number" => profile.jersey_number = iter.next().context("--number needs a value")?,
            "--exp" => profile.years_pro = iter.next().context("--exp needs a value")?,
            "--height" => profile.height = iter.next().context("--height needs a value")?,
            "--weight" => profile.weight_lbs = iter.next().context("--weight needs a value")?,
            "--school" => profile.school = iter.next().context("--school needs a value")?,
            "--cycles" => {
                let raw = iter.next().context("--cycles needs a value")?;
                let n = raw
                    .parse::<usize>()
                    .with_context(|| format!("invalid --cycles {raw:?}"))?;
                cycles = Some(n.max(1));
            }
            "-h" | "--help" => return Err(anyhow!(USAGE)),
            other if other.starts_with("--") => return Err(anyhow!("unknown flag {other}\n{USAGE}")),
            _ => positional.push(arg),
        }
    }

    let request = match positional.as_slice() {
        [kind, game_id, home, away] if kind == "game" => FetchRequest::Game(GameMatchup {
            game_id: game_id.trim().to_string(),
            game_date: date.unwrap_or_else(|| Utc::now().format("%Y%m%d").to_string()),
            home: team_identity(home, Side::Home),
            away: team_identity(away, Side::Away),
        }),
        [kind, player_id, season] if kind == "player" => FetchRequest::Player(PlayerRequest {
            player_id: player_id.clone(),
            season: season.clone(),
            team_id: team.unwrap_or_default(),
            profile,
            direction,
        }),
        _ => return Err(anyhow!(USAGE)),
    };
    Ok(Args {
        request,
        cycles,
        json,
    })
}

fn team_identity(raw: &str, side: Side) -> TeamIdentity {
    if raw.chars().all(|c| c.is_ascii_digit()) {
        resolve_identity(raw, "", side)
    } else {
        resolve_identity("", raw, side)
    }
}

fn render_view(view: &SubjectView) -> String {
    let mut out = format!(
        "== {:?} (generation {}{})\n",
        view.status,
        view.generation,
        if view.stale { ", stale" } else { "" }
    );
    if let Some(err) = view.error.as_ref() {
        let hint = if err.is_retryable() { " (refresh to retry)" } else { "" };
        out.push_str(&format!("error: {err}{hint}\n"));
    }
    match (view.availability(), view.summary.as_deref()) {
        (Availability::NotLoaded, _) | (_, None) => out.push_str("no data yet\n"),
        (Availability::NotYetAvailable, Some(SubjectSummary::Game(_))) => {
            out.push_str("team stats available after tip off\n")
        }
        (Availability::NotYetAvailable, Some(SubjectSummary::Player(_))) => {
            out.push_str("no games logged this season\n")
        }
        (Availability::Populated, Some(SubjectSummary::Game(summary))) => {
            out.push_str(&render_game(summary))
        }
        (Availability::Populated, Some(SubjectSummary::Player(player))) => {
            out.push_str(&render_player(player))
        }
    }
    out
}

fn render_game(summary: &TeamStatsSummary) -> String {
    let home = &summary.home.abbreviation;
    let away = &summary.away.abbreviation;
    let mut out = String::new();

    out.push_str(&format!("{:<5}{away:>5}{home:>5}\n", ""));
    for q in &summary.quarter_scores {
        out.push_str(&format!(
            "{:<5}{:>5}{:>5}{}\n",
            quarter_label(q.quarter),
            q.away_points,
            q.home_points,
            if q.provisional { "  *" } else { "" }
        ));
    }

    if let Some(last) = summary.entries.last() {
        let leader = match last.leading_team_id.as_deref() {
            Some(id) if id == summary.home.team_id => home.as_str(),
            Some(_) => away.as_str(),
            None => "tied",
        };
        out.push_str(&format!("lead: {leader} by {}\n", last.margin));
    }
    out.push_str(&format!(
        "times tied: {}  lead changes: {}\n",
        summary.times_tied, summary.lead_changes
    ));

    for row in &summary.boxscore {
        let abbr = if row.team_id == summary.home.team_id { home } else { away };
        out.push_str(&format!(
            "{abbr:<5} pts {:>3} reb {:>3} ast {:>3} stl {:>2} blk {:>2} tov {:>2} fg% {}\n",
            row.points,
            row.rebounds,
            row.assists,
            row.steals,
            row.blocks,
            row.turnovers,
            row.field_goal_pct
                .map(|v| format!("{v:.1}"))
                .unwrap_or_else(|| "-".to_string())
        ));
    }
    out
}

fn render_player(player: &PlayerViewModel) -> String {
    let dash = &player.dashboard;
    let profile = &player.profile;
    let avg = |v: Option<f32>| v.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string());
    let mut out = String::new();
    if !profile.name.is_empty() {
        let height = player
            .height_ft_in
            .map(|(ft, inch)| format!("{ft}ft {inch}in"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "#{} {}  years pro: {}  {height} | {}lbs  {}\n",
            profile.jersey_number, profile.name, profile.years_pro, profile.weight_lbs, profile.school
        ));
    }
    out.push_str(&format!(
        "player {} {}  {} MPG  {} PPG  {} RPG  {} APG\nimage: {}\n",
        player.player_id,
        player.season,
        avg(dash.minutes),
        avg(dash.points),
        avg(dash.rebounds),
        avg(dash.assists),
        player.image_url
    ));
    for row in &player.game_log {
        out.push_str(&format!(
            "{:<12} {:<1} {:<8} {:>3} pts {:>3} reb {:>3} ast\n",
            row.game_date,
            row.result,
            opponent_label(&row.matchup).unwrap_or_default(),
            row.points,
            row.rebounds,
            row.assists
        ));
    }
    out
}
