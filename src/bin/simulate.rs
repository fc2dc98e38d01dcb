use chrono::{SecondsFormat, Utc};
use clap::Parser;
use maze_chase::autopilot::Autopilot;
use maze_chase::config::MatchOptions;
use maze_chase::engine::MatchEngine;
use maze_chase::input::InputQueue;
use maze_chase::types::{GameEvent, MatchOutcome, MatchPhase, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plays headless matches with the autopilot")]
struct Cli {
    #[arg(long, default_value_t = 1)]
    matches: u32,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..=1000))]
    frame_ms: u64,
    #[arg(long, default_value_t = 300)]
    max_seconds: u64,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Debug, Serialize)]
struct MatchResultLine {
    #[serde(rename = "match")]
    match_index: u32,
    seed: u64,
    outcome: Option<MatchOutcome>,
    #[serde(rename = "timedOut")]
    timed_out: bool,
    score: u32,
    #[serde(rename = "livesRemaining")]
    lives_remaining: u32,
    #[serde(rename = "remainingItems")]
    remaining_items: usize,
    #[serde(rename = "playingSeconds")]
    playing_seconds: f32,
    ticks: u64,
    pellets: u32,
    #[serde(rename = "powerPellets")]
    power_pellets: u32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct MatchRun {
    result: MatchResultLine,
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "matchCount")]
    match_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "bestScore")]
    best_score: u32,
    #[serde(rename = "averageScore")]
    average_score: f64,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    matches: Vec<MatchResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    timestamp: String,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    match_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    if cli.trace {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("maze_chase=debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    let started_at = now_rfc3339();
    let mut options = match cli.config.as_deref() {
        Some(path) => match MatchOptions::from_json_file(path) {
            Ok(options) => options,
            Err(error) => {
                let run_id = cli.run_id.clone().unwrap_or_else(|| "sim-config".to_string());
                emit_log(
                    "error",
                    "config_load_failed",
                    &run_id,
                    None,
                    None,
                    None,
                    json!({
                        "path": path.to_string_lossy(),
                        "error": error.to_string(),
                    }),
                );
                std::process::exit(2);
            }
        },
        None => MatchOptions::default(),
    };
    if let Some(seed) = cli.seed {
        options.seed = seed;
    }
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(options.seed, Utc::now().timestamp_millis()));

    let frame_seconds = cli.frame_ms as f32 / 1000.0;
    let max_ticks = (cli.max_seconds.saturating_mul(1000) / cli.frame_ms).max(1);
    let mut results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for match_index in 0..cli.matches {
        let mut match_options = options.clone();
        match_options.seed = options.seed.wrapping_add(u64::from(match_index));
        let seed = match_options.seed;
        emit_log(
            "info",
            "match_started",
            &run_id,
            Some(match_index),
            Some(seed),
            None,
            json!({
                "frameMs": cli.frame_ms,
                "maxTicks": max_ticks,
                "startingLives": match_options.starting_lives,
            }),
        );

        let engine = match MatchEngine::new(match_options) {
            Ok(engine) => engine,
            Err(error) => {
                emit_log(
                    "error",
                    "engine_setup_failed",
                    &run_id,
                    Some(match_index),
                    Some(seed),
                    None,
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        };

        let run = run_match(engine, match_index, seed, frame_seconds, max_ticks, &run_id);
        for anomaly in &run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(match_index),
                Some(seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }
        total_anomalies += run.anomaly_records.len();
        *outcome_counts
            .entry(outcome_key(run.result.outcome, run.result.timed_out))
            .or_insert(0) += 1;
        emit_log(
            "info",
            "match_finished",
            &run_id,
            Some(match_index),
            Some(seed),
            Some(run.finished_tick),
            json!({
                "outcome": run.result.outcome,
                "timedOut": run.result.timed_out,
                "score": run.result.score,
                "anomalyCount": run.anomaly_records.len(),
            }),
        );
        match serde_json::to_string(&run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                "error",
                "result_serialize_failed",
                &run_id,
                Some(match_index),
                Some(seed),
                None,
                json!({ "error": error.to_string() }),
            ),
        }
        results.push(run.result);
    }

    let has_anomaly = results.iter().any(|result| !result.anomalies.is_empty());
    let summary = build_run_summary(
        run_id.clone(),
        started_at,
        now_rfc3339(),
        results,
        outcome_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        None,
        json!({
            "matchCount": summary.match_count,
            "anomalyCount": summary.anomaly_count,
            "bestScore": summary.best_score,
            "averageScore": summary.average_score,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );
    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_match(
    mut engine: MatchEngine,
    match_index: u32,
    seed: u64,
    frame_seconds: f32,
    max_ticks: u64,
    run_id: &str,
) -> MatchRun {
    let pilot = Autopilot::default();
    let starting_lives = engine.lives();
    let mut input = InputQueue::new();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut timed_out = false;
    let mut ticks = 0u64;
    let mut last_tick = 0u64;

    while !matches!(engine.phase(), MatchPhase::Win | MatchPhase::GameOver) {
        if ticks >= max_ticks {
            timed_out = true;
            break;
        }
        pilot.drive(&engine, &mut input);
        engine.step(frame_seconds, &mut input);
        ticks += 1;

        let snapshot = engine.build_snapshot(true);
        last_tick = snapshot.tick;
        for message in collect_snapshot_anomalies(&snapshot, starting_lives) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        for event in &snapshot.events {
            if let GameEvent::AgentCaught { lives_remaining } = event {
                emit_log(
                    "info",
                    "agent_caught",
                    run_id,
                    Some(match_index),
                    Some(seed),
                    Some(snapshot.tick),
                    json!({
                        "livesRemaining": lives_remaining,
                        "score": snapshot.score,
                    }),
                );
            }
        }
    }

    let summary = engine.build_summary();
    MatchRun {
        result: MatchResultLine {
            match_index,
            seed,
            outcome: summary.outcome,
            timed_out,
            score: summary.score,
            lives_remaining: summary.lives_remaining,
            remaining_items: summary.remaining_items,
            playing_seconds: (summary.playing_seconds * 100.0).round() / 100.0,
            ticks: summary.ticks,
            pellets: summary.stats.pellets,
            power_pellets: summary.stats.power_pellets,
            ghosts_eaten: summary.stats.ghosts,
            lives_lost: summary.stats.lives_lost,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, starting_lives: u32) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.items.len() != snapshot.remaining_items {
        anomalies.push(format!(
            "item view mismatch: {} listed, {} remaining",
            snapshot.items.len(),
            snapshot.remaining_items
        ));
    }
    if snapshot.lives > starting_lives {
        anomalies.push(format!("lives above start: {}", snapshot.lives));
    }
    let agent = &snapshot.agent.position;
    if !agent.x.is_finite() || !agent.z.is_finite() {
        anomalies.push("agent position is not finite".to_string());
    }
    for ghost in &snapshot.ghosts {
        if !ghost.position.x.is_finite() || !ghost.position.z.is_finite() {
            anomalies.push(format!("ghost {} position is not finite", ghost.id));
        }
        if let Some(remaining) = ghost.evasion_remaining {
            if remaining <= 0.0 {
                anomalies.push(format!("ghost {} evasion timer at {remaining}", ghost.id));
            }
        }
    }
    if snapshot.phase == MatchPhase::Win && snapshot.remaining_items > 0 {
        anomalies.push("win declared with items left".to_string());
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u64, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn outcome_key(outcome: Option<MatchOutcome>, timed_out: bool) -> String {
    match (outcome, timed_out) {
        (Some(MatchOutcome::Win), _) => "win",
        (Some(MatchOutcome::GameOver), _) => "gameover",
        (None, true) => "timeout",
        (None, false) => "unfinished",
    }
    .to_string()
}

fn build_run_summary(
    run_id: String,
    started_at: String,
    finished_at: String,
    matches: Vec<MatchResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let match_count = matches.len();
    let best_score = matches.iter().map(|m| m.score).max().unwrap_or(0);
    let average_score = if match_count == 0 {
        0.0
    } else {
        matches.iter().map(|m| f64::from(m.score)).sum::<f64>() / match_count as f64
    };
    RunSummary {
        run_id,
        started_at,
        finished_at,
        match_count,
        anomaly_count,
        best_score,
        average_score,
        outcome_counts,
        matches,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    match_index: Option<u32>,
    seed: Option<u64>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp: now_rfc3339(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        match_index,
        seed,
        tick,
        details,
    };
    if let Ok(line) = serde_json::to_string(&log_line) {
        eprintln!("{line}");
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, summary_text)
}
