use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::agent::Agent;
use crate::config::MatchOptions;
use crate::error::EngineError;
use crate::ghost::{Ghost, GhostSpeeds};
use crate::input::InputSource;
use crate::maze::Maze;
use crate::types::{
    AgentView, CameraDistance, GameEvent, GhostBehavior, GhostView, GridPos, ItemKind, ItemView,
    MatchOutcome, MatchPhase, MatchStats, MatchSummary, Snapshot,
};

mod collision_system;
mod mode_schedule;
mod pickup_system;
mod utils;

pub use self::mode_schedule::ModeSchedule;
use self::utils::{chain_points, clamp_delta};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Ready,
    Countdown { remaining: f32 },
    Playing,
    GameOver,
    Win,
}

impl Phase {
    fn label(self) -> MatchPhase {
        match self {
            Self::Ready => MatchPhase::Ready,
            Self::Countdown { .. } => MatchPhase::Countdown,
            Self::Playing => MatchPhase::Playing,
            Self::GameOver => MatchPhase::GameOver,
            Self::Win => MatchPhase::Win,
        }
    }
}

/// Owns one maze, its agent and ghosts, and drives whole matches tick by tick.
#[derive(Clone, Debug)]
pub struct MatchEngine {
    options: MatchOptions,
    maze: Maze,
    agent: Agent,
    ghosts: Vec<Ghost>,
    schedule: ModeSchedule,
    rng: StdRng,

    phase: Phase,
    score: u32,
    high_score: u32,
    lives: u32,
    ghost_chain: u32,
    camera: CameraDistance,
    events: Vec<GameEvent>,
    stats: MatchStats,
    outcome: Option<MatchOutcome>,

    tick: u64,
    match_ticks: u64,
    animation_clock: f32,
    playing_seconds: f32,
}

impl MatchEngine {
    pub fn new(options: MatchOptions) -> Result<Self, EngineError> {
        let maze = match &options.layout {
            Some(rows) => Maze::parse(rows)?,
            None => Maze::classic()?,
        };
        Self::with_maze(options, maze)
    }

    pub fn with_maze(options: MatchOptions, maze: Maze) -> Result<Self, EngineError> {
        options.validate()?;

        let schedule = ModeSchedule::new(options.mode_schedule.clone());
        let speeds = GhostSpeeds {
            normal: options.ghost_speed,
            evasion: options.ghost_evasion_speed,
            recovery: options.ghost_recovery_speed,
        };
        let mode = schedule.current_mode();
        let ghosts = maze
            .ghost_spawns()
            .iter()
            .enumerate()
            .map(|(id, home)| {
                Ghost::new(
                    id,
                    *home,
                    maze.scatter_corner(id),
                    speeds,
                    options.recovery_hold_seconds,
                    mode,
                )
            })
            .collect();
        let agent = Agent::new(maze.agent_spawn(), options.agent_speed);

        info!(
            seed = options.seed,
            width = maze.width(),
            height = maze.height(),
            ghosts = maze.ghost_spawns().len(),
            items = maze.total_item_count(),
            "match engine created"
        );

        Ok(Self {
            rng: StdRng::seed_from_u64(options.seed),
            lives: options.starting_lives,
            options,
            maze,
            agent,
            ghosts,
            schedule,
            phase: Phase::Ready,
            score: 0,
            high_score: 0,
            ghost_chain: 0,
            camera: CameraDistance::default(),
            events: Vec::new(),
            stats: MatchStats::default(),
            outcome: None,
            tick: 0,
            match_ticks: 0,
            animation_clock: 0.0,
            playing_seconds: 0.0,
        })
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn schedule(&self) -> &ModeSchedule {
        &self.schedule
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase.label()
    }

    pub fn countdown_remaining(&self) -> f32 {
        match self.phase {
            Phase::Countdown { remaining } => remaining,
            _ => 0.0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn camera(&self) -> CameraDistance {
        self.camera
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn display_mode(&self) -> GhostBehavior {
        let any = |behavior: GhostBehavior| self.ghosts.iter().any(|g| g.behavior() == behavior);
        if any(GhostBehavior::Evasion) {
            GhostBehavior::Evasion
        } else if any(GhostBehavior::Recovery) {
            GhostBehavior::Recovery
        } else {
            self.schedule.current_mode().into()
        }
    }

    pub fn step<I: InputSource + ?Sized>(&mut self, dt: f32, input: &mut I) {
        let dt = clamp_delta(dt, self.options.max_delta_seconds);
        self.tick += 1;

        let frame = input.take_frame();
        if let Some(dir) = frame.direction {
            if matches!(self.phase, Phase::Countdown { .. } | Phase::Playing) {
                self.agent.queue_direction(dir);
            }
        }
        if frame.toggle_camera {
            self.camera = self.camera.toggled();
        }
        self.animation_clock += dt;

        match self.phase {
            Phase::Ready => {
                if frame.start {
                    self.set_phase(Phase::Countdown {
                        remaining: self.options.countdown_seconds,
                    });
                }
            }
            Phase::GameOver | Phase::Win => {
                if frame.start {
                    self.start_new_match();
                }
            }
            Phase::Countdown { remaining } => {
                self.match_ticks += 1;
                let left = remaining - dt;
                if left <= 0.0 {
                    self.set_phase(Phase::Playing);
                } else {
                    self.phase = Phase::Countdown { remaining: left };
                }
            }
            Phase::Playing => {
                self.match_ticks += 1;
                self.update_playing(dt);
            }
        }
    }

    fn update_playing(&mut self, dt: f32) {
        self.playing_seconds += dt;

        for cell in self.agent.advance(dt, &self.maze) {
            self.collect_item(cell);
        }
        if self.maze.remaining_item_count() == 0 {
            self.finish(MatchOutcome::Win);
            return;
        }

        if let Some(mode) = self.schedule.advance(dt) {
            debug!(?mode, index = self.schedule.index(), "mode schedule advanced");
            for ghost in &mut self.ghosts {
                ghost.set_mode(mode);
            }
            self.events.push(GameEvent::ModeChanged { mode });
        }

        let agent_cell = self.agent.cell();
        for ghost in &mut self.ghosts {
            ghost.advance(dt, agent_cell, &self.maze, &mut self.rng);
        }

        self.resolve_collisions();
    }

    fn set_phase(&mut self, phase: Phase) {
        let from = self.phase.label();
        self.phase = phase;
        let to = phase.label();
        if from != to {
            debug!(?from, ?to, tick = self.tick, "phase changed");
            self.events.push(GameEvent::PhaseChanged { phase: to });
        }
    }

    fn reset_round(&mut self) {
        self.agent.reset();
        self.schedule.reset();
        let mode = self.schedule.current_mode();
        for ghost in &mut self.ghosts {
            ghost.reset(mode);
        }
        self.ghost_chain = 0;
    }

    fn start_new_match(&mut self) {
        self.maze.reset_items();
        self.score = 0;
        self.lives = self.options.starting_lives;
        self.stats = MatchStats::default();
        self.outcome = None;
        self.match_ticks = 0;
        self.playing_seconds = 0.0;
        self.reset_round();
        info!(high_score = self.high_score, "new match");
        self.set_phase(Phase::Ready);
    }

    fn finish(&mut self, outcome: MatchOutcome) {
        self.outcome = Some(outcome);
        match outcome {
            MatchOutcome::Win => {
                info!(score = self.score, tick = self.tick, "match won");
                self.events.push(GameEvent::MatchWon { score: self.score });
                self.set_phase(Phase::Win);
            }
            MatchOutcome::GameOver => {
                info!(score = self.score, tick = self.tick, "match lost");
                self.events.push(GameEvent::MatchLost { score: self.score });
                self.set_phase(Phase::GameOver);
            }
        }
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let agent_motion = self.agent.motion();
        let agent = AgentView {
            cell: self.agent.cell(),
            position: self.agent.world_position(&self.maze),
            facing: self.agent.facing(),
            yaw: self.agent.facing().yaw(),
            moving: agent_motion.is_moving(),
        };
        let ghosts = self
            .ghosts
            .iter()
            .map(|ghost| GhostView {
                id: ghost.id(),
                cell: ghost.cell(),
                position: ghost.world_position(&self.maze),
                facing: ghost.facing(),
                yaw: ghost.facing().yaw(),
                behavior: ghost.behavior(),
                evasion_remaining: ghost.evasion_remaining(),
            })
            .collect();
        let items = self
            .maze
            .items()
            .map(|(cell, kind)| ItemView { cell, kind })
            .collect();

        Snapshot {
            tick: self.tick,
            phase: self.phase.label(),
            countdown_remaining: self.countdown_remaining(),
            score: self.score,
            high_score: self.high_score,
            lives: self.lives,
            mode: self.display_mode(),
            camera: self.camera,
            animation_clock: self.animation_clock,
            agent,
            ghosts,
            items,
            remaining_items: self.maze.remaining_item_count(),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }

    pub fn build_summary(&self) -> MatchSummary {
        MatchSummary {
            outcome: self.outcome,
            score: self.score,
            high_score: self.high_score,
            lives_remaining: self.lives,
            remaining_items: self.maze.remaining_item_count(),
            playing_seconds: self.playing_seconds,
            ticks: self.match_ticks,
            stats: self.stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModeEntry;
    use crate::constants::{DEFAULT_LAYOUT_PELLETS, DEFAULT_LAYOUT_POWER_PELLETS, EVASION_SECONDS};
    use crate::error::{ConfigError, MazeError};
    use crate::ghost::GhostState;
    use crate::input::InputQueue;
    use crate::motion::Motion;
    use crate::types::{Direction, GhostMode};

    const TICK: f32 = 0.05;

    // Ghost sealed away from a single lane of items.
    const LANE: &[&str] = &[
        "#######", //
        "#P...o#", //
        "#######", //
        "###G###", //
        "#######", //
    ];

    const POWER: &[&str] = &[
        "#########", //
        "#Po.....#", //
        "#.#####.#", //
        "#..GGG..#", //
        "#########", //
    ];

    // The sealed pellet below keeps the lane's single pellet from ending the match.
    const CHASE: &[&str] = &[
        "#########", //
        "#.P....G#", //
        "#########", //
        "#.#######", //
        "#########", //
    ];

    fn quick_options() -> MatchOptions {
        MatchOptions {
            countdown_seconds: 0.1,
            ..MatchOptions::default()
        }
    }

    fn pursue_only() -> MatchOptions {
        MatchOptions {
            mode_schedule: vec![ModeEntry {
                mode: GhostMode::Pursue,
                seconds: None,
            }],
            ..quick_options()
        }
    }

    fn engine_with(rows: &[&str], options: MatchOptions) -> MatchEngine {
        let maze = Maze::parse(rows).expect("fixture is valid");
        MatchEngine::with_maze(options, maze).expect("options are valid")
    }

    fn tick(engine: &mut MatchEngine) {
        engine.step(TICK, &mut InputQueue::new());
    }

    fn tick_with(engine: &mut MatchEngine, dir: Direction) {
        let mut input = InputQueue::new();
        input.request_direction(dir);
        engine.step(TICK, &mut input);
    }

    fn press_start(engine: &mut MatchEngine) {
        let mut input = InputQueue::new();
        input.request_start();
        engine.step(TICK, &mut input);
    }

    fn start_playing(engine: &mut MatchEngine) {
        press_start(engine);
        let mut guard = 0;
        while engine.phase() == MatchPhase::Countdown {
            tick(engine);
            guard += 1;
            assert!(guard < 200, "countdown never finished");
        }
        assert_eq!(engine.phase(), MatchPhase::Playing);
    }

    fn place_ghost(engine: &mut MatchEngine, idx: usize, cell: GridPos) {
        engine.ghosts[idx].motion = Motion::at(cell, Direction::Up);
    }

    #[test]
    fn fresh_match_counts_every_item() {
        let mut engine = MatchEngine::new(MatchOptions::default()).expect("defaults are valid");
        let expected = DEFAULT_LAYOUT_PELLETS + DEFAULT_LAYOUT_POWER_PELLETS;
        assert_eq!(engine.maze().remaining_item_count(), expected);
        assert_eq!(engine.maze().total_item_count(), expected);
        let snapshot = engine.build_snapshot(true);
        assert_eq!(snapshot.items.len(), expected);
        assert_eq!(snapshot.phase, MatchPhase::Ready);
        assert_eq!(snapshot.lives, 3);
        assert_eq!(snapshot.ghosts.len(), 4);
        for (id, ghost) in engine.ghosts().iter().enumerate() {
            assert_eq!(ghost.id(), id);
            assert_eq!(ghost.home(), engine.maze().ghost_spawns()[id]);
            assert_eq!(ghost.scatter_target(), engine.maze().scatter_corner(id));
        }
    }

    #[test]
    fn invalid_setup_is_rejected() {
        let options = MatchOptions {
            starting_lives: 0,
            ..MatchOptions::default()
        };
        assert!(matches!(
            MatchEngine::new(options),
            Err(EngineError::Config(ConfigError::Invalid(_)))
        ));

        let options = MatchOptions {
            layout: Some(vec!["#####".into(), "#P.#".into()]),
            ..MatchOptions::default()
        };
        assert!(matches!(
            MatchEngine::new(options),
            Err(EngineError::Maze(MazeError::RaggedRow { .. }))
        ));
    }

    #[test]
    fn layout_override_replaces_builtin_maze() {
        let options = MatchOptions {
            layout: Some(LANE.iter().map(|row| row.to_string()).collect()),
            ..MatchOptions::default()
        };
        let engine = MatchEngine::new(options).expect("layout is valid");
        assert_eq!(engine.maze().remaining_item_count(), 4);
        assert_eq!(engine.agent().cell(), GridPos::new(1, 1));
    }

    #[test]
    fn eating_the_last_item_wins_on_that_tick() {
        let mut engine = engine_with(LANE, quick_options());
        start_playing(&mut engine);
        tick_with(&mut engine, Direction::Right);

        let mut guard = 0;
        while engine.phase() == MatchPhase::Playing {
            assert!(engine.maze().remaining_item_count() > 0);
            tick(&mut engine);
            guard += 1;
            assert!(guard < 100, "agent never cleared the lane");
        }

        assert_eq!(engine.phase(), MatchPhase::Win);
        assert_eq!(engine.maze().remaining_item_count(), 0);
        assert_eq!(engine.score(), 3 * 10 + 50);
        let events = engine.build_snapshot(true).events;
        assert!(events.contains(&GameEvent::MatchWon { score: 80 }));
        assert!(events.contains(&GameEvent::PhaseChanged {
            phase: MatchPhase::Win
        }));

        let summary = engine.build_summary();
        assert_eq!(summary.outcome, Some(MatchOutcome::Win));
        assert_eq!(summary.stats.pellets, 3);
        assert_eq!(summary.stats.power_pellets, 1);
        assert_eq!(summary.high_score, 80);
    }

    #[test]
    fn power_pellet_frightens_all_but_recovering_ghosts() {
        let mut engine = engine_with(POWER, quick_options());
        start_playing(&mut engine);
        engine.ghosts[1].state = GhostState::Recovery { hold: 0.5 };

        tick_with(&mut engine, Direction::Right);
        let mut guard = 0;
        while engine.agent().cell() != GridPos::new(1, 2) {
            tick(&mut engine);
            guard += 1;
            assert!(guard < 20, "agent never reached the power pellet");
        }

        assert_eq!(engine.score(), 50);
        for idx in [0, 2] {
            let remaining = engine.ghosts()[idx]
                .evasion_remaining()
                .expect("ghost should be evading");
            assert!((remaining - (EVASION_SECONDS - TICK)).abs() < 1e-4);
        }
        assert_eq!(engine.ghosts()[1].behavior(), GhostBehavior::Recovery);
        assert_eq!(engine.display_mode(), GhostBehavior::Evasion);
        let events = engine.build_snapshot(true).events;
        assert!(events.contains(&GameEvent::PowerPelletEaten {
            cell: GridPos::new(1, 2)
        }));
    }

    #[test]
    fn power_pellet_sets_full_evasion_timer() {
        let mut engine = engine_with(POWER, quick_options());
        engine.collect_item(GridPos::new(1, 2));
        for ghost in engine.ghosts() {
            assert_eq!(ghost.evasion_remaining(), Some(EVASION_SECONDS));
        }
        assert_eq!(engine.maze().item_at(GridPos::new(1, 2)), None);
        engine.collect_item(GridPos::new(1, 2));
        assert_eq!(engine.score(), 50);
    }

    #[test]
    fn pursuing_ghost_costs_a_life_and_resets_the_round() {
        let mut engine = engine_with(CHASE, pursue_only());
        start_playing(&mut engine);

        let mut guard = 0;
        while engine.lives() == 3 {
            tick(&mut engine);
            guard += 1;
            assert!(guard < 100, "ghost never reached the agent");
        }

        assert_eq!(engine.lives(), 2);
        assert_eq!(engine.phase(), MatchPhase::Ready);
        assert_eq!(engine.agent().cell(), engine.agent().spawn());
        assert_eq!(engine.ghosts()[0].cell(), engine.ghosts()[0].home());
        assert!(!engine.ghosts()[0].motion().is_moving());
        assert_eq!(engine.schedule().index(), 0);

        let events = engine.build_snapshot(true).events;
        let caught: Vec<_> = events
            .iter()
            .filter(|event| matches!(event, GameEvent::AgentCaught { .. }))
            .collect();
        assert_eq!(caught, vec![&GameEvent::AgentCaught { lives_remaining: 2 }]);

        // Still on spawn cells on the following tick.
        tick(&mut engine);
        assert_eq!(engine.agent().cell(), engine.agent().spawn());
        assert_eq!(engine.ghosts()[0].cell(), engine.ghosts()[0].home());
    }

    #[test]
    fn last_life_ends_in_gameover() {
        let options = MatchOptions {
            starting_lives: 1,
            ..pursue_only()
        };
        let mut engine = engine_with(CHASE, options);
        start_playing(&mut engine);
        let mut guard = 0;
        while engine.phase() == MatchPhase::Playing {
            tick(&mut engine);
            guard += 1;
            assert!(guard < 100, "ghost never reached the agent");
        }
        assert_eq!(engine.phase(), MatchPhase::GameOver);
        assert_eq!(engine.lives(), 0);
        assert_eq!(engine.agent().cell(), engine.agent().spawn());
        assert_eq!(engine.build_summary().outcome, Some(MatchOutcome::GameOver));
        let events = engine.build_snapshot(true).events;
        assert!(events.contains(&GameEvent::MatchLost { score: 0 }));
    }

    #[test]
    fn only_one_hit_per_tick() {
        let mut engine = MatchEngine::new(quick_options()).expect("defaults are valid");
        engine.phase = Phase::Playing;
        let cell = engine.agent().cell();
        place_ghost(&mut engine, 0, cell);
        place_ghost(&mut engine, 1, cell);
        engine.resolve_collisions();
        assert_eq!(engine.lives(), 2);
        let hits = engine
            .pending_events()
            .iter()
            .filter(|event| matches!(event, GameEvent::AgentCaught { .. }))
            .count();
        assert_eq!(hits, 1);
    }

    fn agent_midway(engine: &mut MatchEngine, dir: Direction, progress: f32) -> GridPos {
        let spawn = engine.agent().cell();
        let mut motion = Motion::at(spawn, dir);
        motion.target = Some(spawn.offset(dir));
        motion.progress = progress;
        motion.heading = Some(dir);
        engine.agent.motion = motion;
        spawn.offset(dir)
    }

    #[test]
    fn collisions_use_world_distance_not_cells() {
        let mut engine = MatchEngine::new(quick_options()).expect("defaults are valid");
        engine.phase = Phase::Playing;
        let next = agent_midway(&mut engine, Direction::Right, 0.5);
        place_ghost(&mut engine, 0, next);
        assert_ne!(engine.agent().cell(), engine.ghosts()[0].cell());
        engine.resolve_collisions();
        assert_eq!(engine.lives(), 2);

        let mut engine = MatchEngine::new(quick_options()).expect("defaults are valid");
        engine.phase = Phase::Playing;
        let next = agent_midway(&mut engine, Direction::Right, 0.3);
        place_ghost(&mut engine, 0, next);
        engine.resolve_collisions();
        assert_eq!(engine.lives(), 3);
    }

    #[test]
    fn standing_on_adjacent_cells_is_not_a_hit() {
        let mut engine = MatchEngine::new(quick_options()).expect("defaults are valid");
        engine.phase = Phase::Playing;
        let cell = engine.agent().cell();
        place_ghost(&mut engine, 0, cell.offset(Direction::Left));
        let agent_pos = engine.agent().world_position(engine.maze());
        let ghost_pos = engine.ghosts()[0].world_position(engine.maze());
        assert!((agent_pos.distance(ghost_pos) - 1.0).abs() < 1e-6);

        engine.resolve_collisions();
        assert_eq!(engine.lives(), 3);
        assert_eq!(engine.phase(), MatchPhase::Playing);
        assert!(!engine
            .pending_events()
            .iter()
            .any(|event| matches!(event, GameEvent::AgentCaught { .. })));
    }

    #[test]
    fn evading_ghosts_are_eaten_with_a_doubling_chain() {
        let mut engine = MatchEngine::new(quick_options()).expect("defaults are valid");
        engine.phase = Phase::Playing;
        let cell = engine.agent().cell();
        for idx in 0..3 {
            place_ghost(&mut engine, idx, cell);
            engine.ghosts[idx].state = GhostState::Evasion { remaining: 5.0 };
        }
        engine.resolve_collisions();

        assert_eq!(engine.lives(), 3);
        assert_eq!(engine.score(), 200 + 400 + 800);
        assert_eq!(engine.stats().ghosts, 3);
        for ghost in &engine.ghosts()[..3] {
            assert_eq!(ghost.behavior(), GhostBehavior::Recovery);
        }
        let points: Vec<u32> = engine
            .build_snapshot(true)
            .events
            .iter()
            .filter_map(|event| match event {
                GameEvent::GhostEaten { points, .. } => Some(*points),
                _ => None,
            })
            .collect();
        assert_eq!(points, vec![200, 400, 800]);

        // A new power pellet restarts the chain; recovering ghosts stay harmless.
        engine.collect_item(GridPos::new(1, 1));
        place_ghost(&mut engine, 3, cell);
        engine.resolve_collisions();
        assert_eq!(engine.lives(), 3);
        assert_eq!(engine.score(), 1400 + 50 + 200);
        assert_eq!(engine.phase(), MatchPhase::Playing);
    }

    #[test]
    fn countdown_enters_playing_exactly_once() {
        let mut engine = MatchEngine::new(MatchOptions::default()).expect("defaults are valid");
        press_start(&mut engine);
        assert_eq!(engine.phase(), MatchPhase::Countdown);
        assert_eq!(engine.countdown_remaining(), 3.0);

        let mut entered = 0;
        let mut last_remaining = engine.countdown_remaining();
        for _ in 0..62 {
            tick(&mut engine);
            if engine.phase() == MatchPhase::Countdown {
                assert!(engine.countdown_remaining() < last_remaining);
                last_remaining = engine.countdown_remaining();
            }
            entered += engine
                .build_snapshot(true)
                .events
                .iter()
                .filter(|event| {
                    **event
                        == GameEvent::PhaseChanged {
                            phase: MatchPhase::Playing,
                        }
                })
                .count();
        }
        assert_eq!(entered, 1);
        assert_eq!(engine.phase(), MatchPhase::Playing);
    }

    #[test]
    fn oversized_delta_is_clamped() {
        let mut engine = MatchEngine::new(MatchOptions::default()).expect("defaults are valid");
        press_start(&mut engine);
        engine.step(1.0, &mut InputQueue::new());
        assert!((engine.countdown_remaining() - (3.0 - 0.05)).abs() < 1e-6);
        engine.step(f32::NAN, &mut InputQueue::new());
        assert!((engine.countdown_remaining() - (3.0 - 0.05)).abs() < 1e-6);
    }

    #[test]
    fn ready_ignores_direction_but_runs_cosmetics() {
        let mut engine = MatchEngine::new(MatchOptions::default()).expect("defaults are valid");
        tick_with(&mut engine, Direction::Left);
        tick(&mut engine);
        assert_eq!(engine.agent().queued_direction(), None);
        assert_eq!(engine.agent().cell(), engine.agent().spawn());
        let snapshot = engine.build_snapshot(false);
        assert!((snapshot.animation_clock - 2.0 * TICK).abs() < 1e-6);
        assert_eq!(snapshot.tick, 2);
    }

    #[test]
    fn camera_toggle_flips_distance() {
        let mut engine = MatchEngine::new(MatchOptions::default()).expect("defaults are valid");
        let mut input = InputQueue::new();
        input.request_camera_toggle();
        engine.step(TICK, &mut input);
        assert_eq!(engine.camera(), CameraDistance::Far);
        tick(&mut engine);
        assert_eq!(engine.camera(), CameraDistance::Far);
        input.request_camera_toggle();
        engine.step(TICK, &mut input);
        assert_eq!(engine.build_snapshot(false).camera, CameraDistance::Near);
    }

    #[test]
    fn snapshot_drains_events_only_when_requested() {
        let mut engine = MatchEngine::new(MatchOptions::default()).expect("defaults are valid");
        press_start(&mut engine);
        assert!(engine.build_snapshot(false).events.is_empty());
        assert!(!engine.pending_events().is_empty());
        let drained = engine.build_snapshot(true).events;
        assert_eq!(
            drained,
            vec![GameEvent::PhaseChanged {
                phase: MatchPhase::Countdown
            }]
        );
        assert!(engine.build_snapshot(true).events.is_empty());
    }

    #[test]
    fn display_mode_prefers_evasion_then_recovery() {
        let mut engine = MatchEngine::new(MatchOptions::default()).expect("defaults are valid");
        assert_eq!(engine.display_mode(), GhostBehavior::Patrol);
        engine.ghosts[0].state = GhostState::Recovery { hold: 0.0 };
        assert_eq!(engine.display_mode(), GhostBehavior::Recovery);
        engine.ghosts[1].state = GhostState::Evasion { remaining: 1.0 };
        assert_eq!(engine.build_snapshot(false).mode, GhostBehavior::Evasion);
    }

    #[test]
    fn schedule_changes_reach_every_ghost() {
        let options = MatchOptions {
            mode_schedule: vec![
                ModeEntry {
                    mode: GhostMode::Patrol,
                    seconds: Some(0.1),
                },
                ModeEntry {
                    mode: GhostMode::Pursue,
                    seconds: None,
                },
            ],
            ..quick_options()
        };
        let mut engine = MatchEngine::new(options).expect("options are valid");
        start_playing(&mut engine);
        engine.build_snapshot(true);
        for _ in 0..4 {
            tick(&mut engine);
        }
        assert_eq!(engine.schedule().index(), 1);
        for ghost in engine.ghosts() {
            assert_eq!(ghost.behavior(), GhostBehavior::Pursue);
        }
        let changes = engine
            .build_snapshot(true)
            .events
            .into_iter()
            .filter(|event| matches!(event, GameEvent::ModeChanged { .. }))
            .count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn restart_resets_match_but_keeps_high_score() {
        let options = MatchOptions {
            starting_lives: 1,
            ..pursue_only()
        };
        let mut engine = engine_with(CHASE, options);
        start_playing(&mut engine);
        tick_with(&mut engine, Direction::Left);
        let mut guard = 0;
        while engine.phase() == MatchPhase::Playing {
            tick(&mut engine);
            guard += 1;
            assert!(guard < 100, "ghost never reached the agent");
        }
        assert_eq!(engine.phase(), MatchPhase::GameOver);
        assert_eq!(engine.score(), 10);

        press_start(&mut engine);
        assert_eq!(engine.phase(), MatchPhase::Ready);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.high_score(), 10);
        assert_eq!(engine.lives(), 1);
        assert_eq!(engine.maze().remaining_item_count(), 2);
        assert_eq!(engine.build_summary().outcome, None);
        assert_eq!(engine.stats(), &MatchStats::default());

        press_start(&mut engine);
        assert_eq!(engine.phase(), MatchPhase::Countdown);
    }

    #[test]
    fn same_seed_produces_same_progression() {
        let options = MatchOptions {
            seed: 424_242,
            ..quick_options()
        };
        let mut a = MatchEngine::new(options.clone()).expect("options are valid");
        let mut b = MatchEngine::new(options).expect("options are valid");

        for step in 0..800usize {
            let mut input = InputQueue::new();
            if a.phase() != MatchPhase::Playing && a.phase() != MatchPhase::Countdown {
                input.request_start();
            }
            if step % 12 == 0 {
                input.request_direction(Direction::ALL[(step / 12) % 4]);
            }
            let mut input_b = input.clone();
            a.step(TICK, &mut input);
            b.step(TICK, &mut input_b);

            let sa = serde_json::to_string(&a.build_snapshot(true)).expect("snapshot serializes");
            let sb = serde_json::to_string(&b.build_snapshot(true)).expect("snapshot serializes");
            assert_eq!(sa, sb);
        }
    }
}
