use crate::engine::MatchEngine;
use crate::ghost::Ghost;
use crate::input::InputQueue;
use crate::maze::Maze;
use crate::types::{Direction, GhostBehavior, GridPos, MatchPhase};

const DANGER_RADIUS: usize = 4;
const CHASE_RADIUS: usize = 6;
/// Evading ghosts closer to expiry than this are left alone.
const MIN_PREY_SECONDS: f32 = 1.0;
const UNREACHABLE: usize = 99;

/// Scripted stand-in for a human player: flee, hunt, or graze.
#[derive(Clone, Copy, Debug)]
pub struct Autopilot {
    danger_radius: usize,
    chase_radius: usize,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(DANGER_RADIUS, CHASE_RADIUS)
    }
}

impl Autopilot {
    pub fn new(danger_radius: usize, chase_radius: usize) -> Self {
        Self {
            danger_radius,
            chase_radius,
        }
    }

    /// Queues this tick's input: start while ready, a direction while the match runs.
    pub fn drive(&self, engine: &MatchEngine, input: &mut InputQueue) {
        match engine.phase() {
            MatchPhase::Ready => input.request_start(),
            MatchPhase::Countdown | MatchPhase::Playing => {
                if let Some(dir) =
                    self.choose_direction(engine.maze(), engine.agent().cell(), engine.ghosts())
                {
                    input.request_direction(dir);
                }
            }
            MatchPhase::GameOver | MatchPhase::Win => {}
        }
    }

    pub fn choose_direction(
        &self,
        maze: &Maze,
        agent_cell: GridPos,
        ghosts: &[Ghost],
    ) -> Option<Direction> {
        let threats: Vec<GridPos> = ghosts
            .iter()
            .filter(|ghost| {
                matches!(
                    ghost.behavior(),
                    GhostBehavior::Pursue | GhostBehavior::Patrol
                )
            })
            .map(Ghost::cell)
            .collect();

        if nearest_distance(maze, agent_cell, &threats) <= self.danger_radius {
            if let Some(dir) = escape_direction(maze, agent_cell, &threats) {
                return Some(dir);
            }
        }

        let prey = ghosts
            .iter()
            .filter(|ghost| {
                ghost
                    .evasion_remaining()
                    .is_some_and(|left| left >= MIN_PREY_SECONDS)
            })
            .filter_map(|ghost| {
                let dist = maze.path_distance(agent_cell, ghost.cell())?;
                (dist <= self.chase_radius).then_some((dist, ghost.cell()))
            })
            .min_by_key(|(dist, _)| *dist);
        if let Some((_, target)) = prey {
            if let Some(dir) = maze.find_direction_bfs(agent_cell, target, None) {
                return Some(dir);
            }
        }

        maze.direction_to_nearest_item(agent_cell)
    }
}

fn nearest_distance(maze: &Maze, from: GridPos, targets: &[GridPos]) -> usize {
    targets
        .iter()
        .map(|target| maze.path_distance(from, *target).unwrap_or(UNREACHABLE))
        .min()
        .unwrap_or(UNREACHABLE)
}

/// Open direction whose neighbour is farthest from the closest threat.
fn escape_direction(maze: &Maze, from: GridPos, threats: &[GridPos]) -> Option<Direction> {
    let mut best = None;
    let mut best_dist = 0;
    for dir in maze.available_directions(from) {
        let dist = nearest_distance(maze, from.offset(dir), threats);
        if best.is_none() || dist > best_dist {
            best = Some(dir);
            best_dist = dist;
        }
    }
    best
}
