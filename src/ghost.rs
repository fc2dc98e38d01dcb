use rand::Rng;

use crate::maze::Maze;
use crate::motion::{advance_motion, Motion, Stepper};
use crate::types::{Direction, GhostBehavior, GhostMode, GridPos, WorldPos};

const SPAWN_FACING: Direction = Direction::Up;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GhostState {
    Pursue,
    Patrol,
    /// `remaining` is always positive while in this state.
    Evasion { remaining: f32 },
    /// Caught; frozen while `hold` runs down, then heads home.
    Recovery { hold: f32 },
}

impl From<GhostMode> for GhostState {
    fn from(mode: GhostMode) -> Self {
        match mode {
            GhostMode::Pursue => Self::Pursue,
            GhostMode::Patrol => Self::Patrol,
        }
    }
}

impl GhostState {
    pub fn behavior(self) -> GhostBehavior {
        match self {
            Self::Pursue => GhostBehavior::Pursue,
            Self::Patrol => GhostBehavior::Patrol,
            Self::Evasion { .. } => GhostBehavior::Evasion,
            Self::Recovery { .. } => GhostBehavior::Recovery,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostSpeeds {
    pub normal: f32,
    pub evasion: f32,
    pub recovery: f32,
}

#[derive(Clone, Debug)]
pub struct Ghost {
    id: usize,
    pub(crate) motion: Motion,
    pub(crate) state: GhostState,
    desired: GhostMode,
    home: GridPos,
    scatter: GridPos,
    speeds: GhostSpeeds,
    recovery_hold: f32,
}

/// Direction toward `target`: shortest-path first step without reversing `facing`,
/// then the greedy neighbour closest to `target`, reversing only when nothing else
/// is open.
pub fn steer_toward(
    maze: &Maze,
    from: GridPos,
    facing: Direction,
    target: GridPos,
) -> Option<Direction> {
    let available = maze.available_directions(from);
    if available.is_empty() {
        return None;
    }
    let forbidden = if available.len() > 1 {
        Some(facing.opposite())
    } else {
        None
    };

    if let Some(dir) = maze.find_direction_bfs(from, target, forbidden) {
        return Some(dir);
    }
    available
        .into_iter()
        .filter(|dir| Some(*dir) != forbidden)
        .min_by_key(|dir| from.offset(*dir).manhattan(target))
}

pub fn wander<R: Rng + ?Sized>(maze: &Maze, from: GridPos, rng: &mut R) -> Option<Direction> {
    let available = maze.available_directions(from);
    if available.is_empty() {
        return None;
    }
    Some(available[rng.random_range(0..available.len())])
}

struct GhostStepper<'a, R: Rng + ?Sized> {
    maze: &'a Maze,
    state: &'a mut GhostState,
    desired: GhostMode,
    home: GridPos,
    scatter: GridPos,
    agent_cell: GridPos,
    speeds: GhostSpeeds,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Stepper for GhostStepper<'_, R> {
    fn next_direction(&mut self, motion: &Motion) -> Option<Direction> {
        let cell = motion.cell();
        if matches!(*self.state, GhostState::Recovery { .. }) && cell == self.home {
            *self.state = self.desired.into();
        }
        let target = match *self.state {
            GhostState::Evasion { .. } => return wander(self.maze, cell, &mut *self.rng),
            GhostState::Pursue => self.agent_cell,
            GhostState::Patrol => self.scatter,
            GhostState::Recovery { .. } => self.home,
        };
        steer_toward(self.maze, cell, motion.facing(), target)
    }

    fn step_speed(&self) -> f32 {
        match *self.state {
            GhostState::Evasion { .. } => self.speeds.evasion,
            GhostState::Recovery { .. } => self.speeds.recovery,
            GhostState::Pursue | GhostState::Patrol => self.speeds.normal,
        }
    }
}

impl Ghost {
    pub fn new(
        id: usize,
        home: GridPos,
        scatter: GridPos,
        speeds: GhostSpeeds,
        recovery_hold: f32,
        mode: GhostMode,
    ) -> Self {
        Self {
            id,
            motion: Motion::at(home, SPAWN_FACING),
            state: mode.into(),
            desired: mode,
            home,
            scatter,
            speeds,
            recovery_hold,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> GhostState {
        self.state
    }

    pub fn behavior(&self) -> GhostBehavior {
        self.state.behavior()
    }

    pub fn desired_mode(&self) -> GhostMode {
        self.desired
    }

    pub fn evasion_remaining(&self) -> Option<f32> {
        match self.state {
            GhostState::Evasion { remaining } => Some(remaining),
            _ => None,
        }
    }

    pub fn home(&self) -> GridPos {
        self.home
    }

    pub fn scatter_target(&self) -> GridPos {
        self.scatter
    }

    pub fn cell(&self) -> GridPos {
        self.motion.cell()
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn facing(&self) -> Direction {
        self.motion.facing()
    }

    pub fn world_position(&self, maze: &Maze) -> WorldPos {
        self.motion.world_position(maze)
    }

    pub fn speed(&self) -> f32 {
        match self.state {
            GhostState::Evasion { .. } => self.speeds.evasion,
            GhostState::Recovery { .. } => self.speeds.recovery,
            GhostState::Pursue | GhostState::Patrol => self.speeds.normal,
        }
    }

    pub fn set_mode(&mut self, mode: GhostMode) {
        self.desired = mode;
        if matches!(self.state, GhostState::Pursue | GhostState::Patrol) {
            self.state = mode.into();
        }
    }

    /// Enters or extends evasion. Ghosts in recovery are unaffected.
    pub fn activate_evasion(&mut self, duration: f32) -> bool {
        match self.state {
            GhostState::Recovery { .. } => false,
            GhostState::Evasion { remaining } => {
                self.state = GhostState::Evasion {
                    remaining: remaining.max(duration),
                };
                true
            }
            GhostState::Pursue | GhostState::Patrol => {
                if duration > 0.0 {
                    self.state = GhostState::Evasion {
                        remaining: duration,
                    };
                }
                duration > 0.0
            }
        }
    }

    pub fn mark_caught(&mut self) -> bool {
        if !matches!(self.state, GhostState::Evasion { .. }) {
            return false;
        }
        self.state = GhostState::Recovery {
            hold: self.recovery_hold,
        };
        true
    }

    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        agent_cell: GridPos,
        maze: &Maze,
        rng: &mut R,
    ) -> Vec<GridPos> {
        let mut dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        match self.state {
            GhostState::Evasion { remaining } => {
                let left = remaining - dt;
                self.state = if left > 0.0 {
                    GhostState::Evasion { remaining: left }
                } else {
                    self.desired.into()
                };
            }
            GhostState::Recovery { hold } if hold > 0.0 => {
                if dt < hold {
                    self.state = GhostState::Recovery { hold: hold - dt };
                    return Vec::new();
                }
                dt -= hold;
                self.state = GhostState::Recovery { hold: 0.0 };
            }
            _ => {}
        }

        let mut stepper = GhostStepper {
            maze,
            state: &mut self.state,
            desired: self.desired,
            home: self.home,
            scatter: self.scatter,
            agent_cell,
            speeds: self.speeds,
            rng,
        };
        advance_motion(&mut self.motion, dt, &mut stepper)
    }

    pub fn reset(&mut self, mode: GhostMode) {
        self.motion = Motion::at(self.home, SPAWN_FACING);
        self.state = mode.into();
        self.desired = mode;
    }
}
