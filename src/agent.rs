use crate::maze::Maze;
use crate::motion::{advance_motion, Motion, Stepper};
use crate::types::{Direction, GridPos, WorldPos};

const SPAWN_FACING: Direction = Direction::Left;

/// The player-controlled entity.
#[derive(Clone, Debug)]
pub struct Agent {
    pub(crate) motion: Motion,
    queued: Option<Direction>,
    spawn: GridPos,
    speed: f32,
}

struct AgentStepper<'a> {
    maze: &'a Maze,
    queued: &'a mut Option<Direction>,
    speed: f32,
}

impl Stepper for AgentStepper<'_> {
    fn next_direction(&mut self, motion: &Motion) -> Option<Direction> {
        let cell = motion.cell();
        if let Some(wanted) = *self.queued {
            if self.maze.is_walkable(cell.offset(wanted)) {
                *self.queued = None;
                return Some(wanted);
            }
        }
        motion
            .heading()
            .filter(|dir| self.maze.is_walkable(cell.offset(*dir)))
    }

    fn step_speed(&self) -> f32 {
        self.speed
    }
}

impl Agent {
    pub fn new(spawn: GridPos, speed: f32) -> Self {
        Self {
            motion: Motion::at(spawn, SPAWN_FACING),
            queued: None,
            spawn,
            speed,
        }
    }

    /// Replaces any unconsumed intent. A direction that is not walkable yet stays
    /// queued until it becomes walkable at a later cell or is overwritten.
    pub fn queue_direction(&mut self, dir: Direction) {
        self.queued = Some(dir);
    }

    pub fn queued_direction(&self) -> Option<Direction> {
        self.queued
    }

    /// Moves for `dt` seconds and returns each cell settled on, in order.
    pub fn advance(&mut self, dt: f32, maze: &Maze) -> Vec<GridPos> {
        let mut stepper = AgentStepper {
            maze,
            queued: &mut self.queued,
            speed: self.speed,
        };
        advance_motion(&mut self.motion, dt, &mut stepper)
    }

    /// Last fully settled cell; pickup and collision bookkeeping key off this.
    pub fn cell(&self) -> GridPos {
        self.motion.cell()
    }

    pub fn spawn(&self) -> GridPos {
        self.spawn
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

    pub fn reset(&mut self) {
        self.motion = Motion::at(self.spawn, SPAWN_FACING);
        self.queued = None;
    }
}
