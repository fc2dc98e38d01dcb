use crate::maze::Maze;
use crate::types::{Direction, GridPos, WorldPos};

/// Settled cell plus interpolation toward the cell being entered.
///
/// `progress` is 0 whenever `target` is `None`; at tick boundaries the converse
/// also holds, because a step is only begun when time is left to spend on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Motion {
    pub(crate) current: GridPos,
    pub(crate) target: Option<GridPos>,
    pub(crate) progress: f32,
    pub(crate) facing: Direction,
    pub(crate) heading: Option<Direction>,
}

impl Motion {
    pub fn at(cell: GridPos, facing: Direction) -> Self {
        Self {
            current: cell,
            target: None,
            progress: 0.0,
            facing,
            heading: None,
        }
    }

    pub fn cell(&self) -> GridPos {
        self.current
    }

    pub fn target(&self) -> Option<GridPos> {
        self.target
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// Direction of the current or most recent step; `None` once stopped.
    pub fn heading(&self) -> Option<Direction> {
        self.heading
    }

    pub fn is_moving(&self) -> bool {
        self.target.is_some()
    }

    pub fn world_position(&self, maze: &Maze) -> WorldPos {
        let from = maze.cell_to_world(self.current);
        match self.target {
            Some(target) => WorldPos::lerp(from, maze.cell_to_world(target), self.progress),
            None => from,
        }
    }

    fn begin_step(&mut self, dir: Direction) {
        self.target = Some(self.current.offset(dir));
        self.progress = 0.0;
        self.facing = dir;
        self.heading = Some(dir);
    }

    fn settle(&mut self) {
        if let Some(target) = self.target.take() {
            self.current = target;
        }
        self.progress = 0.0;
    }
}

/// Per-entity policy plugged into [`advance_motion`].
pub(crate) trait Stepper {
    /// Called at a cell boundary; `None` leaves the entity standing.
    fn next_direction(&mut self, motion: &Motion) -> Option<Direction>;

    /// Tiles per second for the step about to be taken or continued.
    fn step_speed(&self) -> f32;
}

/// Spends `dt` seconds of movement as a sequence of whole steps, returning every
/// cell settled on along the way.
pub(crate) fn advance_motion<S: Stepper>(
    motion: &mut Motion,
    dt: f32,
    stepper: &mut S,
) -> Vec<GridPos> {
    let mut settled = Vec::new();
    let mut remaining = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

    while remaining > 0.0 {
        if motion.target.is_none() {
            let Some(dir) = stepper.next_direction(motion) else {
                motion.heading = None;
                break;
            };
            if stepper.step_speed() <= 0.0 {
                break;
            }
            motion.begin_step(dir);
        }

        let speed = stepper.step_speed();
        if speed <= 0.0 {
            break;
        }
        let time_to_cell = (1.0 - motion.progress) / speed;
        if remaining >= time_to_cell {
            let left = remaining - time_to_cell;
            // Below f32 resolution the subtraction stalls; nothing measurable is left.
            remaining = if left < remaining { left } else { 0.0 };
            motion.settle();
            settled.push(motion.current);
        } else {
            motion.progress = (motion.progress + remaining * speed).min(1.0);
            remaining = 0.0;
        }
    }
    settled
}
