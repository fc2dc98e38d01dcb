use std::collections::{BTreeMap, VecDeque};

use crate::constants::{DEFAULT_LAYOUT, TILE_SIZE};
use crate::error::MazeError;
use crate::types::{CellKind, Direction, GridPos, ItemKind, WorldPos};

/// Static maze layout plus the per-match item overlay.
#[derive(Clone, Debug)]
pub struct Maze {
    width: i32,
    height: i32,
    cells: Vec<CellKind>,
    initial_items: BTreeMap<GridPos, ItemKind>,
    items: BTreeMap<GridPos, ItemKind>,
    agent_spawn: GridPos,
    ghost_spawns: Vec<GridPos>,
    scatter_corners: [GridPos; 4],
}

impl Maze {
    pub fn classic() -> Result<Self, MazeError> {
        Self::parse(DEFAULT_LAYOUT)
    }

    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, MazeError> {
        let Some(first) = rows.first() else {
            return Err(MazeError::EmptyLayout);
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(MazeError::EmptyLayout);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        let mut initial_items = BTreeMap::new();
        let mut agent_spawn: Option<GridPos> = None;
        let mut ghost_spawns = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(MazeError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, tile) in line.chars().enumerate() {
                let kind =
                    CellKind::from_tile(tile).ok_or(MazeError::UnknownTile { row, col, tile })?;
                let cell = GridPos::new(row as i32, col as i32);
                match kind {
                    CellKind::AgentSpawn => {
                        if let Some(first) = agent_spawn {
                            return Err(MazeError::DuplicateAgentSpawn {
                                first,
                                second: cell,
                            });
                        }
                        agent_spawn = Some(cell);
                    }
                    CellKind::GhostSpawn => ghost_spawns.push(cell),
                    _ => {}
                }
                if let Some(item) = kind.item() {
                    initial_items.insert(cell, item);
                }
                cells.push(kind);
            }
        }

        let agent_spawn = agent_spawn.ok_or(MazeError::MissingAgentSpawn)?;
        if ghost_spawns.is_empty() {
            return Err(MazeError::MissingGhostSpawn);
        }
        if initial_items.is_empty() {
            return Err(MazeError::NoItems);
        }

        let mut maze = Self {
            width: width as i32,
            height: rows.len() as i32,
            cells,
            items: initial_items.clone(),
            initial_items,
            agent_spawn,
            ghost_spawns,
            scatter_corners: [agent_spawn; 4],
        };
        let (w, h) = (maze.width, maze.height);
        maze.scatter_corners = [
            maze.nearest_walkable(GridPos::new(0, w - 1)),
            maze.nearest_walkable(GridPos::new(0, 0)),
            maze.nearest_walkable(GridPos::new(h - 1, w - 1)),
            maze.nearest_walkable(GridPos::new(h - 1, 0)),
        ];
        Ok(maze)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn agent_spawn(&self) -> GridPos {
        self.agent_spawn
    }

    pub fn ghost_spawns(&self) -> &[GridPos] {
        &self.ghost_spawns
    }

    pub fn scatter_corner(&self, ghost_index: usize) -> GridPos {
        self.scatter_corners[ghost_index % self.scatter_corners.len()]
    }

    /// Base classification; out-of-bounds cells read as walls.
    pub fn cell_kind(&self, cell: GridPos) -> CellKind {
        self.index(cell)
            .map(|idx| self.cells[idx])
            .unwrap_or(CellKind::Wall)
    }

    pub fn is_walkable(&self, cell: GridPos) -> bool {
        self.cell_kind(cell) != CellKind::Wall
    }

    pub fn available_directions(&self, cell: GridPos) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|dir| self.is_walkable(cell.offset(*dir)))
            .collect()
    }

    pub fn item_at(&self, cell: GridPos) -> Option<ItemKind> {
        self.items.get(&cell).copied()
    }

    pub fn consume_item(&mut self, cell: GridPos) -> Option<ItemKind> {
        self.items.remove(&cell)
    }

    pub fn remaining_item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_item_count(&self) -> usize {
        self.initial_items.len()
    }

    pub fn reset_items(&mut self) {
        self.items = self.initial_items.clone();
    }

    pub fn items(&self) -> impl Iterator<Item = (GridPos, ItemKind)> + '_ {
        self.items.iter().map(|(cell, kind)| (*cell, *kind))
    }

    /// First step from `start` along a shortest path to `goal`.
    ///
    /// `forbidden_first` excludes one direction as the opening move only. Ties between
    /// equal-length paths resolve by [`Direction::ALL`] order at every BFS level.
    pub fn find_direction_bfs(
        &self,
        start: GridPos,
        goal: GridPos,
        forbidden_first: Option<Direction>,
    ) -> Option<Direction> {
        if start == goal || !self.is_walkable(start) || !self.is_walkable(goal) {
            return None;
        }
        self.bfs_first_step(start, forbidden_first, |cell| cell == goal)
    }

    /// First step towards the closest uncollected item, `None` when standing on one
    /// or none is reachable.
    pub fn direction_to_nearest_item(&self, start: GridPos) -> Option<Direction> {
        if !self.is_walkable(start) || self.items.contains_key(&start) {
            return None;
        }
        self.bfs_first_step(start, None, |cell| self.items.contains_key(&cell))
    }

    pub fn path_distance(&self, from: GridPos, to: GridPos) -> Option<usize> {
        let from_idx = self.walkable_index(from)?;
        self.walkable_index(to)?;
        if from == to {
            return Some(0);
        }

        let mut dist: Vec<Option<usize>> = vec![None; self.cells.len()];
        dist[from_idx] = Some(0);
        let mut queue = VecDeque::from([from]);
        while let Some(cell) = queue.pop_front() {
            let base = self.index(cell).and_then(|idx| dist[idx])?;
            for dir in Direction::ALL {
                let next = cell.offset(dir);
                let Some(idx) = self.walkable_index(next) else {
                    continue;
                };
                if dist[idx].is_some() {
                    continue;
                }
                if next == to {
                    return Some(base + 1);
                }
                dist[idx] = Some(base + 1);
                queue.push_back(next);
            }
        }
        None
    }

    pub fn cell_to_world(&self, cell: GridPos) -> WorldPos {
        WorldPos {
            x: (cell.col as f32 - self.center_col()) * TILE_SIZE,
            z: (cell.row as f32 - self.center_row()) * TILE_SIZE,
        }
    }

    pub fn world_to_cell(&self, pos: WorldPos) -> GridPos {
        GridPos {
            row: (pos.z / TILE_SIZE + self.center_row()).round() as i32,
            col: (pos.x / TILE_SIZE + self.center_col()).round() as i32,
        }
    }

    fn center_col(&self) -> f32 {
        (self.width - 1) as f32 / 2.0
    }

    fn center_row(&self) -> f32 {
        (self.height - 1) as f32 / 2.0
    }

    fn index(&self, cell: GridPos) -> Option<usize> {
        if cell.row < 0 || cell.col < 0 || cell.row >= self.height || cell.col >= self.width {
            return None;
        }
        Some((cell.row * self.width + cell.col) as usize)
    }

    fn walkable_index(&self, cell: GridPos) -> Option<usize> {
        self.index(cell)
            .filter(|idx| self.cells[*idx] != CellKind::Wall)
    }

    fn bfs_first_step<F>(
        &self,
        start: GridPos,
        forbidden_first: Option<Direction>,
        is_goal: F,
    ) -> Option<Direction>
    where
        F: Fn(GridPos) -> bool,
    {
        let start_idx = self.walkable_index(start)?;
        let mut visited = vec![false; self.cells.len()];
        let mut first_step: Vec<Option<Direction>> = vec![None; self.cells.len()];
        let mut queue = VecDeque::new();
        visited[start_idx] = true;

        for dir in Direction::ALL {
            if Some(dir) == forbidden_first {
                continue;
            }
            let next = start.offset(dir);
            let Some(idx) = self.walkable_index(next) else {
                continue;
            };
            if is_goal(next) {
                return Some(dir);
            }
            visited[idx] = true;
            first_step[idx] = Some(dir);
            queue.push_back(next);
        }

        while let Some(cell) = queue.pop_front() {
            let Some(opening) = self.index(cell).and_then(|idx| first_step[idx]) else {
                continue;
            };
            for dir in Direction::ALL {
                let next = cell.offset(dir);
                let Some(idx) = self.walkable_index(next) else {
                    continue;
                };
                if visited[idx] {
                    continue;
                }
                if is_goal(next) {
                    return Some(opening);
                }
                visited[idx] = true;
                first_step[idx] = Some(opening);
                queue.push_back(next);
            }
        }
        None
    }

    fn nearest_walkable(&self, target: GridPos) -> GridPos {
        let mut best: Option<(i32, GridPos)> = None;
        for row in 0..self.height {
            for col in 0..self.width {
                let cell = GridPos::new(row, col);
                if !self.is_walkable(cell) {
                    continue;
                }
                let dist = cell.manhattan(target);
                if best.map(|(d, _)| dist < d).unwrap_or(true) {
                    best = Some((dist, cell));
                }
            }
        }
        best.map(|(_, cell)| cell).unwrap_or(self.agent_spawn)
    }
}
