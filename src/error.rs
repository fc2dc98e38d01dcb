use std::io;

use thiserror::Error;

use crate::types::GridPos;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze layout has no rows")]
    EmptyLayout,
    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile {tile:?} at row {row}, col {col}")]
    UnknownTile { row: usize, col: usize, tile: char },
    #[error("maze layout has no agent spawn marker")]
    MissingAgentSpawn,
    #[error("second agent spawn at {second:?} (first at {first:?})")]
    DuplicateAgentSpawn { first: GridPos, second: GridPos },
    #[error("maze layout has no ghost spawn marker")]
    MissingGhostSpawn,
    #[error("maze layout has no pellets")]
    NoItems,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Maze(#[from] MazeError),
}
