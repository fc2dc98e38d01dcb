use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Iteration order for every direction scan; tie-breaks depend on it.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// `(row, col)` delta of one step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    /// Heading around the vertical axis, 0 facing up the grid.
    pub fn yaw(self) -> f32 {
        match self {
            Self::Up => 0.0,
            Self::Right => -std::f32::consts::FRAC_PI_2,
            Self::Down => std::f32::consts::PI,
            Self::Left => std::f32::consts::FRAC_PI_2,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GridPos {
    pub row: i32,
    pub col: i32,
}

impl GridPos {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(self, dir: Direction) -> Self {
        let (dr, dc) = dir.delta();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }

    pub fn manhattan(self, other: GridPos) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }
}

/// Continuous position on the maze floor plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WorldPos {
    pub x: f32,
    pub z: f32,
}

impl WorldPos {
    pub fn lerp(a: WorldPos, b: WorldPos, t: f32) -> WorldPos {
        WorldPos {
            x: a.x + (b.x - a.x) * t,
            z: a.z + (b.z - a.z) * t,
        }
    }

    pub fn distance(self, other: WorldPos) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Wall,
    Floor,
    Pellet,
    PowerPellet,
    GhostSpawn,
    AgentSpawn,
}

impl CellKind {
    pub fn from_tile(tile: char) -> Option<Self> {
        match tile {
            '#' => Some(Self::Wall),
            ' ' => Some(Self::Floor),
            '.' => Some(Self::Pellet),
            'o' => Some(Self::PowerPellet),
            'G' => Some(Self::GhostSpawn),
            'P' => Some(Self::AgentSpawn),
            _ => None,
        }
    }

    pub fn item(self) -> Option<ItemKind> {
        match self {
            Self::Pellet => Some(ItemKind::Pellet),
            Self::PowerPellet => Some(ItemKind::PowerPellet),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Pellet,
    PowerPellet,
}

/// Scheduled default behavior for ghosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Pursue,
    Patrol,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostBehavior {
    Pursue,
    Patrol,
    Evasion,
    Recovery,
}

impl From<GhostMode> for GhostBehavior {
    fn from(mode: GhostMode) -> Self {
        match mode {
            GhostMode::Pursue => Self::Pursue,
            GhostMode::Patrol => Self::Patrol,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Ready,
    Countdown,
    Playing,
    GameOver,
    Win,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Win,
    GameOver,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraDistance {
    #[default]
    Near,
    Far,
}

impl CameraDistance {
    pub fn toggled(self) -> Self {
        match self {
            Self::Near => Self::Far,
            Self::Far => Self::Near,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PelletEaten {
        cell: GridPos,
    },
    PowerPelletEaten {
        cell: GridPos,
    },
    GhostEaten {
        ghost: usize,
        points: u32,
    },
    AgentCaught {
        #[serde(rename = "livesRemaining")]
        lives_remaining: u32,
    },
    MatchWon {
        score: u32,
    },
    MatchLost {
        score: u32,
    },
    PhaseChanged {
        phase: MatchPhase,
    },
    ModeChanged {
        mode: GhostMode,
    },
}

impl GameEvent {
    /// Events the audio collaborator plays a cue for.
    pub fn is_audio_cue(&self) -> bool {
        matches!(
            self,
            Self::PelletEaten { .. }
                | Self::PowerPelletEaten { .. }
                | Self::GhostEaten { .. }
                | Self::AgentCaught { .. }
                | Self::MatchWon { .. }
        )
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AgentView {
    pub cell: GridPos,
    pub position: WorldPos,
    pub facing: Direction,
    pub yaw: f32,
    pub moving: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: usize,
    pub cell: GridPos,
    pub position: WorldPos,
    pub facing: Direction,
    pub yaw: f32,
    pub behavior: GhostBehavior,
    #[serde(rename = "evasionRemaining")]
    pub evasion_remaining: Option<f32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ItemView {
    pub cell: GridPos,
    pub kind: ItemKind,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: MatchPhase,
    #[serde(rename = "countdownRemaining")]
    pub countdown_remaining: f32,
    pub score: u32,
    #[serde(rename = "highScore")]
    pub high_score: u32,
    pub lives: u32,
    pub mode: GhostBehavior,
    pub camera: CameraDistance,
    #[serde(rename = "animationClock")]
    pub animation_clock: f32,
    pub agent: AgentView,
    pub ghosts: Vec<GhostView>,
    pub items: Vec<ItemView>,
    #[serde(rename = "remainingItems")]
    pub remaining_items: usize,
    pub events: Vec<GameEvent>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub pellets: u32,
    #[serde(rename = "powerPellets")]
    pub power_pellets: u32,
    pub ghosts: u32,
    #[serde(rename = "livesLost")]
    pub lives_lost: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct MatchSummary {
    pub outcome: Option<MatchOutcome>,
    pub score: u32,
    #[serde(rename = "highScore")]
    pub high_score: u32,
    #[serde(rename = "livesRemaining")]
    pub lives_remaining: u32,
    #[serde(rename = "remainingItems")]
    pub remaining_items: usize,
    #[serde(rename = "playingSeconds")]
    pub playing_seconds: f32,
    pub ticks: u64,
    pub stats: MatchStats,
}
