use crate::types::GhostMode;

/// World units per grid cell.
pub const TILE_SIZE: f32 = 1.0;

pub const MAX_DELTA_SECONDS: f32 = 0.05;

pub const STARTING_LIVES: u32 = 3;
pub const COUNTDOWN_SECONDS: f32 = 3.0;
pub const EVASION_SECONDS: f32 = 8.0;
pub const RECOVERY_HOLD_SECONDS: f32 = 0.5;

pub const AGENT_SPEED: f32 = 6.0;
pub const GHOST_SPEED: f32 = 5.0;
pub const GHOST_EVASION_SPEED: f32 = 3.0;
pub const GHOST_RECOVERY_SPEED: f32 = 9.0;

/// Centre-to-centre distance, in world units, at which the agent and a ghost touch.
pub const COLLISION_DISTANCE: f32 = 0.6 * TILE_SIZE;

pub const PELLET_SCORE: u32 = 10;
pub const POWER_PELLET_SCORE: u32 = 50;
pub const GHOST_SCORE: u32 = 200;

pub const DEFAULT_SEED: u64 = 0x5eed;

/// `(mode, seconds)`; `None` holds the entry for the rest of the round.
pub const DEFAULT_MODE_SCHEDULE: &[(GhostMode, Option<f32>)] = &[
    (GhostMode::Patrol, Some(7.0)),
    (GhostMode::Pursue, Some(20.0)),
    (GhostMode::Patrol, Some(7.0)),
    (GhostMode::Pursue, Some(20.0)),
    (GhostMode::Patrol, Some(5.0)),
    (GhostMode::Pursue, Some(20.0)),
    (GhostMode::Patrol, Some(5.0)),
    (GhostMode::Pursue, None),
];

// '#' wall, '.' pellet, 'o' power pellet, ' ' floor, 'G' ghost spawn, 'P' agent spawn.
pub const DEFAULT_LAYOUT: &[&str] = &[
    "###################",
    "#o.......#.......o#",
    "#.##.###.#.###.##.#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.### # ###.####",
    "####.#   G   #.####",
    "####.# #GGG# #.####",
    "####.# ##### #.####",
    "####.#       #.####",
    "####.# ##### #.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#.....P.....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

pub const DEFAULT_LAYOUT_PELLETS: usize = 144;
pub const DEFAULT_LAYOUT_POWER_PELLETS: usize = 4;
