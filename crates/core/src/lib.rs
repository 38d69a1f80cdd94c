pub mod content;
pub mod game;
pub mod level;
pub mod levelgen;
pub mod pathfinding;
pub mod types;

pub use game::{Game, MAX_COMMANDS, STEP_DELAY};
pub use level::{LevelData, LevelError};
pub use levelgen::{LevelGenerator, generate_level};
pub use pathfinding::is_reachable;
pub use types::*;
