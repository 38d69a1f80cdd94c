//! Procedural level generation: draw a candidate layout, validate it with
//! the path validator, retry up to a bound, fall back to a static level.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use crate::content;
use crate::level::LevelData;
use crate::pathfinding::{is_reachable, manhattan};
use crate::types::Pos;

/// Attempt bound is a safety net, not a primary path: on the default grid
/// with at most five obstacles, rejection is rare.
pub const MAX_GENERATION_ATTEMPTS: usize = 100;

/// Start and goal closer than this make a level trivially easy.
pub const MIN_START_GOAL_DISTANCE: u32 = 2;

const MIN_OBSTACLES: u64 = 3;
const MAX_OBSTACLES: u64 = 5;

pub struct LevelGenerator {
    grid_size: i32,
    rng: ChaCha8Rng,
}

impl LevelGenerator {
    pub fn new(seed: u64, grid_size: i32) -> Self {
        debug_assert!(grid_size >= 2);
        Self { grid_size, rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Always returns a playable level tagged with `level_id`.
    pub fn generate(&mut self, level_id: u32) -> LevelData {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            if let Some(level) = self.try_candidate(level_id) {
                return level;
            }
        }
        content::fallback_level(level_id)
    }

    fn try_candidate(&mut self, level_id: u32) -> Option<LevelData> {
        let start = self.random_cell();
        let mut goal = self.random_cell();
        while goal == start || manhattan(start, goal) < MIN_START_GOAL_DISTANCE {
            goal = self.random_cell();
        }

        // Target count is a best-effort upper bound: clashing draws are
        // discarded without resampling, so the final set may be smaller.
        let target_obstacles =
            (MIN_OBSTACLES + self.rng.next_u64() % (MAX_OBSTACLES - MIN_OBSTACLES + 1)) as usize;
        let mut obstacles: Vec<Pos> = Vec::with_capacity(target_obstacles);
        for _ in 0..target_obstacles {
            let candidate = self.random_cell();
            let clash =
                candidate == start || candidate == goal || obstacles.contains(&candidate);
            if !clash {
                obstacles.push(candidate);
            }
        }

        if !is_reachable(start, goal, &obstacles, self.grid_size) {
            return None;
        }

        let theme = content::theme_for_level(level_id);
        Some(LevelData {
            id: level_id,
            grid_size: self.grid_size,
            start,
            goal,
            obstacles,
            theme: theme.name.to_string(),
            story: theme.story.to_string(),
        })
    }

    fn random_cell(&mut self) -> Pos {
        let x = (self.rng.next_u64() % self.grid_size as u64) as i32;
        let y = (self.rng.next_u64() % self.grid_size as u64) as i32;
        Pos { x, y }
    }
}

/// Generate one level on the default grid.
pub fn generate_level(seed: u64, level_id: u32) -> LevelData {
    LevelGenerator::new(seed, content::GRID_SIZE).generate(level_id)
}
