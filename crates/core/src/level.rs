use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pathfinding::is_reachable;
use crate::types::Pos;

/// One playable level. Created by the generator or provider, read-only while
/// a run is in progress, replaced wholesale when the next level loads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    pub id: u32,
    pub grid_size: i32,
    pub start: Pos,
    pub goal: Pos,
    /// Draw-ordered; duplicates are possible and treated as a set.
    pub obstacles: Vec<Pos>,
    pub theme: String,
    pub story: String,
}

impl LevelData {
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.grid_size && pos.y < self.grid_size
    }

    pub fn is_obstacle(&self, pos: Pos) -> bool {
        self.obstacles.contains(&pos)
    }

    /// Check every level invariant, including start-to-goal reachability.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.id == 0 {
            return Err(LevelError::ZeroId);
        }
        if self.grid_size < 2 {
            return Err(LevelError::GridTooSmall { grid_size: self.grid_size });
        }
        if !self.in_bounds(self.start) {
            return Err(LevelError::StartOutOfBounds { pos: self.start });
        }
        if !self.in_bounds(self.goal) {
            return Err(LevelError::GoalOutOfBounds { pos: self.goal });
        }
        if self.start == self.goal {
            return Err(LevelError::StartEqualsGoal { pos: self.start });
        }
        for &obstacle in &self.obstacles {
            if !self.in_bounds(obstacle) {
                return Err(LevelError::ObstacleOutOfBounds { pos: obstacle });
            }
            if obstacle == self.start || obstacle == self.goal {
                return Err(LevelError::ObstacleOnEndpoint { pos: obstacle });
            }
        }
        if !is_reachable(self.start, self.goal, &self.obstacles, self.grid_size) {
            return Err(LevelError::GoalUnreachable);
        }
        Ok(())
    }

    /// Stable byte encoding of the gameplay-relevant fields, used for
    /// fingerprint hashing in determinism tests.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(self.id.to_le_bytes());
        bytes.extend(self.grid_size.to_le_bytes());
        bytes.extend(self.start.x.to_le_bytes());
        bytes.extend(self.start.y.to_le_bytes());
        bytes.extend(self.goal.x.to_le_bytes());
        bytes.extend(self.goal.y.to_le_bytes());
        bytes.extend((self.obstacles.len() as u32).to_le_bytes());
        for obstacle in &self.obstacles {
            bytes.extend(obstacle.x.to_le_bytes());
            bytes.extend(obstacle.y.to_le_bytes());
        }
        bytes.extend(self.theme.as_bytes());
        bytes
    }
}

/// Describes which level invariant a candidate violates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelError {
    ZeroId,
    GridTooSmall { grid_size: i32 },
    StartOutOfBounds { pos: Pos },
    GoalOutOfBounds { pos: Pos },
    StartEqualsGoal { pos: Pos },
    ObstacleOutOfBounds { pos: Pos },
    ObstacleOnEndpoint { pos: Pos },
    GoalUnreachable,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroId => write!(f, "level id must be positive"),
            Self::GridTooSmall { grid_size } => {
                write!(f, "grid size {grid_size} is too small to play on")
            }
            Self::StartOutOfBounds { pos } => {
                write!(f, "start ({}, {}) is outside the grid", pos.x, pos.y)
            }
            Self::GoalOutOfBounds { pos } => {
                write!(f, "goal ({}, {}) is outside the grid", pos.x, pos.y)
            }
            Self::StartEqualsGoal { pos } => {
                write!(f, "start and goal both sit on ({}, {})", pos.x, pos.y)
            }
            Self::ObstacleOutOfBounds { pos } => {
                write!(f, "obstacle ({}, {}) is outside the grid", pos.x, pos.y)
            }
            Self::ObstacleOnEndpoint { pos } => {
                write!(f, "obstacle ({}, {}) covers the start or goal cell", pos.x, pos.y)
            }
            Self::GoalUnreachable => write!(f, "no obstacle-free path from start to goal"),
        }
    }
}
