use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
}

impl Command {
    /// Unit offset on one axis; y grows downward, matching grid row order.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub fn apply(self, pos: Pos) -> Pos {
        let (dx, dy) = self.offset();
        Pos { x: pos.x + dx, y: pos.y + dy }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Idle,
    Running,
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    GoalReached,
    HitObstacle,
    HitWall,
    ExhaustedNoGoal,
}

/// How a run ended. `terminal_index` is the command that produced the
/// terminal condition, or `None` when the queue ran out first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub terminal_index: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// No run in progress; `step` was called outside `Running`.
    Idle,
    /// One command executed without a terminal condition. The host must
    /// suspend for `STEP_DELAY` before the next `step` call.
    Stepped { command_index: usize, pos: Pos },
    Finished(RunReport),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameError {
    RunInProgress,
    RunAlreadyWon,
    EmptyQueue,
}
