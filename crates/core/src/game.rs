use std::time::Duration;

use crate::level::LevelData;
use crate::types::{Command, GameError, GameStatus, Pos, RunOutcome, RunReport, StepOutcome};

/// Hard cap on the command queue. Excess adds are silent no-ops.
pub const MAX_COMMANDS: usize = 20;

/// Pacing contract: hosts must suspend this long after every `Stepped`
/// outcome so each move is independently observable before the next one.
pub const STEP_DELAY: Duration = Duration::from_millis(600);

enum CellClass {
    Goal,
    Wall,
    Obstacle,
    Open,
}

/// One play session: the current level, the robot, the command queue, and
/// the run state machine. All mutation is gated on the status, so a host
/// driving `step` can never interleave queue edits with execution.
pub struct Game {
    level: LevelData,
    player_pos: Pos,
    commands: Vec<Command>,
    status: GameStatus,
    cursor: usize,
    active_command_index: Option<usize>,
    last_report: Option<RunReport>,
}

impl Game {
    pub fn new(level: LevelData) -> Self {
        let player_pos = level.start;
        Self {
            level,
            player_pos,
            commands: Vec::new(),
            status: GameStatus::Idle,
            cursor: 0,
            active_command_index: None,
            last_report: None,
        }
    }

    /// Replace the current level wholesale: queue, status, and robot
    /// position all reset. No-op while a run is in progress.
    pub fn load_level(&mut self, level: LevelData) {
        if self.status == GameStatus::Running {
            return;
        }
        self.player_pos = level.start;
        self.level = level;
        self.commands.clear();
        self.status = GameStatus::Idle;
        self.cursor = 0;
        self.active_command_index = None;
        self.last_report = None;
    }

    /// Append a command. No-op while running or after a win, and a silent
    /// no-op once the queue holds `MAX_COMMANDS`.
    pub fn add_command(&mut self, command: Command) {
        if matches!(self.status, GameStatus::Running | GameStatus::Won) {
            return;
        }
        if self.commands.len() < MAX_COMMANDS {
            self.commands.push(command);
        }
    }

    /// Empty the queue and return the robot to the start. No-op while
    /// running.
    pub fn clear(&mut self) {
        if self.status == GameStatus::Running {
            return;
        }
        self.commands.clear();
        self.return_to_start();
    }

    /// Return the robot to the start, keeping the queue so the same program
    /// can be retried. No-op while running.
    pub fn reset(&mut self) {
        if self.status == GameStatus::Running {
            return;
        }
        self.return_to_start();
    }

    /// Begin executing the queued program. Only legal from `Idle` or `Lost`
    /// with a non-empty queue; the transition to `Running` happens before
    /// the first suspension point, which blocks re-entrancy.
    pub fn start_run(&mut self) -> Result<(), GameError> {
        match self.status {
            GameStatus::Running => return Err(GameError::RunInProgress),
            GameStatus::Won => return Err(GameError::RunAlreadyWon),
            GameStatus::Idle | GameStatus::Lost => {}
        }
        if self.commands.is_empty() {
            return Err(GameError::EmptyQueue);
        }
        self.player_pos = self.level.start;
        self.cursor = 0;
        self.active_command_index = None;
        self.last_report = None;
        self.status = GameStatus::Running;
        Ok(())
    }

    /// Execute the next queued command. The robot's position updates
    /// immediately, then the new cell is classified in priority order:
    /// goal, then wall, then obstacle. After a `Stepped` outcome the host
    /// must wait `STEP_DELAY` before calling `step` again; a `Finished`
    /// outcome ends the run.
    pub fn step(&mut self) -> StepOutcome {
        if self.status != GameStatus::Running {
            return StepOutcome::Idle;
        }

        let Some(&command) = self.commands.get(self.cursor) else {
            // Queue exhausted: classify the resting position once more.
            let outcome = if self.player_pos == self.level.goal {
                RunOutcome::GoalReached
            } else {
                RunOutcome::ExhaustedNoGoal
            };
            return self.finish(RunReport { outcome, terminal_index: None });
        };

        let command_index = self.cursor;
        self.cursor += 1;
        self.active_command_index = Some(command_index);
        self.player_pos = command.apply(self.player_pos);

        match self.classify(self.player_pos) {
            CellClass::Goal => self.finish(RunReport {
                outcome: RunOutcome::GoalReached,
                terminal_index: Some(command_index),
            }),
            CellClass::Wall => self.finish(RunReport {
                outcome: RunOutcome::HitWall,
                terminal_index: Some(command_index),
            }),
            CellClass::Obstacle => self.finish(RunReport {
                outcome: RunOutcome::HitObstacle,
                terminal_index: Some(command_index),
            }),
            CellClass::Open => StepOutcome::Stepped { command_index, pos: self.player_pos },
        }
    }

    /// Drive a run to its end without pacing delays, for tests and replays.
    pub fn run_to_completion(&mut self) -> Result<RunReport, GameError> {
        self.start_run()?;
        loop {
            if let StepOutcome::Finished(report) = self.step() {
                return Ok(report);
            }
        }
    }

    pub fn level(&self) -> &LevelData {
        &self.level
    }

    pub fn player_pos(&self) -> Pos {
        self.player_pos
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn active_command_index(&self) -> Option<usize> {
        self.active_command_index
    }

    pub fn last_report(&self) -> Option<RunReport> {
        self.last_report
    }

    pub fn snapshot_hash(&self) -> u64 {
        use std::hash::Hasher;
        use xxhash_rust::xxh3::Xxh3;

        let mut hasher = Xxh3::new();
        hasher.write(&self.level.canonical_bytes());
        hasher.write_i32(self.player_pos.x);
        hasher.write_i32(self.player_pos.y);
        hasher.write_u8(self.status as u8);
        hasher.write_u64(self.cursor as u64);
        for &command in &self.commands {
            hasher.write_u8(command as u8);
        }
        if let Some(index) = self.active_command_index {
            hasher.write_u64(index as u64);
        }
        if let Some(report) = self.last_report {
            hasher.write_u8(report.outcome as u8);
        }
        hasher.finish()
    }

    fn classify(&self, pos: Pos) -> CellClass {
        if pos == self.level.goal {
            CellClass::Goal
        } else if !self.level.in_bounds(pos) {
            CellClass::Wall
        } else if self.level.is_obstacle(pos) {
            CellClass::Obstacle
        } else {
            CellClass::Open
        }
    }

    fn finish(&mut self, report: RunReport) -> StepOutcome {
        self.status = match report.outcome {
            RunOutcome::GoalReached => GameStatus::Won,
            _ => GameStatus::Lost,
        };
        self.active_command_index = None;
        self.last_report = Some(report);
        StepOutcome::Finished(report)
    }

    fn return_to_start(&mut self) {
        self.player_pos = self.level.start;
        self.status = GameStatus::Idle;
        self.cursor = 0;
        self.active_command_index = None;
        self.last_report = None;
    }
}
