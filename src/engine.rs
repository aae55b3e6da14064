use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Label describing what the engine just did, re-read by observers
/// after each notification. `GameWon`/`GameLost` are terminal and block
/// further reveal/flag operations; the rest are transient and are
/// overwritten by the next operation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    NewGame,
    RevealCell,
    ToggleFlag,
    GameWon,
    GameLost,
    ChangeSettingsSuccess,
    Error,
}

impl GameState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameWon | Self::GameLost)
    }
}

/// Registered notification callback. No payload is pushed; observers
/// re-query the grid and state.
pub type Observer = Box<dyn FnMut(GameState)>;

enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

pub const HELP_TEXT: &str = "n: start a new game\n\
c: change settings (rows/columns and mines)\n\
h: show this help\n\
q: quit";

/// Drives one game session end-to-end: starting, revealing, flagging,
/// win/loss detection, first-move protection and elapsed-time
/// accounting. Owns exactly one grid, replaced wholesale on a new game
/// or first-move regeneration. Single-threaded and synchronous; hosts
/// exposing one session to several callers must serialize access.
pub struct GameEngine {
    grid: Option<Grid>,
    state: GameState,
    started_at: Option<DateTime<Utc>>,
    frozen_elapsed: Option<u64>,
    observers: Vec<Observer>,
    store: Box<dyn GridStore>,
    last_storage_error: Option<GameError>,
}

impl GameEngine {
    pub fn new(store: Box<dyn GridStore>) -> Self {
        Self {
            grid: None,
            state: GameState::default(),
            started_at: None,
            frozen_elapsed: None,
            observers: Vec::new(),
            store,
            last_storage_error: None,
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(GameState) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn help_text(&self) -> &'static str {
        HELP_TEXT
    }

    /// Most recent persistence failure, if any. Storage is a mirror of
    /// the in-memory grid, never a transaction boundary, so this is a
    /// side channel independent of game progress.
    pub fn last_storage_error(&self) -> Option<&GameError> {
        self.last_storage_error.as_ref()
    }

    /// Seconds since game start; 0 before any game, frozen at the value
    /// reached when the game was won or lost.
    pub fn elapsed_secs(&self) -> u64 {
        match self.frozen_elapsed {
            Some(secs) => secs,
            None => self.live_elapsed_secs(),
        }
    }

    pub fn start_new_game(&mut self) {
        let config = GameConfig::default();
        self.start_new_game_with(config.rows, config.cols, config.mines);
    }

    pub fn start_new_game_named(&mut self, size: &str, difficulty: &str) {
        let config = GameConfig::from_presets(
            GridSize::from_name(size),
            Difficulty::from_name(difficulty),
        );
        self.start_new_game_with(config.rows, config.cols, config.mines);
    }

    /// Starts a game on a fresh randomly mined grid. An invalid
    /// configuration surfaces as the `Error` state plus a notification,
    /// never as a panic or a raw error to the caller.
    pub fn start_new_game_with(&mut self, rows: Ix, cols: Ix, mines: Ax) {
        match GameConfig::new(rows, cols, mines) {
            Ok(config) => self.install_grid(Grid::new(config)),
            Err(err) => {
                log::warn!("cannot start game: {err}");
                self.state = GameState::Error;
            }
        }
        self.notify_observers();
    }

    /// Starts a game with an explicit placement strategy, for
    /// reproducible boards.
    pub fn start_new_game_with_placer(&mut self, config: GameConfig, placer: &mut dyn MinePlacer) {
        self.install_grid(Grid::with_placer(config, placer));
        self.notify_observers();
    }

    /// New game with the given settings, tagged `ChangeSettingsSuccess`
    /// for UI feedback. The board stays square, the dimension is used
    /// for both rows and columns.
    pub fn commit_new_settings_and_restart(&mut self, rows_and_cols: Ix, mines: Ax) {
        self.start_new_game_with(rows_and_cols, rows_and_cols, mines);
        if self.state != GameState::Error {
            self.state = GameState::ChangeSettingsSuccess;
            self.notify_observers();
        }
    }

    /// Re-emits the current state if a game exists, else starts a game
    /// with the default presets. Supports lazy initialization on first
    /// UI attach.
    pub fn touch(&mut self) {
        if self.grid.is_some() {
            self.notify_observers();
        } else {
            self.start_new_game();
        }
    }

    /// Reveals a cell, propagating through the connected zero-count
    /// region. A terminal state makes this a silent no-op; an
    /// out-of-bounds position is rejected without a notification.
    /// Exactly one notification fires per accepted call, regardless of
    /// how many cells the propagation touched.
    pub fn reveal_cell(&mut self, row: Ix, col: Ix) -> Result<()> {
        if self.state.is_terminal() {
            return Ok(());
        }
        let pos = self.validate_pos((row, col))?;

        self.state = GameState::RevealCell;
        self.reveal_from(pos);
        self.persist_grid();
        self.notify_observers();
        Ok(())
    }

    /// Flips a cell's flag. Flags never block a later reveal; toggling
    /// on a revealed cell changes nothing but still counts as an
    /// operation and notifies.
    pub fn toggle_flag(&mut self, row: Ix, col: Ix) -> Result<()> {
        if self.state.is_terminal() {
            return Ok(());
        }
        let pos = self.validate_pos((row, col))?;

        if let Some(grid) = self.grid.as_mut() {
            grid.toggle_flag_at(pos);
        }
        self.state = GameState::ToggleFlag;
        self.notify_observers();
        Ok(())
    }

    fn install_grid(&mut self, grid: Grid) {
        log::debug!(
            "new {}x{} game with {} mines, grid {}",
            grid.rows(),
            grid.cols(),
            grid.mine_count(),
            grid.id()
        );
        self.grid = Some(grid);
        self.state = GameState::NewGame;
        self.started_at = Some(Utc::now());
        self.frozen_elapsed = None;
        self.last_storage_error = None;
    }

    fn validate_pos(&self, pos: Pos) -> Result<Pos> {
        match self.grid.as_ref() {
            Some(grid) => grid.validate_pos(pos),
            None => Err(GameError::OutOfBounds),
        }
    }

    fn reveal_from(&mut self, start: Pos) {
        let Some(grid) = self.grid.as_mut() else {
            return;
        };

        // First-move protection: the whole grid is regenerated with the
        // targeted position excluded from placement, so one
        // regeneration always suffices.
        if grid.revealed_count() == 0 && grid[start].has_mine {
            log::debug!("prevented first-move explosion at {start:?}");
            let seed = rand::rng().random();
            *grid = Grid::with_placer(grid.config(), &mut RandomPlacer::excluding(seed, start));
        }

        match Self::reveal_batch(grid, start) {
            RevealOutcome::HitMine => self.finish(GameState::GameLost),
            RevealOutcome::Won => self.finish(GameState::GameWon),
            RevealOutcome::Revealed | RevealOutcome::NoChange => {}
        }
    }

    /// Reveals one cell and, when it has no adjacent mines, flood-fills
    /// the connected zero-count region plus its numbered border via an
    /// explicit work list. Revealed cells are never re-processed, which
    /// bounds the work by the unrevealed-cell count.
    fn reveal_batch(grid: &mut Grid, start: Pos) -> RevealOutcome {
        if !grid.reveal_at(start) {
            return RevealOutcome::NoChange;
        }

        let cell = grid[start];
        log::debug!("revealed {:?}, adjacent mines: {}", start, cell.adjacent_mines);

        if cell.has_mine {
            return RevealOutcome::HitMine;
        }

        if cell.adjacent_mines == 0 {
            let mut visited = HashSet::from([start]);
            let mut to_visit: VecDeque<Pos> = grid
                .neighbors(start)
                .filter(|&pos| !grid[pos].revealed)
                .collect();

            while let Some(pos) = to_visit.pop_front() {
                if !visited.insert(pos) {
                    continue;
                }
                if !grid.reveal_at(pos) {
                    continue;
                }

                let adjacent = grid[pos].adjacent_mines;
                log::trace!("flood revealed {pos:?}, adjacent mines: {adjacent}");

                // neighbors of a zero cell are never mines, so the
                // flood can only ever expose safe cells
                if adjacent == 0 {
                    to_visit.extend(
                        grid.neighbors(pos)
                            .filter(|&neighbor| !grid[neighbor].revealed)
                            .filter(|neighbor| !visited.contains(neighbor)),
                    );
                }
            }
        }

        if grid.all_safe_revealed() {
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    fn finish(&mut self, terminal: GameState) {
        self.state = terminal;
        if self.frozen_elapsed.is_none() {
            self.frozen_elapsed = Some(self.live_elapsed_secs());
        }
    }

    fn live_elapsed_secs(&self) -> u64 {
        self.started_at
            .map(|start| (Utc::now() - start).num_seconds().max(0) as u64)
            .unwrap_or(0)
    }

    /// Mirrors the grid into the injected store after a reveal. A
    /// failed write is logged and kept as a side-channel report; the
    /// in-memory grid stays authoritative.
    fn persist_grid(&mut self) {
        let Some(grid) = self.grid.as_ref() else {
            return;
        };
        match self.store.save_or_update(grid) {
            Ok(()) => self.last_storage_error = None,
            Err(err) => {
                log::warn!("grid persistence failed, in-memory state kept: {err}");
                self.last_storage_error = Some(err);
            }
        }
    }

    fn notify_observers(&mut self) {
        let state = self.state;
        for observer in &mut self.observers {
            observer(state);
        }
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(Box::new(NullStore))
    }
}
