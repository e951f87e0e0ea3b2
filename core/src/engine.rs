use alloc::collections::{BTreeSet, VecDeque};
use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Lifecycle of one game.
///
/// `Ready` is the freshly-created, still mine-less state: the minefield only
/// gets generated by the session's first reveal. `Won` and `Lost` are
/// terminal and irreversible.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EngineState {
    Ready,
    Active,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    pub const fn is_won(self) -> bool {
        matches!(self, Self::Won)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::Ready
    }
}

/// Player action on a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveAction {
    Reveal,
    Flag,
}

/// One move against a game: coordinates plus the action to take there.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMove {
    pub x: Coord,
    pub y: Coord,
    pub action: MoveAction,
}

impl GameMove {
    pub const fn reveal(x: Coord, y: Coord) -> Self {
        Self {
            x,
            y,
            action: MoveAction::Reveal,
        }
    }

    pub const fn flag(x: Coord, y: Coord) -> Self {
        Self {
            x,
            y,
            action: MoveAction::Flag,
        }
    }

    pub const fn pos(&self) -> Coord2 {
        (self.x, self.y)
    }
}

/// One game from creation to win or loss.
///
/// The board starts empty and mine-less; the first reveal runs the layout
/// generator with its own coordinates as the safe-zone center. All
/// operations are synchronous and run to completion, the struct performs no
/// I/O and never reads a clock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    config: GameConfig,
    seed: u64,
    layout: Option<MineLayout>,
    board: Array2<Cell>,
    revealed_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    state: EngineState,
    triggered_mine: Option<Coord2>,
}

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            layout: None,
            board: Array2::default(config.size.to_nd_index()),
            revealed_count: Saturating(0),
            flagged_count: Saturating(0),
            state: Default::default(),
            triggered_mine: None,
        }
    }

    /// Builds a game over a pre-generated layout, bypassing deferred random
    /// placement.
    pub fn from_layout(difficulty: Difficulty, layout: MineLayout) -> Self {
        let config = GameConfig::new_unchecked(difficulty, layout.size(), layout.mine_count());
        let mut game = Self::new(config, 0);
        game.layout = Some(layout);
        game
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn is_won(&self) -> bool {
        self.state.is_won()
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn mines_placed(&self) -> bool {
        self.layout.is_some()
    }

    /// The configured mine count until placement, the placed count after
    /// (the generator may have fit fewer, see [`RandomLayoutGenerator`]).
    pub fn total_mines(&self) -> CellCount {
        self.layout
            .as_ref()
            .map_or(self.config.mines, |layout| layout.mine_count())
    }

    /// How many mines have not been flagged yet. Negative when the player
    /// placed more flags than there are mines.
    pub fn mines_left(&self) -> isize {
        (self.total_mines() as isize) - (self.flagged_count.0 as isize)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count.0
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.board[coords.to_nd_index()]
    }

    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        self.layout
            .as_ref()
            .is_some_and(|layout| layout.contains_mine(coords))
    }

    pub fn adjacent_mines_at(&self, coords: Coord2) -> u8 {
        self.layout
            .as_ref()
            .map_or(0, |layout| layout.adjacent_mine_count(coords))
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Single entry point for the `(state, move)` transition.
    pub fn apply(&mut self, mv: GameMove) -> Result<MoveOutcome> {
        match mv.action {
            MoveAction::Flag => self.toggle_flag(mv.pos()).map(MoveOutcome::Mark),
            MoveAction::Reveal => self.reveal(mv.pos()).map(MoveOutcome::Reveal),
        }
    }

    /// Toggles the flag marker on a hidden cell. Allowed before the first
    /// reveal; flagging never triggers mine placement.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use Cell::*;
        use MarkOutcome::*;

        let coords = self.validate_coords(coords)?;
        self.check_not_finished()?;

        Ok(match self.board[coords.to_nd_index()] {
            Hidden => {
                self.board[coords.to_nd_index()] = Flagged;
                self.flagged_count += 1;
                Changed
            }
            Flagged => {
                self.board[coords.to_nd_index()] = Hidden;
                self.flagged_count -= 1;
                Changed
            }
            _ => NoChange,
        })
    }

    /// Reveals a hidden cell. Flagged cells must be unflagged first and are
    /// left untouched here.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;

        if matches!(self.board[coords.to_nd_index()], Cell::Hidden) {
            self.check_not_finished()?;
            self.ensure_mines_placed(coords);
            Ok(self.reveal_single_cell(coords))
        } else {
            Ok(RevealOutcome::NoChange)
        }
    }

    /// The first reveal of a session places the mines, with the revealed cell
    /// as the center of the mine-free zone. Flag moves never get here.
    fn ensure_mines_placed(&mut self, first_reveal: Coord2) {
        if self.layout.is_none() {
            let layout =
                RandomLayoutGenerator::new(self.seed, first_reveal).generate(self.config);
            log::debug!(
                "placed {} mines around first reveal {:?}",
                layout.mine_count(),
                first_reveal
            );
            self.layout = Some(layout);
        }
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> RevealOutcome {
        let cell = self.board[coords.to_nd_index()];
        let has_mine = self.has_mine_at(coords);

        match (cell, has_mine) {
            (Cell::Hidden, true) => {
                self.triggered_mine = Some(coords);
                self.end_game(false);
                RevealOutcome::HitMine
            }
            (Cell::Hidden, false) => {
                let adjacent_mines = self.adjacent_mines_at(coords);
                self.board[coords.to_nd_index()] = Cell::Revealed(adjacent_mines);
                self.revealed_count += 1;
                log::debug!("revealed {:?}, adjacent mines: {}", coords, adjacent_mines);

                if adjacent_mines == 0 {
                    self.flood_reveal_from(coords);
                }

                if self.revealed_count == Saturating(self.safe_cell_count()) {
                    self.end_game(true);
                    RevealOutcome::Won
                } else {
                    self.mark_started();
                    RevealOutcome::Revealed
                }
            }
            _ => RevealOutcome::NoChange,
        }
    }

    /// Worklist cascade through the contiguous zero-adjacency region plus its
    /// numbered border. Bounded by the board area, no recursion.
    fn flood_reveal_from(&mut self, start: Coord2) {
        let bounds = self.config.size;
        let mut visited = BTreeSet::from([start]);
        let mut to_visit: VecDeque<_> = neighbors(start, bounds)
            .filter(|&pos| matches!(self.board[pos.to_nd_index()], Cell::Hidden))
            .collect();

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }

            // flagged cells block the cascade, revealed cells are already done
            if !matches!(self.board[visit_coords.to_nd_index()], Cell::Hidden) {
                continue;
            }

            let visit_adjacent = self.adjacent_mines_at(visit_coords);
            self.board[visit_coords.to_nd_index()] = Cell::Revealed(visit_adjacent);
            self.revealed_count += 1;
            log::trace!(
                "flood revealed {:?}, adjacent mines: {}",
                visit_coords,
                visit_adjacent
            );

            // numbered cells are revealed but do not propagate further
            if visit_adjacent == 0 {
                to_visit.extend(
                    neighbors(visit_coords, bounds)
                        .filter(|&pos| matches!(self.board[pos.to_nd_index()], Cell::Hidden))
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    fn mark_started(&mut self) {
        if matches!(self.state, EngineState::Ready) {
            self.state = EngineState::Active;
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.state = if won {
            EngineState::Won
        } else {
            EngineState::Lost
        };
        if won {
            self.triggered_mine = None;
        }
        self.reveal_remaining(won);
        log::debug!("game over, won: {}", won);
    }

    /// Rewrites the board for the end-of-game presentation: on a loss every
    /// mine is shown regardless of flags and wrong flags are marked, on a win
    /// the remaining mines end up flagged.
    fn reveal_remaining(&mut self, won: bool) {
        let (x_end, y_end) = self.config.size;
        for x in 0..x_end {
            for y in 0..y_end {
                let coords = (x, y);
                let cell = self.board[coords.to_nd_index()];
                let has_mine = self.has_mine_at(coords);

                let rewritten = match (cell, has_mine, won) {
                    (_, true, false) if self.triggered_mine == Some(coords) => Cell::Exploded,
                    (Cell::Hidden | Cell::Flagged, true, false) => Cell::Mine,
                    (Cell::Hidden, true, true) => {
                        self.flagged_count += 1;
                        Cell::Flagged
                    }
                    (Cell::Flagged, false, _) => Cell::Misflagged,
                    _ => continue,
                };
                self.board[coords.to_nd_index()] = rewritten;
            }
        }
    }

    fn safe_cell_count(&self) -> CellCount {
        self.layout
            .as_ref()
            .map_or_else(|| self.config.total_cells(), |layout| layout.safe_cell_count())
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (height, width) = self.config.size;
        if coords.0 < height && coords.1 < width {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}
