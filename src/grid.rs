use std::ops::Index;

use ndarray::Array2;
use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::*;

/// One board square. Mine membership and the adjacent-mine count are
/// fixed at construction; only `revealed` and `flagged` ever change.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub has_mine: bool,
    pub revealed: bool,
    pub flagged: bool,
    pub adjacent_mines: u8,
}

/// The full board: cells plus cached aggregate counts. The grid never
/// relocates mines after construction; the engine decides when the
/// per-cell `revealed`/`flagged` bits change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    id: String,
    cells: Array2<Cell>,
    mines: Ax,
    revealed_count: Ax,
}

impl Grid {
    pub fn new(config: GameConfig) -> Self {
        Self::with_placer(config, &mut RandomPlacer::from_entropy())
    }

    pub fn with_placer(config: GameConfig, placer: &mut dyn MinePlacer) -> Self {
        Self::from_mine_mask(placer.place(&config))
    }

    /// Builds the cell array from a mine mask, computing every cell's
    /// adjacent-mine count from the 8-neighborhood clipped to bounds.
    pub fn from_mine_mask(mask: Array2<bool>) -> Self {
        let mines = mask.iter().filter(|&&mine| mine).count().try_into().unwrap();

        let mut cells: Array2<Cell> = Array2::default(mask.raw_dim());
        for ((row, col), cell) in cells.indexed_iter_mut() {
            let pos = (row as Ix, col as Ix);
            cell.has_mine = mask[[row, col]];
            cell.adjacent_mines = mask
                .iter_neighbors(pos)
                .filter(|&neighbor| mask[neighbor.convert()])
                .count()
                .try_into()
                .unwrap();
        }

        Self {
            id: format!("{:016x}", rand::rng().random::<u64>()),
            cells,
            mines,
            revealed_count: 0,
        }
    }

    /// Storage identity, stable for the lifetime of the grid.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size(&self) -> Pos {
        let dim = self.cells.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn rows(&self) -> Ix {
        self.size().0
    }

    pub fn cols(&self) -> Ix {
        self.size().1
    }

    pub fn config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.rows(), self.cols(), self.mines)
    }

    pub fn total_cells(&self) -> Ax {
        self.cells.len().try_into().unwrap()
    }

    pub fn mine_count(&self) -> Ax {
        self.mines
    }

    pub fn revealed_count(&self) -> Ax {
        self.revealed_count
    }

    pub fn safe_cell_count(&self) -> Ax {
        self.total_cells() - self.mines
    }

    /// Every non-mine cell has been revealed.
    pub fn all_safe_revealed(&self) -> bool {
        self.total_cells() == self.revealed_count + self.mines
    }

    pub fn contains(&self, pos: Pos) -> bool {
        let size = self.size();
        pos.0 < size.0 && pos.1 < size.1
    }

    pub fn validate_pos(&self, pos: Pos) -> Result<Pos> {
        if self.contains(pos) {
            Ok(pos)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn cell_at(&self, pos: Pos) -> Result<&Cell> {
        let pos = self.validate_pos(pos)?;
        Ok(&self.cells[pos.convert()])
    }

    pub fn neighbors(&self, pos: Pos) -> NeighborIter {
        self.cells.iter_neighbors(pos)
    }

    /// Marks a cell revealed, keeping the cached count in sync.
    /// Returns whether the cell was newly revealed.
    pub(crate) fn reveal_at(&mut self, pos: Pos) -> bool {
        let cell = &mut self.cells[pos.convert()];
        if cell.revealed {
            return false;
        }
        cell.revealed = true;
        self.revealed_count += 1;
        true
    }

    /// Flips a cell's flag. A revealed cell cannot be flagged.
    pub(crate) fn toggle_flag_at(&mut self, pos: Pos) -> bool {
        let cell = &mut self.cells[pos.convert()];
        if cell.revealed {
            return false;
        }
        cell.flagged = !cell.flagged;
        true
    }
}

impl Index<Pos> for Grid {
    type Output = Cell;

    fn index(&self, pos: Pos) -> &Self::Output {
        &self.cells[pos.convert()]
    }
}
