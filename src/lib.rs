use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use grid::*;
pub use store::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod grid;
mod store;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub rows: Ix,
    pub cols: Ix,
    pub mines: Ax,
}

impl GameConfig {
    pub const fn new_unchecked(rows: Ix, cols: Ix, mines: Ax) -> Self {
        Self { rows, cols, mines }
    }

    /// Validates the board shape: both dimensions positive and
    /// `0 < mines < rows*cols`.
    pub fn new(rows: Ix, cols: Ix, mines: Ax) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidConfig);
        }
        if mines == 0 || mines >= mult(rows, cols) {
            return Err(GameError::InvalidConfig);
        }
        Ok(Self::new_unchecked(rows, cols, mines))
    }

    pub fn from_presets(size: GridSize, difficulty: Difficulty) -> Self {
        let dimension = size.dimension();
        Self::new_unchecked(dimension, dimension, difficulty.mine_count(dimension))
    }

    pub const fn total_cells(&self) -> Ax {
        mult(self.rows, self.cols)
    }

    pub const fn safe_cells(&self) -> Ax {
        self.total_cells() - self.mines
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_presets(GridSize::default(), Difficulty::default())
    }
}

/// Named board sizes; unknown names fall back to the default.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl GridSize {
    pub fn from_name(name: &str) -> Self {
        match name {
            "small" => Self::Small,
            "large" => Self::Large,
            _ => Self::Medium,
        }
    }

    /// Boards are square, this is both the row and the column count.
    pub const fn dimension(self) -> Ix {
        match self {
            Self::Small => 7,
            Self::Medium => 12,
            Self::Large => 17,
        }
    }
}

/// Named difficulties, expressed as a mine fraction of the rows-and-cols
/// dimension; unknown names fall back to the default.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Expert,
}

impl Difficulty {
    pub fn from_name(name: &str) -> Self {
        match name {
            "beginner" => Self::Beginner,
            "expert" => Self::Expert,
            _ => Self::Intermediate,
        }
    }

    pub fn mine_count(self, dimension: Ix) -> Ax {
        let fraction = match self {
            Self::Beginner => 0.8,
            Self::Intermediate => 1.5,
            Self::Expert => 2.0,
        };
        (fraction * f64::from(dimension)) as Ax
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_degenerate_shapes() {
        assert_eq!(GameConfig::new(0, 5, 1), Err(GameError::InvalidConfig));
        assert_eq!(GameConfig::new(5, 0, 1), Err(GameError::InvalidConfig));
        assert_eq!(GameConfig::new(5, 5, 0), Err(GameError::InvalidConfig));
        assert_eq!(GameConfig::new(5, 5, 25), Err(GameError::InvalidConfig));
        assert_eq!(GameConfig::new(5, 5, 26), Err(GameError::InvalidConfig));
    }

    #[test]
    fn config_accepts_valid_shapes() {
        let config = GameConfig::new(5, 7, 34).unwrap();
        assert_eq!(config.total_cells(), 35);
        assert_eq!(config.safe_cells(), 1);
    }

    #[test]
    fn size_names_resolve_with_default_fallback() {
        assert_eq!(GridSize::from_name("small").dimension(), 7);
        assert_eq!(GridSize::from_name("medium").dimension(), 12);
        assert_eq!(GridSize::from_name("large").dimension(), 17);
        assert_eq!(GridSize::from_name("gigantic").dimension(), 12);
    }

    #[test]
    fn difficulty_scales_mines_with_the_dimension() {
        assert_eq!(Difficulty::from_name("beginner").mine_count(7), 5);
        assert_eq!(Difficulty::from_name("intermediate").mine_count(12), 18);
        assert_eq!(Difficulty::from_name("expert").mine_count(17), 34);
        assert_eq!(Difficulty::from_name("nightmare").mine_count(12), 18);
    }

    #[test]
    fn default_config_is_medium_intermediate() {
        let config = GameConfig::default();
        assert_eq!((config.rows, config.cols, config.mines), (12, 12, 18));
    }
}
