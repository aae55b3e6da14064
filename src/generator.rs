use ndarray::Array2;
use rand::prelude::*;

use crate::*;

/// Strategy for laying out mines on a fresh board.
pub trait MinePlacer {
    /// Returns a mine mask with the shape of `config` and exactly
    /// `config.mines` entries set, assuming the config is satisfiable.
    fn place(&mut self, config: &GameConfig) -> Array2<bool>;
}

/// Uniform random placement without replacement, optionally keeping one
/// position mine-free (used for first-move protection).
#[derive(Clone, Debug)]
pub struct RandomPlacer {
    rng: SmallRng,
    exclude: Option<Pos>,
}

impl RandomPlacer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            exclude: None,
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    pub fn excluding(seed: u64, exclude: Pos) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            exclude: Some(exclude),
        }
    }
}

impl MinePlacer for RandomPlacer {
    fn place(&mut self, config: &GameConfig) -> Array2<bool> {
        let cols = usize::from(config.cols);
        let total = usize::from(config.total_cells());
        let mines = usize::from(config.mines);

        let excluded = self
            .exclude
            .map(|(row, col)| usize::from(row) * cols + usize::from(col));

        let mut slots: Vec<usize> = (0..total).filter(|&i| Some(i) != excluded).collect();
        if mines > slots.len() {
            log::warn!(
                "cannot keep {:?} mine-free, {} mines requested for {} cells",
                self.exclude,
                mines,
                total
            );
            slots = (0..total).collect();
        }

        slots.shuffle(&mut self.rng);

        let mut mask: Array2<bool> = Array2::default((usize::from(config.rows), cols));
        for &slot in slots.iter().take(mines) {
            mask[[slot / cols, slot % cols]] = true;
        }
        mask
    }
}

/// Places mines at fixed positions, for deterministic boards in tests.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedPlacer {
    mines: Vec<Pos>,
}

impl FixedPlacer {
    pub fn new(mines: &[Pos]) -> Self {
        Self {
            mines: mines.to_vec(),
        }
    }
}

impl MinePlacer for FixedPlacer {
    fn place(&mut self, config: &GameConfig) -> Array2<bool> {
        let mut mask: Array2<bool> =
            Array2::default((usize::from(config.rows), usize::from(config.cols)));
        for &(row, col) in &self.mines {
            if row < config.rows && col < config.cols {
                mask[(row, col).convert()] = true;
            } else {
                log::warn!("mine at {:?} outside {}x{} board, skipped", (row, col), config.rows, config.cols);
            }
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_placer_places_exact_mine_count() {
        let config = GameConfig::new(9, 9, 20).unwrap();
        for seed in 0..10 {
            let mask = RandomPlacer::new(seed).place(&config);
            assert_eq!(mask.iter().filter(|&&mine| mine).count(), 20);
        }
    }

    #[test]
    fn random_placer_never_mines_the_excluded_position() {
        let config = GameConfig::new(4, 4, 15).unwrap();
        for seed in 0..50 {
            let mask = RandomPlacer::excluding(seed, (2, 3)).place(&config);
            assert!(!mask[(2usize, 3usize)]);
            assert_eq!(mask.iter().filter(|&&mine| mine).count(), 15);
        }
    }

    #[test]
    fn fixed_placer_reproduces_the_given_layout() {
        let config = GameConfig::new(3, 3, 2).unwrap();
        let mask = FixedPlacer::new(&[(0, 1), (2, 2)]).place(&config);
        assert!(mask[[0, 1]]);
        assert!(mask[[2, 2]]);
        assert_eq!(mask.iter().filter(|&&mine| mine).count(), 2);
    }
}
