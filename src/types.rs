use ndarray::Array2;

/// Linear dimension, a single row or column index.
pub type Ix = u8;

/// Area dimension, used for mine and cell counts.
pub type Ax = u16;

/// Zero-based `(row, col)` position on the board.
pub type Pos = (Ix, Ix);

pub trait NdConvert {
    type Output;
    fn convert(self) -> Self::Output;
}

impl NdConvert for Pos {
    type Output = [usize; 2];
    fn convert(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Ix, b: Ix) -> Ax {
    let a = a as Ax;
    let b = b as Ax;
    a.saturating_mul(b)
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, pos: Pos) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, pos: Pos) -> NeighborIter {
        let dim = self.dim();
        let bounds = (dim.0.try_into().unwrap(), dim.1.try_into().unwrap());
        NeighborIter::new(pos, bounds)
    }
}

// Row-major scan of the 3x3 block, center excluded.
const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `pos`, returning a value only when it remains in bounds.
fn apply_delta(pos: Pos, delta: (i8, i8), bounds: Pos) -> Option<Pos> {
    let (row, col) = pos;
    let (drow, dcol) = delta;
    let (max_row, max_col) = bounds;

    let next_row = row.checked_add_signed(drow)?;
    if next_row >= max_row {
        return None;
    }

    let next_col = col.checked_add_signed(dcol)?;
    if next_col >= max_col {
        return None;
    }

    Some((next_row, next_col))
}

/// Iterator over the up-to-8 in-bounds neighbors of a position, in a
/// stable row-major order.
#[derive(Debug)]
pub struct NeighborIter {
    center: Pos,
    bounds: Pos,
    index: u8,
}

impl NeighborIter {
    pub(crate) fn new(center: Pos, bounds: Pos) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Pos;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item = apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbors_of(pos: Pos, bounds: Pos) -> Vec<Pos> {
        NeighborIter::new(pos, bounds).collect()
    }

    #[test]
    fn interior_position_has_eight_neighbors_in_row_major_order() {
        let got = neighbors_of((1, 1), (3, 3));
        let expected = vec![
            (0, 0),
            (0, 1),
            (0, 2),
            (1, 0),
            (1, 2),
            (2, 0),
            (2, 1),
            (2, 2),
        ];
        assert_eq!(got, expected);
    }

    #[test]
    fn corner_position_has_three_neighbors() {
        assert_eq!(neighbors_of((0, 0), (3, 3)), vec![(0, 1), (1, 0), (1, 1)]);
        assert_eq!(neighbors_of((2, 2), (3, 3)), vec![(1, 1), (1, 2), (2, 1)]);
    }

    #[test]
    fn edge_position_has_five_neighbors() {
        assert_eq!(neighbors_of((0, 1), (3, 3)).len(), 5);
        assert_eq!(neighbors_of((1, 0), (3, 3)).len(), 5);
    }

    #[test]
    fn single_cell_board_has_no_neighbors() {
        assert_eq!(neighbors_of((0, 0), (1, 1)), Vec::<Pos>::new());
    }
}
