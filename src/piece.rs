use static_assertions::const_assert;
use strum::{Display, EnumIter, EnumString};

use crate::Grid;

/// Side length of a piece's local matrix.
pub const SIZE: usize = 4;

/// Pieces spawn with their matrix's top edge on this row.
pub const SPAWN_ROW: i32 = 0;

#[derive(Debug, EnumString, EnumIter, Display, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Shape {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl Shape {
    /// The spawn orientation of this shape.
    pub const fn matrix(self) -> Matrix {
        SHAPES[self as usize]
    }
}

/// A 4x4 occupancy matrix local to a piece, indexed `[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matrix([[bool; SIZE]; SIZE]);

macro_rules! matrix {
    ($([$($cell:tt)*]),* $(,)?) => {
        Matrix([$([$(matrix!(@cell $cell)),*]),*])
    };
    (@cell #) => {
        true
    };
    (@cell .) => {
        false
    };
}

// indexed by `Shape as usize`, keep in declaration order
const SHAPES: [Matrix; 7] = [
    matrix![
        [. # . .],
        [. # . .],
        [. # . .],
        [. # . .],
    ],
    matrix![
        [# . . .],
        [# # # .],
        [. . . .],
        [. . . .],
    ],
    matrix![
        [. . # .],
        [# # # .],
        [. . . .],
        [. . . .],
    ],
    matrix![
        [# # . .],
        [# # . .],
        [. . . .],
        [. . . .],
    ],
    matrix![
        [. # # .],
        [# # . .],
        [. . . .],
        [. . . .],
    ],
    matrix![
        [. # . .],
        [# # # .],
        [. . . .],
        [. . . .],
    ],
    matrix![
        [# # . .],
        [. # # .],
        [. . . .],
        [. . . .],
    ],
];

const fn every_shape_has_four_cells() -> bool {
    let mut i = 0;
    while i < SHAPES.len() {
        if SHAPES[i].count() != 4 {
            return false;
        }
        i += 1;
    }
    true
}

const_assert!(every_shape_has_four_cells());

impl Matrix {
    pub fn rows(&self) -> &[[bool; SIZE]; SIZE] {
        &self.0
    }

    /// `None` if `(row, col)` is outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        self.0.get(row).and_then(|r| r.get(col)).copied()
    }

    pub const fn count(&self) -> usize {
        let mut n = 0;
        let mut row = 0;
        while row < SIZE {
            let mut col = 0;
            while col < SIZE {
                if self.0[row][col] {
                    n += 1;
                }
                col += 1;
            }
            row += 1;
        }
        n
    }

    /// `(row, col)` of every filled cell.
    pub fn filled(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(col, _)| (row, col))
        })
    }

    /// `new[row][col] = old[3 - col][row]`
    pub fn rotated_clockwise(&self) -> Self {
        self.remapped(|row, col| (SIZE - 1 - col, row))
    }

    /// `new[row][col] = old[col][3 - row]`
    pub fn rotated_counter_clockwise(&self) -> Self {
        self.remapped(|row, col| (col, SIZE - 1 - row))
    }

    fn remapped(&self, source: impl Fn(usize, usize) -> (usize, usize)) -> Self {
        let mut rows = [[false; SIZE]; SIZE];
        for (row, cells) in rows.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                let (from_row, from_col) = source(row, col);
                *cell = self.get(from_row, from_col).unwrap_or_default();
            }
        }
        Self(rows)
    }
}

/// An operation on a [Piece] that can be exactly undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Move { dx: i32, dy: i32 },
    RotateClockwise,
    RotateCounterClockwise,
}

impl Transform {
    pub fn inverse(self) -> Self {
        match self {
            Transform::Move { dx, dy } => Transform::Move {
                dx: dx.wrapping_neg(),
                dy: dy.wrapping_neg(),
            },
            Transform::RotateClockwise => Transform::RotateCounterClockwise,
            Transform::RotateCounterClockwise => Transform::RotateClockwise,
        }
    }

    pub fn apply(self, piece: &mut Piece) {
        match self {
            Transform::Move { dx, dy } => piece.move_by(dx, dy),
            Transform::RotateClockwise => piece.rotate_clockwise(),
            Transform::RotateCounterClockwise => piece.rotate_counter_clockwise(),
        }
    }
}

/// The falling piece. `(x, y)` is the grid position of its matrix's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    shape: Shape,
    cells: Matrix,
    x: i32,
    y: i32,
}

impl Piece {
    pub fn new(shape: Shape, x: i32, y: i32) -> Self {
        Self {
            shape,
            cells: shape.matrix(),
            x,
            y,
        }
    }

    /// A piece horizontally centred on the spawn row of a grid `grid_width` wide.
    pub fn spawn(shape: Shape, grid_width: usize) -> Self {
        Self::new(shape, grid_width as i32 / 2 - 2, SPAWN_ROW)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn matrix(&self) -> &Matrix {
        &self.cells
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Doesn't check for collisions. Wraps at the ends of `i32`, so any move
    /// is undone exactly by its [Transform::inverse].
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.x = self.x.wrapping_add(dx);
        self.y = self.y.wrapping_add(dy);
    }

    pub fn rotate_clockwise(&mut self) {
        self.cells = self.cells.rotated_clockwise();
    }

    pub fn rotate_counter_clockwise(&mut self) {
        self.cells = self.cells.rotated_counter_clockwise();
    }

    /// Absolute `(x, y)` of each filled cell, widened so it can't overflow.
    pub fn cells(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.cells.filled().map(move |(row, col)| {
            (
                i64::from(self.x) + col as i64,
                i64::from(self.y) + row as i64,
            )
        })
    }

    /// Rows above the grid never collide, so a piece may overlap the top edge.
    pub fn is_colliding<const WIDTH: usize, const HEIGHT: usize>(
        &self,
        grid: &Grid<WIDTH, HEIGHT>,
    ) -> bool {
        self.cells().any(|(x, y)| {
            let Ok(col) = usize::try_from(x) else {
                return true;
            };
            if col >= WIDTH {
                return true;
            }
            let Ok(row) = usize::try_from(y) else {
                return false;
            };
            row >= HEIGHT || grid.is_occupied(col, row)
        })
    }

    /// Apply `transform`, undoing it if the result collides.
    /// Returns whether the transform was kept.
    pub fn attempt<const WIDTH: usize, const HEIGHT: usize>(
        &mut self,
        transform: Transform,
        grid: &Grid<WIDTH, HEIGHT>,
    ) -> bool {
        transform.apply(self);
        if self.is_colliding(grid) {
            transform.inverse().apply(self);
            tracing::trace!(?transform, origin = ?self.origin(), "undid colliding transform");
            return false;
        }
        true
    }
}
