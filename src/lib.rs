use std::fmt;

pub mod game;
pub mod piece;

pub use game::{Config, FallTimer, Game, Status};
pub use piece::{Matrix, Piece, Shape, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
// choice: static array, not hashmap of coords, the playfield is small and dense
// choice: row-wise, matching how a renderer walks it
// choice: dimensions are const generics, so they can't change after creation
pub struct Grid<const WIDTH: usize, const HEIGHT: usize> {
    rows: [[CellState; WIDTH]; HEIGHT],
}

impl<const WIDTH: usize, const HEIGHT: usize> Default for Grid<WIDTH, HEIGHT> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
#[error("cell at column {x}, row {y} is outside the {width} * {height} grid")]
pub struct OutOfBounds {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl<const WIDTH: usize, const HEIGHT: usize> Grid<WIDTH, HEIGHT> {
    pub const fn new() -> Self {
        Self::from_rows([[CellState::Unoccupied; WIDTH]; HEIGHT])
    }

    pub const fn from_rows(rows: [[CellState; WIDTH]; HEIGHT]) -> Self {
        Self { rows }
    }

    /// The full occupancy matrix, row-major.
    pub fn rows(&self) -> &[[CellState; WIDTH]; HEIGHT] {
        &self.rows
    }

    pub fn cell(&self, x: usize, y: usize) -> Result<CellState, OutOfBounds> {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .ok_or(OutOfBounds {
                x,
                y,
                width: WIDTH,
                height: HEIGHT,
            })
    }

    /// # Panics
    /// - If `(x, y)` is outside the grid. Callers bounds-check first.
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        match self.cell(x, y) {
            Ok(cell) => cell.is_occupied(),
            Err(e) => panic!("{e}"),
        }
    }

    /// Mark every given `(x, y)` as occupied. Cells are never cleared.
    /// # Panics
    /// - If any coordinate is outside the grid.
    pub fn commit(&mut self, cells: impl IntoIterator<Item = (usize, usize)>) {
        for (x, y) in cells {
            if let Err(e) = self.cell(x, y) {
                panic!("{e}")
            }
            self.rows[y][x] = CellState::Occupied;
        }
    }

    /// Every occupied `(x, y)`, top row first.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_occupied())
                .map(move |(x, _)| (x, y))
        })
    }
}

impl<const WIDTH: usize, const HEIGHT: usize> fmt::Display for Grid<WIDTH, HEIGHT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows.iter() {
            for cell in row {
                let c = match cell {
                    CellState::Occupied => '#',
                    CellState::Unoccupied => '.',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    Occupied,
    #[default]
    Unoccupied,
}

impl CellState {
    pub fn is_occupied(&self) -> bool {
        matches!(self, CellState::Occupied)
    }
}

/// Build a [Grid] from a picture, `#` for occupied and `.` for empty.
#[macro_export]
macro_rules! grid {
    ($([$($cell:tt)* $(,)?]),* $(,)?) => {
        $crate::Grid::from_rows(
            [ // begin grid
                $([ // begin row
                    $(
                        $crate::grid!(@cell $cell),
                    )*
                ]),* // end row
            ] // end grid
        )
    };
    (@cell #) => {
        $crate::CellState::Occupied
    };
    (@cell .) => {
        $crate::CellState::Unoccupied
    };
}
