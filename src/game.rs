use std::time::Duration;

use derive_more::Display;

use crate::{
    piece::{Piece, Shape, Transform, SPAWN_ROW},
    Grid,
};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    #[display(fmt = "falling")]
    Falling,
    /// The last piece was committed to the grid, the driver should [Game::spawn] another.
    #[display(fmt = "locked")]
    Locked,
    /// Terminal. Fall updates and input are ignored from here on.
    #[display(fmt = "game over")]
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub fall_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fall_interval: Duration::from_millis(500),
        }
    }
}

/// Decides when the automatic fall happens, given readings of a monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallTimer {
    interval: Duration,
    last_fall: Duration,
}

impl FallTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fall: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// `true` at most once per elapsed interval.
    pub fn poll(&mut self, elapsed: Duration) -> bool {
        if elapsed.saturating_sub(self.last_fall) >= self.interval {
            self.last_fall = elapsed;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone)]
pub struct Game<const WIDTH: usize, const HEIGHT: usize> {
    grid: Grid<WIDTH, HEIGHT>,
    // None once locked, until the driver spawns the next piece
    piece: Option<Piece>,
    status: Status,
    timer: FallTimer,
}

impl<const WIDTH: usize, const HEIGHT: usize> Game<WIDTH, HEIGHT> {
    pub fn new(shape: Shape, config: Config) -> Self {
        Self::with_grid(Grid::new(), shape, config)
    }

    /// Start on an existing grid. Immediately over if `shape` can't spawn.
    pub fn with_grid(grid: Grid<WIDTH, HEIGHT>, shape: Shape, config: Config) -> Self {
        let mut game = Self {
            grid,
            piece: None,
            status: Status::Locked,
            timer: FallTimer::new(config.fall_interval),
        };
        game.spawn(shape);
        game
    }

    pub fn grid(&self) -> &Grid<WIDTH, HEIGHT> {
        &self.grid
    }

    /// The active piece. Kept after game over so it can still be drawn.
    pub fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn fall_interval(&self) -> Duration {
        self.timer.interval()
    }

    pub fn is_game_over(&self) -> bool {
        self.status == Status::GameOver
    }

    /// Replace the active piece with a fresh `shape` at the spawn position.
    pub fn spawn(&mut self, shape: Shape) -> Status {
        if self.is_game_over() {
            return self.status;
        }
        let piece = Piece::spawn(shape, WIDTH);
        tracing::debug!(%shape, origin = ?piece.origin(), "spawned");
        self.status = if piece.is_colliding(&self.grid) {
            tracing::debug!(%shape, "no room to spawn, game over");
            Status::GameOver
        } else {
            Status::Falling
        };
        self.piece = Some(piece);
        self.status
    }

    pub fn move_left(&mut self) -> bool {
        self.attempt(Transform::Move { dx: -1, dy: 0 })
    }

    pub fn move_right(&mut self) -> bool {
        self.attempt(Transform::Move { dx: 1, dy: 0 })
    }

    /// Move down a single row. Never locks, that's left to the fall timer.
    pub fn soft_drop(&mut self) -> bool {
        self.attempt(Transform::Move { dx: 0, dy: 1 })
    }

    pub fn rotate_cw(&mut self) -> bool {
        self.attempt(Transform::RotateClockwise)
    }

    pub fn rotate_ccw(&mut self) -> bool {
        self.attempt(Transform::RotateCounterClockwise)
    }

    fn attempt(&mut self, transform: Transform) -> bool {
        match (self.status, self.piece.as_mut()) {
            (Status::Falling, Some(piece)) => piece.attempt(transform, &self.grid),
            _ => false,
        }
    }

    /// Run the automatic fall if the interval has passed by `elapsed`.
    pub fn update(&mut self, elapsed: Duration) -> Status {
        if self.status == Status::Falling && self.timer.poll(elapsed) {
            self.fall();
        }
        self.status
    }

    /// One automatic step down, locking the piece if it can't move.
    pub fn fall(&mut self) -> Status {
        if self.status != Status::Falling {
            return self.status;
        }
        let Some(piece) = self.piece.as_mut() else {
            return self.status;
        };
        if piece.attempt(Transform::Move { dx: 0, dy: 1 }, &self.grid) {
            return self.status;
        }
        let (_, y) = piece.origin();
        if y == SPAWN_ROW {
            tracing::debug!(shape = %piece.shape(), "stuck on the spawn row, game over");
            self.status = Status::GameOver;
            return self.status;
        }
        tracing::debug!(shape = %piece.shape(), origin = ?piece.origin(), "locked");
        // cells above the top edge have nowhere to go
        self.grid.commit(piece.cells().filter_map(|(x, y)| {
            Some((usize::try_from(x).ok()?, usize::try_from(y).ok()?))
        }));
        self.piece = None;
        self.status = Status::Locked;
        self.status
    }
}
