use std::{io, str::FromStr, time::Duration};

use anyhow::Context;
use blockfall::{Config, Game, Shape, Status};
use clap::Parser;
use derive_more::From;
use generic_new::GenericNew;
use recap::Recap;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

const WIDTH: usize = 10;
const HEIGHT: usize = 20;

/// Play one line of input on a fresh grid.
/// After a piece locks, another `shape` is spawned in its place.
fn play<const WIDTH: usize, const HEIGHT: usize>(
    actions: impl IntoIterator<Item = impl Into<InputAction>>,
    shape: Shape,
    config: Config,
) -> Game<WIDTH, HEIGHT> {
    let mut game = Game::new(shape, config);
    let mut elapsed = Duration::ZERO;
    for input in actions {
        let InputAction { action, repeat } = input.into();
        for _ in 0..repeat {
            if game.is_game_over() {
                break;
            }
            match action {
                Action::Left => {
                    game.move_left();
                }
                Action::Right => {
                    game.move_right();
                }
                Action::Down => {
                    game.soft_drop();
                }
                Action::RotateClockwise => {
                    game.rotate_cw();
                }
                Action::RotateCounterClockwise => {
                    game.rotate_ccw();
                }
                Action::Tick => {
                    elapsed = elapsed.saturating_add(game.fall_interval());
                    if game.update(elapsed) == Status::Locked {
                        game.spawn(shape);
                    }
                }
            }
        }
    }
    game
}

#[derive(Debug, Parser)]
#[command(about, override_usage = "blockfall [OPTIONS] < input.txt")]
struct Args {
    /// Shape of every spawned piece
    #[arg(long, default_value = "I")]
    shape: Shape,
    /// Simulated milliseconds between automatic falls
    #[arg(long, default_value_t = 500)]
    fall_interval_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let config = Config {
        fall_interval: Duration::from_millis(args.fall_interval_ms),
    };
    for line in io::stdin().lines() {
        let line = line.context("couldn't read line from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let input_actions = parse_line(&line).context("couldn't parse line")?;
        let game = play::<WIDTH, HEIGHT>(input_actions, args.shape, config);
        tracing::info!(status = %game.status(), "played line");
        print!("{}", game.grid());
        println!("{}", game.status());
    }
    Ok(())
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
enum Action {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "D")]
    Down,
    #[serde(rename = "U")]
    RotateClockwise,
    #[serde(rename = "C")]
    RotateCounterClockwise,
    #[serde(rename = "T")]
    Tick,
}

#[derive(Debug, Deserialize, Recap, PartialEq, Eq, Clone, Copy, GenericNew, From)]
#[recap(regex = r#"^(?P<action>[A-Z])(?P<repeat>\d+)$"#)]
struct InputAction {
    action: Action,
    repeat: usize,
}

fn parse_line(s: &str) -> anyhow::Result<Vec<InputAction>> {
    Ok(s.split(',')
        .map(str::trim)
        .map(InputAction::from_str)
        .collect::<Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfall::{grid, Piece};
    use Action::{Down, Left, Right, RotateClockwise, RotateCounterClockwise, Tick};

    #[test]
    fn parse1() -> anyhow::Result<()> {
        assert_eq!(
            parse_line("L3,U1,T20")?,
            vec![
                InputAction::new(Left, 3),
                InputAction::new(RotateClockwise, 1),
                InputAction::new(Tick, 20)
            ]
        );
        Ok(())
    }

    #[test]
    fn parse_every_action() -> anyhow::Result<()> {
        assert_eq!(
            parse_line("L1, R2, D3, U4, C5, T6")?,
            vec![
                InputAction::new(Left, 1),
                InputAction::new(Right, 2),
                InputAction::new(Down, 3),
                InputAction::new(RotateClockwise, 4),
                InputAction::new(RotateCounterClockwise, 5),
                InputAction::new(Tick, 6)
            ]
        );
        Ok(())
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_line("X1").is_err());
        assert!(parse_line("L").is_err());
        assert!(parse_line("L1,,T2").is_err());
    }

    const LOCK_THEN_RESPAWN: [(Action, usize); 2] = [(Right, 1), (Tick, 5)];
    const STACK_UP: [(Action, usize); 1] = [(Tick, 3)];
    const ROTATE_THEN_DROP: [(Action, usize); 3] = [(Left, 3), (RotateClockwise, 1), (Tick, 19)];

    #[test]
    fn lock_then_respawn() {
        let game = play::<6, 6>(LOCK_THEN_RESPAWN, Shape::O, Config::default());
        assert_eq!(game.status(), Status::Falling);
        assert_eq!(
            game.grid(),
            &grid![
                [. . . . . .],
                [. . . . . .],
                [. . . . . .],
                [. . . . . .],
                [. . # # . .],
                [. . # # . .],
            ]
        );
    }

    #[test]
    fn respawn_into_stack_is_game_over() {
        let game = play::<6, 6>(STACK_UP, Shape::I, Config::default());
        assert_eq!(game.status(), Status::GameOver);
        assert_eq!(
            game.grid(),
            &grid![
                [. . . . . .],
                [. . . . . .],
                [. . # . . .],
                [. . # . . .],
                [. . # . . .],
                [. . # . . .],
            ]
        );
    }

    const FOREVER: [(Action, usize); 2] = [(Tick, usize::MAX), (Left, usize::MAX)];

    #[test]
    fn input_stops_at_game_over() {
        let game = play::<6, 6>(FOREVER, Shape::I, Config::default());
        assert_eq!(game.status(), Status::GameOver);
        assert_eq!(game.grid().occupied().count(), 4);
    }

    #[test]
    fn clock_saturates() {
        let config = Config {
            fall_interval: Duration::MAX,
        };
        let game = play::<6, 6>(STACK_UP, Shape::I, config);
        // the clock pins at its maximum after the first fall
        assert_eq!(game.status(), Status::Falling);
        assert_eq!(game.piece().map(Piece::origin), Some((1, 1)));
    }

    #[test]
    fn rotate_then_drop() {
        let game = play::<WIDTH, HEIGHT>(ROTATE_THEN_DROP, Shape::I, Config::default());
        assert_eq!(game.status(), Status::Falling);
        assert_eq!(
            game.grid().occupied().collect::<Vec<_>>(),
            [(0, 19), (1, 19), (2, 19), (3, 19)]
        );
    }
}
