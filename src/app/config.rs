use crate::game::constants::{DEFAULT_GRID_SIZE, DEFAULT_TICK_MS, DEFAULT_WINNING_SCORE};
use crate::game::room::RoomConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8787;
const MIN_GRID_SIZE: u32 = 4;
const MAX_GRID_SIZE: u32 = u16::MAX as u32;
const MIN_TICK_MS: u64 = 10;
const MIN_WINNING_SCORE: u32 = 1;

#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub port: u16,
  pub room: RoomConfig,
}

impl ServerConfig {
  /// Reads `PORT`, `GRID_SIZE`, `TICK_MS` and `WINNING_SCORE`, falling back
  /// to defaults for anything unset or unparsable.
  pub fn from_env() -> Self {
    Self::from_lookup(|key| env::var(key).ok())
  }

  fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let port = parse_or(&lookup, "PORT", DEFAULT_PORT);
    let grid_size =
      parse_or(&lookup, "GRID_SIZE", DEFAULT_GRID_SIZE).clamp(MIN_GRID_SIZE, MAX_GRID_SIZE);
    let tick_ms = parse_or(&lookup, "TICK_MS", DEFAULT_TICK_MS).max(MIN_TICK_MS);
    let winning_score =
      parse_or(&lookup, "WINNING_SCORE", DEFAULT_WINNING_SCORE).max(MIN_WINNING_SCORE);

    Self {
      port,
      room: RoomConfig {
        grid_size,
        tick_interval: Duration::from_millis(tick_ms),
        winning_score,
      },
    }
  }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, fallback: T) -> T {
  lookup(key)
    .and_then(|value| value.trim().parse().ok())
    .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::geometry::{Direction, Position};
  use crate::game::snake::starting_position;
  use std::collections::HashMap;

  fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
    let values: HashMap<String, String> = pairs
      .iter()
      .map(|(key, value)| (key.to_string(), value.to_string()))
      .collect();
    ServerConfig::from_lookup(|key| values.get(key).cloned())
  }

  #[test]
  fn defaults_apply_when_unset() {
    let config = config_from(&[]);
    assert_eq!(config.port, 8787);
    assert_eq!(config.room, RoomConfig::default());
  }

  #[test]
  fn values_are_read_from_environment() {
    let config = config_from(&[
      ("PORT", "9000"),
      ("GRID_SIZE", "20"),
      ("TICK_MS", "150"),
      ("WINNING_SCORE", "5"),
    ]);
    assert_eq!(config.port, 9000);
    assert_eq!(config.room.grid_size, 20);
    assert_eq!(config.room.tick_interval, Duration::from_millis(150));
    assert_eq!(config.room.winning_score, 5);
  }

  #[test]
  fn garbage_falls_back_and_tiny_values_are_clamped() {
    let config = config_from(&[("PORT", "http"), ("GRID_SIZE", "1"), ("TICK_MS", "0")]);
    assert_eq!(config.port, 8787);
    assert_eq!(config.room.grid_size, 4);
    assert_eq!(config.room.tick_interval, Duration::from_millis(10));
  }

  #[test]
  fn oversized_grid_is_clamped() {
    let config = config_from(&[("GRID_SIZE", "2000000000")]);
    assert_eq!(config.room.grid_size, 65535);

    let far_start = starting_position(1, config.room.grid_size);
    assert_eq!(far_start, Position::new(49151, 32767));
    assert_eq!(far_start.step(Direction::Up, config.room.grid_size), Position::new(49151, 32766));
  }
}
