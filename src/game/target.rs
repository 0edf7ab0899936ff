use super::constants::MAX_PLACEMENT_ATTEMPTS;
use super::geometry::Position;
use rand::Rng;
use std::collections::HashSet;

/// Draws a random cell, resampling while it lands on `occupied`. Gives up
/// after a bounded number of draws and keeps the last one, so a crowded grid
/// never stalls the tick.
pub fn place_target<R: Rng + ?Sized>(
  rng: &mut R,
  occupied: &HashSet<Position>,
  grid_size: u32,
) -> Position {
  let mut position = random_position(rng, grid_size);
  let mut attempts = 1;
  while occupied.contains(&position) && attempts < MAX_PLACEMENT_ATTEMPTS {
    position = random_position(rng, grid_size);
    attempts += 1;
  }
  position
}

fn random_position<R: Rng + ?Sized>(rng: &mut R, grid_size: u32) -> Position {
  Position::new(rng.gen_range(0..grid_size), rng.gen_range(0..grid_size))
}
