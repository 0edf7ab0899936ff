use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Moves one cell toward `direction` on a toroidal grid of `grid_size`
    /// cells per side.
    pub fn step(self, direction: Direction, grid_size: u32) -> Self {
        let x = self.x % grid_size;
        let y = self.y % grid_size;
        match direction {
            Direction::Up => Self::new(x, (y + grid_size - 1) % grid_size),
            Direction::Down => Self::new(x, (y + 1) % grid_size),
            Direction::Left => Self::new((x + grid_size - 1) % grid_size, y),
            Direction::Right => Self::new((x + 1) % grid_size, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Only a full reversal is refused. With no current direction anything goes.
pub fn is_valid_direction_change(current: Option<Direction>, requested: Direction) -> bool {
    match current {
        Some(current) => current.opposite() != requested,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_wraps_on_every_edge() {
        let grid = 30;
        assert_eq!(Position::new(29, 5).step(Direction::Right, grid), Position::new(0, 5));
        assert_eq!(Position::new(0, 5).step(Direction::Left, grid), Position::new(29, 5));
        assert_eq!(Position::new(4, 0).step(Direction::Up, grid), Position::new(4, 29));
        assert_eq!(Position::new(4, 29).step(Direction::Down, grid), Position::new(4, 0));
    }

    #[test]
    fn step_moves_one_cell_inside_grid() {
        let start = Position::new(10, 10);
        assert_eq!(start.step(Direction::Up, 30), Position::new(10, 9));
        assert_eq!(start.step(Direction::Down, 30), Position::new(10, 11));
        assert_eq!(start.step(Direction::Left, 30), Position::new(9, 10));
        assert_eq!(start.step(Direction::Right, 30), Position::new(11, 10));
    }

    #[test]
    fn reversal_is_the_only_rejected_change() {
        for current in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            for requested in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
                let expected = requested != current.opposite();
                assert_eq!(is_valid_direction_change(Some(current), requested), expected);
            }
        }
    }

    #[test]
    fn any_direction_is_valid_before_first_move() {
        assert!(is_valid_direction_change(None, Direction::Left));
        assert!(is_valid_direction_change(None, Direction::Up));
    }

    #[test]
    fn direction_uses_lowercase_names_on_the_wire() {
        assert_eq!(serde_json::to_string(&Direction::Left).unwrap(), "\"left\"");
        let parsed: Direction = serde_json::from_str("\"down\"").unwrap();
        assert_eq!(parsed, Direction::Down);
    }
}
