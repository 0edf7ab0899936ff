use super::geometry::Direction;

pub const MAX_PLAYERS: usize = 2;
pub const DEFAULT_GRID_SIZE: u32 = 30;
pub const DEFAULT_TICK_MS: u64 = 100;
pub const DEFAULT_WINNING_SCORE: u32 = 10;
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;
pub const SHORT_ID_LEN: usize = 4;

pub const PLAYER_COLORS: [&str; MAX_PLAYERS] = ["#3a71e8", "#9de83a"];
pub const SLOT_DIRECTIONS: [Direction; MAX_PLAYERS] = [Direction::Right, Direction::Right];

pub const STATUS_WAITING: &str = "Waiting for another player...";
pub const STATUS_READY: &str = "Both players connected. Ready to start.";
pub const STATUS_PLAYER_LEFT: &str = "A player has disconnected. Waiting for player...";
pub const MESSAGE_COLLISION: &str = "You collided! Score reset and respawned.";
pub const MESSAGE_RESET: &str = "Game has been reset.";
