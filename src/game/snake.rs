use super::constants::{PLAYER_COLORS, SHORT_ID_LEN, SLOT_DIRECTIONS};
use super::geometry::{is_valid_direction_change, Direction, Position};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Snake {
    pub id: String,
    pub slot: usize,
    pub color: String,
    pub body: VecDeque<Position>,
    pub direction: Option<Direction>,
    pub pending_direction: Option<Direction>,
    pub score: u32,
}

/// Fixed spawn cell of a seat: a quarter of the way in for slot 0, three
/// quarters for slot 1, both on the middle row.
pub fn starting_position(slot: usize, grid_size: u32) -> Position {
    let y = grid_size / 2;
    if slot == 0 {
        Position::new(grid_size / 4, y)
    } else {
        Position::new(3 * grid_size / 4, y)
    }
}

pub fn slot_direction(slot: usize) -> Direction {
    SLOT_DIRECTIONS[slot % SLOT_DIRECTIONS.len()]
}

pub fn slot_color(slot: usize) -> &'static str {
    PLAYER_COLORS[slot % PLAYER_COLORS.len()]
}

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

impl Snake {
    pub fn new(id: String, slot: usize) -> Self {
        Self {
            id,
            slot,
            color: slot_color(slot).to_string(),
            body: VecDeque::new(),
            direction: None,
            pending_direction: None,
            score: 0,
        }
    }

    pub fn head(&self) -> Option<Position> {
        self.body.front().copied()
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    pub fn request_direction(&mut self, direction: Direction) {
        self.pending_direction = Some(direction);
    }

    /// Applies the buffered request unless it reverses the snake. The buffer
    /// is emptied either way.
    pub fn commit_pending_direction(&mut self) {
        let Some(requested) = self.pending_direction.take() else { return };
        if is_valid_direction_change(self.direction, requested) {
            self.direction = Some(requested);
        }
    }

    pub fn next_head(&self, grid_size: u32) -> Option<Position> {
        let head = self.head()?;
        let direction = self.direction?;
        Some(head.step(direction, grid_size))
    }

    pub fn occupies(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    pub fn push_head(&mut self, head: Position) {
        self.body.push_front(head);
    }

    pub fn drop_tail(&mut self) {
        if self.body.len() > 1 {
            self.body.pop_back();
        }
    }

    pub fn respawn(&mut self, grid_size: u32) {
        self.body.clear();
        self.body.push_back(starting_position(self.slot, grid_size));
        self.direction = Some(slot_direction(self.slot));
        self.pending_direction = None;
        self.score = 0;
    }

    pub fn clear(&mut self) {
        self.body.clear();
        self.direction = None;
        self.pending_direction = None;
        self.score = 0;
    }
}
