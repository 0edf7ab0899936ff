use super::constants::{
  DEFAULT_GRID_SIZE, DEFAULT_TICK_MS, DEFAULT_WINNING_SCORE, MAX_PLAYERS, MESSAGE_COLLISION,
  MESSAGE_RESET, STATUS_PLAYER_LEFT, STATUS_READY, STATUS_WAITING,
};
use super::geometry::{Direction, Position};
use super::snake::Snake;
use super::target::place_target;
use crate::error::GameError;
use crate::protocol::{self, ClientCommand, PlayerSummary, ServerEvent, SnakeState};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

mod session;

pub use session::{ConnectionId, EventSender, JoinedPlayer};
use session::{encode, Seat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomConfig {
  pub grid_size: u32,
  pub tick_interval: Duration,
  pub winning_score: u32,
}

impl Default for RoomConfig {
  fn default() -> Self {
    Self {
      grid_size: DEFAULT_GRID_SIZE,
      tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
      winning_score: DEFAULT_WINNING_SCORE,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Waiting,
  Ready,
  Running,
  Over,
}

#[derive(Debug)]
pub struct Room {
  id: String,
  state: Mutex<RoomState>,
}

#[derive(Debug)]
struct Ticker {
  epoch: u64,
  handle: JoinHandle<()>,
}

#[derive(Debug)]
struct RoomState {
  room_id: String,
  config: RoomConfig,
  seats: [Option<Seat>; MAX_PLAYERS],
  target: Position,
  finished: bool,
  closed: bool,
  ticker: Option<Ticker>,
  next_epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
  Continue,
  Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
  Stayed,
  Moved,
  Collided,
  Ate(u32),
}

impl Room {
  pub fn new(id: impl Into<String>, config: RoomConfig) -> Self {
    let id = id.into();
    Self {
      state: Mutex::new(RoomState::new(id.clone(), config)),
      id,
    }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  /// Seats a new connection. The caller owns closing the socket on error.
  pub async fn join(&self, sender: EventSender) -> Result<JoinedPlayer, GameError> {
    let mut state = self.state.lock().await;
    state.join(sender)
  }

  /// Drops a connection's seat. Returns `true` once the room is empty and
  /// retired, at which point the registry should forget it.
  pub async fn leave(&self, connection_id: ConnectionId) -> bool {
    let mut state = self.state.lock().await;
    state.leave(connection_id)
  }

  #[cfg(test)]
  pub async fn phase(&self) -> Phase {
    self.state.lock().await.phase()
  }

  #[cfg(test)]
  pub async fn player_count(&self) -> usize {
    self.state.lock().await.seated_count()
  }

  pub async fn handle_text_message(self: &Arc<Self>, connection_id: ConnectionId, text: &str) {
    match protocol::decode_client_command(text) {
      Ok(command) => self.handle_command(connection_id, command).await,
      Err(error) => {
        tracing::debug!(room_id = %self.id, %connection_id, %error, "rejected client message");
        let state = self.state.lock().await;
        state.send_to(connection_id, &ServerEvent::error(&error));
      }
    }
  }

  pub async fn handle_command(self: &Arc<Self>, connection_id: ConnectionId, command: ClientCommand) {
    let mut state = self.state.lock().await;
    if state.slot_of(connection_id).is_none() {
      return;
    }
    tracing::trace!(
      room_id = %self.id,
      %connection_id,
      ?command,
      phase = ?state.phase(),
      "client command"
    );
    match command {
      ClientCommand::StartGame => match state.start_game() {
        Ok(true) => self.spawn_ticker(&mut state),
        Ok(false) => {}
        Err(error) => state.send_to(connection_id, &ServerEvent::error(&error)),
      },
      ClientCommand::ChangeDirection { direction } => {
        state.change_direction(connection_id, direction);
      }
      ClientCommand::ResetGame => state.reset_game(),
    }
  }

  fn spawn_ticker(self: &Arc<Self>, state: &mut RoomState) {
    if state.ticker.is_some() {
      return;
    }
    let epoch = state.next_epoch;
    state.next_epoch += 1;
    let period = state.config.tick_interval;
    let room = Arc::clone(self);
    let handle = tokio::spawn(async move {
      let start = tokio::time::Instant::now() + period;
      let mut interval = tokio::time::interval_at(start, period);
      loop {
        interval.tick().await;
        let mut state = room.state.lock().await;
        if !state.owns_ticker(epoch) {
          break;
        }
        if state.run_tick() == TickOutcome::Finished {
          break;
        }
      }
    });
    state.ticker = Some(Ticker { epoch, handle });
    tracing::debug!(room_id = %self.id, epoch, "ticker started");
  }
}

impl RoomState {
  fn new(room_id: String, config: RoomConfig) -> Self {
    Self {
      room_id,
      config,
      seats: [None, None],
      target: Position::new(0, 0),
      finished: false,
      closed: false,
      ticker: None,
      next_epoch: 0,
    }
  }

  fn phase(&self) -> Phase {
    if self.ticker.is_some() {
      Phase::Running
    } else if self.finished {
      Phase::Over
    } else if self.seated_count() == MAX_PLAYERS {
      Phase::Ready
    } else {
      Phase::Waiting
    }
  }

  fn seated_count(&self) -> usize {
    self.seats.iter().filter(|seat| seat.is_some()).count()
  }

  fn slot_of(&self, connection_id: ConnectionId) -> Option<usize> {
    self.seats.iter().position(|seat| {
      seat
        .as_ref()
        .is_some_and(|seat| seat.connection_id == connection_id)
    })
  }

  fn owns_ticker(&self, epoch: u64) -> bool {
    self.ticker.as_ref().is_some_and(|ticker| ticker.epoch == epoch)
  }

  fn join(&mut self, sender: EventSender) -> Result<JoinedPlayer, GameError> {
    if self.closed {
      return Err(GameError::RoomClosed);
    }
    let Some(slot) = self.seats.iter().position(|seat| seat.is_none()) else {
      return Err(GameError::RoomFull);
    };

    let connection_id = ConnectionId::new();
    let snake = Snake::new(Uuid::new_v4().to_string(), slot);
    let joined = JoinedPlayer {
      connection_id,
      player_id: snake.id.clone(),
      color: snake.color.clone(),
      slot,
    };
    let seat = Seat {
      connection_id,
      sender,
      snake,
    };
    seat.send(&ServerEvent::Init {
      player_id: joined.player_id.clone(),
      color: joined.color.clone(),
      grid_size: self.config.grid_size,
    });
    self.seats[slot] = Some(seat);
    tracing::info!(room_id = %self.room_id, player_id = %joined.player_id, slot, "player joined");

    self.broadcast_player_list();
    let status = if self.seated_count() == MAX_PLAYERS {
      STATUS_READY
    } else {
      STATUS_WAITING
    };
    self.broadcast(&ServerEvent::status(status));
    Ok(joined)
  }

  fn leave(&mut self, connection_id: ConnectionId) -> bool {
    if let Some(slot) = self.slot_of(connection_id) {
      if let Some(seat) = self.seats[slot].take() {
        tracing::info!(room_id = %self.room_id, player_id = %seat.snake.id, slot, "player left");
      }
      self.cancel_ticker();
      self.finished = false;
      self.broadcast(&ServerEvent::status(STATUS_PLAYER_LEFT));
      self.broadcast_player_list();
    }
    if self.seated_count() == 0 {
      self.closed = true;
    }
    self.closed
  }

  /// `Ok(true)` when a fresh game was seeded and needs a ticker, `Ok(false)`
  /// when one is already running.
  fn start_game(&mut self) -> Result<bool, GameError> {
    if self.ticker.is_some() {
      return Ok(false);
    }
    if self.seated_count() != MAX_PLAYERS {
      return Err(GameError::NotEnoughPlayers);
    }
    if self.finished {
      return Err(GameError::GameFinished);
    }
    self.seed_game();
    tracing::info!(room_id = %self.room_id, "game started");
    self.broadcast(&ServerEvent::GameStarted);
    Ok(true)
  }

  fn change_direction(&mut self, connection_id: ConnectionId, direction: Direction) {
    if self.ticker.is_none() {
      return;
    }
    let Some(slot) = self.slot_of(connection_id) else { return };
    if let Some(seat) = self.seats[slot].as_mut() {
      seat.snake.request_direction(direction);
    }
  }

  fn reset_game(&mut self) {
    self.cancel_ticker();
    self.finished = false;
    for seat in self.seats.iter_mut().flatten() {
      seat.snake.clear();
    }
    self.seed_game();
    tracing::info!(room_id = %self.room_id, "game reset");
    self.broadcast(&ServerEvent::GameReset {
      message: MESSAGE_RESET.to_string(),
    });
  }

  fn seed_game(&mut self) {
    let grid_size = self.config.grid_size;
    for seat in self.seats.iter_mut().flatten() {
      seat.snake.respawn(grid_size);
    }
    self.target = place_target(&mut rand::thread_rng(), &self.occupied_cells(), grid_size);
  }

  fn occupied_cells(&self) -> HashSet<Position> {
    self
      .seats
      .iter()
      .flatten()
      .flat_map(|seat| seat.snake.body.iter().copied())
      .collect()
  }

  /// Stops the ticker from outside its own task.
  fn cancel_ticker(&mut self) {
    if let Some(ticker) = self.ticker.take() {
      ticker.handle.abort();
      tracing::debug!(room_id = %self.room_id, epoch = ticker.epoch, "ticker cancelled");
    }
  }

  /// Forgets the ticker from inside its own task, which exits right after.
  fn release_ticker(&mut self) {
    self.ticker = None;
  }

  fn run_tick(&mut self) -> TickOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| self.tick())).unwrap_or_else(|payload| {
      let detail = payload
        .downcast_ref::<&str>()
        .map(|value| value.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "tick panicked".to_string());
      Err(GameError::SimulationFault(detail))
    });
    match result {
      Ok(outcome) => outcome,
      Err(error) => {
        self.abort_game(&error);
        TickOutcome::Finished
      }
    }
  }

  fn tick(&mut self) -> Result<TickOutcome, GameError> {
    let grid_size = self.config.grid_size;
    // Taken once before anyone moves; cells entered or vacated this tick do
    // not change it.
    let occupied = self.occupied_cells();

    for slot in 0..MAX_PLAYERS {
      let step = {
        let Some(seat) = self.seats[slot].as_mut() else { continue };
        if seat.snake.body.is_empty() {
          return Err(GameError::SimulationFault(format!(
            "player {} has no body",
            seat.snake.id
          )));
        }
        seat.snake.commit_pending_direction();
        match seat.snake.next_head(grid_size) {
          None => Step::Stayed,
          Some(head) if occupied.contains(&head) || seat.snake.occupies(head) => Step::Collided,
          Some(head) => {
            seat.snake.push_head(head);
            if head == self.target {
              seat.snake.score += 1;
              Step::Ate(seat.snake.score)
            } else {
              seat.snake.drop_tail();
              Step::Moved
            }
          }
        }
      };

      match step {
        Step::Stayed | Step::Moved => {}
        Step::Collided => self.handle_collision(slot),
        Step::Ate(score) => {
          self.target = place_target(&mut rand::thread_rng(), &self.occupied_cells(), grid_size);
          if score >= self.config.winning_score {
            self.finish_game(slot);
            return Ok(TickOutcome::Finished);
          }
        }
      }
    }

    self.broadcast_state();
    Ok(TickOutcome::Continue)
  }

  fn handle_collision(&mut self, slot: usize) {
    let grid_size = self.config.grid_size;
    let Some(seat) = self.seats[slot].as_mut() else { return };
    seat.snake.respawn(grid_size);
    tracing::debug!(room_id = %self.room_id, player_id = %seat.snake.id, "player collided");
    seat.send(&ServerEvent::Collision {
      message: MESSAGE_COLLISION.to_string(),
    });
    let status = format!("Player {} collided and was respawned.", seat.snake.short_id());
    self.broadcast(&ServerEvent::status(status));
  }

  fn finish_game(&mut self, slot: usize) {
    self.release_ticker();
    self.finished = true;
    let Some(seat) = self.seats[slot].as_ref() else { return };
    let message = format!("Player {} wins!", seat.snake.short_id());
    tracing::info!(room_id = %self.room_id, player_id = %seat.snake.id, "game over");
    self.broadcast(&ServerEvent::GameOver { message });
  }

  fn abort_game(&mut self, error: &GameError) {
    tracing::error!(room_id = %self.room_id, ?error, "simulation tick failed");
    self.release_ticker();
    self.finished = false;
    self.broadcast(&ServerEvent::error(error));
  }

  fn player_list(&self) -> Vec<PlayerSummary> {
    self
      .seats
      .iter()
      .flatten()
      .map(|seat| PlayerSummary {
        player_id: seat.snake.id.clone(),
        color: seat.snake.color.clone(),
      })
      .collect()
  }

  fn broadcast_player_list(&self) {
    self.broadcast(&ServerEvent::PlayerList {
      players: self.player_list(),
    });
  }

  fn build_state_event(&self) -> ServerEvent {
    let snakes = self
      .seats
      .iter()
      .flatten()
      .map(|seat| SnakeState {
        player_id: seat.snake.id.clone(),
        color: seat.snake.color.clone(),
        snake: seat.snake.body.iter().copied().collect(),
        score: seat.snake.score,
      })
      .collect();
    ServerEvent::GameState {
      apple: self.target,
      snakes,
    }
  }

  fn broadcast_state(&self) {
    self.broadcast(&self.build_state_event());
  }

  fn broadcast(&self, event: &ServerEvent) {
    let Some(payload) = encode(event) else { return };
    for seat in self.seats.iter().flatten() {
      let _ = seat.sender.send(payload.clone());
    }
  }

  fn send_to(&self, connection_id: ConnectionId, event: &ServerEvent) {
    if let Some(slot) = self.slot_of(connection_id) {
      if let Some(seat) = self.seats[slot].as_ref() {
        seat.send(event);
      }
    }
  }
}
