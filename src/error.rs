use thiserror::Error;

/// Failures a connection or a room can run into. The display text is what
/// the client sees in an `error` event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
  #[error("No roomId provided")]
  MissingRoomId,

  #[error("Room is full")]
  RoomFull,

  /// The room was retired after its last player left. Only the registry sees this.
  #[error("Room is closed")]
  RoomClosed,

  #[error("Cannot start game. Waiting for another player.")]
  NotEnoughPlayers,

  #[error("Game is over. Reset to play again.")]
  GameFinished,

  #[error("Unknown message type")]
  UnknownCommand,

  #[error("Invalid message")]
  MalformedMessage,

  #[error("A server error occurred. Please restart the game.")]
  SimulationFault(String),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fault_detail_stays_out_of_client_message() {
    let error = GameError::SimulationFault("seat 1 has no body".to_string());
    assert_eq!(
      error.to_string(),
      "A server error occurred. Please restart the game."
    );
  }

  #[test]
  fn admission_errors_match_client_text() {
    assert_eq!(GameError::MissingRoomId.to_string(), "No roomId provided");
    assert_eq!(GameError::RoomFull.to_string(), "Room is full");
  }
}
