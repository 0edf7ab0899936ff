use crate::error::GameError;
use crate::game::geometry::{Direction, Position};
use serde::{Deserialize, Serialize};

pub const TYPE_START_GAME: &str = "startGame";
pub const TYPE_CHANGE_DIRECTION: &str = "changeDirection";
pub const TYPE_RESET_GAME: &str = "resetGame";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    #[serde(rename = "startGame")]
    StartGame,
    #[serde(rename = "changeDirection")]
    ChangeDirection { direction: Direction },
    #[serde(rename = "resetGame")]
    ResetGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    #[serde(rename = "playerId")]
    pub player_id: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeState {
    #[serde(rename = "playerId")]
    pub player_id: String,
    pub color: String,
    pub snake: Vec<Position>,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "init")]
    Init {
        #[serde(rename = "playerId")]
        player_id: String,
        color: String,
        #[serde(rename = "gridSize")]
        grid_size: u32,
    },
    #[serde(rename = "status")]
    Status { message: String },
    #[serde(rename = "playerList")]
    PlayerList { players: Vec<PlayerSummary> },
    #[serde(rename = "gameStarted")]
    GameStarted,
    #[serde(rename = "gameState")]
    GameState {
        apple: Position,
        snakes: Vec<SnakeState>,
    },
    #[serde(rename = "collision")]
    Collision { message: String },
    #[serde(rename = "gameOver")]
    GameOver { message: String },
    #[serde(rename = "gameReset")]
    GameReset { message: String },
    #[serde(rename = "error")]
    Error { message: String },
}

impl ServerEvent {
    pub fn status(message: impl Into<String>) -> Self {
        ServerEvent::Status {
            message: message.into(),
        }
    }

    pub fn error(error: &GameError) -> Self {
        ServerEvent::Error {
            message: error.to_string(),
        }
    }
}

/// Parses one inbound text frame. A frame whose `type` is not a known
/// command is `UnknownCommand`; anything else that fails to parse is
/// `MalformedMessage`.
pub fn decode_client_command(text: &str) -> Result<ClientCommand, GameError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| GameError::MalformedMessage)?;
    let message_type = value
        .get("type")
        .and_then(|value| value.as_str())
        .ok_or(GameError::MalformedMessage)?;
    match message_type {
        TYPE_START_GAME | TYPE_CHANGE_DIRECTION | TYPE_RESET_GAME => {}
        _ => return Err(GameError::UnknownCommand),
    }
    serde_json::from_value(value).map_err(|_| GameError::MalformedMessage)
}

pub fn encode_server_event(event: &ServerEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}
