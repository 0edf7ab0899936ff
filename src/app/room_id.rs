use crate::error::GameError;

pub const ROOM_ID_PARAM: &str = "roomId";

/// Room ids are opaque; only surrounding whitespace is stripped.
pub fn parse_room_id(value: Option<&str>) -> Result<String, GameError> {
  let trimmed = value.map(str::trim).unwrap_or_default();
  if trimmed.is_empty() {
    return Err(GameError::MissingRoomId);
  }
  Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trims_surrounding_whitespace() {
    assert_eq!(parse_room_id(Some("  r1 ")), Ok("r1".to_string()));
  }

  #[test]
  fn keeps_id_otherwise_untouched() {
    assert_eq!(parse_room_id(Some("Room #7/x")), Ok("Room #7/x".to_string()));
  }

  #[test]
  fn missing_or_blank_id_is_rejected() {
    assert_eq!(parse_room_id(None), Err(GameError::MissingRoomId));
    assert_eq!(parse_room_id(Some("   ")), Err(GameError::MissingRoomId));
  }
}
