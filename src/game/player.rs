//! Player positions, turn order and token placement.

use crate::error::GameError;
use crate::protocol::PlayerOut;

use super::board::{Board, Rect};

pub const COLORS: [&str; 4] = ["#cb0404", "#f4631e", "#ff9f00", "#309898"];

pub const PLAYER_MARGIN: f64 = 20.0;
pub const PLAYER_RADIUS: f64 = 10.0;
pub const PLAYER_GAP: f64 = 3.0;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Token centres available inside one square, row by row.
pub fn grid_slots(rect: &Rect) -> Vec<(f64, f64)> {
  let step = PLAYER_GAP + PLAYER_RADIUS * 2.0;
  let (max_x, max_y) = (rect.x + rect.w - PLAYER_MARGIN, rect.y + rect.h - PLAYER_MARGIN);
  let mut slots = Vec::new();
  let mut y = rect.y + PLAYER_MARGIN;
  while y < max_y {
    let mut x = rect.x + PLAYER_MARGIN;
    while x < max_x {
      slots.push((x, y));
      x += step;
    }
    y += step;
  }
  slots
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
  pub id: usize,
  pub position: usize,
}

#[derive(Debug, Clone)]
pub struct PlayerRoster {
  players: Vec<Player>,
  current: usize,
}

impl PlayerRoster {
  pub fn new(count: usize) -> Self {
    let count = count.clamp(MIN_PLAYERS, MAX_PLAYERS);
    Self { players: (0..count).map(|id| Player { id, position: 0 }).collect(), current: 0 }
  }

  pub fn len(&self) -> usize {
    self.players.len()
  }

  pub fn current(&self) -> usize {
    self.current
  }

  pub fn current_position(&self) -> usize {
    self.players[self.current].position
  }

  /// Moves the current player one square forward and returns the new position.
  pub fn step_forward(&mut self) -> usize {
    let p = &mut self.players[self.current];
    p.position += 1;
    p.position
  }

  /// Moves the current player one square back; false when already at the start.
  pub fn step_back(&mut self) -> bool {
    let p = &mut self.players[self.current];
    if p.position == 0 {
      return false;
    }
    p.position -= 1;
    true
  }

  /// Hands the turn to the next player, wrapping around.
  pub fn next_turn(&mut self) -> usize {
    self.current = (self.current + 1) % self.players.len();
    self.current
  }

  /// Token positions for the renderer. Players sharing a square fill its grid in id order.
  pub fn placements(&self, board: &Board) -> Result<Vec<PlayerOut>, GameError> {
    let mut occupied = vec![0usize; board.len()];
    let mut out = Vec::with_capacity(self.players.len());
    for p in &self.players {
      let square = board
        .square(p.position)
        .ok_or(GameError::TooManyOccupants { square: p.position, capacity: 0 })?;
      let slots = grid_slots(&square.rect);
      let taken = &mut occupied[p.position];
      let &(x, y) = slots
        .get(*taken)
        .ok_or(GameError::TooManyOccupants { square: square.number(), capacity: slots.len() })?;
      *taken += 1;
      out.push(PlayerOut {
        player: p.id,
        position: p.position,
        highlighted: p.id == self.current,
        color: COLORS[p.id % COLORS.len()],
        x,
        y,
        radius: PLAYER_RADIUS,
      });
    }
    Ok(out)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::board::SquareKind;

  fn board(len: usize) -> Board {
    Board::from_kinds(&vec![SquareKind::Basic; len], 9, 100.0)
  }

  #[test]
  fn a_square_holds_nine_tokens() {
    let slots = grid_slots(&Rect { x: 0.0, y: 0.0, w: 100.0, h: 100.0 });
    assert_eq!(slots.len(), 9);
    assert_eq!(slots[0], (20.0, 20.0));
    assert_eq!(slots[1], (43.0, 20.0));
    assert_eq!(slots[3], (20.0, 43.0));
  }

  #[test]
  fn roster_clamps_and_rotates() {
    assert_eq!(PlayerRoster::new(0).len(), 2);
    assert_eq!(PlayerRoster::new(9).len(), 4);

    let mut r = PlayerRoster::new(3);
    assert_eq!(r.current(), 0);
    assert_eq!(r.next_turn(), 1);
    assert_eq!(r.next_turn(), 2);
    assert_eq!(r.next_turn(), 0);
  }

  #[test]
  fn stepping_back_stops_at_zero() {
    let mut r = PlayerRoster::new(2);
    assert_eq!(r.step_forward(), 1);
    assert!(r.step_back());
    assert!(!r.step_back());
    assert_eq!(r.current_position(), 0);
  }

  #[test]
  fn shared_squares_use_distinct_slots() {
    let b = board(10);
    let mut r = PlayerRoster::new(4);
    r.step_forward();
    let placed = r.placements(&b).unwrap();
    assert_eq!((placed[0].x, placed[0].y), (120.0, 20.0));
    assert_eq!((placed[1].x, placed[1].y), (20.0, 20.0));
    assert_eq!((placed[2].x, placed[2].y), (43.0, 20.0));
    assert!(placed[0].highlighted && !placed[1].highlighted);
  }

  #[test]
  fn overfull_square_is_an_error() {
    let tiny = Board::from_kinds(&[SquareKind::Basic, SquareKind::Basic], 9, 45.0);
    // 45 - 2 * 20 leaves room for a single token.
    let r = PlayerRoster::new(2);
    assert!(matches!(r.placements(&tiny), Err(GameError::TooManyOccupants { capacity: 1, .. })));
  }
}
