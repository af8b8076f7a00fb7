//! The board game: board layout, dice, players, question squares and the turn loop.

pub mod board;
pub mod dice;
pub mod elements;
pub mod io;
pub mod player;
pub mod questions;
pub mod session;

pub use session::GameSession;
