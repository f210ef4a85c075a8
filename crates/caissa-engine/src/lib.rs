//! Bitboard chess rules engine.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit board representation with efficient operations
//! - [`Board`] - piece placement as twelve bitboards, with attacker and
//!   pin queries
//! - [`Position`] - full game state with a FEN codec and reversible
//!   in-place move application
//! - [`Game`] - game management with undo/redo history, outcomes, and
//!   draw claiming
//! - [`movegen`] - legal move generation and perft
//! - [`san`] - algebraic notation parsing and generation
//! - [`search`] - material evaluation and alpha-beta minimax
//!
//! # Architecture
//!
//! The engine uses bitboards for piece representation - each piece
//! kind/color pair has a 64-bit integer where each bit represents a
//! square. Moves carry only their start and end squares; promotion
//! choices are supplied at execution time.
//!
//! # Example
//!
//! ```
//! use caissa_core::Move;
//! use caissa_engine::Game;
//!
//! let mut game = Game::new();
//! game.execute(Move::from_coordinates("e2e4").unwrap()).unwrap();
//! game.execute(Move::from_coordinates("e7e5").unwrap()).unwrap();
//! assert_eq!(game.position().fullmove_number, 2);
//! ```

mod bitboard;
mod board;
mod game;
pub mod movegen;
mod position;
pub mod san;
pub mod search;
mod zobrist;

pub use bitboard::Bitboard;
pub use board::Board;
pub use game::{Game, GameError, Outcome, Player, PlayerKind, Players, Variant};
pub use movegen::{legal_moves, legal_moves_from, MoveList};
pub use position::{CastlingRights, HistoryRecord, Position};
pub use san::{move_to_san, parse_move, SanError};
pub use search::{best_move, evaluate, minimax};
