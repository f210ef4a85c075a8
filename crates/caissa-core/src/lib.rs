//! Core types for chess.
//!
//! This crate provides the fundamental value types used across the rules
//! library:
//! - [`Color`] for the two players
//! - [`PieceKind`] and [`Piece`] for piece representation
//! - [`Square`], [`File`], [`Rank`], and [`Direction`] for board geometry
//! - [`Move`] for move representation
//! - [`FenFields`] for splitting and validating FEN records

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{FenError, FenFields};
pub use mov::{CastleSide, Move};
pub use piece::{Piece, PieceKind};
pub use square::{Direction, File, Rank, Square};
