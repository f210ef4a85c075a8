//! PGN (Portable Game Notation) codec.
//!
//! This crate provides:
//! - [`Tags`] - tag-pair header parsing and serialisation
//! - [`Movetext`] - a tree of moves, comments, NAGs, and recursive
//!   variations, with a resilient parser that records [`Diagnostic`]s
//!   instead of failing on malformed input
//! - [`read_game`] / [`write_game`] - whole-game import and export on
//!   top of [`caissa_engine::Game`]
//!
//! # Example
//!
//! ```
//! let pgn = "1. e4 e5 2. Nf3 Nc6 *";
//! let (movetext, diagnostics) = caissa_pgn::Movetext::parse(pgn);
//! assert!(diagnostics.is_empty());
//! assert_eq!(movetext.moves.len(), 4);
//! ```

mod game;
mod lexer;
mod movetext;
mod tag;
mod writer;

pub use game::{read_game, PgnGame};
pub use lexer::{Diagnostic, DiagnosticLevel, Token, TokenKind};
pub use movetext::{Movetext, MovetextMove, Termination};
pub use tag::{TagPair, Tags};
pub use writer::{write_game, write_movetext};

use caissa_core::FenError;
use thiserror::Error;

/// Errors surfaced at the PGN boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PgnError {
    /// A tag-pair header line is malformed.
    #[error("invalid PGN header: {0}")]
    InvalidPgn(String),
    /// A movetext token cannot be resolved to a legal move.
    #[error("unresolvable move: {0}")]
    InvalidMove(String),
    /// A `{` comment was never closed.
    #[error("unclosed comment brace")]
    UnclosedBrace,
    /// A `(` variation was never closed, or a `)` had no opener.
    #[error("unmatched variation parenthesis")]
    UnmatchedParen,
    /// The FEN tag holds an invalid position.
    #[error(transparent)]
    Fen(#[from] FenError),
}
