//! Zobrist hashing for position identification.
//!
//! A position hash XORs random keys for every piece placement, the side
//! to move, each castling right, and the en passant file. Two positions
//! compare equal for repetition purposes iff these four components
//! match, which is exactly what the hash covers.

use crate::Position;
use caissa_core::{CastleSide, Color, Piece};

/// Zobrist hash keys, generated from a fixed seed at compile time.
pub struct ZobristKeys {
    /// Keys for pieces: [piece raw index][square].
    pieces: [[u64; 64]; 12],
    /// Key XORed in when black is to move.
    black_to_move: u64,
    /// Keys for the four castling rights.
    castling: [u64; 4],
    /// Keys for the en passant file.
    en_passant: [u64; 8],
}

impl ZobristKeys {
    const fn new() -> Self {
        // xorshift64; a fixed seed keeps hashes reproducible across runs
        const fn next_random(state: u64) -> u64 {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        }

        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let mut pieces = [[0u64; 64]; 12];
        let mut castling = [0u64; 4];
        let mut en_passant = [0u64; 8];

        let mut piece = 0;
        while piece < 12 {
            let mut square = 0;
            while square < 64 {
                state = next_random(state);
                pieces[piece][square] = state;
                square += 1;
            }
            piece += 1;
        }

        state = next_random(state);
        let black_to_move = state;

        let mut i = 0;
        while i < 4 {
            state = next_random(state);
            castling[i] = state;
            i += 1;
        }

        let mut i = 0;
        while i < 8 {
            state = next_random(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }
}

/// Global Zobrist keys, initialised at compile time.
static ZOBRIST: ZobristKeys = ZobristKeys::new();

impl Position {
    /// Computes the Zobrist hash of this position.
    ///
    /// The hash covers the board, the side to move, the castling
    /// rights, and the en passant target, matching the repetition
    /// equality of the threefold rule.
    pub fn zobrist_hash(&self) -> u64 {
        let mut hash = 0u64;

        for index in 0..12 {
            let piece = Piece::from_index(index).expect("index below 12");
            for sq in self.board.bitboard(piece) {
                hash ^= ZOBRIST.pieces[index][sq.index() as usize];
            }
        }

        if self.turn == Color::Black {
            hash ^= ZOBRIST.black_to_move;
        }

        let rights = [
            (Color::White, CastleSide::King),
            (Color::White, CastleSide::Queen),
            (Color::Black, CastleSide::King),
            (Color::Black, CastleSide::Queen),
        ];
        for (i, (color, side)) in rights.into_iter().enumerate() {
            if self.castling.allows(color, side) {
                hash ^= ZOBRIST.castling[i];
            }
        }

        if let Some(ep) = self.en_passant {
            hash ^= ZOBRIST.en_passant[ep.file().index() as usize];
        }

        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caissa_core::Move;

    fn mv(s: &str) -> Move {
        Move::from_coordinates(s).unwrap()
    }

    #[test]
    fn equal_positions_hash_equal() {
        assert_eq!(
            Position::startpos().zobrist_hash(),
            Position::startpos().zobrist_hash()
        );
    }

    #[test]
    fn moves_change_the_hash() {
        let mut pos = Position::startpos();
        let before = pos.zobrist_hash();
        pos.apply(mv("e2e4"), None).unwrap();
        assert_ne!(pos.zobrist_hash(), before);
    }

    #[test]
    fn apply_then_revert_restores_hash() {
        let mut pos = Position::startpos();
        let before = pos.zobrist_hash();
        let record = pos.apply(mv("g1f3"), None).unwrap();
        pos.revert(&record);
        assert_eq!(pos.zobrist_hash(), before);
    }

    #[test]
    fn hash_distinguishes_side_to_move() {
        let white = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let black = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_ne!(white.zobrist_hash(), black.zobrist_hash());
    }

    #[test]
    fn hash_distinguishes_castling_and_en_passant() {
        let all = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let none = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
        assert_ne!(all.zobrist_hash(), none.zobrist_hash());

        let with_ep =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1")
                .unwrap();
        let without_ep =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
                .unwrap();
        assert_ne!(with_ep.zobrist_hash(), without_ep.zobrist_hash());
    }

    #[test]
    fn same_arrival_different_path_hashes_equal() {
        let mut a = Position::startpos();
        a.apply(mv("g1f3"), None).unwrap();
        a.apply(mv("b8c6"), None).unwrap();

        let mut b = Position::startpos();
        b.apply(mv("b1c3"), None).unwrap();
        b.apply(mv("b8c6"), None).unwrap();
        b.apply(mv("g1f3"), None).unwrap();
        // different move orders, same placement; clocks differ but the
        // hash ignores them
        let mut a2 = a.clone();
        a2.apply(mv("b1c3"), None).unwrap();
        assert_eq!(a2.board, b.board);
        assert_eq!(a2.zobrist_hash(), b.zobrist_hash());
    }
}
