//! Piece placement as twelve bitboards.

use crate::movegen::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
    xray_bishop_attacks, xray_rook_attacks,
};
use crate::{movegen, Bitboard};
use caissa_core::{Color, FenError, FenFields, Piece, PieceKind, Square};

/// Piece placement for a full board.
///
/// One bitboard per (kind, color) pair, indexed by [`Piece::index`].
/// Every square belongs to at most one bitboard.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    pieces: [Bitboard; 12],
}

impl Board {
    /// Creates an empty board.
    pub const fn empty() -> Self {
        Board {
            pieces: [Bitboard::EMPTY; 12],
        }
    }

    /// Returns the bitboard for the given piece.
    #[inline]
    pub fn bitboard(&self, piece: Piece) -> Bitboard {
        self.pieces[piece.index()]
    }

    /// Returns the piece on the given square, if any.
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        for index in 0..12 {
            if self.pieces[index].contains(sq) {
                return Piece::from_index(index);
            }
        }
        None
    }

    /// Places a piece on a square, replacing any existing occupant.
    pub fn set(&mut self, sq: Square, piece: Piece) {
        self.remove(sq);
        self.pieces[piece.index()].set(sq);
    }

    /// Removes and returns the piece on a square.
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.piece_at(sq)?;
        self.pieces[piece.index()].clear(sq);
        Some(piece)
    }

    /// Returns the number of pieces of the given kind and color.
    #[inline]
    pub fn count(&self, piece: Piece) -> u32 {
        self.bitboard(piece).count()
    }

    /// Returns the squares occupied by the given piece.
    #[inline]
    pub fn squares(&self, piece: Piece) -> Bitboard {
        self.bitboard(piece)
    }

    /// Returns the square of the given color's king, if present.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.bitboard(Piece::new(PieceKind::King, color)).first_square()
    }

    /// Returns all squares occupied by the given color.
    pub fn occupancy(&self, color: Color) -> Bitboard {
        let mut occupancy = Bitboard::EMPTY;
        for kind in PieceKind::ALL {
            occupancy |= self.bitboard(Piece::new(kind, color));
        }
        occupancy
    }

    /// Returns all occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupancy(Color::White) | self.occupancy(Color::Black)
    }

    /// Returns all empty squares.
    #[inline]
    pub fn empty_squares(&self) -> Bitboard {
        !self.occupied()
    }

    /// Returns the squares of all pieces of `by` that attack `sq`.
    ///
    /// The queen is folded into the rook and bishop masks rather than
    /// enumerated separately.
    pub fn attackers(&self, sq: Square, by: Color) -> Bitboard {
        let occupied = self.occupied();
        let queens = self.bitboard(Piece::new(PieceKind::Queen, by));

        let mut attackers = Bitboard::EMPTY;
        attackers |= pawn_attacks(sq, by.opposite())
            & self.bitboard(Piece::new(PieceKind::Pawn, by));
        attackers |= knight_attacks(sq) & self.bitboard(Piece::new(PieceKind::Knight, by));
        attackers |= king_attacks(sq) & self.bitboard(Piece::new(PieceKind::King, by));
        attackers |= bishop_attacks(sq, occupied)
            & (self.bitboard(Piece::new(PieceKind::Bishop, by)) | queens);
        attackers |= rook_attacks(sq, occupied)
            & (self.bitboard(Piece::new(PieceKind::Rook, by)) | queens);
        attackers
    }

    /// Returns true if `sq` is attacked by the given color.
    #[inline]
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        self.attackers(sq, by).is_not_empty()
    }

    /// Returns true if the given color's king is attacked.
    pub fn in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(king) => self.is_attacked(king, color.opposite()),
            None => false,
        }
    }

    /// Returns the squares of `color`'s pieces that are pinned to their
    /// own king.
    ///
    /// Xray attacks from the king pass through one blocker; each
    /// opposing slider they reveal pins the single own piece sitting on
    /// the between set.
    pub fn pinned(&self, color: Color) -> Bitboard {
        let Some(king) = self.king_square(color) else {
            return Bitboard::EMPTY;
        };

        let them = color.opposite();
        let occupied = self.occupied();
        let own = self.occupancy(color);
        let queens = self.bitboard(Piece::new(PieceKind::Queen, them));

        let rook_pinners = xray_rook_attacks(king, occupied, own)
            & (self.bitboard(Piece::new(PieceKind::Rook, them)) | queens);
        let bishop_pinners = xray_bishop_attacks(king, occupied, own)
            & (self.bitboard(Piece::new(PieceKind::Bishop, them)) | queens);

        let mut pinned = Bitboard::EMPTY;
        for pinner in rook_pinners | bishop_pinners {
            pinned |= movegen::between(king, pinner) & own;
        }
        pinned
    }

    /// Serialises the board into the FEN piece-placement field.
    pub fn fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8u8).rev() {
            let mut empty_run = 0;
            for file in 0..8u8 {
                // SAFETY: rank and file are both below 8
                let sq = unsafe { Square::from_index_unchecked(rank * 8 + file) };
                if let Some(piece) = self.piece_at(sq) {
                    if empty_run > 0 {
                        fen.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    fen.push(piece.to_fen_char());
                } else {
                    empty_run += 1;
                }
            }
            if empty_run > 0 {
                fen.push_str(&empty_run.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        fen
    }

    /// Parses the FEN piece-placement field into a board.
    pub fn from_fen(placement: &str) -> Result<Self, FenError> {
        FenFields::validate_placement(placement)?;

        let mut board = Board::empty();
        for (rank_index, rank_str) in placement.split('/').enumerate() {
            let rank = 7 - rank_index as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(digit) = c.to_digit(10) {
                    file += digit as u8;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    // SAFETY: validation bounds every rank at 8 squares
                    let sq = unsafe { Square::from_index_unchecked(rank * 8 + file) };
                    board.pieces[piece.index()].set(sq);
                    file += 1;
                }
            }
        }
        Ok(board)
    }

    /// Mirrors the whole placement vertically, keeping piece colors.
    pub fn flip_vertical(&self) -> Board {
        let mut flipped = Board::empty();
        for index in 0..12 {
            flipped.pieces[index] = self.pieces[index].flip_vertical();
        }
        flipped
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Board({})", self.fen())
    }
}
