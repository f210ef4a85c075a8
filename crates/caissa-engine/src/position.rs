//! Chess position representation and reversible move application.

use crate::game::GameError;
use crate::Board;
use caissa_core::{CastleSide, Color, FenError, FenFields, Move, Piece, PieceKind, Square};

/// Castling rights flags, packed into a nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    const WHITE_KINGSIDE: u8 = 0b0001;
    const WHITE_QUEENSIDE: u8 = 0b0010;
    const BLACK_KINGSIDE: u8 = 0b0100;
    const BLACK_QUEENSIDE: u8 = 0b1000;

    #[inline]
    const fn flag(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::King) => Self::WHITE_KINGSIDE,
            (Color::White, CastleSide::Queen) => Self::WHITE_QUEENSIDE,
            (Color::Black, CastleSide::King) => Self::BLACK_KINGSIDE,
            (Color::Black, CastleSide::Queen) => Self::BLACK_QUEENSIDE,
        }
    }

    /// Returns true if the given side may still castle on the given wing.
    #[inline]
    pub const fn allows(self, color: Color, side: CastleSide) -> bool {
        (self.0 & Self::flag(color, side)) != 0
    }

    /// Grants the given right.
    #[inline]
    pub fn grant(&mut self, color: Color, side: CastleSide) {
        self.0 |= Self::flag(color, side);
    }

    /// Removes both rights of a color.
    #[inline]
    pub fn discard_color(&mut self, color: Color) {
        self.0 &= !(Self::flag(color, CastleSide::King) | Self::flag(color, CastleSide::Queen));
    }

    /// Removes the right tied to a corner square, if `sq` is one.
    ///
    /// Called for both ends of every move: a rook leaving its corner and
    /// any piece landing on a corner each void the corresponding right.
    #[inline]
    pub fn discard_for_corner(&mut self, sq: Square) {
        let flag = match sq {
            Square::H1 => Self::WHITE_KINGSIDE,
            Square::A1 => Self::WHITE_QUEENSIDE,
            Square::H8 => Self::BLACK_KINGSIDE,
            Square::A8 => Self::BLACK_QUEENSIDE,
            _ => return,
        };
        self.0 &= !flag;
    }

    /// Returns true if no rights remain.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Serialises into the FEN castling field ("KQkq" subset or "-").
    pub fn to_fen(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        let mut fen = String::new();
        if self.allows(Color::White, CastleSide::King) {
            fen.push('K');
        }
        if self.allows(Color::White, CastleSide::Queen) {
            fen.push('Q');
        }
        if self.allows(Color::Black, CastleSide::King) {
            fen.push('k');
        }
        if self.allows(Color::Black, CastleSide::Queen) {
            fen.push('q');
        }
        fen
    }

    /// Parses the FEN castling field.
    pub fn from_fen(field: &str) -> Result<Self, FenError> {
        if field == "-" {
            return Ok(Self::NONE);
        }
        let mut rights = Self::NONE;
        for c in field.chars() {
            match c {
                'K' => rights.grant(Color::White, CastleSide::King),
                'Q' => rights.grant(Color::White, CastleSide::Queen),
                'k' => rights.grant(Color::Black, CastleSide::King),
                'q' => rights.grant(Color::Black, CastleSide::Queen),
                _ => return Err(FenError::Castling(field.to_string())),
            }
        }
        Ok(rights)
    }
}

/// The rook's corner and destination for a castling move.
pub(crate) fn castle_rook_squares(color: Color, side: CastleSide) -> (Square, Square) {
    match (color, side) {
        (Color::White, CastleSide::King) => (Square::H1, Square::F1),
        (Color::White, CastleSide::Queen) => (Square::A1, Square::D1),
        (Color::Black, CastleSide::King) => (Square::H8, Square::F8),
        (Color::Black, CastleSide::Queen) => (Square::A8, Square::D8),
    }
}

/// Everything needed to roll one executed half-move back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRecord {
    /// The executed move.
    pub mv: Move,
    /// The kind of the piece that moved.
    pub moved: PieceKind,
    /// The captured piece and the square it stood on. For en passant
    /// this is not the move's destination.
    pub captured: Option<(Piece, Square)>,
    /// The promotion chosen, if the move promoted.
    pub promotion: Option<PieceKind>,
    /// Castling rights before the move.
    pub castling: CastlingRights,
    /// En passant target before the move.
    pub en_passant: Option<Square>,
    /// Halfmove clock before the move.
    pub halfmove_clock: u16,
    /// Fullmove number before the move.
    pub fullmove_number: u16,
}

/// Complete game state for one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Piece placement.
    pub board: Board,
    /// The side to move.
    pub turn: Color,
    /// Castling rights.
    pub castling: CastlingRights,
    /// En passant target square, if any.
    pub en_passant: Option<Square>,
    /// Halfmove clock for the fifty-move rule.
    pub halfmove_clock: u16,
    /// Fullmove number (starts at 1, increments after Black's move).
    pub fullmove_number: u16,
}

impl Position {
    /// Creates an empty position.
    pub const fn empty() -> Self {
        Position {
            board: Board::empty(),
            turn: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(FenFields::STARTPOS).expect("STARTPOS is valid")
    }

    /// Creates a position from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields = FenFields::parse(fen)?;

        let board = Board::from_fen(&fields.placement)?;
        let turn = match fields.side_to_move {
            'w' => Color::White,
            _ => Color::Black,
        };
        let castling = CastlingRights::from_fen(&fields.castling)?;
        let en_passant = if fields.en_passant == "-" {
            None
        } else {
            Square::from_algebraic(&fields.en_passant)
        };

        Ok(Position {
            board,
            turn,
            castling,
            en_passant,
            halfmove_clock: fields.halfmove_clock,
            fullmove_number: fields.fullmove_number,
        })
    }

    /// Serialises the position into a FEN string.
    pub fn to_fen(&self) -> String {
        let en_passant = match self.en_passant {
            Some(sq) => sq.to_algebraic(),
            None => "-".to_string(),
        };
        format!(
            "{} {} {} {} {} {}",
            self.board.fen(),
            match self.turn {
                Color::White => 'w',
                Color::Black => 'b',
            },
            self.castling.to_fen(),
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Applies a move in place, returning the record needed to revert it.
    ///
    /// The move must be pseudolegal for the side to move; legality
    /// (leaving one's own king safe) is the caller's concern. Promotion
    /// prerequisites are validated here: a pawn reaching its end rank
    /// without a choice fails, and a choice of pawn or king fails.
    pub fn apply(
        &mut self,
        mv: Move,
        promotion: Option<PieceKind>,
    ) -> Result<HistoryRecord, GameError> {
        let piece = self
            .board
            .piece_at(mv.start)
            .ok_or(GameError::IllegalMove(mv))?;
        let us = self.turn;

        let promotion = if piece.kind == PieceKind::Pawn && mv.end.rank() == us.end_rank() {
            match promotion {
                None => return Err(GameError::PromotionRequired),
                Some(kind) if !kind.is_valid_promotion() => {
                    return Err(GameError::InvalidPromotion(kind))
                }
                Some(kind) => Some(kind),
            }
        } else {
            None
        };

        let captured = if let Some(target) = self.board.piece_at(mv.end) {
            Some((target, mv.end))
        } else if piece.kind == PieceKind::Pawn
            && self.en_passant == Some(mv.end)
            && mv.file_change() != 0
        {
            // the captured pawn stands beside the start square, not on
            // the destination
            let sq = Square::new(mv.end.file(), mv.start.rank());
            self.board.piece_at(sq).map(|p| (p, sq))
        } else {
            None
        };

        let record = HistoryRecord {
            mv,
            moved: piece.kind,
            captured,
            promotion,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        };

        self.board.remove(mv.start);
        if let Some((_, sq)) = captured {
            self.board.remove(sq);
        }
        self.board
            .set(mv.end, Piece::new(promotion.unwrap_or(piece.kind), us));

        if piece.kind == PieceKind::King {
            if let Some(side) = mv.castle_side() {
                let (corner, target) = castle_rook_squares(us, side);
                if let Some(rook) = self.board.remove(corner) {
                    self.board.set(target, rook);
                }
            }
            self.castling.discard_color(us);
        }
        if piece.kind == PieceKind::Rook {
            self.castling.discard_for_corner(mv.start);
        }
        self.castling.discard_for_corner(mv.end);

        self.en_passant = if piece.kind == PieceKind::Pawn && mv.rank_change().abs() == 2 {
            mv.start.offset(0, us.pawn_direction())
        } else {
            None
        };

        if piece.kind == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }
        self.turn = us.opposite();

        Ok(record)
    }

    /// Reverts the most recent [`apply`](Self::apply) using its record.
    pub fn revert(&mut self, record: &HistoryRecord) {
        let us = self.turn.opposite();

        self.board.remove(record.mv.end);
        self.board.set(record.mv.start, Piece::new(record.moved, us));
        if let Some((captured, sq)) = record.captured {
            self.board.set(sq, captured);
        }
        if record.moved == PieceKind::King {
            if let Some(side) = record.mv.castle_side() {
                let (corner, target) = castle_rook_squares(us, side);
                if let Some(rook) = self.board.remove(target) {
                    self.board.set(corner, rook);
                }
            }
        }

        self.castling = record.castling;
        self.en_passant = record.en_passant;
        self.halfmove_clock = record.halfmove_clock;
        self.fullmove_number = record.fullmove_number;
        self.turn = us;
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}
