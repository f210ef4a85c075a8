//! Chess piece representation.

use crate::Color;

/// The six kinds of chess pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    /// All piece kinds in order.
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Returns the index of this piece kind (0-5).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the material value in pawns.
    ///
    /// The king is valued at 900 rather than infinity so that
    /// evaluation sums stay finite and comparable.
    #[inline]
    pub const fn value(self) -> f64 {
        match self {
            PieceKind::Pawn => 1.0,
            PieceKind::Knight => 3.0,
            PieceKind::Bishop => 3.25,
            PieceKind::Rook => 5.0,
            PieceKind::Queen => 9.0,
            PieceKind::King => 900.0,
        }
    }

    /// Returns true if this kind is a sliding piece (bishop, rook, or queen).
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)
    }

    /// Returns true if a pawn may promote to this kind.
    #[inline]
    pub const fn is_valid_promotion(self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }

    /// Returns the SAN letter for this kind ('P' for pawn).
    #[inline]
    pub const fn to_san_char(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    /// Parses an uppercase SAN letter into a piece kind.
    #[inline]
    pub const fn from_san_char(c: char) -> Option<Self> {
        match c {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PieceKind::Pawn => "Pawn",
            PieceKind::Knight => "Knight",
            PieceKind::Bishop => "Bishop",
            PieceKind::Rook => "Rook",
            PieceKind::Queen => "Queen",
            PieceKind::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// A piece: a kind belonging to a color.
///
/// The raw index `kind * 2 + color` (0-11) addresses the twelve
/// per-piece bitboards of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    /// Creates a piece from kind and color.
    #[inline]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Piece { kind, color }
    }

    /// Returns the raw index (0-11) of this piece.
    #[inline]
    pub const fn index(self) -> usize {
        self.kind.index() * 2 + self.color.index()
    }

    /// Creates a piece from a raw index (0-11).
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index >= 12 {
            return None;
        }
        let kind = match index / 2 {
            0 => PieceKind::Pawn,
            1 => PieceKind::Knight,
            2 => PieceKind::Bishop,
            3 => PieceKind::Rook,
            4 => PieceKind::Queen,
            _ => PieceKind::King,
        };
        let color = if index % 2 == 0 {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(kind, color))
    }

    /// Returns the FEN character for this piece (uppercase for white).
    pub const fn to_fen_char(self) -> char {
        let c = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parses a FEN character into a piece.
    pub const fn from_fen_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        Some(Piece::new(kind, color))
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_values() {
        assert_eq!(PieceKind::Pawn.value(), 1.0);
        assert_eq!(PieceKind::Knight.value(), 3.0);
        assert_eq!(PieceKind::Bishop.value(), 3.25);
        assert_eq!(PieceKind::Rook.value(), 5.0);
        assert_eq!(PieceKind::Queen.value(), 9.0);
        assert_eq!(PieceKind::King.value(), 900.0);
    }

    #[test]
    fn is_slider() {
        assert!(!PieceKind::Pawn.is_slider());
        assert!(!PieceKind::Knight.is_slider());
        assert!(PieceKind::Bishop.is_slider());
        assert!(PieceKind::Rook.is_slider());
        assert!(PieceKind::Queen.is_slider());
        assert!(!PieceKind::King.is_slider());
    }

    #[test]
    fn valid_promotions() {
        assert!(!PieceKind::Pawn.is_valid_promotion());
        assert!(PieceKind::Knight.is_valid_promotion());
        assert!(PieceKind::Bishop.is_valid_promotion());
        assert!(PieceKind::Rook.is_valid_promotion());
        assert!(PieceKind::Queen.is_valid_promotion());
        assert!(!PieceKind::King.is_valid_promotion());
    }

    #[test]
    fn raw_index_roundtrip() {
        for kind in PieceKind::ALL {
            for color in [Color::White, Color::Black] {
                let piece = Piece::new(kind, color);
                assert_eq!(Piece::from_index(piece.index()), Some(piece));
            }
        }
        assert_eq!(Piece::from_index(12), None);
    }

    #[test]
    fn raw_index_layout() {
        assert_eq!(Piece::new(PieceKind::Pawn, Color::White).index(), 0);
        assert_eq!(Piece::new(PieceKind::Pawn, Color::Black).index(), 1);
        assert_eq!(Piece::new(PieceKind::King, Color::White).index(), 10);
        assert_eq!(Piece::new(PieceKind::King, Color::Black).index(), 11);
    }

    #[test]
    fn fen_chars() {
        for kind in PieceKind::ALL {
            let white = Piece::new(kind, Color::White);
            let black = Piece::new(kind, Color::Black);
            assert!(white.to_fen_char().is_ascii_uppercase());
            assert!(black.to_fen_char().is_ascii_lowercase());
            assert_eq!(Piece::from_fen_char(white.to_fen_char()), Some(white));
            assert_eq!(Piece::from_fen_char(black.to_fen_char()), Some(black));
        }
        assert_eq!(Piece::from_fen_char('x'), None);
    }

    #[test]
    fn san_chars() {
        assert_eq!(PieceKind::Knight.to_san_char(), 'N');
        assert_eq!(PieceKind::from_san_char('Q'), Some(PieceKind::Queen));
        assert_eq!(PieceKind::from_san_char('q'), None);
        assert_eq!(PieceKind::from_san_char('X'), None);
    }
}
