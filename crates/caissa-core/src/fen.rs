//! FEN (Forsyth-Edwards Notation) field splitting and validation.

use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid piece placement: {0}")]
    Placement(String),

    #[error("invalid side to move: expected 'w' or 'b', got '{0}'")]
    SideToMove(String),

    #[error("invalid castling rights: {0}")]
    Castling(String),

    #[error("invalid en passant square: {0}")]
    EnPassant(String),

    #[error("invalid halfmove clock: {0}")]
    HalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    FullmoveNumber(String),
}

/// The six fields of a FEN record, split and validated.
///
/// This type holds the raw textual components. The engine converts a
/// `FenFields` into its internal position representation and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenFields {
    /// Piece placement (e.g. "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").
    pub placement: String,
    /// Side to move ('w' or 'b').
    pub side_to_move: char,
    /// Castling availability (e.g. "KQkq", "-").
    pub castling: String,
    /// En passant target square (e.g. "e3", "-").
    pub en_passant: String,
    /// Halfmove clock for the fifty-move rule.
    pub halfmove_clock: u16,
    /// Fullmove number, starting at 1.
    pub fullmove_number: u16,
}

impl FenFields {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str =
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Splits and validates a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();

        if fields.len() != 6 {
            return Err(FenError::FieldCount(fields.len()));
        }

        Self::validate_placement(fields[0])?;

        let side_to_move = match fields[1] {
            "w" => 'w',
            "b" => 'b',
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        Self::validate_castling(fields[2])?;
        Self::validate_en_passant(fields[3], side_to_move)?;

        let halfmove_clock = fields[4]
            .parse::<u16>()
            .map_err(|_| FenError::HalfmoveClock(fields[4].to_string()))?;

        let fullmove_number = fields[5]
            .parse::<u16>()
            .map_err(|_| FenError::FullmoveNumber(fields[5].to_string()))?;

        Ok(FenFields {
            placement: fields[0].to_string(),
            side_to_move,
            castling: fields[2].to_string(),
            en_passant: fields[3].to_string(),
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Validates a piece-placement field without a side-to-move context.
    ///
    /// Exposed so the board-only codec can reuse it.
    pub fn validate_placement(placement: &str) -> Result<(), FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::Placement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (i, rank) in ranks.iter().enumerate() {
            let mut squares = 0u32;
            let mut last_was_digit = false;
            for c in rank.chars() {
                if let Some(d) = c.to_digit(10) {
                    if d == 0 || d > 8 || last_was_digit {
                        return Err(FenError::Placement(format!(
                            "bad empty run in rank {}",
                            8 - i
                        )));
                    }
                    squares += d;
                    last_was_digit = true;
                } else if "pnbrqkPNBRQK".contains(c) {
                    squares += 1;
                    last_was_digit = false;
                } else {
                    return Err(FenError::Placement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        8 - i
                    )));
                }
            }
            if squares != 8 {
                return Err(FenError::Placement(format!(
                    "rank {} has {} squares, expected 8",
                    8 - i,
                    squares
                )));
            }
        }

        Ok(())
    }

    fn validate_castling(castling: &str) -> Result<(), FenError> {
        if castling == "-" {
            return Ok(());
        }
        if castling.is_empty() {
            return Err(FenError::Castling("empty field".to_string()));
        }

        for c in castling.chars() {
            if !"KQkq".contains(c) {
                return Err(FenError::Castling(format!("invalid character '{}'", c)));
            }
        }

        Ok(())
    }

    fn validate_en_passant(ep: &str, side_to_move: char) -> Result<(), FenError> {
        if ep == "-" {
            return Ok(());
        }

        let chars: Vec<char> = ep.chars().collect();
        if chars.len() != 2 || !('a'..='h').contains(&chars[0]) {
            return Err(FenError::EnPassant(ep.to_string()));
        }

        // The target lies behind the pawn that just moved: rank 6 when it
        // is white's turn to capture, rank 3 when it is black's.
        let expected_rank = if side_to_move == 'w' { '6' } else { '3' };
        if chars[1] != expected_rank {
            return Err(FenError::EnPassant(ep.to_string()));
        }

        Ok(())
    }

    /// Reassembles the six fields into a FEN string.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.placement,
            self.side_to_move,
            self.castling,
            self.en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl Default for FenFields {
    fn default() -> Self {
        Self::parse(Self::STARTPOS).expect("STARTPOS is valid")
    }
}
