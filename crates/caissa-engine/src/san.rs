//! Algebraic notation parsing and generation.
//!
//! The parser accepts short algebraic ("Nf3", "exd5", "Nbd2", "e8=Q"),
//! long algebraic ("e2e4", "e2-e4", "Ng1xf3"), both castling spellings
//! ("O-O", "0-0"), promotion with or without "=", and crazyhouse-style
//! drop tokens ("N@f3"), which tokenise but never resolve in standard
//! chess. Resolution is context-sensitive: the token is matched against
//! the legal moves of a position.

use crate::movegen::legal_moves;
use crate::Position;
use caissa_core::{CastleSide, File, Move, PieceKind, Rank, Square};
use std::fmt;

/// Error type for move-token parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanError {
    /// The token is empty.
    Empty,
    /// The token has invalid format.
    InvalidFormat(String),
    /// No legal move matches the token.
    NoMatchingMove(String),
    /// Multiple legal moves match the token.
    AmbiguousMove(String),
}

impl fmt::Display for SanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanError::Empty => write!(f, "empty move token"),
            SanError::InvalidFormat(s) => write!(f, "invalid move format: {}", s),
            SanError::NoMatchingMove(s) => write!(f, "no legal move matches: {}", s),
            SanError::AmbiguousMove(s) => write!(f, "ambiguous move: {}", s),
        }
    }
}

impl std::error::Error for SanError {}

/// Parses a move token against a position.
///
/// Returns the resolved move together with the promotion choice the
/// token carried, if any. Exactly one legal move must survive
/// resolution; zero or several fail with the original token.
pub fn parse_move(position: &Position, token: &str) -> Result<(Move, Option<PieceKind>), SanError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(SanError::Empty);
    }

    // strip "!?" annotations, then mate and check marks
    let stripped = token
        .trim_end_matches(['!', '?'])
        .trim_end_matches('#')
        .trim_end_matches('+');
    if stripped.is_empty() {
        return Err(SanError::InvalidFormat(token.to_string()));
    }

    match stripped {
        "O-O" | "0-0" => return castling_move(position, CastleSide::King, token),
        "O-O-O" | "0-0-0" => return castling_move(position, CastleSide::Queen, token),
        _ => {}
    }

    // drop notation: parsed for variant PGNs, never resolvable here
    if stripped.contains('@') {
        return match parse_drop(stripped) {
            Ok(()) => Err(SanError::NoMatchingMove(token.to_string())),
            Err(()) => Err(SanError::InvalidFormat(token.to_string())),
        };
    }

    let parsed = parse_components(stripped).map_err(|()| {
        SanError::InvalidFormat(token.to_string())
    })?;
    resolve(position, &parsed, token)
}

struct ParsedToken {
    kind: PieceKind,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    end: Square,
    promotion: Option<PieceKind>,
}

fn parse_drop(s: &str) -> Result<(), ()> {
    let (piece, square) = s.split_once('@').ok_or(())?;
    match piece {
        "" => {}
        _ => {
            let mut chars = piece.chars();
            let c = chars.next().ok_or(())?;
            if chars.next().is_some() || PieceKind::from_san_char(c).is_none() {
                return Err(());
            }
        }
    }
    Square::from_algebraic(square).map(|_| ()).ok_or(())
}

fn parse_components(s: &str) -> Result<ParsedToken, ()> {
    let mut chars: Vec<char> = s.chars().collect();

    // leading piece letter; pawn moves start with a file
    let kind = match chars.first() {
        Some(&c) if c.is_ascii_uppercase() => {
            let kind = PieceKind::from_san_char(c).ok_or(())?;
            chars.remove(0);
            kind
        }
        _ => PieceKind::Pawn,
    };

    // trailing promotion letter, with or without '='
    let promotion = match chars.last() {
        Some(&c) if c.is_ascii_uppercase() => {
            let kind = PieceKind::from_san_char(c).ok_or(())?;
            chars.pop();
            if chars.last() == Some(&'=') {
                chars.pop();
            }
            Some(kind)
        }
        _ => None,
    };

    // capture and long-algebraic separators carry no information the
    // resolution step needs
    chars.retain(|&c| c != 'x' && c != '-');

    if chars.len() < 2 {
        return Err(());
    }
    let rank_char = chars.pop().expect("length checked");
    let file_char = chars.pop().expect("length checked");
    let end = Square::new(
        File::from_char(file_char).ok_or(())?,
        Rank::from_char(rank_char).ok_or(())?,
    );

    let (from_file, from_rank) = match chars.len() {
        0 => (None, None),
        1 => {
            if let Some(f) = File::from_char(chars[0]) {
                (Some(f), None)
            } else if let Some(r) = Rank::from_char(chars[0]) {
                (None, Some(r))
            } else {
                return Err(());
            }
        }
        2 => (
            Some(File::from_char(chars[0]).ok_or(())?),
            Some(Rank::from_char(chars[1]).ok_or(())?),
        ),
        _ => return Err(()),
    };

    Ok(ParsedToken {
        kind,
        from_file,
        from_rank,
        end,
        promotion,
    })
}

fn castling_move(
    position: &Position,
    side: CastleSide,
    token: &str,
) -> Result<(Move, Option<PieceKind>), SanError> {
    for m in &legal_moves(position) {
        let is_king = position
            .board
            .piece_at(m.start)
            .is_some_and(|p| p.kind == PieceKind::King);
        if is_king && m.castle_side() == Some(side) {
            return Ok((*m, None));
        }
    }
    Err(SanError::NoMatchingMove(token.to_string()))
}

fn resolve(
    position: &Position,
    parsed: &ParsedToken,
    token: &str,
) -> Result<(Move, Option<PieceKind>), SanError> {
    let mut matching: Option<Move> = None;

    for m in &legal_moves(position) {
        if m.end != parsed.end {
            continue;
        }
        let Some(piece) = position.board.piece_at(m.start) else {
            continue;
        };
        if piece.kind != parsed.kind {
            continue;
        }
        if parsed.from_file.is_some_and(|f| m.start.file() != f) {
            continue;
        }
        if parsed.from_rank.is_some_and(|r| m.start.rank() != r) {
            continue;
        }

        if matching.is_some() {
            return Err(SanError::AmbiguousMove(token.to_string()));
        }
        matching = Some(*m);
    }

    match matching {
        Some(m) => Ok((m, parsed.promotion)),
        None => Err(SanError::NoMatchingMove(token.to_string())),
    }
}

/// Writes a move as SAN for the given position.
///
/// The position must be the state before the move, and the move must be
/// legal in it. The promotion choice is appended as "=X" when given.
pub fn move_to_san(position: &Position, mv: Move, promotion: Option<PieceKind>) -> String {
    let piece = position
        .board
        .piece_at(mv.start)
        .expect("move has a piece on its start square");

    let mut san = String::new();

    if piece.kind == PieceKind::King && mv.castle_side().is_some() {
        san.push_str(match mv.castle_side() {
            Some(CastleSide::King) => "O-O",
            _ => "O-O-O",
        });
        return add_check_suffix(position, mv, promotion, san);
    }

    if piece.kind != PieceKind::Pawn {
        san.push(piece.kind.to_san_char());
        san.push_str(&disambiguation(position, mv, piece.kind));
    }

    // a legal diagonal pawn move is always a capture, en passant included
    let is_capture =
        position.board.piece_at(mv.end).is_some() || (piece.kind == PieceKind::Pawn && mv.file_change() != 0);
    if is_capture {
        if piece.kind == PieceKind::Pawn {
            san.push(mv.start.file().to_char());
        }
        san.push('x');
    }

    san.push_str(&mv.end.to_algebraic());

    if let Some(kind) = promotion {
        san.push('=');
        san.push(kind.to_san_char());
    }

    add_check_suffix(position, mv, promotion, san)
}

fn disambiguation(position: &Position, mv: Move, kind: PieceKind) -> String {
    let mut rivals: Vec<Move> = Vec::new();
    for other in &legal_moves(position) {
        if other.end != mv.end || other.start == mv.start {
            continue;
        }
        if position
            .board
            .piece_at(other.start)
            .is_some_and(|p| p.kind == kind)
        {
            rivals.push(*other);
        }
    }

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|o| o.start.file() != mv.start.file()) {
        return mv.start.file().to_char().to_string();
    }
    if rivals.iter().all(|o| o.start.rank() != mv.start.rank()) {
        return mv.start.rank().to_char().to_string();
    }
    mv.start.to_algebraic()
}

fn add_check_suffix(
    position: &Position,
    mv: Move,
    promotion: Option<PieceKind>,
    mut san: String,
) -> String {
    let mut next = position.clone();
    if next.apply(mv, promotion.or(Some(PieceKind::Queen))).is_err() {
        return san;
    }
    if next.board.in_check(next.turn) {
        if legal_moves(&next).is_empty() {
            san.push('#');
        } else {
            san.push('+');
        }
    }
    san
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(s: &str) -> Move {
        Move::from_coordinates(s).unwrap()
    }

    fn parse(fen: &str, token: &str) -> Result<(Move, Option<PieceKind>), SanError> {
        parse_move(&Position::from_fen(fen).unwrap(), token)
    }

    #[test]
    fn parse_pawn_push() {
        let pos = Position::startpos();
        let (m, promo) = parse_move(&pos, "e4").unwrap();
        assert_eq!(m, mv("e2e4"));
        assert_eq!(promo, None);
    }

    #[test]
    fn parse_knight_move() {
        let pos = Position::startpos();
        let (m, _) = parse_move(&pos, "Nf3").unwrap();
        assert_eq!(m, mv("g1f3"));
    }

    #[test]
    fn parse_long_algebraic() {
        let pos = Position::startpos();
        assert_eq!(parse_move(&pos, "e2e4").unwrap().0, mv("e2e4"));
        assert_eq!(parse_move(&pos, "e2-e4").unwrap().0, mv("e2e4"));
        assert_eq!(parse_move(&pos, "Ng1f3").unwrap().0, mv("g1f3"));
        assert_eq!(parse_move(&pos, "Ng1-f3").unwrap().0, mv("g1f3"));
    }

    #[test]
    fn parse_capture() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
        assert_eq!(parse(fen, "exd5").unwrap().0, mv("e4d5"));
        assert_eq!(parse(fen, "e4xd5").unwrap().0, mv("e4d5"));
    }

    #[test]
    fn parse_castling_both_spellings() {
        let fen = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
        assert_eq!(parse(fen, "O-O").unwrap().0, mv("e1g1"));
        assert_eq!(parse(fen, "0-0").unwrap().0, mv("e1g1"));
        assert_eq!(parse(fen, "O-O-O").unwrap().0, mv("e1c1"));
        assert_eq!(parse(fen, "0-0-0").unwrap().0, mv("e1c1"));
    }

    #[test]
    fn parse_castling_unavailable() {
        let pos = Position::startpos();
        assert!(matches!(
            parse_move(&pos, "O-O"),
            Err(SanError::NoMatchingMove(_))
        ));
    }

    #[test]
    fn parse_promotion_forms() {
        let fen = "7k/P7/8/8/8/8/8/7K w - - 0 1";
        let (m, promo) = parse(fen, "a8=Q").unwrap();
        assert_eq!(m, mv("a7a8"));
        assert_eq!(promo, Some(PieceKind::Queen));

        let (_, promo) = parse(fen, "a8N").unwrap();
        assert_eq!(promo, Some(PieceKind::Knight));

        // a bare pawn promotion token resolves with no choice attached
        let (m, promo) = parse(fen, "a8").unwrap();
        assert_eq!(m, mv("a7a8"));
        assert_eq!(promo, None);
    }

    #[test]
    fn parse_disambiguation() {
        // two knights can reach d2
        let fen = "4k3/8/8/8/8/8/8/1N1K1N2 w - - 0 1";
        assert_eq!(parse(fen, "Nbd2").unwrap().0, mv("b1d2"));
        assert_eq!(parse(fen, "Nfd2").unwrap().0, mv("f1d2"));
        assert!(matches!(
            parse(fen, "Nd2"),
            Err(SanError::AmbiguousMove(_))
        ));

        // rank disambiguation
        let fen = "4k3/8/8/8/R7/8/8/R3K3 w - - 0 1";
        assert_eq!(parse(fen, "R1a3").unwrap().0, mv("a1a3"));
        assert_eq!(parse(fen, "R4a3").unwrap().0, mv("a4a3"));

        // full-square disambiguation always works
        assert_eq!(parse(fen, "Ra1a3").unwrap().0, mv("a1a3"));
    }

    #[test]
    fn parse_strips_annotations() {
        let pos = Position::startpos();
        for token in ["e4!", "e4?", "e4!!", "e4??", "e4!?", "e4?!"] {
            assert_eq!(parse_move(&pos, token).unwrap().0, mv("e2e4"));
        }
        let fen = "8/8/8/8/8/8/8/4K1Qk w - - 0 1";
        assert_eq!(parse(fen, "Qh2+").unwrap().0, mv("g1h2"));
        assert_eq!(parse(fen, "Qh2+!").unwrap().0, mv("g1h2"));
    }

    #[test]
    fn parse_drop_tokens() {
        let pos = Position::startpos();
        // well-formed drops never resolve in standard chess
        assert!(matches!(
            parse_move(&pos, "N@f3"),
            Err(SanError::NoMatchingMove(_))
        ));
        assert!(matches!(
            parse_move(&pos, "@e4"),
            Err(SanError::NoMatchingMove(_))
        ));
        // malformed drops are format errors
        assert!(matches!(
            parse_move(&pos, "N@z9"),
            Err(SanError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_move(&pos, "NN@f3"),
            Err(SanError::InvalidFormat(_))
        ));
    }

    #[test]
    fn parse_rejects_garbage() {
        let pos = Position::startpos();
        assert!(matches!(parse_move(&pos, ""), Err(SanError::Empty)));
        assert!(matches!(
            parse_move(&pos, "xyzzy"),
            Err(SanError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_move(&pos, "Ke4"),
            Err(SanError::NoMatchingMove(_))
        ));
        assert!(matches!(
            parse_move(&pos, "e5"),
            Err(SanError::NoMatchingMove(_))
        ));
    }

    #[test]
    fn write_pawn_and_piece_moves() {
        let pos = Position::startpos();
        assert_eq!(move_to_san(&pos, mv("e2e4"), None), "e4");
        assert_eq!(move_to_san(&pos, mv("g1f3"), None), "Nf3");
    }

    #[test]
    fn write_captures() {
        let pos = Position::from_fen(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
        )
        .unwrap();
        assert_eq!(move_to_san(&pos, mv("e4d5"), None), "exd5");
    }

    #[test]
    fn write_en_passant_as_capture() {
        let pos = Position::from_fen(
            "rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 3",
        )
        .unwrap();
        assert_eq!(move_to_san(&pos, mv("f5e6"), None), "fxe6");
    }

    #[test]
    fn write_castling() {
        let pos =
            Position::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(move_to_san(&pos, mv("e1g1"), None), "O-O");
        assert_eq!(move_to_san(&pos, mv("e1c1"), None), "O-O-O");
    }

    #[test]
    fn write_promotion() {
        let pos = Position::from_fen("8/P7/8/8/8/8/8/4K1k1 w - - 0 1").unwrap();
        assert_eq!(
            move_to_san(&pos, mv("a7a8"), Some(PieceKind::Queen)),
            "a8=Q"
        );
        assert_eq!(
            move_to_san(&pos, mv("a7a8"), Some(PieceKind::Knight)),
            "a8=N"
        );
    }

    #[test]
    fn write_check_and_mate_suffixes() {
        let pos = Position::from_fen("8/8/8/8/8/8/8/4K1Qk w - - 0 1").unwrap();
        assert_eq!(move_to_san(&pos, mv("g1h2"), None), "Qh2+");

        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        assert_eq!(move_to_san(&pos, mv("a1a8"), None), "Ra8#");
    }

    #[test]
    fn write_disambiguation() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/1N1K1N2 w - - 0 1").unwrap();
        assert_eq!(move_to_san(&pos, mv("b1d2"), None), "Nbd2");

        let pos = Position::from_fen("4k3/8/8/8/R7/8/8/R3K3 w - - 0 1").unwrap();
        assert_eq!(move_to_san(&pos, mv("a1a3"), None), "R1a3");
    }

    #[test]
    fn roundtrip_startpos_moves() {
        let pos = Position::startpos();
        for m in &legal_moves(&pos) {
            let san = move_to_san(&pos, *m, None);
            let (parsed, promo) = parse_move(&pos, &san).unwrap();
            assert_eq!(parsed, *m, "roundtrip failed for {}", san);
            assert_eq!(promo, None);
        }
    }
}
