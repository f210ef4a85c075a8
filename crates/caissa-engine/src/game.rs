//! Full game management with undo and redo.
//!
//! [`Game`] owns a [`Position`] and two stacks of [`HistoryRecord`]s.
//! Executed moves push onto the undo stack and clear the redo stack;
//! undoing moves a record across to the redo stack. Checkmate,
//! stalemate, and insufficient material end the game automatically;
//! the fifty-move rule and threefold repetition are claimable through
//! [`Game::claim_draw`].

use crate::movegen::{legal_moves, legal_moves_from, MoveList};
use crate::position::HistoryRecord;
use crate::{Board, CastlingRights, Position};
use caissa_core::{Color, FenError, Move, Piece, PieceKind};
use thiserror::Error;

/// Errors from game operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// The move is not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(Move),
    /// A promotion move was executed without a piece choice.
    #[error("promotion requires a piece choice")]
    PromotionRequired,
    /// The chosen promotion kind cannot promote.
    #[error("cannot promote to a {0}")]
    InvalidPromotion(PieceKind),
    /// The undo stack is empty.
    #[error("no move to undo")]
    NoMoveToUndo,
    /// The redo stack is empty.
    #[error("no move to redo")]
    NoMoveToRedo,
    /// The game has already ended.
    #[error("the game is already over")]
    GameOver,
    /// Neither draw-claim condition is met.
    #[error("draw conditions are not met")]
    CannotClaimDraw,
}

/// Supported game variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Standard chess.
    #[default]
    Standard,
    /// Standard placement mirrored vertically: each side starts on the
    /// opponent's home ranks. Castling rights are void because kings
    /// and rooks are off their castling squares.
    UpsideDown,
}

impl Variant {
    /// Returns the initial position for this variant.
    pub fn initial_position(self) -> Position {
        match self {
            Variant::Standard => Position::startpos(),
            Variant::UpsideDown => {
                let mut position = Position::startpos();
                position.board = position.board.flip_vertical();
                position.castling = CastlingRights::NONE;
                position
            }
        }
    }
}

/// Whether a seat is played by a human or a computer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerKind {
    #[default]
    Human,
    Computer,
}

/// One of the two players.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Player {
    pub name: Option<String>,
    pub kind: PlayerKind,
}

/// The two seats of a game.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Players {
    pub white: Player,
    pub black: Player,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The side to move has no legal moves and is in check.
    Checkmate { winner: Color },
    /// The side to move has no legal moves and is not in check.
    Stalemate,
    /// Neither side can ever deliver mate.
    InsufficientMaterial,
    /// Fifty moves without a capture or pawn move, claimed.
    FiftyMoveRule,
    /// The same position occurred three times, claimed.
    ThreefoldRepetition,
    /// A player resigned.
    Resignation { winner: Color },
}

impl Outcome {
    /// Returns the winning color, or `None` for a draw.
    pub fn winner(self) -> Option<Color> {
        match self {
            Outcome::Checkmate { winner } | Outcome::Resignation { winner } => Some(winner),
            _ => None,
        }
    }

    /// Returns true if the game is drawn.
    pub fn is_draw(self) -> bool {
        self.winner().is_none()
    }
}

/// A chess game: a position plus the history around it.
#[derive(Debug, Clone)]
pub struct Game {
    initial_position: Position,
    position: Position,
    undo_stack: Vec<HistoryRecord>,
    redo_stack: Vec<HistoryRecord>,
    /// Position hashes since the initial position, for repetition counts.
    hash_history: Vec<u64>,
    variant: Variant,
    players: Players,
    outcome: Option<Outcome>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new standard game.
    pub fn new() -> Self {
        Self::with_variant(Variant::Standard)
    }

    /// Creates a new game of the given variant.
    pub fn with_variant(variant: Variant) -> Self {
        let mut game = Self::from_position(variant.initial_position());
        game.variant = variant;
        game
    }

    /// Creates a game from a custom starting position.
    pub fn from_position(position: Position) -> Self {
        let hash = position.zobrist_hash();
        let mut game = Game {
            initial_position: position.clone(),
            position,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            hash_history: vec![hash],
            variant: Variant::Standard,
            players: Players::default(),
            outcome: None,
        };
        game.update_outcome();
        game
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// Returns the current position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns the position the game started from.
    pub fn initial_position(&self) -> &Position {
        &self.initial_position
    }

    /// Returns the game variant.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Returns the players.
    pub fn players(&self) -> &Players {
        &self.players
    }

    /// Replaces the players.
    pub fn set_players(&mut self, players: Players) {
        self.players = players;
    }

    /// Returns the executed moves, oldest first.
    pub fn history(&self) -> &[HistoryRecord] {
        &self.undo_stack
    }

    /// Returns the number of half-moves played.
    pub fn ply_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns all legal moves for the side to move.
    pub fn available_moves(&self) -> MoveList {
        legal_moves(&self.position)
    }

    /// Returns all legal moves starting from the given square.
    pub fn moves_from(&self, start: caissa_core::Square) -> MoveList {
        legal_moves_from(&self.position, start)
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.position.board.in_check(self.position.turn)
    }

    /// Returns the terminal outcome, if the game has ended.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Returns true if the game has ended.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Returns true if the move would promote a pawn and therefore
    /// needs a promotion choice to execute.
    pub fn is_promotion(&self, mv: Move) -> bool {
        matches!(
            self.position.board.piece_at(mv.start),
            Some(Piece {
                kind: PieceKind::Pawn,
                color,
            }) if mv.end.rank() == color.end_rank()
        )
    }

    /// Executes a move. Fails with [`GameError::PromotionRequired`] if
    /// the move promotes.
    pub fn execute(&mut self, mv: Move) -> Result<(), GameError> {
        self.execute_checked(mv, None)
    }

    /// Executes a move with a promotion choice, which is ignored unless
    /// the move promotes.
    pub fn execute_with_promotion(
        &mut self,
        mv: Move,
        promotion: PieceKind,
    ) -> Result<(), GameError> {
        self.execute_checked(mv, Some(promotion))
    }

    /// Executes a move, invoking the closure for a promotion choice iff
    /// the move promotes.
    pub fn execute_with<F>(&mut self, mv: Move, choose: F) -> Result<(), GameError>
    where
        F: FnOnce() -> PieceKind,
    {
        let promotion = if self.is_promotion(mv) {
            Some(choose())
        } else {
            None
        };
        self.execute_checked(mv, promotion)
    }

    fn execute_checked(&mut self, mv: Move, promotion: Option<PieceKind>) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        if !self.available_moves().contains(mv) {
            return Err(GameError::IllegalMove(mv));
        }
        let record = self.position.apply(mv, promotion)?;
        self.push_record(record);
        self.update_outcome();
        Ok(())
    }

    /// Executes a move without the legality filter.
    ///
    /// The move must be in the legal move set; applying any other move
    /// leaves the game in an unspecified state. Terminal status is not
    /// re-evaluated, so this is cheap enough for the search to drive
    /// make/unmake with; the search detects terminal nodes from the
    /// empty move list instead.
    pub fn execute_unchecked(
        &mut self,
        mv: Move,
        promotion: Option<PieceKind>,
    ) -> Result<(), GameError> {
        let record = self.position.apply(mv, promotion)?;
        self.push_record(record);
        Ok(())
    }

    fn push_record(&mut self, record: HistoryRecord) {
        self.undo_stack.push(record);
        self.redo_stack.clear();
        self.hash_history.push(self.position.zobrist_hash());
    }

    /// Takes back the last move and returns it. The move becomes
    /// available to [`redo`](Self::redo).
    pub fn undo(&mut self) -> Result<Move, GameError> {
        let record = self.undo_stack.pop().ok_or(GameError::NoMoveToUndo)?;
        self.position.revert(&record);
        self.hash_history.pop();
        self.redo_stack.push(record);
        // the position before any move was never terminal by rule;
        // claimed and resigned outcomes are withdrawn as well
        self.outcome = None;
        Ok(record.mv)
    }

    /// Replays the last undone move and returns it.
    pub fn redo(&mut self) -> Result<Move, GameError> {
        let record = self.redo_stack.pop().ok_or(GameError::NoMoveToRedo)?;
        let replayed = self
            .position
            .apply(record.mv, record.promotion)
            .expect("redo record replays");
        self.undo_stack.push(replayed);
        self.hash_history.push(self.position.zobrist_hash());
        self.update_outcome();
        Ok(record.mv)
    }

    /// Resigns the game for the side to move.
    pub fn resign(&mut self) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        self.outcome = Some(Outcome::Resignation {
            winner: self.position.turn.opposite(),
        });
        Ok(())
    }

    /// Counts how often the current position has occurred, including now.
    pub fn repetition_count(&self) -> usize {
        let current = match self.hash_history.last() {
            Some(&hash) => hash,
            None => return 0,
        };
        self.hash_history.iter().filter(|&&h| h == current).count()
    }

    /// Returns true if a draw can be claimed right now.
    pub fn can_claim_draw(&self) -> bool {
        !self.is_finished()
            && (self.repetition_count() >= 3 || self.position.halfmove_clock >= 100)
    }

    /// Claims a draw by threefold repetition or the fifty-move rule.
    pub fn claim_draw(&mut self) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        if self.repetition_count() >= 3 {
            self.outcome = Some(Outcome::ThreefoldRepetition);
            return Ok(());
        }
        if self.position.halfmove_clock >= 100 {
            self.outcome = Some(Outcome::FiftyMoveRule);
            return Ok(());
        }
        Err(GameError::CannotClaimDraw)
    }

    fn update_outcome(&mut self) {
        if insufficient_material(&self.position.board) {
            self.outcome = Some(Outcome::InsufficientMaterial);
            return;
        }

        if self.available_moves().is_empty() {
            self.outcome = Some(if self.is_check() {
                Outcome::Checkmate {
                    winner: self.position.turn.opposite(),
                }
            } else {
                Outcome::Stalemate
            });
        } else {
            self.outcome = None;
        }
    }
}

/// True when neither side can ever deliver mate: K vs K, K+B vs K,
/// K+N vs K, or K+B vs K+B with both bishops on the same square color.
fn insufficient_material(board: &Board) -> bool {
    use crate::Bitboard;

    for color in [Color::White, Color::Black] {
        let heavy = board.count(Piece::new(PieceKind::Pawn, color))
            + board.count(Piece::new(PieceKind::Rook, color))
            + board.count(Piece::new(PieceKind::Queen, color));
        if heavy > 0 {
            return false;
        }
    }

    let white_knights = board.count(Piece::new(PieceKind::Knight, Color::White));
    let black_knights = board.count(Piece::new(PieceKind::Knight, Color::Black));
    let white_bishops = board.squares(Piece::new(PieceKind::Bishop, Color::White));
    let black_bishops = board.squares(Piece::new(PieceKind::Bishop, Color::Black));
    let minors = white_knights
        + black_knights
        + white_bishops.count()
        + black_bishops.count();

    match minors {
        // K vs K
        0 => true,
        // K+B vs K or K+N vs K
        1 => true,
        // K+B vs K+B with both bishops on the same square color
        2 if white_bishops.count() == 1 && black_bishops.count() == 1 => {
            let white_on_light = (white_bishops & Bitboard::LIGHT_SQUARES).is_not_empty();
            let black_on_light = (black_bishops & Bitboard::LIGHT_SQUARES).is_not_empty();
            white_on_light == black_on_light
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caissa_core::Square;

    fn mv(s: &str) -> Move {
        Move::from_coordinates(s).unwrap()
    }

    #[test]
    fn new_game() {
        let game = Game::new();
        assert_eq!(game.ply_count(), 0);
        assert!(!game.is_finished());
        assert!(!game.is_check());
        assert_eq!(game.variant(), Variant::Standard);
        assert_eq!(game.position(), game.initial_position());
    }

    #[test]
    fn execute_and_reject() {
        let mut game = Game::new();
        game.execute(mv("e2e4")).unwrap();
        assert_eq!(game.ply_count(), 1);

        assert_eq!(
            game.execute(mv("e2e4")),
            Err(GameError::IllegalMove(mv("e2e4")))
        );
        assert_eq!(
            game.execute(mv("d7d3")),
            Err(GameError::IllegalMove(mv("d7d3")))
        );
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut game = Game::new();
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.execute(mv(m)).unwrap();
        }
        assert!(game.is_finished());
        assert_eq!(
            game.outcome(),
            Some(Outcome::Checkmate {
                winner: Color::Black
            })
        );
        assert_eq!(game.outcome().unwrap().winner(), Some(Color::Black));
        assert_eq!(game.execute(mv("a2a3")), Err(GameError::GameOver));
    }

    #[test]
    fn stalemate_detected_on_load() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(game.is_finished());
        assert_eq!(game.outcome(), Some(Outcome::Stalemate));
        assert!(game.outcome().unwrap().is_draw());
    }

    #[test]
    fn insufficient_material_outcomes() {
        for fen in [
            "8/8/8/8/8/8/8/4K2k w - - 0 1",
            "8/8/8/8/8/8/8/4KN1k w - - 0 1",
            "8/8/8/8/8/8/8/4KB1k w - - 0 1",
            // both bishops on light squares
            "8/8/8/8/8/8/b7/4KB1k w - - 0 1",
        ] {
            let game = Game::from_fen(fen).unwrap();
            assert_eq!(
                game.outcome(),
                Some(Outcome::InsufficientMaterial),
                "expected insufficient material for {}",
                fen
            );
        }
    }

    #[test]
    fn sufficient_material_positions() {
        for fen in [
            // opposite-colored bishops can still mate
            "8/8/8/8/8/8/1b6/4KB1k w - - 0 1",
            "8/8/8/8/8/8/8/4KR1k w - - 0 1",
            "8/8/8/8/8/8/4P3/4K2k w - - 0 1",
            // two knights
            "8/8/8/8/8/8/8/3NKN1k w - - 0 1",
        ] {
            let game = Game::from_fen(fen).unwrap();
            assert_eq!(game.outcome(), None, "expected active game for {}", fen);
        }
    }

    #[test]
    fn undo_redo_roundtrip() {
        let mut game = Game::new();
        game.execute(mv("e2e4")).unwrap();
        game.execute(mv("e7e5")).unwrap();
        let after_two = game.position().clone();

        assert_eq!(game.undo().unwrap(), mv("e7e5"));
        assert_eq!(game.undo().unwrap(), mv("e2e4"));
        assert_eq!(game.position(), game.initial_position());
        assert_eq!(game.undo(), Err(GameError::NoMoveToUndo));

        assert_eq!(game.redo().unwrap(), mv("e2e4"));
        assert_eq!(game.redo().unwrap(), mv("e7e5"));
        assert_eq!(game.position(), &after_two);
        assert_eq!(game.redo(), Err(GameError::NoMoveToRedo));
    }

    #[test]
    fn executing_clears_redo() {
        let mut game = Game::new();
        game.execute(mv("e2e4")).unwrap();
        game.undo().unwrap();
        game.execute(mv("d2d4")).unwrap();
        assert_eq!(game.redo(), Err(GameError::NoMoveToRedo));
    }

    #[test]
    fn undo_restores_clocks_and_rights() {
        let mut game =
            Game::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 4 7").unwrap();
        let before = game.position().clone();
        game.execute(mv("e1g1")).unwrap();
        game.undo().unwrap();
        assert_eq!(game.position(), &before);
    }

    #[test]
    fn undo_reopens_finished_game() {
        let mut game = Game::new();
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.execute(mv(m)).unwrap();
        }
        assert!(game.is_finished());
        game.undo().unwrap();
        assert!(!game.is_finished());
        // the mating move can be replayed
        game.redo().unwrap();
        assert!(game.is_finished());
    }

    #[test]
    fn promotion_execution_paths() {
        let fen = "7k/P7/8/8/8/8/8/7K w - - 0 1";
        let mut game = Game::from_fen(fen).unwrap();

        assert_eq!(game.execute(mv("a7a8")), Err(GameError::PromotionRequired));
        assert_eq!(
            game.execute_with_promotion(mv("a7a8"), PieceKind::King),
            Err(GameError::InvalidPromotion(PieceKind::King))
        );

        let mut invoked = false;
        game.execute_with(mv("a7a8"), || {
            invoked = true;
            PieceKind::Queen
        })
        .unwrap();
        assert!(invoked);
        assert_eq!(
            game.position().board.piece_at(Square::A8),
            Some(Piece::new(PieceKind::Queen, Color::White))
        );

        // undo brings the pawn back
        game.undo().unwrap();
        assert_eq!(
            game.position().board.piece_at(Square::from_algebraic("a7").unwrap()),
            Some(Piece::new(PieceKind::Pawn, Color::White))
        );
    }

    #[test]
    fn promotion_closure_not_invoked_for_ordinary_move() {
        let mut game = Game::new();
        let mut invoked = false;
        game.execute_with(mv("e2e4"), || {
            invoked = true;
            PieceKind::Queen
        })
        .unwrap();
        assert!(!invoked);
    }

    #[test]
    fn redo_replays_promotion_choice() {
        let mut game = Game::from_fen("7k/P7/8/8/8/8/8/7K w - - 0 1").unwrap();
        game.execute_with_promotion(mv("a7a8"), PieceKind::Knight)
            .unwrap();
        game.undo().unwrap();
        game.redo().unwrap();
        assert_eq!(
            game.position().board.piece_at(Square::A8),
            Some(Piece::new(PieceKind::Knight, Color::White))
        );
    }

    #[test]
    fn threefold_repetition_claim() {
        let mut game = Game::new();
        for m in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            game.execute(mv(m)).unwrap();
        }
        assert_eq!(game.repetition_count(), 2);
        assert!(!game.can_claim_draw());

        for m in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            game.execute(mv(m)).unwrap();
        }
        assert_eq!(game.repetition_count(), 3);
        assert!(game.can_claim_draw());

        game.claim_draw().unwrap();
        assert_eq!(game.outcome(), Some(Outcome::ThreefoldRepetition));
    }

    #[test]
    fn fifty_move_rule_claim() {
        let mut game = Game::from_fen("8/8/8/8/8/8/8/R3K2k w Q - 99 70").unwrap();
        assert!(!game.can_claim_draw());
        game.execute(mv("a1a2")).unwrap();
        assert!(game.can_claim_draw());
        game.claim_draw().unwrap();
        assert_eq!(game.outcome(), Some(Outcome::FiftyMoveRule));
    }

    #[test]
    fn claim_draw_rejected_without_grounds() {
        let mut game = Game::new();
        assert_eq!(game.claim_draw(), Err(GameError::CannotClaimDraw));
    }

    #[test]
    fn resignation() {
        let mut game = Game::new();
        game.resign().unwrap();
        assert_eq!(
            game.outcome(),
            Some(Outcome::Resignation {
                winner: Color::Black
            })
        );
        assert_eq!(game.resign(), Err(GameError::GameOver));
    }

    #[test]
    fn upside_down_variant() {
        let game = Game::with_variant(Variant::UpsideDown);
        assert_eq!(game.variant(), Variant::UpsideDown);
        assert_eq!(
            game.position().board.piece_at(Square::E8),
            Some(Piece::new(PieceKind::King, Color::White))
        );
        assert_eq!(
            game.position().board.piece_at(Square::E1),
            Some(Piece::new(PieceKind::King, Color::Black))
        );
        assert!(game.position().castling.is_empty());
    }

    #[test]
    fn players_metadata() {
        let mut game = Game::new();
        game.set_players(Players {
            white: Player {
                name: Some("Aurora".to_string()),
                kind: PlayerKind::Computer,
            },
            black: Player::default(),
        });
        assert_eq!(game.players().white.name.as_deref(), Some("Aurora"));
        assert_eq!(game.players().black.kind, PlayerKind::Human);
    }

    #[test]
    fn unchecked_execution_skips_filter() {
        let mut game = Game::new();
        // legal move through the unchecked path works and is undoable
        game.execute_unchecked(mv("e2e4"), None).unwrap();
        assert_eq!(game.ply_count(), 1);
        game.undo().unwrap();
        assert_eq!(game.position(), game.initial_position());
    }
}
