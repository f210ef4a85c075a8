//! Movetext tree and its recursive-descent parser.
//!
//! The parser is resilient: malformed input produces a best-effort
//! tree plus diagnostics, never a hard failure. Context (whose move it
//! is and the move number) threads through the recursion so that the
//! first move of a variation replaces the half-move played just before
//! the parenthesis.

use crate::lexer::{tokenize, Diagnostic, Token, TokenKind};
use crate::PgnError;
use caissa_core::Color;
use std::fmt;

/// A game termination marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    WhiteWins,
    BlackWins,
    Draw,
    /// `*`: the game is unfinished or the result is unknown.
    Undecided,
}

impl Termination {
    /// Returns the PGN marker text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Termination::WhiteWins => "1-0",
            Termination::BlackWins => "0-1",
            Termination::Draw => "1/2-1/2",
            Termination::Undecided => "*",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One half-move node in a movetext tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovetextMove {
    /// The fullmove number this half-move belongs to.
    pub number: u16,
    /// Which side played it.
    pub side: Color,
    /// The move token as written, e.g. "Nf3" or "exd8=Q+".
    pub notation: String,
    /// Numeric annotation glyphs attached to this move.
    pub nags: Vec<String>,
    /// Comments between the move number and the move.
    pub comments_before: Vec<String>,
    /// Comments following the move.
    pub comments_after: Vec<String>,
    /// Alternative lines replacing this half-move.
    pub variations: Vec<Movetext>,
}

impl MovetextMove {
    fn new(number: u16, side: Color, notation: String, comments_before: Vec<String>) -> Self {
        MovetextMove {
            number,
            side,
            notation,
            nags: Vec::new(),
            comments_before,
            comments_after: Vec::new(),
            variations: Vec::new(),
        }
    }
}

/// A line of movetext: possibly-annotated moves with nested variations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Movetext {
    /// Comments before the first move.
    pub leading_comments: Vec<String>,
    /// Variations opened before any move of this line.
    pub leading_variations: Vec<Movetext>,
    /// The half-moves of this line, in order.
    pub moves: Vec<MovetextMove>,
    /// Comments after the termination marker.
    pub trailing_comments: Vec<String>,
    /// The termination marker, if one was present.
    pub result: Option<Termination>,
}

/// Parse context: whose move comes next and its fullmove number.
#[derive(Clone, Copy)]
struct Context {
    color: Color,
    number: u16,
}

impl Movetext {
    /// Parses movetext into a tree, collecting diagnostics instead of
    /// failing on malformed input.
    pub fn parse(input: &str) -> (Movetext, Vec<Diagnostic>) {
        let (tokens, mut diagnostics) = tokenize(input);
        let mut pos = 0;
        let movetext = parse_line(
            &tokens,
            &mut pos,
            Context {
                color: Color::White,
                number: 1,
            },
            0,
            &mut diagnostics,
        );
        debug_assert_eq!(pos, tokens.len(), "top-level parse consumes all tokens");

        (movetext, diagnostics)
    }

    /// Parses movetext, failing on lexical errors instead of
    /// collecting them.
    ///
    /// Unclosed braces and unbalanced parentheses become
    /// [`PgnError::UnclosedBrace`] and [`PgnError::UnmatchedParen`];
    /// warnings are discarded.
    pub fn parse_strict(input: &str) -> Result<Movetext, PgnError> {
        let (movetext, diagnostics) = Self::parse(input);
        for diagnostic in &diagnostics {
            if diagnostic.message.contains('{') {
                return Err(PgnError::UnclosedBrace);
            }
            if diagnostic.message.contains('(') || diagnostic.message.contains(')') {
                return Err(PgnError::UnmatchedParen);
            }
        }
        Ok(movetext)
    }

    /// Returns the last move of the main line.
    pub fn last_move(&self) -> Option<&MovetextMove> {
        self.moves.last()
    }
}

fn parse_line(
    tokens: &[Token],
    pos: &mut usize,
    mut context: Context,
    depth: u32,
    diagnostics: &mut Vec<Diagnostic>,
) -> Movetext {
    let mut line = Movetext::default();
    let mut pending_before: Vec<String> = Vec::new();
    // set between a move-number token and the move it numbers; comments
    // in that window belong to the upcoming move
    let mut awaiting_san = false;

    while *pos < tokens.len() {
        let token = &tokens[*pos];
        match &token.kind {
            TokenKind::MoveNumber { number, dots } => {
                context.number = *number;
                context.color = if *dots >= 3 {
                    Color::Black
                } else {
                    Color::White
                };
                awaiting_san = true;
                *pos += 1;
            }

            TokenKind::San(notation) => {
                if line.result.is_some() {
                    diagnostics.push(Diagnostic::warning(
                        format!("move '{}' after the result marker", notation),
                        token.line,
                        token.column,
                    ));
                    *pos += 1;
                    continue;
                }
                line.moves.push(MovetextMove::new(
                    context.number,
                    context.color,
                    notation.clone(),
                    std::mem::take(&mut pending_before),
                ));
                if context.color == Color::Black {
                    context.number += 1;
                }
                context.color = context.color.opposite();
                awaiting_san = false;
                *pos += 1;
            }

            TokenKind::Comment(text) => {
                if line.result.is_some() {
                    line.trailing_comments.push(text.clone());
                } else if awaiting_san {
                    pending_before.push(text.clone());
                } else if let Some(last) = line.moves.last_mut() {
                    last.comments_after.push(text.clone());
                } else {
                    line.leading_comments.push(text.clone());
                }
                *pos += 1;
            }

            TokenKind::Nag(nag) => {
                match line.moves.last_mut() {
                    Some(last) => last.nags.push(nag.clone()),
                    None => diagnostics.push(Diagnostic::warning(
                        format!("glyph '{}' with no preceding move", nag),
                        token.line,
                        token.column,
                    )),
                }
                *pos += 1;
            }

            TokenKind::VariationStart => {
                let (open_line, open_column) = (token.line, token.column);
                *pos += 1;
                // the variation replaces the previous half-move, so its
                // context restarts at that move's number and side
                let inner_context = match line.moves.last() {
                    Some(last) => Context {
                        color: last.side,
                        number: last.number,
                    },
                    None => context,
                };
                let variation = parse_line(tokens, pos, inner_context, depth + 1, diagnostics);

                match tokens.get(*pos).map(|t| &t.kind) {
                    Some(TokenKind::VariationEnd) => {
                        *pos += 1;
                    }
                    _ => diagnostics.push(Diagnostic::error(
                        "unmatched '(': variation never closed",
                        open_line,
                        open_column,
                    )),
                }

                match line.moves.last_mut() {
                    Some(last) => last.variations.push(variation),
                    None => line.leading_variations.push(variation),
                }
            }

            TokenKind::VariationEnd => {
                if depth > 0 {
                    // the caller consumes the ')'
                    break;
                }
                diagnostics.push(Diagnostic::error(
                    "unexpected ')' at top level",
                    token.line,
                    token.column,
                ));
                *pos += 1;
            }

            TokenKind::Result(termination) => {
                if line.result.is_some() {
                    diagnostics.push(Diagnostic::warning(
                        "multiple result markers, keeping the first",
                        token.line,
                        token.column,
                    ));
                } else {
                    line.result = Some(*termination);
                }
                *pos += 1;
            }
        }
    }

    // a dangling move number with comments but no move: keep the
    // comments rather than dropping them
    if !pending_before.is_empty() {
        match line.moves.last_mut() {
            Some(last) => last.comments_after.append(&mut pending_before),
            None => line.leading_comments.append(&mut pending_before),
        }
    }

    line
}
