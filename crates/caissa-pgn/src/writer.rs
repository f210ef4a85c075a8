//! PGN serialisation.
//!
//! Movetext is emitted as a flat token list (numbers, SAN, NAGs,
//! comments, parenthesised variations, result marker) and wrapped at 80
//! columns on token boundaries, so no token is ever split across lines.

use crate::movetext::{Movetext, Termination};
use crate::tag::Tags;
use caissa_core::Color;
use caissa_engine::{move_to_san, Game, Outcome};

const LINE_WIDTH: usize = 80;

/// Serialises a movetext tree.
pub fn write_movetext(movetext: &Movetext) -> String {
    wrap(&movetext_tokens(movetext))
}

/// Serialises a game: its tag pairs, a blank line, and the move list
/// replayed from the initial position in SAN, closed by the result
/// marker derived from the game's outcome.
pub fn write_game(game: &Game, tags: &Tags) -> String {
    let mut out = String::new();
    out.push_str(&tags.to_string());
    out.push('\n');
    out.push_str(&write_movetext(&game_movetext(game)));
    out.push('\n');
    out
}

/// Rebuilds a movetext tree from a game's executed history.
pub fn game_movetext(game: &Game) -> Movetext {
    let mut movetext = Movetext::default();
    let mut position = game.initial_position().clone();

    for record in game.history() {
        movetext.moves.push(crate::movetext::MovetextMove {
            number: position.fullmove_number,
            side: position.turn,
            notation: move_to_san(&position, record.mv, record.promotion),
            nags: Vec::new(),
            comments_before: Vec::new(),
            comments_after: Vec::new(),
            variations: Vec::new(),
        });
        position.apply(record.mv, record.promotion).expect("history replays");
    }

    movetext.result = Some(game_termination(game));
    movetext
}

fn game_termination(game: &Game) -> Termination {
    match game.outcome() {
        Some(Outcome::Checkmate { winner } | Outcome::Resignation { winner }) => match winner {
            Color::White => Termination::WhiteWins,
            Color::Black => Termination::BlackWins,
        },
        Some(_) => Termination::Draw,
        None => Termination::Undecided,
    }
}

fn movetext_tokens(movetext: &Movetext) -> Vec<String> {
    let mut tokens = Vec::new();

    for comment in &movetext.leading_comments {
        tokens.push(format!("{{{}}}", comment));
    }
    for variation in &movetext.leading_variations {
        push_variation(&mut tokens, variation);
    }

    // a black move needs its own number at the start of a line and
    // after any interruption; white moves are always numbered
    let mut force_number = true;
    for m in &movetext.moves {
        if m.side == Color::White || force_number || !m.comments_before.is_empty() {
            let dots = if m.side == Color::Black { "..." } else { "." };
            tokens.push(format!("{}{}", m.number, dots));
        }
        for comment in &m.comments_before {
            tokens.push(format!("{{{}}}", comment));
        }
        tokens.push(m.notation.clone());
        for nag in &m.nags {
            tokens.push(nag.clone());
        }
        for comment in &m.comments_after {
            tokens.push(format!("{{{}}}", comment));
        }
        for variation in &m.variations {
            push_variation(&mut tokens, variation);
        }
        force_number = !m.comments_after.is_empty() || !m.variations.is_empty();
    }

    if let Some(result) = movetext.result {
        tokens.push(result.as_str().to_string());
    }
    for comment in &movetext.trailing_comments {
        tokens.push(format!("{{{}}}", comment));
    }

    tokens
}

fn push_variation(tokens: &mut Vec<String>, variation: &Movetext) {
    let mut inner = movetext_tokens(variation);
    match inner.len() {
        0 => tokens.push("()".to_string()),
        _ => {
            inner.first_mut().expect("non-empty").insert(0, '(');
            inner.last_mut().expect("non-empty").push(')');
            tokens.extend(inner);
        }
    }
}

/// Joins tokens with spaces, breaking lines before tokens that would
/// cross the width limit.
fn wrap(tokens: &[String]) -> String {
    let mut out = String::new();
    let mut line_len = 0usize;

    for token in tokens {
        if line_len == 0 {
            out.push_str(token);
            line_len = token.len();
        } else if line_len + 1 + token.len() > LINE_WIDTH {
            out.push('\n');
            out.push_str(token);
            line_len = token.len();
        } else {
            out.push(' ');
            out.push_str(token);
            line_len += 1 + token.len();
        }
    }

    out
}
