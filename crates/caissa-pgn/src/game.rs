//! Whole-game PGN import.
//!
//! Reading a PGN ties the three layers together: the tag-pair header,
//! the movetext tree, and a [`Game`] built by resolving and executing
//! the main line against the evolving position.

use crate::lexer::Diagnostic;
use crate::movetext::Movetext;
use crate::tag::Tags;
use crate::PgnError;
use caissa_engine::{parse_move, Game, Player, Players};

/// A game read from PGN text.
#[derive(Debug, Clone)]
pub struct PgnGame {
    /// The tag-pair header, unknown tags included.
    pub tags: Tags,
    /// The movetext tree, variations and annotations included.
    pub movetext: Movetext,
    /// The game with the main line executed.
    pub game: Game,
    /// Non-fatal problems found while reading.
    pub diagnostics: Vec<Diagnostic>,
}

/// Reads a single game from PGN text.
///
/// Header lines must be well-formed `[Key "Value"]` pairs; a missing
/// roster tag is only a diagnostic. The movetext parser is resilient
/// and records diagnostics, but a main-line move that cannot be
/// resolved to a legal move fails the read with
/// [`PgnError::InvalidMove`].
pub fn read_game(input: &str) -> Result<PgnGame, PgnError> {
    let mut tags = Tags::new();
    let mut offset = 0;
    let mut movetext_start = input.len();

    for line in input.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            offset += line.len();
            continue;
        }
        if trimmed.starts_with('[') {
            tags.push_line(trimmed)?;
            offset += line.len();
        } else {
            movetext_start = offset;
            break;
        }
    }

    let (movetext, mut diagnostics) = Movetext::parse(&input[movetext_start..]);

    for key in tags.missing_roster_keys() {
        diagnostics.push(Diagnostic::warning(
            format!("missing required tag '{}'", key),
            1,
            1,
        ));
    }
    if let (Some(tag_result), Some(marker)) = (tags.get("Result"), movetext.result) {
        if tag_result != marker.as_str() {
            diagnostics.push(Diagnostic::warning(
                format!(
                    "Result tag '{}' disagrees with movetext marker '{}'",
                    tag_result, marker
                ),
                1,
                1,
            ));
        }
    }

    // a FEN tag replaces the standard starting position
    let mut game = match tags.get("FEN") {
        Some(fen) => Game::from_fen(fen)?,
        None => Game::new(),
    };
    game.set_players(players_from_tags(&tags));

    for node in &movetext.moves {
        let (mv, promotion) = parse_move(game.position(), &node.notation)
            .map_err(|_| PgnError::InvalidMove(node.notation.clone()))?;
        let executed = match promotion {
            Some(kind) => game.execute_with_promotion(mv, kind),
            None => game.execute(mv),
        };
        executed.map_err(|_| PgnError::InvalidMove(node.notation.clone()))?;
    }

    Ok(PgnGame {
        tags,
        movetext,
        game,
        diagnostics,
    })
}

fn players_from_tags(tags: &Tags) -> Players {
    let name_of = |key: &str| {
        tags.get(key)
            .filter(|name| !name.is_empty() && *name != "?")
            .map(str::to_string)
    };
    Players {
        white: Player {
            name: name_of("White"),
            ..Player::default()
        },
        black: Player {
            name: name_of("Black"),
            ..Player::default()
        },
    }
}
