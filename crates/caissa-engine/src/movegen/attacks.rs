//! Attack tables and attack computation for all piece types.
//!
//! Leap tables (pawn, knight, king) and the ray-derived tables
//! (`between`, `line`) are computed in const context and published as
//! immutable statics, so concurrent readers never observe partial
//! initialisation. Sliding attacks are classical blocker-limited ray
//! scans parameterised by the current occupancy.

use crate::Bitboard;
use caissa_core::{Color, Direction, PieceKind, Square};

/// (file, rank) steps for the eight directions, in `Direction::ALL` order.
const DIR_STEPS: [(i8, i8); 8] = [
    (0, 1),   // North
    (0, -1),  // South
    (1, 0),   // East
    (-1, 0),  // West
    (1, 1),   // NorthEast
    (-1, 1),  // NorthWest
    (1, -1),  // SouthEast
    (-1, -1), // SouthWest
];

/// Index of the opposite direction for each entry of `DIR_STEPS`.
const DIR_OPPOSITE: [usize; 8] = [1, 0, 3, 2, 7, 6, 5, 4];

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i8, i8); 8] = DIR_STEPS;

/// Builds a 64-entry table of single-step leaps from each square.
const fn leap_table(steps: &[(i8, i8); 8]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0usize;
    while sq < 64 {
        let file = (sq % 8) as i8;
        let rank = (sq / 8) as i8;
        let mut bits = 0u64;
        let mut i = 0;
        while i < 8 {
            let (df, dr) = steps[i];
            let f = file + df;
            let r = rank + dr;
            if f >= 0 && f < 8 && r >= 0 && r < 8 {
                bits |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        table[sq] = Bitboard(bits);
        sq += 1;
    }
    table
}

const fn pawn_table() -> [[Bitboard; 64]; 2] {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0usize;
    while sq < 64 {
        let file = (sq % 8) as i8;
        let rank = (sq / 8) as i8;

        let mut white = 0u64;
        let mut black = 0u64;
        let mut df = -1i8;
        while df <= 1 {
            if df != 0 && file + df >= 0 && file + df < 8 {
                if rank < 7 {
                    white |= 1u64 << ((rank + 1) * 8 + file + df);
                }
                if rank > 0 {
                    black |= 1u64 << ((rank - 1) * 8 + file + df);
                }
            }
            df += 2;
        }
        table[0][sq] = Bitboard(white);
        table[1][sq] = Bitboard(black);
        sq += 1;
    }
    table
}

/// Builds the full ray from each square in each direction, exclusive of
/// the starting square, running to the board edge.
const fn ray_table() -> [[Bitboard; 64]; 8] {
    let mut table = [[Bitboard::EMPTY; 64]; 8];
    let mut dir = 0usize;
    while dir < 8 {
        let (df, dr) = DIR_STEPS[dir];
        let mut sq = 0usize;
        while sq < 64 {
            let mut bits = 0u64;
            let mut f = (sq % 8) as i8 + df;
            let mut r = (sq / 8) as i8 + dr;
            while f >= 0 && f < 8 && r >= 0 && r < 8 {
                bits |= 1u64 << (r * 8 + f);
                f += df;
                r += dr;
            }
            table[dir][sq] = Bitboard(bits);
            sq += 1;
        }
        dir += 1;
    }
    table
}

const RAYS: [[Bitboard; 64]; 8] = ray_table();

/// Squares strictly between two squares sharing a ray; empty otherwise.
const fn between_table() -> [[Bitboard; 64]; 64] {
    let mut table = [[Bitboard::EMPTY; 64]; 64];
    let mut a = 0usize;
    while a < 64 {
        let mut dir = 0usize;
        while dir < 8 {
            let (df, dr) = DIR_STEPS[dir];
            let mut f = (a % 8) as i8 + df;
            let mut r = (a / 8) as i8 + dr;
            let mut passed = 0u64;
            while f >= 0 && f < 8 && r >= 0 && r < 8 {
                let b = (r * 8 + f) as usize;
                table[a][b] = Bitboard(passed);
                passed |= 1u64 << b;
                f += df;
                r += dr;
            }
            dir += 1;
        }
        a += 1;
    }
    table
}

/// The entire ray through two squares if one exists; empty otherwise.
/// Both endpoints are included.
const fn line_table() -> [[Bitboard; 64]; 64] {
    let mut table = [[Bitboard::EMPTY; 64]; 64];
    let mut a = 0usize;
    while a < 64 {
        let mut dir = 0usize;
        while dir < 8 {
            let (df, dr) = DIR_STEPS[dir];
            let full_line =
                RAYS[dir][a].0 | RAYS[DIR_OPPOSITE[dir]][a].0 | (1u64 << a);
            let mut f = (a % 8) as i8 + df;
            let mut r = (a / 8) as i8 + dr;
            while f >= 0 && f < 8 && r >= 0 && r < 8 {
                let b = (r * 8 + f) as usize;
                table[a][b] = Bitboard(full_line);
                f += df;
                r += dr;
            }
            dir += 1;
        }
        a += 1;
    }
    table
}

static KNIGHT_ATTACKS: [Bitboard; 64] = leap_table(&KNIGHT_STEPS);
static KING_ATTACKS: [Bitboard; 64] = leap_table(&KING_STEPS);
static PAWN_ATTACKS: [[Bitboard; 64]; 2] = pawn_table();
static BETWEEN: [[Bitboard; 64]; 64] = between_table();
static LINE: [[Bitboard; 64]; 64] = line_table();

/// Returns the squares a pawn of the given color attacks from `sq`.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Returns knight attacks from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

/// Returns king attacks from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Returns the squares strictly between `a` and `b` when they share a
/// rank, file, or diagonal; the empty set otherwise.
#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    BETWEEN[a.index() as usize][b.index() as usize]
}

/// Returns the entire ray through `a` and `b` (endpoints included) when
/// they share a rank, file, or diagonal; the empty set otherwise.
#[inline]
pub fn line(a: Square, b: Square) -> Bitboard {
    LINE[a.index() as usize][b.index() as usize]
}

/// True for directions whose square-index delta is positive, which
/// determines from which end of a blocker set the nearest one is taken.
#[inline]
const fn is_positive(direction: Direction) -> bool {
    matches!(
        direction,
        Direction::North | Direction::East | Direction::NorthEast | Direction::NorthWest
    )
}

fn ray_attacks(sq: Square, occupied: Bitboard, directions: [Direction; 4]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for direction in directions {
        let ray = RAYS[direction as usize][sq.index() as usize];
        let blockers = ray & occupied;
        let nearest = if is_positive(direction) {
            blockers.first_square()
        } else {
            blockers.last_square()
        };
        attacks |= match nearest {
            // The blocker square stays attacked; everything past it is cut.
            Some(b) => ray ^ RAYS[direction as usize][b.index() as usize],
            None => ray,
        };
    }
    attacks
}

/// Returns rook attacks from `sq`, limited by the given occupancy.
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, occupied, Direction::ROOK)
}

/// Returns bishop attacks from `sq`, limited by the given occupancy.
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, occupied, Direction::BISHOP)
}

/// Returns queen attacks from `sq`, limited by the given occupancy.
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}

/// Rook attacks that see through the first blocker in each direction.
///
/// Only blockers in `candidates` become transparent; used for pin
/// detection.
pub fn xray_rook_attacks(sq: Square, occupied: Bitboard, candidates: Bitboard) -> Bitboard {
    let attacks = rook_attacks(sq, occupied);
    let blockers = candidates & attacks;
    attacks ^ rook_attacks(sq, occupied ^ blockers)
}

/// Bishop attacks that see through the first blocker in each direction.
pub fn xray_bishop_attacks(sq: Square, occupied: Bitboard, candidates: Bitboard) -> Bitboard {
    let attacks = bishop_attacks(sq, occupied);
    let blockers = candidates & attacks;
    attacks ^ bishop_attacks(sq, occupied ^ blockers)
}

/// Returns the attack set of a piece of the given kind and color on
/// `sq` under the given occupancy.
pub fn piece_attacks(kind: PieceKind, color: Color, sq: Square, occupied: Bitboard) -> Bitboard {
    match kind {
        PieceKind::Pawn => pawn_attacks(sq, color),
        PieceKind::Knight => knight_attacks(sq),
        PieceKind::Bishop => bishop_attacks(sq, occupied),
        PieceKind::Rook => rook_attacks(sq, occupied),
        PieceKind::Queen => queen_attacks(sq, occupied),
        PieceKind::King => king_attacks(sq),
    }
}
