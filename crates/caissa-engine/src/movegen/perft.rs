//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of legal move sequences of a given depth,
//! which can be compared against known-correct values to validate the
//! move generator.

use super::legal_moves;
use crate::Position;
use caissa_core::PieceKind;

/// Counts the number of legal move sequences of the given depth.
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(position);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for m in &moves {
        let mut next = position.clone();
        next.apply(*m, Some(PieceKind::Queen))
            .expect("legal move applies");
        nodes += perft(&next, depth - 1);
    }
    nodes
}

/// Perft with divide: the node count under each first move.
/// Useful for pinpointing which move has an incorrect subtree count.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(String, u64)> {
    let moves = legal_moves(position);
    let mut results = Vec::with_capacity(moves.len());

    for m in &moves {
        let mut next = position.clone();
        next.apply(*m, Some(PieceKind::Queen))
            .expect("legal move applies");
        let nodes = if depth > 1 { perft(&next, depth - 1) } else { 1 };
        results.push((m.to_string(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    // Starting position reference values
    #[test]
    fn perft_startpos_depth_1() {
        assert_eq!(perft(&Position::startpos(), 1), 20);
    }

    #[test]
    fn perft_startpos_depth_2() {
        assert_eq!(perft(&Position::startpos(), 2), 400);
    }

    #[test]
    fn perft_startpos_depth_3() {
        assert_eq!(perft(&Position::startpos(), 3), 8902);
    }

    #[test]
    fn perft_startpos_depth_4() {
        assert_eq!(perft(&Position::startpos(), 4), 197_281);
    }

    // Kiwipete: heavy on castling, pins, and en passant. No promotion
    // is reachable within three plies, so the reference values apply
    // even though promotions are single moves here.
    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    #[test]
    fn perft_kiwipete_depth_1() {
        let position = Position::from_fen(KIWIPETE).unwrap();
        assert_eq!(perft(&position, 1), 48);
    }

    #[test]
    fn perft_kiwipete_depth_2() {
        let position = Position::from_fen(KIWIPETE).unwrap();
        assert_eq!(perft(&position, 2), 2039);
    }

    #[test]
    fn perft_kiwipete_depth_3() {
        let position = Position::from_fen(KIWIPETE).unwrap();
        assert_eq!(perft(&position, 3), 97_862);
    }

    // Endgame position with en passant pins and check evasions.
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

    #[test]
    fn perft_position3_depth_1() {
        let position = Position::from_fen(POSITION_3).unwrap();
        assert_eq!(perft(&position, 1), 14);
    }

    #[test]
    fn perft_position3_depth_2() {
        let position = Position::from_fen(POSITION_3).unwrap();
        assert_eq!(perft(&position, 2), 191);
    }

    #[test]
    fn perft_position3_depth_3() {
        let position = Position::from_fen(POSITION_3).unwrap();
        assert_eq!(perft(&position, 3), 2812);
    }

    #[test]
    fn perft_divide_sums_to_perft() {
        let position = Position::startpos();
        let results = perft_divide(&position, 2);
        assert_eq!(results.len(), 20);
        let total: u64 = results.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 400);
    }
}
