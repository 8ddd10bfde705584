use crate::movegen::MoveGenerator;
use crate::state::GameState;
use std::time::Instant;

/// Unpruned legal-move leaf count via make/unmake. The reference numbers in
/// the suite double as the movegen/board regression oracle.
pub fn perft(state: &mut GameState, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut gen = MoveGenerator::new();
    gen.generate_moves(state);

    let mut nodes = 0;
    for i in 0..gen.list.count {
        let mv = gen.list.moves[i];
        if !state.make_move_inplace(mv) {
            continue;
        }
        nodes += if depth == 1 { 1 } else { perft(state, depth - 1) };
        state.unmake_move(mv);
    }
    nodes
}

pub fn run_perft_suite() {
    println!("--- Basalt Perft Suite ---");

    let positions: [(&str, &str, [u64; 6]); 5] = [
        (
            "Start Position",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            [1, 20, 400, 8902, 197281, 4865609],
        ),
        (
            "Position 2 (Kiwipete)",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            [1, 48, 2039, 97862, 4085603, 193690690],
        ),
        (
            "Position 3",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            [1, 14, 191, 2812, 43238, 674624],
        ),
        (
            "Position 4 (Promotions)",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            [1, 6, 264, 9467, 422333, 15833292],
        ),
        (
            "Position 5",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            [1, 44, 1486, 62379, 2103487, 89941194],
        ),
    ];

    let mut total_nodes = 0u64;
    let mut total_time = 0u128;

    for (name, fen, expected) in positions.iter() {
        println!("\nTesting: {}", name);
        let mut state = GameState::parse_fen(fen).expect("suite FEN parses");

        let depth = 4;
        let start = Instant::now();
        let nodes = perft(&mut state, depth);
        let elapsed = start.elapsed().as_millis();

        total_nodes += nodes;
        total_time += elapsed;

        println!("Depth {}: Nodes: {} Time: {}ms", depth, nodes, elapsed);
        if nodes == expected[depth as usize] {
            println!("RESULT: PASS");
        } else {
            println!("RESULT: FAIL (Expected {})", expected[depth as usize]);
            perft_divide(&mut state, depth);
        }
    }

    println!("\n--- SUITE COMPLETE ---");
    println!("Total Nodes: {}", total_nodes);
    println!("Total Time:  {}ms", total_time);
    if total_time > 0 {
        println!("NPS:         {}", (total_nodes as u128 * 1000) / total_time);
    }
}

/// Per-root-move breakdown for tracking down a count mismatch.
pub fn perft_divide(state: &mut GameState, depth: u8) {
    println!("--- Perft Divide Depth {} ---", depth);
    let mut gen = MoveGenerator::new();
    gen.generate_moves(state);

    let mut total = 0;
    for i in 0..gen.list.count {
        let mv = gen.list.moves[i];
        if !state.make_move_inplace(mv) {
            continue;
        }
        let count = perft(state, depth - 1);
        state.unmake_move(mv);
        println!("{}: {}", mv.to_uci(), count);
        total += count;
    }
    println!("Total: {}", total);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        crate::zobrist::init_zobrist();
        crate::bitboard::init_magic_tables();
        crate::movegen::init_move_tables();
    }

    #[test]
    fn perft_start_position() {
        init();
        let mut state = GameState::startpos();
        assert_eq!(perft(&mut state, 1), 20);
        assert_eq!(perft(&mut state, 2), 400);
        assert_eq!(perft(&mut state, 3), 8902);
    }

    #[test]
    fn perft_kiwipete() {
        init();
        let mut state = GameState::parse_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        assert_eq!(perft(&mut state, 1), 48);
        assert_eq!(perft(&mut state, 2), 2039);
        assert_eq!(perft(&mut state, 3), 97862);
    }

    #[test]
    fn perft_castling_position() {
        init();
        // 5 king moves + 2 castles + 10 a-rook moves + 9 h-rook moves.
        let mut state =
            GameState::parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(perft(&mut state, 1), 26);
    }

    #[test]
    fn perft_en_passant_pins() {
        init();
        // Position 3 is dense with en-passant and pin edge cases.
        let mut state =
            GameState::parse_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
        assert_eq!(perft(&mut state, 1), 14);
        assert_eq!(perft(&mut state, 2), 191);
        assert_eq!(perft(&mut state, 3), 2812);
        assert_eq!(perft(&mut state, 4), 43238);
    }
}
