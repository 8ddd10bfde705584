use basalt::perft::perft;
use basalt::state::GameState;
use std::sync::Once;

static INIT: Once = Once::new();

fn init() {
    INIT.call_once(|| {
        basalt::zobrist::init_zobrist();
        basalt::bitboard::init_magic_tables();
        basalt::movegen::init_move_tables();
    });
}

#[test]
fn perft_startpos_depth_4() {
    init();
    let mut state = GameState::startpos();
    assert_eq!(perft(&mut state, 4), 197281);
}

#[test]
fn perft_position_4_depth_4() {
    init();
    let mut state = GameState::parse_fen(
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    )
    .unwrap();
    assert_eq!(perft(&mut state, 1), 6);
    assert_eq!(perft(&mut state, 2), 264);
    assert_eq!(perft(&mut state, 3), 9467);
    assert_eq!(perft(&mut state, 4), 422333);
}

#[test]
#[ignore = "slow: ~16M nodes, run with --ignored"]
fn perft_position_4_depth_5() {
    init();
    let mut state = GameState::parse_fen(
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    )
    .unwrap();
    assert_eq!(perft(&mut state, 5), 15833292);
}

#[test]
fn perft_position_5_depth_3() {
    init();
    let mut state = GameState::parse_fen(
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    )
    .unwrap();
    assert_eq!(perft(&mut state, 1), 44);
    assert_eq!(perft(&mut state, 2), 1486);
    assert_eq!(perft(&mut state, 3), 62379);
}

// A perft walk that validates the full board invariant set at every node:
// mailbox vs bitboards vs piece lists vs occupancies vs material vs key.
fn perft_validated(state: &mut GameState, depth: u8) -> u64 {
    assert!(state.is_consistent(), "inconsistent at {}", state.to_fen());
    if depth == 0 {
        return 1;
    }
    let mut gen = basalt::movegen::MoveGenerator::new();
    gen.generate_moves(state);
    let mut nodes = 0;
    for i in 0..gen.list.count {
        let mv = gen.list.moves[i];
        if !state.make_move_inplace(mv) {
            continue;
        }
        nodes += perft_validated(state, depth - 1);
        state.unmake_move(mv);
    }
    nodes
}

#[test]
fn perft_keeps_all_representations_consistent() {
    init();
    let fens = [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    ];
    for fen in fens {
        let mut state = GameState::parse_fen(fen).unwrap();
        perft_validated(&mut state, 3);
    }
}
