use basalt::movegen::{is_pseudo_legal, move_from_tt, MoveGenerator};
use basalt::state::GameState;
use rand::Rng;
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
fn all_generated_moves_pass_pseudo_legality() {
    init();
    let fens = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    ];
    for fen in fens {
        let state = GameState::parse_fen(fen).unwrap();
        let mut gen = MoveGenerator::new();
        gen.generate_moves(&state);
        for i in 0..gen.list.count {
            let mv = gen.list.moves[i];
            assert!(is_pseudo_legal(&state, mv), "{:?} rejected on {}", mv, fen);
        }
    }
}

#[test]
fn random_table_moves_never_reach_the_board_unvetted() {
    init();
    let state = GameState::startpos();
    let mut rng = rand::thread_rng();
    let mut accepted = 0;

    let mut gen = MoveGenerator::new();
    gen.generate_moves(&state);

    for _ in 0..20_000 {
        let data: u16 = rng.gen();
        if let Some(mv) = move_from_tt(&state, data) {
            // Whatever survives rehydration must be a genuinely generated
            // move for this position.
            let mut found = false;
            for i in 0..gen.list.count {
                if gen.list.moves[i] == mv {
                    found = true;
                    break;
                }
            }
            assert!(found, "rehydrated move {:?} was never generated", mv);
            accepted += 1;
        }
    }

    // On the start position only a small fraction of random 16-bit words can
    // map onto real moves.
    assert!(accepted < 2000, "too many random moves accepted: {}", accepted);
}
