use basalt::history::SearchData;
use basalt::parameters::SearchParameters;
use basalt::search::{search, Limits, SearchSignals, MATE_SCORE};
use basalt::state::GameState;
use basalt::time::{TimeControl, TimeManager};
use basalt::tt::TranspositionTable;
use std::sync::Arc;
use std::sync::Once;
use std::time::Instant;

static INIT: Once = Once::new();

fn init() {
    INIT.call_once(|| {
        basalt::zobrist::init_zobrist();
        basalt::bitboard::init_magic_tables();
        basalt::movegen::init_move_tables();
    });
}

#[test]
fn movetime_search_returns_within_bounded_overrun() {
    init();
    let state = GameState::startpos();
    let tt = TranspositionTable::new(16);
    let mut data = SearchData::new();
    let params = SearchParameters::default();
    let signals = Arc::new(SearchSignals::new());

    let tm = TimeManager::new(TimeControl::MoveTime(200), 0, 10);
    let started = Instant::now();
    let (_, best) =
        search(&state, Limits::FixedTime(tm), &tt, signals, true, &mut data, &params, 1);
    let elapsed = started.elapsed().as_millis();

    let mv = best.expect("a legal move under a time limit");
    let mut check = state.clone();
    assert!(check.make_move_inplace(mv));
    // Polled cancellation: the budget may be overrun by roughly one check
    // interval, never by multiples of the budget.
    assert!(elapsed < 3000, "time-limited search ran {}ms", elapsed);
}

#[test]
fn deeper_search_reuses_the_table() {
    init();
    let state = GameState::parse_fen(
        "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    )
    .unwrap();
    let tt = TranspositionTable::new(16);
    let params = SearchParameters::default();

    let mut data = SearchData::new();
    let signals = Arc::new(SearchSignals::new());
    search(&state, Limits::FixedDepth(6), &tt, signals, true, &mut data, &params, 1);
    assert!(tt.hashfull() > 0, "a depth-6 search must populate the table");
    assert_ne!(tt.get_move(state.hash), 0, "root entry must carry a best move");

    // A fresh searcher over the warmed table still produces a legal move.
    let mut data2 = SearchData::new();
    let signals2 = Arc::new(SearchSignals::new());
    let (_, best) =
        search(&state, Limits::FixedDepth(6), &tt, signals2, true, &mut data2, &params, 1);
    let mut check = state.clone();
    assert!(check.make_move_inplace(best.unwrap()));
}

#[test]
fn independent_engine_instances_coexist() {
    init();
    // Two instances with private tables and signal regions searching
    // different positions at the same time.
    let first = GameState::startpos();
    let second = GameState::parse_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    )
    .unwrap();

    let mut handles = Vec::new();
    for state in [first, second] {
        handles.push(
            std::thread::Builder::new()
                .stack_size(8 * 1024 * 1024)
                .spawn(move || {
                    let tt = TranspositionTable::new(8);
                    let mut data = SearchData::new();
                    let params = SearchParameters::default();
                    let signals = Arc::new(SearchSignals::new());
                    let (_, best) = search(
                        &state,
                        Limits::FixedDepth(5),
                        &tt,
                        signals,
                        false,
                        &mut data,
                        &params,
                        1,
                    );
                    let mut check = state.clone();
                    assert!(check.make_move_inplace(best.unwrap()));
                })
                .unwrap(),
        );
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn expiring_halfmove_clock_scores_draw() {
    init();
    // Lone white king, huge black advantage, clock at 99: every reply lands
    // on the 50-move draw, so the root scores exactly zero.
    let state = GameState::parse_fen("8/7q/8/8/8/2k5/8/K7 w - - 99 80").unwrap();
    let tt = TranspositionTable::new(8);
    let mut data = SearchData::new();
    let params = SearchParameters::default();
    let signals = Arc::new(SearchSignals::new());
    let (score, best) =
        search(&state, Limits::FixedDepth(4), &tt, signals, true, &mut data, &params, 1);
    assert!(best.is_some());
    assert_eq!(score, 0);
}

#[test]
fn mate_found_before_clock_expires() {
    init();
    // Qg7 is mate well inside the remaining clock budget.
    let state = GameState::parse_fen("7k/8/5K2/8/8/8/8/6Q1 w - - 90 80").unwrap();
    let tt = TranspositionTable::new(8);
    let mut data = SearchData::new();
    let params = SearchParameters::default();
    let signals = Arc::new(SearchSignals::new());
    let (score, best) =
        search(&state, Limits::FixedDepth(4), &tt, signals, true, &mut data, &params, 1);
    assert!(score > MATE_SCORE, "expected mate score, got {}", score);
    assert_eq!(best.unwrap().to_uci(), "g1g7");
}
