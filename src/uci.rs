use crate::book::Book;
use crate::movegen::MoveGenerator;
use crate::parameters::SearchParameters;
use crate::search::{self, Limits, SearchSignals};
use crate::state::{GameState, Move};
use crate::time::{TimeControl, TimeManager};
use crate::tt::TranspositionTable;
use std::io::{self, BufRead};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

pub fn uci_loop() {
    let stdin = io::stdin();
    let mut buffer = String::new();

    let mut tt = Arc::new(TranspositionTable::new(64));
    let mut params = Arc::new(SearchParameters::default());
    let signals = Arc::new(SearchSignals::new());

    let mut game_state = GameState::startpos();
    let mut num_threads = 1usize;
    let mut multipv = 1usize;
    let mut move_overhead: u128 = 10;
    let mut book: Option<Arc<Book>> = None;

    let mut search_threads: Vec<thread::JoinHandle<()>> = Vec::new();

    loop {
        buffer.clear();
        match stdin.lock().read_line(&mut buffer) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading stdin: {}", e);
                break;
            }
        }

        let cmd = buffer.trim();
        if cmd.is_empty() {
            continue;
        }
        let parts: Vec<&str> = cmd.split_whitespace().collect();

        log::debug!("UCI input: {}", cmd);

        match parts[0] {
            "uci" => {
                println!("id name Basalt 1.0.0");
                println!("id author the Basalt authors");
                println!("option name Hash type spin default 64 min 1 max 4096");
                println!("option name Threads type spin default 1 min 1 max 64");
                println!("option name MultiPV type spin default 1 min 1 max 8");
                println!("option name Move Overhead type spin default 10 min 0 max 5000");
                println!("option name Ponder type check default false");
                println!("option name Book type string default <empty>");
                println!("option name ParamsFile type string default <empty>");
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => {
                stop_workers(&signals, &mut search_threads);
                tt.clear();
                game_state = GameState::startpos();
            }
            "position" => {
                handle_position(&mut game_state, &parts);
            }
            "go" => {
                stop_workers(&signals, &mut search_threads);
                signals.stop.store(false, Ordering::Relaxed);

                let (limits, ponder) = parse_go(game_state.side_to_move, &parts, move_overhead);
                signals.ponder.store(ponder, Ordering::Relaxed);

                if !ponder {
                    if let Some(book) = &book {
                        if let Some(mv) = book.probe(&game_state) {
                            log::info!("book move {}", mv.to_uci());
                            println!("bestmove {}", mv.to_uci());
                            continue;
                        }
                    }
                }

                log::info!("starting search with {} threads", num_threads);
                for i in 0..num_threads {
                    let state = game_state.clone();
                    let tt = tt.clone();
                    let params = params.clone();
                    let signals = signals.clone();
                    let is_main = i == 0;
                    let line_count = if is_main { multipv } else { 1 };

                    let builder = thread::Builder::new()
                        .name(format!("search_worker_{}", i))
                        .stack_size(8 * 1024 * 1024);
                    match builder.spawn(move || {
                        let mut data = crate::history::SearchData::new();
                        search::search(
                            &state,
                            limits,
                            &tt,
                            signals,
                            is_main,
                            &mut data,
                            &params,
                            line_count,
                        );
                    }) {
                        Ok(handle) => search_threads.push(handle),
                        Err(e) => eprintln!("Failed to spawn search thread {}: {}", i, e),
                    }
                }
            }
            "ponderhit" => {
                signals.ponder.store(false, Ordering::Relaxed);
            }
            "stop" => {
                signals.ponder.store(false, Ordering::Relaxed);
                stop_workers(&signals, &mut search_threads);
            }
            "setoption" => {
                if let Some((name, value)) = parse_setoption(&parts) {
                    if name.eq_ignore_ascii_case("Hash") {
                        if let Ok(mb) = value.parse::<usize>() {
                            stop_workers(&signals, &mut search_threads);
                            tt = Arc::new(TranspositionTable::new(mb.clamp(1, 4096)));
                        }
                    } else if name.eq_ignore_ascii_case("Threads") {
                        if let Ok(t) = value.parse::<usize>() {
                            num_threads = t.clamp(1, 64);
                        }
                    } else if name.eq_ignore_ascii_case("MultiPV") {
                        if let Ok(n) = value.parse::<usize>() {
                            multipv = n.clamp(1, 8);
                        }
                    } else if name.eq_ignore_ascii_case("Move Overhead") {
                        if let Ok(ov) = value.parse::<u128>() {
                            move_overhead = ov;
                        }
                    } else if name.eq_ignore_ascii_case("Ponder") {
                        // Advertised for GUI bookkeeping; pondering is driven
                        // by "go ponder"/"ponderhit".
                    } else if name.eq_ignore_ascii_case("Book") {
                        if value.is_empty() || value == "<empty>" {
                            book = None;
                        } else {
                            match Book::open(&value) {
                                Ok(b) => book = Some(Arc::new(b)),
                                Err(e) => println!("info string cannot open book: {}", e),
                            }
                        }
                    } else if name.eq_ignore_ascii_case("ParamsFile") {
                        match SearchParameters::load_from_json(&value) {
                            Ok(p) => params = Arc::new(p),
                            Err(e) => println!("info string cannot load parameters: {}", e),
                        }
                    }
                }
            }
            "quit" => {
                stop_workers(&signals, &mut search_threads);
                break;
            }
            _ => {}
        }
    }
}

fn stop_workers(signals: &Arc<SearchSignals>, workers: &mut Vec<thread::JoinHandle<()>>) {
    signals.stop.store(true, Ordering::Relaxed);
    for handle in workers.drain(..) {
        let _ = handle.join();
    }
}

fn parse_setoption(parts: &[&str]) -> Option<(String, String)> {
    if parts.len() < 3 || parts[1] != "name" {
        return None;
    }
    let value_idx = parts.iter().position(|&p| p == "value");
    match value_idx {
        Some(idx) if idx > 2 => {
            let name = parts[2..idx].join(" ");
            let value = parts[idx + 1..].join(" ");
            Some((name, value))
        }
        None => Some((parts[2..].join(" "), String::new())),
        _ => None,
    }
}

/// A malformed position command leaves the previous valid position in place
/// and surfaces the error; nothing is mutated until the whole command parses.
fn handle_position(state: &mut GameState, parts: &[&str]) {
    if parts.len() < 2 {
        return;
    }

    let mut new_state;
    let mut move_index = None;

    if parts[1] == "startpos" {
        new_state = GameState::startpos();
        if parts.len() > 2 && parts[2] == "moves" {
            move_index = Some(3);
        }
    } else if parts[1] == "fen" {
        let mut fen = String::new();
        let mut i = 2;
        while i < parts.len() && parts[i] != "moves" {
            fen.push_str(parts[i]);
            fen.push(' ');
            i += 1;
        }
        match GameState::parse_fen(&fen) {
            Ok(parsed) => new_state = parsed,
            Err(e) => {
                log::warn!("rejected position: {}", e);
                println!("info string invalid fen: {}", e);
                return;
            }
        }
        if i < parts.len() && parts[i] == "moves" {
            move_index = Some(i + 1);
        }
    } else {
        return;
    }

    if let Some(start) = move_index {
        for token in &parts[start..] {
            match parse_move(&new_state, token) {
                Some(mv) => {
                    // Legal by construction of parse_move.
                    new_state.make_move_inplace(mv);
                }
                None => {
                    println!("info string invalid move: {}", token);
                    return;
                }
            }
        }
    }

    *state = new_state;
}

/// Parses a 4-5 character coordinate move against the current legal moves.
pub fn parse_move(state: &GameState, move_str: &str) -> Option<Move> {
    let bytes = move_str.as_bytes();
    if !(4..=5).contains(&bytes.len()) {
        return None;
    }
    if !(b'a'..=b'h').contains(&bytes[0])
        || !(b'1'..=b'8').contains(&bytes[1])
        || !(b'a'..=b'h').contains(&bytes[2])
        || !(b'1'..=b'8').contains(&bytes[3])
    {
        return None;
    }

    let mut gen = MoveGenerator::new();
    gen.generate_moves(state);
    for i in 0..gen.list.count {
        let mv = gen.list.moves[i];
        if mv.to_uci() != move_str {
            continue;
        }
        let mut check = state.clone();
        if check.make_move_inplace(mv) {
            return Some(mv);
        }
    }
    None
}

fn parse_go(side: usize, parts: &[&str], overhead: u128) -> (Limits, bool) {
    let mut depth: Option<u8> = None;
    let mut wtime: Option<u128> = None;
    let mut btime: Option<u128> = None;
    let mut winc: Option<u128> = None;
    let mut binc: Option<u128> = None;
    let mut movestogo: Option<u32> = None;
    let mut movetime: Option<u128> = None;
    let mut nodes: Option<u64> = None;
    let mut infinite = false;
    let mut ponder = false;

    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "depth" => {
                depth = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 1;
            }
            "wtime" => {
                wtime = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 1;
            }
            "btime" => {
                btime = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 1;
            }
            "winc" => {
                winc = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 1;
            }
            "binc" => {
                binc = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 1;
            }
            "movestogo" => {
                movestogo = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 1;
            }
            "movetime" => {
                movetime = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 1;
            }
            "nodes" => {
                nodes = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 1;
            }
            "infinite" => infinite = true,
            "ponder" => ponder = true,
            _ => {}
        }
        i += 1;
    }

    if infinite {
        return (Limits::Infinite, ponder);
    }
    if let Some(n) = nodes {
        return (Limits::FixedNodes(n), ponder);
    }
    if movetime.is_some() || wtime.is_some() || btime.is_some() {
        let tc = if let Some(mt) = movetime {
            TimeControl::MoveTime(mt)
        } else {
            TimeControl::GameTime {
                wtime: wtime.unwrap_or(0),
                btime: btime.unwrap_or(0),
                winc: winc.unwrap_or(0),
                binc: binc.unwrap_or(0),
                moves_to_go: movestogo,
            }
        };
        return (Limits::FixedTime(TimeManager::new(tc, side, overhead)), ponder);
    }
    if let Some(d) = depth {
        return (Limits::FixedDepth(d), ponder);
    }
    (Limits::Infinite, ponder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::START_FEN;

    fn init() {
        crate::zobrist::init_zobrist();
        crate::bitboard::init_magic_tables();
        crate::movegen::init_move_tables();
    }

    #[test]
    fn parse_go_defaults_to_infinite() {
        let (limits, ponder) = parse_go(0, &["go"], 10);
        assert!(matches!(limits, Limits::Infinite));
        assert!(!ponder);
    }

    #[test]
    fn parse_go_depth_and_nodes() {
        let (limits, _) = parse_go(0, &["go", "depth", "10"], 10);
        assert!(matches!(limits, Limits::FixedDepth(10)));
        let (limits, _) = parse_go(0, &["go", "nodes", "5000"], 10);
        assert!(matches!(limits, Limits::FixedNodes(5000)));
    }

    #[test]
    fn parse_go_time_and_ponder() {
        let (limits, ponder) =
            parse_go(0, &["go", "ponder", "wtime", "1000", "btime", "2000"], 10);
        assert!(matches!(limits, Limits::FixedTime(_)));
        assert!(ponder);
    }

    #[test]
    fn parse_move_accepts_only_legal_coordinates() {
        init();
        let state = GameState::startpos();
        assert!(parse_move(&state, "e2e4").is_some());
        assert!(parse_move(&state, "e2e5").is_none());
        assert!(parse_move(&state, "e9e4").is_none());
        assert!(parse_move(&state, "xyz").is_none());
        assert!(parse_move(&state, "e2e4q").is_none());
    }

    #[test]
    fn parse_move_matches_castling_and_promotion() {
        init();
        let castle_pos =
            GameState::parse_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let mv = parse_move(&castle_pos, "e1g1").expect("castling is legal here");
        assert!(mv.is_castle());

        let promo_pos = GameState::parse_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mv = parse_move(&promo_pos, "a7a8q").expect("promotion is legal here");
        assert!(mv.is_promotion());
        assert!(parse_move(&promo_pos, "a7a8").is_none());
    }

    #[test]
    fn handle_position_applies_moves() {
        init();
        let mut state = GameState::startpos();
        handle_position(&mut state, &["position", "startpos", "moves", "e2e4", "e7e5"]);
        assert_eq!(
            state.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
        );
    }

    #[test]
    fn bad_position_leaves_previous_state() {
        init();
        let mut state = GameState::startpos();
        handle_position(
            &mut state,
            &["position", "fen", "rnbqkbnr/ppXppppp/8/8/8/8/PPPPPPPP/RNBQKBNR", "w", "KQkq", "-", "0", "1"],
        );
        assert_eq!(state.to_fen(), START_FEN);

        handle_position(&mut state, &["position", "startpos", "moves", "e2e4", "e7e9"]);
        assert_eq!(state.to_fen(), START_FEN);
    }
}
