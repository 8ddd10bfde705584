pub mod bitboard;
pub mod book;
pub mod debug;
pub mod eval;
pub mod history;
pub mod logging;
pub mod movegen;
pub mod parameters;
pub mod perft;
pub mod search;
pub mod see;
pub mod state;
pub mod time;
pub mod tt;
pub mod uci;
pub mod zobrist;

use std::env;
use std::thread;

pub fn run_cli() {
    logging::init_logging();

    // Global table initialization, once per process.
    zobrist::init_zobrist();
    bitboard::init_magic_tables();
    movegen::init_move_tables();

    let args: Vec<String> = env::args().collect();
    if args.len() > 1 && args[1] == "perft" {
        perft::run_perft_suite();
        return;
    }

    // Deep searches recurse; give the UCI driver a roomy stack.
    let builder = thread::Builder::new()
        .name("uci_thread".into())
        .stack_size(32 * 1024 * 1024);

    let handler = builder
        .spawn(|| {
            uci::uci_loop();
        })
        .expect("failed to spawn UCI thread");

    handler.join().expect("UCI thread panicked");
}
