#[cfg(debug_assertions)]
use crate::state::{GameState, NO_PIECE};

/// Hard-stops on any disagreement between the mailbox, the bitboards and the
/// piece lists, dumping the offending position. Compiled out of release
/// builds; never called on the search hot path.
#[cfg(debug_assertions)]
pub fn validate_board_consistency(state: &GameState) {
    if state.is_consistent() {
        return;
    }

    eprintln!("CRITICAL: board representation mismatch");
    eprintln!("FEN: {}", state.to_fen());
    eprintln!("Key: {:016x} (recomputed {:016x})", state.hash, state.compute_hash());
    eprintln!("Mailbox:");
    for rank in (0..8).rev() {
        for file in 0..8 {
            let piece = state.piece_on(rank * 8 + file);
            let c = if piece == NO_PIECE {
                '.'
            } else {
                ['P', 'N', 'B', 'R', 'Q', 'K', 'p', 'n', 'b', 'r', 'q', 'k'][piece]
            };
            eprint!("{} ", c);
        }
        eprintln!();
    }
    for piece in 0..12 {
        eprintln!(
            "piece {}: bitboard {:016x}, list count {}",
            piece, state.bitboards[piece].0, state.piece_counts[piece]
        );
    }
    panic!("board inconsistency detected");
}

#[cfg(not(debug_assertions))]
pub fn validate_board_consistency(_state: &crate::state::GameState) {}
