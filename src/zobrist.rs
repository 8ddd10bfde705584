use crate::bitboard::Random;
use std::sync::OnceLock;

// --- ZOBRIST KEY MATERIAL ---
// Generated once from a fixed seed so keys are identical across runs and
// threads; the incremental board key and the book key variant both draw
// from this table.
pub struct ZobristKeys {
    // [piece][square]
    pub piece: [[u64; 64]; 12],
    // [castling-rights mask]
    pub castling: [u64; 16],
    // [file]
    pub en_passant: [u64; 8],
    // black to move
    pub side: u64,
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

pub fn init_zobrist() {
    keys();
    log::info!("Zobrist keys initialized.");
}

pub fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(|| {
        let mut rng = Random::new(1070372);
        let mut piece = [[0u64; 64]; 12];
        for p in piece.iter_mut() {
            for sq in p.iter_mut() {
                *sq = rng.get_u64();
            }
        }
        let mut castling = [0u64; 16];
        for key in castling.iter_mut() {
            *key = rng.get_u64();
        }
        let mut en_passant = [0u64; 8];
        for key in en_passant.iter_mut() {
            *key = rng.get_u64();
        }
        let side = rng.get_u64();
        ZobristKeys { piece, castling, en_passant, side }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_stable_and_distinct() {
        let k1 = keys();
        let k2 = keys();
        assert_eq!(k1.piece[0][0], k2.piece[0][0]);
        assert_ne!(k1.side, 0);
        // No duplicates across a sample of the table.
        let mut seen = std::collections::HashSet::new();
        for p in 0..12 {
            for sq in 0..64 {
                assert!(seen.insert(k1.piece[p][sq]), "duplicate key at {}/{}", p, sq);
            }
        }
    }
}
