use crate::movegen::MoveGenerator;
use crate::state::{kind_of, GameState, Move, K, NO_SQUARE, P, WHITE};
use crate::zobrist;
use rand::Rng;
use std::fs;
use std::io;

// Book records are fixed 16-byte big-endian rows sorted by key:
//   8-byte position key, 2-byte packed move, 2-byte weight, 4-byte learn.
const ENTRY_SIZE: usize = 16;

#[derive(Clone, Copy, Debug)]
pub struct BookEntry {
    pub key: u64,
    pub mv: u16,
    pub weight: u16,
}

pub struct Book {
    entries: Vec<BookEntry>,
}

impl Book {
    pub fn open(path: &str) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let mut entries = Vec::with_capacity(bytes.len() / ENTRY_SIZE);
        for chunk in bytes.chunks_exact(ENTRY_SIZE) {
            entries.push(BookEntry {
                key: u64::from_be_bytes(chunk[0..8].try_into().unwrap()),
                mv: u16::from_be_bytes(chunk[8..10].try_into().unwrap()),
                weight: u16::from_be_bytes(chunk[10..12].try_into().unwrap()),
            });
        }
        log::info!("Book loaded: {} entries from {}", entries.len(), path);
        Ok(Book { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks the position up by key and returns a legal move, weighted
    /// randomly among the matching entries. The core depends only on this
    /// contract, not on how the file was produced.
    pub fn probe(&self, state: &GameState) -> Option<Move> {
        let key = book_key(state);
        let start = self.entries.partition_point(|e| e.key < key);
        let matches: Vec<&BookEntry> =
            self.entries[start..].iter().take_while(|e| e.key == key).collect();
        if matches.is_empty() {
            return None;
        }

        let total: u32 = matches.iter().map(|e| e.weight as u32).sum();
        let mut pick = if total > 0 { rand::thread_rng().gen_range(0..total) } else { 0 };
        let mut chosen = matches[0];
        for entry in &matches {
            let w = (entry.weight as u32).max(if total == 0 { 1 } else { 0 });
            if pick < w {
                chosen = entry;
                break;
            }
            pick -= w;
        }

        decode_book_move(state, chosen.mv)
    }
}

// Packed book move: to-file 0..3, to-row 3..6, from-file 6..9, from-row
// 9..12, promotion kind 12..15 (0 none, 1 knight .. 4 queen). Castling is
// encoded king-to-rook-square and mapped back to the king's real target.
fn decode_book_move(state: &GameState, packed: u16) -> Option<Move> {
    let to_file = (packed & 7) as u8;
    let to_row = ((packed >> 3) & 7) as u8;
    let from_file = ((packed >> 6) & 7) as u8;
    let from_row = ((packed >> 9) & 7) as u8;
    let promo_kind = ((packed >> 12) & 7) as usize;

    let from = from_row * 8 + from_file;
    let mut to = to_row * 8 + to_file;

    if kind_of(state.piece_on(from)) == K {
        to = match (from, to) {
            (4, 7) => 6,
            (4, 0) => 2,
            (60, 63) => 62,
            (60, 56) => 58,
            _ => to,
        };
    }

    let mut gen = MoveGenerator::new();
    gen.generate_moves(state);
    for i in 0..gen.list.count {
        let mv = gen.list.moves[i];
        if mv.from() != from || mv.to() != to {
            continue;
        }
        let mv_promo = if mv.is_promotion() { kind_of(mv.promoted()) } else { 0 };
        if mv_promo != promo_kind {
            continue;
        }
        // Only a currently legal move leaves the book.
        let mut check = state.clone();
        if check.make_move_inplace(mv) {
            check.unmake_move(mv);
            return Some(mv);
        }
    }
    None
}

/// Book-compatible key variant: same fixed-seed material as the board key,
/// arranged on the book schema: per-right castling keys, white-to-move side
/// key, and the en-passant file hashed only when a capture is actually
/// possible.
pub fn book_key(state: &GameState) -> u64 {
    let keys = zobrist::keys();
    let mut h = 0u64;

    for piece in 0..12 {
        let mut bb = state.bitboards[piece];
        while !bb.is_empty() {
            let sq = bb.pop_lsb();
            h ^= keys.piece[piece][sq as usize];
        }
    }

    for right in [1u8, 2, 4, 8] {
        if state.castling_rights & right != 0 {
            h ^= keys.castling[right as usize];
        }
    }

    if state.en_passant != NO_SQUARE && en_passant_capturable(state) {
        h ^= keys.en_passant[(state.en_passant % 8) as usize];
    }

    if state.side_to_move == WHITE {
        h ^= keys.side;
    }

    h
}

fn en_passant_capturable(state: &GameState) -> bool {
    let ep = state.en_passant;
    let file = ep % 8;
    let pawn = P + state.side_to_move * 6;
    let (left, right) = if state.side_to_move == WHITE {
        (ep.wrapping_sub(9), ep.wrapping_sub(7))
    } else {
        (ep + 7, ep + 9)
    };
    (file > 0 && left < 64 && state.piece_on(left) == pawn)
        || (file < 7 && right < 64 && state.piece_on(right) == pawn)
}
