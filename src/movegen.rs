#![allow(non_upper_case_globals)]

use crate::bitboard::{self, Bitboard};
use crate::state::{
    color_of, kind_of, r, GameState, Move, B, BLACK, BOTH, FLAG_CASTLE, FLAG_DOUBLE_PUSH,
    FLAG_EN_PASSANT, K, N, NO_PIECE, NO_SQUARE, P, Q, R, WHITE,
};
use std::sync::OnceLock;

// --- PADDED COORDINATE SYSTEM ---
// 10x12 board: two sentinel ranks top and bottom, one sentinel file on each
// side. Ray walks step by fixed offsets and stop on the sentinel border, so
// no wrap-around checks are needed. The two square systems map bijectively
// on the 64 real cells.

pub const OFF_BOARD: i8 = -1;

const fn build_sq64_to_sq120() -> [u8; 64] {
    let mut t = [0u8; 64];
    let mut sq = 0;
    while sq < 64 {
        t[sq] = (21 + (sq % 8) + (sq / 8) * 10) as u8;
        sq += 1;
    }
    t
}

const fn build_sq120_to_sq64() -> [i8; 120] {
    let mut t = [OFF_BOARD; 120];
    let mut sq = 0;
    while sq < 64 {
        t[21 + (sq % 8) + (sq / 8) * 10] = sq as i8;
        sq += 1;
    }
    t
}

pub const SQ64_TO_SQ120: [u8; 64] = build_sq64_to_sq120();
pub const SQ120_TO_SQ64: [i8; 120] = build_sq120_to_sq64();

// Direction offsets in 120-space.
const KNIGHT_DIRS: [i8; 8] = [-21, -19, -12, -8, 8, 12, 19, 21];
const BISHOP_DIRS: [i8; 4] = [-11, -9, 9, 11];
const ROOK_DIRS: [i8; 4] = [-10, -1, 1, 10];
const KING_DIRS: [i8; 8] = [-11, -10, -9, -1, 1, 9, 10, 11];

// --- STEP ATTACK TABLES (bitboard side) ---
static KNIGHT_TABLE: OnceLock<[Bitboard; 64]> = OnceLock::new();
static KING_TABLE: OnceLock<[Bitboard; 64]> = OnceLock::new();

fn knight_table() -> &'static [Bitboard; 64] {
    KNIGHT_TABLE.get_or_init(|| {
        let mut table = [Bitboard(0); 64];
        for square in 0..64 {
            table[square] = bitboard::mask_knight_attacks(square as u8);
        }
        table
    })
}

fn king_table() -> &'static [Bitboard; 64] {
    KING_TABLE.get_or_init(|| {
        let mut table = [Bitboard(0); 64];
        for square in 0..64 {
            table[square] = bitboard::mask_king_attacks(square as u8);
        }
        table
    })
}

pub fn init_move_tables() {
    knight_table();
    king_table();
}

#[inline(always)]
pub fn get_knight_attacks(sq: u8) -> Bitboard {
    knight_table()[sq as usize]
}

#[inline(always)]
pub fn get_king_attacks(sq: u8) -> Bitboard {
    king_table()[sq as usize]
}

// --- MOVE LIST / GENERATOR ---

#[derive(Clone, Copy)]
pub enum GenType {
    All,
    Noisy,
    Quiet,
    NoisyTo(u8),
}

#[derive(Clone, Copy)]
pub struct MoveList {
    pub moves: [Move; 256],
    pub count: usize,
}

impl MoveList {
    pub fn new() -> Self {
        Self { moves: [Move::NONE; 256], count: 0 }
    }

    #[inline(always)]
    pub fn push(&mut self, m: Move) {
        if self.count < 256 {
            self.moves[self.count] = m;
            self.count += 1;
        }
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MoveGenerator {
    pub list: MoveList,
    only_to: Option<u8>,
}

impl MoveGenerator {
    pub fn new() -> Self {
        Self { list: MoveList::new(), only_to: None }
    }

    #[inline(always)]
    fn add_move(&mut self, mv: Move) {
        if let Some(target) = self.only_to {
            if mv.to() != target {
                return;
            }
        }
        self.list.push(mv);
    }

    pub fn generate_moves(&mut self, state: &GameState) {
        self.generate_moves_type(state, GenType::All);
    }

    pub fn generate_moves_type(&mut self, state: &GameState, gen: GenType) {
        let (want_noisy, want_quiet) = match gen {
            GenType::All => (true, true),
            GenType::Noisy => (true, false),
            GenType::Quiet => (false, true),
            GenType::NoisyTo(target) => {
                self.only_to = Some(target);
                (true, false)
            }
        };

        let side = state.side_to_move;
        self.gen_pawns(state, side, want_noisy, want_quiet);
        self.gen_steppers(state, N + side * 6, &KNIGHT_DIRS, want_noisy, want_quiet);
        self.gen_sliders(state, B + side * 6, &BISHOP_DIRS, want_noisy, want_quiet);
        self.gen_sliders(state, R + side * 6, &ROOK_DIRS, want_noisy, want_quiet);
        self.gen_sliders(state, Q + side * 6, &BISHOP_DIRS, want_noisy, want_quiet);
        self.gen_sliders(state, Q + side * 6, &ROOK_DIRS, want_noisy, want_quiet);
        self.gen_steppers(state, K + side * 6, &KING_DIRS, want_noisy, want_quiet);
        if want_quiet {
            self.gen_castling(state, side);
        }

        self.only_to = None;
    }

    fn gen_pawns(&mut self, state: &GameState, side: usize, want_noisy: bool, want_quiet: bool) {
        let pawn = P + side * 6;
        let enemy = side ^ 1;
        let (push_dir, start_rank, promo_rank) =
            if side == WHITE { (10i8, 1, 6) } else { (-10i8, 6, 1) };
        let cap_dirs: [i8; 2] = if side == WHITE { [9, 11] } else { [-9, -11] };

        for i in 0..state.piece_counts[pawn] as usize {
            let from = state.piece_lists[pawn][i];
            let from120 = SQ64_TO_SQ120[from as usize] as i8;
            let rank = from / 8;

            // Pushes
            let t64 = SQ120_TO_SQ64[(from120 + push_dir) as usize];
            debug_assert!(t64 != OFF_BOARD);
            let to = t64 as u8;
            if state.piece_on(to) == NO_PIECE {
                if rank == promo_rank {
                    self.add_promotions(from, to, NO_PIECE, side, want_noisy, want_quiet);
                } else if want_quiet {
                    self.add_move(Move::new(from, to, NO_PIECE, NO_PIECE, 0));
                    if rank == start_rank {
                        let to2 = SQ120_TO_SQ64[(from120 + 2 * push_dir) as usize] as u8;
                        if state.piece_on(to2) == NO_PIECE {
                            self.add_move(Move::new(from, to2, NO_PIECE, NO_PIECE, FLAG_DOUBLE_PUSH));
                        }
                    }
                }
            }

            // Captures and en passant
            for d in cap_dirs {
                let t64 = SQ120_TO_SQ64[(from120 + d) as usize];
                if t64 == OFF_BOARD {
                    continue;
                }
                let to = t64 as u8;
                let victim = state.piece_on(to);
                if victim != NO_PIECE {
                    if color_of(victim) == enemy && kind_of(victim) != K && want_noisy {
                        if rank == promo_rank {
                            self.add_promotions(from, to, victim, side, want_noisy, false);
                        } else {
                            self.add_move(Move::new(from, to, victim, NO_PIECE, 0));
                        }
                    }
                } else if to == state.en_passant && state.en_passant != NO_SQUARE && want_noisy {
                    self.add_move(Move::new(from, to, NO_PIECE, NO_PIECE, FLAG_EN_PASSANT));
                }
            }
        }
    }

    // Queen promotions count as noisy; underpromotion pushes stay with the
    // quiets, underpromotion captures travel with the captures.
    fn add_promotions(
        &mut self,
        from: u8,
        to: u8,
        captured: usize,
        side: usize,
        want_noisy: bool,
        want_quiet: bool,
    ) {
        if want_noisy {
            self.add_move(Move::new(from, to, captured, Q + side * 6, 0));
        }
        if captured != NO_PIECE {
            if want_noisy {
                for promo in [N, B, R] {
                    self.add_move(Move::new(from, to, captured, promo + side * 6, 0));
                }
            }
        } else if want_quiet {
            for promo in [N, B, R] {
                self.add_move(Move::new(from, to, captured, promo + side * 6, 0));
            }
        }
    }

    fn gen_steppers(
        &mut self,
        state: &GameState,
        piece: usize,
        dirs: &[i8],
        want_noisy: bool,
        want_quiet: bool,
    ) {
        let side = color_of(piece);
        let enemy = side ^ 1;
        for i in 0..state.piece_counts[piece] as usize {
            let from = state.piece_lists[piece][i];
            let from120 = SQ64_TO_SQ120[from as usize] as i8;
            for &d in dirs {
                let t64 = SQ120_TO_SQ64[(from120 + d) as usize];
                if t64 == OFF_BOARD {
                    continue;
                }
                let to = t64 as u8;
                let victim = state.piece_on(to);
                if victim == NO_PIECE {
                    if want_quiet {
                        self.add_move(Move::new(from, to, NO_PIECE, NO_PIECE, 0));
                    }
                } else if color_of(victim) == enemy && kind_of(victim) != K && want_noisy {
                    self.add_move(Move::new(from, to, victim, NO_PIECE, 0));
                }
            }
        }
    }

    fn gen_sliders(
        &mut self,
        state: &GameState,
        piece: usize,
        dirs: &[i8],
        want_noisy: bool,
        want_quiet: bool,
    ) {
        let side = color_of(piece);
        let enemy = side ^ 1;
        for i in 0..state.piece_counts[piece] as usize {
            let from = state.piece_lists[piece][i];
            let from120 = SQ64_TO_SQ120[from as usize] as i8;
            for &d in dirs {
                let mut t120 = from120 as i16 + d as i16;
                loop {
                    let t64 = SQ120_TO_SQ64[t120 as usize];
                    if t64 == OFF_BOARD {
                        break;
                    }
                    let to = t64 as u8;
                    let victim = state.piece_on(to);
                    if victim == NO_PIECE {
                        if want_quiet {
                            self.add_move(Move::new(from, to, NO_PIECE, NO_PIECE, 0));
                        }
                    } else {
                        if color_of(victim) == enemy && kind_of(victim) != K && want_noisy {
                            self.add_move(Move::new(from, to, victim, NO_PIECE, 0));
                        }
                        break;
                    }
                    t120 += d as i16;
                }
            }
        }
    }

    // Castling rights, empty path and un-attacked traversed squares are all
    // checked against the pre-move board; the landing square is covered by
    // the trial-make legality filter.
    fn gen_castling(&mut self, state: &GameState, side: usize) {
        if side == WHITE {
            if state.castling_rights & 1 != 0
                && state.piece_on(5) == NO_PIECE
                && state.piece_on(6) == NO_PIECE
                && !is_square_attacked(state, 4, BLACK)
                && !is_square_attacked(state, 5, BLACK)
            {
                self.add_move(Move::new(4, 6, NO_PIECE, NO_PIECE, FLAG_CASTLE));
            }
            if state.castling_rights & 2 != 0
                && state.piece_on(1) == NO_PIECE
                && state.piece_on(2) == NO_PIECE
                && state.piece_on(3) == NO_PIECE
                && !is_square_attacked(state, 4, BLACK)
                && !is_square_attacked(state, 3, BLACK)
            {
                self.add_move(Move::new(4, 2, NO_PIECE, NO_PIECE, FLAG_CASTLE));
            }
        } else {
            if state.castling_rights & 4 != 0
                && state.piece_on(61) == NO_PIECE
                && state.piece_on(62) == NO_PIECE
                && !is_square_attacked(state, 60, WHITE)
                && !is_square_attacked(state, 61, WHITE)
            {
                self.add_move(Move::new(60, 62, NO_PIECE, NO_PIECE, FLAG_CASTLE));
            }
            if state.castling_rights & 8 != 0
                && state.piece_on(57) == NO_PIECE
                && state.piece_on(58) == NO_PIECE
                && state.piece_on(59) == NO_PIECE
                && !is_square_attacked(state, 60, WHITE)
                && !is_square_attacked(state, 59, WHITE)
            {
                self.add_move(Move::new(60, 58, NO_PIECE, NO_PIECE, FLAG_CASTLE));
            }
        }
    }
}

impl Default for MoveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// --- ATTACK DETECTION (bitboard side) ---

pub fn is_square_attacked(state: &GameState, square: u8, attacker_side: usize) -> bool {
    let base = attacker_side * 6;

    let pawns = state.bitboards[P + base];
    if !(bitboard::pawn_attacks(Bitboard(1u64 << square), attacker_side ^ 1) & pawns).is_empty() {
        return true;
    }
    if !(get_knight_attacks(square) & state.bitboards[N + base]).is_empty() {
        return true;
    }
    if !(get_king_attacks(square) & state.bitboards[K + base]).is_empty() {
        return true;
    }

    let occupancy = state.occupancies[BOTH];
    let rooks = state.bitboards[R + base] | state.bitboards[Q + base];
    if !(bitboard::get_rook_attacks(square, occupancy) & rooks).is_empty() {
        return true;
    }
    let bishops = state.bitboards[B + base] | state.bitboards[Q + base];
    if !(bitboard::get_bishop_attacks(square, occupancy) & bishops).is_empty() {
        return true;
    }
    false
}

pub fn is_check(state: &GameState, side: usize) -> bool {
    is_square_attacked(state, state.king_square(side), side ^ 1)
}

#[inline(always)]
pub fn in_check(state: &GameState) -> bool {
    is_check(state, state.side_to_move)
}

// --- PSEUDO-LEGALITY ---

#[inline(always)]
fn aligned_ortho(from: u8, to: u8) -> bool {
    from / 8 == to / 8 || from % 8 == to % 8
}

#[inline(always)]
fn aligned_diag(from: u8, to: u8) -> bool {
    (from / 8).abs_diff(to / 8) == (from % 8).abs_diff(to % 8)
}

/// Geometric validation for externally sourced moves (transposition table,
/// killers, counter moves). A move that passes is safe to hand to
/// `make_move_inplace`, which still applies the king-safety filter.
pub fn is_pseudo_legal(state: &GameState, mv: Move) -> bool {
    if mv == Move::NONE {
        return false;
    }
    let from = mv.from();
    let to = mv.to();
    if from == to {
        return false;
    }
    let piece = state.piece_on(from);
    if piece == NO_PIECE || color_of(piece) != state.side_to_move {
        return false;
    }
    let side = state.side_to_move;
    let kind = kind_of(piece);

    if mv.is_en_passant() {
        if kind != P
            || state.en_passant == NO_SQUARE
            || to != state.en_passant
            || mv.captured() != NO_PIECE
            || mv.is_promotion()
            || mv.is_castle()
            || mv.is_double_push()
        {
            return false;
        }
        let fwd = if side == WHITE { 8i8 } else { -8 };
        let diff = to as i8 - from as i8;
        if (diff != fwd - 1 && diff != fwd + 1) || (to % 8).abs_diff(from % 8) != 1 {
            return false;
        }
        let cap_sq = if side == WHITE { to - 8 } else { to + 8 };
        return state.piece_on(cap_sq) == P + (side ^ 1) * 6;
    }

    if mv.captured() != state.piece_on(to) {
        return false;
    }
    if mv.captured() != NO_PIECE
        && (color_of(mv.captured()) == side || kind_of(mv.captured()) == K)
    {
        return false;
    }

    if mv.is_castle() {
        if kind != K || mv.is_capture() || mv.is_promotion() {
            return false;
        }
        return match (side, from, to) {
            (WHITE, 4, 6) => {
                state.castling_rights & 1 != 0
                    && state.piece_on(5) == NO_PIECE
                    && state.piece_on(6) == NO_PIECE
                    && state.piece_on(7) == R
                    && !is_square_attacked(state, 4, BLACK)
                    && !is_square_attacked(state, 5, BLACK)
            }
            (WHITE, 4, 2) => {
                state.castling_rights & 2 != 0
                    && state.piece_on(1) == NO_PIECE
                    && state.piece_on(2) == NO_PIECE
                    && state.piece_on(3) == NO_PIECE
                    && state.piece_on(0) == R
                    && !is_square_attacked(state, 4, BLACK)
                    && !is_square_attacked(state, 3, BLACK)
            }
            (BLACK, 60, 62) => {
                state.castling_rights & 4 != 0
                    && state.piece_on(61) == NO_PIECE
                    && state.piece_on(62) == NO_PIECE
                    && state.piece_on(63) == r
                    && !is_square_attacked(state, 60, WHITE)
                    && !is_square_attacked(state, 61, WHITE)
            }
            (BLACK, 60, 58) => {
                state.castling_rights & 8 != 0
                    && state.piece_on(57) == NO_PIECE
                    && state.piece_on(58) == NO_PIECE
                    && state.piece_on(59) == NO_PIECE
                    && state.piece_on(56) == r
                    && !is_square_attacked(state, 60, WHITE)
                    && !is_square_attacked(state, 59, WHITE)
            }
            _ => false,
        };
    }

    if mv.is_promotion() {
        let promo = mv.promoted();
        if kind != P
            || color_of(promo) != side
            || kind_of(promo) == P
            || kind_of(promo) == K
        {
            return false;
        }
        let to_rank = to / 8;
        if (side == WHITE && to_rank != 7) || (side == BLACK && to_rank != 0) {
            return false;
        }
    } else if kind == P && (to / 8 == 7 || to / 8 == 0) {
        return false;
    }

    let occ = state.occupancies[BOTH];
    match kind {
        P => {
            let fwd = if side == WHITE { 8i8 } else { -8 };
            let diff = to as i8 - from as i8;
            if mv.is_double_push() {
                let start_rank = if side == WHITE { 1 } else { 6 };
                let mid = (from as i8 + fwd) as u8;
                return diff == 2 * fwd
                    && from / 8 == start_rank
                    && mv.captured() == NO_PIECE
                    && state.piece_on(mid) == NO_PIECE
                    && state.piece_on(to) == NO_PIECE;
            }
            if diff == fwd {
                return mv.captured() == NO_PIECE;
            }
            if diff == fwd - 1 || diff == fwd + 1 {
                return (to % 8).abs_diff(from % 8) == 1 && mv.captured() != NO_PIECE;
            }
            false
        }
        N => get_knight_attacks(from).get_bit(to),
        K => get_king_attacks(from).get_bit(to),
        B => aligned_diag(from, to) && (bitboard::between(from, to) & occ).is_empty(),
        R => aligned_ortho(from, to) && (bitboard::between(from, to) & occ).is_empty(),
        _ => {
            (aligned_diag(from, to) || aligned_ortho(from, to))
                && (bitboard::between(from, to) & occ).is_empty()
        }
    }
}

/// Rehydrates a 16-bit table move against the current board, inferring the
/// captured piece and special flags from the mailbox. Collision garbage is
/// filtered by the pseudo-legality gate.
pub fn move_from_tt(state: &GameState, data: u16) -> Option<Move> {
    if data == 0 {
        return None;
    }
    let from = (data & 0x3F) as u8;
    let to = ((data >> 6) & 0x3F) as u8;
    let promo_kind = ((data >> 12) & 0xF) as usize;

    let piece = state.piece_on(from);
    if piece == NO_PIECE {
        return None;
    }
    let side = color_of(piece);
    let kind = kind_of(piece);

    let mut promoted = NO_PIECE;
    if promo_kind != 0 {
        if kind != P || promo_kind == P || promo_kind >= K {
            return None;
        }
        promoted = promo_kind + side * 6;
    }

    let mut captured = state.piece_on(to);
    let mut flags = 0u32;
    if kind == P
        && state.en_passant != NO_SQUARE
        && to == state.en_passant
        && captured == NO_PIECE
        && (to % 8).abs_diff(from % 8) == 1
    {
        flags |= FLAG_EN_PASSANT;
        captured = NO_PIECE;
    } else if kind == P && (to as i8 - from as i8).abs() == 16 {
        flags |= FLAG_DOUBLE_PUSH;
    } else if kind == K && (to as i8 - from as i8).abs() == 2 {
        if captured != NO_PIECE {
            return None;
        }
        flags |= FLAG_CASTLE;
    }

    let mv = Move::new(from, to, captured, promoted, flags);
    if is_pseudo_legal(state, mv) {
        Some(mv)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        crate::zobrist::init_zobrist();
        crate::bitboard::init_magic_tables();
        init_move_tables();
    }

    #[test]
    fn square_mapping_is_bijective() {
        for sq in 0..64usize {
            let sq120 = SQ64_TO_SQ120[sq] as usize;
            assert_eq!(SQ120_TO_SQ64[sq120] as usize, sq);
        }
        let real: Vec<usize> =
            (0..120).filter(|&i| SQ120_TO_SQ64[i] != OFF_BOARD).collect();
        assert_eq!(real.len(), 64);
    }

    #[test]
    fn startpos_has_twenty_moves() {
        init();
        let state = GameState::startpos();
        let mut gen = MoveGenerator::new();
        gen.generate_moves(&state);
        assert_eq!(gen.list.count, 20);
    }

    #[test]
    fn noisy_and_quiet_partition_all() {
        init();
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        ];
        for fen in fens {
            let state = GameState::parse_fen(fen).unwrap();
            let mut all = MoveGenerator::new();
            all.generate_moves(&state);
            let mut noisy = MoveGenerator::new();
            noisy.generate_moves_type(&state, GenType::Noisy);
            let mut quiet = MoveGenerator::new();
            quiet.generate_moves_type(&state, GenType::Quiet);

            assert_eq!(all.list.count, noisy.list.count + quiet.list.count, "{}", fen);
            for i in 0..noisy.list.count {
                let mv = noisy.list.moves[i];
                assert!(
                    mv.is_capture() || kind_of(mv.promoted()) == Q,
                    "unexpected noisy {:?}",
                    mv
                );
            }
            for i in 0..quiet.list.count {
                assert!(!quiet.list.moves[i].is_capture());
            }
        }
    }

    #[test]
    fn target_restricted_generation() {
        init();
        let state =
            GameState::parse_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        let target = 44; // e6, capturable by the d5 pawn
        let mut gen = MoveGenerator::new();
        gen.generate_moves_type(&state, GenType::NoisyTo(target));
        assert!(gen.list.count > 0);
        for i in 0..gen.list.count {
            assert_eq!(gen.list.moves[i].to(), target);
            assert!(gen.list.moves[i].is_capture());
        }
        let mut noisy = MoveGenerator::new();
        noisy.generate_moves_type(&state, GenType::Noisy);
        let filtered = (0..noisy.list.count)
            .filter(|&i| noisy.list.moves[i].to() == target)
            .count();
        assert_eq!(gen.list.count, filtered);
    }

    #[test]
    fn generated_moves_are_pseudo_legal() {
        init();
        let fens = [
            crate::state::START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        ];
        for fen in fens {
            let state = GameState::parse_fen(fen).unwrap();
            let mut gen = MoveGenerator::new();
            gen.generate_moves(&state);
            for i in 0..gen.list.count {
                let mv = gen.list.moves[i];
                assert!(is_pseudo_legal(&state, mv), "{:?} on {}", mv, fen);
                // Round-trip through the 16-bit TT projection.
                let back = move_from_tt(&state, mv.to_tt());
                assert_eq!(back, Some(mv), "tt round trip {:?} on {}", mv, fen);
            }
        }
    }

    #[test]
    fn tt_garbage_is_rejected() {
        init();
        let state = GameState::startpos();
        // b1 -> b3 (knight moving like a rook)
        assert!(move_from_tt(&state, 1 | (17 << 6)).is_none());
        // empty source square e4 -> e5
        assert!(move_from_tt(&state, 28 | (36 << 6)).is_none());
        // bishop jump c1 -> h6
        assert!(move_from_tt(&state, 2 | (47 << 6)).is_none());
    }
}
