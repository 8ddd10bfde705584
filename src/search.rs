use crate::eval;
use crate::history::SearchData;
use crate::movegen::{self, GenType, MoveGenerator, MoveList};
use crate::parameters::SearchParameters;
use crate::see;
use crate::state::{GameState, Move, NO_PIECE};
use crate::time::TimeManager;
use crate::tt::{TranspositionTable, FLAG_ALPHA, FLAG_BETA, FLAG_EXACT};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub const MAX_PLY: usize = 128;
pub const INFINITY: i32 = 32000;
pub const MATE_VALUE: i32 = 31000;
pub const MATE_SCORE: i32 = 30000;

// Largest swing quiescence can recover: a queen plus promotion upside.
const QS_DELTA_MARGIN: i32 = 1100;
const QS_MOVE_MARGIN: i32 = 200;

// --- SHARED SIGNAL REGION ---
// The only cross-thread state besides the transposition table. Polled on the
// node-count interval, never waited on.
pub struct SearchSignals {
    pub stop: AtomicBool,
    pub ponder: AtomicBool,
}

impl SearchSignals {
    pub fn new() -> Self {
        Self { stop: AtomicBool::new(false), ponder: AtomicBool::new(false) }
    }
}

impl Default for SearchSignals {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub enum Limits {
    Infinite,
    FixedDepth(u8),
    FixedNodes(u64),
    FixedTime(TimeManager),
}

// --- PER-THREAD SEARCH STATE ---
pub struct SearchInfo<'a> {
    pub data: &'a mut SearchData,
    pub tt: &'a TranspositionTable,
    pub params: &'a SearchParameters,
    pub limits: Limits,
    pub signals: Arc<SearchSignals>,
    pub main_thread: bool,
    pub stopped: bool,
    pub nodes: u64,
    pub seldepth: u8,
    eval_stack: [i32; MAX_PLY + 2],
    move_stack: [(usize, Move); MAX_PLY + 2],
    start_time: Instant,
    pv_index: usize,
    root_excluded: Vec<Move>,
    root_best: Move,
    last_currmove_ms: u128,
}

impl<'a> SearchInfo<'a> {
    pub fn new(
        data: &'a mut SearchData,
        limits: Limits,
        signals: Arc<SearchSignals>,
        tt: &'a TranspositionTable,
        params: &'a SearchParameters,
        main_thread: bool,
    ) -> Self {
        Self {
            data,
            tt,
            params,
            limits,
            signals,
            main_thread,
            stopped: false,
            nodes: 0,
            seldepth: 0,
            eval_stack: [0; MAX_PLY + 2],
            move_stack: [(NO_PIECE, Move::NONE); MAX_PLY + 2],
            start_time: Instant::now(),
            pv_index: 0,
            root_excluded: Vec::new(),
            root_best: Move::NONE,
            last_currmove_ms: 0,
        }
    }

    /// (piece, target) of the move made `back` plies above this node; None
    /// across a null move or the root boundary.
    #[inline(always)]
    fn prev_move(&self, ply: usize, back: usize) -> Option<(usize, u8)> {
        if ply < back {
            return None;
        }
        let (piece, mv) = self.move_stack[ply - back];
        if mv == Move::NONE || piece == NO_PIECE {
            None
        } else {
            Some((piece, mv.to()))
        }
    }

    #[inline(always)]
    pub fn check_time(&mut self) {
        if self.signals.stop.load(Ordering::Relaxed) {
            self.stopped = true;
            return;
        }
        if self.signals.ponder.load(Ordering::Relaxed) {
            return;
        }
        match &self.limits {
            Limits::FixedNodes(limit) => {
                if self.nodes >= *limit {
                    self.stopped = true;
                    self.signals.stop.store(true, Ordering::Relaxed);
                }
            }
            Limits::FixedTime(tm) => {
                if self.main_thread && tm.check_hard_limit() {
                    self.stopped = true;
                    self.signals.stop.store(true, Ordering::Relaxed);
                }
            }
            Limits::FixedDepth(_) | Limits::Infinite => {}
        }
    }
}

// --- STAGED MOVE PICKER ---

#[derive(Clone, Copy, PartialEq, Eq)]
enum PickerStage {
    Table,
    GenerateNoisy,
    GoodNoisy,
    Killer1,
    Killer2,
    CounterMove,
    GenerateQuiet,
    Quiet,
    BadNoisy,
    Done,
}

/// Emits moves in priority order, generating and scoring each class only
/// when the previous one is exhausted. No move is produced twice within one
/// sequence: the table move is skipped wherever it reappears, killer and
/// counter slots are nulled on collision, and the quiet stage skips any
/// surviving special slot.
pub struct MovePicker {
    stage: PickerStage,
    tt_move: Move,
    killer1: Move,
    killer2: Move,
    counter: Move,
    list: MoveList,
    scores: [i32; 256],
    index: usize,
    bad_noisy: [Move; 96],
    bad_count: usize,
    bad_index: usize,
    see_threshold: i32,
    noisy_only: bool,
    prev: Option<(usize, u8)>,
    followup: Option<(usize, u8)>,
    pub skip_quiets: bool,
}

impl MovePicker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        data: &SearchData,
        ply: usize,
        tt_move: Move,
        see_threshold: i32,
        noisy_only: bool,
        prev: Option<(usize, u8)>,
        followup: Option<(usize, u8)>,
    ) -> Self {
        let mut killer1 = Move::NONE;
        let mut killer2 = Move::NONE;
        let mut counter = Move::NONE;

        if !noisy_only && ply < MAX_PLY {
            killer1 = data.killers[ply][0];
            killer2 = data.killers[ply][1];
            if let Some((p_piece, p_to)) = prev {
                counter = data.counter_moves[p_piece][p_to as usize];
            }
            if killer1 == tt_move {
                killer1 = Move::NONE;
            }
            if killer2 == tt_move || killer2 == killer1 {
                killer2 = Move::NONE;
            }
            if counter == tt_move || counter == killer1 || counter == killer2 {
                counter = Move::NONE;
            }
        }

        Self {
            stage: if tt_move != Move::NONE { PickerStage::Table } else { PickerStage::GenerateNoisy },
            tt_move,
            killer1,
            killer2,
            counter,
            list: MoveList::new(),
            scores: [0; 256],
            index: 0,
            bad_noisy: [Move::NONE; 96],
            bad_count: 0,
            bad_index: 0,
            see_threshold,
            noisy_only,
            prev,
            followup,
            skip_quiets: false,
        }
    }

    fn pick_best(&mut self) -> Option<Move> {
        if self.index >= self.list.count {
            return None;
        }
        let mut best_idx = self.index;
        for i in self.index + 1..self.list.count {
            if self.scores[i] > self.scores[best_idx] {
                best_idx = i;
            }
        }
        self.list.moves.swap(self.index, best_idx);
        self.scores.swap(self.index, best_idx);
        let mv = self.list.moves[self.index];
        self.index += 1;
        Some(mv)
    }

    pub fn next(&mut self, state: &GameState, data: &SearchData) -> Option<Move> {
        loop {
            match self.stage {
                PickerStage::Table => {
                    self.stage = PickerStage::GenerateNoisy;
                    // The table move was already validated pseudo-legal when
                    // it was rehydrated.
                    if self.tt_move != Move::NONE && !(self.noisy_only && self.tt_move.is_quiet()) {
                        return Some(self.tt_move);
                    }
                }
                PickerStage::GenerateNoisy => {
                    let mut gen = MoveGenerator::new();
                    gen.generate_moves_type(state, GenType::Noisy);
                    self.list = gen.list;
                    self.index = 0;
                    for i in 0..self.list.count {
                        self.scores[i] = data.capture_score(state, self.list.moves[i]);
                    }
                    self.stage = PickerStage::GoodNoisy;
                }
                PickerStage::GoodNoisy => match self.pick_best() {
                    Some(mv) => {
                        if mv == self.tt_move {
                            continue;
                        }
                        // Lazily re-verified split: only the move about to be
                        // emitted pays for an exchange evaluation.
                        if see::see_ge(state, mv, self.see_threshold) {
                            return Some(mv);
                        }
                        if self.bad_count < self.bad_noisy.len() {
                            self.bad_noisy[self.bad_count] = mv;
                            self.bad_count += 1;
                        }
                    }
                    None => {
                        self.stage =
                            if self.noisy_only { PickerStage::Done } else { PickerStage::Killer1 };
                    }
                },
                PickerStage::Killer1 => {
                    self.stage = PickerStage::Killer2;
                    if !self.skip_quiets {
                        let mv = self.killer1;
                        if mv != Move::NONE && mv.is_quiet() && movegen::is_pseudo_legal(state, mv) {
                            return Some(mv);
                        }
                    }
                }
                PickerStage::Killer2 => {
                    self.stage = PickerStage::CounterMove;
                    if !self.skip_quiets {
                        let mv = self.killer2;
                        if mv != Move::NONE && mv.is_quiet() && movegen::is_pseudo_legal(state, mv) {
                            return Some(mv);
                        }
                    }
                }
                PickerStage::CounterMove => {
                    self.stage = PickerStage::GenerateQuiet;
                    if !self.skip_quiets {
                        let mv = self.counter;
                        if mv != Move::NONE && mv.is_quiet() && movegen::is_pseudo_legal(state, mv) {
                            return Some(mv);
                        }
                    }
                }
                PickerStage::GenerateQuiet => {
                    if self.skip_quiets {
                        self.stage = PickerStage::BadNoisy;
                        continue;
                    }
                    let mut gen = MoveGenerator::new();
                    gen.generate_moves_type(state, GenType::Quiet);
                    self.list = gen.list;
                    self.index = 0;
                    for i in 0..self.list.count {
                        let mv = self.list.moves[i];
                        self.scores[i] = data.quiet_score(
                            state.piece_on(mv.from()),
                            mv,
                            self.prev,
                            self.followup,
                        );
                    }
                    self.stage = PickerStage::Quiet;
                }
                PickerStage::Quiet => {
                    if self.skip_quiets {
                        self.stage = PickerStage::BadNoisy;
                        continue;
                    }
                    match self.pick_best() {
                        Some(mv) => {
                            if mv == self.tt_move
                                || mv == self.killer1
                                || mv == self.killer2
                                || mv == self.counter
                            {
                                continue;
                            }
                            return Some(mv);
                        }
                        None => self.stage = PickerStage::BadNoisy,
                    }
                }
                PickerStage::BadNoisy => {
                    if self.bad_index < self.bad_count {
                        let mv = self.bad_noisy[self.bad_index];
                        self.bad_index += 1;
                        return Some(mv);
                    }
                    self.stage = PickerStage::Done;
                }
                PickerStage::Done => return None,
            }
        }
    }
}

#[inline(always)]
fn lmp_limit(params: &SearchParameters, depth: i32, improving: bool) -> usize {
    let base = params.lmp_table[depth.clamp(0, 15) as usize];
    if improving {
        base
    } else {
        base * 3 / 4
    }
}

// --- QUIESCENCE ---

fn quiescence(
    state: &mut GameState,
    mut alpha: i32,
    beta: i32,
    info: &mut SearchInfo,
    ply: usize,
) -> i32 {
    if ply > info.seldepth as usize {
        info.seldepth = ply as u8;
    }
    info.nodes += 1;
    if info.nodes & 1023 == 0 {
        info.check_time();
    }
    if info.stopped {
        return 0;
    }
    if state.halfmove_clock >= 100 || state.is_repetition() {
        return 0;
    }
    if ply >= MAX_PLY {
        return eval::evaluate(state);
    }

    let probe = info.tt.probe(state.hash, ply);
    if let Some(hit) = &probe {
        let cutoff = match hit.flag {
            FLAG_EXACT => true,
            FLAG_BETA => hit.score >= beta,
            FLAG_ALPHA => hit.score <= alpha,
            _ => false,
        };
        if cutoff {
            return hit.score;
        }
    }

    let in_check = movegen::in_check(state);
    let original_alpha = alpha;
    let mut static_eval = -INFINITY;
    let mut best_score = -INFINITY;

    if !in_check {
        static_eval = match &probe {
            Some(hit) if hit.eval > -INFINITY => hit.eval,
            _ => eval::evaluate(state),
        };
        // Stand pat: the static eval floors the score.
        best_score = static_eval;
        if best_score >= beta {
            return best_score;
        }
        if best_score > alpha {
            alpha = best_score;
        }
        // Not even the largest possible material swing reaches alpha.
        if static_eval + QS_DELTA_MARGIN < alpha {
            return static_eval;
        }
    }

    let tt_move = probe
        .as_ref()
        .and_then(|hit| movegen::move_from_tt(state, hit.mv16))
        .unwrap_or(Move::NONE);
    let prev = info.prev_move(ply, 1);
    let followup = info.prev_move(ply, 2);
    // In check every move is tried; otherwise captures only.
    let mut picker = MovePicker::new(&*info.data, ply, tt_move, 0, !in_check, prev, followup);

    let mut best_move = Move::NONE;
    let mut moves_played = 0;

    loop {
        let mv = match picker.next(&*state, &*info.data) {
            Some(mv) => mv,
            None => break,
        };

        // Per-move delta filter: gain capped by the victim's value.
        if !in_check && mv.is_capture() && !mv.is_promotion() {
            let victim = if mv.is_en_passant() { 0 } else { crate::state::kind_of(mv.captured()) };
            if static_eval + see::SEE_VALUE[victim] + QS_MOVE_MARGIN <= alpha {
                continue;
            }
        }

        let piece = state.piece_on(mv.from());
        if !state.make_move_inplace(mv) {
            continue;
        }
        info.move_stack[ply] = (piece, mv);
        moves_played += 1;

        let score = -quiescence(state, -beta, -alpha, info, ply + 1);
        state.unmake_move(mv);
        if info.stopped {
            return 0;
        }

        if score > best_score {
            best_score = score;
            best_move = mv;
            if score > alpha {
                alpha = score;
                if alpha >= beta {
                    break;
                }
            }
        }
    }

    if in_check && moves_played == 0 {
        return -MATE_VALUE + ply as i32;
    }

    let flag = if best_score >= beta {
        FLAG_BETA
    } else if best_score > original_alpha {
        FLAG_EXACT
    } else {
        FLAG_ALPHA
    };
    info.tt.store(state.hash, best_move.to_tt(), best_score, static_eval, 0, flag, ply);

    best_score
}

// --- MAIN ALPHA-BETA ---

#[allow(clippy::too_many_arguments)]
fn negamax(
    state: &mut GameState,
    depth: i32,
    mut alpha: i32,
    mut beta: i32,
    info: &mut SearchInfo,
    ply: usize,
    is_pv: bool,
    do_null: bool,
    excluded: Move,
) -> i32 {
    if ply > 0 {
        if state.halfmove_clock >= 100 || state.is_repetition() {
            return 0;
        }
        if ply >= MAX_PLY {
            return eval::evaluate(state);
        }
        // Mate-distance pruning: a known closer mate bounds both windows.
        alpha = alpha.max(-MATE_VALUE + ply as i32);
        beta = beta.min(MATE_VALUE - ply as i32 - 1);
        if alpha >= beta {
            return alpha;
        }
    }

    let in_check = movegen::in_check(state);
    let depth = if in_check { depth + 1 } else { depth };

    if depth <= 0 {
        return quiescence(state, alpha, beta, info, ply);
    }

    info.nodes += 1;
    if info.nodes & 1023 == 0 {
        info.check_time();
    }
    if info.stopped {
        return 0;
    }
    if ply > info.seldepth as usize {
        info.seldepth = ply as u8;
    }

    let params = info.params;

    // --- TRANSPOSITION PROBE ---
    let probe = info.tt.probe(state.hash, ply);
    let (tt_score, tt_depth, tt_flag, tt_move16) = match &probe {
        Some(hit) => (hit.score, hit.depth as i32, hit.flag, hit.mv16),
        None => (0, 0, crate::tt::FLAG_NONE, 0),
    };

    if excluded == Move::NONE && ply > 0 && tt_depth >= depth {
        let cutoff = match tt_flag {
            FLAG_EXACT => true,
            FLAG_BETA => tt_score >= beta,
            FLAG_ALPHA => tt_score <= alpha,
            _ => false,
        };
        // A non-exact bound never short-circuits a PV node at depth; by the
        // time the node would fall into quiescence the probe there takes it.
        if cutoff && (!is_pv || tt_flag == FLAG_EXACT) {
            return tt_score;
        }
    }

    let mut tt_move = movegen::move_from_tt(state, tt_move16).unwrap_or(Move::NONE);

    // --- STATIC EVAL, IMPROVING ---
    let static_eval = if in_check {
        -INFINITY
    } else {
        match &probe {
            Some(hit) if hit.eval > -INFINITY => hit.eval,
            _ => eval::evaluate(state),
        }
    };
    info.eval_stack[ply] = static_eval;
    let improving =
        !in_check && ply >= 2 && static_eval > info.eval_stack[ply - 2];

    // --- PRE-LOOP PRUNING, conservative first ---

    // Reverse futility: eval is so far above beta a shallow search will not
    // bring it back down.
    if !is_pv
        && !in_check
        && excluded == Move::NONE
        && depth <= params.rfp_depth
        && static_eval - params.rfp_margin * (depth - improving as i32) >= beta
    {
        return static_eval;
    }

    // Razoring: eval is hopelessly below alpha, verify with quiescence.
    if !is_pv
        && !in_check
        && excluded == Move::NONE
        && depth <= 3
        && static_eval + params.razor_base + depth * params.razor_multiplier < alpha
    {
        let v = quiescence(state, alpha, beta, info, ply);
        if info.stopped {
            return 0;
        }
        if v < alpha {
            return v;
        }
    }

    // Null move: hand over the move and still beat beta. Guarded against
    // back-to-back nulls and pawn-only material (zugzwang).
    if !is_pv
        && !in_check
        && do_null
        && excluded == Move::NONE
        && depth >= 3
        && static_eval >= beta
        && state.has_non_pawn_material(state.side_to_move)
    {
        let r = params.nmp_base + depth / params.nmp_divisor + ((static_eval - beta) / 200).min(3);
        state.make_null_move();
        info.move_stack[ply] = (NO_PIECE, Move::NONE);
        let score = -negamax(state, depth - 1 - r, -beta, -beta + 1, info, ply + 1, false, false, Move::NONE);
        state.unmake_null_move();
        if info.stopped {
            return 0;
        }
        if score >= beta {
            // Do not trust unproven mates out of a null search.
            return if score >= MATE_SCORE { beta } else { score };
        }
    }

    // Probcut: a capture that beats a raised beta at reduced depth is taken
    // as a cutoff for the full-depth node.
    if !is_pv
        && !in_check
        && excluded == Move::NONE
        && depth >= 5
        && beta.abs() < MATE_SCORE
    {
        let prob_beta = beta + params.probcut_margin;
        let see_threshold = prob_beta - static_eval;
        let prev = info.prev_move(ply, 1);
        let followup = info.prev_move(ply, 2);
        let mut picker =
            MovePicker::new(&*info.data, ply, Move::NONE, see_threshold, true, prev, followup);
        loop {
            let mv = match picker.next(&*state, &*info.data) {
                Some(mv) => mv,
                None => break,
            };
            let piece = state.piece_on(mv.from());
            if !state.make_move_inplace(mv) {
                continue;
            }
            info.move_stack[ply] = (piece, mv);

            let mut score = -quiescence(state, -prob_beta, -prob_beta + 1, info, ply + 1);
            if score >= prob_beta {
                score = -negamax(state, depth - 4, -prob_beta, -prob_beta + 1, info, ply + 1, false, true, Move::NONE);
            }
            state.unmake_move(mv);
            if info.stopped {
                return 0;
            }
            if score >= prob_beta {
                info.tt.store(state.hash, mv.to_tt(), score, static_eval, (depth - 3).clamp(0, 255) as u8, FLAG_BETA, ply);
                return score;
            }
        }
    }

    // Internal iterative deepening: a PV node with no table move gets a
    // shallow scout to populate one.
    if is_pv && tt_move == Move::NONE && depth >= 5 && excluded == Move::NONE {
        negamax(state, depth - 2, alpha, beta, info, ply, true, do_null, Move::NONE);
        if info.stopped {
            return 0;
        }
        tt_move = movegen::move_from_tt(state, info.tt.get_move(state.hash)).unwrap_or(Move::NONE);
    }

    // --- SINGULAR EXTENSION / MULTI-CUT ---
    let mut singular_extension = 0;
    if ply > 0
        && depth >= 8
        && excluded == Move::NONE
        && tt_move != Move::NONE
        && tt_depth >= depth - 3
        && (tt_flag == FLAG_BETA || tt_flag == FLAG_EXACT)
        && tt_score.abs() < MATE_SCORE
    {
        let singular_beta = tt_score - 2 * depth;
        let score = negamax(
            state,
            (depth - 1) / 2,
            singular_beta - 1,
            singular_beta,
            info,
            ply,
            false,
            do_null,
            tt_move,
        );
        if info.stopped {
            return 0;
        }
        if score < singular_beta {
            // Every alternative fails low: the table move is singular.
            singular_extension = 1;
        } else if singular_beta >= beta {
            // Multiple moves beat a bound already at or above beta.
            return singular_beta;
        }
    }

    // --- MOVE LOOP ---
    let prev = info.prev_move(ply, 1);
    let followup = info.prev_move(ply, 2);
    let mut picker = MovePicker::new(&*info.data, ply, tt_move, 0, false, prev, followup);

    let original_alpha = alpha;
    let mut best_score = -INFINITY;
    let mut best_move = Move::NONE;
    let mut moves_played = 0usize;
    let mut quiets_seen = 0usize;
    let mut quiets_tried: [Move; 64] = [Move::NONE; 64];
    let mut quiets_count = 0usize;
    let mut noisy_tried: [Move; 32] = [Move::NONE; 32];
    let mut noisy_count = 0usize;

    loop {
        let mv = match picker.next(&*state, &*info.data) {
            Some(mv) => mv,
            None => break,
        };
        if mv == excluded {
            continue;
        }
        if ply == 0 && info.root_excluded.contains(&mv) {
            continue;
        }
        let is_quiet = mv.is_quiet();

        if !is_pv && !in_check && best_score > -MATE_SCORE {
            // Move-count pruning shuts off the remaining quiets.
            if depth <= 8 && quiets_seen >= lmp_limit(params, depth, improving) {
                picker.skip_quiets = true;
                if is_quiet {
                    continue;
                }
            }

            // Futility, gated on history so proven quiets survive.
            if is_quiet
                && depth <= 6
                && static_eval + params.futility_margin * depth <= alpha
                && info.data.history[mv.from() as usize][mv.to() as usize] < 8000
            {
                quiets_seen += 1;
                continue;
            }

            // Counter/follow-up history pruning at the lowest depths.
            if is_quiet && depth <= 3 {
                let cont =
                    info.data.quiet_score(state.piece_on(mv.from()), mv, prev, followup);
                if cont < -1500 * depth {
                    quiets_seen += 1;
                    continue;
                }
            }

            // Exchange pruning: the move sheds too much material.
            if depth <= 8 {
                let margin = if is_quiet {
                    -params.see_quiet_margin * depth
                } else {
                    -params.see_noisy_margin * depth
                };
                if !see::see_ge(state, mv, margin) {
                    if is_quiet {
                        quiets_seen += 1;
                    }
                    continue;
                }
            }
        }

        let piece = state.piece_on(mv.from());
        if !state.make_move_inplace(mv) {
            continue;
        }
        info.tt.prefetch(state.hash);
        info.move_stack[ply] = (piece, mv);
        moves_played += 1;
        if is_quiet {
            quiets_seen += 1;
            if quiets_count < quiets_tried.len() {
                quiets_tried[quiets_count] = mv;
                quiets_count += 1;
            }
        } else if noisy_count < noisy_tried.len() {
            noisy_tried[noisy_count] = mv;
            noisy_count += 1;
        }

        if ply == 0 && info.main_thread {
            let elapsed = info.start_time.elapsed().as_millis();
            if elapsed >= 3000 && elapsed >= info.last_currmove_ms + 1000 {
                info.last_currmove_ms = elapsed;
                println!(
                    "info depth {} currmove {} currmovenumber {}",
                    depth,
                    mv.to_uci(),
                    moves_played
                );
            }
        }

        let extension = if mv == tt_move { singular_extension } else { 0 };
        let new_depth = depth - 1 + extension;

        let mut score;
        if moves_played == 1 {
            score = -negamax(state, new_depth, -beta, -alpha, info, ply + 1, is_pv, true, Move::NONE);
        } else {
            // Late-move reduction, clamped so the reduced search neither
            // drops into quiescence nor exceeds the parent depth.
            let mut reduction = 0;
            if depth >= 3 && moves_played > 2 && is_quiet {
                let mut red =
                    params.lmr_table[depth.min(63) as usize][moves_played.min(63)] as i32;
                if !is_pv {
                    red += 1;
                }
                if !improving {
                    red += 1;
                }
                red -= info.data.history[mv.from() as usize][mv.to() as usize] / 8192;
                reduction = red.clamp(0, depth - 2);
            }

            score = -negamax(state, new_depth - reduction, -alpha - 1, -alpha, info, ply + 1, false, true, Move::NONE);
            if score > alpha && reduction > 0 {
                score = -negamax(state, new_depth, -alpha - 1, -alpha, info, ply + 1, false, true, Move::NONE);
            }
            if is_pv && score > alpha && score < beta {
                score = -negamax(state, new_depth, -beta, -alpha, info, ply + 1, true, true, Move::NONE);
            }
        }

        state.unmake_move(mv);
        if info.stopped {
            return 0;
        }

        if score > best_score {
            best_score = score;
            best_move = mv;
            if ply == 0 {
                info.root_best = mv;
            }
            if score > alpha {
                alpha = score;
                if alpha >= beta {
                    break;
                }
            }
        }
    }

    if moves_played == 0 {
        if excluded != Move::NONE {
            return alpha;
        }
        return if in_check { -MATE_VALUE + ply as i32 } else { 0 };
    }

    // --- FAIL-HIGH BOOKKEEPING ---
    if best_score >= beta {
        let bonus = depth * depth;
        if best_move.is_quiet() {
            if ply < MAX_PLY && info.data.killers[ply][0] != best_move {
                info.data.killers[ply][1] = info.data.killers[ply][0];
                info.data.killers[ply][0] = best_move;
            }
            if let Some((p_piece, p_to)) = prev {
                info.data.counter_moves[p_piece][p_to as usize] = best_move;
            }
            let piece = state.piece_on(best_move.from());
            info.data.update_quiet(piece, best_move, prev, followup, bonus);
            for i in 0..quiets_count {
                let tried = quiets_tried[i];
                if tried != best_move {
                    let tried_piece = state.piece_on(tried.from());
                    info.data.update_quiet(tried_piece, tried, prev, followup, -bonus);
                }
            }
        } else {
            info.data.update_capture(state, best_move, bonus);
        }
        for i in 0..noisy_count {
            let tried = noisy_tried[i];
            if tried != best_move {
                info.data.update_capture(state, tried, -bonus);
            }
        }
    }

    if excluded == Move::NONE && !(ply == 0 && info.pv_index > 0) {
        let flag = if best_score >= beta {
            FLAG_BETA
        } else if best_score > original_alpha {
            FLAG_EXACT
        } else {
            FLAG_ALPHA
        };
        info.tt.store(
            state.hash,
            best_move.to_tt(),
            best_score,
            static_eval,
            depth.clamp(0, 255) as u8,
            flag,
            ply,
        );
    }

    best_score
}

// --- ITERATIVE DEEPENING DRIVER ---

fn format_score(score: i32) -> String {
    if score > MATE_SCORE {
        format!("mate {}", (MATE_VALUE - score + 1) / 2)
    } else if score < -MATE_SCORE {
        format!("mate -{}", (MATE_VALUE + score + 1) / 2)
    } else {
        format!("cp {}", score)
    }
}

/// Walks the table from the position after `first`, collecting the principal
/// variation and the ponder move.
fn pv_line(root: &GameState, tt: &TranspositionTable, first: Move, max_len: u8) -> (String, Option<Move>) {
    let mut line = first.to_uci();
    let mut ponder = None;
    let mut state = root.clone();
    if !state.make_move_inplace(first) {
        return (line, None);
    }
    let mut seen = vec![root.hash, state.hash];
    for _ in 1..max_len {
        let mv = match movegen::move_from_tt(&state, tt.get_move(state.hash)) {
            Some(mv) => mv,
            None => break,
        };
        if !state.make_move_inplace(mv) {
            break;
        }
        if ponder.is_none() {
            ponder = Some(mv);
        }
        line.push(' ');
        line.push_str(&mv.to_uci());
        if seen.contains(&state.hash) {
            break;
        }
        seen.push(state.hash);
    }
    (line, ponder)
}

/// Searches `root` until a limit trips. The primary thread owns reporting and
/// the final move selection; helpers run the same loop against the shared
/// table and contribute only through it.
#[allow(clippy::too_many_arguments)]
pub fn search(
    root: &GameState,
    limits: Limits,
    tt: &TranspositionTable,
    signals: Arc<SearchSignals>,
    main_thread: bool,
    data: &mut SearchData,
    params: &SearchParameters,
    multipv: usize,
) -> (i32, Option<Move>) {
    let mut state = root.clone();
    if main_thread {
        tt.new_search();
    }

    // Legal root moves; the final answer always comes from this list.
    let mut legal_moves = Vec::new();
    {
        let mut gen = MoveGenerator::new();
        gen.generate_moves(&state);
        for i in 0..gen.list.count {
            let mv = gen.list.moves[i];
            if state.make_move_inplace(mv) {
                state.unmake_move(mv);
                legal_moves.push(mv);
            }
        }
    }
    if legal_moves.is_empty() {
        let score = if movegen::in_check(&state) { -MATE_VALUE } else { 0 };
        if main_thread {
            println!("info depth 0 score {}", format_score(score));
            println!("bestmove (none)");
        }
        return (score, None);
    }

    let max_depth = match limits {
        Limits::FixedDepth(d) => (d as usize).min(MAX_PLY - 1) as u8,
        _ => (MAX_PLY - 1) as u8,
    };
    let multipv = multipv.max(1).min(legal_moves.len());

    let mut info = SearchInfo::new(data, limits, signals, tt, params, main_thread);
    let mut best_move = legal_moves[0];
    let mut ponder_move: Option<Move> = None;
    let mut last_score = 0;
    let mut last_scores = vec![0i32; multipv];
    let mut best_move_stability = 0u32;
    let mut previous_best = Move::NONE;

    'deepening: for depth in 1..=max_depth {
        info.seldepth = 0;
        let mut found: Vec<Move> = Vec::new();

        for pv_index in 0..multipv {
            info.pv_index = pv_index;
            info.root_excluded = found.clone();
            info.root_best = Move::NONE;

            let mut delta = params.aspiration_delta;
            let (mut alpha, mut beta) = if depth >= 4 {
                (
                    (last_scores[pv_index] - delta).max(-INFINITY),
                    (last_scores[pv_index] + delta).min(INFINITY),
                )
            } else {
                (-INFINITY, INFINITY)
            };

            // Aspiration: widen on the failing side until the score lands
            // strictly inside the window.
            let score = loop {
                let score =
                    negamax(&mut state, depth as i32, alpha, beta, &mut info, 0, true, true, Move::NONE);
                if info.stopped {
                    break score;
                }
                if score <= alpha {
                    beta = (alpha + beta) / 2;
                    alpha = (alpha - delta).max(-INFINITY);
                } else if score >= beta {
                    beta = (beta + delta).min(INFINITY);
                } else {
                    break score;
                }
                delta += delta / 2 + delta / 4;
            };

            if info.stopped {
                break 'deepening;
            }
            last_scores[pv_index] = score;

            let line_best = if info.root_best != Move::NONE { info.root_best } else { best_move };
            found.push(line_best);
            if pv_index == 0 {
                last_score = score;
                best_move = line_best;
            }

            if main_thread {
                let elapsed = info.start_time.elapsed();
                let nps = if elapsed.as_secs_f64() > 0.0 {
                    (info.nodes as f64 / elapsed.as_secs_f64()) as u64
                } else {
                    0
                };
                let (line, p_move) = pv_line(root, tt, line_best, max_depth);
                if pv_index == 0 {
                    ponder_move = p_move;
                }
                println!(
                    "info depth {} seldepth {} multipv {} score {} nodes {} nps {} hashfull {} time {} pv {}",
                    depth,
                    info.seldepth,
                    pv_index + 1,
                    format_score(score),
                    info.nodes,
                    nps,
                    tt.hashfull(),
                    elapsed.as_millis(),
                    line
                );
            }
        }

        // Soft limit with best-move stability scaling: a settled root move
        // gives time back, a swinging one buys more.
        if let Limits::FixedTime(ref mut tm) = info.limits {
            if info.main_thread && depth > 4 {
                if best_move == previous_best {
                    best_move_stability += 1;
                } else {
                    best_move_stability = 0;
                }
                previous_best = best_move;
                tm.set_stability_factor(match best_move_stability {
                    0 => 2.50,
                    1 => 1.20,
                    2 => 0.90,
                    3 => 0.80,
                    _ => 0.75,
                });
            }
            if info.main_thread
                && !info.signals.ponder.load(Ordering::Relaxed)
                && tm.check_soft_limit()
            {
                info.signals.stop.store(true, Ordering::Relaxed);
                break 'deepening;
            }
        }
    }

    if main_thread {
        print!("bestmove {}", best_move.to_uci());
        if let Some(pm) = ponder_move {
            print!(" ponder {}", pm.to_uci());
        }
        println!();
        log::info!(
            "search done: best {} score {} nodes {}",
            best_move.to_uci(),
            last_score,
            info.nodes
        );
    }

    (last_score, Some(best_move))
}
