use std::time::Instant;

#[derive(Clone, Copy)]
pub enum TimeControl {
    Infinite,
    MoveTime(u128),
    GameTime {
        wtime: u128,
        btime: u128,
        winc: u128,
        binc: u128,
        moves_to_go: Option<u32>,
    },
}

/// Converts a time control into a soft budget (checked between depths) and a
/// hard budget (checked inside the search on the polling interval).
#[derive(Clone, Copy)]
pub struct TimeManager {
    pub start_time: Instant,
    pub hard_limit: u128,
    pub soft_limit: u128,
    stability_factor: f64,
}

impl TimeManager {
    pub fn new(limit: TimeControl, side: usize, overhead: u128) -> Self {
        let (hard, soft) = match limit {
            TimeControl::Infinite => (u128::MAX, u128::MAX),
            TimeControl::MoveTime(t) => {
                let effective = t.saturating_sub(overhead);
                if effective == 0 { (t, t) } else { (effective, effective) }
            }
            TimeControl::GameTime { wtime, btime, winc, binc, moves_to_go } => {
                let (mut time, inc) = if side == 0 { (wtime, winc) } else { (btime, binc) };

                time = time.saturating_sub(overhead);
                if time == 0 {
                    time = 50; // emergency buffer when below overhead
                }

                let mtg = moves_to_go.unwrap_or(40).clamp(20, 50) as u128;
                let base = (time / mtg) + (inc * 3 / 4);
                let max_alloc = time * 8 / 10;

                let soft = base.min(max_alloc);
                let hard = (base * 2).min(max_alloc);
                (hard, soft)
            }
        };

        Self { start_time: Instant::now(), hard_limit: hard, soft_limit: soft, stability_factor: 1.0 }
    }

    /// Scales the soft limit by how stable the best move has been across
    /// recent depths; an unstable root gets more time.
    pub fn set_stability_factor(&mut self, factor: f64) {
        self.stability_factor = factor;
    }

    #[inline(always)]
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    #[inline(always)]
    pub fn check_soft_limit(&self) -> bool {
        if self.soft_limit == u128::MAX {
            return false;
        }
        self.elapsed_ms() as f64 >= self.soft_limit as f64 * self.stability_factor
    }

    #[inline(always)]
    pub fn check_hard_limit(&self) -> bool {
        self.hard_limit != u128::MAX && self.elapsed_ms() >= self.hard_limit
    }
}
