use serde::{Deserialize, Serialize};
use std::io::Write;

fn default_lmr_table() -> [[u8; 64]; 64] {
    [[0; 64]; 64]
}

fn default_lmp_table() -> [usize; 16] {
    [0, 2, 4, 7, 10, 15, 20, 28, 38, 50, 65, 80, 100, 120, 150, 200]
}

/// Search tunables. Persisted as JSON so experiments survive between runs;
/// derived tables are recomputed after loading instead of being serialized.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchParameters {
    // LMR
    pub lmr_base: f64,
    pub lmr_divisor: f64,

    // Null move
    pub nmp_base: i32,
    pub nmp_divisor: i32,

    // Reverse futility
    pub rfp_margin: i32,
    pub rfp_depth: i32,

    // Razoring
    pub razor_base: i32,
    pub razor_multiplier: i32,

    // Futility
    pub futility_margin: i32,

    // SEE pruning margins, per depth
    pub see_quiet_margin: i32,
    pub see_noisy_margin: i32,

    // Probcut
    pub probcut_margin: i32,

    // Aspiration
    pub aspiration_delta: i32,

    #[serde(skip, default = "default_lmp_table")]
    pub lmp_table: [usize; 16],

    #[serde(skip, default = "default_lmr_table")]
    pub lmr_table: [[u8; 64]; 64],
}

impl Default for SearchParameters {
    fn default() -> Self {
        let mut params = Self {
            lmr_base: 0.8,
            lmr_divisor: 2.5,
            nmp_base: 3,
            nmp_divisor: 6,
            rfp_margin: 70,
            rfp_depth: 7,
            razor_base: 300,
            razor_multiplier: 150,
            futility_margin: 150,
            see_quiet_margin: 60,
            see_noisy_margin: 100,
            probcut_margin: 200,
            aspiration_delta: 18,
            lmp_table: default_lmp_table(),
            lmr_table: default_lmr_table(),
        };
        params.recalculate_tables();
        params
    }
}

impl SearchParameters {
    pub fn recalculate_tables(&mut self) {
        for d in 0..64 {
            for m in 0..64 {
                if d > 2 && m > 2 {
                    let lmr =
                        self.lmr_base + (d as f64).ln() * (m as f64).ln() / self.lmr_divisor;
                    self.lmr_table[d][m] = lmr.max(0.0) as u8;
                } else {
                    self.lmr_table[d][m] = 0;
                }
            }
        }
    }

    pub fn save_to_json(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    pub fn load_from_json(path: &str) -> std::io::Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let mut params: SearchParameters = serde_json::from_reader(reader)?;
        params.lmp_table = default_lmp_table();
        params.recalculate_tables();
        Ok(params)
    }
}
