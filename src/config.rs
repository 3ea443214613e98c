use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-game settings supplied by the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
pub struct GameConfig {
    /// Seed for the shuffle. `None` draws a fresh one.
    pub seed: Option<u64>,
    /// Where the presentation layer keeps win count and best time.
    #[derivative(Default(value = "PathBuf::from(GameConfig::DEFAULT_STATS_PATH)"))]
    pub stats_path: PathBuf,
}

impl GameConfig {
    // ===== fixed board layout =====
    pub const TEMP_CELLS: usize = 3;
    pub const FOUNDATIONS: usize = 3;
    pub const WORK_STACKS: usize = 8;
    pub const DRAGONS_PER_SUIT: usize = 4;
    pub const DECK_SIZE: usize = 40;
    /// Temp cells, the flower cell, foundations and work stacks.
    pub const CONTAINERS: usize = Self::TEMP_CELLS + 1 + Self::FOUNDATIONS + Self::WORK_STACKS;

    pub const DEFAULT_STATS_PATH: &'static str = "save.json";

    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}
