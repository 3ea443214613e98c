//! Win count and best time, kept between sessions by the front end.

use crate::error::StatsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub wins: u32,
    /// Fastest win in whole seconds.
    pub best_time: Option<u64>,
}

impl Stats {
    /// Reads `path`, or starts from zero when there is no file yet.
    pub fn load(path: &Path) -> Result<Self, StatsError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stats file yet");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(StatsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| StatsError::Format {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), StatsError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| StatsError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| StatsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn record_win(&mut self, elapsed: Duration) {
        let seconds = elapsed.as_secs();
        self.wins += 1;
        self.best_time = Some(self.best_time.map_or(seconds, |best| best.min(seconds)));
    }
}
