use super::hints::InitHints;
use super::score::ScoreMode;
use std::thread;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("TM-score cutoff {0} is outside the accepted range [0.45, 1)")]
    CutoffOutOfRange(f64),

    #[error("score mode must be between 1 and 6, got {0}")]
    UnknownScoreMode(u8),

    #[error("worker count must be at least 1")]
    NoWorkers,
}

/// Resolves a numeric score-mode selector, as given on the command line.
pub fn score_mode_from_index(index: u8) -> Result<ScoreMode, ConfigError> {
    ScoreMode::from_index(index).ok_or(ConfigError::UnknownScoreMode(index))
}

/// Detected hardware concurrency, falling back to a single worker when
/// detection fails.
pub fn detected_threads() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// TM-score at or above which two chains are considered similar.
    pub tm_cutoff: f64,
    pub score_mode: ScoreMode,
    /// Worker threads racing the candidates of one query. One worker
    /// reproduces the serial candidate order exactly.
    pub threads: usize,
    /// Force the fast alignment in tier 1 for every pair.
    pub fast: bool,
    /// Rank and trim candidates with the cheap pre-filter alignment
    /// before running the full protocol.
    pub prefilter: bool,
    pub hints: InitHints,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            tm_cutoff: 0.5,
            score_mode: ScoreMode::Smaller,
            threads: detected_threads(),
            fast: false,
            prefilter: true,
            hints: InitHints::default(),
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.45..1.0).contains(&self.tm_cutoff) {
            return Err(ConfigError::CutoffOutOfRange(self.tm_cutoff));
        }
        if self.threads == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }
}
