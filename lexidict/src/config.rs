use lexitree::{FREQ_SCORE_DEFAULT, MAX_CANDIDATES};

use crate::error::{DictError, Result};

/// Configuration for a [`Dictionary`](crate::Dictionary).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Suggestions returned when the caller does not ask for a count.
    pub top_k_default: usize,
    /// Upper bound on any requested suggestion count.
    pub top_k_max: usize,
    /// Prefix matches gathered before ranking.
    pub candidate_limit: usize,
    /// Records the dictionary will hold before refusing inserts.
    pub max_words: usize,
    /// Frequency substituted for a missing or non-positive score.
    pub default_frequency: u32,
    /// Ceiling applied to loaded frequency scores.
    pub max_frequency: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top_k_default: 10,
            top_k_max: 50,
            candidate_limit: MAX_CANDIDATES,
            max_words: 100_000,
            default_frequency: FREQ_SCORE_DEFAULT,
            max_frequency: 100_000,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.top_k_max == 0 {
            return Err(DictError::InvalidConfig("top_k_max must be positive".into()));
        }
        if self.top_k_default == 0 || self.top_k_default > self.top_k_max {
            return Err(DictError::InvalidConfig(format!(
                "top_k_default must be in 1..={}, got {}",
                self.top_k_max, self.top_k_default
            )));
        }
        if self.candidate_limit < self.top_k_max {
            return Err(DictError::InvalidConfig(format!(
                "candidate_limit ({}) must be at least top_k_max ({})",
                self.candidate_limit, self.top_k_max
            )));
        }
        if self.max_words == 0 {
            return Err(DictError::InvalidConfig("max_words must be positive".into()));
        }
        if self.default_frequency == 0 || self.default_frequency > self.max_frequency {
            return Err(DictError::InvalidConfig(format!(
                "default_frequency must be in 1..={}, got {}",
                self.max_frequency, self.default_frequency
            )));
        }
        Ok(())
    }

    /// Resolve a requested suggestion count: `None` means the default, and
    /// anything above `top_k_max` is capped.
    pub fn top_k(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.top_k_default).min(self.top_k_max)
    }

    /// Map a raw corpus score onto `default_frequency..=max_frequency`.
    /// Non-positive scores mean "no data".
    pub fn clamp_frequency(&self, raw: i64) -> u32 {
        if raw <= 0 {
            self.default_frequency
        } else {
            raw.min(i64::from(self.max_frequency)) as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_k(None), 10);
        assert_eq!(config.top_k(Some(3)), 3);
        assert_eq!(config.top_k(Some(500)), 50);
    }

    #[test]
    fn test_clamp_frequency() {
        let config = Config::default();
        assert_eq!(config.clamp_frequency(-5), 1);
        assert_eq!(config.clamp_frequency(0), 1);
        assert_eq!(config.clamp_frequency(42), 42);
        assert_eq!(config.clamp_frequency(10_000_000), 100_000);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            Config { top_k_max: 0, ..Config::default() },
            Config { top_k_default: 0, ..Config::default() },
            Config { top_k_default: 60, ..Config::default() },
            Config { candidate_limit: 5, ..Config::default() },
            Config { max_words: 0, ..Config::default() },
            Config { default_frequency: 0, ..Config::default() },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(DictError::InvalidConfig(_))),
                "{config:?} should be rejected"
            );
        }
    }
}
