use super::prune::PruneConfig;
use super::strategy::{MultiThreaded, SingleThreaded, Strategy};

use std::num::NonZeroUsize;
use std::str::FromStr;
use std::{fmt, thread};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("number of threads must be positive")]
    ZeroThreads,
    #[error("all moves radius must be positive")]
    ZeroAllMovesRadius,
    #[error("{name} radius {value} exceeds the limit of 16")]
    RadiusTooLarge { name: &'static str, value: u8 },
    #[error("check radius {check} is less than all moves radius {all_moves}")]
    CheckRadiusTooSmall { check: u8, all_moves: u8 },
    #[error("{name} must not be negative, got {value}")]
    NegativeRadius { name: &'static str, value: i32 },
    #[error("unknown difficulty {0:?}")]
    BadDifficulty(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Concurrency {
    Single,
    Multi(usize),
}

impl Concurrency {
    /// One thread per available CPU
    pub fn available() -> Concurrency {
        let threads = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        if threads == 1 {
            Concurrency::Single
        } else {
            Concurrency::Multi(threads)
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Level1,
    Level2,
    Level3,
}

impl Difficulty {
    pub fn prune(&self) -> PruneConfig {
        match *self {
            Difficulty::Level1 => PruneConfig::new(1, 2, 3, 2),
            Difficulty::Level2 => PruneConfig::new(2, 4, 5, 3),
            Difficulty::Level3 => PruneConfig::new(3, 6, 7, 4),
        }
    }

    pub fn good_enough_radius(&self) -> i32 {
        match *self {
            Difficulty::Level1 => 50,
            Difficulty::Level2 => 20,
            Difficulty::Level3 => 0,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let level = match *self {
            Difficulty::Level1 => 1,
            Difficulty::Level2 => 2,
            Difficulty::Level3 => 3,
        };
        write!(f, "{}", level)
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Difficulty, Self::Err> {
        match s.trim() {
            "1" => Ok(Difficulty::Level1),
            "2" => Ok(Difficulty::Level2),
            "3" => Ok(Difficulty::Level3),
            _ => Err(ConfigError::BadDifficulty(s.to_string())),
        }
    }
}

/// Everything the computer player needs to know
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub prune: PruneConfig,
    pub concurrency: Concurrency,
    /// Replies within this many centipawns of the best root move are enough to drop a move
    pub good_enough_radius: i32,
    /// Moves within this many centipawns of the best one may be chosen at random
    pub randomness: i32,
    pub seed: u64,
}

impl SearchConfig {
    pub fn new(difficulty: Difficulty) -> SearchConfig {
        SearchConfig {
            prune: difficulty.prune(),
            concurrency: Concurrency::Single,
            good_enough_radius: difficulty.good_enough_radius(),
            randomness: 0,
            seed: 0,
        }
    }

    pub fn with_prune(mut self, prune: PruneConfig) -> SearchConfig {
        self.prune = prune;
        self
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> SearchConfig {
        self.concurrency = concurrency;
        self
    }

    pub fn with_good_enough_radius(mut self, radius: i32) -> SearchConfig {
        self.good_enough_radius = radius;
        self
    }

    pub fn with_randomness(mut self, randomness: i32, seed: u64) -> SearchConfig {
        self.randomness = randomness;
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == Concurrency::Multi(0) {
            return Err(ConfigError::ZeroThreads);
        }
        let prune = &self.prune;
        if prune.all_moves == 0 {
            return Err(ConfigError::ZeroAllMovesRadius);
        }
        for (name, value) in [
            ("all moves", prune.all_moves),
            ("taking moves", prune.taking_moves),
            ("check", prune.check),
            ("pawn moves", prune.pawn_moves),
        ] {
            if value > PruneConfig::MAX_RADIUS {
                return Err(ConfigError::RadiusTooLarge { name, value });
            }
        }
        if prune.check < prune.all_moves {
            return Err(ConfigError::CheckRadiusTooSmall {
                check: prune.check,
                all_moves: prune.all_moves,
            });
        }
        for (name, value) in [
            ("good enough radius", self.good_enough_radius),
            ("randomness", self.randomness),
        ] {
            if value < 0 {
                return Err(ConfigError::NegativeRadius { name, value });
            }
        }
        Ok(())
    }

    pub fn strategy(&self) -> Box<dyn Strategy> {
        match self.concurrency {
            Concurrency::Single => Box::new(SingleThreaded),
            Concurrency::Multi(threads) => Box::new(MultiThreaded { threads }),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig::new(Difficulty::Level2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty() {
        for (s, d) in [
            ("1", Difficulty::Level1),
            ("2", Difficulty::Level2),
            ("3", Difficulty::Level3),
        ] {
            assert_eq!(Difficulty::from_str(s), Ok(d));
            assert_eq!(d.to_string(), s);
            assert_eq!(SearchConfig::new(d).validate(), Ok(()));
        }
        assert_eq!(
            Difficulty::from_str("4"),
            Err(ConfigError::BadDifficulty("4".to_string()))
        );
        assert_eq!(SearchConfig::default().prune, PruneConfig::default());
    }

    #[test]
    fn test_validate() {
        let base = SearchConfig::default();
        assert_eq!(
            base.with_concurrency(Concurrency::Multi(0)).validate(),
            Err(ConfigError::ZeroThreads)
        );
        assert_eq!(
            base.with_prune(PruneConfig::new(0, 2, 3, 2)).validate(),
            Err(ConfigError::ZeroAllMovesRadius)
        );
        assert_eq!(
            base.with_prune(PruneConfig::new(2, 17, 5, 3)).validate(),
            Err(ConfigError::RadiusTooLarge {
                name: "taking moves",
                value: 17
            })
        );
        assert_eq!(
            base.with_prune(PruneConfig::new(4, 4, 3, 3)).validate(),
            Err(ConfigError::CheckRadiusTooSmall {
                check: 3,
                all_moves: 4
            })
        );
        assert_eq!(
            base.with_randomness(-1, 0).validate(),
            Err(ConfigError::NegativeRadius {
                name: "randomness",
                value: -1
            })
        );
        assert_eq!(
            base.with_concurrency(Concurrency::Multi(3))
                .with_good_enough_radius(0)
                .validate(),
            Ok(())
        );
    }
}
