// Speed Profiles Module
// Named delay schedules for simulating streaming speed.

use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::time::Duration;

/// Range (ms) the randomized initial delay is drawn from
pub const RANDOMIZED_INITIAL_MS: Range<u64> = 10..200;
/// Range (ms) the randomized inter-chunk delay is drawn from
pub const RANDOMIZED_INTER_CHUNK_MS: Range<u64> = 5..100;

/// Delay schedule applied to one streaming session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpeedProfile {
    /// Wait before the first chunk
    pub initial_delay: Duration,
    /// Wait before every later chunk
    pub inter_chunk_delay: Duration,
}

impl SpeedProfile {
    pub fn new(initial_delay: Duration, inter_chunk_delay: Duration) -> Self {
        Self {
            initial_delay,
            inter_chunk_delay,
        }
    }

    pub fn from_millis(initial_ms: u64, inter_chunk_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(initial_ms),
            Duration::from_millis(inter_chunk_ms),
        )
    }

    pub fn slow() -> Self {
        Self::from_millis(200, 100)
    }

    pub fn normal() -> Self {
        Self::from_millis(100, 50)
    }

    pub fn fast() -> Self {
        Self::from_millis(50, 20)
    }

    pub fn superfast() -> Self {
        Self::from_millis(10, 5)
    }

    /// Draw both delays independently from the randomized ranges
    pub fn randomized<R: Rng>(rng: &mut R) -> Self {
        Self::from_millis(
            rng.random_range(RANDOMIZED_INITIAL_MS),
            rng.random_range(RANDOMIZED_INTER_CHUNK_MS),
        )
    }

    /// No delay at all (for fast tests)
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

/// Speed label, as selected per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedLabel {
    Slow,
    Normal,
    Fast,
    Superfast,
    Randomized,
}

impl SpeedLabel {
    pub const ALL: [SpeedLabel; 5] = [
        SpeedLabel::Slow,
        SpeedLabel::Normal,
        SpeedLabel::Fast,
        SpeedLabel::Superfast,
        SpeedLabel::Randomized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedLabel::Slow => "slow",
            SpeedLabel::Normal => "normal",
            SpeedLabel::Fast => "fast",
            SpeedLabel::Superfast => "superfast",
            SpeedLabel::Randomized => "randomized",
        }
    }
}

impl fmt::Display for SpeedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown speed label: {0}")]
pub struct UnknownSpeedLabel(String);

impl FromStr for SpeedLabel {
    type Err = UnknownSpeedLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slow" => Ok(SpeedLabel::Slow),
            "normal" => Ok(SpeedLabel::Normal),
            "fast" => Ok(SpeedLabel::Fast),
            "superfast" => Ok(SpeedLabel::Superfast),
            "randomized" | "random" => Ok(SpeedLabel::Randomized),
            _ => Err(UnknownSpeedLabel(s.to_string())),
        }
    }
}

/// Table of the five speed profiles.
///
/// The `randomized` entry is drawn once when the table is built and then
/// shared by every session, unless `reroll_randomized` is set.
#[derive(Debug, Clone)]
pub struct SpeedTable {
    randomized: SpeedProfile,
    reroll_randomized: bool,
}

impl SpeedTable {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        Self {
            randomized: SpeedProfile::randomized(rng),
            reroll_randomized: false,
        }
    }

    /// Re-draw the randomized profile for every session
    pub fn with_reroll(mut self, reroll: bool) -> Self {
        self.reroll_randomized = reroll;
        self
    }

    pub fn rerolls_randomized(&self) -> bool {
        self.reroll_randomized
    }

    /// Stored profile for a label
    pub fn get(&self, label: SpeedLabel) -> SpeedProfile {
        match label {
            SpeedLabel::Slow => SpeedProfile::slow(),
            SpeedLabel::Normal => SpeedProfile::normal(),
            SpeedLabel::Fast => SpeedProfile::fast(),
            SpeedLabel::Superfast => SpeedProfile::superfast(),
            SpeedLabel::Randomized => self.randomized,
        }
    }

    /// Profile a session should run with
    pub fn resolve<R: Rng>(&self, label: SpeedLabel, rng: &mut R) -> SpeedProfile {
        if label == SpeedLabel::Randomized && self.reroll_randomized {
            SpeedProfile::randomized(rng)
        } else {
            self.get(label)
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (SpeedLabel, SpeedProfile)> + '_ {
        SpeedLabel::ALL.into_iter().map(|label| (label, self.get(label)))
    }
}
