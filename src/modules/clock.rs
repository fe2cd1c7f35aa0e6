use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::modules::error::SetupError;

/// What to do when more than one interval has accumulated between advances.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BacklogPolicy {
    /// At most one tick per advance; the backlog stays accumulated.
    #[default]
    Single,
    /// Fire every due tick.
    Drain,
}

/// Fixed-interval beat. `advance` feeds elapsed time, `poll` reports whether a
/// tick should fire now.
#[derive(Clone, Debug)]
pub struct Clock {
    interval: f32,
    elapsed: f32,
    paused: bool,
    policy: BacklogPolicy,
    fired_since_advance: bool,
}

impl Clock {
    pub fn new(interval_secs: f32, policy: BacklogPolicy) -> Result<Self, SetupError> {
        if !interval_secs.is_finite() || interval_secs <= 0.0 {
            return Err(SetupError::InvalidTickInterval(interval_secs));
        }
        Ok(Self {
            interval: interval_secs,
            elapsed: 0.0,
            paused: false,
            policy,
            fired_since_advance: false,
        })
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn policy(&self) -> BacklogPolicy {
        self.policy
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Negative or non-finite deltas are ignored, as is everything while paused.
    pub fn advance(&mut self, dt: f32) {
        self.fired_since_advance = false;
        if self.paused || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.elapsed += dt;
    }

    /// Consumes one interval if a tick is due under the backlog policy.
    pub fn poll(&mut self) -> bool {
        if self.paused || self.elapsed < self.interval {
            return false;
        }
        if self.policy == BacklogPolicy::Single && self.fired_since_advance {
            return false;
        }
        self.elapsed -= self.interval;
        self.fired_since_advance = true;
        true
    }
}
