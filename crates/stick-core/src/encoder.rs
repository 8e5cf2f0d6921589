//! Interval encoder: scalars in `[0, 1]` to spike intervals and back

use crate::error::{CoreError, Result};

/// Interval encoder shared by the simulator and the subnetwork library.
///
/// A normalized value `x` in `[0, 1]` is carried by two spikes separated
/// by `Tmin + x * Tcod` milliseconds. `Tmin` keeps intervals resolvable
/// at `x = 0`; `Tcod` is the coding span.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Encoder {
    tmin: f64,
    tcod: f64,
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            tmin: 10.0,  // 10ms minimum interval
            tcod: 100.0, // 100ms coding span
        }
    }
}

impl Encoder {
    /// Create a new encoder with validation
    pub fn new(tmin: f64, tcod: f64) -> Result<Self> {
        if !(tmin > 0.0) {
            return Err(CoreError::invalid_encoder("tmin", tmin.to_string(), "> 0"));
        }
        if !(tcod > 0.0) {
            return Err(CoreError::invalid_encoder("tcod", tcod.to_string(), "> 0"));
        }
        Ok(Self { tmin, tcod })
    }

    /// Minimum spike interval (ms)
    pub fn tmin(&self) -> f64 {
        self.tmin
    }

    /// Coding span (ms)
    pub fn tcod(&self) -> f64 {
        self.tcod
    }

    /// Largest representable interval, `Tmin + Tcod` (ms)
    pub fn tmax(&self) -> f64 {
        self.tmin + self.tcod
    }

    /// Encode a normalized value into a spike interval (ms)
    pub fn encode_interval(&self, x: f64) -> f64 {
        self.tmin + x * self.tcod
    }

    /// Decode a spike interval (ms) back into a normalized value
    pub fn decode_interval(&self, interval: f64) -> f64 {
        (interval - self.tmin) / self.tcod
    }
}
