//! End-of-run rhythm statistics
//!
//! Serializable so a frontend can store or display it as-is.

use serde::{Deserialize, Serialize};

use crate::sim::BeatClock;

/// How well the player kept to the beat over a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub shots_on_beat: u32,
    pub shots_total: u32,
    /// Percentage of shots fired on beat (0-100), 0 when nothing was fired
    pub accuracy: f32,
    /// Tempo of the zone the run ended in
    pub bpm: f64,
    /// Simulated seconds across every zone
    pub time_seconds: f64,
}

impl RunSummary {
    pub fn from_clock(clock: &BeatClock) -> Self {
        let shots_total = clock.shots_total();
        let shots_on_beat = clock.shots_on_beat();
        let accuracy = if shots_total == 0 {
            0.0
        } else {
            shots_on_beat as f32 / shots_total as f32 * 100.0
        };

        Self {
            shots_on_beat,
            shots_total,
            accuracy,
            bpm: clock.bpm(),
            time_seconds: clock.total_time(),
        }
    }

    /// Pretty-printed JSON for display or export
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
