//! Beat clock: on-beat classification and beat edge detection
//!
//! Time is passed in explicitly as a millisecond timestamp (`now_ms`) so the
//! clock is deterministic under test. The clock has two states: not started,
//! and running from the epoch latched by [`BeatClock::start`]. A zone builds a
//! fresh clock on entry instead of resetting an old one, so phase never leaks
//! across BPM changes.
//!
//! The acceptance window is not checked against the beat interval. With
//! `window_seconds >= interval / 2` the early and late windows overlap and
//! every instant counts as on beat; upgrades can reach this on purpose.

use serde::{Deserialize, Serialize};

use crate::config::RhythmConfig;

/// Smallest and largest acceptance window reachable through upgrades
pub const WINDOW_UPGRADE_RANGE: (f64, f64) = (0.05, 0.30);
/// Smallest and largest on-beat damage multiplier reachable through upgrades
pub const DAMAGE_MULT_UPGRADE_RANGE: (f32, f32) = (1.5, 4.0);

/// Whether the clock has been started
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClockState {
    NotStarted,
    Running { start_ms: f64 },
}

/// A new beat was entered during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatEdge {
    /// Index of the beat now in progress
    pub index: i64,
    /// Index recorded by the previous edge (-1 before the first)
    pub previous: i64,
}

impl BeatEdge {
    /// Beats elapsed since the previous edge; more than 1 when a long frame
    /// jumped over whole beats
    pub fn beats_crossed(&self) -> u64 {
        (self.index - self.previous).max(0) as u64
    }
}

/// Phase clock derived from a BPM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeatClock {
    state: ClockState,
    bpm: f64,
    window_seconds: f64,
    on_beat_damage_mult: f32,
    pulse_decay: f32,

    last_beat: i64,
    /// Elapsed seconds at the last tick
    time: f64,
    /// Cached on-beat flag from the last tick
    on_beat: bool,
    /// Visual pulse, 1 on a beat edge decaying toward 0
    pulse: f32,

    /// Simulated seconds across every zone of the run
    total_time: f64,
    shots_on_beat: u32,
    shots_total: u32,
}

impl BeatClock {
    pub fn new(config: &RhythmConfig) -> Self {
        Self {
            state: ClockState::NotStarted,
            bpm: config.bpm,
            window_seconds: config.window_seconds,
            on_beat_damage_mult: config.on_beat_damage_mult,
            pulse_decay: config.pulse_decay,
            last_beat: -1,
            time: 0.0,
            on_beat: false,
            pulse: 0.0,
            total_time: 0.0,
            shots_on_beat: 0,
            shots_total: 0,
        }
    }

    /// Fresh clock for the next zone.
    ///
    /// Tempo comes from the new zone; upgrades to the window and damage
    /// multiplier and the run statistics carry over.
    pub fn next_zone(&self, config: &RhythmConfig) -> Self {
        Self {
            bpm: config.bpm,
            pulse_decay: config.pulse_decay,
            window_seconds: self.window_seconds,
            on_beat_damage_mult: self.on_beat_damage_mult,
            total_time: self.total_time,
            shots_on_beat: self.shots_on_beat,
            shots_total: self.shots_total,
            ..Self::new(config)
        }
    }

    /// Latch the epoch. Only the first call has any effect; returns whether
    /// this call started the clock.
    pub fn start(&mut self, now_ms: f64) -> bool {
        match self.state {
            ClockState::NotStarted => {
                self.state = ClockState::Running { start_ms: now_ms };
                log::debug!("Beat clock started at {now_ms}ms ({} BPM)", self.bpm);
                true
            }
            ClockState::Running { .. } => false,
        }
    }

    #[inline]
    pub fn state(&self) -> ClockState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running { .. })
    }

    /// Seconds per beat, or 0 for a non-positive BPM
    pub fn interval(&self) -> f64 {
        if self.bpm > 0.0 && self.bpm.is_finite() {
            60.0 / self.bpm
        } else {
            0.0
        }
    }

    /// Seconds since the epoch, clamped at 0; 0 before the clock starts
    pub fn elapsed_seconds(&self, now_ms: f64) -> f64 {
        match self.state {
            ClockState::NotStarted => 0.0,
            ClockState::Running { start_ms } => ((now_ms - start_ms) / 1000.0).max(0.0),
        }
    }

    /// Whether `now_ms` falls inside the acceptance window around a beat.
    ///
    /// The window straddles each beat: `window_seconds` of late tolerance
    /// after it and the same early tolerance before the next one.
    pub fn is_on_beat(&self, now_ms: f64) -> bool {
        if !self.is_running() {
            return false;
        }
        let interval = self.interval();
        if interval <= 0.0 {
            return false;
        }
        let phase = self.elapsed_seconds(now_ms) % interval;
        phase <= self.window_seconds || phase >= interval - self.window_seconds
    }

    /// Beat index at `now_ms` (floor of elapsed / interval)
    pub fn beat_index(&self, now_ms: f64) -> i64 {
        let interval = self.interval();
        if interval <= 0.0 {
            return 0;
        }
        (self.elapsed_seconds(now_ms) / interval).floor() as i64
    }

    /// Advance the clock to `now_ms`, `dt` seconds after the previous tick.
    ///
    /// Returns an edge when the beat index differs from the one recorded at
    /// the last edge. Comparing indices rather than times keeps this to one
    /// edge per beat whatever the frame time. Does nothing until started.
    pub fn tick(&mut self, now_ms: f64, dt: f32) -> Option<BeatEdge> {
        if !self.is_running() {
            return None;
        }
        self.total_time += dt as f64;

        if self.interval() <= 0.0 {
            self.on_beat = false;
            return None;
        }

        self.time = self.elapsed_seconds(now_ms);

        let index = self.beat_index(now_ms);
        let edge = if index != self.last_beat {
            let edge = BeatEdge {
                index,
                previous: self.last_beat,
            };
            self.last_beat = index;
            self.pulse = 1.0;
            log::trace!("Beat {index}");
            Some(edge)
        } else {
            None
        };

        self.on_beat = self.is_on_beat(now_ms);
        self.pulse = (self.pulse - dt * self.pulse_decay).max(0.0);
        edge
    }

    /// Record a shot at `now_ms`, returning its damage multiplier
    pub fn register_shot(&mut self, now_ms: f64) -> f32 {
        self.shots_total += 1;
        if self.is_on_beat(now_ms) {
            self.shots_on_beat += 1;
            self.on_beat_damage_mult
        } else {
            1.0
        }
    }

    /// Widen (or narrow) the acceptance window, within the upgrade range.
    ///
    /// The range is not related to the beat interval; see the module docs.
    pub fn widen_window(&mut self, delta: f64) {
        let (lo, hi) = WINDOW_UPGRADE_RANGE;
        self.window_seconds = (self.window_seconds + delta).clamp(lo, hi);
    }

    pub fn boost_damage_mult(&mut self, delta: f32) {
        let (lo, hi) = DAMAGE_MULT_UPGRADE_RANGE;
        self.on_beat_damage_mult = (self.on_beat_damage_mult + delta).clamp(lo, hi);
    }

    #[inline]
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    #[inline]
    pub fn window_seconds(&self) -> f64 {
        self.window_seconds
    }

    #[inline]
    pub fn on_beat_damage_mult(&self) -> f32 {
        self.on_beat_damage_mult
    }

    /// Index recorded at the last edge (-1 before the first)
    #[inline]
    pub fn last_beat(&self) -> i64 {
        self.last_beat
    }

    /// On-beat flag as of the last tick
    #[inline]
    pub fn on_beat(&self) -> bool {
        self.on_beat
    }

    #[inline]
    pub fn pulse(&self) -> f32 {
        self.pulse
    }

    /// Elapsed seconds as of the last tick
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    #[inline]
    pub fn shots_on_beat(&self) -> u32 {
        self.shots_on_beat
    }

    #[inline]
    pub fn shots_total(&self) -> u32 {
        self.shots_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const START: f64 = 10_000.0;

    fn clock(bpm: f64, window_seconds: f64) -> BeatClock {
        let mut clock = BeatClock::new(&RhythmConfig {
            bpm,
            window_seconds,
            ..RhythmConfig::default()
        });
        clock.start(START);
        clock
    }

    /// Timestamp `secs` after the epoch
    fn at(secs: f64) -> f64 {
        START + secs * 1000.0
    }

    #[test]
    fn test_window_at_120_bpm() {
        let clock = clock(120.0, 0.12);
        assert_eq!(clock.interval(), 0.5);
        assert!(clock.is_on_beat(at(0.05)));
        assert!(!clock.is_on_beat(at(0.25)));
        assert!(clock.is_on_beat(at(0.45)));
    }

    #[test]
    fn test_window_edges() {
        let clock = clock(120.0, 0.12);
        // Phase 0, and phase == interval wrapping back to 0
        assert!(clock.is_on_beat(at(0.0)));
        assert!(clock.is_on_beat(at(0.5)));
        assert!(clock.is_on_beat(at(2.0)));
        // Halfway between beats
        assert!(!clock.is_on_beat(at(0.25)));
        assert!(!clock.is_on_beat(at(1.75)));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        // Binary-exact values so the phase lands exactly on the bound
        let clock = clock(120.0, 0.125);
        assert!(clock.is_on_beat(at(1.125)));
        assert!(clock.is_on_beat(at(0.875)));
        assert!(!clock.is_on_beat(at(1.126)));
        assert!(!clock.is_on_beat(at(0.874)));
    }

    #[test]
    fn test_not_started() {
        let mut clock = BeatClock::new(&RhythmConfig::default());
        assert_eq!(clock.state(), ClockState::NotStarted);
        assert_eq!(clock.elapsed_seconds(5_000.0), 0.0);
        assert!(!clock.is_on_beat(5_000.0));
        assert!(clock.tick(5_000.0, 0.016).is_none());
        assert_eq!(clock.last_beat(), -1);
        assert_eq!(clock.total_time(), 0.0);
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut clock = BeatClock::new(&RhythmConfig::default());
        assert!(clock.start(1_000.0));
        assert!(!clock.start(9_000.0));
        assert_eq!(clock.state(), ClockState::Running { start_ms: 1_000.0 });
        assert_eq!(clock.elapsed_seconds(1_500.0), 0.5);
        // Clock reading before the epoch clamps to 0
        assert_eq!(clock.elapsed_seconds(500.0), 0.0);
    }

    #[test]
    fn test_zero_bpm_is_never_on_beat() {
        let mut clock = clock(0.0, 0.12);
        assert_eq!(clock.interval(), 0.0);
        assert!(!clock.is_on_beat(at(0.0)));
        assert!(clock.tick(at(1.0), 0.016).is_none());
        assert!(!clock.on_beat());
    }

    #[test]
    fn test_overlapping_window_is_always_on_beat() {
        let clock = clock(120.0, 0.3);
        for i in 0..50 {
            assert!(clock.is_on_beat(at(i as f64 * 0.037)));
        }
    }

    #[test]
    fn test_edge_fires_once_per_beat() {
        let mut clock = clock(120.0, 0.12);
        let mut edges = Vec::new();
        let mut now = START;
        for _ in 0..120 {
            if let Some(edge) = clock.tick(now, 1.0 / 60.0) {
                edges.push(edge.index);
            }
            now += 1000.0 / 60.0;
        }
        // Two seconds of ticks: beats 0 through 3, each exactly once
        assert_eq!(edges, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_long_frame_reports_crossed_beats() {
        let mut clock = clock(120.0, 0.12);
        let first = clock.tick(at(0.0), 0.0).unwrap();
        assert_eq!(first.beats_crossed(), 1);

        let edge = clock.tick(at(1.6), 1.6).unwrap();
        assert_eq!(edge.index, 3);
        assert_eq!(edge.previous, 0);
        assert_eq!(edge.beats_crossed(), 3);
    }

    #[test]
    fn test_pulse_decays() {
        let mut clock = clock(120.0, 0.12);
        clock.tick(at(0.0), 0.0);
        assert_eq!(clock.pulse(), 1.0);

        clock.tick(at(0.1), 0.1);
        assert!((clock.pulse() - 0.4).abs() < 1e-6);

        clock.tick(at(0.2), 0.1);
        assert_eq!(clock.pulse(), 0.0);
    }

    #[test]
    fn test_tick_caches_state() {
        let mut clock = clock(120.0, 0.12);
        clock.tick(at(0.25), 0.25);
        assert!(!clock.on_beat());
        assert_eq!(clock.time(), 0.25);

        clock.tick(at(0.49), 0.24);
        assert!(clock.on_beat());
        assert!((clock.total_time() - 0.49).abs() < 1e-6);
    }

    #[test]
    fn test_register_shot() {
        let mut clock = clock(120.0, 0.12);
        assert_eq!(clock.register_shot(at(0.02)), 2.0);
        assert_eq!(clock.register_shot(at(0.25)), 1.0);
        assert_eq!(clock.register_shot(at(0.48)), 2.0);
        assert_eq!(clock.shots_total(), 3);
        assert_eq!(clock.shots_on_beat(), 2);
    }

    #[test]
    fn test_upgrades_clamp() {
        let mut clock = clock(120.0, 0.12);
        clock.widen_window(0.03);
        assert!((clock.window_seconds() - 0.15).abs() < 1e-9);
        clock.widen_window(1.0);
        assert_eq!(clock.window_seconds(), 0.30);
        clock.widen_window(-1.0);
        assert_eq!(clock.window_seconds(), 0.05);

        clock.boost_damage_mult(0.5);
        assert_eq!(clock.on_beat_damage_mult(), 2.5);
        clock.boost_damage_mult(10.0);
        assert_eq!(clock.on_beat_damage_mult(), 4.0);
        clock.boost_damage_mult(-10.0);
        assert_eq!(clock.on_beat_damage_mult(), 1.5);
    }

    #[test]
    fn test_next_zone_keeps_upgrades_and_stats() {
        let mut clock = clock(120.0, 0.12);
        clock.tick(at(1.0), 1.0);
        clock.widen_window(0.03);
        clock.register_shot(at(1.0));

        let slower = RhythmConfig {
            bpm: 96.0,
            ..RhythmConfig::default()
        };
        let next = clock.next_zone(&slower);
        assert_eq!(next.state(), ClockState::NotStarted);
        assert_eq!(next.bpm(), 96.0);
        assert_eq!(next.last_beat(), -1);
        assert!((next.window_seconds() - 0.15).abs() < 1e-9);
        assert_eq!(next.shots_total(), 1);
        assert_eq!(next.total_time(), 1.0);
    }

    proptest! {
        #[test]
        fn prop_beat_index_independent_of_step_size(
            bpm in 40.0f64..240.0,
            total_ms in 0u32..20_000,
            coarse_ms in 50u32..2_000,
        ) {
            let config = RhythmConfig { bpm, ..RhythmConfig::default() };
            let mut fine = BeatClock::new(&config);
            let mut coarse = BeatClock::new(&config);
            fine.start(0.0);
            coarse.start(0.0);

            let mut last = -1;
            for ms in 0..=total_ms {
                fine.tick(ms as f64, 0.001);
                prop_assert!(fine.last_beat() >= last);
                last = fine.last_beat();
            }

            let mut ms = 0;
            while ms < total_ms {
                coarse.tick(ms as f64, coarse_ms as f32 / 1000.0);
                ms += coarse_ms;
            }
            coarse.tick(total_ms as f64, 0.0);

            prop_assert_eq!(fine.last_beat(), coarse.last_beat());
            let expected = ((total_ms as f64 / 1000.0) / (60.0 / bpm)).floor() as i64;
            prop_assert_eq!(fine.last_beat(), expected);
        }
    }
}
