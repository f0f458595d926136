//! Fixed timestep accumulator
//!
//! Converts the variable frame time of the render callback into a whole
//! number of fixed simulation steps.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Longest frame time accepted; anything longer (tab switch, debugger) is cut
pub const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct FixedStep {
    dt: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS)
    }
}

impl FixedStep {
    pub fn new(dt: f32, max_substeps: u32) -> Self {
        Self {
            dt,
            max_substeps,
            accumulator: 0.0,
        }
    }

    #[inline]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Add a frame's worth of time and return how many steps to run now
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps {
            self.accumulator -= self.dt;
            substeps += 1;
        }
        substeps
    }

    /// Fraction of a step left over, for render interpolation
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Steps of 1/64 s keep the arithmetic exact
    const DT: f32 = 0.015625;

    #[test]
    fn test_whole_steps_and_remainder() {
        let mut step = FixedStep::new(DT, 8);
        assert_eq!(step.advance(DT * 2.5), 2);
        assert_eq!(step.alpha(), 0.5);
        assert_eq!(step.advance(DT * 0.5), 1);
        assert_eq!(step.alpha(), 0.0);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut step = FixedStep::new(DT, 100);
        // 0.1 s of a 5 s hitch is kept: 6.4 steps
        assert_eq!(step.advance(5.0), 6);
    }

    #[test]
    fn test_substeps_are_capped() {
        let mut step = FixedStep::new(DT, 4);
        assert_eq!(step.advance(0.1), 4);
        // The rest is carried, not dropped
        assert_eq!(step.advance(0.0), 2);
        assert_eq!(step.advance(0.0), 0);
    }

    #[test]
    fn test_negative_frame_time_ignored() {
        let mut step = FixedStep::default();
        assert_eq!(step.advance(-1.0), 0);
        assert_eq!(step.alpha(), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut step = FixedStep::default();
        step.advance(SIM_DT * 0.5);
        step.reset();
        assert_eq!(step.alpha(), 0.0);
    }
}
