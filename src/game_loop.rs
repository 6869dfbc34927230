use crate::game::Game;
use crate::input::HeldControls;

/// Accumulates real elapsed time and hands it out as constant-size steps.
#[derive(Clone, Debug, Default)]
pub struct FixedStepClock {
    accumulator: f32,
}

impl FixedStepClock {
    /// Adds one real frame and returns how many fixed steps are due. Long
    /// stalls are clamped to `max_frame_time` so catch-up work stays bounded.
    pub fn advance(&mut self, real_dt: f32, step: f32, max_frame_time: f32) -> u32 {
        if step <= 0.0 || !step.is_finite() {
            return 0;
        }
        let elapsed = if real_dt.is_finite() {
            real_dt.clamp(0.0, max_frame_time.max(0.0))
        } else {
            0.0
        };
        self.accumulator += elapsed;

        let mut steps = 0;
        while self.accumulator >= step {
            self.accumulator -= step;
            steps += 1;
        }
        steps
    }

    /// Time carried over to the next frame, always below one step.
    pub fn remainder(&self) -> f32 {
        self.accumulator
    }
}

impl Game {
    /// Runs as many fixed ticks as `real_dt` allows, sampling the held
    /// controls once per tick so press and release edges land on single ticks.
    pub fn advance(&mut self, real_dt: f32, held: &HeldControls) -> u32 {
        let steps = self
            .clock
            .advance(real_dt, self.config.fixed_step, self.config.max_frame_time);
        for _ in 0..steps {
            let controls = self.tracker.sample(held);
            self.tick(&controls);
        }
        steps
    }
}
