// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::{Duration, Instant};

/// Measures frame delta time and total running time, excluding paused periods.
///
/// Every operation has an `_at` variant taking the current instant explicitly,
/// which the headless runner uses to drive the timer with a fixed step.
#[derive(Debug, Clone)]
pub struct GameTimer {
    base_time: Instant,
    paused_time: Duration,
    stop_time: Option<Instant>,
    prev_time: Instant,
    curr_time: Instant,
    delta_time: Duration,
}

impl GameTimer {
    /// Creates a running timer whose origin is now.
    pub fn new() -> Self {
        Self::new_at(Instant::now())
    }

    /// Creates a running timer whose origin is `now`.
    pub fn new_at(now: Instant) -> Self {
        Self {
            base_time: now,
            paused_time: Duration::ZERO,
            stop_time: None,
            prev_time: now,
            curr_time: now,
            delta_time: Duration::ZERO,
        }
    }

    /// Restarts the timer from zero. Call before the message loop.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    /// Restarts the timer with `now` as the origin.
    pub fn reset_at(&mut self, now: Instant) {
        *self = Self::new_at(now);
    }

    /// Resumes a stopped timer. The stopped span is excluded from the total time.
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Resumes a stopped timer at `now`.
    pub fn start_at(&mut self, now: Instant) {
        if let Some(stop_time) = self.stop_time.take() {
            self.paused_time += now.saturating_duration_since(stop_time);
            self.prev_time = now;
            self.curr_time = now;
        }
    }

    /// Pauses the timer.
    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    /// Pauses the timer at `now`. Stopping a stopped timer does nothing.
    pub fn stop_at(&mut self, now: Instant) {
        if self.stop_time.is_none() {
            self.stop_time = Some(now);
        }
    }

    /// Samples the clock and updates the delta time. Call once per frame.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Updates the delta time with `now` as the current instant.
    ///
    /// While stopped the delta time is zero. It is never negative.
    pub fn tick_at(&mut self, now: Instant) {
        if self.stop_time.is_some() {
            self.delta_time = Duration::ZERO;
            return;
        }
        self.curr_time = now;
        self.delta_time = now.saturating_duration_since(self.prev_time);
        self.prev_time = now;
    }

    /// Seconds elapsed between the last two ticks.
    pub fn delta_time(&self) -> f32 {
        self.delta_time.as_secs_f32()
    }

    /// Seconds since the last reset, not counting time spent stopped.
    pub fn total_time(&self) -> f32 {
        let end = self.stop_time.unwrap_or(self.curr_time);
        end.saturating_duration_since(self.base_time)
            .saturating_sub(self.paused_time)
            .as_secs_f32()
    }

    /// Whether the timer is stopped.
    pub fn is_stopped(&self) -> bool {
        self.stop_time.is_some()
    }
}

impl Default for GameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_tick_measures_delta_and_total() {
        let t0 = Instant::now();
        let mut timer = GameTimer::new_at(t0);
        timer.tick_at(t0 + ms(16));
        assert_relative_eq!(timer.delta_time(), 0.016, epsilon = 1e-6);
        timer.tick_at(t0 + ms(40));
        assert_relative_eq!(timer.delta_time(), 0.024, epsilon = 1e-6);
        assert_relative_eq!(timer.total_time(), 0.040, epsilon = 1e-6);
    }

    #[test]
    fn test_paused_time_is_excluded() {
        let t0 = Instant::now();
        let mut timer = GameTimer::new_at(t0);
        timer.tick_at(t0 + ms(100));
        timer.stop_at(t0 + ms(100));
        timer.tick_at(t0 + ms(500));
        assert_eq!(timer.delta_time(), 0.0);
        assert!(timer.is_stopped());
        assert_relative_eq!(timer.total_time(), 0.1, epsilon = 1e-6);

        timer.start_at(t0 + ms(1100));
        timer.tick_at(t0 + ms(1200));
        assert_relative_eq!(timer.delta_time(), 0.1, epsilon = 1e-6);
        assert_relative_eq!(timer.total_time(), 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_delta_is_never_negative() {
        let t0 = Instant::now() + ms(1000);
        let mut timer = GameTimer::new_at(t0);
        timer.tick_at(t0 - ms(10));
        assert_eq!(timer.delta_time(), 0.0);
    }

    #[test]
    fn test_reset_restarts_from_zero() {
        let t0 = Instant::now();
        let mut timer = GameTimer::new_at(t0);
        timer.tick_at(t0 + ms(300));
        timer.reset_at(t0 + ms(300));
        assert_eq!(timer.total_time(), 0.0);
        assert_eq!(timer.delta_time(), 0.0);
    }
}
