//! The recurring tick source.
//!
//! The clock does not read wall time itself. The owner feeds it elapsed
//! time through [`Clock::advance`] and gets back how many whole ticks fell
//! due, which keeps playback tick-counted and lets tests drive time exactly.

use std::time::Duration;

/// A fixed-period ticker.
///
/// Pausing halts the clock without recreating it. Only [`Clock::reset`]
/// (explicit stop or unload) starts a new clock generation.
#[derive(Debug, Clone)]
pub struct Clock {
    period: Duration,
    accumulated: Duration,
    running: bool,
    generation: u64,
}

impl Clock {
    /// Creates a halted clock.
    ///
    /// # Arguments
    ///
    /// * `period` - Time per tick; zero is treated as one millisecond
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            accumulated: Duration::ZERO,
            running: false,
            generation: 0,
        }
    }

    /// Starts delivering ticks. The first tick falls one full period later.
    /// Calling this on a running clock changes nothing.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.accumulated = Duration::ZERO;
        }
    }

    /// Stops delivering ticks and drops any partial period.
    pub fn halt(&mut self) {
        self.running = false;
        self.accumulated = Duration::ZERO;
    }

    /// Halts and replaces the clock with a fresh generation.
    pub fn reset(&mut self) {
        self.halt();
        self.generation += 1;
    }

    /// Feeds elapsed time and returns the number of ticks now due.
    ///
    /// # Arguments
    ///
    /// * `elapsed` - Time since the previous call
    ///
    /// # Returns
    ///
    /// Whole ticks that elapsed, 0 while halted
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        self.accumulated += elapsed;
        let mut ticks = 0;
        while self.accumulated >= self.period {
            self.accumulated -= self.period;
            ticks += 1;
        }
        ticks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Incremented every time the clock is reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_halted_clock_never_ticks() {
        let mut clock = Clock::new(SECOND);
        assert_eq!(clock.advance(Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_ticks_accumulate_partial_periods() {
        let mut clock = Clock::new(SECOND);
        clock.start();
        assert_eq!(clock.advance(Duration::from_millis(600)), 0);
        assert_eq!(clock.advance(Duration::from_millis(600)), 1);
        assert_eq!(clock.advance(Duration::from_millis(800)), 1);
        assert_eq!(clock.advance(Duration::from_millis(3000)), 3);
    }

    #[test]
    fn test_halt_discards_partial_period() {
        let mut clock = Clock::new(SECOND);
        clock.start();
        clock.advance(Duration::from_millis(900));
        clock.halt();
        clock.start();
        assert_eq!(clock.advance(Duration::from_millis(900)), 0);
        assert_eq!(clock.advance(Duration::from_millis(100)), 1);
    }

    #[test]
    fn test_start_is_idempotent_while_running() {
        let mut clock = Clock::new(SECOND);
        clock.start();
        clock.advance(Duration::from_millis(900));
        clock.start();
        assert_eq!(clock.advance(Duration::from_millis(100)), 1);
    }

    #[test]
    fn test_reset_bumps_generation_but_halt_does_not() {
        let mut clock = Clock::new(SECOND);
        clock.start();
        clock.halt();
        assert_eq!(clock.generation(), 0);
        clock.reset();
        assert_eq!(clock.generation(), 1);
        assert!(!clock.is_running());
    }
}
