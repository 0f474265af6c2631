/// Transport and tempo: running flag, step period, current page
use std::time::Duration;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    running: bool,
    step_period: Duration,
    increment: Duration,
    floor: Duration,
    current_page: usize,
}

impl Transport {
    pub fn new(config: &Config) -> Self {
        let floor = config.min_step_period();
        let increment = config.step_increment();
        // Unvalidated configs still get a period above the floor.
        let step_period = if config.step_period() > floor {
            config.step_period()
        } else {
            floor + increment.max(Duration::from_millis(1))
        };

        Self {
            running: true,
            step_period,
            increment,
            floor,
            current_page: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns the new running state.
    pub fn toggle_running(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    pub fn step_period(&self) -> Duration {
        self.step_period
    }

    /// Shortens the step period by one increment, refused if the result would
    /// not stay above the floor.
    pub fn speed_up(&mut self) -> bool {
        match self.step_period.checked_sub(self.increment) {
            Some(period) if period > self.floor => {
                self.step_period = period;
                true
            }
            _ => false,
        }
    }

    pub fn slow_down(&mut self) -> bool {
        match self.step_period.checked_add(self.increment) {
            Some(period) => {
                self.step_period = period;
                true
            }
            None => false,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn select_page(&mut self, page: usize) {
        self.current_page = page;
    }
}
