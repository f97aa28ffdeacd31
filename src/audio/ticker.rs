use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickerState {
    Stopped,
    /// Started, waiting for the first poll to pick a time base.
    Armed,
    Running { next_due: Instant },
}

/// Periodic tick source for synthetic playback.
///
/// The ticker holds no thread or timer of its own; the control loop polls
/// it with the current time and gets back the number of intervals that
/// elapsed. `stop` cancels it, and the next `start` begins a fresh interval.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    state: TickerState,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            state: TickerState::Stopped,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn start(&mut self) {
        self.state = TickerState::Armed;
    }

    pub fn stop(&mut self) {
        self.state = TickerState::Stopped;
    }

    pub fn is_active(&self) -> bool {
        self.state != TickerState::Stopped
    }

    /// Number of whole intervals that elapsed up to `now`.
    pub fn poll(&mut self, now: Instant) -> u32 {
        match self.state {
            TickerState::Stopped => 0,
            TickerState::Armed => {
                self.state = TickerState::Running {
                    next_due: now + self.interval,
                };
                0
            }
            TickerState::Running { next_due } => {
                if now < next_due {
                    return 0;
                }
                let late = now.duration_since(next_due).as_nanos() / self.interval.as_nanos();
                let ticks = u32::try_from(late + 1).unwrap_or(u32::MAX);
                self.state = TickerState::Running {
                    next_due: next_due + self.interval * ticks,
                };
                ticks
            }
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
