use std::time::Duration;

use crate::config::BackoffConfig;

/// Reconnect delay: doubles after every failed attempt up to `max`, drops
/// back to `min` on every successful open. No jitter, no attempt limit.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    min: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            current: config.min,
            min: config.min,
            max: config.max,
        }
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = self.min;
    }

    /// Delay to wait before the next attempt; advances the interval for the
    /// attempt after that.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn doubles_until_capped() {
        let mut backoff = Backoff::new(BackoffConfig::default());
        let delays: Vec<u64> = (0..8)
            .map(|_| backoff.next_delay().as_millis() as u64)
            .collect();
        assert_eq!(
            delays,
            vec![1000, 2000, 4000, 8000, 16000, 30000, 30000, 30000]
        );
    }

    #[test]
    fn reset_returns_to_minimum() {
        let mut backoff = Backoff::new(BackoffConfig::default());
        for _ in 0..5 {
            backoff.next_delay();
        }
        assert_eq!(backoff.current(), ms(30000));

        backoff.reset();
        assert_eq!(backoff.next_delay(), ms(1000));
    }

    #[test]
    fn equal_bounds_never_grow() {
        let mut backoff = Backoff::new(BackoffConfig {
            min: ms(500),
            max: ms(500),
        });
        assert_eq!(backoff.next_delay(), ms(500));
        assert_eq!(backoff.next_delay(), ms(500));
    }
}
