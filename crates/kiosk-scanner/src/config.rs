use std::time::Duration;

use kiosk_core::constants::{
    DEFAULT_COOLDOWN_MS, DEFAULT_IDLE_POLL_MS, DEFAULT_REMOTE_TIMEOUT_MS, DEFAULT_SCAN_DELAY_MS,
};

/// Timing configuration for the scan loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Minimum time between two accepted reads of the same card
    pub cooldown: Duration,

    /// Sleep after an empty read or a suppressed duplicate
    pub idle_poll_interval: Duration,

    /// Sleep after a processed scan
    pub post_scan_delay: Duration,

    /// Upper bound for each directory lookup and audit append
    pub remote_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            idle_poll_interval: Duration::from_millis(DEFAULT_IDLE_POLL_MS),
            post_scan_delay: Duration::from_millis(DEFAULT_SCAN_DELAY_MS),
            remote_timeout: Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS),
        }
    }
}

impl ScanConfig {
    /// Default timings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duplicate-suppression window
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set the idle poll interval
    pub fn idle_poll_interval(mut self, interval: Duration) -> Self {
        self.idle_poll_interval = interval;
        self
    }

    /// Set the delay after a processed scan
    pub fn post_scan_delay(mut self, delay: Duration) -> Self {
        self.post_scan_delay = delay;
        self
    }

    /// Set the per-call remote timeout
    pub fn remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let config = ScanConfig::default();
        assert_eq!(config.cooldown, Duration::from_secs(2));
        assert_eq!(config.idle_poll_interval, Duration::from_millis(100));
        assert_eq!(config.post_scan_delay, Duration::from_millis(500));
        assert_eq!(config.remote_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_builder() {
        let config = ScanConfig::new()
            .cooldown(Duration::from_secs(5))
            .idle_poll_interval(Duration::from_millis(20))
            .post_scan_delay(Duration::from_millis(250))
            .remote_timeout(Duration::from_millis(800));

        assert_eq!(config.cooldown, Duration::from_secs(5));
        assert_eq!(config.idle_poll_interval, Duration::from_millis(20));
        assert_eq!(config.post_scan_delay, Duration::from_millis(250));
        assert_eq!(config.remote_timeout, Duration::from_millis(800));
    }
}
