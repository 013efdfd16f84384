//! Client configuration.

use std::time::Duration;

/// Configuration for a [`ConnectionHandle`](crate::ConnectionHandle).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Confirmations awaited when `connect` is not given a depth.
    pub default_confirmations: u64,
    /// Delay between receipt polls while awaiting confirmations.
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_confirmations: 1,
            poll_interval: Duration::from_millis(100),
        }
    }
}
