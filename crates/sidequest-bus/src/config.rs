use std::time::Duration;

/// Bus tuning shared by every context
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Upper bound on a single request/response exchange
    pub request_timeout: Duration,
    /// Inbound queue length per context
    pub channel_capacity: usize,
    /// Buffered broadcasts per subscriber before it starts lagging
    pub broadcast_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            channel_capacity: 64,
            broadcast_capacity: 256,
        }
    }
}

impl BusConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity.max(1);
        self
    }
}
