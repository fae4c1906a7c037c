//! Settings for [`crate::HyperTransport`].
//!
//! One [`ClientConfig`] covers the whole exchange: connecting, the response
//! deadline, pooled keep-alive connections and the hand-off of streamed
//! bodies to blocking readers.

use std::time::Duration;

/// Timeouts, pooling and streaming limits for [`crate::HyperTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Deadline for the response head, and for a buffered body to arrive in
    /// full. A streamed body instead gets this long for each chunk.
    pub timeout: Duration,
    /// Deadline for the TCP connect, applied by [`crate::https_connector`].
    pub connect_timeout: Duration,
    /// Keep-alive connections kept per host between requests.
    pub pool_idle_per_host: usize,
    /// How long a pooled connection may stay unused before it is closed.
    pub pool_idle_timeout: Duration,
    /// Chunks the network task may buffer ahead of a [`crate::ChannelStream`]
    /// reader before it waits.
    pub stream_channel_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            stream_channel_capacity: 16,
        }
    }
}

impl ClientConfig {
    /// Start from the defaults and override selected settings.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
    stream_channel_capacity: Option<usize>,
}

impl ClientConfigBuilder {
    /// Set the response deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the TCP connect deadline.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set how many keep-alive connections are pooled per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set how long pooled connections may stay idle.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Set how many chunks a streamed body may buffer ahead of its reader.
    /// Zero is treated as one.
    #[must_use]
    pub const fn stream_channel_capacity(mut self, capacity: usize) -> Self {
        self.stream_channel_capacity = Some(capacity);
        self
    }

    /// Fill unset values from [`ClientConfig::default`].
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(defaults.pool_idle_per_host),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(defaults.pool_idle_timeout),
            stream_channel_capacity: self
                .stream_channel_capacity
                .unwrap_or(defaults.stream_channel_capacity)
                .max(1),
        }
    }
}
