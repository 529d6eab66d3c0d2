//! Server-sent events configuration.

use serde::{Deserialize, Serialize};

/// Event channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Buffered events per channel before new events are dropped.
    #[serde(default = "default_channel_buffer_size")]
    pub channel_buffer_size: usize,
    /// Interval of SSE keep-alive comments in seconds.
    #[serde(default = "default_keep_alive")]
    pub keep_alive_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer_size(),
            keep_alive_seconds: default_keep_alive(),
        }
    }
}

fn default_channel_buffer_size() -> usize {
    64
}

fn default_keep_alive() -> u64 {
    15
}
