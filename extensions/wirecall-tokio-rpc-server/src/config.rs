use std::time::Duration;
use wirecall::constants::DEFAULT_MAX_FRAME_SIZE;

/// Tunables for an `RpcServer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Largest frame body accepted from a client. Bigger frames close the connection.
    /// Compressed payloads may not inflate past it either.
    pub max_frame_size: usize,

    /// Upper bound on how long a single call may run. A shorter `timeout-ms`
    /// from the caller still applies.
    pub request_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            request_timeout: None,
        }
    }
}
