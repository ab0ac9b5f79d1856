use std::net::SocketAddr;
use std::time::Duration;
use wirecall::{
    constants::DEFAULT_MAX_FRAME_SIZE,
    frame::{CodecType, CompressType, Message, Metadata},
};
use wirecall_rpc_service::constants::TIMEOUT_METADATA_KEY;

/// Per-call information handed to every method handler.
///
/// Carries the request's metadata and tags, where it came from, and how
/// long the caller is willing to wait.
#[derive(Debug, Clone, Default)]
pub struct RpcContext {
    service_method: String,
    metadata: Metadata,
    codec_type: CodecType,
    compress_type: CompressType,
    peer_addr: Option<SocketAddr>,
    timeout: Option<Duration>,
    max_payload_size: Option<usize>,
}

impl RpcContext {
    pub fn from_request(request: &Message, peer_addr: Option<SocketAddr>) -> Self {
        let timeout = request
            .metadata
            .get(TIMEOUT_METADATA_KEY)
            .and_then(|raw| match raw.parse::<u64>() {
                Ok(millis) => Some(Duration::from_millis(millis)),
                Err(_) => {
                    tracing::debug!("Ignoring unparsable {}: {:?}", TIMEOUT_METADATA_KEY, raw);
                    None
                }
            });

        Self {
            service_method: request.service_method.clone(),
            metadata: request.metadata.clone(),
            codec_type: request.header.codec_type().unwrap_or_default(),
            compress_type: request.header.compress_type().unwrap_or_default(),
            peer_addr,
            timeout,
            max_payload_size: None,
        }
    }

    pub fn service_method(&self) -> &str {
        &self.service_method
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn codec_type(&self) -> CodecType {
        self.codec_type
    }

    pub fn compress_type(&self) -> CompressType {
        self.compress_type
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Time budget requested by the caller, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Tightens the budget to `limit` if it is shorter than the caller's.
    pub fn cap_timeout(&mut self, limit: Option<Duration>) {
        self.timeout = match (self.timeout, limit) {
            (Some(requested), Some(limit)) => Some(requested.min(limit)),
            (requested, limit) => requested.or(limit),
        };
    }

    /// Largest payload a compressed request may inflate to.
    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size.unwrap_or(DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_payload_size(mut self, max_payload_size: usize) -> Self {
        self.max_payload_size = Some(max_payload_size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_comes_from_metadata() {
        let request = Message::request("Echo.Say", vec![]).with_metadata(TIMEOUT_METADATA_KEY, "250");
        let ctx = RpcContext::from_request(&request, None);
        assert_eq!(ctx.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(ctx.service_method(), "Echo.Say");
    }

    #[test]
    fn garbage_timeout_is_ignored() {
        let request = Message::request("Echo.Say", vec![]).with_metadata(TIMEOUT_METADATA_KEY, "soon");
        let ctx = RpcContext::from_request(&request, None);
        assert_eq!(ctx.timeout(), None);
    }

    #[test]
    fn cap_keeps_the_shorter_budget() {
        let request = Message::request("Echo.Say", vec![]).with_metadata(TIMEOUT_METADATA_KEY, "5000");
        let mut ctx = RpcContext::from_request(&request, None);
        ctx.cap_timeout(Some(Duration::from_secs(1)));
        assert_eq!(ctx.timeout(), Some(Duration::from_secs(1)));

        let mut ctx = RpcContext::from_request(&Message::request("Echo.Say", vec![]), None);
        ctx.cap_timeout(Some(Duration::from_secs(2)));
        assert_eq!(ctx.timeout(), Some(Duration::from_secs(2)));
        ctx.cap_timeout(None);
        assert_eq!(ctx.timeout(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn payload_limit_defaults_to_frame_limit() {
        let ctx = RpcContext::from_request(&Message::request("Echo.Say", vec![]), None);
        assert_eq!(ctx.max_payload_size(), DEFAULT_MAX_FRAME_SIZE);
        assert_eq!(ctx.with_max_payload_size(64).max_payload_size(), 64);
    }
}
