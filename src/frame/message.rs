use crate::frame::{Header, MessageKind};
use std::collections::BTreeMap;
use std::fmt;

/// String metadata carried alongside a request. Kept ordered so that the
/// encoded form of a message is deterministic.
pub type Metadata = BTreeMap<String, String>;

/// One RPC frame, request or reply.
///
/// A message is built fresh for every request, filled by the decoder,
/// consumed once by dispatch and then dropped. Nothing is pooled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub header: Header,

    /// `"Type.Method"` name of the target.
    pub service_method: String,

    pub metadata: Metadata,

    /// Opaque bytes, interpreted according to the header's codec tag.
    pub payload: Vec<u8>,
}

impl Message {
    /// An empty request whose header already carries the magic number.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(service_method: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            header: Header::new(),
            service_method: service_method.into(),
            metadata: Metadata::new(),
            payload,
        }
    }

    /// Starts a reply to `request`: same version, tags and service method,
    /// empty metadata and payload.
    pub fn reply_to(request: &Message) -> Self {
        let mut header = request.header;
        header.set_message_kind(MessageKind::Reply);
        header.set_result_status(0);

        Self {
            header,
            service_method: request.service_method.clone(),
            metadata: Metadata::new(),
            payload: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_reply(&self) -> bool {
        matches!(self.header.message_kind(), Ok(MessageKind::Reply))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Header: {:?}, ServiceMethod: {}, Metadata: {:?}, Payload: {}",
            self.header.as_bytes(),
            self.service_method,
            self.metadata,
            String::from_utf8_lossy(&self.payload)
        )
    }
}
