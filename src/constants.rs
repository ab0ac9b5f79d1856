// Frame header layout
pub const MAGIC_NUMBER: u8 = 42;
pub const PROTOCOL_VERSION: u8 = 1;
pub const FRAME_HEADER_SIZE: usize = 12;

pub const HEADER_MAGIC_OFFSET: usize = 0;
pub const HEADER_VERSION_OFFSET: usize = 1;

/// Byte holding two 4-bit tags: compression in the high nibble, payload
/// codec in the low nibble.
pub const HEADER_TAGS_OFFSET: usize = 2;

/// Byte holding the `MessageKind` (request or reply).
pub const HEADER_MESSAGE_KIND_OFFSET: usize = 3;

/// Byte holding the result status of a reply. Zero for requests.
pub const HEADER_RESULT_STATUS_OFFSET: usize = 4;

/// Every length prefix on the wire is a big-endian `u32`.
pub const FRAME_LENGTH_FIELD_SIZE: usize = 4;

/// Header plus body length: the part of a frame read before its body.
pub const FRAME_PREFIX_SIZE: usize = FRAME_HEADER_SIZE + FRAME_LENGTH_FIELD_SIZE;

/// Upper bound on a frame body accepted by `FrameCodec::decode`.
///
/// The length prefix is read before the body is allocated, so a peer
/// announcing a huge body is rejected without reserving memory for it.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;
