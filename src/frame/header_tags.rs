use std::convert::TryFrom;
use std::fmt;

/// Compression applied to the payload, stored in the high nibble of header byte 2.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressType {
    #[default]
    None = 0,
    Gzip = 1,
}

impl TryFrom<u8> for CompressType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompressType::None),
            1 => Ok(CompressType::Gzip),
            other => Err(other),
        }
    }
}

impl fmt::Display for CompressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressType::None => f.write_str("none"),
            CompressType::Gzip => f.write_str("gzip"),
        }
    }
}

/// Serialization of the payload, stored in the low nibble of header byte 2.
///
/// The frame codec never acts on this tag. It tells the method definition
/// on the other side how the payload bytes were produced.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecType {
    /// Raw bytes, interpreted by the method itself.
    #[default]
    None = 0,
    Json = 1,
    ProtoBuffer = 2,
}

impl TryFrom<u8> for CodecType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CodecType::None),
            1 => Ok(CodecType::Json),
            2 => Ok(CodecType::ProtoBuffer),
            other => Err(other),
        }
    }
}

impl fmt::Display for CodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecType::None => f.write_str("none"),
            CodecType::Json => f.write_str("json"),
            CodecType::ProtoBuffer => f.write_str("protobuf"),
        }
    }
}

/// Direction of a frame, stored in header byte 3.
///
/// Byte 3 is zero in a plain request, so frames from peers that leave the
/// reserved bytes untouched read as requests.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Request = 0,
    Reply = 1,
}

impl TryFrom<u8> for MessageKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageKind::Request),
            1 => Ok(MessageKind::Reply),
            other => Err(other),
        }
    }
}
