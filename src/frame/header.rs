use crate::{
    constants::{
        FRAME_HEADER_SIZE, HEADER_MAGIC_OFFSET, HEADER_MESSAGE_KIND_OFFSET,
        HEADER_RESULT_STATUS_OFFSET, HEADER_TAGS_OFFSET, HEADER_VERSION_OFFSET, MAGIC_NUMBER,
        PROTOCOL_VERSION,
    },
    frame::{CodecType, CompressType, FrameDecodeError, MessageKind},
};

/// The fixed 12-byte header that opens every frame.
///
/// | byte   | meaning                                            |
/// |--------|----------------------------------------------------|
/// | 0      | magic number (42)                                  |
/// | 1      | protocol version                                   |
/// | 2      | high nibble: compression, low nibble: payload codec |
/// | 3      | message kind (request / reply)                     |
/// | 4      | result status of a reply                           |
/// | 5..11  | reserved, written as zero                          |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header([u8; FRAME_HEADER_SIZE]);

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

impl Header {
    /// A request header with the magic number and current protocol version set.
    pub fn new() -> Self {
        let mut bytes = [0u8; FRAME_HEADER_SIZE];
        bytes[HEADER_MAGIC_OFFSET] = MAGIC_NUMBER;
        bytes[HEADER_VERSION_OFFSET] = PROTOCOL_VERSION;
        Self(bytes)
    }

    /// Wraps raw header bytes without validating them.
    pub fn from_bytes(bytes: [u8; FRAME_HEADER_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_HEADER_SIZE] {
        &self.0
    }

    pub fn check_magic_number(&self) -> bool {
        self.0[HEADER_MAGIC_OFFSET] == MAGIC_NUMBER
    }

    pub fn version(&self) -> u8 {
        self.0[HEADER_VERSION_OFFSET]
    }

    pub fn set_version(&mut self, version: u8) {
        self.0[HEADER_VERSION_OFFSET] = version;
    }

    pub fn compress_type(&self) -> Result<CompressType, FrameDecodeError> {
        CompressType::try_from(self.0[HEADER_TAGS_OFFSET] >> 4)
            .map_err(FrameDecodeError::UnknownCompressType)
    }

    pub fn set_compress_type(&mut self, compress_type: CompressType) {
        let codec_bits = self.0[HEADER_TAGS_OFFSET] & 0x0f;
        self.0[HEADER_TAGS_OFFSET] = ((compress_type as u8) << 4) | codec_bits;
    }

    pub fn codec_type(&self) -> Result<CodecType, FrameDecodeError> {
        CodecType::try_from(self.0[HEADER_TAGS_OFFSET] & 0x0f)
            .map_err(FrameDecodeError::UnknownCodecType)
    }

    pub fn set_codec_type(&mut self, codec_type: CodecType) {
        let compress_bits = self.0[HEADER_TAGS_OFFSET] & 0xf0;
        self.0[HEADER_TAGS_OFFSET] = compress_bits | ((codec_type as u8) & 0x0f);
    }

    pub fn message_kind(&self) -> Result<MessageKind, FrameDecodeError> {
        MessageKind::try_from(self.0[HEADER_MESSAGE_KIND_OFFSET])
            .map_err(FrameDecodeError::UnknownMessageKind)
    }

    pub fn set_message_kind(&mut self, kind: MessageKind) {
        self.0[HEADER_MESSAGE_KIND_OFFSET] = kind as u8;
    }

    /// Raw result status byte. Its meaning belongs to the service layer.
    pub fn result_status(&self) -> u8 {
        self.0[HEADER_RESULT_STATUS_OFFSET]
    }

    pub fn set_result_status(&mut self, status: u8) {
        self.0[HEADER_RESULT_STATUS_OFFSET] = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_nibbles_are_independent() {
        let mut header = Header::new();
        header.set_codec_type(CodecType::ProtoBuffer);
        header.set_compress_type(CompressType::Gzip);

        assert_eq!(header.as_bytes()[HEADER_TAGS_OFFSET], 0x12);
        assert_eq!(header.codec_type().unwrap(), CodecType::ProtoBuffer);
        assert_eq!(header.compress_type().unwrap(), CompressType::Gzip);

        header.set_codec_type(CodecType::None);
        assert_eq!(header.compress_type().unwrap(), CompressType::Gzip);
        assert_eq!(header.codec_type().unwrap(), CodecType::None);
    }

    #[test]
    fn unknown_tags_are_reported() {
        let mut bytes = [0u8; FRAME_HEADER_SIZE];
        bytes[HEADER_MAGIC_OFFSET] = MAGIC_NUMBER;
        bytes[HEADER_TAGS_OFFSET] = 0x3f;
        bytes[HEADER_MESSAGE_KIND_OFFSET] = 9;
        let header = Header::from_bytes(bytes);

        assert!(header.check_magic_number());
        assert!(matches!(
            header.compress_type(),
            Err(FrameDecodeError::UnknownCompressType(3))
        ));
        assert!(matches!(
            header.codec_type(),
            Err(FrameDecodeError::UnknownCodecType(15))
        ));
        assert!(matches!(
            header.message_kind(),
            Err(FrameDecodeError::UnknownMessageKind(9))
        ));
    }
}
