use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameEncodeError {
    /// A section is longer than a `u32` length prefix can describe.
    #[error("{section} is too long to frame: {len} bytes")]
    SectionTooLarge { section: &'static str, len: usize },
}

/// Errors raised while reading a frame. All of them are fatal to the frame
/// being read; the stream is not resynchronized afterwards.
#[derive(Debug, Error)]
pub enum FrameDecodeError {
    /// The first byte of the frame is not `MAGIC_NUMBER`.
    #[error("wrong magic number: {0}")]
    InvalidMagicNumber(u8),

    /// The stream or the body ended before a declared length was satisfied.
    #[error("truncated frame: needed {needed} bytes, got {available}")]
    TruncatedFrame { needed: usize, available: usize },

    /// A metadata pair runs past the declared metadata block, or is not UTF-8.
    #[error("wrong metadata block: some keys or values are missing")]
    MetadataMalformed,

    #[error("service method is not valid UTF-8")]
    InvalidServiceMethodEncoding,

    #[error("frame is too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("unknown compress type: {0}")]
    UnknownCompressType(u8),

    #[error("unknown codec type: {0}")]
    UnknownCodecType(u8),

    #[error("unknown message kind: {0}")]
    UnknownMessageKind(u8),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
