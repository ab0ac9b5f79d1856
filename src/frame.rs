mod frame_codec;
mod frame_error;
mod header;
mod header_tags;
mod message;

#[cfg(feature = "tokio_support")]
mod async_io;

pub use frame_codec::FrameCodec;
pub use frame_error::{FrameDecodeError, FrameEncodeError};
pub use header::Header;
pub use header_tags::{CodecType, CompressType, MessageKind};
pub use message::{Message, Metadata};

#[cfg(feature = "tokio_support")]
pub use async_io::{read_message, write_message};
