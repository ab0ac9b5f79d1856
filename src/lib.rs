//! # wirecall
//!
//! The framing layer of a minimal RPC substrate.
//!
//! A request travels as one self-delimiting frame: a fixed 12-byte header
//! followed by a length-prefixed body carrying the `"Type.Method"` name,
//! string metadata and an opaque payload. This crate only moves bytes; it
//! never compresses or serializes the payload. The header merely tags how
//! the payload should be read, and the dispatch layer acts on those tags.
//!
//! ```
//! use wirecall::frame::{FrameCodec, Message};
//!
//! let mut request = Message::request("Echo.Say", b"hi".to_vec());
//! request.metadata.insert("lang".into(), "en".into());
//!
//! let bytes = FrameCodec::encode(&request).unwrap();
//! let decoded = FrameCodec::decode(&mut bytes.as_slice()).unwrap().unwrap();
//!
//! assert_eq!(decoded, request);
//! ```

pub mod constants;
pub mod frame;
