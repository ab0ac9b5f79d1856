use crate::{
    constants::{
        DEFAULT_MAX_FRAME_SIZE, FRAME_HEADER_SIZE, FRAME_LENGTH_FIELD_SIZE, FRAME_PREFIX_SIZE,
        MAGIC_NUMBER,
    },
    frame::{FrameDecodeError, FrameEncodeError, Header, Message, Metadata},
};
use bytes::{Buf, BufMut};
use std::io::{self, Read};

/// Provides encoding and decoding functionality for message frames.
///
/// The wire layout, all integers big-endian `u32`:
///
/// ```text
/// [12-byte header]
/// [body length L]
/// body (L bytes):
///   [len][service method]
///   [len][metadata block: repeated [keylen][key][vallen][val]]
///   [len][payload]    <- the payload length is advisory only
/// ```
///
/// Decoding never reads past the frame it was asked for, so a reader can be
/// handed to `decode` repeatedly to pull consecutive frames off one stream.
pub struct FrameCodec;

impl FrameCodec {
    /// Encodes a `Message` into a byte vector.
    ///
    /// # Errors
    ///
    /// Fails with `FrameEncodeError::SectionTooLarge` if any section, or the
    /// body as a whole, is longer than a `u32` length prefix allows.
    pub fn encode(message: &Message) -> Result<Vec<u8>, FrameEncodeError> {
        let service_method = message.service_method.as_bytes();

        let metadata_len = message
            .metadata
            .iter()
            .map(|(key, value)| 2 * FRAME_LENGTH_FIELD_SIZE + key.len() + value.len())
            .sum::<usize>();

        let body_len = 3 * FRAME_LENGTH_FIELD_SIZE
            + service_method.len()
            + metadata_len
            + message.payload.len();

        let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + FRAME_LENGTH_FIELD_SIZE + body_len);

        buf.extend_from_slice(message.header.as_bytes());
        buf.put_u32(length_prefix("frame body", body_len)?);

        put_section(&mut buf, "service method", service_method)?;

        buf.put_u32(length_prefix("metadata block", metadata_len)?);
        for (key, value) in &message.metadata {
            put_section(&mut buf, "metadata key", key.as_bytes())?;
            put_section(&mut buf, "metadata value", value.as_bytes())?;
        }

        put_section(&mut buf, "payload", &message.payload)?;

        Ok(buf)
    }

    /// Reads one frame from `reader` using `DEFAULT_MAX_FRAME_SIZE`.
    pub fn decode<R: Read>(reader: &mut R) -> Result<Option<Message>, FrameDecodeError> {
        Self::decode_with_limit(reader, DEFAULT_MAX_FRAME_SIZE)
    }

    /// Reads one frame from `reader`.
    ///
    /// Returns `Ok(None)` if the stream ends before the first byte of a
    /// frame, which is how a peer closes between requests. A wrong magic
    /// number fails after exactly one byte has been consumed.
    ///
    /// # Errors
    ///
    /// - `InvalidMagicNumber` if byte 0 is not `MAGIC_NUMBER`.
    /// - `TruncatedFrame` if the stream ends inside the frame.
    /// - `FrameTooLarge` if the announced body exceeds `max_frame_size`.
    /// - Any error from `decode_body`.
    pub fn decode_with_limit<R: Read>(
        reader: &mut R,
        max_frame_size: usize,
    ) -> Result<Option<Message>, FrameDecodeError> {
        let mut prefix = [0u8; FRAME_PREFIX_SIZE];

        if read_full(reader, &mut prefix[..1])? == 0 {
            return Ok(None);
        }
        Self::check_magic(prefix[0])?;

        let filled = 1 + read_full(reader, &mut prefix[1..])?;
        let (header, body_len) = Self::decode_prefix(&prefix, filled, max_frame_size)?;

        let mut body = vec![0u8; body_len];
        let read = read_full(reader, &mut body)?;
        Self::check_body_read(body_len, read)?;

        Self::decode_body(header, &body).map(Some)
    }

    /// Rejects a frame whose first byte is not `MAGIC_NUMBER`.
    pub fn check_magic(first_byte: u8) -> Result<(), FrameDecodeError> {
        if first_byte != MAGIC_NUMBER {
            return Err(FrameDecodeError::InvalidMagicNumber(first_byte));
        }
        Ok(())
    }

    /// Splits the fixed-size frame prefix into its header and checked body length.
    ///
    /// `filled` is how many prefix bytes actually arrived; anything short of
    /// `FRAME_PREFIX_SIZE` is reported as a truncated header or length field.
    pub fn decode_prefix(
        prefix: &[u8; FRAME_PREFIX_SIZE],
        filled: usize,
        max_frame_size: usize,
    ) -> Result<(Header, usize), FrameDecodeError> {
        if filled < FRAME_HEADER_SIZE {
            return Err(FrameDecodeError::TruncatedFrame {
                needed: FRAME_HEADER_SIZE,
                available: filled,
            });
        }
        if filled < FRAME_PREFIX_SIZE {
            return Err(FrameDecodeError::TruncatedFrame {
                needed: FRAME_LENGTH_FIELD_SIZE,
                available: filled - FRAME_HEADER_SIZE,
            });
        }

        let (header_bytes, length_bytes) = prefix.split_at(FRAME_HEADER_SIZE);
        let mut header = [0u8; FRAME_HEADER_SIZE];
        header.copy_from_slice(header_bytes);
        let mut length = [0u8; FRAME_LENGTH_FIELD_SIZE];
        length.copy_from_slice(length_bytes);

        let body_len = Self::checked_body_len(length, max_frame_size)?;
        Ok((Header::from_bytes(header), body_len))
    }

    /// Fails with `TruncatedFrame` when fewer than `body_len` body bytes arrived.
    pub fn check_body_read(body_len: usize, read: usize) -> Result<(), FrameDecodeError> {
        if read < body_len {
            return Err(FrameDecodeError::TruncatedFrame {
                needed: body_len,
                available: read,
            });
        }
        Ok(())
    }

    /// Interprets a body length prefix, rejecting lengths above `max_frame_size`.
    pub fn checked_body_len(
        length_bytes: [u8; FRAME_LENGTH_FIELD_SIZE],
        max_frame_size: usize,
    ) -> Result<usize, FrameDecodeError> {
        let body_len = u32::from_be_bytes(length_bytes) as usize;
        if body_len > max_frame_size {
            return Err(FrameDecodeError::FrameTooLarge {
                size: body_len,
                max: max_frame_size,
            });
        }
        Ok(body_len)
    }

    /// Parses a complete frame body that followed `header` on the wire.
    ///
    /// Every length prefix is checked against what is left of the body, so
    /// a corrupt length yields an error rather than an out-of-range read.
    pub fn decode_body(header: Header, body: &[u8]) -> Result<Message, FrameDecodeError> {
        let mut buf = body;

        let service_method = std::str::from_utf8(take_section(&mut buf)?)
            .map_err(|_| FrameDecodeError::InvalidServiceMethodEncoding)?
            .to_owned();

        let metadata = decode_metadata(take_section(&mut buf)?)?;

        // The payload length is advisory: everything after it is payload.
        get_length(&mut buf)?;
        let payload = buf.to_vec();

        Ok(Message {
            header,
            service_method,
            metadata,
            payload,
        })
    }
}

fn length_prefix(section: &'static str, len: usize) -> Result<u32, FrameEncodeError> {
    u32::try_from(len).map_err(|_| FrameEncodeError::SectionTooLarge { section, len })
}

fn put_section(
    buf: &mut Vec<u8>,
    section: &'static str,
    bytes: &[u8],
) -> Result<(), FrameEncodeError> {
    buf.put_u32(length_prefix(section, bytes.len())?);
    buf.put_slice(bytes);
    Ok(())
}

fn get_length(buf: &mut &[u8]) -> Result<usize, FrameDecodeError> {
    if buf.remaining() < FRAME_LENGTH_FIELD_SIZE {
        return Err(FrameDecodeError::TruncatedFrame {
            needed: FRAME_LENGTH_FIELD_SIZE,
            available: buf.remaining(),
        });
    }
    Ok(buf.get_u32() as usize)
}

fn take_section<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], FrameDecodeError> {
    let len = get_length(buf)?;
    let remaining: &'a [u8] = *buf;
    if remaining.len() < len {
        return Err(FrameDecodeError::TruncatedFrame {
            needed: len,
            available: remaining.len(),
        });
    }
    let (section, rest) = remaining.split_at(len);
    *buf = rest;
    Ok(section)
}

fn decode_metadata(block: &[u8]) -> Result<Metadata, FrameDecodeError> {
    let mut metadata = Metadata::new();
    let mut buf = block;

    while !buf.is_empty() {
        let key = take_metadata_string(&mut buf)?;
        let value = take_metadata_string(&mut buf)?;
        if let Some(previous) = metadata.insert(key, value) {
            tracing::debug!("Duplicate metadata key; replaced value {:?}", previous);
        }
    }

    Ok(metadata)
}

// Inside the metadata block any overrun is a malformed block, not a
// truncated frame: the block length itself was satisfied.
fn take_metadata_string(buf: &mut &[u8]) -> Result<String, FrameDecodeError> {
    if buf.remaining() < FRAME_LENGTH_FIELD_SIZE {
        return Err(FrameDecodeError::MetadataMalformed);
    }
    let len = buf.get_u32() as usize;
    let remaining: &[u8] = *buf;
    if remaining.len() < len {
        return Err(FrameDecodeError::MetadataMalformed);
    }
    let (bytes, rest) = remaining.split_at(len);
    *buf = rest;
    String::from_utf8(bytes.to_vec()).map_err(|_| FrameDecodeError::MetadataMalformed)
}

/// Like `read_exact`, but reports how many bytes arrived before EOF.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
