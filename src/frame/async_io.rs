use crate::{
    constants::FRAME_PREFIX_SIZE,
    frame::{FrameCodec, FrameDecodeError, Message},
};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Reads one frame from an async reader.
///
/// Same contract as `FrameCodec::decode_with_limit`: `Ok(None)` on a clean
/// end of stream before the frame starts, `InvalidMagicNumber` after a
/// single byte, `TruncatedFrame` on any EOF inside the frame. Awaits until
/// the full frame has arrived.
pub async fn read_message<R>(
    reader: &mut R,
    max_frame_size: usize,
) -> Result<Option<Message>, FrameDecodeError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; FRAME_PREFIX_SIZE];

    if read_full(reader, &mut prefix[..1]).await? == 0 {
        return Ok(None);
    }
    FrameCodec::check_magic(prefix[0])?;

    let filled = 1 + read_full(reader, &mut prefix[1..]).await?;
    let (header, body_len) = FrameCodec::decode_prefix(&prefix, filled, max_frame_size)?;

    let mut body = vec![0u8; body_len];
    let read = read_full(reader, &mut body).await?;
    FrameCodec::check_body_read(body_len, read)?;

    FrameCodec::decode_body(header, &body).map(Some)
}

/// Encodes `message` and writes it to `writer`. Does not flush.
pub async fn write_message<W>(writer: &mut W, message: &Message) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = FrameCodec::encode(message)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    writer.write_all(&bytes).await
}

async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_MAX_FRAME_SIZE;

    #[tokio::test]
    async fn async_and_sync_decoders_fail_alike_at_every_cut() {
        let message = Message::request("Echo.Say", b"hello".to_vec()).with_metadata("lang", "en");
        let bytes = FrameCodec::encode(&message).unwrap();

        for cut in 0..bytes.len() {
            let partial = &bytes[..cut];
            let sync = FrameCodec::decode(&mut &partial[..]);
            let mut reader = partial;
            let async_result = read_message(&mut reader, DEFAULT_MAX_FRAME_SIZE).await;
            assert_eq!(
                format!("{sync:?}"),
                format!("{async_result:?}"),
                "decoders disagree at cut {cut}"
            );
        }

        let mut reader = &bytes[..];
        let decoded = read_message(&mut reader, DEFAULT_MAX_FRAME_SIZE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(decoded, message);
    }
}
