use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use std::io::{self, Read, Write};
use wirecall::frame::CompressType;

/// Compresses `bytes` according to `kind`.
pub fn compress(kind: CompressType, bytes: Vec<u8>) -> io::Result<Vec<u8>> {
    match kind {
        CompressType::None => Ok(bytes),
        CompressType::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&bytes)?;
            encoder.finish()
        }
    }
}

/// Reverses `compress`, refusing to inflate past `limit` bytes.
pub fn decompress(kind: CompressType, bytes: Vec<u8>, limit: usize) -> io::Result<Vec<u8>> {
    match kind {
        CompressType::None => Ok(bytes),
        CompressType::Gzip => {
            let mut inflated = Vec::new();
            GzDecoder::new(bytes.as_slice())
                .take((limit as u64).saturating_add(1))
                .read_to_end(&mut inflated)?;
            if inflated.len() > limit {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("decompressed payload exceeds {limit} bytes"),
                ));
            }
            Ok(inflated)
        }
    }
}
