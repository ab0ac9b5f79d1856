use std::io;
use wirecall::frame::CodecType;

/// Describes one callable method: its name, how its payload is tagged, and
/// how its argument and reply move to and from bytes.
///
/// Both sides of a call share the same definition, so the server can
/// decode exactly what the client encoded.
pub trait RpcMethod {
    /// Method part of the `"Type.Method"` name. Must be an exported identifier.
    const METHOD_NAME: &'static str;

    /// Codec tag written on requests and expected by the server.
    const CODEC: CodecType = CodecType::None;

    /// The high-level input type expected by the request encoder (e.g., `Vec<f64>`).
    type Input;

    /// The high-level output type returned from the response encoder (e.g., `f64`).
    type Output;

    /// Encodes the request into a byte array.
    fn encode_request(input: Self::Input) -> Result<Vec<u8>, io::Error>;

    /// Decodes raw request bytes into a typed request.
    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error>;

    /// Encodes the response value into a byte array.
    fn encode_response(output: Self::Output) -> Result<Vec<u8>, io::Error>;

    /// Decodes raw response bytes into a typed response.
    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error>;
}
