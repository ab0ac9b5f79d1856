use std::io;
use wirecall_rpc_service::RpcMethod;

/// `Echo.Say`: returns its UTF-8 argument unchanged.
pub struct Say;

impl RpcMethod for Say {
    const METHOD_NAME: &'static str = "Say";

    type Input = String;
    type Output = String;

    fn encode_request(input: Self::Input) -> Result<Vec<u8>, io::Error> {
        Ok(input.into_bytes())
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn encode_response(output: Self::Output) -> Result<Vec<u8>, io::Error> {
        Ok(output.into_bytes())
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
