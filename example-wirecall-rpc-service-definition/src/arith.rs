use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::io;
use wirecall::frame::CodecType;
use wirecall_rpc_service::RpcMethod;

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct NumbersParams {
    pub numbers: Vec<f64>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct ResultParams {
    pub result: f64,
}

/// Argument of `Arith.Div`.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Copy)]
pub struct DivArgs {
    pub dividend: f64,
    pub divisor: f64,
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, io::Error> {
    serde_json::to_vec(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, io::Error> {
    serde_json::from_slice(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// `Arith.Add`: sum of a list of numbers.
pub struct Add;

impl RpcMethod for Add {
    const METHOD_NAME: &'static str = "Add";
    const CODEC: CodecType = CodecType::Json;

    type Input = Vec<f64>;
    type Output = f64;

    fn encode_request(numbers: Self::Input) -> Result<Vec<u8>, io::Error> {
        to_json(&NumbersParams { numbers })
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error> {
        let raw: NumbersParams = from_json(bytes)?;
        Ok(raw.numbers)
    }

    fn encode_response(result: Self::Output) -> Result<Vec<u8>, io::Error> {
        to_json(&ResultParams { result })
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error> {
        let raw: ResultParams = from_json(bytes)?;
        Ok(raw.result)
    }
}

/// `Arith.Mult`: product of a list of numbers.
pub struct Mult;

impl RpcMethod for Mult {
    const METHOD_NAME: &'static str = "Mult";
    const CODEC: CodecType = CodecType::Json;

    type Input = Vec<f64>;
    type Output = f64;

    fn encode_request(numbers: Self::Input) -> Result<Vec<u8>, io::Error> {
        to_json(&NumbersParams { numbers })
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error> {
        let raw: NumbersParams = from_json(bytes)?;
        Ok(raw.numbers)
    }

    fn encode_response(result: Self::Output) -> Result<Vec<u8>, io::Error> {
        to_json(&ResultParams { result })
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error> {
        let raw: ResultParams = from_json(bytes)?;
        Ok(raw.result)
    }
}

/// `Arith.Div`: quotient of two numbers. Dividing by zero is a handler error.
pub struct Div;

impl RpcMethod for Div {
    const METHOD_NAME: &'static str = "Div";
    const CODEC: CodecType = CodecType::Json;

    type Input = DivArgs;
    type Output = f64;

    fn encode_request(input: Self::Input) -> Result<Vec<u8>, io::Error> {
        to_json(&input)
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error> {
        from_json(bytes)
    }

    fn encode_response(result: Self::Output) -> Result<Vec<u8>, io::Error> {
        to_json(&ResultParams { result })
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error> {
        let raw: ResultParams = from_json(bytes)?;
        Ok(raw.result)
    }
}
