use crate::{
    RpcMethod, RpcResultStatus, compression::decompress, error::RpcCallerError,
    format_service_method,
};
use std::io;
use wirecall::{
    constants::DEFAULT_MAX_FRAME_SIZE,
    frame::{Message, Metadata},
};

/// A transport able to carry one request frame and hand back its reply.
#[async_trait::async_trait]
pub trait RpcClientInterface {
    async fn call_rpc(&self, request: Message) -> Result<Message, io::Error>;
}

/// Performs a call to `service_name` using the method definition `M`.
///
/// Handles the full lifecycle of:
/// - Encoding the input and tagging the frame with `M::CODEC`
/// - Sending the request via the generic transport
/// - Translating the reply status and decoding the response
pub async fn call_rpc_method<M, C>(
    rpc_client: &C,
    service_name: &str,
    metadata: Metadata,
    input: M::Input,
) -> Result<M::Output, RpcCallerError>
where
    M: RpcMethod,
    C: RpcClientInterface + Send + Sync,
{
    let mut request = Message::request(
        format_service_method(service_name, M::METHOD_NAME),
        M::encode_request(input)?,
    );
    request.header.set_codec_type(M::CODEC);
    request.metadata = metadata;

    let service_method = request.service_method.clone();
    let reply = rpc_client.call_rpc(request).await?;
    ensure_reply_matches(&service_method, &reply)?;

    decode_reply::<M>(reply)
}

/// Checks that `reply` answers a request for `service_method`.
///
/// A reply with an empty service method is let through: a server that could
/// not decode the request frame has no name to echo back.
pub fn ensure_reply_matches(service_method: &str, reply: &Message) -> io::Result<()> {
    if reply.service_method.is_empty() || reply.service_method == service_method {
        return Ok(());
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        format!(
            "reply for {} does not answer the request for {}",
            reply.service_method, service_method
        ),
    ))
}

/// Converts a reply frame into the method's output, or into the error the
/// server reported.
pub fn decode_reply<M: RpcMethod>(reply: Message) -> Result<M::Output, RpcCallerError> {
    let status = RpcResultStatus::try_from(reply.header.result_status())
        .map_err(|e| RpcCallerError::UnknownStatus(e.number))?;

    match status {
        RpcResultStatus::Success => {
            let compress_type = reply
                .header
                .compress_type()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            let payload = decompress(compress_type, reply.payload, DEFAULT_MAX_FRAME_SIZE)?;
            Ok(M::decode_response(&payload)?)
        }
        RpcResultStatus::Fail => Err(RpcCallerError::RemoteError {
            message: String::from_utf8_lossy(&reply.payload).into_owned(),
        }),
        status => Err(RpcCallerError::RemoteSystemError {
            status,
            message: String::from_utf8_lossy(&reply.payload).into_owned(),
        }),
    }
}

/// Blanket `.call()` for every `RpcMethod`, so call sites read as
/// `Add::call(&client, "Arith", vec![1.0, 2.0])`.
#[async_trait::async_trait]
pub trait RpcCall: RpcMethod {
    async fn call<C>(
        rpc_client: &C,
        service_name: &str,
        input: Self::Input,
    ) -> Result<Self::Output, RpcCallerError>
    where
        C: RpcClientInterface + Send + Sync;

    async fn call_with_metadata<C>(
        rpc_client: &C,
        service_name: &str,
        metadata: Metadata,
        input: Self::Input,
    ) -> Result<Self::Output, RpcCallerError>
    where
        C: RpcClientInterface + Send + Sync;
}

#[async_trait::async_trait]
impl<T> RpcCall for T
where
    T: RpcMethod + Send + Sync + 'static,
    T::Input: Send + 'static,
    T::Output: Send + 'static,
{
    async fn call<C>(
        rpc_client: &C,
        service_name: &str,
        input: Self::Input,
    ) -> Result<Self::Output, RpcCallerError>
    where
        C: RpcClientInterface + Send + Sync,
    {
        call_rpc_method::<T, C>(rpc_client, service_name, Metadata::new(), input).await
    }

    async fn call_with_metadata<C>(
        rpc_client: &C,
        service_name: &str,
        metadata: Metadata,
        input: Self::Input,
    ) -> Result<Self::Output, RpcCallerError>
    where
        C: RpcClientInterface + Send + Sync,
    {
        call_rpc_method::<T, C>(rpc_client, service_name, metadata, input).await
    }
}
