use example_wirecall_rpc_service_definition::{Add, Say};
use std::{
    io,
    sync::{Arc, Mutex},
};
use wirecall::frame::{CodecType, CompressType, Message, Metadata};
use wirecall_rpc_service::{
    RpcCall, RpcClientInterface, RpcMethod, RpcResultStatus, compression::compress,
    constants::TIMEOUT_METADATA_KEY, error::RpcCallerError,
};

// --- Test Setup: Mock Implementations ---

type Responder = Box<dyn Fn(&Message) -> io::Result<Message> + Send + Sync>;

/// A mock client that records each request and answers with a canned reply.
struct MockRpcClient {
    sent: Arc<Mutex<Vec<Message>>>,
    responder: Responder,
}

impl MockRpcClient {
    fn new(responder: impl Fn(&Message) -> io::Result<Message> + Send + Sync + 'static) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            responder: Box::new(responder),
        }
    }

    fn last_request(&self) -> Message {
        self.sent.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait::async_trait]
impl RpcClientInterface for MockRpcClient {
    async fn call_rpc(&self, request: Message) -> Result<Message, io::Error> {
        let reply = (self.responder)(&request);
        self.sent.lock().unwrap().push(request);
        reply
    }
}

fn reply_with(request: &Message, status: RpcResultStatus, payload: Vec<u8>) -> Message {
    let mut reply = Message::reply_to(request);
    reply.header.set_result_status(status.into());
    reply.payload = payload;
    reply
}

// --- Tests ---

#[tokio::test]
async fn call_tags_request_and_decodes_success() {
    let client = MockRpcClient::new(|request| {
        let numbers = Add::decode_request(&request.payload)?;
        let sum = numbers.iter().sum();
        Ok(reply_with(
            request,
            RpcResultStatus::Success,
            Add::encode_response(sum)?,
        ))
    });

    let result = Add::call(&client, "Arith", vec![1.0, 2.0, 3.0]).await.unwrap();
    assert_eq!(result, 6.0);

    let request = client.last_request();
    assert_eq!(request.service_method, "Arith.Add");
    assert_eq!(request.header.codec_type().unwrap(), CodecType::Json);
    assert!(!request.is_reply());
}

#[tokio::test]
async fn metadata_travels_with_the_request() {
    let client = MockRpcClient::new(|request| {
        Ok(reply_with(request, RpcResultStatus::Success, request.payload.clone()))
    });

    let mut metadata = Metadata::new();
    metadata.insert(TIMEOUT_METADATA_KEY.to_string(), "150".to_string());
    let echoed = Say::call_with_metadata(&client, "Echo", metadata, "hi".to_string())
        .await
        .unwrap();

    assert_eq!(echoed, "hi");
    let request = client.last_request();
    assert_eq!(request.metadata.get(TIMEOUT_METADATA_KEY).unwrap(), "150");
    assert_eq!(request.header.codec_type().unwrap(), CodecType::None);
}

#[tokio::test]
async fn gzip_reply_is_inflated() {
    let client = MockRpcClient::new(|request| {
        let mut reply = reply_with(
            request,
            RpcResultStatus::Success,
            compress(CompressType::Gzip, b"packed".to_vec())?,
        );
        reply.header.set_compress_type(CompressType::Gzip);
        Ok(reply)
    });

    let result = Say::call(&client, "Echo", "ignored".to_string()).await.unwrap();
    assert_eq!(result, "packed");
}

#[tokio::test]
async fn fail_status_is_a_remote_error() {
    let client = MockRpcClient::new(|request| {
        Ok(reply_with(
            request,
            RpcResultStatus::Fail,
            b"divide by zero".to_vec(),
        ))
    });

    let err = Add::call(&client, "Arith", vec![]).await.unwrap_err();
    match err {
        RpcCallerError::RemoteError { message } => assert_eq!(message, "divide by zero"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn other_statuses_are_system_errors() {
    let client = MockRpcClient::new(|request| {
        Ok(reply_with(
            request,
            RpcResultStatus::ServiceNotFound,
            b"rpc: can't find service Arith".to_vec(),
        ))
    });

    let err = Add::call(&client, "Arith", vec![1.0]).await.unwrap_err();
    assert!(matches!(
        err,
        RpcCallerError::RemoteSystemError {
            status: RpcResultStatus::ServiceNotFound,
            ref message,
        } if message.contains("can't find service")
    ));
}

#[tokio::test]
async fn unknown_status_byte_is_reported() {
    let client = MockRpcClient::new(|request| {
        let mut reply = Message::reply_to(request);
        reply.header.set_result_status(200);
        Ok(reply)
    });

    let err = Say::call(&client, "Echo", String::new()).await.unwrap_err();
    assert!(matches!(err, RpcCallerError::UnknownStatus(200)));
}

#[tokio::test]
async fn transport_errors_pass_through() {
    let client = MockRpcClient::new(|_| {
        Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "peer went away",
        ))
    });

    let err = Say::call(&client, "Echo", String::new()).await.unwrap_err();
    match err {
        RpcCallerError::Io(io_err) => assert_eq!(io_err.kind(), io::ErrorKind::ConnectionReset),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn reply_for_another_method_is_rejected() {
    let client = MockRpcClient::new(|request| {
        let mut reply = reply_with(request, RpcResultStatus::Success, b"{\"result\":3.0}".to_vec());
        reply.service_method = "Arith.Add".to_string();
        Ok(reply)
    });

    let err = Say::call(&client, "Echo", "hello".to_string()).await.unwrap_err();
    match err {
        RpcCallerError::Io(io_err) => {
            assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);
            assert!(io_err.to_string().contains("Arith.Add"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn nameless_reply_still_reports_its_status() {
    let client = MockRpcClient::new(|request| {
        let mut reply = reply_with(request, RpcResultStatus::ProtocolError, b"bad frame".to_vec());
        reply.service_method.clear();
        Ok(reply)
    });

    let err = Say::call(&client, "Echo", String::new()).await.unwrap_err();
    assert!(matches!(
        err,
        RpcCallerError::RemoteSystemError {
            status: RpcResultStatus::ProtocolError,
            ..
        }
    ));
}
