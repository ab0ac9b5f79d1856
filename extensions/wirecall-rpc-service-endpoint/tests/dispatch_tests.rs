use example_wirecall_rpc_service_definition::{Add, Div, DivArgs, Say};
use std::sync::Arc;
use wirecall::frame::{CodecType, CompressType, Message, MessageKind};
use wirecall_rpc_service::{
    RpcMethod, RpcResultStatus,
    compression::{compress, decompress},
};
use wirecall_rpc_service_endpoint::{
    MethodSet, RpcContext, RpcService, ServiceRegistry, error::BoxError, error_reply,
};

struct Echo;

impl RpcService for Echo {
    fn register_methods(methods: &mut MethodSet<Self>) {
        methods.add::<Say, _, _>(|_this, ctx, text| async move {
            match ctx.metadata().get("prefix") {
                Some(prefix) => Ok(format!("{prefix}{text}")),
                None => Ok(text),
            }
        });
    }
}

struct Arith;

impl RpcService for Arith {
    fn register_methods(methods: &mut MethodSet<Self>) {
        methods
            .add::<Add, _, _>(|_this, _ctx, numbers| async move { Ok(numbers.iter().sum()) })
            .add::<Div, _, _>(|_this, _ctx, args: DivArgs| async move {
                if args.divisor == 0.0 {
                    return Err(BoxError::from("divide by zero"));
                }
                Ok(args.dividend / args.divisor)
            });
    }
}

fn registry() -> ServiceRegistry {
    let registry = ServiceRegistry::new();
    registry.register(Arc::new(Echo)).unwrap();
    registry.register(Arc::new(Arith)).unwrap();
    registry
}

fn request<M: RpcMethod>(service_name: &str, input: M::Input) -> Message {
    let mut request = Message::request(
        format!("{service_name}.{}", M::METHOD_NAME),
        M::encode_request(input).unwrap(),
    );
    request.header.set_codec_type(M::CODEC);
    request
}

async fn dispatch(registry: &ServiceRegistry, request: Message) -> Message {
    let ctx = RpcContext::from_request(&request, None);
    registry.dispatch(ctx, request).await
}

fn status(reply: &Message) -> RpcResultStatus {
    RpcResultStatus::try_from(reply.header.result_status()).unwrap()
}

fn text(reply: &Message) -> String {
    String::from_utf8(reply.payload.clone()).unwrap()
}

#[tokio::test]
async fn successful_call_replies_with_encoded_result() {
    let registry = registry();

    let reply = dispatch(&registry, request::<Add>("Arith", vec![1.0, 2.0, 3.5])).await;

    assert!(reply.is_reply());
    assert_eq!(status(&reply), RpcResultStatus::Success);
    assert_eq!(reply.service_method, "Arith.Add");
    assert_eq!(reply.header.codec_type().unwrap(), CodecType::Json);
    assert_eq!(Add::decode_response(&reply.payload).unwrap(), 6.5);
}

#[tokio::test]
async fn handler_sees_request_metadata() {
    let registry = registry();

    let request = request::<Say>("Echo", "world".into()).with_metadata("prefix", "hello ");
    let reply = dispatch(&registry, request).await;

    assert_eq!(status(&reply), RpcResultStatus::Success);
    assert_eq!(text(&reply), "hello world");
}

#[tokio::test]
async fn handler_error_is_a_fail_reply() {
    let registry = registry();

    let args = DivArgs {
        dividend: 1.0,
        divisor: 0.0,
    };
    let reply = dispatch(&registry, request::<Div>("Arith", args)).await;

    assert_eq!(status(&reply), RpcResultStatus::Fail);
    assert_eq!(text(&reply), "divide by zero");
    assert_eq!(reply.header.codec_type().unwrap(), CodecType::None);
}

#[tokio::test]
async fn lookup_failures_map_to_their_statuses() {
    let registry = registry();

    let cases = [
        ("Echo.Shout", RpcResultStatus::MethodNotFound),
        ("Nope.Say", RpcResultStatus::ServiceNotFound),
        ("EchoSay", RpcResultStatus::MalformedServiceMethod),
    ];
    for (service_method, expected) in cases {
        let reply = dispatch(&registry, Message::request(service_method, vec![])).await;
        assert_eq!(status(&reply), expected, "{service_method}");
        assert_eq!(reply.service_method, service_method);
        assert!(!reply.payload.is_empty());
    }
}

#[tokio::test]
async fn codec_mismatch_is_unsupported() {
    let registry = registry();

    let mut request = request::<Add>("Arith", vec![1.0]);
    request.header.set_codec_type(CodecType::ProtoBuffer);
    let reply = dispatch(&registry, request).await;

    assert_eq!(status(&reply), RpcResultStatus::UnsupportedCodec);
    assert!(text(&reply).contains("json"));
}

#[tokio::test]
async fn undecodable_argument_is_a_system_error() {
    let registry = registry();

    let mut request = Message::request("Arith.Add", b"not json".to_vec());
    request.header.set_codec_type(CodecType::Json);
    let reply = dispatch(&registry, request).await;

    assert_eq!(status(&reply), RpcResultStatus::SystemError);
    assert!(text(&reply).starts_with("failed to decode argument"));
}

#[tokio::test]
async fn gzip_request_gets_gzip_reply() {
    let registry = registry();

    let mut request = request::<Say>("Echo", "squeeze me".into());
    request.header.set_compress_type(CompressType::Gzip);
    request.payload = compress(CompressType::Gzip, request.payload).unwrap();

    let reply = dispatch(&registry, request).await;

    assert_eq!(status(&reply), RpcResultStatus::Success);
    assert_eq!(reply.header.compress_type().unwrap(), CompressType::Gzip);
    let payload = decompress(CompressType::Gzip, reply.payload, 1024).unwrap();
    assert_eq!(payload, b"squeeze me");
}

#[tokio::test]
async fn corrupt_gzip_is_a_system_error() {
    let registry = registry();

    let mut request = request::<Say>("Echo", "x".into());
    request.header.set_compress_type(CompressType::Gzip);
    request.payload = vec![0xde, 0xad];

    let reply = dispatch(&registry, request).await;

    assert_eq!(status(&reply), RpcResultStatus::SystemError);
    assert_eq!(reply.header.compress_type().unwrap(), CompressType::None);
}

#[tokio::test]
async fn corrupt_gzip_is_reported_before_codec_mismatch() {
    let registry = registry();

    let mut request = request::<Add>("Arith", vec![1.0]);
    request.header.set_codec_type(CodecType::ProtoBuffer);
    request.header.set_compress_type(CompressType::Gzip);
    request.payload = vec![0xde, 0xad];

    let reply = dispatch(&registry, request).await;

    assert_eq!(status(&reply), RpcResultStatus::SystemError);
    assert!(text(&reply).starts_with("failed to decompress payload"));
}

#[tokio::test]
async fn inflating_past_the_context_limit_is_a_system_error() {
    let registry = registry();

    let mut request = request::<Say>("Echo", "z".repeat(4096));
    request.header.set_compress_type(CompressType::Gzip);
    request.payload = compress(CompressType::Gzip, request.payload).unwrap();
    assert!(request.payload.len() < 256);

    let ctx = RpcContext::from_request(&request, None).with_max_payload_size(256);
    let reply = registry.dispatch(ctx, request).await;

    assert_eq!(status(&reply), RpcResultStatus::SystemError);
    assert!(text(&reply).contains("exceeds 256 bytes"));
}

#[tokio::test]
async fn reply_sent_as_request_is_a_protocol_error() {
    let registry = registry();

    let mut request = request::<Say>("Echo", "x".into());
    request.header.set_message_kind(MessageKind::Reply);
    let reply = dispatch(&registry, request).await;

    assert_eq!(status(&reply), RpcResultStatus::ProtocolError);
}

#[test]
fn error_reply_clears_tags() {
    let mut request = Message::request("Arith.Add", vec![1, 2, 3]);
    request.header.set_codec_type(CodecType::Json);
    request.header.set_compress_type(CompressType::Gzip);

    let reply = error_reply(&request, RpcResultStatus::DeadlineExceeded, "too slow");

    assert!(reply.is_reply());
    assert_eq!(reply.header.codec_type().unwrap(), CodecType::None);
    assert_eq!(reply.header.compress_type().unwrap(), CompressType::None);
    assert_eq!(reply.header.result_status(), 8);
    assert_eq!(reply.payload, b"too slow");
    assert_eq!(reply.service_method, "Arith.Add");
}
