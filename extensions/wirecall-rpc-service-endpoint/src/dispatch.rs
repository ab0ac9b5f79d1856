use crate::{RpcContext, ServiceRegistry};
use std::fmt::Display;
use wirecall::frame::{CodecType, CompressType, Message, MessageKind};
use wirecall_rpc_service::{
    RpcResultStatus,
    compression::{compress, decompress},
};

/// Builds a reply to `request` carrying `status` and `message` as UTF-8 text.
///
/// Error replies never claim a codec or compression, whatever the request used.
pub fn error_reply(request: &Message, status: RpcResultStatus, message: impl Display) -> Message {
    let mut reply = Message::reply_to(request);
    reply.header.set_codec_type(CodecType::None);
    reply.header.set_compress_type(CompressType::None);
    reply.header.set_result_status(status.into());
    reply.payload = message.to_string().into_bytes();
    reply
}

impl ServiceRegistry {
    /// Routes `request` to its method and turns the outcome into a reply.
    ///
    /// Every failure becomes an error reply; this never returns without one.
    pub async fn dispatch(&self, ctx: RpcContext, request: Message) -> Message {
        match request.header.message_kind() {
            Ok(MessageKind::Request) => {}
            Ok(kind) => {
                return error_reply(
                    &request,
                    RpcResultStatus::ProtocolError,
                    format!("expected a request, got {kind:?}"),
                );
            }
            Err(err) => return error_reply(&request, RpcResultStatus::ProtocolError, err),
        }

        let (_receiver, method) = match self.lookup(&request.service_method) {
            Ok(found) => found,
            Err(err) => {
                tracing::debug!("Lookup failed: {}", err);
                return error_reply(&request, err.status(), err);
            }
        };

        let compress_type = match request.header.compress_type() {
            Ok(compress_type) => compress_type,
            Err(err) => return error_reply(&request, RpcResultStatus::SystemError, err),
        };

        let mut reply = Message::reply_to(&request);

        let max_payload_size = ctx.max_payload_size();
        let payload = match decompress(compress_type, request.payload, max_payload_size) {
            Ok(payload) => payload,
            Err(err) => {
                return error_reply(
                    &reply,
                    RpcResultStatus::SystemError,
                    format!("failed to decompress payload: {err}"),
                );
            }
        };

        let codec_type = request.header.codec_type();
        if codec_type.as_ref().ok() != Some(&method.codec()) {
            let shown = match codec_type {
                Ok(codec) => codec.to_string(),
                Err(err) => err.to_string(),
            };
            return error_reply(
                &reply,
                RpcResultStatus::UnsupportedCodec,
                format!(
                    "rpc: {} expects codec {}, request used {}",
                    reply.service_method,
                    method.codec(),
                    shown
                ),
            );
        }

        tracing::debug!(
            "Invoking {} ({} -> {})",
            reply.service_method,
            method.arg_type(),
            method.reply_type()
        );

        let encoded = match method.invoke(ctx, payload).await {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::debug!("{} failed: {}", reply.service_method, err);
                return error_reply(&reply, err.status(), err);
            }
        };

        match compress(compress_type, encoded) {
            Ok(payload) => {
                reply.header.set_result_status(RpcResultStatus::Success.into());
                reply.payload = payload;
                reply
            }
            Err(err) => error_reply(
                &reply,
                RpcResultStatus::SystemError,
                format!("failed to compress reply: {err}"),
            ),
        }
    }
}
