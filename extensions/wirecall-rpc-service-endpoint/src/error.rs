use std::io;
use thiserror::Error;
use wirecall_rpc_service::RpcResultStatus;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors reported synchronously by `ServiceRegistry::register`.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("rpc.Register: no service name for type {type_name}")]
    EmptyServiceName { type_name: &'static str },

    #[error("rpc.Register: type {0} is not exported")]
    ServiceNameNotExported(String),

    #[error(
        "rpc.Register: type {service} has no exported methods of suitable type{}",
        excluded_hint(.excluded)
    )]
    NoSuitableMethods {
        service: String,
        /// Methods that were offered but left out of the registry.
        excluded: Vec<String>,
    },

    #[error("rpc: service already defined: {0}")]
    DuplicateService(String),
}

fn excluded_hint(excluded: &[String]) -> String {
    if excluded.is_empty() {
        String::new()
    } else {
        format!(
            " (hint: excluded methods need exported, unique names: {})",
            excluded.join(", ")
        )
    }
}

/// Errors resolving a `"Type.Method"` string against the registry.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("rpc: service/method request ill-formed: {0:?}")]
    MalformedServiceMethod(String),

    #[error("rpc: can't find service {0}")]
    ServiceNotFound(String),

    #[error("rpc: can't find method {service}.{method}")]
    MethodNotFound { service: String, method: String },
}

impl DispatchError {
    pub fn status(&self) -> RpcResultStatus {
        match self {
            DispatchError::MalformedServiceMethod(_) => RpcResultStatus::MalformedServiceMethod,
            DispatchError::ServiceNotFound(_) => RpcResultStatus::ServiceNotFound,
            DispatchError::MethodNotFound { .. } => RpcResultStatus::MethodNotFound,
        }
    }
}

/// Failure of a single method invocation.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to decode argument: {0}")]
    DecodeArgument(io::Error),

    #[error("{0}")]
    Handler(BoxError),

    #[error("failed to encode reply: {0}")]
    EncodeReply(io::Error),
}

impl InvokeError {
    pub fn status(&self) -> RpcResultStatus {
        match self {
            InvokeError::Handler(_) => RpcResultStatus::Fail,
            InvokeError::DecodeArgument(_) | InvokeError::EncodeReply(_) => {
                RpcResultStatus::SystemError
            }
        }
    }
}
