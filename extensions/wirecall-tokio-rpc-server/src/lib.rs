mod config;
pub use config::*;

mod connection_set;
pub use connection_set::*;

mod rpc_server;
pub use rpc_server::*;

pub mod utils;

pub use wirecall_rpc_service_endpoint::{
    MethodSet, RpcContext, RpcService, ServiceRegistry, error::BoxError,
};
