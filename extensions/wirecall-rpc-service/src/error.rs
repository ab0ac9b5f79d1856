use crate::RpcResultStatus;
use std::io;
use thiserror::Error;

/// Represents errors that can occur during an RPC call from the perspective of the caller.
#[derive(Debug, Error)]
pub enum RpcCallerError {
    /// A transport-level or I/O error occurred during the call.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The remote handler executed but returned an error.
    #[error("Remote handler failed: {message}")]
    RemoteError { message: String },

    /// The call never reached a handler, or its payload could not be converted.
    #[error("Remote system error ({status:?}): {message}")]
    RemoteSystemError {
        status: RpcResultStatus,
        message: String,
    },

    /// The reply carried a status byte this client does not know.
    #[error("Unknown result status: {0}")]
    UnknownStatus(u8),
}
