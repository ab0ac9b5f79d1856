use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Outcome of a call, carried in header byte 4 of a reply frame.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
pub enum RpcResultStatus {
    Success = 0,
    /// The handler ran and returned an error.
    Fail = 1,
    /// The argument or the reply could not be converted.
    SystemError = 2,
    MethodNotFound = 3,
    ServiceNotFound = 4,
    MalformedServiceMethod = 5,
    /// The request frame itself could not be read.
    ProtocolError = 6,
    UnsupportedCodec = 7,
    DeadlineExceeded = 8,
}
