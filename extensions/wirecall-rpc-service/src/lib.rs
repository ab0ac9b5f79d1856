mod caller;
pub use caller::*;
pub mod compression;
pub mod constants;
pub mod error;
mod method;
pub use method::*;
mod result_status;
pub use result_status::*;
mod service_method;
pub use service_method::*;
