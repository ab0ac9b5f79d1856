mod context;
pub use context::*;

mod dispatch;
pub use dispatch::*;

pub mod error;

mod registry;
pub use registry::*;
