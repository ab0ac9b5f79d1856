pub mod arith;
pub mod echo;

pub use arith::{Add, Div, DivArgs, Mult};
pub use echo::Say;
