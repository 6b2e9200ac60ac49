pub mod position;

pub use position::{OpenPosition, Side};
