pub mod bar;
pub mod loader;

pub use bar::{Bar, BarError};
pub use loader::load_csv;
