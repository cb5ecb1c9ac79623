pub mod player;
pub mod unit;

pub use player::*;
pub use unit::*;
