pub mod map;
pub mod terrain;
pub mod tile;

pub use map::*;
pub use terrain::*;
pub use tile::*;
