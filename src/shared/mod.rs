pub mod geo;
pub mod mode;

pub use geo::*;
pub use mode::*;
