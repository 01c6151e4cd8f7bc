pub mod indicators;
pub mod trend;
pub mod analyzer;


pub use indicators::*;
pub use trend::*;
pub use analyzer::*;
