pub mod control;
pub mod smoothing;
pub mod stoch;

pub use control::*;
pub use smoothing::*;
pub use stoch::*;
