mod replay;
mod roster;
mod round;
mod series;
mod stats;

pub use replay::*;
pub use roster::*;
pub use round::*;
pub use series::*;
pub use stats::*;
