pub mod cost;
pub mod energy;
pub mod projection;
pub mod units;
