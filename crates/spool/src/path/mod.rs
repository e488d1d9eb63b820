mod command;
mod tracker;

pub use command::*;
pub use tracker::*;
