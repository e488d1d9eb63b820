#![doc = include_str!("../README.md")]
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod dispatch;
mod driver;
mod error;
mod generator;
mod path;
mod script;
mod segment;
mod source;
mod status;
#[cfg(test)]
mod testing;
mod transport;

pub use crate::dispatch::*;
pub use crate::driver::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::path::*;
pub use crate::script::*;
pub use crate::segment::*;
pub use crate::source::*;
pub use crate::status::*;
pub use crate::transport::*;
