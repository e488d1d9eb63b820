mod interface;
#[cfg(feature = "async-tokio")]
mod tokio;

pub use interface::*;
#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
pub use self::tokio::*;
