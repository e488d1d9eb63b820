mod file;
mod interface;
mod io;
mod net;
mod task;
mod tcp;

pub use file::*;
pub use interface::*;
pub use io::*;
pub use net::*;
pub use task::*;
pub use tcp::*;
