mod mote_handle;
mod session_handle;
mod sse_handle;

pub use mote_handle::*;
pub use session_handle::*;
pub use sse_handle::*;
