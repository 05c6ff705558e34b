mod announcer;
mod bridge;
mod observer;
mod oscilloscope;
mod result_log;

pub use announcer::*;
pub use bridge::*;
pub use observer::*;
pub use oscilloscope::*;
pub use result_log::*;
