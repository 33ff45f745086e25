pub mod clock;
pub mod logger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use logger::{init_logger, LogContext, TimedOperation};
