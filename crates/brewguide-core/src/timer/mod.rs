mod countdown;
mod tokio_countdown;
mod virtual_clock;

pub use countdown::{
    Countdown, CountdownHandle, Generation, TimerEvent, TimerEventKind, TimerSink,
    DEFAULT_TICK_INTERVAL,
};
pub use tokio_countdown::{TokioCountdown, TokioCountdownHandle};
pub use virtual_clock::{VirtualClock, VirtualCountdownHandle};
