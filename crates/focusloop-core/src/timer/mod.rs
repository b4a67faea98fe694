mod clock;
mod engine;
mod policy;
mod ticker;

pub use clock::{deadline_after, seconds_until, Clock, ManualClock, SystemClock};
pub use engine::{CompletionListener, ListenerResult, Status, TimerEngine, TimerState};
pub use policy::{duration_for, next_session_type, SessionType};
pub use ticker::{Ticker, DEFAULT_TICK_PERIOD};
