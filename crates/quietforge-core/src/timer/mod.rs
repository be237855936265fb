mod clock;
pub mod format;
mod session;

pub use clock::{Elapsed, RitualClock};
pub use session::{RitualSession, SessionFrame, SessionState};
