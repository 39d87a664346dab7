mod driver;
mod session;
mod view;

// Public API of the practice subsystem.
pub use driver::{PracticeDriver, PracticeHandle};
pub use session::{PracticeSession, PracticeState, TickOutcome};
pub use view::{PracticeView, Progress};
