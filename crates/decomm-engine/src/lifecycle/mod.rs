pub mod manager;
pub mod outcome;

pub use manager::LifecycleManager;
pub use outcome::{BatchReport, Disposition, ReviewAction, TransitionOutcome};
