pub mod config;
pub mod instructions;
pub mod plan;
pub mod sequencer;
pub mod session;

pub use config::{SessionBlock, SessionConfig};
pub use plan::TrialPlan;
pub use sequencer::{Devices, SessionContext, TrialOutcome, TrialSequencer, TrialSummary};
pub use session::{SessionDriver, SessionOutcome};
