pub mod actions;
pub mod triage;

pub use actions::{Action, ActionError, ActionHandler, ActionKind, ActionOutcome, ModifyPrompt};
pub use triage::{PassStatus, PassSummary, TriageOrchestrator};
