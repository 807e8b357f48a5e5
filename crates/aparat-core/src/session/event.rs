use serde::{Deserialize, Serialize};

use super::model::DetailModule;
use crate::generation::GenerationResult;

/// Inputs to the session state machine: user actions and gateway outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// User leaves the landing screen.
    Start,
    /// User jumps to a hub section (manual, FAQ) from anywhere.
    Navigate,
    /// User drops or selects a file.
    SubmitAsset,
    /// Gateway returned a render.
    GenerationSucceeded { result: GenerationResult },
    /// Gateway failed, timed out or returned no image.
    GenerationFailed { reason: String },
    /// The submitted file could not be read.
    IngestFailed { reason: String },
    /// Explicit "start over": restores the credit and clears the lock.
    Reset,
    /// Leave the result screen, keeping the credit state.
    ReturnToHub,
    OpenDetail { module: DetailModule },
    CloseDetail,
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Start => "start",
            SessionEvent::Navigate => "navigate",
            SessionEvent::SubmitAsset => "submit_asset",
            SessionEvent::GenerationSucceeded { .. } => "generation_succeeded",
            SessionEvent::GenerationFailed { .. } => "generation_failed",
            SessionEvent::IngestFailed { .. } => "ingest_failed",
            SessionEvent::Reset => "reset",
            SessionEvent::ReturnToHub => "return_to_hub",
            SessionEvent::OpenDetail { .. } => "open_detail",
            SessionEvent::CloseDetail => "close_detail",
        }
    }
}

/// Transient, user-facing notices. None of them changes the screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Submit rejected: allowance spent (upsell point).
    Exhausted,
    /// Submit rejected: a generation is in flight.
    Busy,
    GenerationFailed { reason: String },
    ReadFailed { reason: String },
    /// Event does not apply to the current screen.
    Ignored { event: String },
}

/// Work the controller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ingest the pending asset and call the generation gateway.
    Dispatch,
    /// Spend the allowance and persist the lock.
    ConsumeCredit,
    /// Restore the allowance and clear the lock.
    ResetCredit,
    Notify(Notice),
}
