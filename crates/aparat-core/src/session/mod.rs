//! Session state and the view-state machine.

pub mod event;
pub mod machine;
pub mod model;

pub use event::{Effect, Notice, SessionEvent};
pub use machine::{Transition, transition};
pub use model::{DetailModule, Screen, Session};
