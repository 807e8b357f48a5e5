//! Application layer for Aparat.
//!
//! Coordinates the domain state machine with the gateway and flag store
//! supplied by the outer layers.

pub mod session_usecase;

pub use session_usecase::SessionUseCase;
