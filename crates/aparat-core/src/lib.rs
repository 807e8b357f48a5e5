//! Domain layer for Aparat.
//!
//! Holds the session state machine, the credit gate and the contracts the
//! outer crates implement: [`credit::FlagStore`], [`asset::AssetSource`],
//! [`generation::GenerationGateway`] and [`secret::SecretService`].

pub mod asset;
pub mod config;
pub mod credit;
pub mod error;
pub mod generation;
pub mod secret;
pub mod session;

// Re-export common error type
pub use error::{AparatError, Result};
