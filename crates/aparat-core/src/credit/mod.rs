//! Credit gate and its durable lock flag.

pub mod gate;
pub mod repository;

pub use gate::CreditGate;
pub use repository::{FlagStore, LOCK_FLAG_KEY};
