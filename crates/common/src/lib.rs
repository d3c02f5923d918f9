//! Shared value types used across the tableau crates.

mod types;

pub use types::{Color3, EntityId, Transform};
