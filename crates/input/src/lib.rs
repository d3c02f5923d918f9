//! Camera controls: raw pointer input mapped to orbit and zoom actions.
//!
//! # Invariants
//! - Hosts feed pointer events; only [`CameraAction`]s reach the camera.
//! - Actions never move a camera whose controls are detached.

pub mod action;
pub mod controls;

pub use action::CameraAction;
pub use controls::{PointerButton, PointerControls};

pub fn crate_info() -> &'static str {
    "tableau-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
