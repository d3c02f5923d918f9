use crate::action::CameraAction;

/// Pointer buttons the controls care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Turns pointer drags and wheel steps on a surface into camera actions.
#[derive(Debug, Clone)]
pub struct PointerControls {
    /// Pixels of drag per radian of rotation. Higher is slower.
    pub angular_sensibility: f32,
    /// Wheel steps per unit of zoom. Higher is slower.
    pub wheel_precision: f32,
    pressed: Option<PointerButton>,
    last: Option<(f64, f64)>,
}

impl Default for PointerControls {
    fn default() -> Self {
        Self {
            angular_sensibility: 1000.0,
            wheel_precision: 3.0,
            pressed: None,
            last: None,
        }
    }
}

impl PointerControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.pressed.is_some()
    }

    pub fn pointer_down(&mut self, button: PointerButton) {
        if self.pressed.is_none() {
            self.pressed = Some(button);
        }
    }

    pub fn pointer_up(&mut self, button: PointerButton) {
        if self.pressed == Some(button) {
            self.pressed = None;
        }
    }

    /// Feed an absolute cursor position in surface pixels.
    pub fn pointer_moved(&mut self, x: f64, y: f64) -> CameraAction {
        let previous = self.last.replace((x, y));
        let (Some(PointerButton::Primary), Some((px, py))) = (self.pressed, previous) else {
            return CameraAction::Noop;
        };
        let dx = (x - px) as f32;
        let dy = (y - py) as f32;
        if dx == 0.0 && dy == 0.0 {
            return CameraAction::Noop;
        }
        CameraAction::Orbit {
            d_alpha: -dx / self.angular_sensibility,
            d_beta: -dy / self.angular_sensibility,
        }
    }

    /// Feed a wheel movement in lines; positive scrolls towards the target.
    pub fn wheel(&mut self, lines: f32) -> CameraAction {
        if lines == 0.0 {
            return CameraAction::Noop;
        }
        tracing::trace!("wheel {lines}");
        CameraAction::Zoom(lines / self.wheel_precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_without_press_is_noop() {
        let mut controls = PointerControls::new();
        assert_eq!(controls.pointer_moved(10.0, 10.0), CameraAction::Noop);
        assert_eq!(controls.pointer_moved(20.0, 10.0), CameraAction::Noop);
    }

    #[test]
    fn primary_drag_orbits() {
        let mut controls = PointerControls::new();
        controls.pointer_moved(100.0, 100.0);
        controls.pointer_down(PointerButton::Primary);
        let action = controls.pointer_moved(600.0, 100.0);
        assert_eq!(
            action,
            CameraAction::Orbit {
                d_alpha: -0.5,
                d_beta: 0.0
            }
        );
        controls.pointer_up(PointerButton::Primary);
        assert!(!controls.is_dragging());
        assert_eq!(controls.pointer_moved(700.0, 100.0), CameraAction::Noop);
    }

    #[test]
    fn secondary_drag_does_not_orbit() {
        let mut controls = PointerControls::new();
        controls.pointer_moved(0.0, 0.0);
        controls.pointer_down(PointerButton::Secondary);
        assert_eq!(controls.pointer_moved(50.0, 0.0), CameraAction::Noop);
        // Primary press is ignored while another button holds the drag.
        controls.pointer_down(PointerButton::Primary);
        assert_eq!(controls.pointer_moved(90.0, 0.0), CameraAction::Noop);
    }

    #[test]
    fn wheel_zooms_by_precision() {
        let mut controls = PointerControls::new();
        assert_eq!(controls.wheel(3.0), CameraAction::Zoom(1.0));
        assert_eq!(controls.wheel(0.0), CameraAction::Noop);
    }
}
