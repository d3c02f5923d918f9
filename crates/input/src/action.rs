use tableau_scene::ArcRotateCamera;

/// A camera manipulation produced from host input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraAction {
    /// Change longitude and latitude by the given radians.
    Orbit { d_alpha: f32, d_beta: f32 },
    /// Move towards the target by the given distance (negative backs off).
    Zoom(f32),
    /// Nothing to do (e.g. motion without a pressed button).
    Noop,
}

impl CameraAction {
    /// Apply to `camera`. Returns whether the camera moved.
    pub fn apply(self, camera: &mut ArcRotateCamera) -> bool {
        if !camera.controls_attached() {
            return false;
        }
        match self {
            CameraAction::Orbit { d_alpha, d_beta } => {
                camera.rotate(d_alpha, d_beta);
                true
            }
            CameraAction::Zoom(delta) => {
                camera.zoom(delta);
                true
            }
            CameraAction::Noop => false,
        }
    }
}
