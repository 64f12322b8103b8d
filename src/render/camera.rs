use glam::Vec3;

use crate::scene::Aabb;

/// Extra distance applied on top of the exact fit when framing a model.
pub const FRAMING_PADDING: f32 = 1.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct OrbitInput {
    pub orbit_left: bool,
    pub orbit_right: bool,
    pub orbit_up: bool,
    pub orbit_down: bool,
}

/// Orbit pivot and polar-angle limits, measured from the +Y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
}

impl OrbitControls {
    pub fn clamp_pitch(&self, pitch: f32) -> f32 {
        // Looking at the target, polar angle of the eye = pitch + PI/2.
        const EPS: f32 = 1e-3;
        let half_pi = std::f32::consts::FRAC_PI_2;
        let min = (self.min_polar_angle - half_pi).max(-half_pi + EPS);
        let max = (self.max_polar_angle - half_pi).min(half_pi - EPS);
        pitch.clamp(min, max)
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            min_polar_angle: 0.0,
            max_polar_angle: std::f32::consts::PI / 1.8,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CameraController {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    pub aspect: f32,
}

impl CameraController {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
            fov_y_deg: 45.0,
            aspect: 16.0 / 9.0,
        }
    }

    /// Camera at `position` aimed at `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let mut camera = Self::new(position, 0.0, 0.0);
        camera.look_at(target);
        camera
    }

    pub fn look_at(&mut self, target: Vec3) {
        let (yaw, pitch) = forward_to_yaw_pitch(target - self.position);
        self.yaw = yaw;
        self.pitch = pitch;
    }

    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        camera_basis(self.yaw, self.pitch)
    }

    pub fn forward(&self) -> Vec3 {
        self.basis().0
    }

    pub fn fov_y_radians(&self) -> f32 {
        self.fov_y_deg.to_radians()
    }

    /// Place the camera so `bounds` fits the vertical field of view, looking
    /// at its center from a fixed diagonal, and retarget the orbit pivot.
    pub fn frame_bounds(&mut self, bounds: &Aabb, controls: &mut OrbitControls) {
        let center = bounds.center();
        let max_dim = bounds.size().max_element();
        let distance = framing_distance(max_dim, self.fov_y_radians());
        self.position = center + Vec3::new(distance / 2.0, distance / 4.0, distance);
        self.look_at(center);
        controls.target = center;
    }

    pub fn orbit_around(&mut self, pivot: Vec3, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch += pitch_delta;
        wrap_angles(&mut self.yaw, &mut self.pitch);

        let distance = (self.position - pivot).length().max(0.05);
        let (dir, _, _) = self.basis();
        self.position = pivot - dir * distance;
    }

    /// Orbit around the controls' target from held keys. Returns whether the
    /// camera moved.
    pub fn update_orbit(
        &mut self,
        input: &OrbitInput,
        controls: &OrbitControls,
        frame_dt: f32,
    ) -> bool {
        let aim_speed = 1.8 * frame_dt;
        let mut yaw_delta = 0.0;
        let mut pitch_delta = 0.0;

        if input.orbit_left {
            yaw_delta -= aim_speed;
        }
        if input.orbit_right {
            yaw_delta += aim_speed;
        }
        if input.orbit_up {
            pitch_delta -= aim_speed;
        }
        if input.orbit_down {
            pitch_delta += aim_speed;
        }
        if yaw_delta == 0.0 && pitch_delta == 0.0 {
            return false;
        }

        let clamped = controls.clamp_pitch(self.pitch + pitch_delta);
        self.orbit_around(controls.target, yaw_delta, clamped - self.pitch);
        true
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::looking_at(Vec3::new(2.0, 2.0, 5.0), Vec3::ZERO)
    }
}

/// Distance at which an object of size `max_dim` fills the vertical FOV,
/// times [`FRAMING_PADDING`].
pub fn framing_distance(max_dim: f32, fov_y_rad: f32) -> f32 {
    (max_dim / 2.0 / (fov_y_rad / 2.0).tan()).abs() * FRAMING_PADDING
}

/// Frames each loaded model once, when auto zoom is enabled at load time.
#[derive(Debug, Default)]
pub struct AutoFrameController {
    handled: Option<u32>,
}

impl AutoFrameController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.handled = None;
    }

    /// Returns `true` if the camera was moved. Later calls for the same load
    /// generation do nothing, whatever `enabled` says by then.
    pub fn frame_once(
        &mut self,
        generation: u32,
        bounds: &Aabb,
        enabled: bool,
        camera: &mut CameraController,
        controls: &mut OrbitControls,
    ) -> bool {
        if self.handled == Some(generation) {
            return false;
        }
        self.handled = Some(generation);
        if !enabled {
            return false;
        }
        if bounds.is_empty() {
            log::debug!("Nothing to frame in load generation {}", generation);
            return false;
        }
        camera.frame_bounds(bounds, controls);
        log::info!(
            "Framed model: center={:?} size={:?} eye={:?}",
            bounds.center(),
            bounds.size(),
            camera.position
        );
        true
    }
}

fn forward_to_yaw_pitch(forward: Vec3) -> (f32, f32) {
    let dir = forward.normalize_or_zero();
    if dir == Vec3::ZERO {
        return (0.0, 0.0);
    }
    let yaw = dir.z.atan2(dir.x);
    let pitch = dir.y.clamp(-1.0, 1.0).asin();
    (yaw, pitch)
}

fn camera_basis(yaw: f32, pitch: f32) -> (Vec3, Vec3, Vec3) {
    let cos_pitch = pitch.cos();
    let forward = Vec3::new(yaw.cos() * cos_pitch, pitch.sin(), yaw.sin() * cos_pitch);
    let right = Vec3::new(-yaw.sin(), 0.0, yaw.cos());
    let up = right.cross(forward).normalize_or_zero();
    (forward, right, up)
}

fn wrap_angles(yaw: &mut f32, pitch: &mut f32) {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if yaw.is_finite() {
        *yaw = (*yaw + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
    if pitch.is_finite() {
        *pitch = (*pitch + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{:?} != {:?}", a, b);
    }

    #[test]
    fn looking_at_points_forward_at_target() {
        let camera = CameraController::looking_at(Vec3::new(2.0, 2.0, 5.0), Vec3::ZERO);
        let expected = (Vec3::ZERO - camera.position).normalize();
        assert_close(camera.forward(), expected);
    }

    #[test]
    fn framing_fits_box_in_vertical_fov() {
        let bounds = Aabb::new(Vec3::new(-1.0, 0.0, -0.5), Vec3::new(1.0, 4.0, 0.5));
        let mut camera = CameraController::default();
        camera.fov_y_deg = 90.0;
        let mut controls = OrbitControls::default();

        camera.frame_bounds(&bounds, &mut controls);

        // max dim 4, tan(45deg) = 1 -> 2.0, padded -> 3.0
        let center = Vec3::new(0.0, 2.0, 0.0);
        assert_close(camera.position, center + Vec3::new(1.5, 0.75, 3.0));
        assert_close(controls.target, center);
        assert_close(camera.forward(), (center - camera.position).normalize());
    }

    #[test]
    fn auto_frame_runs_once_per_generation() {
        let bounds = Aabb::from_center_extent(Vec3::ZERO, Vec3::ONE);
        let mut auto = AutoFrameController::new();
        let mut camera = CameraController::default();
        let mut controls = OrbitControls::default();

        assert!(auto.frame_once(1, &bounds, true, &mut camera, &mut controls));
        camera.position = Vec3::new(9.0, 9.0, 9.0);
        assert!(!auto.frame_once(1, &bounds, true, &mut camera, &mut controls));
        assert_eq!(camera.position, Vec3::new(9.0, 9.0, 9.0));

        assert!(auto.frame_once(2, &bounds, true, &mut camera, &mut controls));
        assert_ne!(camera.position, Vec3::new(9.0, 9.0, 9.0));
    }

    #[test]
    fn disabled_auto_frame_still_consumes_the_load() {
        let bounds = Aabb::from_center_extent(Vec3::ZERO, Vec3::ONE);
        let mut auto = AutoFrameController::new();
        let mut camera = CameraController::default();
        let mut controls = OrbitControls::default();
        let before = camera.position;

        assert!(!auto.frame_once(1, &bounds, false, &mut camera, &mut controls));
        assert!(!auto.frame_once(1, &bounds, true, &mut camera, &mut controls));
        assert_eq!(camera.position, before);
    }

    #[test]
    fn orbit_keeps_distance_and_respects_polar_limit() {
        let controls = OrbitControls::default();
        let mut camera = CameraController::looking_at(Vec3::new(0.0, 1.0, 5.0), Vec3::ZERO);
        let distance = camera.position.length();

        let input = OrbitInput {
            orbit_right: true,
            ..OrbitInput::default()
        };
        assert!(camera.update_orbit(&input, &controls, 0.5));
        assert!((camera.position.length() - distance).abs() < 1e-3);

        let input = OrbitInput {
            orbit_down: true,
            ..OrbitInput::default()
        };
        for _ in 0..100 {
            camera.update_orbit(&input, &controls, 0.1);
        }
        let polar = (camera.position.y / camera.position.length()).acos();
        assert!(polar <= controls.max_polar_angle + 1e-3);
        assert!(!camera.update_orbit(&OrbitInput::default(), &controls, 0.1));
    }
}
