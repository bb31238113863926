use glam::{Mat4, Quat, Vec3};

const YAW_STEP: f32 = 0.04;
const PITCH_STEP: f32 = 0.04;
const ZOOM_STEP: f32 = 0.35;
const MIN_DIST: f32 = 2.0;

// Asymmetric pitch clamp: almost straight down, barely below horizontal.
// Keeps the camera from flipping over the alley.
const MAX_PITCH: f32 = std::f32::consts::PI / 2.1;
const MIN_PITCH: f32 = -std::f32::consts::PI / 10.0;

/// Quaternion orbit camera around a fixed reference point, Z-up. Yaw spins
/// around the world Z axis, pitch around the camera-local X axis with an
/// accumulator so the clamp applies to the total, not the step.
pub struct OrbitCamera {
    rot: Quat,
    pitch_accum: f32,
    pub dist: f32,
    pub target: Vec3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let initial_pitch = std::f32::consts::PI / 10.0;
        Self {
            rot: Quat::from_axis_angle(Vec3::X, -initial_pitch).normalize(),
            pitch_accum: initial_pitch,
            dist: 11.0,
            target: Vec3::new(0.0, 0.0, 1.2),
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn yaw_left(&mut self) {
        self.apply_yaw(-YAW_STEP);
    }

    pub fn yaw_right(&mut self) {
        self.apply_yaw(YAW_STEP);
    }

    pub fn pitch_up(&mut self) {
        self.apply_pitch(PITCH_STEP);
    }

    pub fn pitch_down(&mut self) {
        self.apply_pitch(-PITCH_STEP);
    }

    pub fn zoom_in(&mut self) {
        self.dist = (self.dist - ZOOM_STEP).max(MIN_DIST);
    }

    pub fn zoom_out(&mut self) {
        self.dist += ZOOM_STEP;
    }

    fn apply_yaw(&mut self, d_yaw: f32) {
        if d_yaw.abs() > 1e-8 {
            let q_yaw = Quat::from_axis_angle(Vec3::Z, d_yaw);
            self.rot = (q_yaw * self.rot).normalize();
        }
    }

    fn apply_pitch(&mut self, step: f32) {
        let new_pitch = (self.pitch_accum + step).clamp(MIN_PITCH, MAX_PITCH);
        let d_pitch = new_pitch - self.pitch_accum;
        self.pitch_accum = new_pitch;

        if d_pitch.abs() > 1e-8 {
            let local_x = (self.rot * Vec3::X).normalize();
            let q_pitch = Quat::from_axis_angle(local_x, -d_pitch);
            self.rot = (q_pitch * self.rot).normalize();
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.target + self.rot * Vec3::new(0.0, -self.dist, 0.0)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_stays_at_orbit_distance() {
        let mut cam = OrbitCamera::new();
        for _ in 0..50 {
            cam.yaw_left();
            cam.pitch_up();
        }
        assert!(((cam.eye() - cam.target).length() - cam.dist).abs() < 1e-4);
    }

    #[test]
    fn pitch_accumulator_clamps_asymmetrically() {
        let mut cam = OrbitCamera::new();
        for _ in 0..200 {
            cam.pitch_up();
        }
        assert!(cam.pitch_accum <= MAX_PITCH + 1e-6);
        for _ in 0..200 {
            cam.pitch_down();
        }
        assert!(cam.pitch_accum >= MIN_PITCH - 1e-6);
    }

    #[test]
    fn zoom_has_a_hard_minimum() {
        let mut cam = OrbitCamera::new();
        for _ in 0..100 {
            cam.zoom_in();
        }
        assert!((cam.dist - 2.0).abs() < 1e-6);
    }

    #[test]
    fn view_maps_target_onto_the_view_axis() {
        let cam = OrbitCamera::new();
        let seen = cam.view().transform_point3(cam.target);
        assert!(seen.x.abs() < 1e-4);
        assert!(seen.y.abs() < 1e-4);
        assert!((seen.z + cam.dist).abs() < 1e-3);
    }
}
