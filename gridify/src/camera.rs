//! Camera control state machine: orbit, fly and locked schemes.
//!
//! The controller is pure state; the GUI feeds it input deltas and a clock
//! and reads back the eye position and look target each frame. The camera
//! orbits a fixed look-at origin in orbit mode and translates freely along
//! its facing basis in fly mode.

use nalgebra::Vector3;

use crate::geometry::{direction_angles, Point3};
use crate::store::CameraMode;

/// Fly mode is defined and tested but not reachable from the GUI control
/// surface in the current revision.
pub const FLY_ENABLED: bool = false;

/// Interval of the fixed tick driving keyboard movement in fly mode.
pub const FLY_TICK_SECONDS: f64 = 1.0 / 60.0;

const ROTATE_SENSITIVITY: f64 = 0.005;
const LOOK_SENSITIVITY: f64 = 0.002;
const ZOOM_SENSITIVITY: f64 = 0.05;
const DAMPING_FACTOR: f64 = 0.05;
const FLY_SPEED: f64 = 4.0;
const MIN_DISTANCE: f64 = 1.0;
const MAX_DISTANCE: f64 = 200.0;
const PITCH_LIMIT: f64 = std::f64::consts::FRAC_PI_2 - 0.01;

/// Movement keys recognized in fly mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlyKey {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
}

impl FlyKey {
    fn index(self) -> usize {
        match self {
            FlyKey::Forward => 0,
            FlyKey::Back => 1,
            FlyKey::Left => 2,
            FlyKey::Right => 3,
            FlyKey::Up => 4,
            FlyKey::Down => 5,
        }
    }
}

/// Interactive camera state over [`CameraMode`].
///
/// In orbit (and locked) state, yaw/pitch/distance describe the eye offset
/// from the origin. In fly state, `position` is the free camera position and
/// yaw/pitch describe the facing direction.
#[derive(Debug, Clone)]
pub struct CameraController {
    mode: CameraMode,
    yaw: f64,
    pitch: f64,
    distance: f64,
    yaw_velocity: f64,
    pitch_velocity: f64,
    position: Point3,
    held: [bool; 6],
}

impl Default for CameraController {
    fn default() -> Self {
        Self::from_eye(Point3::new(5.0, 5.0, 5.0))
    }
}

impl CameraController {
    /// Creates an orbit-mode controller whose camera starts at `eye`,
    /// looking at the origin.
    pub fn from_eye(eye: Point3) -> Self {
        let (yaw, pitch) = direction_angles(eye).unwrap_or((0.0, 0.0));
        Self {
            mode: CameraMode::Orbit,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance: crate::geometry::length(eye).clamp(MIN_DISTANCE, MAX_DISTANCE),
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            position: eye,
            held: [false; 6],
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Switches scheme, keeping the camera where it is.
    pub fn set_mode(&mut self, mode: CameraMode) {
        if self.mode == mode {
            return;
        }
        match (self.mode, mode) {
            (CameraMode::Fly, _) => {
                // Re-anchor the orbit on the current free position.
                let eye = self.position;
                let (yaw, pitch) = direction_angles(eye).unwrap_or((self.yaw, self.pitch));
                self.yaw = yaw;
                self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
                self.distance = crate::geometry::length(eye).clamp(MIN_DISTANCE, MAX_DISTANCE);
            }
            (_, CameraMode::Fly) => {
                // Start flying from the orbit eye, facing the origin.
                self.position = self.eye_position();
                let toward_origin = crate::geometry::scale(self.position, -1.0);
                if let Some((yaw, pitch)) = direction_angles(toward_origin) {
                    self.yaw = yaw;
                    self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
                }
            }
            _ => {}
        }
        self.yaw_velocity = 0.0;
        self.pitch_velocity = 0.0;
        self.held = [false; 6];
        self.mode = mode;
    }

    /// Pointer drag in orbit mode: accumulates angular velocity which the
    /// next ticks integrate with inertial damping.
    pub fn orbit_drag(&mut self, dx: f64, dy: f64) {
        if self.mode != CameraMode::Orbit {
            return;
        }
        self.yaw_velocity -= dx * ROTATE_SENSITIVITY;
        self.pitch_velocity += dy * ROTATE_SENSITIVITY;
    }

    /// Scroll or pinch in orbit mode: moves the eye along the view axis.
    pub fn zoom_scroll(&mut self, amount: f64) {
        if self.mode != CameraMode::Orbit {
            return;
        }
        self.distance = (self.distance * (1.0 - amount * ZOOM_SENSITIVITY))
            .clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Pointer-lock look-around in fly mode.
    pub fn look_drag(&mut self, dx: f64, dy: f64) {
        if self.mode != CameraMode::Fly {
            return;
        }
        self.yaw -= dx * LOOK_SENSITIVITY;
        self.pitch = (self.pitch - dy * LOOK_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Press or release one of the six fly-mode movement keys.
    pub fn fly_key(&mut self, key: FlyKey, pressed: bool) {
        if self.mode != CameraMode::Fly {
            return;
        }
        self.held[key.index()] = pressed;
    }

    /// Advances the controller by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        match self.mode {
            CameraMode::Orbit => {
                let frames = dt / FLY_TICK_SECONDS;
                self.yaw += self.yaw_velocity * frames;
                self.pitch = (self.pitch + self.pitch_velocity * frames)
                    .clamp(-PITCH_LIMIT, PITCH_LIMIT);
                let decay = (1.0 - DAMPING_FACTOR).powf(frames);
                self.yaw_velocity *= decay;
                self.pitch_velocity *= decay;
            }
            CameraMode::Fly => {
                let (forward, right, up) = self.facing_basis();
                let mut delta = Vector3::zeros();
                if self.held[FlyKey::Forward.index()] {
                    delta += forward;
                }
                if self.held[FlyKey::Back.index()] {
                    delta -= forward;
                }
                if self.held[FlyKey::Right.index()] {
                    delta += right;
                }
                if self.held[FlyKey::Left.index()] {
                    delta -= right;
                }
                if self.held[FlyKey::Up.index()] {
                    delta += up;
                }
                if self.held[FlyKey::Down.index()] {
                    delta -= up;
                }
                let delta = delta * FLY_SPEED * dt;
                self.position.x += delta.x;
                self.position.y += delta.y;
                self.position.z += delta.z;
            }
            CameraMode::Locked => {}
        }
    }

    /// Current camera position.
    pub fn eye_position(&self) -> Point3 {
        match self.mode {
            CameraMode::Fly => self.position,
            CameraMode::Orbit | CameraMode::Locked => {
                let (cp, sp) = (self.pitch.cos(), self.pitch.sin());
                let (cy, sy) = (self.yaw.cos(), self.yaw.sin());
                Point3::new(
                    self.distance * cp * cy,
                    self.distance * cp * sy,
                    self.distance * sp,
                )
            }
        }
    }

    /// Point the camera is looking at.
    pub fn look_target(&self) -> Point3 {
        match self.mode {
            CameraMode::Fly => {
                let (forward, _, _) = self.facing_basis();
                Point3::new(
                    self.position.x + forward.x,
                    self.position.y + forward.y,
                    self.position.z + forward.z,
                )
            }
            CameraMode::Orbit | CameraMode::Locked => Point3::ORIGIN,
        }
    }

    // Orthonormal facing basis for fly movement, world Z up.
    fn facing_basis(&self) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        let (cp, sp) = (self.pitch.cos(), self.pitch.sin());
        let (cy, sy) = (self.yaw.cos(), self.yaw.sin());
        let forward = Vector3::new(cp * cy, cp * sy, sp);
        let up = Vector3::z();
        let right = forward.cross(&up).normalize();
        (forward, right, up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{distance3, length};

    #[test]
    fn initial_mode_is_orbit() {
        let cam = CameraController::default();
        assert_eq!(cam.mode(), CameraMode::Orbit);
        assert_eq!(cam.look_target(), Point3::ORIGIN);
    }

    #[test]
    fn orbit_drag_moves_eye_and_damps_out() {
        let mut cam = CameraController::default();
        let before = cam.eye_position();
        cam.orbit_drag(40.0, 0.0);
        for _ in 0..300 {
            cam.tick(FLY_TICK_SECONDS);
        }
        let after = cam.eye_position();
        assert!(distance3(before, after) > 1e-3);
        // Velocity has decayed; a further tick barely moves the eye.
        let settled = cam.eye_position();
        cam.tick(FLY_TICK_SECONDS);
        assert!(distance3(settled, cam.eye_position()) < 1e-4);
        // Orbit preserves the distance to the origin.
        assert!((length(after) - length(before)).abs() < 1e-9);
    }

    #[test]
    fn zoom_clamps_to_minimum_distance() {
        let mut cam = CameraController::default();
        for _ in 0..500 {
            cam.zoom_scroll(5.0);
        }
        assert!(length(cam.eye_position()) >= 1.0 - 1e-9);
    }

    #[test]
    fn pitch_never_reaches_the_pole() {
        let mut cam = CameraController::default();
        for _ in 0..100 {
            cam.orbit_drag(0.0, 100.0);
            cam.tick(FLY_TICK_SECONDS);
        }
        let eye = cam.eye_position();
        let horizontal = (eye.x * eye.x + eye.y * eye.y).sqrt();
        assert!(horizontal > 1e-6);
    }

    #[test]
    fn locked_ignores_input_and_ticks() {
        let mut cam = CameraController::default();
        cam.set_mode(CameraMode::Locked);
        let before = cam.eye_position();
        cam.orbit_drag(50.0, 50.0);
        cam.zoom_scroll(3.0);
        cam.tick(1.0);
        assert_eq!(cam.eye_position(), before);
    }

    #[test]
    fn fly_moves_along_facing() {
        let mut cam = CameraController::default();
        let eye = cam.eye_position();
        cam.set_mode(CameraMode::Fly);
        // Switching schemes keeps the camera in place.
        assert!(distance3(cam.eye_position(), eye) < 1e-9);

        cam.fly_key(FlyKey::Forward, true);
        cam.tick(1.0);
        // Facing the origin from the orbit eye, forward flight closes in.
        assert!(length(cam.eye_position()) < length(eye));

        cam.fly_key(FlyKey::Forward, false);
        let stopped = cam.eye_position();
        cam.tick(1.0);
        assert_eq!(cam.eye_position(), stopped);
    }

    #[test]
    fn fly_keys_ignored_outside_fly_mode() {
        let mut cam = CameraController::default();
        let before = cam.eye_position();
        cam.fly_key(FlyKey::Up, true);
        cam.tick(1.0);
        assert_eq!(cam.eye_position(), before);
    }

    #[test]
    fn returning_to_orbit_reanchors_on_origin() {
        let mut cam = CameraController::default();
        cam.set_mode(CameraMode::Fly);
        cam.fly_key(FlyKey::Up, true);
        cam.tick(0.5);
        cam.set_mode(CameraMode::Orbit);
        assert_eq!(cam.look_target(), Point3::ORIGIN);
        // Distance reflects the new eye position.
        assert!(length(cam.eye_position()) > 1.0);
    }
}
