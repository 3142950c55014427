//! Orbit camera with momentum.
//!
//! The camera sits on a sphere around a look-at target. Dragging spins it, releasing leaves a
//! residual angular velocity that decays every frame, and the wheel moves it in and out.

use engine_core::Transform;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::fmt::Debug;

/// Tunables for [`CameraController`]. Missing fields in a config file fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    /// Radians per pixel of drag.
    pub sensitivity: f32,
    /// Distance change per scroll unit.
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle bounds, radians from straight up.
    pub min_polar: f32,
    pub max_polar: f32,
    /// Velocity multiplier applied every idle frame, in `(0, 1)`.
    pub damping: f32,
    /// Below this speed on both axes the camera is at rest.
    pub rest_threshold: f32,
    pub initial_azimuth: f32,
    pub initial_polar: f32,
    pub initial_distance: f32,
    pub target: Vec3,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            sensitivity: 0.01,
            zoom_speed: 0.05,
            min_distance: 5.0,
            max_distance: 100.0,
            min_polar: 0.1,
            max_polar: FRAC_PI_2 - 0.1,
            damping: 0.92,
            rest_threshold: 0.001,
            initial_azimuth: 0.0,
            initial_polar: 0.5,
            initial_distance: 35.0,
            target: Vec3::ZERO,
        }
    }
}

impl OrbitSettings {
    /// Copy with every unusable value replaced by its default, each replacement logged.
    /// Bounds must be finite and ordered, and damping must lie strictly inside `(0, 1)` so the
    /// camera comes to rest.
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let finite = |v: f32| v.is_finite();
        let (min_distance, max_distance) = or_default(
            "distance bounds",
            (self.min_distance, self.max_distance),
            (defaults.min_distance, defaults.max_distance),
            |(lo, hi)| finite(lo) && finite(hi) && lo > 0.0 && lo <= hi,
        );
        let (min_polar, max_polar) = or_default(
            "polar bounds",
            (self.min_polar, self.max_polar),
            (defaults.min_polar, defaults.max_polar),
            |(lo, hi)| finite(lo) && finite(hi) && lo <= hi,
        );
        Self {
            sensitivity: or_default("sensitivity", self.sensitivity, defaults.sensitivity, finite),
            zoom_speed: or_default("zoom speed", self.zoom_speed, defaults.zoom_speed, finite),
            min_distance,
            max_distance,
            min_polar,
            max_polar,
            damping: or_default("damping", self.damping, defaults.damping, |d| d > 0.0 && d < 1.0),
            rest_threshold: or_default("rest threshold", self.rest_threshold, defaults.rest_threshold, |t| {
                finite(t) && t >= 0.0
            }),
            initial_azimuth: or_default("initial azimuth", self.initial_azimuth, defaults.initial_azimuth, finite),
            initial_polar: or_default("initial polar", self.initial_polar, defaults.initial_polar, finite),
            initial_distance: or_default(
                "initial distance",
                self.initial_distance,
                defaults.initial_distance,
                finite,
            ),
            target: or_default("target", self.target, defaults.target, Vec3::is_finite),
        }
    }
}

fn or_default<T: Copy + Debug>(name: &str, value: T, fallback: T, ok: impl Fn(T) -> bool) -> T {
    if ok(value) {
        value
    } else {
        log::warn!("Camera {} {:?} unusable, using {:?}", name, value, fallback);
        fallback
    }
}

/// Orientation, distance and momentum of the orbit camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Azimuth around the target, radians, unbounded.
    pub rotation_y: f32,
    /// Polar angle from straight up, radians.
    pub rotation_x: f32,
    pub distance: f32,
    pub target: Vec3,
    pub dragging: bool,
    /// Pointer position at the last drag sample.
    pub previous: Vec2,
    /// Angular velocity carried between frames: x drives azimuth, y drives polar angle.
    pub velocity: Vec2,
}

impl CameraState {
    pub fn new(settings: &OrbitSettings) -> Self {
        let mut state = Self {
            rotation_y: settings.initial_azimuth,
            rotation_x: settings.initial_polar,
            distance: settings.initial_distance,
            target: settings.target,
            dragging: false,
            previous: Vec2::ZERO,
            velocity: Vec2::ZERO,
        };
        state.clamp(settings);
        state
    }

    /// Pull polar angle and distance back into bounds. Idempotent.
    pub fn clamp(&mut self, settings: &OrbitSettings) {
        let rotation_x = self.rotation_x.clamp(settings.min_polar, settings.max_polar);
        let distance = self.distance.clamp(settings.min_distance, settings.max_distance);
        if rotation_x != self.rotation_x || distance != self.distance {
            log::trace!(
                "Clamped camera: polar {:.3} -> {:.3}, distance {:.2} -> {:.2}",
                self.rotation_x,
                rotation_x,
                self.distance,
                distance
            );
        }
        self.rotation_x = rotation_x;
        self.distance = distance;
    }

    /// One animation frame. Returns the new state and whether the pose changed.
    ///
    /// Dragging freezes momentum. Otherwise velocity decays first, and only a camera still
    /// moving faster than the rest threshold rotates.
    pub fn step(mut self, settings: &OrbitSettings) -> (Self, bool) {
        if self.dragging {
            return (self, false);
        }
        self.velocity *= settings.damping;
        let moving =
            self.velocity.x.abs() > settings.rest_threshold || self.velocity.y.abs() > settings.rest_threshold;
        if moving {
            self.rotation_y += self.velocity.x;
            self.rotation_x += self.velocity.y;
            self.clamp(settings);
        }
        (self, moving)
    }

    /// Spherical to Cartesian, around the target.
    pub fn pose(&self) -> CameraPose {
        let (sin_x, cos_x) = self.rotation_x.sin_cos();
        let (sin_y, cos_y) = self.rotation_y.sin_cos();
        let offset = Vec3::new(sin_x * sin_y, cos_x, sin_x * cos_y) * self.distance;
        CameraPose {
            position: self.target + offset,
            target: self.target,
        }
    }
}

/// Where the camera is and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    /// Transform at `position` facing `target`, world Y up.
    pub fn transform(&self) -> Transform {
        let mut transform = Transform::from_position(self.position);
        transform.look_at(self.target, Vec3::Y);
        transform
    }
}

/// Turns pointer and wheel input into camera motion.
#[derive(Debug, Clone)]
pub struct CameraController {
    settings: OrbitSettings,
    state: CameraState,
    pose: CameraPose,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(OrbitSettings::default())
    }
}

impl CameraController {
    pub fn new(settings: OrbitSettings) -> Self {
        let settings = settings.validated();
        let state = CameraState::new(&settings);
        Self {
            settings,
            pose: state.pose(),
            state,
        }
    }

    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn is_dragging(&self) -> bool {
        self.state.dragging
    }

    /// Grab the camera. Any leftover spin stops.
    pub fn on_pointer_down(&mut self, x: f32, y: f32) {
        if !(x.is_finite() && y.is_finite()) {
            log::trace!("Ignoring pointer down at ({}, {})", x, y);
            return;
        }
        self.state.dragging = true;
        self.state.previous = Vec2::new(x, y);
        self.state.velocity = Vec2::ZERO;
    }

    /// Returns whether the pose changed. Moves without a grab are ignored.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) -> bool {
        if !self.state.dragging || !(x.is_finite() && y.is_finite()) {
            return false;
        }
        let current = Vec2::new(x, y);
        let turn = (current - self.state.previous) * self.settings.sensitivity;
        self.state.rotation_y += turn.x;
        self.state.rotation_x += turn.y;
        self.state.velocity = turn;
        self.state.previous = current;
        self.refresh();
        true
    }

    /// Release the camera; the last drag velocity carries on.
    pub fn on_pointer_up(&mut self) {
        self.state.dragging = false;
    }

    /// Zoom by `delta_y` scroll units. Always returns `true`: the host must not scroll.
    pub fn on_wheel(&mut self, delta_y: f32) -> bool {
        if !delta_y.is_finite() {
            log::trace!("Ignoring wheel delta {}", delta_y);
            return true;
        }
        self.state.distance += delta_y * self.settings.zoom_speed;
        self.refresh();
        true
    }

    /// Advance inertia by one frame. Returns whether the pose changed.
    pub fn tick(&mut self) -> bool {
        let (state, moved) = self.state.step(&self.settings);
        self.state = state;
        if moved {
            self.pose = self.state.pose();
        }
        moved
    }

    fn refresh(&mut self) {
        self.state.clamp(&self.settings);
        self.pose = self.state.pose();
    }
}

/// Perspective projection following the orbit pose.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Camera transform (position and rotation).
    pub transform: Transform,
    /// Field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            fov_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl OrbitCamera {
    pub fn new(pose: CameraPose, width: u32, height: u32) -> Self {
        let mut camera = Self::default();
        camera.set_aspect(width, height);
        camera.apply_pose(pose);
        camera
    }

    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn apply_pose(&mut self, pose: CameraPose) {
        self.transform = pose.transform();
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.transform.position;
        Mat4::look_at_rh(eye, eye + self.transform.forward(), Vec3::Y)
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn initial_pose_matches_spherical_formula() {
        let controller = CameraController::default();
        let pose = controller.pose();
        let (d, rx) = (35.0f32, 0.5f32);
        assert!(approx(pose.position.x, 0.0));
        assert!(approx(pose.position.y, d * rx.cos()));
        assert!(approx(pose.position.z, d * rx.sin()));
        assert_eq!(pose.target, Vec3::ZERO);
    }

    #[test]
    fn drag_rotates_and_records_velocity() {
        let mut controller = CameraController::default();
        controller.on_pointer_down(100.0, 100.0);
        assert!(controller.on_pointer_move(110.0, 105.0));
        let state = controller.state();
        assert!(approx(state.rotation_y, 0.1));
        assert!(approx(state.rotation_x, 0.55));
        assert!(approx(state.velocity.x, 0.1) && approx(state.velocity.y, 0.05));
        assert_eq!(state.previous, Vec2::new(110.0, 105.0));
    }

    #[test]
    fn moves_without_grab_are_ignored() {
        let mut controller = CameraController::default();
        let before = *controller.state();
        assert!(!controller.on_pointer_move(500.0, 500.0));
        assert_eq!(*controller.state(), before);
    }

    #[test]
    fn polar_angle_and_distance_stay_clamped() {
        let settings = OrbitSettings::default();
        let mut controller = CameraController::new(settings);
        controller.on_pointer_down(0.0, 0.0);
        for step in 1..50 {
            // Alternate violent drags up and down.
            let y = if step % 2 == 0 { 10_000.0 } else { -10_000.0 };
            controller.on_pointer_move(step as f32, y);
            let s = controller.state();
            assert!(s.rotation_x >= settings.min_polar && s.rotation_x <= settings.max_polar);
        }
        controller.on_pointer_up();
        for _ in 0..200 {
            controller.tick();
            let s = controller.state();
            assert!(s.rotation_x >= settings.min_polar && s.rotation_x <= settings.max_polar);
        }
        controller.on_wheel(1.0e6);
        assert_eq!(controller.state().distance, 100.0);
        controller.on_wheel(-1.0e6);
        assert_eq!(controller.state().distance, 5.0);
    }

    #[test]
    fn wheel_zooms_and_asks_host_to_suppress_scrolling() {
        let settings = OrbitSettings {
            initial_distance: 50.0,
            ..Default::default()
        };
        let mut controller = CameraController::new(settings);
        assert!(controller.on_wheel(100.0));
        assert!(approx(controller.state().distance, 55.0));
    }

    #[test]
    fn inertia_decays_geometrically_and_stops() {
        let mut controller = CameraController::default();
        controller.on_pointer_down(0.0, 0.0);
        controller.on_pointer_move(100.0, 0.0);
        controller.on_pointer_up();
        assert!(approx(controller.state().velocity.x, 1.0));

        for k in 1..=82 {
            assert!(controller.tick(), "tick {k} should still rotate");
            let expected = 0.92f32.powi(k);
            assert!((controller.state().velocity.x - expected).abs() < 1e-5);
        }
        let resting = *controller.state();
        assert!(!controller.tick(), "tick 83 should be idle");
        assert_eq!(controller.state().rotation_y, resting.rotation_y);
    }

    #[test]
    fn dragging_freezes_momentum() {
        let state = CameraState {
            dragging: true,
            velocity: Vec2::new(0.5, 0.0),
            ..CameraState::new(&OrbitSettings::default())
        };
        let (next, moved) = state.step(&OrbitSettings::default());
        assert!(!moved);
        assert_eq!(next, state);
    }

    #[test]
    fn grabbing_stops_residual_spin() {
        let mut controller = CameraController::default();
        controller.on_pointer_down(0.0, 0.0);
        controller.on_pointer_move(50.0, 0.0);
        controller.on_pointer_up();
        controller.on_pointer_down(50.0, 0.0);
        assert_eq!(controller.state().velocity, Vec2::ZERO);
    }

    #[test]
    fn inverted_or_non_finite_settings_are_replaced() {
        let settings = OrbitSettings {
            min_distance: 150.0,
            min_polar: f32::NAN,
            damping: 1.0,
            sensitivity: f32::INFINITY,
            ..Default::default()
        }
        .validated();
        assert_eq!(settings, OrbitSettings::default());

        let kept = OrbitSettings {
            min_distance: 10.0,
            max_distance: 10.0,
            damping: 0.5,
            ..Default::default()
        };
        assert_eq!(kept.validated(), kept);
    }

    #[test]
    fn controller_survives_inverted_distance_bounds() {
        let mut controller = CameraController::new(OrbitSettings {
            min_distance: 150.0,
            ..Default::default()
        });
        assert_eq!(controller.settings().min_distance, 5.0);
        controller.on_wheel(1.0e6);
        assert_eq!(controller.state().distance, 100.0);
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut controller = CameraController::default();
        let before = *controller.state();
        assert!(controller.on_wheel(f32::NAN));
        assert!(controller.on_wheel(f32::NEG_INFINITY));
        controller.on_pointer_down(f32::NAN, 0.0);
        assert_eq!(*controller.state(), before);

        controller.on_pointer_down(0.0, 0.0);
        assert!(!controller.on_pointer_move(f32::INFINITY, 0.0));
        assert!(!controller.on_pointer_move(0.0, f32::NAN));
        let state = controller.state();
        assert_eq!(
            (state.rotation_x, state.rotation_y, state.distance),
            (before.rotation_x, before.rotation_y, before.distance)
        );
        assert!(controller.pose().position.is_finite());
    }

    #[test]
    fn resize_touches_projection_only() {
        let controller = CameraController::default();
        let mut camera = OrbitCamera::new(controller.pose(), 800, 600);
        let view = camera.view_matrix();
        camera.set_aspect(1920, 1080);
        assert!(approx(camera.aspect, 1920.0 / 1080.0));
        assert_eq!(camera.view_matrix(), view);
        assert_eq!(camera.fov_degrees, 60.0);
    }

    #[test]
    fn camera_looks_at_target() {
        let controller = CameraController::default();
        let camera = OrbitCamera::new(controller.pose(), 800, 600);
        let to_target = (Vec3::ZERO - camera.position()).normalize();
        assert!(camera.transform.forward().dot(to_target) > 0.999);
    }
}
