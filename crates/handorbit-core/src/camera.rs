//! Orbit camera control
//!
//! The camera and its orbit controls belong to the 3D scene runtime. This
//! module only needs a narrow view of them, expressed as the [`Camera`] and
//! [`OrbitControls`] traits. Rotation works in spherical coordinates around
//! the orbit target so the camera stays on a sphere centered there, and the
//! polar clamp keeps it from flipping over either pole.

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use tracing::trace;

use crate::config::GestureConfig;

/// The parts of a scene camera the controller drives
pub trait Camera {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    /// Re-orient the camera so it faces `target`
    fn look_at(&mut self, target: Vec3);
}

/// The parts of an orbit-controls object the controller drives
pub trait OrbitControls {
    fn target(&self) -> Vec3;
    fn set_target(&mut self, target: Vec3);
    /// Resynchronise internal state after the camera was moved externally
    fn update(&mut self);
}

/// Spherical coordinates, Y up
///
/// `phi` is the polar angle measured from +Y and `theta` the azimuth
/// about +Y measured from +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn new(radius: f32, phi: f32, theta: f32) -> Self {
        Self { radius, phi, theta }
    }

    pub fn from_vec3(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_vec3(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep `phi` at least `margin` away from both poles
    pub fn clamp_polar(mut self, margin: f32) -> Self {
        self.phi = self.phi.clamp(margin, PI - margin);
        self
    }
}

/// Snapshot of where the bound camera sits relative to its orbit target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    pub distance: f32,
    /// Azimuth in radians
    pub azimuth: f32,
    /// Polar angle from +Y in radians
    pub polar: f32,
}

impl CameraPose {
    pub fn from_parts(position: Vec3, target: Vec3) -> Self {
        let spherical = Spherical::from_vec3(position - target);
        Self {
            position,
            target,
            distance: spherical.radius,
            azimuth: spherical.theta,
            polar: spherical.phi,
        }
    }
}

/// A camera together with the orbit controls that own its target
#[derive(Debug, Clone)]
pub struct CameraBinding<C, O> {
    pub controls: O,
    pub camera: C,
}

impl<C: Camera, O: OrbitControls> CameraBinding<C, O> {
    /// Offset from the orbit target to the camera
    fn offset(&self) -> Vec3 {
        self.camera.position() - self.controls.target()
    }

    /// Move the camera to `target + offset`, re-aim and refresh the controls
    fn place(&mut self, offset: Vec3) {
        let target = self.controls.target();
        self.camera.set_position(target + offset);
        self.camera.look_at(target);
        self.controls.update();
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose::from_parts(self.camera.position(), self.controls.target())
    }
}

/// Applies rotation and zoom deltas to a bound camera
///
/// Every operation is a no-op until [`bind`](Self::bind) has been called.
#[derive(Debug, Clone)]
pub struct CameraOrbitController<C, O> {
    binding: Option<CameraBinding<C, O>>,
    rotation_speed: f32,
    polar_margin: f32,
}

impl<C: Camera, O: OrbitControls> CameraOrbitController<C, O> {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            binding: None,
            rotation_speed: config.rotation_speed,
            polar_margin: config.polar_margin,
        }
    }

    /// Bind a camera and its controls, returning the previous binding
    pub fn bind(&mut self, controls: O, camera: C) -> Option<CameraBinding<C, O>> {
        self.binding.replace(CameraBinding { controls, camera })
    }

    pub fn unbind(&mut self) -> Option<CameraBinding<C, O>> {
        self.binding.take()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn binding(&self) -> Option<&CameraBinding<C, O>> {
        self.binding.as_ref()
    }

    pub fn binding_mut(&mut self) -> Option<&mut CameraBinding<C, O>> {
        self.binding.as_mut()
    }

    pub fn pose(&self) -> Option<CameraPose> {
        self.binding.as_ref().map(CameraBinding::pose)
    }

    /// Orbit the camera around its target
    ///
    /// `dx` turns the azimuth and `dy` the polar angle, both scaled by the
    /// rotation speed. Returns false when unbound.
    pub fn rotate(&mut self, dx: f32, dy: f32) -> bool {
        let speed = self.rotation_speed;
        let margin = self.polar_margin;
        let Some(binding) = self.binding.as_mut() else {
            return false;
        };

        let mut spherical = Spherical::from_vec3(binding.offset());
        spherical.theta -= dx * speed;
        spherical.phi -= dy * speed;
        let spherical = spherical.clamp_polar(margin);

        trace!(
            theta = spherical.theta,
            phi = spherical.phi,
            radius = spherical.radius,
            "Rotating camera"
        );
        binding.place(spherical.to_vec3());
        true
    }

    /// Multiply the camera's distance from its target by `multiplier`
    ///
    /// The viewing direction is unchanged. Returns false when unbound.
    pub fn scale_distance(&mut self, multiplier: f32) -> bool {
        let Some(binding) = self.binding.as_mut() else {
            return false;
        };

        let offset = binding.offset();
        let distance = offset.length() * multiplier;
        trace!(distance, multiplier, "Scaling camera distance");
        binding.place(offset.normalize_or_zero() * distance);
        true
    }
}

/// A free-standing perspective camera transform
///
/// Used where no external scene runtime owns the camera, e.g. in the
/// daemon, which reports the pose to remote viewers.
#[derive(Debug, Clone, PartialEq)]
pub struct SimCamera {
    pub position: Vec3,
    pub rotation: Quat,
    pub up: Vec3,
}

impl SimCamera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            up: Vec3::Y,
        }
    }

    /// Direction the camera is facing (local -Z)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

impl Camera for SimCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn look_at(&mut self, target: Vec3) {
        let mut z = self.position - target;
        if z.length_squared() == 0.0 {
            z.z = 1.0;
        }
        z = z.normalize();

        let mut x = self.up.cross(z);
        if x.length_squared() == 0.0 {
            // Looking straight along `up`; nudge off the axis
            if self.up.z.abs() == 1.0 {
                z.x += 0.0001;
            } else {
                z.z += 0.0001;
            }
            z = z.normalize();
            x = self.up.cross(z);
        }
        let x = x.normalize();
        let y = z.cross(x);

        self.rotation = Quat::from_mat3(&Mat3::from_cols(x, y, z));
    }
}

/// Orbit controls state without any input handling of its own
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimControls {
    pub target: Vec3,
    /// Number of times `update` has been called
    pub revision: u64,
}

impl SimControls {
    pub fn new(target: Vec3) -> Self {
        Self { target, revision: 0 }
    }
}

impl OrbitControls for SimControls {
    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    fn update(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn controller_at(position: Vec3, target: Vec3) -> CameraOrbitController<SimCamera, SimControls> {
        let mut controller = CameraOrbitController::new(&GestureConfig::default());
        controller.bind(SimControls::new(target), SimCamera::new(position));
        controller
    }

    /// Camera that records the calls made on it
    #[derive(Default)]
    struct RecordingCamera {
        position: Vec3,
        looked_at: Vec<Vec3>,
    }

    impl Camera for RecordingCamera {
        fn position(&self) -> Vec3 {
            self.position
        }

        fn set_position(&mut self, position: Vec3) {
            self.position = position;
        }

        fn look_at(&mut self, target: Vec3) {
            self.looked_at.push(target);
        }
    }

    #[test]
    fn test_spherical_conversion() {
        let s = Spherical::from_vec3(Vec3::new(0.0, 0.0, 10.0));
        assert!((s.radius - 10.0).abs() < EPS);
        assert!((s.phi - PI / 2.0).abs() < EPS);
        assert!(s.theta.abs() < EPS);

        let s = Spherical::from_vec3(Vec3::new(5.0, 0.0, 0.0));
        assert!((s.theta - PI / 2.0).abs() < EPS);

        let v = Vec3::new(1.0, 2.0, -3.0);
        assert!(Spherical::from_vec3(v).to_vec3().abs_diff_eq(v, EPS));

        assert_eq!(Spherical::from_vec3(Vec3::ZERO), Spherical::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_unbound_is_noop() {
        let mut controller: CameraOrbitController<SimCamera, SimControls> =
            CameraOrbitController::new(&GestureConfig::default());
        assert!(!controller.rotate(0.1, 0.1));
        assert!(!controller.scale_distance(2.0));
        assert!(controller.pose().is_none());
    }

    #[test]
    fn test_rotate_azimuth() {
        let mut controller = controller_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        assert!(controller.rotate(0.05, 0.0));

        let pose = controller.pose().unwrap();
        assert!((pose.azimuth + 0.2).abs() < EPS);
        assert!((pose.polar - PI / 2.0).abs() < EPS);
        assert!((pose.distance - 10.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_clamps_polar() {
        let mut controller = controller_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);

        controller.rotate(0.0, 100.0);
        let pose = controller.pose().unwrap();
        assert!((pose.polar - 0.1).abs() < EPS);

        controller.rotate(0.0, -100.0);
        let pose = controller.pose().unwrap();
        assert!((pose.polar - (PI - 0.1)).abs() < EPS);
        assert!((pose.distance - 10.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_around_offset_target() {
        let target = Vec3::new(3.0, -1.0, 2.0);
        let mut controller = controller_at(target + Vec3::new(0.0, 4.0, 4.0), target);
        controller.rotate(0.3, -0.2);

        let binding = controller.binding().unwrap();
        let distance = binding.camera.position.distance(target);
        assert!((distance - 32.0f32.sqrt()).abs() < EPS);
        assert!(binding.camera.forward().abs_diff_eq(
            (target - binding.camera.position).normalize(),
            EPS
        ));
    }

    #[test]
    fn test_rotate_reaims_and_refreshes() {
        let mut controller = CameraOrbitController::new(&GestureConfig::default());
        controller.bind(
            SimControls::new(Vec3::ONE),
            RecordingCamera {
                position: Vec3::new(1.0, 1.0, 6.0),
                ..Default::default()
            },
        );

        controller.rotate(0.01, 0.01);
        controller.scale_distance(1.05);

        let binding = controller.binding().unwrap();
        assert_eq!(binding.camera.looked_at, vec![Vec3::ONE, Vec3::ONE]);
        assert_eq!(binding.controls.revision, 2);
    }

    #[test]
    fn test_scale_distance() {
        let mut controller = controller_at(Vec3::new(0.0, 3.0, 4.0), Vec3::ZERO);

        controller.scale_distance(1.05);
        let pose = controller.pose().unwrap();
        assert!((pose.distance - 5.25).abs() < EPS);
        assert!(pose
            .position
            .normalize()
            .abs_diff_eq(Vec3::new(0.0, 0.6, 0.8), EPS));

        controller.scale_distance(1.0 / 1.05);
        assert!((controller.pose().unwrap().distance - 5.0).abs() < EPS);
    }

    #[test]
    fn test_scale_distance_on_target_stays_put() {
        let mut controller = controller_at(Vec3::ONE, Vec3::ONE);
        controller.scale_distance(2.0);

        let pose = controller.pose().unwrap();
        assert_eq!(pose.position, Vec3::ONE);
        assert!(pose.position.is_finite());
    }

    #[test]
    fn test_rebind_replaces() {
        let mut controller = controller_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let previous = controller.bind(SimControls::new(Vec3::X), SimCamera::new(Vec3::new(1.0, 0.0, 5.0)));

        assert_eq!(previous.unwrap().camera.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(controller.pose().unwrap().target, Vec3::X);

        controller.unbind();
        assert!(!controller.is_bound());
    }

    #[test]
    fn test_look_at_straight_down() {
        let mut camera = SimCamera::new(Vec3::new(0.0, 10.0, 0.0));
        camera.look_at(Vec3::ZERO);
        assert!(camera.rotation.is_finite());
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Y, 1e-3));
    }
}
