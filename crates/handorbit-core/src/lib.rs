//! Handorbit Core - Pinch gestures to orbit camera motion
//!
//! This crate turns per-frame hand landmark detections into camera moves:
//! - Landmark and detection frame types matching the hand tracker's output
//! - Pinch classification and mirrored handedness assignment
//! - A frame-by-frame gesture state machine (one-hand drag, two-hand zoom)
//! - A spherical-coordinate orbit controller over pluggable camera traits

pub mod camera;
pub mod classifier;
pub mod config;
pub mod hands;
pub mod landmark;
pub mod processor;
pub mod session;

pub use camera::{
    Camera, CameraBinding, CameraOrbitController, CameraPose, OrbitControls, SimCamera,
    SimControls, Spherical,
};
pub use classifier::{is_pinching, planar_distance};
pub use config::{ConfigError, GestureConfig};
pub use hands::{assign_hands, AssignedHands};
pub use landmark::{DetectionFrame, HandDetection, HandLabel, Handedness, Landmark};
pub use processor::{FrameProcessor, GestureAction, PinchState, ZoomDirection};
pub use session::GestureSessionState;
