//! Per-frame gesture state machine
//!
//! Each detection frame is classified into a right-hand and left-hand pinch
//! state, then:
//!
//! * **Right hand only pinching**: a drag. The first frame of a drag only
//!   records the index tip; later frames rotate the camera by the tip's
//!   movement since the previous frame.
//! * **Both hands pinching**: a zoom. The index-tip separation is compared
//!   against the previous frame's separation; growing apart zooms in,
//!   closing together zooms out, and small changes inside the dead zone
//!   are ignored.
//!
//! Leaving either condition clears its memory so the next drag or zoom
//! starts from a fresh seed frame.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::camera::{Camera, CameraBinding, CameraOrbitController, CameraPose, OrbitControls};
use crate::classifier::{is_pinching, planar_distance};
use crate::config::GestureConfig;
use crate::hands::assign_hands;
use crate::landmark::{DetectionFrame, Landmark, INDEX_TIP};
use crate::session::GestureSessionState;

/// Pinch classification of the current frame, for caller-side feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinchState {
    pub right_hand_pinch: bool,
    pub left_hand_pinch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomDirection {
    /// Camera moved toward the target
    In,
    /// Camera moved away from the target
    Out,
}

/// What a frame did to the camera
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureAction {
    #[default]
    Idle,
    /// First frame of a drag: reference position recorded, no rotation
    RotateSeeded,
    Rotated { dx: f32, dy: f32 },
    /// First frame of a two-hand pinch: reference distance recorded
    ZoomSeeded,
    Zoomed { direction: ZoomDirection },
    /// Two-hand distance changed by less than the dead zone
    ZoomHeld,
}

/// Drives an orbit camera from a stream of hand detection frames
///
/// Frames must be fed in capture order from a single caller; the edge
/// detection compares each frame against the one before it. Until a camera
/// is bound, frames are ignored and report no pinch.
#[derive(Debug, Clone)]
pub struct FrameProcessor<C, O> {
    config: GestureConfig,
    controller: CameraOrbitController<C, O>,
    session: GestureSessionState,
    last_action: GestureAction,
    frames_processed: u64,
}

impl<C: Camera, O: OrbitControls> FrameProcessor<C, O> {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            controller: CameraOrbitController::new(&config),
            config,
            session: GestureSessionState::new(),
            last_action: GestureAction::Idle,
            frames_processed: 0,
        }
    }

    /// Bind the camera and controls to drive, returning the previous binding
    pub fn bind(&mut self, controls: O, camera: C) -> Option<CameraBinding<C, O>> {
        self.controller.bind(controls, camera)
    }

    pub fn controller(&self) -> &CameraOrbitController<C, O> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CameraOrbitController<C, O> {
        &mut self.controller
    }

    pub fn pose(&self) -> Option<CameraPose> {
        self.controller.pose()
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn session(&self) -> &GestureSessionState {
        &self.session
    }

    pub fn last_action(&self) -> GestureAction {
        self.last_action
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Return to the initial gesture state; the camera binding is kept
    pub fn reset(&mut self) {
        self.session.reset();
        self.last_action = GestureAction::Idle;
    }

    /// Interpret one detection frame and move the camera accordingly
    pub fn process(&mut self, frame: &DetectionFrame) -> PinchState {
        if !self.controller.is_bound() {
            trace!("Ignoring frame, no camera bound");
            return PinchState::default();
        }

        let hands = assign_hands(frame);
        let threshold = self.config.pinch_threshold;
        let right_pinch = is_pinching(hands.right, threshold);
        let left_pinch = is_pinching(hands.left, threshold);

        let right_tip = index_tip(hands.right);
        let left_tip = index_tip(hands.left);
        let mut action = GestureAction::Idle;

        if right_pinch && !left_pinch {
            if let Some(current) = right_tip {
                action = self.drag(current);
            }
        } else {
            self.session.last_right_index_tip = None;
        }

        if right_pinch && left_pinch {
            if let (Some(right), Some(left)) = (right_tip, left_tip) {
                action = self.zoom(planar_distance(&right, &left));
            }
        } else {
            self.session.previous_two_hand_distance = None;
        }

        self.session.previous_right_pinch = right_pinch;
        self.last_action = action;
        self.frames_processed += 1;

        if action == GestureAction::Idle {
            trace!(right_pinch, left_pinch, "Gesture frame");
        } else {
            debug!(?action, right_pinch, left_pinch, "Gesture frame");
        }

        PinchState {
            right_hand_pinch: right_pinch,
            left_hand_pinch: left_pinch,
        }
    }

    fn drag(&mut self, current: Landmark) -> GestureAction {
        let action = match self.session.last_right_index_tip {
            Some(last) if self.session.previous_right_pinch => {
                // Image x grows to the user's left in a mirrored feed
                let dx = last.x - current.x;
                let dy = current.y - last.y;
                self.controller.rotate(dx, dy);
                GestureAction::Rotated { dx, dy }
            }
            _ => GestureAction::RotateSeeded,
        };
        self.session.last_right_index_tip = Some(current);
        action
    }

    fn zoom(&mut self, distance: f32) -> GestureAction {
        let action = match self.session.previous_two_hand_distance {
            Some(previous) => {
                let factor = previous / distance;
                if factor > self.config.zoom_dead_zone_high {
                    self.controller.scale_distance(self.config.zoom_step);
                    GestureAction::Zoomed {
                        direction: ZoomDirection::Out,
                    }
                } else if factor < self.config.zoom_dead_zone_low {
                    self.controller.scale_distance(self.config.zoom_step.recip());
                    GestureAction::Zoomed {
                        direction: ZoomDirection::In,
                    }
                } else {
                    GestureAction::ZoomHeld
                }
            }
            None => GestureAction::ZoomSeeded,
        };
        // Compare against the previous frame, not the pinch start. A zero
        // distance can't serve as a ratio base, so it restarts the zoom.
        self.session.previous_two_hand_distance = (distance > 0.0).then_some(distance);
        action
    }
}

fn index_tip(landmarks: Option<&[Landmark]>) -> Option<Landmark> {
    landmarks.and_then(|points| points.get(INDEX_TIP)).copied()
}
