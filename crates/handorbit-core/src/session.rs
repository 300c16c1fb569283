//! Cross-frame gesture memory

use crate::landmark::Landmark;

/// What the previous frames left behind for the next one to compare against
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureSessionState {
    /// Whether the right hand was pinching on the previous frame
    pub previous_right_pinch: bool,
    /// Right index tip while a one-hand drag is in progress
    pub last_right_index_tip: Option<Landmark>,
    /// Tip-to-tip distance on the previous two-hand pinch frame
    pub previous_two_hand_distance: Option<f32>,
}

impl GestureSessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any drag or zoom in progress
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_dragging(&self) -> bool {
        self.last_right_index_tip.is_some()
    }

    pub fn is_zooming(&self) -> bool {
        self.previous_two_hand_distance.is_some()
    }
}
