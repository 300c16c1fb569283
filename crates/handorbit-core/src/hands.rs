//! Mapping detector handedness to the user's logical hands
//!
//! The tracking feed comes from a front-facing camera, so the detector sees
//! a mirrored image: a hand it labels "Right" is the user's left hand and
//! vice versa. Rotation is driven by the user's right hand and zoom by both,
//! so swapping this mapping silently swaps the controls.

use tracing::debug;

use crate::landmark::{DetectionFrame, HandLabel, Landmark};

/// Landmarks for the user's right and left hand in one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignedHands<'a> {
    pub right: Option<&'a [Landmark]>,
    pub left: Option<&'a [Landmark]>,
}

impl AssignedHands<'_> {
    pub fn count(&self) -> usize {
        usize::from(self.right.is_some()) + usize::from(self.left.is_some())
    }
}

/// Resolve a detection frame into logical right/left hands
///
/// Detector label "Left" fills the right-hand slot and "Right" fills the
/// left-hand slot. If a label appears twice the later detection wins.
/// Unknown labels and unpaired entries leave their hand unresolved.
pub fn assign_hands(frame: &DetectionFrame) -> AssignedHands<'_> {
    if frame.is_mismatched() {
        debug!(
            labels = frame.multi_handedness.as_ref().map_or(0, Vec::len),
            landmarks = frame.multi_hand_landmarks.as_ref().map_or(0, Vec::len),
            "Handedness and landmark lists differ in length"
        );
    }

    let mut hands = AssignedHands::default();
    for detection in frame.hands() {
        match detection.label {
            HandLabel::Left => hands.right = Some(detection.landmarks),
            HandLabel::Right => hands.left = Some(detection.landmarks),
            HandLabel::Unknown => {
                debug!("Skipping hand with unrecognised handedness label");
            }
        }
    }
    hands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::synthetic_hand;

    fn hand_at(x: f32) -> Vec<Landmark> {
        synthetic_hand(Landmark::new(x, 0.5), Landmark::new(x, 0.5))
    }

    #[test]
    fn test_labels_are_mirrored() {
        let frame = DetectionFrame::from_hands([
            (HandLabel::Right, hand_at(0.2)),
            (HandLabel::Left, hand_at(0.8)),
        ]);

        let hands = assign_hands(&frame);
        assert_eq!(hands.left.unwrap()[0].x, 0.0);
        assert_eq!(hands.left.unwrap()[4].x, 0.2);
        assert_eq!(hands.right.unwrap()[4].x, 0.8);
        assert_eq!(hands.count(), 2);
    }

    #[test]
    fn test_single_detector_right_is_logical_left() {
        let frame = DetectionFrame::from_hands([(HandLabel::Right, hand_at(0.3))]);

        let hands = assign_hands(&frame);
        assert!(hands.right.is_none());
        assert_eq!(hands.left.unwrap()[4].x, 0.3);
    }

    #[test]
    fn test_duplicate_label_later_wins() {
        let frame = DetectionFrame::from_hands([
            (HandLabel::Left, hand_at(0.1)),
            (HandLabel::Left, hand_at(0.9)),
        ]);

        let hands = assign_hands(&frame);
        assert_eq!(hands.right.unwrap()[4].x, 0.9);
        assert!(hands.left.is_none());
    }

    #[test]
    fn test_empty_and_unknown() {
        assert_eq!(assign_hands(&DetectionFrame::empty()).count(), 0);

        let frame = DetectionFrame::from_hands([(HandLabel::Unknown, hand_at(0.5))]);
        assert_eq!(assign_hands(&frame).count(), 0);
    }
}
