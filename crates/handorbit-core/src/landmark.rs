//! Hand landmark types as delivered by the hand tracking pipeline
//!
//! A detection frame follows the MediaPipe Hands result layout: a list of
//! handedness entries and a parallel list of 21-joint landmark sequences.
//! Either list may be missing or malformed, in which case the frame carries
//! no hands.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Number of joints reported per hand
pub const HAND_JOINTS: usize = 21;

pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;

/// A single tracked joint in normalized image coordinates
///
/// Only `x` and `y` take part in gesture interpretation; `z` is carried
/// through so recorded frames round-trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Handedness label as reported by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandLabel {
    Left,
    Right,
    /// Any label the detector emits that we don't recognise
    #[serde(other)]
    Unknown,
}

/// Handedness classification for one detected hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handedness {
    pub label: HandLabel,
    /// Detector confidence (0.0 - 1.0)
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub index: u32,
}

impl Handedness {
    pub fn new(label: HandLabel) -> Self {
        Self {
            label,
            score: 1.0,
            index: 0,
        }
    }
}

/// One hand resolved from a frame: its label and joint positions
#[derive(Debug, Clone, Copy)]
pub struct HandDetection<'a> {
    pub label: HandLabel,
    pub landmarks: &'a [Landmark],
}

impl<'a> HandDetection<'a> {
    pub fn thumb_tip(&self) -> Option<&'a Landmark> {
        self.landmarks.get(THUMB_TIP)
    }

    pub fn index_tip(&self) -> Option<&'a Landmark> {
        self.landmarks.get(INDEX_TIP)
    }
}

/// Detection result for a single tracking tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionFrame {
    #[serde(default, deserialize_with = "lenient")]
    pub multi_handedness: Option<Vec<Handedness>>,
    #[serde(default, deserialize_with = "lenient")]
    pub multi_hand_landmarks: Option<Vec<Vec<Landmark>>>,
}

/// A collection that fails to deserialize is read as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        Valid(Option<T>),
        Invalid(IgnoredAny),
    }

    Ok(match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Valid(value) => value,
        Lenient::Invalid(_) => None,
    })
}

impl DetectionFrame {
    /// A frame with no hands detected
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a frame from (label, landmarks) pairs
    pub fn from_hands(hands: impl IntoIterator<Item = (HandLabel, Vec<Landmark>)>) -> Self {
        let mut handedness = Vec::new();
        let mut landmarks = Vec::new();
        for (i, (label, points)) in hands.into_iter().enumerate() {
            handedness.push(Handedness {
                index: i as u32,
                ..Handedness::new(label)
            });
            landmarks.push(points);
        }
        Self {
            multi_handedness: Some(handedness),
            multi_hand_landmarks: Some(landmarks),
        }
    }

    /// Iterate the hands in this frame
    ///
    /// Labels and landmark lists are paired by position. Entries without a
    /// partner in the other list are skipped.
    pub fn hands(&self) -> impl Iterator<Item = HandDetection<'_>> {
        let labels = self.multi_handedness.as_deref().unwrap_or_default();
        let landmarks = self.multi_hand_landmarks.as_deref().unwrap_or_default();
        labels
            .iter()
            .zip(landmarks.iter())
            .map(|(handedness, points)| HandDetection {
                label: handedness.label,
                landmarks: points.as_slice(),
            })
    }

    /// True when the label and landmark lists disagree in length
    pub fn is_mismatched(&self) -> bool {
        let labels = self.multi_handedness.as_ref().map_or(0, Vec::len);
        let landmarks = self.multi_hand_landmarks.as_ref().map_or(0, Vec::len);
        labels != landmarks
    }
}

/// Build a full 21-joint hand with the given thumb and index tip positions
///
/// Remaining joints sit at the wrist origin. Handy for synthetic input.
pub fn synthetic_hand(thumb_tip: Landmark, index_tip: Landmark) -> Vec<Landmark> {
    let mut points = vec![Landmark::default(); HAND_JOINTS];
    points[THUMB_TIP] = thumb_tip;
    points[INDEX_TIP] = index_tip;
    points
}
