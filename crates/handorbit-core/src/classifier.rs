//! Pinch classification from a single hand's landmarks

use crate::landmark::{Landmark, INDEX_TIP, THUMB_TIP};

/// Euclidean distance in the image plane (z ignored)
pub fn planar_distance(a: &Landmark, b: &Landmark) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Whether the thumb tip and index tip are closer than `threshold`
///
/// Absent landmarks, or a list too short to hold both tips, classify as
/// not pinching.
pub fn is_pinching(landmarks: Option<&[Landmark]>, threshold: f32) -> bool {
    let Some(landmarks) = landmarks else {
        return false;
    };
    match (landmarks.get(THUMB_TIP), landmarks.get(INDEX_TIP)) {
        (Some(thumb), Some(index)) => planar_distance(thumb, index) < threshold,
        _ => false,
    }
}
