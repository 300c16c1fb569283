//! Offline replay of recorded detection frames
//!
//! A recording is a JSON Lines file with one detection frame per line.
//! Blank lines and lines starting with `#` are ignored.

use anyhow::{Context, Result};
use handorbit_core::{CameraPose, DetectionFrame, GestureAction};
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::state::start_processor;

/// Outcome of replaying a recording
#[derive(Debug, Clone, Default)]
pub struct ReplaySummary {
    pub frames: u64,
    /// Lines that failed to parse and were replayed as empty frames
    pub skipped: u64,
    pub rotations: u64,
    pub zooms: u64,
    pub final_pose: Option<CameraPose>,
}

/// Replay a recording file against a fresh processor
pub fn replay_file(path: &Path, config: &Config) -> Result<ReplaySummary> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open recording {}", path.display()))?;
    info!(path = %path.display(), "Replaying recorded frames");
    replay(std::io::BufReader::new(file), config)
}

/// Replay recorded frames from any line-oriented reader
pub fn replay(reader: impl BufRead, config: &Config) -> Result<ReplaySummary> {
    let mut processor = start_processor(config);
    let mut summary = ReplaySummary::default();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // A malformed line still counts as a frame with no hands
        let frame: DetectionFrame = match serde_json::from_str(line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(line = number + 1, error = %e, "Malformed frame, treating as no hands");
                summary.skipped += 1;
                DetectionFrame::empty()
            }
        };

        let pinch = processor.process(&frame);
        summary.frames += 1;
        match processor.last_action() {
            GestureAction::Rotated { .. } => summary.rotations += 1,
            GestureAction::Zoomed { .. } => summary.zooms += 1,
            _ => {}
        }
        debug!(
            line = number + 1,
            right = pinch.right_hand_pinch,
            left = pinch.left_hand_pinch,
            "Replayed frame"
        );
    }

    summary.final_pose = processor.pose();
    info!(
        frames = summary.frames,
        skipped = summary.skipped,
        rotations = summary.rotations,
        zooms = summary.zooms,
        "Replay finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use handorbit_core::landmark::synthetic_hand;
    use handorbit_core::{HandLabel, Landmark};
    use std::io::Write;

    fn frame_line(hands: Vec<(HandLabel, f32, f32)>) -> String {
        let frame = DetectionFrame::from_hands(hands.into_iter().map(|(label, x, y)| {
            let tip = Landmark::new(x, y);
            (label, synthetic_hand(tip, tip))
        }));
        serde_json::to_string(&frame).unwrap()
    }

    #[test]
    fn test_replay_counts_gestures() {
        let lines = [
            "# drag then zoom".to_string(),
            frame_line(vec![(HandLabel::Left, 0.5, 0.5)]),
            frame_line(vec![(HandLabel::Left, 0.45, 0.5)]),
            String::new(),
            frame_line(vec![(HandLabel::Left, 0.3, 0.5), (HandLabel::Right, 0.72, 0.5)]),
            frame_line(vec![(HandLabel::Left, 0.3, 0.5), (HandLabel::Right, 0.7, 0.5)]),
            "{not json".to_string(),
            "{}".to_string(),
        ];

        let summary = replay(lines.join("\n").as_bytes(), &Config::default()).unwrap();
        assert_eq!(summary.frames, 6);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.rotations, 1);
        assert_eq!(summary.zooms, 1);

        let pose = summary.final_pose.unwrap();
        assert!((pose.distance - 10.5).abs() < 1e-4);
        assert!((pose.azimuth + 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_malformed_line_ends_drag() {
        let lines = [
            frame_line(vec![(HandLabel::Left, 0.5, 0.5)]),
            "{not json".to_string(),
            frame_line(vec![(HandLabel::Left, 0.45, 0.5)]),
            r#"{"multiHandedness": 3}"#.to_string(),
            frame_line(vec![(HandLabel::Left, 0.4, 0.5)]),
        ];

        let summary = replay(lines.join("\n").as_bytes(), &Config::default()).unwrap();
        assert_eq!(summary.frames, 5);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.rotations, 0);
        assert!(summary.final_pose.unwrap().azimuth.abs() < 1e-6);
    }

    #[test]
    fn test_replay_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", frame_line(vec![(HandLabel::Left, 0.5, 0.5)])).unwrap();

        let summary = replay_file(file.path(), &Config::default()).unwrap();
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.rotations, 0);
    }

    #[test]
    fn test_replay_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(replay_file(&dir.path().join("missing.jsonl"), &Config::default()).is_err());
    }
}
