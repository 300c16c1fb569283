//! Application state management
//!
//! A single processor task owns the gesture state machine and the camera.
//! Frames from every client go through one bounded queue, so they are
//! interpreted strictly in arrival order.

use anyhow::Result;
use chrono::{DateTime, Utc};
use glam::Quat;
use handorbit_core::{
    CameraPose, DetectionFrame, FrameProcessor, GestureAction, PinchState, SimCamera, SimControls,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, info};

use crate::config::Config;

pub type Processor = FrameProcessor<SimCamera, SimControls>;

/// Camera state published to clients
#[derive(Debug, Clone, Serialize)]
pub struct CameraView {
    #[serde(flatten)]
    pub pose: CameraPose,
    pub orientation: Quat,
}

/// Result of processing one frame
#[derive(Debug, Clone, Serialize)]
pub struct ViewUpdate {
    /// Frames processed so far, including this one
    pub frame: u64,
    pub pinch: PinchState,
    pub action: GestureAction,
    pub camera: Option<CameraView>,
    pub processed_at: DateTime<Utc>,
}

impl ViewUpdate {
    fn snapshot(processor: &Processor, pinch: PinchState) -> Self {
        let camera = processor.controller().binding().map(|binding| CameraView {
            pose: binding.pose(),
            orientation: binding.camera.rotation,
        });
        Self {
            frame: processor.frames_processed(),
            pinch,
            action: processor.last_action(),
            camera,
            processed_at: Utc::now(),
        }
    }
}

/// Work for the processor task
#[derive(Debug)]
enum Command {
    Frame(DetectionFrame),
    ResetCamera,
}

/// Parse a detection frame sent by a client
///
/// Text that isn't a frame at all counts as a frame with no hands, so an
/// in-progress drag or zoom ends rather than carrying over the bad frame.
pub fn parse_frame(text: &str) -> DetectionFrame {
    serde_json::from_str(text).unwrap_or_else(|e| {
        debug!(error = %e, "Malformed detection frame, treating as no hands");
        DetectionFrame::empty()
    })
}

/// Create a processor bound to the configured starting pose
pub fn start_processor(config: &Config) -> Processor {
    let mut processor = FrameProcessor::new(config.gestures);
    bind_start_pose(&mut processor, config);
    processor
}

fn bind_start_pose(processor: &mut Processor, config: &Config) {
    use handorbit_core::Camera;

    let target = config.camera.target();
    let mut camera = SimCamera::new(config.camera.position());
    camera.look_at(target);
    processor.bind(SimControls::new(target), camera);
}

/// Shared application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Queue into the processor task
    commands: mpsc::Sender<Command>,
    /// Most recent view, for clients that just connected
    latest: Arc<RwLock<ViewUpdate>>,
    /// Event broadcast for WebSocket clients
    pub events: broadcast::Sender<ViewUpdate>,
}

impl AppState {
    /// Create new application state and start the processor task
    pub fn new(config: Config) -> Arc<Self> {
        let processor = start_processor(&config);
        let latest = Arc::new(RwLock::new(ViewUpdate::snapshot(
            &processor,
            PinchState::default(),
        )));

        let (commands, rx) = mpsc::channel(config.daemon.frame_queue);
        let (events, _) = broadcast::channel(100);

        tokio::spawn(run_processor(
            processor,
            config.clone(),
            rx,
            latest.clone(),
            events.clone(),
        ));

        Arc::new(Self {
            config,
            commands,
            latest,
            events,
        })
    }

    /// Queue a detection frame, waiting if the queue is full
    pub async fn submit_frame(&self, frame: DetectionFrame) -> Result<()> {
        self.commands
            .send(Command::Frame(frame))
            .await
            .map_err(|_| anyhow::anyhow!("Frame processor is not running"))
    }

    /// Put the camera back at its starting pose and forget gesture state
    pub async fn reset_camera(&self) -> Result<()> {
        self.commands
            .send(Command::ResetCamera)
            .await
            .map_err(|_| anyhow::anyhow!("Frame processor is not running"))
    }

    /// Latest published view
    pub async fn latest(&self) -> ViewUpdate {
        self.latest.read().await.clone()
    }

    /// Subscribe to view updates
    pub fn subscribe(&self) -> broadcast::Receiver<ViewUpdate> {
        self.events.subscribe()
    }
}

async fn run_processor(
    mut processor: Processor,
    config: Config,
    mut rx: mpsc::Receiver<Command>,
    latest: Arc<RwLock<ViewUpdate>>,
    events: broadcast::Sender<ViewUpdate>,
) {
    info!("Frame processor started");

    while let Some(command) = rx.recv().await {
        let update = match command {
            Command::Frame(frame) => {
                let pinch = processor.process(&frame);
                ViewUpdate::snapshot(&processor, pinch)
            }
            Command::ResetCamera => {
                processor.reset();
                bind_start_pose(&mut processor, &config);
                info!("Camera reset to starting pose");
                ViewUpdate::snapshot(&processor, PinchState::default())
            }
        };

        *latest.write().await = update.clone();
        if events.send(update).is_err() {
            debug!("No view subscribers");
        }
    }

    info!("Frame queue closed, processor stopped");
}
