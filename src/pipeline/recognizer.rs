use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::{
    config::PipelineConfig,
    error::ConfigError,
    types::{Frame, FrameOutcome, RecognizedFrame},
};

use super::process_frame;

pub trait GestureRecognizer: Send + 'static {
    fn recognize(&mut self, frame: &Frame) -> FrameOutcome;

    fn label(&self) -> &'static str;
}

/// Skin segmentation followed by contour geometry.
#[derive(Clone, Debug)]
pub struct ContourRecognizer {
    config: PipelineConfig,
}

impl ContourRecognizer {
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl GestureRecognizer for ContourRecognizer {
    fn recognize(&mut self, frame: &Frame) -> FrameOutcome {
        process_frame(frame, &self.config)
    }

    fn label(&self) -> &'static str {
        "contour"
    }
}

#[derive(Clone, Debug)]
pub enum RecognizerBackend {
    Contour(PipelineConfig),
}

impl RecognizerBackend {
    pub fn label(&self) -> &'static str {
        match self {
            RecognizerBackend::Contour(_) => "contour",
        }
    }

    pub fn build(self) -> Result<Box<dyn GestureRecognizer>, ConfigError> {
        match self {
            RecognizerBackend::Contour(config) => Ok(Box::new(ContourRecognizer::new(config)?)),
        }
    }
}

impl Default for RecognizerBackend {
    fn default() -> Self {
        RecognizerBackend::Contour(PipelineConfig::default())
    }
}

/// Spawn the recognition worker. The backend is built on the calling thread so a bad
/// configuration fails here rather than inside the worker.
pub fn start_recognizer(
    backend: RecognizerBackend,
    frame_rx: Receiver<Frame>,
    result_tx: Sender<RecognizedFrame>,
) -> Result<thread::JoinHandle<()>, ConfigError> {
    let recognizer = backend.build()?;
    log::info!("starting gesture backend: {}", recognizer.label());

    Ok(thread::spawn(move || {
        run_worker_loop(recognizer, frame_rx, result_tx)
    }))
}

fn run_worker_loop(
    mut recognizer: Box<dyn GestureRecognizer>,
    frame_rx: Receiver<Frame>,
    result_tx: Sender<RecognizedFrame>,
) {
    let mut processed = 0usize;
    while let Some(frame) = recv_latest_frame(&frame_rx) {
        let outcome = recognizer.recognize(&frame);
        log::debug!("frame {processed}: {}", outcome.display_text());
        processed += 1;

        if result_tx.send(RecognizedFrame { frame, outcome }).is_err() {
            log::debug!("result receiver dropped");
            break;
        }
    }
    log::info!(
        "{} backend stopped after {processed} frames",
        recognizer.label()
    );
}

fn recv_latest_frame(frame_rx: &Receiver<Frame>) -> Option<Frame> {
    let mut frame = frame_rx.recv().ok()?;
    // Drop stale frames if the recognizer is still busy to avoid backlog.
    let mut skipped = 0usize;
    while let Ok(newer) = frame_rx.try_recv() {
        frame = newer;
        skipped += 1;
    }
    if skipped > 0 {
        log::warn!("skipped {skipped} stale frames");
    }
    Some(frame)
}
