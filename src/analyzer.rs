//! Frame analysis on a dedicated worker thread
//!
//! Frames arrive from the host's camera thread and are queued to a single
//! worker that runs the decoder. The queue is bounded and keeps the latest
//! frames: when it is full the oldest pending frame makes room for the new one.
//!
//! The worker only holds a weak reference to whoever consumes its results, so
//! dropping the scan screen is enough to stop it.

use std::{
    io,
    ops::ControlFlow,
    sync::{Arc, Weak},
    thread::JoinHandle,
};

use flume::{Receiver, Sender, TrySendError};
use scanner_util::thread::{is_current, spawn_named};
use tracing::{debug, error, trace, warn};

use crate::{
    decoder::{DecoderError, SymbologyFilter},
    frame::Frame,
};

const WORKER_THREAD_NAME: &str = "barcode-analyzer";

/// What one frame turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResult {
    /// Nothing in the requested symbologies
    NoCode,
    Found { payload: String },
    InvalidPayload { message: String },
    /// Frame-level decoder error, scanning goes on
    Skipped(DecoderError),
    /// The decoder gave up
    Failed { message: String },
}

/// Consumer of analysis results, `Break` stops the worker
pub trait AnalysisSink: Send + Sync {
    fn on_analysis(self: &Arc<Self>, result: AnalysisResult) -> ControlFlow<()>;
}

/// Run the decoder on one frame and classify what came back
pub fn analyze(filter: &SymbologyFilter, frame: Frame) -> AnalysisResult {
    let barcodes = match filter.decode(frame) {
        Ok(barcodes) => barcodes,
        Err(error) if error.is_unrecoverable() => {
            return AnalysisResult::Failed { message: error.to_string() };
        }
        Err(error) => return AnalysisResult::Skipped(error),
    };

    for barcode in barcodes {
        match barcode.payload() {
            Ok(Some(payload)) => return AnalysisResult::Found { payload },
            Ok(None) => continue,
            Err(error) => return AnalysisResult::InvalidPayload { message: error.to_string() },
        }
    }

    AnalysisResult::NoCode
}

#[derive(Debug)]
pub struct FrameAnalyzer {
    sender: Option<Sender<Frame>>,
    // second handle on the queue, used to evict stale frames
    pending: Receiver<Frame>,
    worker: Option<JoinHandle<()>>,
}

impl FrameAnalyzer {
    pub fn spawn<S>(filter: SymbologyFilter, queue_depth: usize, sink: Weak<S>) -> io::Result<Self>
    where
        S: AnalysisSink + 'static,
    {
        let (sender, receiver) = flume::bounded::<Frame>(queue_depth.max(1));

        let pending = receiver.clone();
        let worker = spawn_named(WORKER_THREAD_NAME, move || {
            debug!("analyzer started for {:?}", filter.allowed());

            while let Ok(frame) = receiver.recv() {
                let Some(sink) = sink.upgrade() else {
                    debug!("scan screen dropped, stopping analyzer");
                    break;
                };

                let result = analyze(&filter, frame);
                trace!("analysis result: {result:?}");

                if sink.on_analysis(result).is_break() {
                    break;
                }
            }

            debug!("analyzer stopped");
        })?;

        Ok(Self { sender: Some(sender), pending, worker: Some(worker) })
    }

    /// Queue a frame, replacing the oldest pending one when the queue is full
    ///
    /// Returns false only once the analyzer is shut down.
    pub fn submit(&self, frame: Frame) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };

        let mut frame = frame;
        loop {
            match sender.try_send(frame) {
                Ok(()) => return true,
                Err(TrySendError::Full(rejected)) => {
                    if let Ok(stale) = self.pending.try_recv() {
                        trace!("analyzer busy, dropping stale frame {}", stale.timestamp_ms);
                    }
                    frame = rejected;
                }
                Err(TrySendError::Disconnected(_)) => {
                    warn!("analyzer is gone, dropping frame");
                    return false;
                }
            }
        }
    }

    /// Close the queue and wait for the worker
    ///
    /// Called from the worker itself (a result that ends the scan) this does
    /// not wait, the worker exits on its own once the current frame is done.
    pub fn shutdown(&mut self) {
        self.sender.take();

        let Some(worker) = self.worker.take() else {
            return;
        };

        if is_current(&worker) {
            return;
        }

        if worker.join().is_err() {
            error!("analyzer worker panicked");
        }
    }
}

impl Drop for FrameAnalyzer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
