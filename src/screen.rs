//! The scan screen, driven by the host's camera screen
//!
//! The host shows its preview and forwards lifecycle callbacks, permission
//! answers and camera frames here. Anything the host has to do in response
//! comes back as a [`ScanScreenReconcileMessage`].

pub mod state;

use std::{
    ops::ControlFlow,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use flume::{Receiver, Sender};
use parking_lot::Mutex;
use scanner_util::thread::spawn_named;
use tracing::{debug, error, warn};

use crate::{
    analyzer::{AnalysisResult, AnalysisSink, FrameAnalyzer},
    config::{CameraFacing, ScannerConfig},
    decoder::{BarcodeDecoder, SymbologyFilter},
    frame::Frame,
    permission::{Permission, required_permissions},
    relay::OutcomeSender,
    request::{Overlay, ScanRequest},
    symbology::Symbology,
};

pub use state::ScanScreenState;
use state::{ScanStateMachine, ScreenEffect, ScreenEvent};

const RECONCILE_THREAD_NAME: &str = "barcode-screen-reconcile";

#[derive(Debug, Clone, Hash, Eq, PartialEq, uniffi::Enum)]
pub enum ScanScreenReconcileMessage {
    ShowOverlay(Overlay),
    RequestPermissions(Vec<Permission>),
    StartCamera { symbologies: Vec<Symbology>, facing: CameraFacing },
    /// Close the screen and release the camera
    Finish,
}

#[uniffi::export(callback_interface)]
pub trait ScanScreenReconciler: Send + Sync + std::fmt::Debug + 'static {
    /// Tells the host screen to reconcile the changes
    fn reconcile(&self, message: ScanScreenReconcileMessage);
}

#[derive(uniffi::Object)]
pub struct ScanScreen(Arc<Inner>);

struct Inner {
    request: ScanRequest,
    config: ScannerConfig,
    machine: Mutex<ScanStateMachine>,
    outcome: OutcomeSender,
    decoder: Arc<dyn BarcodeDecoder>,
    analyzer: Mutex<Option<FrameAnalyzer>>,
    frames_analyzed: AtomicU64,
    reconciler: Sender<ScanScreenReconcileMessage>,
    reconcile_receiver: Arc<Receiver<ScanScreenReconcileMessage>>,
}

impl ScanScreen {
    pub(crate) fn new(
        request: ScanRequest,
        config: ScannerConfig,
        decoder: Arc<dyn BarcodeDecoder>,
        outcome: OutcomeSender,
    ) -> Self {
        let (sender, receiver) = flume::bounded(1000);
        let required = required_permissions(config.sdk_version);

        let inner = Inner {
            request,
            config,
            machine: Mutex::new(ScanStateMachine::new(required)),
            outcome,
            decoder,
            analyzer: Mutex::new(None),
            frames_analyzed: AtomicU64::new(0),
            reconciler: sender,
            reconcile_receiver: Arc::new(receiver),
        };

        if let Some(overlay) = request.overlay {
            inner.send(ScanScreenReconcileMessage::ShowOverlay(overlay));
        }

        Self(Arc::new(inner))
    }
}

#[uniffi::export]
impl ScanScreen {
    #[uniffi::method]
    pub fn listen_for_updates(&self, reconciler: Box<dyn ScanScreenReconciler>) {
        let reconcile_receiver = self.0.reconcile_receiver.clone();

        let spawned = spawn_named(RECONCILE_THREAD_NAME, move || {
            while let Ok(message) = reconcile_receiver.recv() {
                // call the reconcile method on the host
                reconciler.reconcile(message);
            }
        });

        if let Err(error) = spawned {
            error!("unable to start scan screen reconcile thread: {error}");
        }
    }

    /// Screen is visible, `granted` are the permissions the host already holds
    #[uniffi::method]
    pub fn on_create(&self, granted: Vec<Permission>) {
        self.0.dispatch(ScreenEvent::Created { granted });
    }

    /// Answer to the `RequestPermissions` message
    #[uniffi::method]
    pub fn on_permissions_result(&self, granted: Vec<Permission>) {
        self.0.dispatch(ScreenEvent::PermissionsResult { granted });
    }

    /// Queue a camera frame for analysis, a full queue gives up its oldest frame
    ///
    /// Returns false when the screen is not scanning.
    #[uniffi::method]
    pub fn analyze_frame(&self, frame: Frame) -> bool {
        if self.state() != ScanScreenState::Scanning {
            return false;
        }

        match self.0.analyzer.lock().as_ref() {
            Some(analyzer) => analyzer.submit(frame),
            None => false,
        }
    }

    /// The camera could not be started or stopped delivering frames
    #[uniffi::method]
    pub fn on_camera_error(&self, message: Option<String>) {
        error!("camera error: {message:?}");
        self.0.dispatch(ScreenEvent::Failed { message });
    }

    #[uniffi::method]
    pub fn on_destroy(&self) {
        self.0.dispatch(ScreenEvent::Destroyed);
    }

    #[uniffi::method]
    pub fn state(&self) -> ScanScreenState {
        self.0.machine.lock().state()
    }

    #[uniffi::method]
    pub fn request(&self) -> ScanRequest {
        self.0.request
    }

    #[uniffi::method]
    pub fn required_permissions(&self) -> Vec<Permission> {
        self.0.machine.lock().required_permissions().to_vec()
    }

    /// Frames the decoder has run on so far
    #[uniffi::method]
    pub fn frames_analyzed(&self) -> u64 {
        self.0.frames_analyzed.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for ScanScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanScreen")
            .field("request", &self.0.request)
            .field("state", &self.state())
            .field("frames_analyzed", &self.frames_analyzed())
            .finish()
    }
}

impl Inner {
    fn dispatch(self: &Arc<Self>, event: ScreenEvent) {
        let effects = {
            let mut machine = self.machine.lock();
            let mut effects = machine.handle(event);

            // the outcome leaves while the lock is held so a concurrent
            // teardown can never close the channel ahead of it
            let outcome = effects.iter().find_map(|effect| match effect {
                ScreenEffect::Report(outcome) => Some(outcome.clone()),
                _ => None,
            });

            if let Some(outcome) = outcome {
                debug!("reporting {outcome:?}");
                self.outcome.send(outcome);
                effects.extend(machine.handle(ScreenEvent::Reported));
            }

            effects
        };

        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(self: &Arc<Self>, effect: ScreenEffect) {
        match effect {
            ScreenEffect::RequestPermissions(missing) => {
                self.send(ScanScreenReconcileMessage::RequestPermissions(missing));
            }
            ScreenEffect::StartScanning => self.start_analyzer(),
            ScreenEffect::Report(_) => {}
            ScreenEffect::Teardown => self.teardown(),
        }
    }

    fn start_analyzer(self: &Arc<Self>) {
        let filter = SymbologyFilter::new(self.decoder.clone(), self.request.symbology_set());
        let depth = self.config.analysis_queue_depth as usize;

        match FrameAnalyzer::spawn(filter, depth, Arc::downgrade(self)) {
            Ok(analyzer) => {
                {
                    // the screen may have been torn down while the worker was starting
                    let machine = self.machine.lock();
                    if machine.state() != ScanScreenState::Scanning {
                        drop(machine);
                        drop(analyzer);
                        return;
                    }

                    *self.analyzer.lock() = Some(analyzer);
                }

                self.send(ScanScreenReconcileMessage::StartCamera {
                    symbologies: self.request.symbologies(),
                    facing: self.config.camera_facing,
                });
            }
            Err(error) => {
                error!("unable to start frame analyzer: {error}");
                self.dispatch(ScreenEvent::Failed { message: Some(error.to_string()) });
            }
        }
    }

    fn teardown(&self) {
        // take it out first, shutdown may wait on the worker
        let analyzer = self.analyzer.lock().take();
        if let Some(mut analyzer) = analyzer {
            analyzer.shutdown();
        }

        if self.outcome.close() {
            warn!("scan screen closed before reporting an outcome");
        }

        self.send(ScanScreenReconcileMessage::Finish);
    }

    fn send(&self, message: ScanScreenReconcileMessage) {
        if let Err(error) = self.reconciler.try_send(message) {
            error!("unable to send message to scan screen: {error:?}");
        }
    }
}

impl AnalysisSink for Inner {
    fn on_analysis(self: &Arc<Self>, result: AnalysisResult) -> ControlFlow<()> {
        self.frames_analyzed.fetch_add(1, Ordering::Relaxed);

        let event = match result {
            AnalysisResult::NoCode => return ControlFlow::Continue(()),
            AnalysisResult::Skipped(error) => {
                debug!("skipping frame: {error}");
                return ControlFlow::Continue(());
            }
            AnalysisResult::Found { payload } => ScreenEvent::Decoded { payload },
            AnalysisResult::InvalidPayload { message } => ScreenEvent::InvalidResult { message },
            AnalysisResult::Failed { message } => ScreenEvent::Failed { message: Some(message) },
        };

        self.dispatch(event);
        ControlFlow::Break(())
    }
}
