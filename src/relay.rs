//! One-shot channel carrying the outcome from the scan screen back to the requester
//!
//! The sending half lives in the scan screen and can be fired from the analyzer
//! worker or from host callbacks, so the "already reported" guard sits behind a
//! lock: whoever takes the sender first wins, everyone after that is dropped.
//! Dropping the sender without sending closes the channel and the receiver sees
//! `None`.

use std::{sync::Arc, thread::JoinHandle, time::Duration};

use flume::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use scanner_util::thread::spawn_named;
use tracing::{debug, warn};

use crate::outcome::{ScanErrorReason, ScanOutcome};

const DELIVERY_THREAD_NAME: &str = "barcode-outcome";

/// Receives the result of a scan started with [`crate::scanner::RustBarcodeScanner::scan`]
#[uniffi::export(callback_interface)]
pub trait ScanResultListener: Send + Sync + 'static {
    fn on_success(&self, payload: String);

    fn on_error(&self, reason: ScanErrorReason, message: Option<String>);
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("timed out waiting for the scan outcome")]
    Timeout,
}

pub fn outcome_channel() -> (OutcomeSender, OutcomeReceiver) {
    let (sender, receiver) = flume::bounded(1);
    (OutcomeSender { sender: Mutex::new(Some(sender)) }, OutcomeReceiver { receiver })
}

#[derive(Debug)]
pub struct OutcomeSender {
    sender: Mutex<Option<Sender<ScanOutcome>>>,
}

impl OutcomeSender {
    /// Send the outcome, returns false if one was already sent or the channel was closed
    pub fn send(&self, outcome: ScanOutcome) -> bool {
        let Some(sender) = self.sender.lock().take() else {
            debug!("outcome already reported, ignoring {outcome:?}");
            return false;
        };

        if let Err(error) = sender.send(outcome) {
            warn!("scan requester is gone, outcome lost: {:?}", error.into_inner());
        }

        true
    }

    /// Close the channel without an outcome
    pub fn close(&self) -> bool {
        self.sender.lock().take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }
}

#[derive(Debug)]
pub struct OutcomeReceiver {
    receiver: Receiver<ScanOutcome>,
}

impl OutcomeReceiver {
    /// Block until the outcome arrives, `None` if the screen went away without one
    pub fn recv(self) -> Option<ScanOutcome> {
        self.receiver.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<ScanOutcome>, RelayError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(RecvTimeoutError::Disconnected) => Ok(None),
            Err(RecvTimeoutError::Timeout) => Err(RelayError::Timeout),
        }
    }

    pub async fn recv_async(self) -> Option<ScanOutcome> {
        self.receiver.recv_async().await.ok()
    }
}

/// Wait for the outcome on a background thread and hand it to the listener
pub fn deliver_to_listener(
    receiver: OutcomeReceiver,
    listener: Arc<dyn ScanResultListener>,
) -> std::io::Result<JoinHandle<()>> {
    spawn_named(DELIVERY_THREAD_NAME, move || match receiver.recv() {
        Some(ScanOutcome::Success { payload }) => listener.on_success(payload),
        Some(ScanOutcome::Failure { reason, message }) => listener.on_error(reason, message),
        None => debug!("scan screen closed without an outcome"),
    })
}
