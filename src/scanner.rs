//! Entry point for hosts: start a scan, get exactly one answer back

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use tracing::{debug, error};

use crate::{
    config::{ConfigError, ScannerConfig},
    decoder::BarcodeDecoder,
    outcome::{ScanErrorReason, ScanOutcome},
    relay::{self, OutcomeReceiver, OutcomeSender, RelayError, ScanResultListener},
    request::ScanRequest,
    screen::ScanScreen,
};

/// Shows a scan screen, implemented by the host
#[uniffi::export(callback_interface)]
pub trait ScreenLauncher: Send + Sync + std::fmt::Debug + 'static {
    /// Present the screen, must not block until the scan is done
    fn launch(&self, screen: Arc<ScanScreen>);
}

#[derive(uniffi::Object)]
pub struct RustBarcodeScanner {
    launcher: Box<dyn ScreenLauncher>,
    decoder: Arc<dyn BarcodeDecoder>,
    config: ScannerConfig,
}

#[uniffi::export]
impl RustBarcodeScanner {
    #[uniffi::constructor]
    pub fn new(launcher: Box<dyn ScreenLauncher>, decoder: Arc<dyn BarcodeDecoder>) -> Self {
        Self { launcher, decoder, config: ScannerConfig::default() }
    }

    #[uniffi::constructor]
    pub fn with_config(
        launcher: Box<dyn ScreenLauncher>,
        decoder: Arc<dyn BarcodeDecoder>,
        config: ScannerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { launcher, decoder, config })
    }

    /// Start a scan, the listener is called once with the result
    ///
    /// Returns right after the screen was handed to the launcher. If the host
    /// destroys the screen before it reports, the listener is never called.
    #[uniffi::method]
    pub fn scan(&self, request: ScanRequest, listener: Box<dyn ScanResultListener>) {
        let listener: Arc<dyn ScanResultListener> = Arc::from(listener);
        let (sender, receiver) = relay::outcome_channel();

        if let Err(spawn_error) = relay::deliver_to_listener(receiver, listener.clone()) {
            error!("unable to start outcome delivery: {spawn_error}");
            listener.on_error(ScanErrorReason::Unknown, Some(spawn_error.to_string()));
            return;
        }

        self.launch(request, sender);
    }

    #[uniffi::method]
    pub fn config(&self) -> ScannerConfig {
        self.config.clone()
    }
}

impl RustBarcodeScanner {
    /// Start a scan and wait for the result from Rust
    pub fn scan_with_handle(&self, request: ScanRequest) -> ScanHandle {
        let (sender, receiver) = relay::outcome_channel();
        let screen = self.launch(request, sender);

        ScanHandle { receiver, screen: Arc::downgrade(&screen) }
    }

    fn launch(&self, request: ScanRequest, outcome: OutcomeSender) -> Arc<ScanScreen> {
        debug!("launching scan screen for {request:?}");

        let screen =
            Arc::new(ScanScreen::new(request, self.config.clone(), self.decoder.clone(), outcome));

        self.launcher.launch(screen.clone());
        screen
    }
}

impl std::fmt::Debug for RustBarcodeScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RustBarcodeScanner")
            .field("launcher", &self.launcher)
            .field("config", &self.config)
            .finish()
    }
}

/// Rust side of a running scan
#[derive(Debug)]
pub struct ScanHandle {
    receiver: OutcomeReceiver,
    screen: Weak<ScanScreen>,
}

impl ScanHandle {
    /// The screen, while the host still holds it
    pub fn screen(&self) -> Option<Arc<ScanScreen>> {
        self.screen.upgrade()
    }

    /// Block until the scan ends, `None` if the screen closed without an outcome
    pub fn wait(self) -> Option<ScanOutcome> {
        self.receiver.recv()
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Result<Option<ScanOutcome>, RelayError> {
        self.receiver.recv_timeout(timeout)
    }

    pub async fn outcome(self) -> Option<ScanOutcome> {
        self.receiver.recv_async().await
    }
}
