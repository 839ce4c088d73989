pub mod analyzer;
pub mod build;
pub mod config;
pub mod decoder;
pub mod frame;
pub mod logging;
pub mod outcome;
pub mod permission;
pub mod relay;
pub mod request;
pub mod scanner;
pub mod screen;
pub mod symbology;

pub use config::{CameraFacing, ScannerConfig};
pub use decoder::{BarcodeDecoder, DecoderError};
pub use frame::{DecodedBarcode, Frame};
pub use outcome::{ScanErrorReason, ScanOutcome};
pub use relay::ScanResultListener;
pub use request::{Overlay, ScanRequest};
pub use scanner::{RustBarcodeScanner, ScanHandle, ScreenLauncher};
pub use screen::{ScanScreen, ScanScreenReconcileMessage, ScanScreenReconciler, ScanScreenState};
pub use symbology::{ScanType, Symbology};

#[cfg(feature = "qr")]
pub use decoder::QrDecoder;

uniffi::setup_scaffolding!();
