//! Headless scan screen host
//!
//! Plays the part of the mobile app: launches a scan, grants (or denies) the
//! camera permissions and feeds image files to the screen as camera frames.
//!
//! ```text
//! scan-demo --scan-type qr ticket.png shelf.jpg
//! ```

use std::{
    path::{Path, PathBuf},
    process,
    sync::Arc,
    time::Duration,
};

use barcode_scanner::{
    Frame, Overlay, RustBarcodeScanner, ScanOutcome, ScanRequest, ScanScreen,
    ScanScreenReconcileMessage, ScanScreenReconciler, ScanType, ScannerConfig, ScreenLauncher,
    build, decoder::qr::qr_decoder, logging, permission::Permission, relay::RelayError,
};
use clap::{Parser, ValueEnum};
use eyre::{Context as _, Result, eyre};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "scan-demo")]
#[command(version)]
#[command(about = "Run a scan over image files as if they were camera frames", long_about = None)]
struct Args {
    /// What to look for
    #[arg(long, value_enum, default_value_t = ScanTypeArg::Qr)]
    scan_type: ScanTypeArg,

    /// Answer the permission request with nothing granted
    #[arg(long)]
    deny_permissions: bool,

    /// Overlay resource id shown on top of the preview
    #[arg(long)]
    overlay: Option<i32>,

    /// Scanner configuration as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// How long to wait for a result after the last frame, in milliseconds
    #[arg(long, default_value_t = 2000)]
    timeout_ms: u64,

    /// Tracing filter directives, defaults to RUST_LOG
    #[arg(long)]
    log: Option<String>,

    /// Images to feed as frames, in order
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScanTypeArg {
    Qr,
    Barcode,
    All,
}

impl From<ScanTypeArg> for ScanType {
    fn from(arg: ScanTypeArg) -> Self {
        match arg {
            ScanTypeArg::Qr => ScanType::Qr,
            ScanTypeArg::Barcode => ScanType::Barcode,
            ScanTypeArg::All => ScanType::All,
        }
    }
}

/// Hands launched screens back to `main`
#[derive(Debug)]
struct ChannelLauncher(flume::Sender<Arc<ScanScreen>>);

impl ScreenLauncher for ChannelLauncher {
    fn launch(&self, screen: Arc<ScanScreen>) {
        let _ = self.0.send(screen);
    }
}

#[derive(Debug)]
struct LogReconciler;

impl ScanScreenReconciler for LogReconciler {
    fn reconcile(&self, message: ScanScreenReconcileMessage) {
        info!("screen: {message:?}");
    }
}

fn main() {
    let args = Args::parse();
    logging::init(args.log.as_deref());

    match run(args) {
        Ok(Some(outcome)) => {
            let code = outcome.result_code().code();
            match outcome {
                ScanOutcome::Success { payload } => println!("{payload}"),
                ScanOutcome::Failure { reason, message } => {
                    eprintln!("scan failed ({code}): {reason:?} {}", message.unwrap_or_default());
                    process::exit(2);
                }
            }
        }
        Ok(None) => {
            eprintln!("no code found");
            process::exit(1);
        }
        Err(error) => {
            eprintln!("error: {error:?}");
            process::exit(3);
        }
    }
}

fn run(args: Args) -> Result<Option<ScanOutcome>> {
    debug!("{}", build::build_summary());

    let frames = args.images.iter().map(|path| load_frame(path)).collect::<Result<Vec<_>>>()?;

    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("reading {}", path.display()))?;
            ScannerConfig::from_json(&json)?
        }
        None => ScannerConfig::default(),
    };

    // every image gets analyzed, nothing is dropped for being late
    config.analysis_queue_depth = config.analysis_queue_depth.max(frames.len() as u32);

    let mut request = ScanRequest::new(args.scan_type.into());
    if let Some(overlay) = args.overlay.and_then(Overlay::from_resource_id) {
        request = request.with_overlay(overlay);
    }

    let session = Session {
        config,
        request,
        deny_permissions: args.deny_permissions,
        timeout: Duration::from_millis(args.timeout_ms),
    };

    session.run(frames)
}

/// One scan driven the way the mobile screen would drive it
struct Session {
    config: ScannerConfig,
    request: ScanRequest,
    deny_permissions: bool,
    timeout: Duration,
}

impl Session {
    fn run(self, frames: Vec<Frame>) -> Result<Option<ScanOutcome>> {
        let (launched, screens) = flume::bounded(1);
        let scanner = RustBarcodeScanner::with_config(
            Box::new(ChannelLauncher(launched)),
            qr_decoder(),
            self.config,
        )?;

        let handle = scanner.scan_with_handle(self.request);
        let screen = screens.try_recv().map_err(|_| eyre!("scan screen was not launched"))?;
        screen.listen_for_updates(Box::new(LogReconciler));

        if self.deny_permissions {
            screen.on_create(vec![]);
            screen.on_permissions_result(vec![]);
        } else {
            let granted: Vec<Permission> = screen.required_permissions();
            screen.on_create(granted);
        }

        for frame in frames {
            if !screen.analyze_frame(frame) {
                break;
            }
        }

        match handle.wait_timeout(self.timeout) {
            Ok(outcome) => return Ok(outcome),
            Err(RelayError::Timeout) => {}
        }

        info!("analyzed {} frames without a result", screen.frames_analyzed());
        screen.on_destroy();

        Ok(handle.wait())
    }
}

fn load_frame(path: &Path) -> Result<Frame> {
    let image = image::open(path).wrap_err_with(|| format!("opening {}", path.display()))?;
    let luma = image.to_luma8();
    let (width, height) = luma.dimensions();

    Ok(Frame::new(width, height, luma.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use barcode_scanner::ScanErrorReason;
    use image::Luma;
    use pretty_assertions::assert_eq;
    use qrcode::QrCode;

    fn session(scan_type: ScanType) -> Session {
        Session {
            config: ScannerConfig::default(),
            request: ScanRequest::new(scan_type),
            deny_permissions: false,
            timeout: Duration::from_millis(300),
        }
    }

    fn blank_frame() -> Frame {
        Frame::new(64, 64, vec![255; 64 * 64])
    }

    #[test]
    fn test_blank_image_finds_no_code() {
        let outcome = session(ScanType::All).run(vec![blank_frame()]).unwrap();
        assert_eq!(outcome, None);
    }

    #[test]
    fn test_denied_permissions_fail() {
        let session = Session { deny_permissions: true, ..session(ScanType::Qr) };

        assert_eq!(
            session.run(vec![blank_frame()]).unwrap(),
            Some(ScanOutcome::Failure { reason: ScanErrorReason::PermissionMissing, message: None })
        );
    }

    #[test]
    fn test_qr_image_is_decoded() {
        let image = QrCode::new(b"ABC123")
            .unwrap()
            .render::<Luma<u8>>()
            .quiet_zone(true)
            .build();
        let (width, height) = image.dimensions();

        let outcome =
            session(ScanType::Qr).run(vec![Frame::new(width, height, image.into_raw())]).unwrap();

        assert_eq!(outcome, Some(ScanOutcome::success("ABC123")));
    }
}
