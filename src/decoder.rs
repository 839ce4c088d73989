//! Decoder seam
//!
//! The host plugs in its own decoder (usually an ML based one) by implementing
//! [`BarcodeDecoder`]. Whatever it returns goes through [`SymbologyFilter`] so a
//! code outside the requested symbologies can never finish a scan.

#[cfg(feature = "qr")]
pub mod qr;

use std::sync::Arc;

use tracing::trace;

use crate::{
    frame::{DecodedBarcode, Frame, FrameError},
    symbology::{Symbology, SymbologySet},
};

#[cfg(feature = "qr")]
pub use qr::QrDecoder;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum DecoderError {
    /// This frame could not be processed, keep scanning
    #[error("transient decoder failure: {0}")]
    Transient(String),

    /// The decoder is unusable, the scan has to stop
    #[error("unrecoverable decoder failure: {0}")]
    Unrecoverable(String),

    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

impl DecoderError {
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::Unrecoverable(_))
    }
}

impl From<FrameError> for DecoderError {
    fn from(error: FrameError) -> Self {
        Self::InvalidFrame(error.to_string())
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for DecoderError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Unrecoverable(error.reason)
    }
}

/// Turns a camera frame into zero or more decoded codes
#[uniffi::export(with_foreign)]
pub trait BarcodeDecoder: Send + Sync {
    /// Decode `frame`, reporting only codes of the given symbologies
    fn decode(
        &self,
        frame: Frame,
        symbologies: Vec<Symbology>,
    ) -> Result<Vec<DecodedBarcode>, DecoderError>;
}

/// Restricts a decoder to a set of symbologies
#[derive(Clone)]
pub struct SymbologyFilter {
    decoder: Arc<dyn BarcodeDecoder>,
    allowed: SymbologySet,
}

impl SymbologyFilter {
    pub fn new(decoder: Arc<dyn BarcodeDecoder>, allowed: SymbologySet) -> Self {
        Self { decoder, allowed }
    }

    pub fn allowed(&self) -> SymbologySet {
        self.allowed
    }

    pub fn decode(&self, frame: Frame) -> Result<Vec<DecodedBarcode>, DecoderError> {
        let barcodes = self.decoder.decode(frame, self.allowed.symbologies())?;
        let total = barcodes.len();

        let barcodes: Vec<DecodedBarcode> = barcodes
            .into_iter()
            .filter(|barcode| self.allowed.contains_symbology(barcode.symbology))
            .collect();

        if barcodes.len() != total {
            trace!(dropped = total - barcodes.len(), "dropped codes outside requested symbologies");
        }

        Ok(barcodes)
    }
}

impl std::fmt::Debug for SymbologyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbologyFilter").field("allowed", &self.allowed).finish()
    }
}
