//! QR decoding in Rust
//!
//! Hosts without an ML decoder (desktop, tests, the demo binary) can use
//! [`QrDecoder`], built on `rqrr`. Only QR codes are supported; asking it for
//! linear symbologies alone yields no codes.

use std::sync::Arc;

use tracing::{debug, trace};

use super::{BarcodeDecoder, DecoderError};
use crate::{
    frame::{DecodedBarcode, Frame},
    symbology::Symbology,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }
}

/// The Rust QR decoder as a host facing [`BarcodeDecoder`]
#[uniffi::export]
pub fn qr_decoder() -> Arc<dyn BarcodeDecoder> {
    Arc::new(QrDecoder::new())
}

impl BarcodeDecoder for QrDecoder {
    fn decode(
        &self,
        frame: Frame,
        symbologies: Vec<Symbology>,
    ) -> Result<Vec<DecodedBarcode>, DecoderError> {
        if !symbologies.contains(&Symbology::QrCode) {
            return Ok(vec![]);
        }

        frame.validate()?;

        let start = std::time::Instant::now();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            frame.width as usize,
            frame.height as usize,
            |x, y| frame.luma_at(x, y),
        );

        let grids = prepared.detect_grids();
        trace!(grids = grids.len(), elapsed_ms = start.elapsed().as_millis(), "qr grid detection");

        let barcodes = grids
            .into_iter()
            .filter_map(|grid| match grid.decode() {
                Ok((_meta, content)) => Some(DecodedBarcode::with_value(Symbology::QrCode, content)),
                Err(error) => {
                    debug!("failed to decode qr grid: {error:?}");
                    None
                }
            })
            .collect();

        Ok(barcodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use qrcode::QrCode;

    fn qr_frame(data: &str) -> Frame {
        let image = QrCode::new(data.as_bytes())
            .expect("encode qr")
            .render::<Luma<u8>>()
            .quiet_zone(true)
            .build();

        let (width, height) = image.dimensions();
        Frame::new(width, height, image.into_raw())
    }

    #[test]
    fn test_decodes_generated_qr() {
        let barcodes = QrDecoder::new().decode(qr_frame("ABC123"), vec![Symbology::QrCode]).unwrap();

        assert_eq!(barcodes, vec![DecodedBarcode::with_value(Symbology::QrCode, "ABC123")]);
    }

    #[test]
    fn test_decodes_padded_rows() {
        let frame = qr_frame("PADDED");
        let (width, height) = (frame.width as usize, frame.height as usize);
        let stride = width + 16;

        let mut luma = vec![0; stride * height];
        for (row, pixels) in frame.luma.chunks(width).enumerate() {
            luma[row * stride..row * stride + width].copy_from_slice(pixels);
        }

        let padded = Frame::new(frame.width, frame.height, luma).with_row_stride(stride as u32);
        let barcodes = QrDecoder::new().decode(padded, vec![Symbology::QrCode]).unwrap();

        assert_eq!(barcodes, vec![DecodedBarcode::with_value(Symbology::QrCode, "PADDED")]);
    }

    #[test]
    fn test_blank_frame_has_no_codes() {
        let frame = Frame::new(64, 64, vec![255; 64 * 64]);
        let barcodes = QrDecoder::new().decode(frame, vec![Symbology::QrCode]).unwrap();

        assert!(barcodes.is_empty());
    }

    #[test]
    fn test_linear_only_request_skips_decoding() {
        let barcodes = QrDecoder::new()
            .decode(qr_frame("ABC123"), vec![Symbology::Code128, Symbology::Ean13])
            .unwrap();

        assert!(barcodes.is_empty());
    }

    #[test]
    fn test_short_buffer_is_invalid_frame() {
        let frame = Frame::new(10, 10, vec![0; 10]);
        let error = QrDecoder::new().decode(frame, vec![Symbology::QrCode]).unwrap_err();

        assert!(matches!(error, DecoderError::InvalidFrame(_)));
    }
}
