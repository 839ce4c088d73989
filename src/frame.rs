//! Camera frames handed to the decoder and the barcodes found in them

use scanner_util::result_ext::ResultExt as _;

use crate::symbology::Symbology;

/// An 8-bit greyscale image (the Y plane of a camera frame)
#[derive(Clone, PartialEq, Eq, uniffi::Record)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Bytes from the start of one row to the next, at least `width`
    pub row_stride: u32,
    pub rotation_degrees: u32,
    pub luma: Vec<u8>,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum FrameError {
    #[error("frame has zero width or height")]
    EmptyDimensions,

    #[error("row stride {row_stride} is narrower than the frame width {width}")]
    RowStrideTooSmall { row_stride: u32, width: u32 },

    #[error("frame buffer has {actual} bytes, expected at least {expected}")]
    BufferTooSmall { expected: u64, actual: u64 },
}

impl Frame {
    pub fn new(width: u32, height: u32, luma: Vec<u8>) -> Self {
        Self { width, height, row_stride: width, rotation_degrees: 0, luma, timestamp_ms: 0 }
    }

    /// Camera planes are often padded at the end of each row
    pub fn with_row_stride(mut self, row_stride: u32) -> Self {
        self.row_stride = row_stride;
        self
    }

    pub fn validate(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::EmptyDimensions);
        }

        if self.row_stride < self.width {
            return Err(FrameError::RowStrideTooSmall {
                row_stride: self.row_stride,
                width: self.width,
            });
        }

        // the last row needs no padding
        let expected = self.row_stride as u64 * (self.height as u64 - 1) + self.width as u64;
        let actual = self.luma.len() as u64;
        if actual < expected {
            return Err(FrameError::BufferTooSmall { expected, actual });
        }

        Ok(())
    }

    /// Luma value at `(x, y)`, caller must have validated the frame
    pub(crate) fn luma_at(&self, x: usize, y: usize) -> u8 {
        self.luma[y * self.row_stride as usize + x]
    }
}

// frames are large, keep the buffer out of logs
impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("row_stride", &self.row_stride)
            .field("rotation_degrees", &self.rotation_degrees)
            .field("luma_len", &self.luma.len())
            .field("timestamp_ms", &self.timestamp_ms)
            .finish()
    }
}

/// A code found by the decoder
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct DecodedBarcode {
    pub symbology: Symbology,
    pub raw_value: Option<String>,
    pub raw_bytes: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum InvalidPayload {
    #[error("payload is not valid utf-8: {0}")]
    NotUtf8(String),
}

impl DecodedBarcode {
    pub fn with_value(symbology: Symbology, value: impl Into<String>) -> Self {
        Self { symbology, raw_value: Some(value.into()), raw_bytes: None }
    }

    pub fn with_bytes(symbology: Symbology, bytes: Vec<u8>) -> Self {
        Self { symbology, raw_value: None, raw_bytes: Some(bytes) }
    }

    /// The string payload of this code
    ///
    /// `Ok(None)` means nothing usable was decoded and the code should be skipped.
    pub fn payload(&self) -> Result<Option<String>, InvalidPayload> {
        if let Some(value) = self.raw_value.as_ref().filter(|value| !value.is_empty()) {
            return Ok(Some(value.clone()));
        }

        match &self.raw_bytes {
            Some(bytes) if !bytes.is_empty() => {
                let value = String::from_utf8(bytes.clone()).map_err_str(InvalidPayload::NotUtf8)?;
                Ok(Some(value))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_frame() {
        assert_eq!(Frame::new(0, 10, vec![]).validate(), Err(FrameError::EmptyDimensions));
        assert_eq!(
            Frame::new(4, 4, vec![0; 15]).validate(),
            Err(FrameError::BufferTooSmall { expected: 16, actual: 15 })
        );

        // trailing bytes past the last row are ignored
        assert_eq!(Frame::new(4, 4, vec![0; 20]).validate(), Ok(()));
    }

    #[test]
    fn test_padded_rows() {
        // 3x2 image in rows of 5 bytes, padding filled with 0xee
        let frame = Frame::new(3, 2, vec![1, 2, 3, 0xee, 0xee, 4, 5, 6]).with_row_stride(5);

        assert_eq!(frame.validate(), Ok(()));
        assert_eq!(frame.luma_at(0, 1), 4);
        assert_eq!(frame.luma_at(2, 1), 6);

        assert_eq!(
            Frame::new(3, 2, vec![0; 7]).with_row_stride(5).validate(),
            Err(FrameError::BufferTooSmall { expected: 8, actual: 7 })
        );
        assert_eq!(
            Frame::new(3, 2, vec![0; 6]).with_row_stride(2).validate(),
            Err(FrameError::RowStrideTooSmall { row_stride: 2, width: 3 })
        );
    }

    #[test]
    fn test_debug_hides_buffer() {
        let debug = format!("{:?}", Frame::new(2, 2, vec![7; 4]));
        assert!(debug.contains("luma_len: 4"));
        assert!(!debug.contains("[7, 7"));
    }

    #[test]
    fn test_payload_prefers_raw_value() {
        let barcode = DecodedBarcode {
            symbology: Symbology::QrCode,
            raw_value: Some("ABC123".into()),
            raw_bytes: Some(vec![0xff]),
        };

        assert_eq!(barcode.payload(), Ok(Some("ABC123".to_string())));
    }

    #[test]
    fn test_payload_from_bytes() {
        let barcode = DecodedBarcode::with_bytes(Symbology::Code128, b"4006381333931".to_vec());
        assert_eq!(barcode.payload(), Ok(Some("4006381333931".to_string())));

        let invalid = DecodedBarcode::with_bytes(Symbology::QrCode, vec![0xc3, 0x28]);
        assert!(matches!(invalid.payload(), Err(InvalidPayload::NotUtf8(_))));
    }

    #[test]
    fn test_empty_payload_is_skipped() {
        let empty = DecodedBarcode {
            symbology: Symbology::QrCode,
            raw_value: Some(String::new()),
            raw_bytes: None,
        };

        assert_eq!(empty.payload(), Ok(None));
        assert_eq!(DecodedBarcode::with_bytes(Symbology::Ean13, vec![]).payload(), Ok(None));
    }
}
