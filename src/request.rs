use crate::symbology::{ScanType, Symbology, SymbologySet};

/// Layout the host draws on top of the camera preview
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, uniffi::Record)]
pub struct Overlay {
    pub resource_id: i32,
}

impl Overlay {
    /// Host layouts use `-1` for "no overlay"
    pub fn from_resource_id(resource_id: i32) -> Option<Self> {
        (resource_id >= 0).then_some(Self { resource_id })
    }
}

/// A single scan, created per user action and consumed by one scan screen
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, uniffi::Record)]
pub struct ScanRequest {
    pub scan_type: ScanType,
    pub overlay: Option<Overlay>,
}

impl ScanRequest {
    pub fn new(scan_type: ScanType) -> Self {
        Self { scan_type, overlay: None }
    }

    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn symbology_set(&self) -> SymbologySet {
        self.scan_type.symbology_set()
    }

    pub fn symbologies(&self) -> Vec<Symbology> {
        self.symbology_set().symbologies()
    }
}

#[uniffi::export]
fn scan_request_with_overlay_id(scan_type: ScanType, overlay_resource_id: i32) -> ScanRequest {
    ScanRequest { scan_type, overlay: Overlay::from_resource_id(overlay_resource_id) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_resource_id_means_no_overlay() {
        assert_eq!(Overlay::from_resource_id(-1), None);
        assert_eq!(Overlay::from_resource_id(0), Some(Overlay { resource_id: 0 }));

        let request = scan_request_with_overlay_id(ScanType::All, -1);
        assert_eq!(request, ScanRequest::new(ScanType::All));
    }

    #[test]
    fn test_request_symbologies_follow_scan_type() {
        let request = ScanRequest::new(ScanType::Barcode).with_overlay(Overlay { resource_id: 42 });
        assert_eq!(request.symbologies(), vec![Symbology::Code128, Symbology::Ean13]);
        assert_eq!(request.overlay.map(|o| o.resource_id), Some(42));
    }
}
