//! Barcode symbologies and the scan types that select them

use bitflags::bitflags;
use derive_more::Display;
use strum::{EnumIter, IntoEnumIterator as _};

/// A barcode encoding standard
#[derive(
    Debug,
    Copy,
    Clone,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Display,
    EnumIter,
    uniffi::Enum,
)]
pub enum Symbology {
    QrCode,
    Code128,
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Code39,
    Code93,
    Codabar,
    Itf,
    DataMatrix,
    Pdf417,
    Aztec,
}

/// Which family of codes a scan should accept
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default, Display, uniffi::Enum)]
pub enum ScanType {
    /// QR codes only
    #[default]
    Qr,
    /// Linear (1D) barcodes only
    Barcode,
    /// QR codes and linear barcodes
    All,
}

bitflags! {
    /// Set of symbologies a decoder is allowed to report
    #[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
    pub struct SymbologySet: u16 {
        const QR_CODE = 1 << 0;
        const CODE_128 = 1 << 1;
        const EAN_13 = 1 << 2;
        const EAN_8 = 1 << 3;
        const UPC_A = 1 << 4;
        const UPC_E = 1 << 5;
        const CODE_39 = 1 << 6;
        const CODE_93 = 1 << 7;
        const CODABAR = 1 << 8;
        const ITF = 1 << 9;
        const DATA_MATRIX = 1 << 10;
        const PDF_417 = 1 << 11;
        const AZTEC = 1 << 12;
    }
}

impl Symbology {
    pub const fn flag(self) -> SymbologySet {
        match self {
            Self::QrCode => SymbologySet::QR_CODE,
            Self::Code128 => SymbologySet::CODE_128,
            Self::Ean13 => SymbologySet::EAN_13,
            Self::Ean8 => SymbologySet::EAN_8,
            Self::UpcA => SymbologySet::UPC_A,
            Self::UpcE => SymbologySet::UPC_E,
            Self::Code39 => SymbologySet::CODE_39,
            Self::Code93 => SymbologySet::CODE_93,
            Self::Codabar => SymbologySet::CODABAR,
            Self::Itf => SymbologySet::ITF,
            Self::DataMatrix => SymbologySet::DATA_MATRIX,
            Self::Pdf417 => SymbologySet::PDF_417,
            Self::Aztec => SymbologySet::AZTEC,
        }
    }

    /// 1D codes, read along a single scan line
    pub const fn is_linear(self) -> bool {
        matches!(
            self,
            Self::Code128
                | Self::Ean13
                | Self::Ean8
                | Self::UpcA
                | Self::UpcE
                | Self::Code39
                | Self::Code93
                | Self::Codabar
                | Self::Itf
        )
    }
}

impl ScanType {
    pub const fn symbology_set(self) -> SymbologySet {
        match self {
            Self::Qr => SymbologySet::QR_CODE,
            Self::Barcode => SymbologySet::CODE_128.union(SymbologySet::EAN_13),
            Self::All => SymbologySet::QR_CODE
                .union(SymbologySet::CODE_128)
                .union(SymbologySet::EAN_13),
        }
    }

    /// Symbologies the decoder is configured with for this scan type
    pub fn symbologies(self) -> Vec<Symbology> {
        self.symbology_set().symbologies()
    }
}

#[uniffi::export]
fn scan_type_symbologies(scan_type: ScanType) -> Vec<Symbology> {
    scan_type.symbologies()
}

impl SymbologySet {
    pub fn contains_symbology(self, symbology: Symbology) -> bool {
        self.contains(symbology.flag())
    }

    /// Symbologies in declaration order
    pub fn symbologies(self) -> Vec<Symbology> {
        Symbology::iter().filter(|symbology| self.contains_symbology(*symbology)).collect()
    }
}

impl From<Symbology> for SymbologySet {
    fn from(symbology: Symbology) -> Self {
        symbology.flag()
    }
}

impl FromIterator<Symbology> for SymbologySet {
    fn from_iter<I: IntoIterator<Item = Symbology>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, symbology| set | symbology.flag())
    }
}
