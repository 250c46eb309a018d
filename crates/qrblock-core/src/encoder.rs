use crate::config::{check_qr_geometry, QrConfig};
use crate::error::{CoreError, CoreResult};
use image::{GrayImage, ImageFormat, Luma};
use qrcodegen::{QrCode, QrCodeEcc};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Turns a text payload into PNG bytes.
pub trait QrEncoder: Send + Sync {
    fn encode(&self, text: &str) -> CoreResult<Vec<u8>>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCorrection {
    #[default]
    Low,
    Medium,
    Quartile,
    High,
}

impl From<ErrorCorrection> for QrCodeEcc {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::Low => QrCodeEcc::Low,
            ErrorCorrection::Medium => QrCodeEcc::Medium,
            ErrorCorrection::Quartile => QrCodeEcc::Quartile,
            ErrorCorrection::High => QrCodeEcc::High,
        }
    }
}

/// Grayscale PNG encoder backed by `qrcodegen`.
#[derive(Debug, Clone)]
pub struct PngQrEncoder {
    ecc: ErrorCorrection,
    module_px: u32,
    border: u32,
}

impl Default for PngQrEncoder {
    fn default() -> Self {
        let cfg = QrConfig::default();
        Self {
            ecc: cfg.error_correction,
            module_px: cfg.module_px,
            border: cfg.border,
        }
    }
}

impl PngQrEncoder {
    pub fn new(ecc: ErrorCorrection, module_px: u32, border: u32) -> CoreResult<Self> {
        check_qr_geometry(module_px, border)?;
        Ok(Self {
            ecc,
            module_px,
            border,
        })
    }

    pub fn from_config(cfg: &QrConfig) -> CoreResult<Self> {
        Self::new(cfg.error_correction, cfg.module_px, cfg.border)
    }

    pub fn symbol(&self, text: &str) -> CoreResult<QrCode> {
        if text.trim().is_empty() {
            return Err(CoreError::Encode("empty payload".to_string()));
        }
        QrCode::encode_text(text, self.ecc.into()).map_err(|e| CoreError::Encode(e.to_string()))
    }

    pub fn render(&self, text: &str) -> CoreResult<GrayImage> {
        let qr = self.symbol(text)?;
        self.rasterize(&qr)
    }

    fn rasterize(&self, qr: &QrCode) -> CoreResult<GrayImage> {
        let too_large = || CoreError::Config("qr image dimensions overflow".to_string());
        let side = self
            .border
            .checked_mul(2)
            .and_then(|quiet| quiet.checked_add(qr.size() as u32))
            .and_then(|modules| modules.checked_mul(self.module_px))
            .ok_or_else(too_large)?;
        let border = i32::try_from(self.border).map_err(|_| too_large())?;
        let module_px = self.module_px;
        // get_module reports light for coordinates outside the symbol, which
        // covers the quiet zone.
        Ok(GrayImage::from_fn(side, side, |x, y| {
            let mx = (x / module_px) as i32 - border;
            let my = (y / module_px) as i32 - border;
            if qr.get_module(mx, my) {
                DARK
            } else {
                LIGHT
            }
        }))
    }
}

impl QrEncoder for PngQrEncoder {
    fn encode(&self, text: &str) -> CoreResult<Vec<u8>> {
        let img = self.render(text)?;
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}
