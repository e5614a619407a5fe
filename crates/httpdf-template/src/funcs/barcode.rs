use std::collections::HashMap;
use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{GrayImage, ImageFormat, Luma};
use qrcode::types::Color;
use qrcode::{EcLevel, QrCode};
use tera::{Function, Value};

use super::required_string_arg;
use crate::error::TemplateError;

/// Edge length used when the requested size is zero or negative.
pub const DEFAULT_QR_SIZE: u32 = 256;
/// Largest edge length accepted; bigger requests fail the render.
pub const MAX_QR_SIZE: u32 = 4096;
/// Light border around the symbol, in modules.
const QUIET_ZONE: usize = 4;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Encode `data` as a `size`×`size` PNG QR code and return it as a data URL.
pub fn qr_code_data_url(size: i64, data: &str) -> Result<String, TemplateError> {
    let size = match u32::try_from(size) {
        _ if size <= 0 => DEFAULT_QR_SIZE,
        Ok(size) if size <= MAX_QR_SIZE => size,
        _ => {
            return Err(TemplateError::QrCode(format!(
                "size {size} exceeds the maximum of {MAX_QR_SIZE} pixels"
            )));
        }
    };

    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| TemplateError::QrCode(e.to_string()))?;
    let image = rasterize(&code, size);

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| TemplateError::QrCode(e.to_string()))?;

    Ok(format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(&png)))
}

/// Nearest-neighbour scale of the module grid (plus quiet zone) to `size`.
fn rasterize(code: &QrCode, size: u32) -> GrayImage {
    let width = code.width();
    let colors = code.to_colors();
    let total = width + 2 * QUIET_ZONE;
    let module_at = |pixel: u32| pixel as usize * total / size as usize;

    GrayImage::from_fn(size, size, |x, y| {
        let (mx, my) = (module_at(x), module_at(y));
        let inside = (QUIET_ZONE..QUIET_ZONE + width).contains(&mx)
            && (QUIET_ZONE..QUIET_ZONE + width).contains(&my);
        let dark = inside && colors[(my - QUIET_ZONE) * width + (mx - QUIET_ZONE)] == Color::Dark;
        Luma([if dark { 0 } else { 255 }])
    })
}

/// `qrCode(size=128, data="...")`.
pub struct QrCodeFn;

impl Function for QrCodeFn {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let data = required_string_arg(args, "qrCode", "data")?;
        let size = args.get("size").and_then(Value::as_i64).unwrap_or(0);
        qr_code_data_url(size, data)
            .map(Value::String)
            .map_err(|e| tera::Error::msg(e.to_string()))
    }

    fn is_safe(&self) -> bool {
        true
    }
}
