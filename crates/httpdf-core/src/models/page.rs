use serde::{Deserialize, Serialize};

const MM_PER_INCH: f64 = 25.4;

/// Page dimensions handed to the capture engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageOptions {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageOptions {
    pub fn from_mm(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    /// Width in inches, the unit the browser's print API expects.
    pub fn width_inches(&self) -> f64 {
        self.width_mm / MM_PER_INCH
    }

    pub fn height_inches(&self) -> f64 {
        self.height_mm / MM_PER_INCH
    }
}
