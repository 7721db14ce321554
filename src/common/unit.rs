//! Unit conversion utilities.
//!
//! DrawingML measures positions and extents in English Metric Units (EMU),
//! font sizes in hundredths of a point.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_CM: i64 = 360_000;
pub const EMUS_PER_MM: i64 = 36_000;
pub const EMUS_PER_PT: i64 = 12_700;

/// Resolution assumed for images that carry no usable DPI information.
pub const DEFAULT_IMAGE_DPI: u32 = 72;

#[inline]
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMUS_PER_INCH as f64).round() as i64
}

#[inline]
pub fn cm_to_emu(cm: f64) -> i64 {
    (cm * EMUS_PER_CM as f64).round() as i64
}

#[inline]
pub fn mm_to_emu(mm: f64) -> i64 {
    (mm * EMUS_PER_MM as f64).round() as i64
}

#[inline]
pub fn pt_to_emu(pt: f64) -> i64 {
    (pt * EMUS_PER_PT as f64) as i64
}

#[inline]
pub fn emu_to_pt(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_PT as f64
}

#[inline]
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_INCH as f64
}

#[inline]
pub fn px_to_emu(px: u32, dpi: u32) -> i64 {
    let dpi = if dpi == 0 { DEFAULT_IMAGE_DPI } else { dpi };
    ((px as f64) * EMUS_PER_INCH as f64 / dpi as f64) as i64
}

#[inline]
pub fn emu_to_px(emu: i64, dpi: u32) -> u32 {
    ((emu as f64) * dpi as f64 / EMUS_PER_INCH as f64) as u32
}

/// Font size in points to the `sz` attribute value (hundredths of a point).
#[inline]
pub fn pt_to_centipoints(pt: f64) -> i32 {
    (pt * 100.0).round() as i32
}

#[inline]
pub fn centipoints_to_pt(centipoints: i32) -> f64 {
    centipoints as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inch_and_point() {
        assert_eq!(inches_to_emu(1.0), 914_400);
        assert_eq!(inches_to_emu(10.0), 9_144_000);
        assert_eq!(cm_to_emu(2.54), 914_400);
        assert_eq!(pt_to_emu(1.0), 12_700);
        assert_eq!(emu_to_pt(25_400), 2.0);
    }

    #[test]
    fn test_pixels_at_72_dpi() {
        assert_eq!(px_to_emu(1, 72), 12_700);
        assert_eq!(px_to_emu(100, 0), 1_270_000);
        assert_eq!(emu_to_px(914_400, 96), 96);
    }

    #[test]
    fn test_centipoints() {
        assert_eq!(pt_to_centipoints(18.0), 1800);
        assert_eq!(centipoints_to_pt(4400), 44.0);
    }
}
