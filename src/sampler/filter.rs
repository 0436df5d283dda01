// filter.rs - Mode-specific pre-filters
//
// Both filters work in integer space so a mid-grey of exactly 128 stays
// exactly 128 (or 127 once inverted). Alpha is passed through untouched.

use image::{Pixel, Rgba, RgbaImage};

/// Contrast gain applied around mid-grey in floorplan mode
const CONTRAST_GAIN: i32 = 3;
const MID_GREY: i32 = 128;

/// Floorplan: grayscale + contrast stretch, pushing lines toward black/white
pub fn high_contrast(src: &RgbaImage, invert: bool) -> RgbaImage {
    RgbaImage::from_fn(src.width(), src.height(), |x, y| {
        let p = src.get_pixel(x, y);
        let luma = p.to_luma()[0] as i32;
        let v = ((luma - MID_GREY) * CONTRAST_GAIN + MID_GREY).clamp(0, 255) as u8;
        let v = if invert { 255 - v } else { v };
        Rgba([v, v, v, p[3]])
    })
}

/// Heightmap: 3x3 box blur with clamped edges, keeping gradients smooth
pub fn soften(src: &RgbaImage, invert: bool) -> RgbaImage {
    let (w, h) = (src.width() as i64, src.height() as i64);

    RgbaImage::from_fn(src.width(), src.height(), |x, y| {
        let mut sum = [0u32; 3];
        for dy in -1..=1 {
            for dx in -1..=1 {
                let sx = (x as i64 + dx).clamp(0, w - 1) as u32;
                let sy = (y as i64 + dy).clamp(0, h - 1) as u32;
                let s = src.get_pixel(sx, sy);
                for c in 0..3 {
                    sum[c] += s[c] as u32;
                }
            }
        }

        let mut out = [0u8; 4];
        for c in 0..3 {
            let v = ((sum[c] + 4) / 9) as u8;
            out[c] = if invert { 255 - v } else { v };
        }
        out[3] = src.get_pixel(x, y)[3];
        Rgba(out)
    })
}
