//! Image to ESC/POS raster conversion
//!
//! Pipeline: grayscale -> resize to the printable width -> optional
//! Floyd-Steinberg dithering -> 1-bit threshold -> GS v 0 raster (or the
//! ESC * column fallback for printers without GS v support).

use image::{DynamicImage, GrayImage, imageops::FilterType};
use serde::Deserialize;
use tracing::instrument;

use crate::command::Align;
use crate::error::{EscposError, EscposResult};

/// Raster encoding selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterMode {
    /// GS v 0 raster bitmap (the reliable path on modern printers)
    #[default]
    Gsv0,
    /// ESC * 24-dot double-density column format
    Column,
}

/// Options controlling raster conversion
#[derive(Debug, Clone, Copy)]
pub struct RasterOptions {
    /// Maximum width in dots; wider images are scaled down, aspect preserved.
    /// 576 covers 80mm stock, 384 covers 58mm.
    pub max_width: u32,
    /// Horizontal alignment of the printed image
    pub align: Align,
    /// Floyd-Steinberg dithering to simulate grayscale
    pub dither: bool,
    /// Swap black and white
    pub invert: bool,
    /// Encoding variant
    pub mode: RasterMode,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            max_width: 576,
            align: Align::Center,
            dither: true,
            invert: false,
            mode: RasterMode::Gsv0,
        }
    }
}

/// A rendered raster job: the ESC/POS bytes plus the final pixel size
#[derive(Debug, Clone)]
pub struct Raster {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Convert an image to an ESC/POS raster sequence
///
/// The output carries its own alignment command and resets alignment to
/// left afterwards, so it can be embedded in a larger job.
#[instrument(skip(img), fields(dimensions = ?(img.width(), img.height())))]
pub fn render(img: &DynamicImage, opts: &RasterOptions) -> EscposResult<Raster> {
    if opts.max_width == 0 {
        return Err(EscposError::InvalidImage("max_width must be positive".into()));
    }

    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return Err(EscposError::InvalidImage("image has zero dimensions".into()));
    }

    // Scale down to the printable width, preserving aspect ratio
    let gray = if w > opts.max_width {
        let new_h = ((h as u64 * opts.max_width as u64) / w as u64).max(1) as u32;
        image::imageops::resize(&gray, opts.max_width, new_h, FilterType::Lanczos3)
    } else {
        gray
    };
    let (w, h) = gray.dimensions();

    if w.div_ceil(8) > u16::MAX as u32 || h > u16::MAX as u32 {
        return Err(EscposError::InvalidImage(format!(
            "image too large for raster encoding: {}x{}",
            w, h
        )));
    }

    let mut black = if opts.dither {
        floyd_steinberg(&gray)
    } else {
        gray.pixels().map(|p| p.0[0] < 128).collect()
    };
    if opts.invert {
        for b in black.iter_mut() {
            *b = !*b;
        }
    }

    let mut data = Vec::with_capacity((w as usize / 8 + 1) * h as usize + 16);
    data.extend_from_slice(&opts.align.command());
    match opts.mode {
        RasterMode::Gsv0 => encode_gsv0(&mut data, &black, w, h),
        RasterMode::Column => encode_column(&mut data, &black, w, h),
    }
    data.extend_from_slice(&Align::Left.command());
    data.push(b'\n');

    Ok(Raster {
        data,
        width: w,
        height: h,
    })
}

/// Floyd-Steinberg error diffusion, returning per-pixel black flags
///
/// Error weights 7/16 right, 3/16 below-left, 5/16 below, 1/16 below-right.
fn floyd_steinberg(img: &GrayImage) -> Vec<bool> {
    let (w, h) = img.dimensions();
    let (w, h) = (w as usize, h as usize);
    let mut buf: Vec<f32> = img.pixels().map(|p| p.0[0] as f32).collect();
    let mut black = vec![false; w * h];

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let old = buf[i];
            let new = if old > 128.0 { 255.0 } else { 0.0 };
            black[i] = new == 0.0;
            let err = old - new;

            if x + 1 < w {
                buf[i + 1] += err * 7.0 / 16.0;
            }
            if y + 1 < h {
                if x > 0 {
                    buf[i + w - 1] += err * 3.0 / 16.0;
                }
                buf[i + w] += err * 5.0 / 16.0;
                if x + 1 < w {
                    buf[i + w + 1] += err * 1.0 / 16.0;
                }
            }
        }
    }
    black
}

/// GS v 0 m xL xH yL yH d1..dk - raster bitmap, one bit per pixel, MSB first
fn encode_gsv0(out: &mut Vec<u8>, black: &[bool], w: u32, h: u32) {
    let bytes_per_line = w.div_ceil(8) as usize;

    out.extend_from_slice(&[0x1D, 0x76, 0x30, 0x00]);
    out.push((bytes_per_line & 0xFF) as u8);
    out.push((bytes_per_line >> 8) as u8);
    out.push((h & 0xFF) as u8);
    out.push((h >> 8) as u8);

    for y in 0..h as usize {
        let row = &black[y * w as usize..(y + 1) * w as usize];
        for xb in 0..bytes_per_line {
            let mut byte = 0u8;
            for bit in 0..8 {
                let x = xb * 8 + bit;
                if x < w as usize && row[x] {
                    byte |= 0x80 >> bit;
                }
            }
            out.push(byte);
        }
    }
}

/// ESC * 33 - 24-dot double-density column format, banded in 24-row strips
///
/// Line spacing is pinned to 24 dots (ESC 3 24) for the duration so bands
/// join without gaps, then restored to the default (ESC 2).
fn encode_column(out: &mut Vec<u8>, black: &[bool], w: u32, h: u32) {
    let (w, h) = (w as usize, h as usize);

    out.extend_from_slice(&[0x1B, 0x33, 24]);

    let mut y0 = 0;
    while y0 < h {
        out.extend_from_slice(&[0x1B, 0x2A, 33]);
        out.push((w & 0xFF) as u8);
        out.push((w >> 8) as u8);

        for x in 0..w {
            for k in 0..3 {
                let mut byte = 0u8;
                for j in 0..8 {
                    let y = y0 + k * 8 + j;
                    if y < h && black[y * w + x] {
                        byte |= 0x80 >> j;
                    }
                }
                out.push(byte);
            }
        }
        out.push(b'\n');
        y0 += 24;
    }

    out.extend_from_slice(&[0x1B, 0x32]);
}
