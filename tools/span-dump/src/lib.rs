// Scene rendering and image comparison for span-raster.
//
// Provides an 8-bit gray image, PGM I/O and pixel comparison.

use std::fs::File;
use std::io::{self, Read as IoRead, Write as IoWrite};
use std::path::Path;

use span_raster::PixelSurface;

/// Gray level of untouched pixels.
pub const PAPER: u8 = 255;
/// Gray level of foreground pixels.
pub const INK: u8 = 0;
/// Gray level of background-pen pixels.
pub const SHADE: u8 = 128;

// ============================================================================
// Gray image
// ============================================================================

/// An 8-bit gray image, row-major, top-to-bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![PAPER; (width * height) as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.data[(y * self.width + x) as usize]
    }

    /// Convert a surface painted with foreground 1 and background 2.
    pub fn from_surface(surface: &PixelSurface) -> Self {
        let data = surface
            .data()
            .iter()
            .map(|&p| match p {
                0 => PAPER,
                1 => INK,
                _ => SHADE,
            })
            .collect();
        Self {
            width: surface.width(),
            height: surface.height(),
            data,
        }
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// Result of comparing two images.
#[derive(Debug, Clone)]
pub struct CompareResult {
    pub identical: bool,
    pub total_pixels: u64,
    pub different_pixels: u64,
    /// The first differing pixel, scanning left-to-right, top-to-bottom.
    pub first_diff: Option<(u32, u32)>,
}

impl std::fmt::Display for CompareResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.identical {
            return write!(f, "IDENTICAL: {} pixels match", self.total_pixels);
        }
        write!(
            f,
            "DIFFERENT: {}/{} pixels differ ({:.2}%)",
            self.different_pixels,
            self.total_pixels,
            self.different_pixels as f64 / self.total_pixels as f64 * 100.0,
        )?;
        if let Some((x, y)) = self.first_diff {
            write!(f, "\n  First diff at ({}, {})", x, y)?;
        }
        Ok(())
    }
}

/// Compare two images pixel by pixel. Images of different sizes never match.
pub fn compare_images(a: &GrayImage, b: &GrayImage) -> CompareResult {
    let total_pixels = a.width as u64 * a.height as u64;
    if a.width != b.width || a.height != b.height {
        return CompareResult {
            identical: false,
            total_pixels,
            different_pixels: total_pixels,
            first_diff: None,
        };
    }
    let mut different_pixels = 0;
    let mut first_diff = None;
    for (i, (pa, pb)) in a.data.iter().zip(&b.data).enumerate() {
        if pa != pb {
            different_pixels += 1;
            if first_diff.is_none() {
                first_diff = Some((i as u32 % a.width, i as u32 / a.width));
            }
        }
    }
    CompareResult {
        identical: different_pixels == 0,
        total_pixels,
        different_pixels,
        first_diff,
    }
}

/// Differing pixels in black on white.
pub fn generate_diff_image(a: &GrayImage, b: &GrayImage) -> GrayImage {
    let mut diff = GrayImage::new(a.width, a.height);
    for (d, (pa, pb)) in diff.data.iter_mut().zip(a.data.iter().zip(&b.data)) {
        if pa != pb {
            *d = INK;
        }
    }
    diff
}

// ============================================================================
// PGM I/O (binary, maxval 255)
// ============================================================================

pub fn save_pgm(path: &Path, img: &GrayImage) -> io::Result<()> {
    let mut f = File::create(path)?;
    write!(f, "P5\n{} {}\n255\n", img.width, img.height)?;
    f.write_all(&img.data)?;
    Ok(())
}

/// Read the next whitespace-separated header token, skipping comments.
fn next_token(data: &[u8], pos: &mut usize) -> io::Result<u32> {
    while *pos < data.len() {
        match data[*pos] {
            b'#' => {
                while *pos < data.len() && data[*pos] != b'\n' {
                    *pos += 1;
                }
            }
            c if c.is_ascii_whitespace() => *pos += 1,
            _ => break,
        }
    }
    let start = *pos;
    while *pos < data.len() && data[*pos].is_ascii_digit() {
        *pos += 1;
    }
    std::str::from_utf8(&data[start..*pos])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "Bad PGM header"))
}

pub fn load_pgm(path: &Path) -> io::Result<GrayImage> {
    let mut data = Vec::new();
    File::open(path)?.read_to_end(&mut data)?;
    if data.len() < 2 || &data[0..2] != b"P5" {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "Not a binary PGM file"));
    }
    let mut pos = 2;
    let width = next_token(&data, &mut pos)?;
    let height = next_token(&data, &mut pos)?;
    let maxval = next_token(&data, &mut pos)?;
    if maxval != 255 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "Only maxval 255 is supported"));
    }
    // Exactly one whitespace byte separates the header from the raster
    pos += 1;
    let expected = (width * height) as usize;
    if data.len() < pos + expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("PGM too small: expected {} bytes, got {}", expected, data.len() - pos.min(data.len())),
        ));
    }
    Ok(GrayImage {
        width,
        height,
        data: data[pos..pos + expected].to_vec(),
    })
}

// ============================================================================
// Scene rendering (re-exported from render module)
// ============================================================================

pub mod render;
