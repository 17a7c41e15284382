// Intensity grids: decode an image file into a pixel array and collapse it
// into a single channel (rows = depth/time, columns = distance).

use image::DynamicImage;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::ImageLoadError;

/// Luminance weights applied to R, G and B.
pub const LUMINANCE_WEIGHTS: [f64; 3] = [0.2989, 0.5870, 0.1140];

/// Decoded image samples in row-major `height x width x channels` order,
/// scaled to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelArray {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<f64>,
}

impl PixelArray {
    pub fn new(
        height: usize,
        width: usize,
        channels: usize,
        data: Vec<f64>,
    ) -> Result<Self, ImageLoadError> {
        let expected = height * width * channels;
        if data.len() != expected {
            return Err(ImageLoadError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(PixelArray {
            height,
            width,
            channels,
            data,
        })
    }

    /// Keep the decoder's channel layout: gray, gray+alpha, RGB or RGBA.
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let (width, height) = (img.width() as usize, img.height() as usize);
        let (channels, samples): (usize, Vec<f32>) = match img.color().channel_count() {
            1 => (1, img.to_luma32f().into_raw()),
            2 => (2, img.to_luma_alpha32f().into_raw()),
            3 => (3, img.to_rgb32f().into_raw()),
            _ => (4, img.to_rgba32f().into_raw()),
        };
        PixelArray {
            height,
            width,
            channels,
            data: samples.into_iter().map(f64::from).collect(),
        }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }
}

/// A 2-D grid of intensity values in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityGrid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl IntensityGrid {
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self, ImageLoadError> {
        if values.len() != rows * cols {
            return Err(ImageLoadError::ShapeMismatch {
                expected: rows * cols,
                actual: values.len(),
            });
        }
        Ok(IntensityGrid { rows, cols, values })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            self.values.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Smallest and largest value, or `None` for an empty grid.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Collapse a pixel array to one intensity channel. Alpha is dropped, colour
/// is mixed with `LUMINANCE_WEIGHTS`, and gray passes through unchanged.
pub fn to_intensity(pixels: PixelArray) -> Result<IntensityGrid, ImageLoadError> {
    let PixelArray {
        height,
        width,
        channels,
        data,
    } = pixels;

    let values = match channels {
        1 => data,
        2 => data.chunks_exact(2).map(|px| px[0]).collect(),
        3 | 4 => data
            .chunks_exact(channels)
            .map(|px| {
                px[..3]
                    .iter()
                    .zip(LUMINANCE_WEIGHTS.iter())
                    .map(|(v, w)| v * w)
                    .sum::<f64>()
            })
            .collect(),
        n => return Err(ImageLoadError::UnsupportedChannels(n)),
    };
    IntensityGrid::new(height, width, values)
}

/// `(height, width, channels)` of a decoded image.
pub type Shape = (usize, usize, usize);

/// Decode `path` into an intensity grid without printing anything. Also
/// returns the shape of the decoded pixels before conversion.
pub fn decode_intensity_grid(path: &Path) -> Result<(Shape, IntensityGrid), ImageLoadError> {
    if !path.exists() {
        return Err(ImageLoadError::NotFound(path.to_path_buf()));
    }
    let img = image::open(path)?;
    let pixels = PixelArray::from_dynamic(&img);
    let shape = pixels.shape();
    let grid = to_intensity(pixels)?;
    Ok((shape, grid))
}

/// Load `path`, reporting progress and failures to `out`. Returns `None`
/// ("no data") on any failure.
pub fn load_intensity_grid<W: Write>(
    path: &Path,
    out: &mut W,
) -> std::io::Result<Option<IntensityGrid>> {
    match decode_intensity_grid(path) {
        Ok(((h, w, c), grid)) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            writeln!(out, "Image loaded successfully from: {}", name)?;
            if c == 1 {
                writeln!(out, "Shape of the original data: ({}, {})", h, w)?;
            } else {
                writeln!(out, "Shape of the original data: ({}, {}, {})", h, w, c)?;
                writeln!(out, "Converted image to Grayscale (2D array) for processing.")?;
            }
            debug!(rows = grid.rows(), cols = grid.cols(), "intensity grid ready");
            Ok(Some(grid))
        }
        Err(ImageLoadError::NotFound(p)) => {
            writeln!(out, "Error: File not found at path: {}", p.display())?;
            Ok(None)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "image load failed");
            writeln!(out, "Error: An error occurred while reading the file: {}", e)?;
            Ok(None)
        }
    }
}
