// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessor: decode, resize to the working resolution, grayscale, blur,
// and Canny edge detection. Operates on in-memory images using the `image`
// and `imageproc` crates.

use image::DynamicImage;
use image::GrayImage;
use image::imageops::FilterType;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use smartgrader_core::OmrConfig;
use smartgrader_core::error::{OmrError, Result};
use tracing::{debug, info, instrument};

/// The two views of a photo that later stages consume.
///
/// Both share the working resolution. `gray` is unblurred so the rectified
/// sheet keeps its full detail; `edges` is the binary Canny map used only to
/// find the sheet boundary.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub gray: GrayImage,
    pub edges: GrayImage,
}

/// Maps encoded photo bytes to a [`PreparedImage`] at a fixed resolution.
///
/// Resizing happens before edge detection so contour areas and grid
/// arithmetic are measured on the same scale for every photo, whatever
/// camera took it.
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    width: u32,
    height: u32,
    blur_sigma: f32,
    canny_low: f32,
    canny_high: f32,
}

impl Preprocessor {
    // -- Construction ---------------------------------------------------------

    pub fn new(config: &OmrConfig) -> Self {
        Self {
            width: config.working_width,
            height: config.working_height,
            blur_sigma: config.blur_sigma,
            canny_low: config.canny_low,
            canny_high: config.canny_high,
        }
    }

    /// Working resolution every photo is resized to.
    pub fn working_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    // -- Pipeline -------------------------------------------------------------

    /// Decode raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub fn decode(&self, data: &[u8]) -> Result<DynamicImage> {
        let img = image::load_from_memory(data)
            .map_err(|err| OmrError::Decode(format!("failed to decode image: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(img)
    }

    /// Decode and prepare in one step.
    pub fn prepare(&self, data: &[u8]) -> Result<PreparedImage> {
        let decoded = self.decode(data)?;
        Ok(self.prepare_decoded(&decoded))
    }

    /// Resize, convert to luma, blur, and edge-detect an already-decoded photo.
    #[instrument(skip_all, fields(from_w = image.width(), from_h = image.height()))]
    pub fn prepare_decoded(&self, image: &DynamicImage) -> PreparedImage {
        info!(
            to_w = self.width,
            to_h = self.height,
            "Preparing photo at working resolution"
        );

        let gray = image
            .resize_exact(self.width, self.height, FilterType::Triangle)
            .to_luma8();

        let blurred = gaussian_blur_f32(&gray, self.blur_sigma);
        let edges = canny(&blurred, self.canny_low, self.canny_high);

        debug!(
            edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count(),
            sigma = self.blur_sigma,
            low = self.canny_low,
            high = self.canny_high,
            "Edge map computed"
        );

        PreparedImage { gray, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, image::ImageFormat::Png)
            .expect("PNG encoding");
        buffer.into_inner()
    }

    #[test]
    fn garbage_bytes_are_decode_error() {
        let pre = Preprocessor::new(&OmrConfig::default());
        let result = pre.prepare(b"definitely not an image");
        assert!(matches!(result, Err(OmrError::Decode(_))));
    }

    #[test]
    fn any_input_size_lands_on_working_resolution() {
        let pre = Preprocessor::new(&OmrConfig::default());
        let photo = DynamicImage::ImageRgb8(RgbImage::from_pixel(1200, 900, Rgb([90, 120, 200])));
        let prepared = pre.prepare(&png_bytes(photo)).expect("valid PNG");
        assert_eq!(prepared.gray.dimensions(), (550, 700));
        assert_eq!(prepared.edges.dimensions(), (550, 700));
    }

    #[test]
    fn uniform_photo_has_no_edges() {
        let pre = Preprocessor::new(&OmrConfig::default());
        let photo = DynamicImage::ImageLuma8(GrayImage::from_pixel(300, 400, Luma([180u8])));
        let prepared = pre.prepare_decoded(&photo);
        assert!(prepared.edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn step_edge_is_detected() {
        let pre = Preprocessor::new(&OmrConfig::default());
        let mut img = GrayImage::from_pixel(550, 700, Luma([30u8]));
        for y in 0..700 {
            for x in 275..550 {
                img.put_pixel(x, y, Luma([230u8]));
            }
        }
        let prepared = pre.prepare_decoded(&DynamicImage::ImageLuma8(img));
        let edge_cols: Vec<u32> = (0..550)
            .filter(|&x| prepared.edges.get_pixel(x, 350).0[0] > 0)
            .collect();
        assert!(!edge_cols.is_empty(), "expected an edge along the step");
        assert!(edge_cols.iter().all(|&x| (270..=280).contains(&x)));
    }

    #[test]
    fn custom_working_resolution_is_honoured() {
        let config = OmrConfig {
            working_width: 275,
            working_height: 350,
            ..OmrConfig::default()
        };
        let pre = Preprocessor::new(&config);
        assert_eq!(pre.working_size(), (275, 350));
        let photo = DynamicImage::ImageLuma8(GrayImage::from_pixel(550, 700, Luma([10u8])));
        assert_eq!(pre.prepare_decoded(&photo).gray.dimensions(), (275, 350));
    }
}
