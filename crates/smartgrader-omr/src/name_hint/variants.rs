// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Header preprocessing variants tried, in rank order, before text
// recognition: plain grayscale, contrast boost, Otsu binarization, and
// adaptive local-mean binarization.

use image::{GrayImage, Luma, imageops};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::integral_image::{integral_image, sum_image_pixels};

/// One way of preparing the header crop for text recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderVariant {
    /// The crop as photographed.
    Grayscale,
    /// Contrast stretched around mid-gray (factor 1.4).
    Contrast,
    /// Global binarization at the Otsu threshold.
    Otsu,
    /// Local-mean binarization (radius 15, offset 10), for uneven lighting.
    Adaptive,
}

impl HeaderVariant {
    /// Variants in the order they are tried.
    pub const RANKED: [HeaderVariant; 4] = [
        HeaderVariant::Grayscale,
        HeaderVariant::Contrast,
        HeaderVariant::Otsu,
        HeaderVariant::Adaptive,
    ];

    pub fn apply(self, header: &GrayImage) -> GrayImage {
        match self {
            Self::Grayscale => header.clone(),
            Self::Contrast => imageops::contrast(header, CONTRAST_PERCENT),
            Self::Otsu => threshold(header, otsu_level(header), ThresholdType::Binary),
            Self::Adaptive => binarize_adaptive(header, 15, 10),
        }
    }
}

/// `imageops::contrast` scales by `((100 + c) / 100)^2`; this gives 1.4.
const CONTRAST_PERCENT: f32 = 18.32;

/// Pixels darker than their neighbourhood mean minus `offset` become black.
fn binarize_adaptive(gray: &GrayImage, block_radius: u32, offset: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }
    let integral = integral_image::<_, u32>(gray);

    GrayImage::from_fn(width, height, |x, y| {
        let (left, top) = (x.saturating_sub(block_radius), y.saturating_sub(block_radius));
        let right = (x + block_radius).min(width - 1);
        let bottom = (y + block_radius).min(height - 1);
        let area = (right - left + 1) * (bottom - top + 1);
        let [sum] = sum_image_pixels(&integral, left, top, right, bottom);

        let cutoff = (sum / area).saturating_sub(offset);
        Luma([if u32::from(gray.get_pixel(x, y)[0]) < cutoff { 0 } else { 255 }])
    })
}
