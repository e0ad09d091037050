// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic answer-sheet photos for integration tests: a bright, slightly
// skewed sheet on a dark desk, with filled bubbles drawn through the same
// perspective the camera would apply.

#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::geometric_transformations::Projection;
use imageproc::point::Point;

/// Canonical sheet size the pipeline rectifies to.
pub const SHEET_W: f32 = 550.0;
pub const SHEET_H: f32 = 700.0;

pub struct SheetPhoto {
    pub width: u32,
    pub height: u32,
    /// Sheet corners as fractions of the photo size: TL, TR, BR, BL.
    pub corners: [(f32, f32); 4],
    pub num_questions: u32,
    pub num_options: u32,
    /// One entry per question: the filled option, if any.
    pub marks: Vec<Option<u32>>,
}

impl SheetPhoto {
    /// A 550x700 photo with every question answered `q % num_options`.
    pub fn new(num_questions: u32, num_options: u32) -> Self {
        Self {
            width: 550,
            height: 700,
            corners: [(0.13, 0.09), (0.90, 0.13), (0.86, 0.93), (0.10, 0.89)],
            num_questions,
            num_options,
            marks: (0..num_questions).map(|q| Some(q % num_options)).collect(),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_marks(mut self, marks: Vec<Option<u32>>) -> Self {
        self.marks = marks;
        self
    }

    /// Sheet corners in photo pixels.
    pub fn corner_pixels(&self) -> [(f32, f32); 4] {
        self.corners
            .map(|(fx, fy)| (fx * self.width as f32, fy * self.height as f32))
    }

    /// Expected answers as the pipeline reports them.
    pub fn expected(&self) -> Vec<Option<usize>> {
        self.marks.iter().map(|m| m.map(|o| o as usize)).collect()
    }

    pub fn render(&self) -> GrayImage {
        let mut img = GrayImage::from_pixel(self.width, self.height, Luma([35u8]));

        let corners = self.corner_pixels();
        let polygon: Vec<Point<i32>> = corners
            .iter()
            .map(|&(x, y)| Point::new(x.round() as i32, y.round() as i32))
            .collect();
        draw_polygon_mut(&mut img, &polygon, Luma([235u8]));

        let canonical = [
            (0.0, 0.0),
            (SHEET_W - 1.0, 0.0),
            (SHEET_W - 1.0, SHEET_H - 1.0),
            (0.0, SHEET_H - 1.0),
        ];
        let to_photo = Projection::from_control_points(canonical, corners)
            .expect("sheet corners form a valid quadrilateral");

        let cell_w = SHEET_W / self.num_options as f32;
        let cell_h = SHEET_H / self.num_questions as f32;
        let sheet_radius = cell_w.min(cell_h) * 0.3;

        for (question, mark) in self.marks.iter().enumerate() {
            let Some(option) = mark else { continue };
            let centre = (
                (*option as f32 + 0.5) * cell_w,
                (question as f32 + 0.5) * cell_h,
            );
            let (x, y) = to_photo * centre;
            let (rx, ry) = to_photo * (centre.0 + sheet_radius, centre.1);
            let radius = ((rx - x).hypot(ry - y).round() as i32).max(2);
            draw_filled_circle_mut(
                &mut img,
                (x.round() as i32, y.round() as i32),
                radius,
                Luma([25u8]),
            );
        }

        img
    }

    pub fn png(&self) -> Vec<u8> {
        encode_png(self.render())
    }
}

pub fn encode_png(img: GrayImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("PNG encoding succeeds");
    buf
}

/// A featureless gray photo with nothing to find.
pub fn blank_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(GrayImage::from_pixel(width, height, Luma([128u8])))
}
