// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Answer-sheet location: contour extraction, quadrilateral selection,
// corner ordering, and perspective rectification to the canonical sheet size.

use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use imageproc::geometry::{arc_length, contour_area};
use imageproc::point::Point;
use serde::Serialize;
use smartgrader_core::OmrConfig;
use smartgrader_core::error::{OmrError, Result};
use tracing::{debug, info, instrument, warn};

/// A 2-D point in working-image pixel coordinates.
pub type Point2 = (f32, f32);

/// Four corners of the detected sheet, in rotational order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quadrilateral {
    pub top_left: Point2,
    pub top_right: Point2,
    pub bottom_right: Point2,
    pub bottom_left: Point2,
}

impl Quadrilateral {
    /// Order four arbitrary vertices.
    ///
    /// Top-left has the smallest `x + y`, bottom-right the largest. Top-right
    /// has the smallest `y - x`, bottom-left the largest. The ranking holds
    /// for any sheet rotated by less than 45 degrees. Ties keep the first
    /// vertex seen.
    pub fn from_unordered(points: [Point2; 4]) -> Self {
        let sum = |p: &Point2| p.0 + p.1;
        let diff = |p: &Point2| p.1 - p.0;
        Self {
            top_left: extreme(&points, sum, false),
            top_right: extreme(&points, diff, false),
            bottom_right: extreme(&points, sum, true),
            bottom_left: extreme(&points, diff, true),
        }
    }

    /// `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn corners(&self) -> [Point2; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Enclosed area of the ordered corners.
    pub fn area(&self) -> f64 {
        contour_area(&self.corners().map(|(x, y)| Point::new(x, y)))
    }
}

/// First point with the smallest (or largest) key.
fn extreme(points: &[Point2; 4], key: impl Fn(&Point2) -> f32, largest: bool) -> Point2 {
    let mut best = points[0];
    let mut best_key = key(&best);
    for point in &points[1..] {
        let k = key(point);
        if (largest && k > best_key) || (!largest && k < best_key) {
            best = *point;
            best_key = k;
        }
    }
    best
}

/// A perspective-corrected answer sheet.
#[derive(Debug, Clone)]
pub struct RectifiedSheet {
    /// Grayscale sheet at the canonical output size.
    pub image: GrayImage,
    /// Source corners in the working image.
    pub corners: Quadrilateral,
    /// Mapping from working-image coordinates to sheet coordinates.
    pub projection: Projection,
}

/// Finds the answer sheet in an edge map and warps it to a fixed-size,
/// fronto-parallel image.
///
/// ## Pipeline
///
/// 1. Trace contours in the edge map, keeping only outer borders without a
///    parent (the outermost boundaries)
/// 2. Approximate each as a closed polygon with a tolerance proportional to
///    its perimeter; keep four-vertex approximations
/// 3. Pick the candidate whose contour encloses the largest area, provided
///    it covers a significant share of the frame
/// 4. Order its corners and compute the projective transform onto the
///    canonical rectangle
/// 5. Warp the grayscale image (never the edge map) through it
#[derive(Debug, Clone, Copy)]
pub struct DocumentLocator {
    output_width: u32,
    output_height: u32,
    epsilon_ratio: f64,
    min_area_ratio: f64,
}

impl DocumentLocator {
    pub fn new(config: &OmrConfig) -> Self {
        Self {
            output_width: config.output_width,
            output_height: config.output_height,
            epsilon_ratio: config.approx_epsilon_ratio,
            min_area_ratio: config.min_document_area_ratio,
        }
    }

    /// Corners of the rectified output, in the same order as
    /// [`Quadrilateral::corners`].
    pub fn canonical_corners(&self) -> [Point2; 4] {
        let w = (self.output_width - 1) as f32;
        let h = (self.output_height - 1) as f32;
        [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
    }

    /// Locate and rectify in one step.
    pub fn locate(&self, edges: &GrayImage, gray: &GrayImage) -> Result<RectifiedSheet> {
        let quad = self.find_quadrilateral(edges)?;
        self.rectify(gray, &quad)
    }

    /// Find the largest significant four-sided outer contour.
    #[instrument(skip_all, fields(width = edges.width(), height = edges.height()))]
    pub fn find_quadrilateral(&self, edges: &GrayImage) -> Result<Quadrilateral> {
        let contours = find_contours::<i32>(edges);
        let min_area =
            self.min_area_ratio * edges.width() as f64 * edges.height() as f64;

        let mut best: Option<([Point2; 4], f64)> = None;
        let mut outer_count = 0usize;
        let mut four_sided = 0usize;

        for contour in contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        {
            outer_count += 1;
            let points: Vec<(f64, f64)> = contour
                .points
                .iter()
                .map(|p| (p.x as f64, p.y as f64))
                .collect();

            let epsilon = self.epsilon_ratio * arc_length(&contour.points, true);
            if epsilon <= 0.0 {
                continue;
            }
            let polygon = approximate_closed_polygon(&points, epsilon);
            if polygon.len() != 4 {
                continue;
            }
            four_sided += 1;

            let area = contour_area(&contour.points);
            if best.as_ref().is_none_or(|(_, best_area)| area > *best_area) {
                let vertices = [
                    (polygon[0].0 as f32, polygon[0].1 as f32),
                    (polygon[1].0 as f32, polygon[1].1 as f32),
                    (polygon[2].0 as f32, polygon[2].1 as f32),
                    (polygon[3].0 as f32, polygon[3].1 as f32),
                ];
                best = Some((vertices, area));
            }
        }

        debug!(outer_count, four_sided, min_area, "Contours scanned");

        let Some((vertices, area)) = best else {
            warn!(outer_count, "No four-sided contour found");
            return Err(OmrError::NoDocumentFound(format!(
                "none of {outer_count} outer contours approximates a quadrilateral"
            )));
        };

        if area < min_area {
            warn!(area, min_area, "Largest quadrilateral too small");
            return Err(OmrError::NoDocumentFound(format!(
                "largest quadrilateral covers {area:.0} px, below the {min_area:.0} px minimum"
            )));
        }

        let quad = Quadrilateral::from_unordered(vertices);
        debug!(
            top_left = ?quad.top_left,
            top_right = ?quad.top_right,
            bottom_right = ?quad.bottom_right,
            bottom_left = ?quad.bottom_left,
            area,
            "Sheet quadrilateral selected"
        );
        Ok(quad)
    }

    /// Warp `gray` so that `quad` fills the canonical output rectangle.
    #[instrument(skip_all, fields(out_w = self.output_width, out_h = self.output_height))]
    pub fn rectify(&self, gray: &GrayImage, quad: &Quadrilateral) -> Result<RectifiedSheet> {
        if quad.area() < 1.0 {
            return Err(OmrError::NoDocumentFound(
                "sheet corners collapse to a degenerate shape".into(),
            ));
        }

        let projection = Projection::from_control_points(quad.corners(), self.canonical_corners())
            .ok_or_else(|| {
                OmrError::NoDocumentFound("sheet corners admit no perspective transform".into())
            })?;

        let mut image = GrayImage::new(self.output_width, self.output_height);
        warp_into(
            gray,
            &projection,
            Interpolation::Bilinear,
            Luma([255u8]),
            &mut image,
        );

        info!("Sheet rectified");
        Ok(RectifiedSheet {
            image,
            corners: *quad,
            projection,
        })
    }
}

// -- Polygon helpers ----------------------------------------------------------

/// Douglas–Peucker simplification of a closed curve.
///
/// The curve is cut at two mutually distant points so that neither open
/// chain has coincident endpoints, then each chain is simplified.
fn approximate_closed_polygon(points: &[(f64, f64)], epsilon: f64) -> Vec<(f64, f64)> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = farthest_from(points, points[0]);
    let second = farthest_from(points, points[first]);
    let (a, b) = (first.min(second), first.max(second));
    if a == b {
        return vec![points[a]];
    }

    let forward = &points[a..=b];
    let backward: Vec<(f64, f64)> = points[b..].iter().chain(&points[..=a]).copied().collect();

    let mut polygon = Vec::new();
    simplify_chain(forward, epsilon, &mut polygon);
    simplify_chain(&backward, epsilon, &mut polygon);
    polygon
}

fn farthest_from(points: &[(f64, f64)], origin: (f64, f64)) -> usize {
    let mut index = 0;
    let mut max_dist = -1.0;
    for (i, p) in points.iter().enumerate() {
        let d = (p.0 - origin.0).powi(2) + (p.1 - origin.1).powi(2);
        if d > max_dist {
            max_dist = d;
            index = i;
        }
    }
    index
}

/// Simplify an open chain, appending every kept vertex except the chain's
/// last point (the next chain starts there).
fn simplify_chain(chain: &[(f64, f64)], epsilon: f64, out: &mut Vec<(f64, f64)>) {
    let last = chain.len() - 1;
    let (start, end) = (chain[0], chain[last]);

    let mut split = 0;
    let mut max_dist = 0.0;
    for (i, &p) in chain.iter().enumerate().take(last).skip(1) {
        let d = distance_to_segment(p, start, end);
        if d > max_dist {
            max_dist = d;
            split = i;
        }
    }

    if max_dist > epsilon {
        simplify_chain(&chain[..=split], epsilon, out);
        simplify_chain(&chain[split..], epsilon, out);
    } else {
        out.push(start);
    }
}

fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((p.0 - a.0).powi(2) + (p.1 - a.1).powi(2)).sqrt();
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

// -- Tests --------------------------------------------------------------------
