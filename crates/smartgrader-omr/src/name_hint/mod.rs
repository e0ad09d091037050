// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Name hints: crop the header of the photo, run text recognition over several
// preprocessing variants, and parse the student's name out of the text.

pub mod parse;
pub mod variants;

use image::GrayImage;
use image::imageops;
use smartgrader_core::error::Result;
use smartgrader_core::{NameHint, OmrConfig};
use tracing::{debug, instrument, warn};

pub use parse::parse_name_hint;
pub use variants::HeaderVariant;

/// Anything that turns a grayscale image into text.
///
/// The OCR engine behind the `ocr` feature implements this; tests and
/// callers with their own recognizer can pass a closure.
pub trait TextRecognizer: Send + Sync {
    fn recognize_text(&self, image: &GrayImage) -> Result<String>;
}

impl<F> TextRecognizer for F
where
    F: Fn(&GrayImage) -> Result<String> + Send + Sync,
{
    fn recognize_text(&self, image: &GrayImage) -> Result<String> {
        self(image)
    }
}

/// Reads a name hint from the header strip of the working-resolution photo,
/// before perspective correction.
///
/// Each [`HeaderVariant`] is tried in rank order. The first variant whose
/// text yields both names wins; otherwise the most complete hint seen is
/// returned. Recognition errors are logged and skipped, never propagated:
/// a missing name must not fail the sheet.
pub struct NameHintExtractor {
    recognizer: Box<dyn TextRecognizer>,
    header_fraction: f32,
}

impl NameHintExtractor {
    pub fn new(recognizer: impl TextRecognizer + 'static, config: &OmrConfig) -> Self {
        Self {
            recognizer: Box::new(recognizer),
            header_fraction: config.name_header_fraction,
        }
    }

    /// Top strip of the photo where the name fields are printed.
    pub fn header(&self, photo: &GrayImage) -> GrayImage {
        let height = ((photo.height() as f32 * self.header_fraction).round() as u32)
            .clamp(1, photo.height().max(1));
        imageops::crop_imm(photo, 0, 0, photo.width(), height).to_image()
    }

    #[instrument(skip_all, fields(width = photo.width(), height = photo.height()))]
    pub fn extract(&self, photo: &GrayImage) -> NameHint {
        let header = self.header(photo);
        let mut best = NameHint::empty();

        for variant in HeaderVariant::RANKED {
            let text = match self.recognizer.recognize_text(&variant.apply(&header)) {
                Ok(text) => text,
                Err(err) => {
                    warn!(?variant, error = %err, "Text recognition failed");
                    continue;
                }
            };

            let hint = parse_name_hint(&text);
            debug!(?variant, completeness = hint.completeness(), "Header read");
            if hint.is_complete() {
                return hint;
            }
            if hint.completeness() > best.completeness() {
                best = hint;
            }
        }

        best
    }
}

impl std::fmt::Debug for NameHintExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameHintExtractor")
            .field("header_fraction", &self.header_fraction)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use smartgrader_core::OmrError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn photo() -> GrayImage {
        GrayImage::from_pixel(550, 700, Luma([230u8]))
    }

    #[test]
    fn header_is_top_fraction() {
        let recognizer = |_: &GrayImage| -> Result<String> { Ok(String::new()) };
        let extractor = NameHintExtractor::new(recognizer, &OmrConfig::default());
        let header = extractor.header(&photo());
        assert_eq!(header.dimensions(), (550, 210));
    }

    #[test]
    fn complete_hint_from_first_variant() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let recognizer = move |_: &GrayImage| -> Result<String> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("Nume: Popescu\nPrenume: Ana".to_string())
        };
        let hint = NameHintExtractor::new(recognizer, &OmrConfig::default()).extract(&photo());
        assert_eq!(hint.first_name.as_deref(), Some("Ana"));
        assert_eq!(hint.last_name.as_deref(), Some("Popescu"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn later_variant_can_complete_the_hint() {
        let outputs = Mutex::new(vec![
            "First name: Dan".to_string(),
            "garbled".to_string(),
            "First name: Dan\nLast name: Ionescu".to_string(),
        ]);
        let recognizer = move |_: &GrayImage| -> Result<String> {
            let mut outputs = outputs
                .lock()
                .map_err(|_| OmrError::TextRecognition("poisoned".into()))?;
            Ok(if outputs.is_empty() {
                String::new()
            } else {
                outputs.remove(0)
            })
        };
        let hint = NameHintExtractor::new(recognizer, &OmrConfig::default()).extract(&photo());
        assert!(hint.is_complete());
        assert_eq!(hint.full_name(), "Dan Ionescu");
    }

    #[test]
    fn partial_hint_is_kept_when_nothing_better() {
        let recognizer = |_: &GrayImage| -> Result<String> { Ok("Surname: Ionescu".to_string()) };
        let hint = NameHintExtractor::new(recognizer, &OmrConfig::default()).extract(&photo());
        assert_eq!(hint.last_name.as_deref(), Some("Ionescu"));
        assert_eq!(hint.first_name, None);
    }

    #[test]
    fn header_comes_from_the_photo_as_given() {
        let mut photo = GrayImage::from_pixel(300, 400, Luma([90u8]));
        for x in 0..300 {
            photo.put_pixel(x, 0, Luma([7u8]));
        }
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let recognizer = move |header: &GrayImage| -> Result<String> {
            if let Ok(mut seen) = sink.lock() {
                seen.push((header.dimensions(), header.get_pixel(0, 0).0[0]));
            }
            Ok(String::new())
        };
        NameHintExtractor::new(recognizer, &OmrConfig::default()).extract(&photo);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), HeaderVariant::RANKED.len());
        assert_eq!(seen[0], ((300, 120), 7));
    }

    #[test]
    fn recognizer_errors_give_empty_hint() {
        let recognizer = |_: &GrayImage| -> Result<String> {
            Err(OmrError::TextRecognition("models missing".into()))
        };
        let hint = NameHintExtractor::new(recognizer, &OmrConfig::default()).extract(&photo());
        assert!(hint.is_empty());
    }
}
