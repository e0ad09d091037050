// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SmartGrader: read and grade photographed answer sheets.
//
// Entry point. Initialises logging, parses arguments, reads every photo,
// runs the OMR batch, grades against an optional key, and prints a JSON
// report to stdout.

mod answer_key;
mod report;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use smartgrader_core::error::{OmrError, Result};
use smartgrader_core::human_errors::humanize_error;
use smartgrader_core::{AnswerGrid, FailureReason, OmrConfig, OmrResult};
use smartgrader_omr::OmrPipeline;

use answer_key::{AnswerKey, parse_answer_key};
use report::SheetReport;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "smartgrader", version)]
#[command(about = "Read bubble answers from photographed answer sheets and grade them")]
struct Args {
    /// Photos of answer sheets (JPEG, PNG, ...)
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Number of questions (rows) on the sheet
    #[arg(short, long)]
    questions: u32,

    /// Number of options (columns) per question
    #[arg(short, long, default_value_t = 5)]
    options: u32,

    /// Correct answers, as letters (A,B,C or ABC) or zero-based indices (0,1,2)
    #[arg(short = 'k', long, value_parser = parse_answer_key)]
    answer_key: Option<AnswerKey>,

    /// JSON file overriding the default pipeline settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to save each rectified sheet as PNG
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Directory holding the OCR models used to read student names
    #[cfg(feature = "ocr")]
    #[arg(long)]
    ocr_models: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let human = humanize_error(&err);
            error!(error = %err, "{}", human.message);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => OmrConfig::load(path)?,
        None => OmrConfig::default(),
    };
    let pipeline = build_pipeline(config, args)?;

    if let Some(key) = &args.answer_key {
        check_key(key, args.questions, args.options)?;
    }

    info!(
        files = args.images.len(),
        questions = args.questions,
        options = args.options,
        "SmartGrader starting"
    );

    let results = match &args.debug_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            read_with_debug_images(&pipeline, &args.images, args.questions, args.options, dir)
        }
        None => read_batch(&pipeline, &args.images, args.questions, args.options),
    };

    let reports: Vec<SheetReport> = args
        .images
        .iter()
        .zip(results)
        .map(|(path, result)| SheetReport::new(path, result, args.answer_key.as_ref()))
        .collect();

    let json = if args.pretty {
        serde_json::to_string_pretty(&reports)?
    } else {
        serde_json::to_string(&reports)?
    };
    println!("{json}");

    info!(
        read = reports.iter().filter(|r| r.result.is_success()).count(),
        total = reports.len(),
        "Done"
    );
    Ok(())
}

#[cfg(feature = "ocr")]
fn build_pipeline(config: OmrConfig, args: &Args) -> Result<OmrPipeline> {
    let pipeline = OmrPipeline::new(config)?;
    match &args.ocr_models {
        Some(dir) => {
            let engine = smartgrader_omr::OcrEngine::from_model_dir(dir)?;
            Ok(pipeline.with_name_hints(engine))
        }
        None => Ok(pipeline),
    }
}

#[cfg(not(feature = "ocr"))]
fn build_pipeline(config: OmrConfig, _args: &Args) -> Result<OmrPipeline> {
    OmrPipeline::new(config)
}

/// A key must name options the sheet has; a length mismatch is only worth
/// a warning since grading follows the key.
fn check_key(key: &AnswerKey, questions: u32, options: u32) -> Result<()> {
    if let Some((question, option)) = key.out_of_range(options) {
        return Err(OmrError::InvalidGrid(format!(
            "answer key gives option {option} for question {}, but the sheet has {options} options",
            question + 1
        )));
    }
    if key.0.len() != questions as usize {
        warn!(
            key_len = key.0.len(),
            questions, "Answer key length differs from the question count"
        );
    }
    Ok(())
}

/// Read every file up front; an unreadable file is a failed result of its
/// own, never an abort.
fn load_files(paths: &[PathBuf]) -> Vec<std::result::Result<Vec<u8>, OmrError>> {
    paths
        .iter()
        .map(|path| {
            fs::read(path).map_err(|err| {
                warn!(file = %path.display(), error = %err, "Could not read file");
                OmrError::Io(err)
            })
        })
        .collect()
}

fn read_batch(
    pipeline: &OmrPipeline,
    paths: &[PathBuf],
    questions: u32,
    options: u32,
) -> Vec<OmrResult> {
    let loaded = load_files(paths);
    let readable: Vec<&[u8]> = loaded.iter().filter_map(|r| r.as_deref().ok()).collect();
    let mut batch = pipeline
        .process_batch(&readable, questions, options)
        .into_iter();

    loaded
        .iter()
        .map(|entry| match entry {
            Ok(_) => batch.next().unwrap_or_else(|| OmrResult::Failure {
                reason: FailureReason::Internal,
                message: "batch returned fewer results than inputs".into(),
            }),
            Err(err) => OmrResult::failure(err),
        })
        .collect()
}

/// Sequential variant that also writes `<stem>.rectified.png` for every
/// sheet that was located.
fn read_with_debug_images(
    pipeline: &OmrPipeline,
    paths: &[PathBuf],
    questions: u32,
    options: u32,
    dir: &Path,
) -> Vec<OmrResult> {
    paths
        .iter()
        .zip(load_files(paths))
        .map(|(path, loaded)| {
            let outcome = loaded
                .and_then(|bytes| {
                    let grid = AnswerGrid::new(questions, options)?;
                    pipeline.scan(&bytes, &grid)
                })
                .map(|scan| {
                    let target = debug_image_path(dir, path);
                    match scan.rectified.save(&target) {
                        Ok(()) => info!(file = %target.display(), "Rectified sheet saved"),
                        Err(err) => warn!(file = %target.display(), error = %err, "Could not save rectified sheet"),
                    }
                    OmrResult::Success {
                        answers: scan.answers,
                        name_hint: scan.name_hint,
                    }
                });

            outcome.unwrap_or_else(|err| {
                warn!(file = %path.display(), error = %err, "Answer sheet could not be read");
                OmrResult::failure(&err)
            })
        })
        .collect()
}

fn debug_image_path(dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sheet".to_string());
    dir.join(format!("{stem}.rectified.png"))
}
