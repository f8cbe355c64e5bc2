//! 命令行入口：从解码好的帧序列 + OCR 结果中提取提醒
//!
//! ```text
//! reminder-extract ./frames --ocr-dir ./ocr --output-dir ./out
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Datelike;
use clap::Parser;
use log::{error, info, warn};

use reminder_lib::core::config::ExtractorConfig;
use reminder_lib::core::error::ExtractError;
use reminder_lib::core::ocr::SidecarTextDetector;
use reminder_lib::core::output::{write_csv, write_json};
use reminder_lib::core::pipeline::ReminderExtractor;
use reminder_lib::core::video::Frame;

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

#[derive(Parser, Debug)]
#[command(
    name = "reminder-extract",
    about = "Extract reminders from a screen recording of a scrolling reminders list"
)]
struct Cli {
    /// Directory holding the decoded video frames as an ordered image sequence
    frames_dir: PathBuf,

    /// Directory with per-frame OCR results (frame_000123.ocr.json)
    #[arg(long)]
    ocr_dir: Option<PathBuf>,

    /// JSON5 config file; missing keys fall back to defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for output files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Year used to resolve date labels such as "Thursday 13 Feb"
    #[arg(long)]
    year: Option<i32>,

    /// Frame rate of the recording, used for frame timestamps
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Save the representative frames for review
    #[arg(long)]
    save_frames: bool,

    /// Stop after stability detection (useful for tuning thresholds)
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    reminder_lib::init_logging_with_level(level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(ExtractError::NoStableFrames) => {
            error!("No stable frames found! Try adjusting stability.threshold or stability.min_run");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), ExtractError> {
    let config = match &cli.config {
        Some(path) => ExtractorConfig::load(path)?,
        None => ExtractorConfig::default(),
    };
    let extractor = ReminderExtractor::with_config(config)?;

    info!("Step 1: extracting static frames from {:?}", cli.frames_dir);
    let paths = list_frames(&cli.frames_dir)?;
    let (selected, processed) = select_readable_frames(&extractor, paths, cli.fps)?;

    if cli.save_frames || cli.dry_run {
        let frames_dir = cli.output_dir.join("frames");
        fs::create_dir_all(&frames_dir)?;
        for (seq, frame) in selected.iter().enumerate() {
            frame.save(frames_dir.join(format!("frame_{:03}.png", seq)))?;
        }
        info!("💾 saved {} frames to {:?}", selected.len(), frames_dir);
    }

    if cli.dry_run {
        let numbers: Vec<u64> = selected.iter().map(|f| f.frame_number).collect();
        info!("Dry run complete, representative frames: {:?}", numbers);
        return Ok(());
    }

    let ocr_dir = cli.ocr_dir.as_ref().ok_or_else(|| {
        ExtractError::Config("--ocr-dir is required unless --dry-run is set".to_string())
    })?;

    info!("Step 2: OCR + layout parsing on {} frames", selected.len());
    let detector = SidecarTextDetector::new(ocr_dir);
    let per_frame = extractor.recognize_frames(&selected, &detector)?;

    info!("Step 3: deduplicating reminders");
    let output = extractor.merge(per_frame, processed);

    info!("Step 4: writing output files");
    let year = cli.year.unwrap_or_else(|| chrono::Local::now().year());
    let csv_path = write_csv(&output.reminders, &cli.output_dir, year)?;
    let json_path = write_json(&output.reminders, &cli.output_dir)?;

    info!(
        "Done! {} reminders extracted ({} frames failed OCR)",
        output.stats.unique_reminders, output.stats.failed_frames
    );
    info!("  CSV: {:?}", csv_path);
    info!("  JSON: {:?}", json_path);
    Ok(())
}

/// 目录下的图片文件，按文件名排序即帧顺序
fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();
    info!("Video: {} frames in {:?}", paths.len(), dir);
    Ok(paths)
}

/// 代表帧 + 实际读出的帧数（跳过的帧不计入）
fn select_readable_frames(
    extractor: &ReminderExtractor,
    paths: Vec<PathBuf>,
    fps: f64,
) -> Result<(Vec<Frame>, u64), ExtractError> {
    let mut processed = 0u64;
    let frames = load_frames(paths, fps).inspect(|_| processed += 1);
    let selected = extractor.select_frames(frames)?;
    info!(
        "🎬 {} representative frames from {} readable frames",
        selected.len(),
        processed
    );
    Ok((selected, processed))
}

/// 按需读取，避免整段视频同时留在内存里；读不出的帧跳过
fn load_frames(paths: Vec<PathBuf>, fps: f64) -> impl Iterator<Item = Frame> {
    let frame_ms = if fps > 0.0 { 1000.0 / fps } else { 0.0 };
    paths
        .into_iter()
        .enumerate()
        .filter_map(move |(idx, path)| {
            let timestamp_ms = (idx as f64 * frame_ms) as u64;
            match Frame::open(&path, timestamp_ms, idx as u64) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    warn!("⚠️ could not read frame {:?}: {}", path, e);
                    None
                }
            }
        })
}
