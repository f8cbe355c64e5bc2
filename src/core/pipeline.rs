//! 提醒提取流水线
//!
//! 稳定帧检测 → 逐帧 OCR + 布局解析（并行） → 跨帧去重（按帧顺序串行）

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::config::ExtractorConfig;
use crate::core::error::ExtractError;
use crate::core::ocr::{adapt_detections, TextDetector};
use crate::core::reminders::{LayoutParser, Reminder, ReminderDeduplicator};
use crate::core::video::{detect_stable_frames, Frame, FrameInfo};

/// 提取统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub processed_frames: u64,
    pub stable_frames: u64,
    pub failed_frames: u64,
    pub raw_reminders: u64,
    pub unique_reminders: u64,
}

#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    pub reminders: Vec<Reminder>,
    pub frames: Vec<FrameInfo>,
    pub stats: ExtractionStats,
}

/// 单帧识别结果
#[derive(Debug, Clone)]
pub struct FrameReminders {
    pub frame: FrameInfo,
    pub reminders: Vec<Reminder>,
    /// OCR 失败时为 false，该帧贡献零条提醒
    pub recognized: bool,
}

pub struct ReminderExtractor {
    config: ExtractorConfig,
    parser: LayoutParser,
}

impl ReminderExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Self::with_config(ExtractorConfig::default())
    }

    pub fn with_config(config: ExtractorConfig) -> Result<Self, ExtractError> {
        let parser = LayoutParser::new(config.layout.clone())?;
        Ok(Self { config, parser })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// 挑出每个稳定期的代表帧，一帧都没有时报错，后续步骤不再执行
    pub fn select_frames<I>(&self, frames: I) -> Result<Vec<Frame>, ExtractError>
    where
        I: IntoIterator<Item = Frame>,
    {
        let selected = detect_stable_frames(frames, &self.config.stability);
        if selected.is_empty() {
            return Err(ExtractError::NoStableFrames);
        }
        Ok(selected)
    }

    /// 单帧：OCR → 适配 → 布局解析；OCR 失败只影响本帧
    pub fn recognize_frame(&self, frame: &Frame, detector: &dyn TextDetector) -> FrameReminders {
        let info = FrameInfo::from_frame(frame);
        let detections = match detector.detect(frame) {
            Ok(d) => d,
            Err(e) => {
                warn!("⚠️ OCR failed on frame {}: {}", frame.frame_number, e);
                return FrameReminders {
                    frame: info,
                    reminders: Vec::new(),
                    recognized: false,
                };
            }
        };

        let boxes = adapt_detections(detections, self.config.ocr.min_confidence);
        let reminders = self.parser.parse_frame(&boxes, frame);
        info!(
            "🔎 frame {}: {} text boxes → {} reminders",
            frame.frame_number,
            boxes.len(),
            reminders.len()
        );
        FrameReminders {
            frame: info,
            reminders,
            recognized: true,
        }
    }

    /// 并行识别，结果保持输入帧的顺序
    pub fn recognize_frames(
        &self,
        frames: &[Frame],
        detector: &dyn TextDetector,
    ) -> Result<Vec<FrameReminders>, ExtractError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.ocr.worker_count())
            .build()
            .map_err(|e| ExtractError::WorkerPool(e.to_string()))?;

        Ok(pool.install(|| {
            frames
                .par_iter()
                .map(|frame| self.recognize_frame(frame, detector))
                .collect()
        }))
    }

    pub fn extract<I>(
        &self,
        frames: I,
        detector: &dyn TextDetector,
    ) -> Result<ExtractionOutput, ExtractError>
    where
        I: IntoIterator<Item = Frame>,
    {
        let mut processed = 0u64;
        let counted = frames.into_iter().inspect(|_| processed += 1);
        let selected = self.select_frames(counted)?;
        info!("🎬 {} representative frames from {} frames", selected.len(), processed);

        let per_frame = self.recognize_frames(&selected, detector)?;
        Ok(self.merge(per_frame, processed))
    }

    /// 串行合并：必须按帧的时间顺序，保证“先观测到的优先”
    pub fn merge(&self, per_frame: Vec<FrameReminders>, processed_frames: u64) -> ExtractionOutput {
        let mut stats = ExtractionStats {
            processed_frames,
            stable_frames: per_frame.len() as u64,
            ..Default::default()
        };
        let mut frames = Vec::with_capacity(per_frame.len());
        let mut dedup = ReminderDeduplicator::with_config(self.config.dedup.clone());

        for result in per_frame {
            if !result.recognized {
                stats.failed_frames += 1;
            }
            stats.raw_reminders += result.reminders.len() as u64;
            frames.push(result.frame);
            dedup.push_frame(result.reminders);
        }

        let reminders = dedup.finish();
        stats.unique_reminders = reminders.len() as u64;
        info!("✅ {} reminders extracted", reminders.len());

        ExtractionOutput {
            reminders,
            frames,
            stats,
        }
    }
}
