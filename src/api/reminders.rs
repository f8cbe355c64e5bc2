//! 提醒录屏提取器

use std::sync::{Mutex, MutexGuard, PoisonError};

use flutter_rust_bridge::frb;
use log::info;

use crate::api::models::reminder::{ReminderApiError, ReminderRecord};
use crate::core::config::ExtractorConfig;
use crate::core::ocr::SidecarTextDetector;
use crate::core::pipeline::{ExtractionStats, ReminderExtractor};
use crate::core::video::{detect_stable_frames, Frame, YFrameData};

/// 提醒提取器 - 稳定帧检测 + 布局解析 + 跨帧去重
///
/// ```dart
/// final extractor = RemindersExtractor.create();
/// final frameNumbers = await extractor.stableFrames(frames: yFrames);
/// // 对这些帧跑 OCR，结果写到 ocrDir/frame_000123.ocr.json
/// final reminders = await extractor.extractFromSidecars(frames: yFrames, ocrDir: dir, year: 2026);
/// ```
#[frb(opaque)]
pub struct RemindersExtractor {
    extractor: ReminderExtractor,
    stats: Mutex<ExtractionStats>,
}

impl RemindersExtractor {
    #[frb(sync)]
    pub fn create() -> Result<Self, ReminderApiError> {
        Self::build(ExtractorConfig::default())
    }

    /// 使用 JSON5 配置创建，缺省字段取默认值
    #[frb(sync)]
    pub fn create_with_config(config_json5: String) -> Result<Self, ReminderApiError> {
        Self::build(ExtractorConfig::from_json5(&config_json5)?)
    }

    fn build(config: ExtractorConfig) -> Result<Self, ReminderApiError> {
        crate::init_logging();
        let extractor = ReminderExtractor::with_config(config)?;
        info!("🎬 RemindersExtractor: created");
        Ok(Self {
            extractor,
            stats: Mutex::new(ExtractionStats::default()),
        })
    }

    /// 返回每个稳定期代表帧的帧编号，Dart 侧只需对这些帧跑 OCR
    #[frb]
    pub fn stable_frames(&self, frames: Vec<YFrameData>) -> Result<Vec<u64>, ReminderApiError> {
        let frames = Self::to_frames(frames)?;
        let processed = frames.len() as u64;
        let selected = detect_stable_frames(frames, &self.extractor.config().stability);

        self.update_stats(|stats| {
            stats.processed_frames += processed;
            stats.stable_frames += selected.len() as u64;
        });
        Ok(selected.iter().map(|f| f.frame_number).collect())
    }

    /// 完整流水线，OCR 结果从 `ocr_dir` 下的 sidecar JSON 读取
    #[frb]
    pub fn extract_from_sidecars(
        &self,
        frames: Vec<YFrameData>,
        ocr_dir: String,
        year: i32,
    ) -> Result<Vec<ReminderRecord>, ReminderApiError> {
        let frames = Self::to_frames(frames)?;
        let detector = SidecarTextDetector::new(ocr_dir);
        let output = self.extractor.extract(frames, &detector)?;

        self.update_stats(|stats| {
            stats.processed_frames += output.stats.processed_frames;
            stats.stable_frames += output.stats.stable_frames;
            stats.failed_frames += output.stats.failed_frames;
            stats.raw_reminders += output.stats.raw_reminders;
            stats.unique_reminders += output.stats.unique_reminders;
        });

        Ok(output
            .reminders
            .into_iter()
            .map(|r| ReminderRecord::from_reminder(r, year))
            .collect())
    }

    #[frb(sync, getter)]
    pub fn stats(&self) -> ExtractionStats {
        *self.lock_stats()
    }

    #[frb(sync)]
    pub fn reset(&self) {
        self.update_stats(|stats| *stats = ExtractionStats::default());
    }

    fn to_frames(frames: Vec<YFrameData>) -> Result<Vec<Frame>, ReminderApiError> {
        frames
            .into_iter()
            .map(|f| f.into_frame().map_err(ReminderApiError::from))
            .collect()
    }

    fn update_stats(&self, update: impl FnOnce(&mut ExtractionStats)) {
        update(&mut self.lock_stats());
    }

    /// 计数器只是普通数值，锁中毒后继续使用里面的值
    fn lock_stats(&self) -> MutexGuard<'_, ExtractionStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for RemindersExtractor {
    fn drop(&mut self) {
        info!("🗑️ RemindersExtractor: released");
    }
}
